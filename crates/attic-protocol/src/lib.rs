#![deny(clippy::all)]

//! Wire protocol for the AtticServer control socket.
//!
//! The protocol is a frozen line-oriented text format shared with
//! AtticServer. Requests are `CMD:<command>\n`; the server answers with
//! `OK:<payload>\n` or `ERR:<message>\n` and may interleave unsolicited
//! `EVENT:<kind> <data>\n` lines at any time. Multi-line payloads join
//! their lines with ASCII Record Separator (0x1E) inside a single `OK:`
//! line. No changes without a protocol version bump.

mod error;
mod frame;
mod input;
mod socket;

pub use error::ProtocolError;
pub use frame::Event;
pub use frame::Frame;
pub use frame::Reply;
pub use frame::encode_command;
pub use frame::parse_frame;
pub use frame::COMMAND_PREFIX;
pub use frame::COMMAND_TIMEOUT;
pub use frame::CONNECTION_TIMEOUT;
pub use frame::ERROR_PREFIX;
pub use frame::EVENT_PREFIX;
pub use frame::MAX_RECV;
pub use frame::MULTI_LINE_SEP;
pub use frame::OK_PREFIX;
pub use frame::PING_TIMEOUT;
pub use frame::PROTOCOL_VERSION;
pub use input::escape_for_inject;
pub use input::parse_hex_bytes;
pub use input::translate_key;
pub use socket::pid_from_socket_name;
pub use socket::socket_path_for_pid;
pub use socket::SOCKET_DIR;
pub use socket::SOCKET_PATH_PREFIX;
pub use socket::SOCKET_PATH_SUFFIX;
