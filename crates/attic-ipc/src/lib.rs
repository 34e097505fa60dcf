#![deny(clippy::all)]

//! Client-side IPC for AtticServer: connection management, socket
//! discovery, and launching a server when none is running.

mod client;
mod discover;
mod error;
mod launcher;

pub use client::AtticClient;
pub use discover::discover;
pub use discover::discover_in;
pub use discover::process_alive;
pub use discover::Endpoint;
pub use error::ClientError;
pub use error::LaunchError;
pub use launcher::ensure_server_running;
pub use launcher::find_server_executable;
pub use launcher::launch_server;
pub use launcher::LaunchOptions;
