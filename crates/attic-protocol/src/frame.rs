//! Frame encoding and classification.

use std::time::Duration;

use crate::error::ProtocolError;

pub const COMMAND_PREFIX: &str = "CMD:";
pub const OK_PREFIX: &str = "OK:";
pub const ERROR_PREFIX: &str = "ERR:";
pub const EVENT_PREFIX: &str = "EVENT:";

/// Multi-line payloads join individual lines with ASCII Record Separator.
pub const MULTI_LINE_SEP: char = '\x1e';

pub const PROTOCOL_VERSION: &str = "1.0";

/// Default timeout for ordinary commands.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the ping handshake and liveness checks.
pub const PING_TIMEOUT: Duration = Duration::from_secs(1);

/// Timeout for establishing a connection.
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest chunk read from the socket in one call. A frame may span several
/// reads, and one read may carry the start of the next frame.
pub const MAX_RECV: usize = 4096;

/// Parsed server reply to one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// True for `OK:` responses, false for `ERR:`.
    pub success: bool,
    /// Response data after prefix stripping.
    pub payload: String,
    /// True if the payload contains [`MULTI_LINE_SEP`].
    pub is_multiline: bool,
}

impl Reply {
    /// Split a multi-line payload into individual lines.
    ///
    /// The split is literal: empty segments are preserved. A single-line
    /// payload yields one segment, an empty payload none.
    pub fn lines(&self) -> Vec<&str> {
        if self.is_multiline {
            self.payload.split(MULTI_LINE_SEP).collect()
        } else if self.payload.is_empty() {
            Vec::new()
        } else {
            vec![self.payload.as_str()]
        }
    }
}

/// Parsed async event from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event type, e.g. "breakpoint", "stopped", "error".
    pub kind: String,
    /// Raw event data after the type; empty if the frame had none.
    pub data: String,
}

/// One classified incoming frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Reply(Reply),
    Event(Event),
}

/// Encode an outgoing command frame: `CMD:<command>\n`, nothing else.
pub fn encode_command(command: &str) -> String {
    format!("{COMMAND_PREFIX}{command}\n")
}

/// Classify a raw incoming line (newline already stripped).
pub fn parse_frame(line: &str) -> Result<Frame, ProtocolError> {
    if let Some(payload) = line.strip_prefix(OK_PREFIX) {
        return Ok(Frame::Reply(Reply {
            success: true,
            payload: payload.to_string(),
            is_multiline: payload.contains(MULTI_LINE_SEP),
        }));
    }

    if let Some(message) = line.strip_prefix(ERROR_PREFIX) {
        return Ok(Frame::Reply(Reply {
            success: false,
            payload: message.to_string(),
            is_multiline: false,
        }));
    }

    if let Some(body) = line.strip_prefix(EVENT_PREFIX) {
        // Event format: "EVENT:<kind> <data>" or just "EVENT:<kind>"
        let (kind, data) = match body.split_once(' ') {
            Some((kind, data)) => (kind, data),
            None => (body, ""),
        };
        return Ok(Frame::Event(Event {
            kind: kind.to_string(),
            data: data.to_string(),
        }));
    }

    Err(ProtocolError::MalformedFrame(line.to_string()))
}
