use thiserror::Error;

use attic_protocol::ProtocolError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Not connected to AtticServer")]
    NotConnected,

    #[error("Already connected to AtticServer")]
    AlreadyConnected,

    #[error("Failed to connect to AtticServer: {0}")]
    ConnectFailed(std::io::Error),

    #[error("Handshake failed: {0}")]
    HandshakeFailed(String),

    #[error("Command timed out")]
    Timeout,

    #[error("Server closed the connection")]
    ConnectionClosed,

    #[error("Connection lost: {0}")]
    ConnectionLost(std::io::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl ClientError {
    /// True for failures that leave the client disconnected.
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            ClientError::Timeout | ClientError::ConnectionClosed | ClientError::ConnectionLost(_)
        )
    }
}

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error(
        "AtticServer executable not found. Build it with 'swift build' or ensure it's on your PATH"
    )]
    ExecutableNotFound,

    #[error("Failed to launch AtticServer: {0}")]
    SpawnFailed(#[from] std::io::Error),

    #[error("AtticServer launched (pid {pid}) but socket did not appear within {waited_secs} seconds")]
    SocketTimeout { pid: u32, waited_secs: u64 },
}
