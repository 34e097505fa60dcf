//! Socket path conventions shared with AtticServer.

use std::path::PathBuf;

/// Directory scanned for server sockets.
pub const SOCKET_DIR: &str = "/tmp";

pub const SOCKET_PATH_PREFIX: &str = "/tmp/attic-";
pub const SOCKET_PATH_SUFFIX: &str = ".sock";

/// Expected socket path for a given AtticServer PID.
pub fn socket_path_for_pid(pid: u32) -> PathBuf {
    PathBuf::from(format!("{SOCKET_PATH_PREFIX}{pid}{SOCKET_PATH_SUFFIX}"))
}

/// Parse the owning PID out of a socket file name (`attic-<pid>.sock`).
pub fn pid_from_socket_name(name: &str) -> Option<u32> {
    let rest = name.strip_prefix("attic-")?;
    let digits = rest.strip_suffix(SOCKET_PATH_SUFFIX)?;
    digits.parse().ok()
}
