//! Find and launch the AtticServer executable.
//!
//! The server is a separate process; the CLI can attach to one that is
//! already running (see [`crate::discover`]) or spawn its own and wait for
//! the socket to appear.

use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;
use std::time::Duration;

use attic_protocol::socket_path_for_pid;

use crate::discover::discover;
use crate::discover::Endpoint;
use crate::error::LaunchError;

const SERVER_EXECUTABLE: &str = "AtticServer";

/// How long to wait for the server socket to appear after launch.
const SOCKET_POLL_INTERVAL: Duration = Duration::from_millis(200);
const SOCKET_POLL_RETRIES: u32 = 20;

#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Pass --silent to suppress audio output.
    pub silent: bool,
    /// Pass --rom-path to specify the ROM directory.
    pub rom_path: Option<PathBuf>,
}

/// Search for the AtticServer executable.
///
/// Checks, in order: the directory of the current executable (co-located
/// builds), PATH, and common installation directories.
pub fn find_server_executable() -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let candidate = dir.join(SERVER_EXECUTABLE);
            if is_executable(&candidate) {
                return Some(candidate);
            }
        }
    }

    if let Some(paths) = std::env::var_os("PATH") {
        for dir in std::env::split_paths(&paths) {
            let candidate = dir.join(SERVER_EXECUTABLE);
            if is_executable(&candidate) {
                return Some(candidate);
            }
        }
    }

    let mut common_dirs = vec![
        PathBuf::from("/usr/local/bin"),
        PathBuf::from("/opt/homebrew/bin"),
    ];
    if let Some(home) = std::env::var_os("HOME") {
        common_dirs.push(PathBuf::from(home).join(".local/bin"));
    }
    for dir in common_dirs {
        let candidate = dir.join(SERVER_EXECUTABLE);
        if is_executable(&candidate) {
            return Some(candidate);
        }
    }

    None
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Launch AtticServer and wait for its socket to appear.
///
/// Server output is discarded to keep CLI output clean.
pub fn launch_server(opts: &LaunchOptions) -> Result<Endpoint, LaunchError> {
    let exe = find_server_executable().ok_or(LaunchError::ExecutableNotFound)?;

    let mut command = Command::new(&exe);
    if opts.silent {
        command.arg("--silent");
    }
    if let Some(rom_path) = &opts.rom_path {
        command.arg("--rom-path").arg(rom_path);
    }
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    tracing::debug!(exe = %exe.display(), "launching AtticServer");
    let child = command.spawn()?;
    let pid = child.id();
    let socket_path = socket_path_for_pid(pid);

    for _ in 0..SOCKET_POLL_RETRIES {
        std::thread::sleep(SOCKET_POLL_INTERVAL);
        if socket_path.exists() {
            tracing::debug!(path = %socket_path.display(), pid, "AtticServer socket ready");
            return Ok(Endpoint::new(socket_path, pid));
        }
    }

    Err(LaunchError::SocketTimeout {
        pid,
        waited_secs: (SOCKET_POLL_INTERVAL * SOCKET_POLL_RETRIES).as_secs(),
    })
}

/// Ensure a server is running: attach to a discovered one, or launch.
pub fn ensure_server_running(opts: &LaunchOptions) -> Result<Endpoint, LaunchError> {
    if let Some(endpoint) = discover() {
        tracing::debug!(path = %endpoint.path.display(), "found running AtticServer");
        return Ok(endpoint);
    }
    launch_server(opts)
}
