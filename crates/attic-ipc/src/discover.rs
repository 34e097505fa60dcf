//! Discovery of live AtticServer sockets in the well-known directory.

use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;

use attic_protocol::pid_from_socket_name;
use attic_protocol::SOCKET_DIR;

/// A server socket together with the PID embedded in its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub path: PathBuf,
    pub pid: u32,
}

impl Endpoint {
    pub fn new(path: PathBuf, pid: u32) -> Self {
        Self { path, pid }
    }
}

/// Find the most recently active AtticServer socket.
///
/// Entries whose owning process is no longer alive are deleted
/// (best-effort) and never returned.
pub fn discover() -> Option<Endpoint> {
    discover_in(Path::new(SOCKET_DIR))
}

/// Like [`discover`], scanning an explicit directory.
pub fn discover_in(dir: &Path) -> Option<Endpoint> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut best: Option<(SystemTime, Endpoint)> = None;

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(pid) = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(pid_from_socket_name)
        else {
            continue;
        };

        if !process_alive(pid) {
            tracing::debug!(path = %path.display(), pid, "reclaiming stale socket");
            let _ = std::fs::remove_file(&path);
            continue;
        }

        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        if best.as_ref().is_none_or(|(t, _)| modified > *t) {
            best = Some((modified, Endpoint { path, pid }));
        }
    }

    best.map(|(_, endpoint)| endpoint)
}

/// Non-destructive liveness probe: signal 0 checks existence only.
/// EPERM means the process exists but belongs to another user.
pub fn process_alive(pid: u32) -> bool {
    let ret = unsafe { libc::kill(pid as libc::pid_t, 0) };
    if ret == 0 {
        return true;
    }
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}
