//! Scripted mock AtticServer for client tests.
//!
//! Listens on a Unix socket in a temp directory and answers protocol
//! commands from a per-command script table. Requests are recorded so
//! tests can assert on exactly what was sent.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::os::unix::net::UnixListener;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use attic_ipc::Endpoint;
use tempfile::TempDir;

/// How the mock replies to one command.
#[derive(Debug, Clone)]
pub enum ServerAction {
    /// Reply `OK:<payload>`.
    Ok(String),
    /// Reply `ERR:<message>`.
    Err(String),
    /// Emit event frames, then reply `OK:<payload>`.
    Events(Vec<(String, String)>, String),
    /// Write raw bytes verbatim (malformed-frame tests).
    Raw(String),
    /// Write byte chunks with small gaps (reassembly tests).
    Chunked(Vec<Vec<u8>>),
    /// Never reply (timeout tests).
    Hang,
    /// Drop the connection without replying.
    Close,
}

pub struct MockServer {
    _dir: TempDir,
    socket_path: PathBuf,
    requests: Arc<Mutex<Vec<String>>>,
    actions: Arc<Mutex<HashMap<String, ServerAction>>>,
}

impl MockServer {
    pub fn start() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let socket_path = dir.path().join("attic-test.sock");
        let listener = UnixListener::bind(&socket_path).expect("bind mock socket");

        let requests = Arc::new(Mutex::new(Vec::new()));
        let actions = Arc::new(Mutex::new(HashMap::new()));
        actions.lock().unwrap().insert(
            "ping".to_string(),
            ServerAction::Ok("pong".to_string()),
        );

        let requests_clone = Arc::clone(&requests);
        let actions_clone = Arc::clone(&actions);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                handle_connection(stream, &requests_clone, &actions_clone);
            }
        });

        Self {
            _dir: dir,
            socket_path,
            requests,
            actions,
        }
    }

    /// Endpoint pointing at the mock, owned by the test process itself.
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.socket_path.clone(), std::process::id())
    }

    /// Script the reply for a command. Lookup is by exact command text,
    /// falling back to the longest scripted prefix.
    pub fn set(&self, command: &str, action: ServerAction) {
        self.actions
            .lock()
            .unwrap()
            .insert(command.to_string(), action);
    }

    /// All commands received so far, prefix-stripped, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn handle_connection(
    stream: UnixStream,
    requests: &Arc<Mutex<Vec<String>>>,
    actions: &Arc<Mutex<HashMap<String, ServerAction>>>,
) {
    let Ok(read_half) = stream.try_clone() else {
        return;
    };
    let mut reader = BufReader::new(read_half);
    let mut writer = stream;
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }

        let command = line
            .trim_end_matches('\n')
            .strip_prefix("CMD:")
            .unwrap_or(line.trim_end())
            .to_string();
        requests.lock().unwrap().push(command.clone());

        let action = lookup(actions, &command);
        let keep_going = respond(&mut writer, action);
        if !keep_going {
            return;
        }
    }
}

fn lookup(
    actions: &Arc<Mutex<HashMap<String, ServerAction>>>,
    command: &str,
) -> ServerAction {
    let table = actions.lock().unwrap();
    if let Some(action) = table.get(command) {
        return action.clone();
    }
    table
        .iter()
        .filter(|(key, _)| command.starts_with(key.as_str()))
        .max_by_key(|(key, _)| key.len())
        .map(|(_, action)| action.clone())
        .unwrap_or_else(|| ServerAction::Err(format!("Unknown command: {command}")))
}

/// Returns false when the connection should be dropped.
fn respond(writer: &mut UnixStream, action: ServerAction) -> bool {
    match action {
        ServerAction::Ok(payload) => writer.write_all(format!("OK:{payload}\n").as_bytes()).is_ok(),
        ServerAction::Err(message) => writer
            .write_all(format!("ERR:{message}\n").as_bytes())
            .is_ok(),
        ServerAction::Events(events, payload) => {
            for (kind, data) in events {
                let frame = if data.is_empty() {
                    format!("EVENT:{kind}\n")
                } else {
                    format!("EVENT:{kind} {data}\n")
                };
                if writer.write_all(frame.as_bytes()).is_err() {
                    return false;
                }
            }
            writer.write_all(format!("OK:{payload}\n").as_bytes()).is_ok()
        }
        ServerAction::Raw(bytes) => writer.write_all(bytes.as_bytes()).is_ok(),
        ServerAction::Chunked(chunks) => {
            for chunk in chunks {
                if writer.write_all(&chunk).is_err() || writer.flush().is_err() {
                    return false;
                }
                std::thread::sleep(Duration::from_millis(20));
            }
            true
        }
        ServerAction::Hang => {
            std::thread::sleep(Duration::from_secs(5));
            true
        }
        ServerAction::Close => false,
    }
}
