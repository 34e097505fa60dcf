//! Synchronous client for the AtticServer control socket.
//!
//! One client owns one connection. `send` is serialized by a mutex: the
//! protocol allows a single in-flight command, and interleaved writes would
//! corrupt framing. Event frames observed while waiting for a reply are
//! queued and handed out through `drain_events` in arrival order.

use std::collections::VecDeque;
use std::io::ErrorKind;
use std::io::Read;
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use attic_common::mutex_lock_or_recover;
use attic_protocol::encode_command;
use attic_protocol::parse_frame;
use attic_protocol::Event;
use attic_protocol::Frame;
use attic_protocol::Reply;
use attic_protocol::COMMAND_TIMEOUT;
use attic_protocol::CONNECTION_TIMEOUT;
use attic_protocol::MAX_RECV;
use attic_protocol::PING_TIMEOUT;

use crate::discover::Endpoint;
use crate::error::ClientError;

/// Accumulates raw socket bytes and surfaces complete newline-terminated
/// lines. A line spanning several reads is only surfaced once complete;
/// bytes belonging to the next frame stay buffered.
#[derive(Default)]
struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    fn next_line(&mut self) -> Option<String> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;
        let rest = self.buf.split_off(pos + 1);
        let mut line = std::mem::replace(&mut self.buf, rest);
        line.pop();
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    fn clear(&mut self) {
        self.buf.clear();
    }
}

struct Inner {
    stream: Option<UnixStream>,
    rx: LineBuffer,
    path: Option<PathBuf>,
    command_timeout: Duration,
}

pub struct AtticClient {
    inner: Mutex<Inner>,
    events: Mutex<VecDeque<Event>>,
}

impl Default for AtticClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AtticClient {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                stream: None,
                rx: LineBuffer::default(),
                path: None,
                command_timeout: COMMAND_TIMEOUT,
            }),
            events: Mutex::new(VecDeque::new()),
        }
    }

    /// Override the default timeout applied by [`AtticClient::send`].
    pub fn set_command_timeout(&self, timeout: Duration) {
        mutex_lock_or_recover(&self.inner).command_timeout = timeout;
    }

    pub fn is_connected(&self) -> bool {
        mutex_lock_or_recover(&self.inner).stream.is_some()
    }

    /// Path of the currently connected socket, if any.
    pub fn connected_path(&self) -> Option<PathBuf> {
        mutex_lock_or_recover(&self.inner).path.clone()
    }

    /// Connect to a server socket and verify it with a ping handshake.
    ///
    /// The server must answer `ping` with the literal payload `pong` within
    /// the ping timeout; anything else tears the connection down and
    /// surfaces [`ClientError::HandshakeFailed`].
    pub fn connect(&self, endpoint: &Endpoint) -> Result<(), ClientError> {
        {
            let mut inner = mutex_lock_or_recover(&self.inner);
            if inner.stream.is_some() {
                return Err(ClientError::AlreadyConnected);
            }

            let stream =
                UnixStream::connect(&endpoint.path).map_err(ClientError::ConnectFailed)?;
            stream
                .set_read_timeout(Some(CONNECTION_TIMEOUT))
                .map_err(ClientError::ConnectFailed)?;
            stream
                .set_write_timeout(Some(CONNECTION_TIMEOUT))
                .map_err(ClientError::ConnectFailed)?;

            inner.stream = Some(stream);
            inner.path = Some(endpoint.path.clone());
            inner.rx.clear();
        }

        tracing::debug!(path = %endpoint.path.display(), "connected, verifying with ping");
        match self.send_with_timeout("ping", PING_TIMEOUT) {
            Ok(reply) if reply.success && reply.payload == "pong" => {
                tracing::info!(path = %endpoint.path.display(), pid = endpoint.pid, "connected to AtticServer");
                Ok(())
            }
            Ok(reply) => {
                self.disconnect();
                Err(ClientError::HandshakeFailed(format!(
                    "unexpected ping reply {:?}",
                    reply.payload
                )))
            }
            Err(err) => {
                self.disconnect();
                Err(ClientError::HandshakeFailed(err.to_string()))
            }
        }
    }

    /// Send one command and wait for its reply with the default timeout.
    pub fn send(&self, command: &str) -> Result<Reply, ClientError> {
        let timeout = mutex_lock_or_recover(&self.inner).command_timeout;
        self.send_with_timeout(command, timeout)
    }

    /// Send one command and wait for its reply.
    ///
    /// Event frames received while waiting are queued for `drain_events`.
    /// Timeouts, a closed peer, and I/O errors all disconnect the client;
    /// the three are reported as distinct errors.
    pub fn send_with_timeout(
        &self,
        command: &str,
        timeout: Duration,
    ) -> Result<Reply, ClientError> {
        let mut inner = mutex_lock_or_recover(&self.inner);
        let deadline = Instant::now() + timeout;
        let result = Self::send_locked(&mut inner, &self.events, command, deadline);
        if let Err(err) = &result {
            if err.is_disconnect() {
                tracing::warn!(error = %err, "connection lost");
                inner.stream = None;
                inner.path = None;
                inner.rx.clear();
            }
        }
        result
    }

    fn send_locked(
        inner: &mut Inner,
        events: &Mutex<VecDeque<Event>>,
        command: &str,
        deadline: Instant,
    ) -> Result<Reply, ClientError> {
        let Inner { stream, rx, .. } = inner;
        let stream = stream.as_mut().ok_or(ClientError::NotConnected)?;

        tracing::debug!(command, "sending command");
        stream
            .write_all(encode_command(command).as_bytes())
            .map_err(ClientError::ConnectionLost)?;
        stream.flush().map_err(ClientError::ConnectionLost)?;

        loop {
            if let Some(line) = rx.next_line() {
                match parse_frame(&line)? {
                    Frame::Event(event) => {
                        tracing::debug!(kind = %event.kind, data = %event.data, "queued async event");
                        mutex_lock_or_recover(events).push_back(event);
                        continue;
                    }
                    Frame::Reply(reply) => return Ok(reply),
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(ClientError::Timeout);
            }
            stream
                .set_read_timeout(Some(remaining))
                .map_err(ClientError::ConnectionLost)?;

            let mut chunk = [0u8; MAX_RECV];
            match stream.read(&mut chunk) {
                Ok(0) => return Err(ClientError::ConnectionClosed),
                Ok(n) => rx.extend(&chunk[..n]),
                Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Err(ClientError::Timeout)
                }
                Err(err) => return Err(ClientError::ConnectionLost(err)),
            }
        }
    }

    /// Atomically empty the event queue, preserving arrival order.
    pub fn drain_events(&self) -> Vec<Event> {
        mutex_lock_or_recover(&self.events).drain(..).collect()
    }

    /// Close the connection. Safe to call when already disconnected.
    pub fn disconnect(&self) {
        let mut inner = mutex_lock_or_recover(&self.inner);
        if inner.stream.take().is_some() {
            tracing::info!("disconnected from AtticServer");
        }
        inner.path = None;
        inner.rx.clear();
    }
}
