//! Connection handle shared by every view.
//!
//! The handle owns a dedicated socket worker thread and talks to it over
//! bounded channels: control messages (connect/disconnect/emit) go in, decoded
//! transport events come out. It is constructed once at process start, passed
//! by reference to the UI, and outlives every view; views never tear it down.

mod socket;

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::protocol::{ClientCommand, ServerEvent};

/// Max undelivered transport events before the worker applies backpressure.
const EVENT_CHANNEL_CAPACITY: usize = 512;

/// Max pending control messages from the UI side.
const CONTROL_CHANNEL_CAPACITY: usize = 64;

const WORKER_JOIN_TIMEOUT_MS: u64 = 500;
const WORKER_JOIN_POLL_MS: u64 = 10;

/// Everything a view can observe about the connection.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    ConnectError(String),
    Server(ServerEvent),
}

#[derive(Debug)]
pub(crate) enum ControlMessage {
    Connect,
    Disconnect,
    Emit(ClientCommand),
    Shutdown,
}

/// Process-wide handle to the backend socket.
#[derive(Debug)]
pub struct Connection {
    control_tx: Sender<ControlMessage>,
    events_rx: Receiver<TransportEvent>,
    worker: Option<thread::JoinHandle<()>>,
}

impl Connection {
    /// Spawn the socket worker for `server_url`. No dial happens until
    /// [`Connection::connect`] is called.
    #[must_use]
    pub fn open(server_url: impl Into<String>) -> Self {
        let (control_tx, control_rx) = bounded(CONTROL_CHANNEL_CAPACITY);
        let (events_tx, events_rx) = bounded(EVENT_CHANNEL_CAPACITY);
        let url = server_url.into();
        let worker = thread::Builder::new()
            .name("transport".to_string())
            .spawn(move || socket::run_socket_worker(&url, &control_rx, &events_tx))
            .ok();
        if worker.is_none() {
            tracing::warn!("transport worker failed to spawn; connection is inert");
        }
        Self {
            control_tx,
            events_rx,
            worker,
        }
    }

    pub fn connect(&self) {
        let _ = self.control_tx.send(ControlMessage::Connect);
    }

    pub fn disconnect(&self) {
        let _ = self.control_tx.send(ControlMessage::Disconnect);
    }

    /// Fire-and-forget command emission. Commands sent while disconnected are
    /// dropped by the worker.
    pub fn emit(&self, command: ClientCommand) {
        let _ = self.control_tx.send(ControlMessage::Emit(command));
    }

    /// Non-blocking poll for the next transport event.
    pub fn try_recv(&self) -> Option<TransportEvent> {
        self.events_rx.try_recv().ok()
    }

    /// Blocking poll with a deadline, for callers that pace on the socket.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<TransportEvent> {
        self.events_rx.recv_timeout(timeout).ok()
    }

    /// Stop the worker and wait briefly for it to exit.
    pub fn shutdown(mut self) {
        let _ = self.control_tx.send(ControlMessage::Shutdown);
        if let Some(handle) = self.worker.take() {
            join_with_timeout(handle, Duration::from_millis(WORKER_JOIN_TIMEOUT_MS));
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        // Shutdown not called: ask the worker to stop and detach.
        if self.worker.is_some() {
            let _ = self.control_tx.send(ControlMessage::Shutdown);
        }
    }
}

fn join_with_timeout(handle: thread::JoinHandle<()>, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    loop {
        if handle.is_finished() || Instant::now() >= deadline {
            break;
        }
        thread::sleep(Duration::from_millis(WORKER_JOIN_POLL_MS));
    }
    if handle.is_finished() {
        if let Err(err) = handle.join() {
            tracing::debug!("transport worker panicked during shutdown: {err:?}");
        }
    } else {
        tracing::debug!(
            "transport worker did not exit within {}ms; detaching",
            timeout.as_millis()
        );
    }
}
