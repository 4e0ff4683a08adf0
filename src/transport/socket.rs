//! Blocking WebSocket worker behind the connection handle.
//!
//! The socket lives on one thread and is polled cooperatively: a short read
//! timeout keeps the loop responsive to control messages without busy-waiting.

use std::net::TcpStream;
use std::time::Duration;

use anyhow::Result;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use super::{ControlMessage, TransportEvent};
use crate::protocol::ServerEvent;

/// Read timeout while connected; bounds the loop's control-message latency.
const READ_TIMEOUT_MS: u64 = 50;

/// Control-channel wait while idle, when there is no socket to poll.
const IDLE_CONTROL_WAIT_MS: u64 = 100;

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

pub(crate) fn run_socket_worker(
    url: &str,
    control_rx: &Receiver<ControlMessage>,
    events_tx: &Sender<TransportEvent>,
) {
    let mut socket: Option<Socket> = None;
    loop {
        if socket.is_none() {
            match control_rx.recv_timeout(Duration::from_millis(IDLE_CONTROL_WAIT_MS)) {
                Ok(message) => {
                    if handle_control(message, &mut socket, url, events_tx) {
                        return;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
        loop {
            match control_rx.try_recv() {
                Ok(message) => {
                    if handle_control(message, &mut socket, url, events_tx) {
                        return;
                    }
                }
                Err(_) => break,
            }
        }
        if let Some(ws) = socket.as_mut() {
            match ws.read() {
                Ok(Message::Text(frame)) => dispatch_frame(&frame, events_tx),
                Ok(Message::Close(_)) => {
                    socket = None;
                    let _ = events_tx.send(TransportEvent::Disconnected);
                }
                Ok(_) => {}
                Err(tungstenite::Error::Io(err))
                    if matches!(
                        err.kind(),
                        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                    ) => {}
                Err(err) => {
                    tracing::debug!(%err, "socket read failed; treating as disconnect");
                    socket = None;
                    let _ = events_tx.send(TransportEvent::Disconnected);
                }
            }
        }
    }
}

/// Apply one control message. Returns true when the worker should exit.
fn handle_control(
    message: ControlMessage,
    socket: &mut Option<Socket>,
    url: &str,
    events_tx: &Sender<TransportEvent>,
) -> bool {
    match message {
        ControlMessage::Connect => {
            if socket.is_some() {
                return false;
            }
            match dial(url) {
                Ok(ws) => {
                    *socket = Some(ws);
                    let _ = events_tx.send(TransportEvent::Connected);
                }
                Err(err) => {
                    tracing::debug!(url, %err, "connect failed");
                    let _ = events_tx.send(TransportEvent::ConnectError(err.to_string()));
                }
            }
        }
        ControlMessage::Disconnect => {
            if let Some(mut ws) = socket.take() {
                let _ = ws.close(None);
                let _ = events_tx.send(TransportEvent::Disconnected);
            }
        }
        ControlMessage::Emit(command) => {
            let Some(ws) = socket.as_mut() else {
                tracing::debug!(?command, "dropping command emitted while disconnected");
                return false;
            };
            match command.to_frame() {
                Ok(frame) => {
                    if let Err(err) = ws.send(Message::Text(frame)) {
                        tracing::debug!(%err, "socket write failed; treating as disconnect");
                        *socket = None;
                        let _ = events_tx.send(TransportEvent::Disconnected);
                    }
                }
                Err(err) => tracing::debug!(%err, "command failed to encode; dropped"),
            }
        }
        ControlMessage::Shutdown => {
            if let Some(mut ws) = socket.take() {
                let _ = ws.close(None);
            }
            return true;
        }
    }
    false
}

fn dial(url: &str) -> Result<Socket> {
    let (mut socket, _response) = tungstenite::connect(url)?;
    if let MaybeTlsStream::Plain(stream) = socket.get_mut() {
        stream.set_read_timeout(Some(Duration::from_millis(READ_TIMEOUT_MS)))?;
    }
    Ok(socket)
}

/// Decode and forward one inbound frame; anything unreadable is dropped.
fn dispatch_frame(frame: &str, events_tx: &Sender<TransportEvent>) {
    match ServerEvent::decode(frame) {
        Ok(Some(event)) => {
            let _ = events_tx.send(TransportEvent::Server(event));
        }
        Ok(None) => tracing::debug!(frame, "ignoring unknown event"),
        Err(err) => tracing::debug!(%err, "dropping malformed frame"),
    }
}
