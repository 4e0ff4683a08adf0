//! Core event/render loop: drain the transport, run deadline tasks, poll input.
//!
//! Handlers run to completion before the next event is dispatched; the only
//! other threads are the transport worker and crossterm's internals, both
//! reached through channels.

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::CrosstermBackend, Terminal};

use transterm::protocol::{ClientCommand, ServerEvent};
use transterm::transport::{Connection, TransportEvent};

use crate::app::{set_status, wall_clock_ms, App, EventLoopTimers, View};
use crate::console::ConfigEdit;
use crate::settings::{SettingsItem, SETTINGS_ITEMS};
use crate::ui;

/// Poll cadence while a caption or status deadline is pending.
const ACTIVE_POLL_MS: u64 = 50;
/// Poll cadence when nothing is due.
const IDLE_POLL_MS: u64 = 100;

pub(crate) fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    timers: &mut EventLoopTimers,
    conn: &Connection,
) -> Result<()> {
    // Initial render so the dashboard is visible before any event arrives.
    terminal.draw(|frame| ui::draw(frame, app))?;

    loop {
        let mut should_draw = false;

        while let Some(event) = conn.try_recv() {
            dispatch_transport_event(app, timers, conn, event);
            should_draw = true;
        }

        let now = Instant::now();
        if run_periodic_tasks(app, timers, now) {
            should_draw = true;
        }

        let mut should_quit = false;
        if event::poll(poll_duration(app, timers))? {
            match event::read()? {
                Event::Key(key) => {
                    should_quit = handle_key_event(app, timers, conn, key);
                    should_draw = true;
                }
                Event::Resize(_, _) => {
                    should_draw = true;
                }
                _ => {}
            }
        }

        if should_draw {
            terminal.draw(|frame| ui::draw(frame, app))?;
        }
        if should_quit {
            break;
        }
    }
    // View teardown: cancel every pending caption timer deterministically.
    app.captions.clear();
    Ok(())
}

fn poll_duration(app: &App, timers: &EventLoopTimers) -> Duration {
    let pending = app.captions.next_deadline().is_some() || timers.status_clear_deadline.is_some();
    if pending {
        Duration::from_millis(ACTIVE_POLL_MS)
    } else {
        Duration::from_millis(IDLE_POLL_MS)
    }
}

/// Timer-driven state transitions. Returns true when a redraw is needed.
pub(crate) fn run_periodic_tasks(
    app: &mut App,
    timers: &mut EventLoopTimers,
    now: Instant,
) -> bool {
    let mut changed = app.captions.tick(now);

    if let Some(deadline) = timers.status_clear_deadline {
        if now >= deadline {
            timers.status_clear_deadline = None;
            app.status = None;
            changed = true;
        }
    }
    changed
}

/// Route one transport event into both views.
pub(crate) fn dispatch_transport_event(
    app: &mut App,
    timers: &mut EventLoopTimers,
    conn: &Connection,
    event: TransportEvent,
) {
    let now = Instant::now();
    match event {
        TransportEvent::Connected => {
            app.console.on_connected();
            conn.emit(ClientCommand::GetMicrophones);
            conn.emit(ClientCommand::GetConfig);
            set_status(app, timers, now, "Connected to server");
        }
        TransportEvent::Disconnected => {
            app.console.on_disconnected();
            set_status(app, timers, now, "Disconnected from server");
        }
        TransportEvent::ConnectError(reason) => {
            tracing::debug!(reason, "connect error");
            app.console.on_disconnected();
        }
        TransportEvent::Server(event) => {
            if let ServerEvent::Translation { text } = &event {
                app.captions.push(text.clone(), wall_clock_ms(), now);
            }
            let store = app.store.clone();
            if let Some(message) = app.console.apply_server_event(&event, store.as_ref()) {
                set_status(app, timers, now, message);
            }
        }
    }
}

/// Interpret one keystroke. Returns true when the app should quit.
pub(crate) fn handle_key_event(
    app: &mut App,
    timers: &mut EventLoopTimers,
    conn: &Connection,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => app.view = app.view.toggled(),
        KeyCode::Char('c') => {
            if app.console.connected {
                conn.disconnect();
            } else {
                conn.connect();
            }
        }
        KeyCode::Char('p') => {
            if app.console.connected {
                conn.emit(ClientCommand::Ping {
                    timestamp: wall_clock_ms(),
                });
                set_status(app, timers, Instant::now(), "Ping sent");
            }
        }
        KeyCode::Char('s') => {
            if app.console.connected {
                conn.emit(if app.console.session_active {
                    ClientCommand::StopTranslation
                } else {
                    ClientCommand::StartTranslation
                });
            }
        }
        KeyCode::Up if app.view == View::Console => {
            app.selected_setting = app.selected_setting.saturating_sub(1);
        }
        KeyCode::Down if app.view == View::Console => {
            app.selected_setting = (app.selected_setting + 1).min(SETTINGS_ITEMS.len() - 1);
        }
        KeyCode::Left if app.view == View::Console => {
            apply_selected_edit(app, timers, conn, false, false);
        }
        KeyCode::Right if app.view == View::Console => {
            apply_selected_edit(app, timers, conn, true, false);
        }
        KeyCode::Enter if app.view == View::Console => {
            apply_selected_edit(app, timers, conn, true, true);
        }
        _ => {}
    }
    false
}

/// Translate the cursor position plus key direction into a config edit.
fn apply_selected_edit(
    app: &mut App,
    timers: &mut EventLoopTimers,
    conn: &Connection,
    forward: bool,
    activate: bool,
) {
    let item = SETTINGS_ITEMS[app.selected_setting.min(SETTINGS_ITEMS.len() - 1)];
    let edit = match (item, activate) {
        (SettingsItem::Model, false) => ConfigEdit::CycleModel { forward },
        (SettingsItem::UseGpu, _) => ConfigEdit::ToggleGpu,
        (SettingsItem::Microphone, false) => ConfigEdit::CycleMicrophone { forward },
        (SettingsItem::Microphone, true) => ConfigEdit::ApplyMicrophone,
        (SettingsItem::SampleRate, false) => ConfigEdit::StepSampleRate { forward },
        (SettingsItem::ChunkDuration, false) => ConfigEdit::StepChunkDuration { forward },
        (SettingsItem::VolumeThreshold, false) => ConfigEdit::StepVolumeThreshold { forward },
        // Enter on a slider or the model row has no separate apply action.
        _ => return,
    };
    let store = app.store.clone();
    let effect = app.console.apply_edit(edit, store.as_ref());
    if let Some(command) = effect.command {
        conn.emit(command);
    }
    if let Some(message) = effect.status {
        set_status(app, timers, Instant::now(), message);
    }
}
