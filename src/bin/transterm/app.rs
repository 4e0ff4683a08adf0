//! Top-level UI state shared by the event loop and the renderers.

use std::time::{Duration, Instant};

use transterm::storage::ConfigStore;

use crate::captions::CaptionSession;
use crate::console::ConsoleState;

/// How long transient status messages stay visible.
pub(crate) const STATUS_TTL: Duration = Duration::from_secs(3);

/// Which of the two views owns the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum View {
    Console,
    Captions,
}

impl View {
    pub(crate) fn toggled(self) -> Self {
        match self {
            Self::Console => Self::Captions,
            Self::Captions => Self::Console,
        }
    }
}

/// Deadline timers owned by the event loop.
#[derive(Debug, Default)]
pub(crate) struct EventLoopTimers {
    pub(crate) status_clear_deadline: Option<Instant>,
}

pub(crate) struct App {
    pub(crate) view: View,
    pub(crate) console: ConsoleState,
    pub(crate) captions: CaptionSession,
    /// Cursor into [`crate::settings::SETTINGS_ITEMS`].
    pub(crate) selected_setting: usize,
    pub(crate) status: Option<String>,
    pub(crate) store: Option<ConfigStore>,
}

impl App {
    pub(crate) fn new(store: Option<ConfigStore>) -> Self {
        Self {
            view: View::Console,
            console: ConsoleState::new(),
            captions: CaptionSession::new(),
            selected_setting: 0,
            status: None,
            store,
        }
    }
}

/// Show a transient status message and arm its clear deadline.
pub(crate) fn set_status(
    app: &mut App,
    timers: &mut EventLoopTimers,
    now: Instant,
    message: impl Into<String>,
) {
    app.status = Some(message.into());
    timers.status_clear_deadline = Some(now + STATUS_TTL);
}

/// Milliseconds since the epoch, for caption keys and ping timestamps.
pub(crate) fn wall_clock_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
