//! File-backed debug logging that never writes to the UI-owned terminal.
//!
//! The subscriber appends to a single file in the temp directory; the file is
//! reset at startup once it grows past [`LOG_MAX_BYTES`] so long-lived
//! installs do not accumulate unbounded logs.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

const LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// Path to the temp log file we rotate between runs.
pub fn log_file_path() -> PathBuf {
    std::env::temp_dir().join("transterm.log")
}

/// Install the global tracing subscriber writing to [`log_file_path`].
///
/// A `false` flag leaves tracing uninitialized so every `tracing::debug!`
/// call site becomes a no-op. Failures to open the log file are swallowed:
/// logging is diagnostics, never a startup blocker.
pub fn init_logging(enabled: bool) {
    if !enabled {
        return;
    }
    let path = log_file_path();
    if let Ok(meta) = fs::metadata(&path) {
        if meta.len() > LOG_MAX_BYTES {
            let _ = fs::remove_file(&path);
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
