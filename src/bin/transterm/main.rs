//! transterm entrypoint so the transport, views, and timers start as one runtime.
//!
//! Connects to a live speech-translation backend over one WebSocket and drives
//! two views from a single event loop: a console dashboard (configuration,
//! logs, transcript) and a rolling caption overlay.
//!
//! # Architecture
//!
//! - Transport worker: owns the socket, decodes event envelopes into a channel
//! - Event loop: drains transport events, runs deadline timers, polls input
//! - Views: borrow shared state; neither owns or tears down the connection

mod app;
mod captions;
mod cli;
mod console;
mod event_loop;
mod settings;
mod ui;

use std::io;

use anyhow::Result;
use clap::Parser;
use ratatui::{backend::CrosstermBackend, Terminal};

use transterm::doctor::DoctorReport;
use transterm::storage::ConfigStore;
use transterm::terminal_restore::TerminalRestoreGuard;
use transterm::transport::Connection;
use transterm::{init_logging, log_file_path};

use crate::app::{App, EventLoopTimers};
use crate::cli::ConsoleArgs;
use crate::event_loop::run_event_loop;

fn build_doctor_report(args: &ConsoleArgs, store: Option<&ConfigStore>) -> DoctorReport {
    let mut report = DoctorReport::new("transterm");
    report.push_kv("log_file", log_file_path().display());
    report.section("Connection");
    report.push_kv("server_url", &args.server_url);
    report.push_kv("autoconnect", !args.offline);
    report.section("Storage");
    match store {
        Some(store) => {
            report.push_kv("config_path", store.path().display());
            report.push_kv("config_present", store.path().exists());
        }
        None => report.push_kv("config_path", "unavailable"),
    }
    report
}

fn main() -> Result<()> {
    let args = ConsoleArgs::parse();
    args.validate()?;
    init_logging(args.logging_enabled());
    tracing::debug!("=== transterm started ===");

    let store = ConfigStore::open_default();

    if args.doctor {
        print!("{}", build_doctor_report(&args, store.as_ref()).render());
        return Ok(());
    }

    // Persisted configuration loads before the first render; the controls
    // panel stays behind a placeholder until this completes.
    let saved = store.as_ref().and_then(ConfigStore::load);

    let conn = Connection::open(args.server_url.clone());
    if !args.offline {
        conn.connect();
    }

    let mut app = App::new(store);
    if let Some(config) = saved {
        app.console.adopt_saved_config(config);
    }
    app.console.config_loaded = true;

    let terminal_guard = TerminalRestoreGuard::new();
    terminal_guard.enable_raw_mode()?;
    let mut stdout = io::stdout();
    terminal_guard.enter_alt_screen(&mut stdout)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut timers = EventLoopTimers::default();
    let result = run_event_loop(&mut terminal, &mut app, &mut timers, &conn);

    drop(terminal);
    terminal_guard.restore();
    conn.shutdown();
    tracing::debug!("=== transterm exiting ===");
    result
}
