//! Command-line surface so shell flags and environment resolve consistently.

use anyhow::{bail, Result};
use clap::Parser;

pub(crate) const DEFAULT_SERVER_URL: &str = "ws://127.0.0.1:8000/ws";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "transterm",
    version,
    about = "Terminal dashboard for a live speech-translation backend"
)]
pub(crate) struct ConsoleArgs {
    /// WebSocket address of the translation backend.
    #[arg(long, env = "TRANSTERM_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub(crate) server_url: String,

    /// Write debug logs to the temp log file.
    #[arg(long)]
    pub(crate) logs: bool,

    /// Disable all file logging (overrides --logs).
    #[arg(long)]
    pub(crate) no_logs: bool,

    /// Start without dialing the backend; connect later with `c`.
    #[arg(long)]
    pub(crate) offline: bool,

    /// Print a diagnostic report and exit.
    #[arg(long)]
    pub(crate) doctor: bool,
}

impl ConsoleArgs {
    pub(crate) fn validate(&self) -> Result<()> {
        if !self.server_url.starts_with("ws://") && !self.server_url.starts_with("wss://") {
            bail!(
                "server url must be a ws:// or wss:// address, got '{}'",
                self.server_url
            );
        }
        Ok(())
    }

    pub(crate) fn logging_enabled(&self) -> bool {
        self.logs && !self.no_logs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_local_backend() {
        let args = ConsoleArgs::parse_from(["test-app"]);
        assert_eq!(args.server_url, DEFAULT_SERVER_URL);
        assert!(!args.offline);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_websocket_urls() {
        let args = ConsoleArgs::parse_from(["test-app", "--server-url", "http://127.0.0.1:8000"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn secure_websocket_urls_are_accepted() {
        let args = ConsoleArgs::parse_from(["test-app", "--server-url", "wss://host:8000/ws"]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn no_logs_overrides_logs() {
        let args = ConsoleArgs::parse_from(["test-app", "--logs", "--no-logs"]);
        assert!(!args.logging_enabled());
        let args = ConsoleArgs::parse_from(["test-app", "--logs"]);
        assert!(args.logging_enabled());
    }
}
