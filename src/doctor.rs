//! Key/value diagnostic report printed by `--doctor` before the UI starts.

use std::fmt::Display;

/// Accumulates sections of `key: value` lines for plain-text output.
#[derive(Debug, Default)]
pub struct DoctorReport {
    lines: Vec<String>,
}

impl DoctorReport {
    #[must_use]
    pub fn new(app_name: &str) -> Self {
        let mut report = Self::default();
        report.section(app_name);
        report.push_kv("version", env!("CARGO_PKG_VERSION"));
        report
    }

    pub fn section(&mut self, name: &str) {
        if !self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.lines.push(format!("[{name}]"));
    }

    pub fn push_kv(&mut self, key: &str, value: impl Display) {
        self.lines.push(format!("  {key}: {value}"));
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}
