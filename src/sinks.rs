//! Alert delivery channels owned by the application layer.

use std::io::{self, Write};

use colored::Colorize;
use xpense_core::{AlertSink, DeliveryError};
use xpense_domain::{Alert, AlertKind};

/// Foreground delivery: prints each alert as a single highlighted line.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleAlertSink {
    colored: bool,
}

impl Default for ConsoleAlertSink {
    fn default() -> Self {
        Self { colored: true }
    }
}

impl ConsoleAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain() -> Self {
        Self { colored: false }
    }

    pub fn render(&self, alert: &Alert) -> String {
        let (label, icon) = match alert.kind {
            AlertKind::Exceeded => ("ALERT", "[x]"),
            AlertKind::Warning => ("WARNING", "[!]"),
            AlertKind::Reminder => ("REMINDER", "[i]"),
        };
        let line = format!("{label}: {icon} {}: {}", alert.title(), alert.message());
        if !self.colored {
            return line;
        }
        match alert.kind {
            AlertKind::Exceeded => line.bright_red().bold().to_string(),
            AlertKind::Warning => line.bright_yellow().to_string(),
            AlertKind::Reminder => line.bright_cyan().to_string(),
        }
    }
}

impl AlertSink for ConsoleAlertSink {
    fn emit(&self, alert: &Alert) -> Result<(), DeliveryError> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", self.render(alert))?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xpense_domain::{AlertScope, PeriodKind};

    #[test]
    fn plain_render_includes_title_and_message() {
        let alert = Alert::threshold(
            AlertKind::Warning,
            AlertScope::Category("Food".into()),
            190.0,
            200.0,
            95,
            PeriodKind::Monthly,
        );
        let line = ConsoleAlertSink::plain().render(&alert);
        assert!(line.starts_with("WARNING: [!] Food Budget Warning"));
        assert!(line.contains("95%"));
    }
}
