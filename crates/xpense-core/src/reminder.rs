use tracing::{debug, warn};
use xpense_domain::Alert;

use crate::{AlertSink, Clock, CoreError, NotificationHistoryStore};

/// Daily "record your expenses" nudge, sent at most once per calendar day.
pub struct ReminderService<'a> {
    history: &'a dyn NotificationHistoryStore,
    sink: &'a dyn AlertSink,
    clock: &'a dyn Clock,
}

impl<'a> ReminderService<'a> {
    pub fn new(
        history: &'a dyn NotificationHistoryStore,
        sink: &'a dyn AlertSink,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            history,
            sink,
            clock,
        }
    }

    /// Returns `true` when a reminder was delivered.
    pub fn send_if_due(&self, enabled: bool) -> Result<bool, CoreError> {
        if !enabled {
            debug!("daily reminder is disabled");
            return Ok(false);
        }
        let today = self.clock.today();
        let mut history = self.history.load()?;
        if history.last_reminder == Some(today) {
            debug!(%today, "daily reminder already sent");
            return Ok(false);
        }
        match self.sink.emit(&Alert::reminder()) {
            Ok(()) => {
                history.last_reminder = Some(today);
                self.history.save(&history)?;
                Ok(true)
            }
            Err(err) => {
                warn!(error = %err, "daily reminder delivery failed");
                Ok(false)
            }
        }
    }
}
