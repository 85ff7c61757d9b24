//! Notification permission gate.
//!
//! # Responsibility
//! - Decide whether the scheduler may register triggers right now.
//! - Run at most one remediation cycle (prompt and/or alarm settings).
//!
//! # Invariants
//! - An already fully authorized host is never prompted.
//! - One call never prompts more than once and never loops.
//! - Scheduler errors read as "not authorized"; they never propagate.

use crate::notifier::{Notifier, NotifierResult};
use log::{info, warn};

/// Authorization gate over a [`Notifier`].
pub struct PermissionGate<'a, N: Notifier + ?Sized> {
    notifier: &'a N,
}

impl<'a, N: Notifier + ?Sized> PermissionGate<'a, N> {
    pub fn new(notifier: &'a N) -> Self {
        Self { notifier }
    }

    /// Returns whether notifications and exact alarms are both allowed,
    /// after at most one remediation attempt.
    pub async fn ensure_authorized(&self) -> bool {
        match self.check_and_remediate().await {
            Ok(authorized) => {
                info!(
                    "event=permission_check module=permission status=ok authorized={}",
                    authorized
                );
                authorized
            }
            Err(err) => {
                warn!(
                    "event=permission_check module=permission status=error error={}",
                    err
                );
                false
            }
        }
    }

    async fn check_and_remediate(&self) -> NotifierResult<bool> {
        let settings = self.notifier.notification_settings().await?;
        if settings.is_fully_authorized() {
            return Ok(true);
        }

        let settings = if settings.is_authorized() {
            settings
        } else {
            self.notifier.request_authorization().await?
        };
        if !settings.has_alarm_capability() {
            self.notifier.open_alarm_settings().await?;
        }

        let settings = self.notifier.notification_settings().await?;
        Ok(settings.is_fully_authorized())
    }
}
