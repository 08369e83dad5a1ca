//! Two-step delete confirmation.
//!
//! # Invariants
//! - At most one id is armed at a time.
//! - An armed id expires after `timeout`; an expired arm behaves as unarmed.
//! - Only a second click on the same live armed id confirms.

use crate::model::application::ApplicationId;
use std::time::{Duration, Instant};

/// Time an armed delete stays live.
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(3);

/// Result of one delete click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteClick {
    /// First click: the id is now armed, nothing was deleted.
    Armed,
    /// Second click within the timeout: the caller should commit the delete.
    Confirmed,
}

#[derive(Debug, Clone)]
pub struct DeleteConfirm {
    armed: Option<(ApplicationId, Instant)>,
    timeout: Duration,
}

impl Default for DeleteConfirm {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIRM_TIMEOUT)
    }
}

impl DeleteConfirm {
    pub fn new(timeout: Duration) -> Self {
        Self {
            armed: None,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Registers a delete click on `id` at `now`.
    pub fn click(&mut self, id: ApplicationId, now: Instant) -> DeleteClick {
        if self.armed_id(now) == Some(id) {
            self.armed = None;
            return DeleteClick::Confirmed;
        }

        self.armed = Some((id, now));
        DeleteClick::Armed
    }

    /// The id currently armed, if its timer has not run out.
    pub fn armed_id(&self, now: Instant) -> Option<ApplicationId> {
        match self.armed {
            Some((id, armed_at)) if now.saturating_duration_since(armed_at) < self.timeout => {
                Some(id)
            }
            _ => None,
        }
    }

    pub fn is_armed(&self, id: ApplicationId, now: Instant) -> bool {
        self.armed_id(now) == Some(id)
    }

    pub fn disarm(&mut self) {
        self.armed = None;
    }
}
