use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::ClipError;

/// Result of arming an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Armed {
    /// Nothing was pending before
    New,
    /// The same name was already pending; its timer starts over
    Restarted,
}

/// Names waiting for their voice message to arrive.
///
/// Holds at most one entry at a time: [`PendingUploads::begin`] refuses a
/// second, different name. Expiry is driven by [`PendingUploads::sweep_expired`]
/// rather than timers, so removal is always idempotent.
#[derive(Debug, Default)]
pub struct PendingUploads {
    entries: HashMap<String, Instant>,
}

impl PendingUploads {
    /// Empty tracker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm an upload for `name` at `now`.
    ///
    /// # Errors
    /// Returns [`ClipError::Conflict`] if a different name is pending; the
    /// outstanding entry is left untouched
    pub fn begin(&mut self, name: &str, now: Instant) -> Result<Armed, ClipError> {
        if let Some(pending) = self.entries.keys().find(|pending| *pending != name) {
            return Err(ClipError::Conflict {
                pending: pending.clone(),
            });
        }

        let armed = match self.entries.insert(name.to_owned(), now) {
            Some(_) => Armed::Restarted,
            None => Armed::New,
        };
        debug!(clip = name, ?armed, "pending upload armed");
        Ok(armed)
    }

    /// Whether `name` is waiting for media
    #[must_use]
    pub fn is_pending(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Stop waiting for `name`. Returns whether an entry was removed.
    pub fn end(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    /// The outstanding upload, if any (earliest armed wins)
    #[must_use]
    pub fn any_pending(&self) -> Option<&str> {
        self.entries
            .iter()
            .min_by_key(|(_, armed_at)| **armed_at)
            .map(|(name, _)| name.as_str())
    }

    /// Number of pending uploads
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is pending
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry older than `ttl` as of `now`; returns the expired names
    pub fn sweep_expired(&mut self, now: Instant, ttl: Duration) -> Vec<String> {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, armed_at)| now.saturating_duration_since(**armed_at) > ttl)
            .map(|(name, _)| name.clone())
            .collect();

        for name in &expired {
            self.entries.remove(name);
            info!(clip = %name, "pending upload expired");
        }

        expired
    }
}
