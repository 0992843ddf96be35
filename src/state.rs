use anyhow::Result;
use std::time::Duration;
use tokio::time::Instant;

use crate::clip::ClipRegistry;
use crate::config::{Config, SuggestionConfig};
use crate::pending::PendingUploads;

/// Tunables the handlers consult on every event
#[derive(Debug, Clone)]
pub struct BotSettings {
    /// How long a `!save voice` waits for its media
    pub upload_timeout: Duration,
    /// Suggestions for missed plays
    pub suggestions: SuggestionConfig,
}

impl BotSettings {
    /// Extract handler settings from the loaded config
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            upload_timeout: config.upload_timeout(),
            suggestions: config.suggestions.clone(),
        }
    }
}

/// Everything the handlers share: built once at startup and owned by the
/// dispatcher, never global.
#[derive(Debug)]
pub struct BotState {
    /// Clip storage
    pub registry: ClipRegistry,
    /// Uploads waiting for media
    pub pending: PendingUploads,
    /// Handler settings
    pub settings: BotSettings,
}

impl BotState {
    /// Assemble state from parts
    #[must_use]
    pub fn new(registry: ClipRegistry, settings: BotSettings) -> Self {
        Self {
            registry,
            pending: PendingUploads::new(),
            settings,
        }
    }

    /// Open the clip directory named in `config` and build fresh state
    ///
    /// # Errors
    /// Returns error if the configured directory path can't be expanded
    pub async fn from_config(config: &Config) -> Result<Self> {
        let registry =
            ClipRegistry::open(config.voices_dir()?, config.storage.max_file_size).await;
        Ok(Self::new(registry, BotSettings::from_config(config)))
    }

    /// Expire pending uploads older than the configured timeout
    pub fn sweep(&mut self, now: Instant) -> Vec<String> {
        self.pending
            .sweep_expired(now, self.settings.upload_timeout)
    }
}
