use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides the config file location
pub const CONFIG_ENV_VAR: &str = "VOICE_CLIP_BOT_CONFIG";

const DEFAULT_CONFIG: &str = r#"[storage]
voices_dir = "voices"
max_file_size = 16777216

[upload]
timeout_secs = 120
sweep_interval_secs = 10

[suggestions]
enabled = true
threshold = 0.85

[retention]
max_age_days = 0
cleanup_interval_hours = 24

[telemetry]
enabled = false
log_path = "~/.voice-clip-bot/bot.log"
level = "info"
"#;

/// Top-level bot configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Clip storage settings
    pub storage: StorageConfig,
    /// Pending upload settings
    pub upload: UploadConfig,
    /// "Did you mean" suggestions on missed plays
    #[serde(default)]
    pub suggestions: SuggestionConfig,
    /// Age-based clip pruning
    #[serde(default)]
    pub retention: RetentionConfig,
    /// Logging output
    pub telemetry: TelemetryConfig,
}

/// Where clips live and how large they may be
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding `<name><ext>` files
    pub voices_dir: String,
    /// Largest accepted payload in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
}

/// Timing of the save-then-send correlation window
#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Seconds a `!save voice` waits for its media
    pub timeout_secs: u64,
    /// Seconds between periodic expiry sweeps
    pub sweep_interval_secs: u64,
}

/// Fuzzy suggestions for clip names that were not found
#[derive(Debug, Deserialize, Clone)]
pub struct SuggestionConfig {
    /// Whether suggestions are offered at all
    pub enabled: bool,
    /// Minimum Jaro-Winkler similarity (0.0 - 1.0)
    pub threshold: f64,
}

/// Age-based pruning of stored clips
#[derive(Debug, Deserialize, Clone)]
pub struct RetentionConfig {
    /// Delete clips older than this many days (0 disables)
    pub max_age_days: u32,
    /// Hours between pruning passes
    pub cleanup_interval_hours: u32,
}

/// Log destination and verbosity
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    /// Write logs to `log_path` instead of stdout
    pub enabled: bool,
    /// Log file path (supports `~/`)
    pub log_path: String,
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,
}

const fn default_max_file_size() -> usize {
    16 * 1024 * 1024
}

fn default_level() -> String {
    "info".to_owned()
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 0.85,
        }
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_age_days: 0,
            cleanup_interval_hours: 24,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                voices_dir: "voices".to_owned(),
                max_file_size: default_max_file_size(),
            },
            upload: UploadConfig {
                timeout_secs: 120,
                sweep_interval_secs: 10,
            },
            suggestions: SuggestionConfig::default(),
            retention: RetentionConfig::default(),
            telemetry: TelemetryConfig {
                enabled: false,
                log_path: "~/.voice-clip-bot/bot.log".to_owned(),
                level: default_level(),
            },
        }
    }
}

impl Config {
    /// Load config from `$VOICE_CLIP_BOT_CONFIG` or ~/.voice-clip-bot.toml
    ///
    /// A missing file is created with defaults first.
    ///
    /// # Errors
    /// Returns error if the file can't be created, read or parsed
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default(&config_path).context("failed to create default config")?;
        }

        Self::load_from(&config_path)
    }

    /// Load config from an explicit path
    ///
    /// # Errors
    /// Returns error if the file can't be read or parsed
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        Self::from_toml_str(&contents)
    }

    /// Parse config from TOML text
    ///
    /// # Errors
    /// Returns error if the TOML is malformed or a required field is missing
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse config TOML")
    }

    fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::expand_path(&path);
        }
        let home = std::env::var("HOME").context("HOME environment variable not set")?;
        Ok(PathBuf::from(home).join(".voice-clip-bot.toml"))
    }

    fn create_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("failed to create config directory")?;
        }
        fs::write(path, DEFAULT_CONFIG).context("failed to write default config")?;
        Ok(())
    }

    /// Expand ~ in paths to home directory
    ///
    /// # Errors
    /// Returns error if the path starts with `~/` and HOME is unset
    pub fn expand_path(path: &str) -> Result<PathBuf> {
        if let Some(stripped) = path.strip_prefix("~/") {
            let home = std::env::var("HOME").context("HOME environment variable not set")?;
            Ok(PathBuf::from(home).join(stripped))
        } else {
            Ok(PathBuf::from(path))
        }
    }

    /// Resolved clip directory
    ///
    /// # Errors
    /// Returns error if `~/` expansion fails
    pub fn voices_dir(&self) -> Result<PathBuf> {
        Self::expand_path(&self.storage.voices_dir)
    }

    /// How long a pending upload stays armed
    #[must_use]
    pub const fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload.timeout_secs)
    }

    /// Interval between periodic expiry sweeps (never zero)
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.upload.sweep_interval_secs.max(1))
    }

    /// Clip retention window, `None` when pruning is disabled
    #[must_use]
    pub fn retention_max_age(&self) -> Option<Duration> {
        (self.retention.max_age_days > 0)
            .then(|| Duration::from_secs(u64::from(self.retention.max_age_days) * 24 * 60 * 60))
    }

    /// Interval between pruning passes (never zero)
    #[must_use]
    pub fn retention_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.retention.cleanup_interval_hours.max(1)) * 60 * 60)
    }
}
