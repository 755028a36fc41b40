use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomoConfig {
    pub reaction: ReactionTiming,
    pub session: SessionTiming,
}

impl TomoConfig {
    /// Load config from a TOML file, falling back to defaults for missing
    /// fields. After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: TomoConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if the file doesn't exist, return defaults
    /// with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("TOMO_REACT_DELAY_MS") {
            if let Ok(n) = v.parse() {
                self.reaction.react_delay_ms = n;
            }
        }
        if let Ok(v) = std::env::var("TOMO_COMPLIMENT_DELAY_MS") {
            if let Ok(n) = v.parse() {
                self.reaction.compliment_delay_ms = n;
            }
        }
        if let Ok(v) = std::env::var("TOMO_ADVICE_DELAY_MS") {
            if let Ok(n) = v.parse() {
                self.reaction.advice_delay_ms = n;
            }
        }
        if let Ok(v) = std::env::var("TOMO_MOOD_RESET_SECS") {
            if let Ok(n) = v.parse() {
                self.session.mood_reset_secs = n;
            }
        }
        if let Ok(v) = std::env::var("TOMO_WAKE_GRACE_MINUTES") {
            if let Ok(n) = v.parse() {
                self.session.wake_grace_minutes = n;
            }
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

/// Simulated latencies of the mock reaction service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReactionTiming {
    /// Delay before a habit-report reaction arrives.
    pub react_delay_ms: u64,
    /// Delay before a meal compliment arrives (longer: "looking at the photo").
    pub compliment_delay_ms: u64,
    /// Delay before scheduling advice arrives.
    pub advice_delay_ms: u64,
}

impl Default for ReactionTiming {
    fn default() -> Self {
        Self {
            react_delay_ms: 1_000,
            compliment_delay_ms: 2_000,
            advice_delay_ms: 1_000,
        }
    }
}

impl ReactionTiming {
    /// Zero latency, for tests.
    pub fn instant() -> Self {
        Self {
            react_delay_ms: 0,
            compliment_delay_ms: 0,
            advice_delay_ms: 0,
        }
    }

    pub fn react_delay(&self) -> Duration {
        Duration::from_millis(self.react_delay_ms)
    }

    pub fn compliment_delay(&self) -> Duration {
        Duration::from_millis(self.compliment_delay_ms)
    }

    pub fn advice_delay(&self) -> Duration {
        Duration::from_millis(self.advice_delay_ms)
    }
}

/// Timing knobs of the session state machine itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionTiming {
    /// How long the happy mood lingers before reverting to neutral.
    pub mood_reset_secs: u64,
    /// Grace window after the target wake time before a report counts as late.
    pub wake_grace_minutes: i64,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            mood_reset_secs: 5,
            wake_grace_minutes: 30,
        }
    }
}

impl SessionTiming {
    pub fn mood_reset(&self) -> Duration {
        Duration::from_secs(self.mood_reset_secs)
    }
}

// ============================================================================
// Tests
// ============================================================================
