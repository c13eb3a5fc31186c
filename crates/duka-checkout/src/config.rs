//! # Checkout Configuration
//!
//! Configuration management for the checkout engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     DUKA_STORE_NAME="Mama Mboga"                                       │
//! │     DUKA_STEP_INTERVAL_MS=2200                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/duka-pos/checkout.toml (Linux)                           │
//! │     ~/Library/Application Support/com.duka.pos/checkout.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     2200ms step interval, 900ms completion delay                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # checkout.toml
//! [store]
//! name = "Mama Mboga Greengrocer"
//!
//! [flow]
//! step_interval_ms = 2200      # pause between confirmation steps
//! completion_delay_ms = 900    # pause after the final step, before commit
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{CheckoutError, CheckoutResult};

// =============================================================================
// Store Configuration
// =============================================================================

/// Configuration for the store this till belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Human-readable store name, shown on screens and receipts.
    #[serde(default = "default_store_name")]
    pub name: String,
}

fn default_store_name() -> String {
    "Duka POS".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            name: default_store_name(),
        }
    }
}

// =============================================================================
// Flow Settings
// =============================================================================

/// Timing for the confirmation progress display.
///
/// The M-Pesa STK push has no webhook in this setup, so the processing screen
/// walks through its steps on a timer and fires the commit after the last
/// one. Tests shrink these to keep runs fast; the engine reads them once at
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowSettings {
    /// Pause between confirmation steps (milliseconds).
    #[serde(default = "default_step_interval")]
    pub step_interval_ms: u64,

    /// Pause after the final step before the commit fires (milliseconds).
    #[serde(default = "default_completion_delay")]
    pub completion_delay_ms: u64,
}

fn default_step_interval() -> u64 {
    2200
}

fn default_completion_delay() -> u64 {
    900
}

impl Default for FlowSettings {
    fn default() -> Self {
        FlowSettings {
            step_interval_ms: default_step_interval(),
            completion_delay_ms: default_completion_delay(),
        }
    }
}

// =============================================================================
// Main Checkout Configuration
// =============================================================================

/// Complete checkout configuration.
///
/// ## Example Config File
/// ```toml
/// [store]
/// name = "Mama Mboga Greengrocer"
///
/// [flow]
/// step_interval_ms = 2200
/// completion_delay_ms = 900
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Store configuration.
    #[serde(default)]
    pub store: StoreConfig,

    /// Flow timing settings.
    #[serde(default)]
    pub flow: FlowSettings,
}

impl CheckoutConfig {
    /// Creates a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (checkout.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CheckoutResult<Self> {
        let mut config = Self::default();

        // Try to load from config file
        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading checkout config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        // Override with environment variables
        config.apply_env_overrides();

        // Validate the configuration
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load checkout config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> CheckoutResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CheckoutError::ConfigSaveFailed("No config path available".into()))?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Checkout config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CheckoutResult<()> {
        if self.store.name.trim().is_empty() {
            return Err(CheckoutError::InvalidConfig(
                "store name must not be empty".into(),
            ));
        }

        if self.flow.step_interval_ms == 0 {
            return Err(CheckoutError::InvalidConfig(
                "step_interval_ms must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // Store name
        if let Ok(name) = std::env::var("DUKA_STORE_NAME") {
            debug!(name = %name, "Overriding store name from environment");
            self.store.name = name;
        }

        // Step interval
        if let Ok(interval) = std::env::var("DUKA_STEP_INTERVAL_MS") {
            if let Ok(ms) = interval.parse::<u64>() {
                debug!(ms, "Overriding step interval from environment");
                self.flow.step_interval_ms = ms;
            }
        }

        // Completion delay
        if let Ok(delay) = std::env::var("DUKA_COMPLETION_DELAY_MS") {
            if let Ok(ms) = delay.parse::<u64>() {
                self.flow.completion_delay_ms = ms;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "duka", "pos").map(|dirs| {
            let config_dir = dirs.config_dir();
            config_dir.join("checkout.toml")
        })
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Pause between confirmation steps.
    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.flow.step_interval_ms)
    }

    /// Pause after the final confirmation step.
    pub fn completion_delay(&self) -> Duration {
        Duration::from_millis(self.flow.completion_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CheckoutConfig::default();
        assert_eq!(config.store.name, "Duka POS");
        assert_eq!(config.flow.step_interval_ms, 2200);
        assert_eq!(config.flow.completion_delay_ms, 900);
    }

    #[test]
    fn test_config_validation() {
        let mut config = CheckoutConfig::default();
        assert!(config.validate().is_ok());

        // Empty store name should fail
        config.store.name = "   ".to_string();
        assert!(config.validate().is_err());

        // Zero step interval should fail
        config.store.name = "Duka".to_string();
        config.flow.step_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: CheckoutConfig = toml::from_str("[store]\nname = \"Mama Mboga\"\n").unwrap();
        assert_eq!(config.store.name, "Mama Mboga");
        assert_eq!(config.flow.step_interval_ms, 2200);
    }

    #[test]
    fn test_toml_serialization() {
        let config = CheckoutConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("[flow]"));
    }

    #[test]
    fn test_durations() {
        let mut config = CheckoutConfig::default();
        config.flow.step_interval_ms = 10;
        config.flow.completion_delay_ms = 5;
        assert_eq!(config.step_interval(), Duration::from_millis(10));
        assert_eq!(config.completion_delay(), Duration::from_millis(5));
    }
}
