//! Configuration module
//!
//! Reads configuration from a TOML file
//! (`~/.config/courtbook/config.toml` by default, `COURTBOOK_CONFIG`
//! to override) and falls back to defaults when absent.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("courtbook")
        .join("config.toml")
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    /// Minutes a pending booking may await online payment before the
    /// expiry sweep releases its slot.
    pub pending_expiry_minutes: i64,
    /// How often the expiry sweep runs, in seconds.
    pub expiry_check_interval_secs: u64,
    /// Base URL the sandbox gateway builds payment links from.
    pub gateway_base_url: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            pending_expiry_minutes: 15,
            expiry_check_interval_secs: 60,
            gateway_base_url: "https://pay.courtbook.local".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "courtbook=debug")
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Seed a demo venue with a day's schedule into the in-memory
    /// store on startup.
    pub demo_data: bool,
}

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub payment: PaymentConfig,
    pub logging: LoggingConfig,
    pub seed: SeedConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.address(), "0.0.0.0:8080");
        assert_eq!(cfg.payment.pending_expiry_minutes, 15);
        assert_eq!(cfg.payment.expiry_check_interval_secs, 60);
        assert_eq!(cfg.logging.level, "info");
        assert!(!cfg.seed.demo_data);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            port = 9090

            [payment]
            pending_expiry_minutes = 30
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.payment.pending_expiry_minutes, 30);
        assert_eq!(cfg.payment.expiry_check_interval_secs, 60);
    }
}
