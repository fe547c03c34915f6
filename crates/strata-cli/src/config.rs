//! Configuration system for the Strata CLI.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use strata_core::Defaults;
use strata_core::export::DEFAULT_SNAP_LEN;
use strata_core::layers::MAX_TEXT_LEN;

/// Largest snapshot length accepted by common capture tools
const MAX_SNAP_LEN: u32 = 262_144;

/// Strata configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Initial field values for new layers
    #[serde(default)]
    pub defaults: Defaults,
    /// Packet output configuration
    #[serde(default)]
    pub output: OutputConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Packet output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// File that "Save packet" appends to
    #[serde(default = "default_pcap_path")]
    pub pcap_path: PathBuf,
    /// pcap snapshot length
    #[serde(default = "default_snap_len")]
    pub snap_len: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default values

fn default_pcap_path() -> PathBuf {
    PathBuf::from("strata.pcap")
}

fn default_snap_len() -> u32 {
    DEFAULT_SNAP_LEN
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pcap_path: default_pcap_path(),
            snap_len: default_snap_len(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, contents)?;
        Ok(())
    }

    /// Get default config path
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("strata/config.toml")
    }

    /// Load config from `path`, falling back to defaults when it is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.output.snap_len == 0 || self.output.snap_len > MAX_SNAP_LEN {
            anyhow::bail!("Snap length must be between 1 and {MAX_SNAP_LEN}");
        }

        if self.defaults.text.len() > MAX_TEXT_LEN {
            anyhow::bail!("Default text must be at most {MAX_TEXT_LEN} bytes");
        }

        if self.output.pcap_path.as_os_str().is_empty() {
            anyhow::bail!("Output pcap path must not be empty");
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!(
                "Invalid log level: {}. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output.pcap_path, PathBuf::from("strata.pcap"));
        assert_eq!(config.output.snap_len, 65535);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.defaults.ttl, 64);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.output.snap_len = 0;
        assert!(config.validate().is_err());

        config.output.snap_len = 1500;
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "DEBUG".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_text_limit() {
        let mut config = Config::default();
        config.defaults.text = "x".repeat(MAX_TEXT_LEN);
        assert!(config.validate().is_ok());

        config.defaults.text.push('x');
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Default text"));
    }

    #[test]
    fn test_toml_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.defaults, deserialized.defaults);
        assert_eq!(config.output.snap_len, deserialized.output.snap_len);
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [defaults]
            dst_ipv4 = "198.51.100.7"
            src_mac = "02-00-5e-10-00-01"
            ip_protocol = 47

            [output]
            snap_len = 128
            "#,
        )
        .unwrap();

        assert_eq!(config.defaults.dst_ipv4, Ipv4Addr::new(198, 51, 100, 7));
        assert_eq!(config.defaults.src_mac.to_string(), "02:00:5e:10:00:01");
        assert_eq!(config.defaults.ttl, 64);
        assert_eq!(config.defaults.ip_protocol, 47);
        assert_eq!(config.defaults.ether_type, 0x88B5);
        assert_eq!(config.output.snap_len, 128);
        assert_eq!(config.output.pcap_path, PathBuf::from("strata.pcap"));
    }

    #[test]
    fn test_bad_address_rejected() {
        let result: Result<Config, _> = toml::from_str(
            r#"
            [defaults]
            src_mac = "02:00:5e"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        let mut config = Config::default();
        config.defaults.dst_port = 443;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.defaults.dst_port, 443);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.output.snap_len, 65535);
        assert!(!path.exists());
    }
}
