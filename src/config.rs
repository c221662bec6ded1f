use serde::Deserialize;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ConfigIO(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub issuer: IssuerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub address: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// SQLite database file holding the issued codes.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IssuerConfig {
    /// Reservation attempts per request before giving up.
    #[serde(default = "IssuerConfig::default_max_attempts")]
    pub max_attempts: NonZeroU32,
}

impl IssuerConfig {
    fn default_max_attempts() -> NonZeroU32 {
        NonZeroU32::new(16).unwrap_or(NonZeroU32::MIN)
    }
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            max_attempts: Self::default_max_attempts(),
        }
    }
}

impl Config {
    pub async fn from(config_path: impl AsRef<Path>) -> Result<Self> {
        let config_str = tokio::fs::read_to_string(config_path).await?;
        let config = toml::from_str(&config_str)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            [server]
            address = "0.0.0.0:8000"

            [storage]
            path = "/var/lib/parcel-tracker/codes.db"

            [issuer]
            max_attempts = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.server.address, "0.0.0.0:8000");
        assert_eq!(
            config.storage.path,
            PathBuf::from("/var/lib/parcel-tracker/codes.db")
        );
        assert_eq!(config.issuer.max_attempts.get(), 4);
    }

    #[test]
    fn test_issuer_section_is_optional() {
        let config: Config = toml::from_str(
            r#"
            [server]
            address = "127.0.0.1:8000"

            [storage]
            path = "codes.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.issuer.max_attempts.get(), 16);
    }

    #[test]
    fn test_zero_max_attempts_rejected() {
        let result = toml::from_str::<Config>(
            r#"
            [server]
            address = "127.0.0.1:8000"

            [storage]
            path = "codes.db"

            [issuer]
            max_attempts = 0
            "#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_missing_storage_section_rejected() {
        let result = toml::from_str::<Config>(
            r#"
            [server]
            address = "127.0.0.1:8000"
            "#,
        );

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\naddress = \"127.0.0.1:9000\"\n\n[storage]\npath = \"codes.db\""
        )
        .unwrap();

        let config = Config::from(file.path()).await.unwrap();

        assert_eq!(config.server.address, "127.0.0.1:9000");
    }

    #[tokio::test]
    async fn test_config_from_missing_file() {
        let result = Config::from("/nonexistent/parcel-tracker.toml").await;

        assert!(matches!(result, Err(ConfigError::ConfigIO(_))));
    }
}
