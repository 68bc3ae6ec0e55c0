//! Configuration file loading.
//!
//! The daemon reads a [`ProviderConfig`] from a JSON file at startup and
//! re-reads it on SIGHUP. A file that fails to load on reload leaves the
//! running configuration untouched.

use std::path::Path;

use payfetch_provider::ProviderConfig;
use thiserror::Error;

/// Errors that can occur loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file was not valid provider configuration.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Load the provider configuration from a JSON file.
pub fn load(path: &Path) -> Result<ProviderConfig, ConfigFileError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "wallet": "f1daemon",
                "paymentInterval": 2048,
                "paymentIntervalIncrease": 512,
                "pricesPerByte": {{ "*": 3 }},
                "knownCids": {{ "bafy-hosted": {{ "size": 4096 }} }}
            }}"#
        )
        .unwrap();

        let config = load(file.path()).unwrap();
        assert_eq!(config.wallet.as_str(), "f1daemon");
        assert_eq!(config.payment_interval, 2048);
        assert_eq!(config.prices_per_byte.get("*"), Some(&3));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load(Path::new("/nonexistent/provider.json"));
        assert!(matches!(result, Err(ConfigFileError::Io(_))));
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let result = load(file.path());
        assert!(matches!(result, Err(ConfigFileError::Parse(_))));
    }
}
