use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_FILE: &str = ".chronogg.json";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub email: Option<EmailConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub enabled: bool,
    pub server: String,
    pub from: Contact,
    #[serde(default)]
    pub to: Vec<Contact>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub name: String,
    pub address: String,
}

impl Config {
    /// Reads the optional JSON config. A missing file yields the default
    /// (notifications off); a file that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, notifications disabled");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(Error::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&contents).map_err(|source| Error::ConfigMalformed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The email section, if present and switched on.
    pub fn enabled_email(&self) -> Option<&EmailConfig> {
        self.email.as_ref().filter(|email| email.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(contents: &str) -> (TempDir, std::path::PathBuf) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, contents).unwrap();
        (tmp, path)
    }

    #[test]
    fn missing_file_is_default() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load(&tmp.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert!(config.email.is_none());
        assert!(config.enabled_email().is_none());
    }

    #[test]
    fn parses_full_email_section() {
        let (_tmp, path) = write_config(
            r#"{
                "email": {
                    "enabled": true,
                    "server": "smtp.example.com",
                    "from": {"name": "AutoChronoGG", "address": "bot@example.com"},
                    "to": [
                        {"name": "Ops", "address": "ops@example.com"},
                        {"name": "", "address": "pager@example.com"}
                    ]
                }
            }"#,
        );

        let config = Config::load(&path).unwrap();
        let email = config.enabled_email().unwrap();
        assert_eq!(email.server, "smtp.example.com");
        assert_eq!(email.from.address, "bot@example.com");
        assert_eq!(email.to.len(), 2);
        assert_eq!(email.to[1].name, "");
    }

    #[test]
    fn disabled_email_is_not_enabled() {
        let (_tmp, path) = write_config(
            r#"{"email": {"server": "smtp", "from": {"name": "a", "address": "a@b"}}}"#,
        );

        let config = Config::load(&path).unwrap();
        assert!(config.email.is_some());
        assert!(config.enabled_email().is_none());
    }

    #[test]
    fn empty_object_and_unknown_keys_are_accepted() {
        let (_tmp, path) = write_config(r#"{"theme": "dark"}"#);
        assert!(Config::load(&path).unwrap().email.is_none());
    }

    #[test]
    fn invalid_json_is_malformed() {
        let (_tmp, path) = write_config("{ email: ");
        assert!(matches!(
            Config::load(&path),
            Err(Error::ConfigMalformed { .. })
        ));
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let (_tmp, path) = write_config(r#"{"email": {"enabled": "yes"}}"#);
        assert!(matches!(
            Config::load(&path),
            Err(Error::ConfigMalformed { .. })
        ));
    }
}
