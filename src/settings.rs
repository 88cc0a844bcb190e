use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::DEFAULT_CONFIG_FILE;
use crate::token::DEFAULT_TOKEN_FILE;

const MAIN_URL: &str = "https://chrono.gg/";
const SPIN_URL: &str = "https://chell.chrono.gg/quest/spin";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Fedora; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/47.0.2526.111 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Settings {
    pub token_file: PathBuf,
    pub config_file: PathBuf,
    pub debug: bool,
    pub claim: ClaimConfig,
}

/// Where and how the spin request is sent.
#[derive(Debug, Clone)]
pub struct ClaimConfig {
    pub url: String,
    /// Sent as both `Origin` and `Referer`.
    pub origin: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub proxy: Option<ProxyConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub host: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            url: SPIN_URL.to_string(),
            origin: MAIN_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout: REQUEST_TIMEOUT,
            proxy: None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
            debug: false,
            claim: ClaimConfig::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let proxy = var("CHRONOGG_PROXY_HOST").map(|host| ProxyConfig {
            host,
            user: var("CHRONOGG_PROXY_USER"),
            password: var("CHRONOGG_PROXY_PASSWORD"),
        });

        Self {
            token_file: var("CHRONOGG_TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.token_file),
            config_file: var("CHRONOGG_CONFIG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.config_file),
            debug: var("CHRONOGG_DEBUG").is_some_and(|value| is_truthy(&value)),
            claim: ClaimConfig {
                proxy,
                ..defaults.claim
            },
        }
    }
}

fn is_truthy(value: &str) -> bool {
    !matches!(value.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off")
}
