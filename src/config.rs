use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::Error;

const ENV_API_URL: &str = "COLLABDESK_API_URL";
const ENV_TIMEOUT_SECS: &str = "COLLABDESK_TIMEOUT_SECS";
const ENV_SEARCH_DEBOUNCE_MS: &str = "COLLABDESK_SEARCH_DEBOUNCE_MS";
const ENV_DOCUMENT_LIMIT: &str = "COLLABDESK_DOCUMENT_LIMIT";
const ENV_SESSION_PATH: &str = "COLLABDESK_SESSION_PATH";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub request_timeout: Duration,
    pub search_debounce: Duration,
    pub document_limit: usize,
    pub session_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            api_url: "http://localhost:8080".to_string(),
            request_timeout: Duration::from_secs(30),
            search_debounce: Duration::from_millis(300),
            document_limit: 10 * 1024 * 1024,
            session_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Config, Error> {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Config::default();

        if let Some(url) = var(ENV_API_URL) {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = var(ENV_TIMEOUT_SECS) {
            config.request_timeout = Duration::from_secs(parse(ENV_TIMEOUT_SECS, secs)?);
        }
        if let Some(millis) = var(ENV_SEARCH_DEBOUNCE_MS) {
            config.search_debounce = Duration::from_millis(parse(ENV_SEARCH_DEBOUNCE_MS, millis)?);
        }
        if let Some(limit) = var(ENV_DOCUMENT_LIMIT) {
            config.document_limit = parse(ENV_DOCUMENT_LIMIT, limit)?;
        }
        config.session_path = var(ENV_SESSION_PATH).map(PathBuf::from);

        Ok(config)
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, Error> {
    value
        .parse()
        .map_err(|_| Error::InvalidConfig { key, value })
}
