//! Runtime configuration.
//!
//! Environment variables carry the secret and the tunables; command-line
//! flags (see `main`) override them.

use std::env;
use std::path::PathBuf;

use cadenza_core::error::{CadenzaError, Result};

pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";
pub const DEFAULT_SEARCH_LIMIT: usize = 10;
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    /// Bot API token, supplied out-of-band.
    pub telegram_token: String,
    /// Staging directory for downloaded files, created if absent.
    pub download_dir: PathBuf,
    /// Maximum number of candidates a search returns.
    pub search_limit: usize,
    /// Upper bound on a single resolver invocation.
    pub download_timeout_secs: u64,
    /// Long-poll timeout passed to the transport.
    pub poll_timeout_secs: u64,
}

impl Config {
    /// Configuration with defaults for everything but the token.
    pub fn new(telegram_token: impl Into<String>) -> Self {
        Self {
            telegram_token: telegram_token.into(),
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            search_limit: DEFAULT_SEARCH_LIMIT,
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// `TELEGRAM_TOKEN` is required. `CADENZA_DOWNLOAD_DIR`,
    /// `CADENZA_SEARCH_LIMIT`, `CADENZA_DOWNLOAD_TIMEOUT_SECS` and
    /// `CADENZA_POLL_TIMEOUT_SECS` override the defaults when set.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error when the token is missing or a numeric
    /// override does not parse.
    pub fn try_from_env() -> Result<Self> {
        let telegram_token = env::var("TELEGRAM_TOKEN")
            .map_err(|_| CadenzaError::config("TELEGRAM_TOKEN not set in the environment"))?;
        let mut config = Self::new(telegram_token);

        if let Ok(dir) = env::var("CADENZA_DOWNLOAD_DIR") {
            config.download_dir = PathBuf::from(dir);
        }
        if let Ok(raw) = env::var("CADENZA_SEARCH_LIMIT") {
            config.search_limit = raw
                .parse()
                .map_err(|_| CadenzaError::config(format!("invalid CADENZA_SEARCH_LIMIT: {raw}")))?;
        }
        if let Ok(raw) = env::var("CADENZA_DOWNLOAD_TIMEOUT_SECS") {
            config.download_timeout_secs = raw.parse().map_err(|_| {
                CadenzaError::config(format!("invalid CADENZA_DOWNLOAD_TIMEOUT_SECS: {raw}"))
            })?;
        }
        if let Ok(raw) = env::var("CADENZA_POLL_TIMEOUT_SECS") {
            config.poll_timeout_secs = raw.parse().map_err(|_| {
                CadenzaError::config(format!("invalid CADENZA_POLL_TIMEOUT_SECS: {raw}"))
            })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_applies_the_documented_defaults() {
        let config = Config::new("token");
        assert_eq!(config.telegram_token, "token");
        assert_eq!(config.download_dir, PathBuf::from("downloads"));
        assert_eq!(config.search_limit, 10);
        assert_eq!(config.download_timeout_secs, 600);
        assert_eq!(config.poll_timeout_secs, 30);
    }

    #[test]
    fn env_overrides_parse_errors_and_the_missing_token() {
        // SAFETY: this test sets and restores process environment variables;
        // no other test in this binary reads them.
        unsafe {
            env::set_var("TELEGRAM_TOKEN", "tok-123");
            env::set_var("CADENZA_DOWNLOAD_DIR", "/tmp/stage");
            env::set_var("CADENZA_SEARCH_LIMIT", "5");
            env::set_var("CADENZA_DOWNLOAD_TIMEOUT_SECS", "60");
            env::set_var("CADENZA_POLL_TIMEOUT_SECS", "10");
        }
        let config = Config::try_from_env().unwrap();
        assert_eq!(config.telegram_token, "tok-123");
        assert_eq!(config.download_dir, PathBuf::from("/tmp/stage"));
        assert_eq!(config.search_limit, 5);
        assert_eq!(config.download_timeout_secs, 60);
        assert_eq!(config.poll_timeout_secs, 10);

        // SAFETY: same variables, same single-test scope.
        unsafe {
            env::set_var("CADENZA_SEARCH_LIMIT", "not-a-number");
        }
        assert!(matches!(
            Config::try_from_env(),
            Err(CadenzaError::Config(_))
        ));

        // SAFETY: restores the environment for the rest of the process.
        unsafe {
            env::remove_var("TELEGRAM_TOKEN");
            env::remove_var("CADENZA_DOWNLOAD_DIR");
            env::remove_var("CADENZA_SEARCH_LIMIT");
            env::remove_var("CADENZA_DOWNLOAD_TIMEOUT_SECS");
            env::remove_var("CADENZA_POLL_TIMEOUT_SECS");
        }
        assert!(matches!(
            Config::try_from_env(),
            Err(CadenzaError::Config(_))
        ));
    }
}
