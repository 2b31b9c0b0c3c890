use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use ezhost_engine::{ApiKey, ApiSettings, HISTORY_FILENAME};

use crate::cli::GlobalArgs;

/// Settings resolved once at startup and never changed afterwards.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiSettings,
    pub history_path: PathBuf,
}

impl AppConfig {
    pub fn from_args(args: &GlobalArgs) -> Result<Self> {
        let history_path = match &args.history {
            Some(path) => path.clone(),
            None => default_history_path()?,
        };

        let mut api = ApiSettings::new(ApiKey::new(args.api_key.clone().unwrap_or_default()))
            .with_base_url(args.api_url.trim());
        api.connect_timeout = Duration::from_secs(args.connect_timeout);
        api.request_timeout = Duration::from_secs(args.timeout);

        Ok(Self { api, history_path })
    }

    pub fn require_api_key(&self) -> Result<()> {
        if self.api.api_key.is_empty() {
            bail!("API key missing: set API_KEY or pass --api-key");
        }
        Ok(())
    }
}

fn default_history_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(HISTORY_FILENAME))
        .context("failed to resolve the home directory; pass --history")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::Cli;

    #[test]
    fn explicit_flags_win() {
        let cli = Cli::try_parse_from([
            "ezhost",
            "--api-key",
            "abc",
            "--api-url",
            "http://localhost:9000",
            "--history",
            "/tmp/h.json",
            "--timeout",
            "5",
            "history",
        ])
        .unwrap();
        let config = AppConfig::from_args(&cli.global).unwrap();
        assert_eq!(config.history_path, PathBuf::from("/tmp/h.json"));
        assert_eq!(config.api.base_url, "http://localhost:9000");
        assert_eq!(config.api.request_timeout, Duration::from_secs(5));
        assert!(config.require_api_key().is_ok());
    }

    #[test]
    fn blank_key_is_rejected() {
        let cli = Cli::try_parse_from([
            "ezhost",
            "--api-key",
            " ",
            "--history",
            "/tmp/h.json",
            "history",
        ])
        .unwrap();
        let config = AppConfig::from_args(&cli.global).unwrap();
        let err = config.require_api_key().unwrap_err();
        assert!(err.to_string().contains("API_KEY"));
    }
}
