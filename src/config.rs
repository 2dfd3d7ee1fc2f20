//! Runtime settings.
//!
//! Precedence: CLI flag (clap also folds in its `env` fallbacks) > environment >
//! YAML config file > built-in default.
//!
//! Config file lookup: `--config` / `AZRG_CONFIG`, else `./azrg.yaml` when present.
//!
//! ```yaml
//! subscription_id: 00000000-0000-0000-0000-000000000000
//! log_file: /var/log/azrg/actions.log
//! az_command: az
//! poll_interval_secs: 5
//! operation_timeout_secs: 3600
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::actionlog::DEFAULT_LOG_FILE;
use crate::arm::client::DEFAULT_ENDPOINT;
use crate::arm::credential::{CredentialSettings, DEFAULT_AUTHORITY_HOST};

pub const DEFAULT_CONFIG_FILE: &str = "azrg.yaml";
pub const DEFAULT_AZ_COMMAND: &str = "az";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 3600;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid {field} '{value}'")]
    InvalidUrl {
        field: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },

    #[error(
        "no subscription configured (use --subscription, AZURE_SUBSCRIPTION_ID or subscription_id in the config file)"
    )]
    MissingSubscription,
}

/// Keys accepted in the YAML config file.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub subscription_id: Option<String>,
    pub endpoint: Option<String>,
    pub log_file: Option<PathBuf>,
    pub az_command: Option<String>,
    pub authority_host: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub operation_timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }
}

/// Values coming from the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub subscription_id: Option<String>,
    pub config: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub subscription_id: Option<String>,
    pub endpoint: Url,
    pub log_file: PathBuf,
    pub az_command: String,
    pub authority_host: Url,
    pub poll_interval: Duration,
    pub operation_timeout: Duration,
}

impl Settings {
    /// Resolve settings from the command line, the process environment and the config file.
    pub fn load(overrides: &Overrides) -> Result<Self, ConfigError> {
        let file = match config_path(overrides) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config file");
                FileConfig::from_path(&path)?
            }
            None => FileConfig::default(),
        };
        Self::resolve(overrides, file, |k| std::env::var(k).ok())
    }

    pub fn resolve(
        overrides: &Overrides,
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let env = |k: &str| env(k).filter(|v| !v.trim().is_empty());

        let subscription_id = non_blank(overrides.subscription_id.clone())
            .or_else(|| env("AZURE_SUBSCRIPTION_ID"))
            .or_else(|| non_blank(file.subscription_id));

        let endpoint_raw = non_blank(overrides.endpoint.clone())
            .or_else(|| non_blank(file.endpoint))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let endpoint = parse_url("endpoint", &endpoint_raw)?;

        let authority_raw = env("AZURE_AUTHORITY_HOST")
            .or_else(|| non_blank(file.authority_host))
            .unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string());
        let authority_host = parse_url("authority_host", &authority_raw)?;

        let log_file = overrides
            .log_file
            .clone()
            .or(file.log_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

        let az_command = env("AZRG_AZ_COMMAND")
            .or_else(|| non_blank(file.az_command))
            .unwrap_or_else(|| DEFAULT_AZ_COMMAND.to_string());

        let poll_secs = file.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
        if poll_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_secs",
                message: "must be at least 1".into(),
            });
        }
        let timeout_secs = file
            .operation_timeout_secs
            .unwrap_or(DEFAULT_OPERATION_TIMEOUT_SECS);
        if timeout_secs < poll_secs {
            return Err(ConfigError::InvalidValue {
                field: "operation_timeout_secs",
                message: format!("must not be shorter than poll_interval_secs ({poll_secs})"),
            });
        }

        Ok(Self {
            subscription_id,
            endpoint,
            log_file,
            az_command,
            authority_host,
            poll_interval: Duration::from_secs(poll_secs),
            operation_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn require_subscription(&self) -> Result<&str, ConfigError> {
        self.subscription_id
            .as_deref()
            .ok_or(ConfigError::MissingSubscription)
    }

    pub fn credential_settings(&self) -> CredentialSettings {
        CredentialSettings {
            az_command: self.az_command.clone(),
            authority_host: self.authority_host.clone(),
        }
    }
}

fn config_path(overrides: &Overrides) -> Option<PathBuf> {
    if let Some(p) = &overrides.config {
        return Some(p.clone());
    }
    let default = PathBuf::from(DEFAULT_CONFIG_FILE);
    default.is_file().then_some(default)
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_without_any_source() {
        let s = Settings::resolve(&Overrides::default(), FileConfig::default(), no_env).unwrap();
        assert!(s.subscription_id.is_none());
        assert_eq!(s.endpoint.as_str(), "https://management.azure.com/");
        assert_eq!(s.log_file, PathBuf::from("log_file.log"));
        assert_eq!(s.az_command, "az");
        assert_eq!(s.poll_interval, Duration::from_secs(5));
        assert!(matches!(
            s.require_subscription(),
            Err(ConfigError::MissingSubscription)
        ));
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let file = FileConfig {
            subscription_id: Some("from-file".into()),
            az_command: Some("file-az".into()),
            ..Default::default()
        };
        let env: HashMap<&str, &str> = [
            ("AZURE_SUBSCRIPTION_ID", "from-env"),
            ("AZRG_AZ_COMMAND", "env-az"),
        ]
        .into_iter()
        .collect();
        let lookup = |k: &str| env.get(k).map(|v| v.to_string());

        let s = Settings::resolve(&Overrides::default(), file.clone(), lookup).unwrap();
        assert_eq!(s.subscription_id.as_deref(), Some("from-env"));
        assert_eq!(s.az_command, "env-az");

        let cli = Overrides {
            subscription_id: Some("from-cli".into()),
            ..Default::default()
        };
        let s = Settings::resolve(&cli, file.clone(), lookup).unwrap();
        assert_eq!(s.subscription_id.as_deref(), Some("from-cli"));

        let s = Settings::resolve(&Overrides::default(), file, no_env).unwrap();
        assert_eq!(s.subscription_id.as_deref(), Some("from-file"));
        assert_eq!(s.az_command, "file-az");
    }

    #[test]
    fn yaml_file_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("azrg.yaml");
        std::fs::write(
            &path,
            "subscription_id: abc\nlog_file: /tmp/actions.log\npoll_interval_secs: 2\noperation_timeout_secs: 30\n",
        )
        .unwrap();
        let file = FileConfig::from_path(&path).unwrap();
        let s = Settings::resolve(&Overrides::default(), file, no_env).unwrap();
        assert_eq!(s.require_subscription().unwrap(), "abc");
        assert_eq!(s.log_file, PathBuf::from("/tmp/actions.log"));
        assert_eq!(s.operation_timeout, Duration::from_secs(30));
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(FileConfig::from_yaml("subscription: typo\n").is_err());
        assert!(FileConfig::from_yaml("").is_ok());
    }

    #[test]
    fn invalid_values_rejected() {
        let bad_poll = FileConfig {
            poll_interval_secs: Some(0),
            ..Default::default()
        };
        assert!(Settings::resolve(&Overrides::default(), bad_poll, no_env).is_err());

        let bad_endpoint = Overrides {
            endpoint: Some("not a url".into()),
            ..Default::default()
        };
        let err = Settings::resolve(&bad_endpoint, FileConfig::default(), no_env).unwrap_err();
        assert!(err.to_string().contains("endpoint"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = FileConfig::from_path(Path::new("/nonexistent/azrg.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/azrg.yaml"));
    }
}
