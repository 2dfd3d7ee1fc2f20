//! Ambient credential chain for the management endpoint.
//!
//! Sources are tried in order until one yields a token:
//!   1. `AZURE_ACCESS_TOKEN`  (pre-acquired bearer token)
//!   2. client secret        (`AZURE_TENANT_ID` + `AZURE_CLIENT_ID` + `AZURE_CLIENT_SECRET`)
//!   3. Azure CLI            (`az account get-access-token`)
//!
//! The winning token is cached until it is within five minutes of expiry.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use shell_words::split as shell_split;
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::Mutex;
use url::Url;

use super::error::{ArmError, ArmResult};

pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";
pub const MANAGEMENT_RESOURCE: &str = "https://management.azure.com/";
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

const REFRESH_MARGIN_MINUTES: i64 = 5;

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub secret: String,
    /// `None` when the source gives no expiry (static tokens).
    pub expires_on: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match self.expires_on {
            Some(exp) => exp - now > Duration::minutes(REFRESH_MARGIN_MINUTES),
            None => true,
        }
    }
}

#[derive(Debug, Clone)]
pub enum CredentialSource {
    Static(String),
    ClientSecret {
        tenant_id: String,
        client_id: String,
        client_secret: String,
        authority_host: Url,
    },
    AzureCli {
        program: String,
        args: Vec<String>,
    },
}

impl CredentialSource {
    pub fn name(&self) -> &'static str {
        match self {
            CredentialSource::Static(_) => "AZURE_ACCESS_TOKEN",
            CredentialSource::ClientSecret { .. } => "client secret",
            CredentialSource::AzureCli { .. } => "Azure CLI",
        }
    }

    /// Build the CLI source from a command line such as `az` or `wsl az`.
    pub fn azure_cli(command: &str) -> ArmResult<Self> {
        let parts = shell_split(command)
            .map_err(|e| ArmError::Auth(format!("invalid az command '{command}': {e}")))?;
        let Some((program, args)) = parts.split_first() else {
            return Err(ArmError::Auth("az command is empty".into()));
        };
        Ok(CredentialSource::AzureCli {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

/// Settings the chain needs besides the process environment.
#[derive(Debug, Clone)]
pub struct CredentialSettings {
    pub az_command: String,
    pub authority_host: Url,
}

pub struct DefaultCredential {
    sources: Vec<CredentialSource>,
    http: reqwest::Client,
    cache: Mutex<Option<AccessToken>>,
}

impl DefaultCredential {
    /// Assemble the chain from environment lookups (`env` is usually `std::env::var(..).ok()`).
    pub fn from_env(
        settings: &CredentialSettings,
        http: reqwest::Client,
        env: impl Fn(&str) -> Option<String>,
    ) -> ArmResult<Self> {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        let mut sources = Vec::new();

        if let Some(token) = non_empty("AZURE_ACCESS_TOKEN") {
            sources.push(CredentialSource::Static(token));
        }
        if let (Some(tenant_id), Some(client_id), Some(client_secret)) = (
            non_empty("AZURE_TENANT_ID"),
            non_empty("AZURE_CLIENT_ID"),
            non_empty("AZURE_CLIENT_SECRET"),
        ) {
            sources.push(CredentialSource::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
                authority_host: settings.authority_host.clone(),
            });
        }
        sources.push(CredentialSource::azure_cli(&settings.az_command)?);

        Ok(Self::with_sources(sources, http))
    }

    pub fn with_sources(sources: Vec<CredentialSource>, http: reqwest::Client) -> Self {
        Self {
            sources,
            http,
            cache: Mutex::new(None),
        }
    }

    pub fn sources(&self) -> &[CredentialSource] {
        &self.sources
    }

    /// Bearer token for the management endpoint, refreshed when close to expiry.
    pub async fn token(&self) -> ArmResult<String> {
        let mut cached = self.cache.lock().await;
        if let Some(tok) = cached.as_ref()
            && tok.is_fresh(Utc::now())
        {
            return Ok(tok.secret.clone());
        }
        let fresh = self.acquire().await?;
        let secret = fresh.secret.clone();
        *cached = Some(fresh);
        Ok(secret)
    }

    async fn acquire(&self) -> ArmResult<AccessToken> {
        let mut failures = Vec::new();
        for source in &self.sources {
            match self.acquire_from(source).await {
                Ok(tok) => {
                    tracing::debug!(source = source.name(), "acquired management token");
                    return Ok(tok);
                }
                Err(e) => {
                    tracing::debug!(source = source.name(), error = %e, "credential source failed");
                    failures.push(format!("{}: {e}", source.name()));
                }
            }
        }
        Err(ArmError::Auth(format!(
            "no credential source produced a token ({})",
            failures.join("; ")
        )))
    }

    async fn acquire_from(&self, source: &CredentialSource) -> ArmResult<AccessToken> {
        match source {
            CredentialSource::Static(secret) => Ok(AccessToken {
                secret: secret.clone(),
                expires_on: None,
            }),
            CredentialSource::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
                authority_host,
            } => {
                let mut url = authority_host.clone();
                url.path_segments_mut()
                    .map_err(|_| ArmError::Auth(format!("invalid authority host: {authority_host}")))?
                    .pop_if_empty()
                    .extend([tenant_id.as_str(), "oauth2", "v2.0", "token"]);
                let resp = self
                    .http
                    .post(url)
                    .form(&[
                        ("grant_type", "client_credentials"),
                        ("client_id", client_id.as_str()),
                        ("client_secret", client_secret.as_str()),
                        ("scope", MANAGEMENT_SCOPE),
                    ])
                    .send()
                    .await?;
                let status = resp.status();
                let body = resp.text().await?;
                if !status.is_success() {
                    return Err(ArmError::Auth(format!(
                        "token endpoint returned HTTP {}: {}",
                        status.as_u16(),
                        body.trim()
                    )));
                }
                parse_oauth_token(&body, Utc::now())
            }
            CredentialSource::AzureCli { program, args } => {
                let output = Command::new(program)
                    .args(args)
                    .args([
                        "account",
                        "get-access-token",
                        "--resource",
                        MANAGEMENT_RESOURCE,
                        "--output",
                        "json",
                    ])
                    .stdin(Stdio::null())
                    .output()
                    .await
                    .map_err(|e| ArmError::Auth(format!("failed to run '{program}': {e}")))?;
                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    return Err(ArmError::Auth(format!(
                        "'{program} account get-access-token' failed: {}",
                        stderr.trim()
                    )));
                }
                parse_cli_token(&String::from_utf8_lossy(&output.stdout))
            }
        }
    }
}

#[derive(Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

fn parse_oauth_token(body: &str, now: DateTime<Utc>) -> ArmResult<AccessToken> {
    let parsed: OAuthTokenResponse = serde_json::from_str(body)
        .map_err(|e| ArmError::Auth(format!("malformed token response: {e}")))?;
    Ok(AccessToken {
        secret: parsed.access_token,
        expires_on: parsed.expires_in.map(|s| now + Duration::seconds(s)),
    })
}

#[derive(Deserialize)]
struct CliTokenResponse {
    #[serde(rename = "accessToken")]
    access_token: String,
    /// Epoch seconds; older CLI versions only emit the local-time `expiresOn`.
    #[serde(default)]
    expires_on: Option<i64>,
}

fn parse_cli_token(stdout: &str) -> ArmResult<AccessToken> {
    let parsed: CliTokenResponse = serde_json::from_str(stdout)
        .map_err(|e| ArmError::Auth(format!("malformed az output: {e}")))?;
    Ok(AccessToken {
        secret: parsed.access_token,
        expires_on: parsed
            .expires_on
            .and_then(|s| DateTime::<Utc>::from_timestamp(s, 0)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings() -> CredentialSettings {
        CredentialSettings {
            az_command: "az".into(),
            authority_host: Url::parse(DEFAULT_AUTHORITY_HOST).unwrap(),
        }
    }

    #[test]
    fn chain_order_follows_environment() {
        let env: HashMap<&str, &str> = [
            ("AZURE_ACCESS_TOKEN", "tok"),
            ("AZURE_TENANT_ID", "t"),
            ("AZURE_CLIENT_ID", "c"),
            ("AZURE_CLIENT_SECRET", "s"),
        ]
        .into_iter()
        .collect();
        let cred = DefaultCredential::from_env(&settings(), reqwest::Client::new(), |k| {
            env.get(k).map(|v| v.to_string())
        })
        .unwrap();
        let names: Vec<_> = cred.sources().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["AZURE_ACCESS_TOKEN", "client secret", "Azure CLI"]);
    }

    #[test]
    fn partial_client_secret_is_skipped() {
        let cred = DefaultCredential::from_env(&settings(), reqwest::Client::new(), |k| {
            (k == "AZURE_TENANT_ID").then(|| "t".to_string())
        })
        .unwrap();
        let names: Vec<_> = cred.sources().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["Azure CLI"]);
    }

    #[test]
    fn az_command_is_shell_split() {
        match CredentialSource::azure_cli("wsl --exec az").unwrap() {
            CredentialSource::AzureCli { program, args } => {
                assert_eq!(program, "wsl");
                assert_eq!(args, vec!["--exec", "az"]);
            }
            other => panic!("unexpected source {other:?}"),
        }
        assert!(CredentialSource::azure_cli("  ").is_err());
    }

    #[test]
    fn freshness_respects_margin() {
        let now = Utc::now();
        let near = AccessToken {
            secret: "x".into(),
            expires_on: Some(now + Duration::minutes(2)),
        };
        let far = AccessToken {
            secret: "x".into(),
            expires_on: Some(now + Duration::minutes(30)),
        };
        assert!(!near.is_fresh(now));
        assert!(far.is_fresh(now));
    }

    #[test]
    fn parses_cli_and_oauth_payloads() {
        let cli = parse_cli_token(
            r#"{"accessToken":"abc","expiresOn":"2030-01-01 10:00:00.000000","expires_on":1893492000,"tokenType":"Bearer"}"#,
        )
        .unwrap();
        assert_eq!(cli.secret, "abc");
        assert_eq!(cli.expires_on.unwrap().timestamp(), 1_893_492_000);

        let now = Utc::now();
        let oauth =
            parse_oauth_token(r#"{"token_type":"Bearer","expires_in":3599,"access_token":"def"}"#, now)
                .unwrap();
        assert_eq!(oauth.secret, "def");
        assert_eq!(oauth.expires_on, Some(now + Duration::seconds(3599)));
    }

    #[tokio::test]
    async fn static_token_is_cached() {
        let cred = DefaultCredential::with_sources(
            vec![CredentialSource::Static("static-token".into())],
            reqwest::Client::new(),
        );
        assert_eq!(cred.token().await.unwrap(), "static-token");
        assert_eq!(cred.token().await.unwrap(), "static-token");
    }
}
