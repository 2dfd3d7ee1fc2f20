/*!
shared.rs - helpers shared by the subcommands.

  - connect(settings): Tokio runtime + HTTP client + credential chain -> ArmClient
  - print_json(value): pretty JSON on stdout
*/

use anyhow::{Context, Result};
use std::io::Write;
use std::time::Duration;
use tokio::runtime::Runtime;

use crate::arm::{ArmClient, ClientOptions, DefaultCredential};
use crate::config::Settings;

const USER_AGENT: &str = concat!("azrg/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// A ready client plus the runtime its blocking calls run on.
///
/// Field order matters: the client (holding a runtime handle) drops first.
pub struct Connection {
    pub client: ArmClient,
    pub runtime: Runtime,
}

pub fn connect(settings: &Settings) -> Result<Connection> {
    let subscription_id = settings.require_subscription()?.to_string();

    let runtime = Runtime::new().context("Failed to create Tokio runtime")?;
    let http = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;
    let credential = DefaultCredential::from_env(
        &settings.credential_settings(),
        http.clone(),
        |k| std::env::var(k).ok(),
    )
    .context("Failed to set up credentials")?;

    tracing::debug!(
        subscription = %subscription_id,
        endpoint = %settings.endpoint,
        sources = ?credential.sources().iter().map(|s| s.name()).collect::<Vec<_>>(),
        "management client ready"
    );

    let client = ArmClient::new(
        ClientOptions {
            endpoint: settings.endpoint.clone(),
            subscription_id,
            poll_interval: settings.poll_interval,
            operation_timeout: settings.operation_timeout,
        },
        credential,
        http,
        runtime.handle().clone(),
    );
    Ok(Connection { client, runtime })
}

pub fn print_json(out: &mut impl Write, value: &serde_json::Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    writeln!(out, "{text}")?;
    Ok(())
}
