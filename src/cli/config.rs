use anyhow::Context;

use crate::cli::Cli;
use crate::client::{ApiClient, CsrfClient};

/// Where the CLI talks to, and as whom.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub url: String,
    pub token: Option<String>,
}

impl ClientConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            url: cli.url.clone(),
            token: cli.token.clone().filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn csrf_client(&self) -> anyhow::Result<CsrfClient> {
        let client = CsrfClient::new(&self.url).with_context(|| format!("invalid API URL '{}'", self.url))?;
        Ok(match &self.token {
            Some(token) => client.with_bearer(token.clone()),
            None => client,
        })
    }

    /// Client for authenticated endpoints; fails early without a token.
    pub fn api_client(&self) -> anyhow::Result<ApiClient> {
        if self.token.is_none() {
            anyhow::bail!("no access token: pass --token or set FUNNEL_API_TOKEN");
        }
        Ok(ApiClient::new(self.csrf_client()?))
    }
}
