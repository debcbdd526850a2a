pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use config::ClientConfig;

#[derive(Parser)]
#[command(name = "funnel")]
#[command(about = "Funnel CLI - Command-line interface for the Funnel Builder API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, env = "FUNNEL_API_URL", default_value = "http://localhost:3000", help = "API base URL")]
    pub url: String,

    #[arg(long, global = true, env = "FUNNEL_API_TOKEN", hide_env_values = true, help = "Bearer access token")]
    pub token: Option<String>,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List and create funnels")]
    Funnels {
        #[command(subcommand)]
        cmd: commands::funnels::FunnelCommands,
    },

    #[command(about = "User record management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Workflow template catalog")]
    Templates {
        #[command(subcommand)]
        cmd: commands::templates::TemplateCommands,
    },

    #[command(about = "CSRF token helpers")]
    Csrf {
        #[command(subcommand)]
        cmd: commands::csrf::CsrfCommands,
    },

    #[command(about = "Local access token tooling (JWT verifier only)")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let client_config = ClientConfig::from_cli(&cli);

    match cli.command {
        Commands::Funnels { cmd } => commands::funnels::handle(cmd, &client_config, output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, &client_config, output_format).await,
        Commands::Templates { cmd } => commands::templates::handle(cmd, &client_config, output_format).await,
        Commands::Csrf { cmd } => commands::csrf::handle(cmd, &client_config, output_format).await,
        Commands::Token { cmd } => commands::token::handle(cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "funnel", "funnels", "list", "--limit", "5", "--json", "--url", "http://api.test",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.url, "http://api.test");
        assert!(matches!(cli.command, Commands::Funnels { .. }));
    }

    #[test]
    fn rejects_unknown_commands() {
        assert!(Cli::try_parse_from(["funnel", "tenants", "list"]).is_err());
    }
}
