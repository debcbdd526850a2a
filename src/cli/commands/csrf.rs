use clap::Subcommand;
use serde_json::json;

use crate::cli::config::ClientConfig;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum CsrfCommands {
    #[command(about = "Ask the server for a CSRF cookie and print the token")]
    Refresh,
}

pub async fn handle(cmd: CsrfCommands, config: &ClientConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = config.csrf_client()?;

    match cmd {
        CsrfCommands::Refresh => match client.refresh().await? {
            Some(token) => {
                if let OutputFormat::Text = output_format {
                    println!("{}", token);
                }
                output_success(&output_format, "CSRF token issued", Some(json!({ "token": token })))
            }
            None => anyhow::bail!("server did not issue a CSRF cookie (is CSRF enforcement disabled?)"),
        },
    }
}
