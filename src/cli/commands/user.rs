use clap::Subcommand;

use crate::cli::config::ClientConfig;
use crate::cli::utils::{output_success, print_fields};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create or refresh your user record from the access token")]
    Sync,
}

pub async fn handle(cmd: UserCommands, config: &ClientConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = config.api_client()?;

    match cmd {
        UserCommands::Sync => {
            let data = client.sync_user().await?;
            if let OutputFormat::Text = output_format {
                print_fields(&data["user"], &["id", "email", "updated_at"]);
            }
            output_success(&output_format, "User synced successfully", Some(data))
        }
    }
}
