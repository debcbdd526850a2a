use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{jwt::Claims, JwtIdentityProvider, Principal};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Sign an access token with the shared JWT secret (local testing)")]
    Mint {
        #[arg(long, help = "Subject user id (random when omitted)")]
        sub: Option<Uuid>,
        #[arg(long, help = "Email claim")]
        email: Option<String>,
        #[arg(long, env = "AUTH_JWT_SECRET", hide_env_values = true, help = "HS256 signing secret")]
        secret: String,
        #[arg(long, default_value_t = 24, help = "Lifetime in hours")]
        hours: u64,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Mint { sub, email, secret, hours } => {
            let principal = Principal {
                id: sub.unwrap_or_else(Uuid::new_v4),
                email,
            };
            let provider = JwtIdentityProvider::new(secret);
            let token = provider.generate_jwt(&Claims::new(&principal, hours))?;

            if let OutputFormat::Text = output_format {
                println!("{}", token);
            }
            output_success(
                &output_format,
                "Token minted",
                Some(json!({ "token": token, "sub": principal.id, "expires_in_hours": hours })),
            )
        }
    }
}
