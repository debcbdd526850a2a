use clap::Parser;
use funnel_builder_api::cli::{utils::output_error, Cli, OutputFormat};
use funnel_builder_api::client::ClientError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_format = OutputFormat::from_cli(&cli);

    if let Err(e) = funnel_builder_api::cli::run(cli).await {
        if let OutputFormat::Json = output_format {
            let code = match e.downcast_ref::<ClientError>() {
                Some(ClientError::Api { code, .. }) => Some(code.as_str()),
                _ => None,
            };
            output_error(&output_format, &e.to_string(), code)?;
        } else {
            match std::env::var("CLI_VERBOSE").as_deref() {
                Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
                _ => eprintln!("Error: {e}"),
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
