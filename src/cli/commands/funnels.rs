use clap::Subcommand;
use serde_json::Value;

use crate::cli::config::ClientConfig;
use crate::cli::utils::{output_empty_collection, output_success, print_fields};
use crate::cli::OutputFormat;
use crate::client::ListFunnelsParams;

#[derive(Subcommand)]
pub enum FunnelCommands {
    #[command(about = "List your funnels, newest first")]
    List {
        #[arg(long, help = "Only published (true) or draft (false) funnels")]
        published: Option<bool>,
        #[arg(long, help = "Page size (server default 10)")]
        limit: Option<u32>,
        #[arg(long, help = "Rows to skip")]
        offset: Option<u32>,
    },

    #[command(about = "Create a funnel")]
    Create {
        #[arg(help = "Funnel name")]
        name: String,
        #[arg(long, help = "Template to seed the funnel with (adds a Home page)")]
        template: Option<String>,
    },
}

pub async fn handle(cmd: FunnelCommands, config: &ClientConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = config.api_client()?;

    match cmd {
        FunnelCommands::List { published, limit, offset } => {
            let data = client
                .list_funnels(&ListFunnelsParams { published, limit, offset })
                .await?;
            let funnels = data["funnels"].as_array().cloned().unwrap_or_default();

            if funnels.is_empty() {
                return output_empty_collection(&output_format, "funnels", "No funnels found");
            }

            match output_format {
                OutputFormat::Json => output_success(&output_format, "Funnels listed", Some(data)),
                OutputFormat::Text => {
                    for funnel in &funnels {
                        print_funnel(funnel);
                    }
                    let pagination = &data["pagination"];
                    println!(
                        "{} of {} (offset {}{})",
                        funnels.len(),
                        pagination["total"],
                        pagination["offset"],
                        if pagination["hasMore"].as_bool() == Some(true) { ", more available" } else { "" }
                    );
                    Ok(())
                }
            }
        }
        FunnelCommands::Create { name, template } => {
            let data = client.create_funnel(&name, template.as_deref()).await?;
            if let OutputFormat::Text = output_format {
                print_funnel(&data["funnel"]);
                if template.is_some() && data["pageCreated"].as_bool() != Some(true) {
                    eprintln!("Warning: funnel created but its Home page could not be added");
                }
            }
            output_success(&output_format, "Funnel created successfully", Some(data))
        }
    }
}

fn print_funnel(funnel: &Value) {
    println!("{}", funnel["name"].as_str().unwrap_or("(unnamed)"));
    print_fields(funnel, &["id", "published", "created_at"]);
    if let Some(pages) = funnel["pages"].as_array() {
        println!("  pages: {}", pages.len());
    }
}
