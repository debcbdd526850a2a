use clap::Subcommand;

use crate::cli::config::ClientConfig;
use crate::cli::utils::{output_success, print_fields};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum TemplateCommands {
    #[command(about = "Show a workflow template available in a workspace")]
    Show {
        #[arg(help = "Workspace UUID")]
        workspace_id: String,
        #[arg(help = "Template id (e.g. lead-capture-nurture)")]
        template_id: String,
    },
}

pub async fn handle(cmd: TemplateCommands, config: &ClientConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = config.api_client()?;

    match cmd {
        TemplateCommands::Show { workspace_id, template_id } => {
            let data = client.workflow_template(&workspace_id, &template_id).await?;
            if let OutputFormat::Text = output_format {
                let template = &data["template"];
                println!("{}", template["name"].as_str().unwrap_or(&template_id));
                print_fields(template, &["id", "category", "description"]);
                if let Some(required) = template["requiredVariables"].as_array() {
                    let names: Vec<&str> = required.iter().filter_map(|v| v.as_str()).collect();
                    println!("  required variables: {}", names.join(", "));
                }
            }
            output_success(&output_format, "Template fetched", Some(data))
        }
    }
}
