mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use pdfvert::config::Config;
use pdfvert::observability::init_tracing;
use pdfvert::tools::ToolCatalog;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            init_tracing();
            let config = match args.config {
                Some(path) => Config::load_from_path(path)?,
                None => Config::load()?,
            };
            pdfvert::api::run(config, args.address).await?
        }
        Commands::Tools => print_tools(&ToolCatalog::builtin()),
    }

    Ok(())
}

fn print_tools(catalog: &ToolCatalog) {
    for tool in catalog.iter() {
        println!(
            "{:<18} {:<20} {:<18} {}",
            tool.id,
            tool.title,
            tool.accept_attr(),
            if tool.allows_multiple_files { "multiple" } else { "single" }
        );
    }
}
