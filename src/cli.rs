use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pdfvert")]
#[command(about = "PDFvert file conversion server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// List the available conversion tools
    Tools,
}

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides `server.bind_addr`)
    #[arg(long)]
    pub address: Option<SocketAddr>,

    /// Configuration file (overrides `PDFVERT_CONFIG`)
    #[arg(long)]
    pub config: Option<PathBuf>,
}
