use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use windowcount::humanize::HumanDuration;

#[derive(Parser, Debug)]
#[command(name = "windowcount")]
#[command(about = "Sliding-window event counter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Print the active entries of a timestamp file without modifying it
    Inspect(InspectArgs),
}

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Configuration file (defaults to $WINDOWCOUNT_CONFIG or config/windowcount.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override server.bind_addr
    #[arg(long)]
    pub address: Option<SocketAddr>,
}

#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    /// Timestamp file to read
    pub file: PathBuf,

    /// Window length, e.g. "60", "90s", "5m"
    #[arg(long, default_value = "60s")]
    pub threshold: HumanDuration,

    /// Drop malformed lines instead of failing
    #[arg(long)]
    pub skip_malformed: bool,

    /// Also print every active timestamp
    #[arg(long)]
    pub list: bool,
}
