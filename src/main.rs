mod cli;

use clap::Parser;
use cli::{Cli, Commands, InspectArgs};
use windowcount::config::Config;
use windowcount::observability;
use windowcount::window::{Clock, MalformedLines, SystemClock, inspect_file};

type AnyError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    observability::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            let mut config = Config::load_with(args.config)?;
            if let Some(address) = args.address {
                config.server.bind_addr = address;
            }
            windowcount::api::run(config).await?
        }
        Commands::Inspect(args) => inspect(args).await?,
    }

    Ok(())
}

async fn inspect(args: InspectArgs) -> Result<(), AnyError> {
    let malformed = if args.skip_malformed {
        MalformedLines::Skip
    } else {
        MalformedLines::Fail
    };
    let threshold = i64::try_from(args.threshold.as_secs())?;

    let report = inspect_file(&args.file, malformed, SystemClock.now(), threshold).await?;

    println!("active: {}", report.count());
    println!("expired: {}", report.expired);
    if args.list {
        for timestamp in &report.active {
            println!("{timestamp}");
        }
    }

    Ok(())
}
