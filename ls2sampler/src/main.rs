use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod config;
mod interrupt;
use cli::Cli;
use interrupt::Outcome;

fn main() -> Result<()> {
    // Parse CLI arguments first to get verbosity level
    let cli = Cli::parse();

    // stdout carries the directives, so logs go to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())))
        .init();

    debug!("Arguments: {:?}", cli);

    let runtime = tokio::runtime::Runtime::new()?;
    let work = move || cli::convert::execute(&cli);
    match runtime.block_on(interrupt::run_until(work, interrupt::ctrl_c()))? {
        Outcome::Finished(()) => Ok(()),
        Outcome::Interrupted => {
            info!("Interrupted, exiting");
            // the blocking read may still be running, so skip the runtime shutdown
            std::process::exit(0)
        }
    }
}
