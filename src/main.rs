use anyhow::Result;
use clap::Parser;
use runetype::cli::{self, Cli};
use runetype::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Routes log::info!() etc. to stderr. --log-level takes precedence over DEBUG_LEVEL.
    debug::init_log_bridge(cli.log_level);
    log::info!("runetype {}", runetype::VERSION);

    let result = cli::run(&cli);
    if let Err(ref e) = result {
        eprintln!("runetype: error: {e:#}");
    }
    result
}
