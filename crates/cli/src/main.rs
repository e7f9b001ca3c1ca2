use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use fontgen_cli::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();
    cli.run()
}
