use clap::Parser;
use pmp_inference_cache::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Key(args) => cli::key::run(args).await,
        Command::Simulate(args) => cli::simulate::run(args).await,
    }
}
