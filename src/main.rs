use clap::Parser;
use points_ledger::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli::ledger::run(cli.command).await
}
