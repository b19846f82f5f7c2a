//! Ledger commands

use std::io::Write;

use crate::cli::{Command, GiveArgs, LeaderboardArgs};
use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::infrastructure::points::{
    GiveOutcome, PointsService, PointsStorageFactory, StorageConfig,
};

/// Load configuration, connect storage and run one command
pub async fn run(command: Command) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);

    let storage_config = StorageConfig::from_env()?;
    tracing::debug!(backend = %storage_config.storage_type, "Creating points storage");

    let storage = PointsStorageFactory::new().create(&storage_config).await?;
    let service = PointsService::new(storage, config.ledger.allowance);

    execute(&service, command, &mut std::io::stdout()).await
}

/// Run a command against a service, writing the result to `out`
pub async fn execute<W: Write>(
    service: &PointsService,
    command: Command,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Command::Give(args) => give(service, args, out).await,
        Command::Received(args) => {
            let points = service.points_received(&args.user).await?;
            writeln!(out, "{} has received {} points", args.user, points)?;
            Ok(())
        }
        Command::Remaining(args) => {
            let points = service.points_remaining(&args.user).await?;
            writeln!(out, "{} has {} points remaining", args.user, points)?;
            Ok(())
        }
        Command::Leaderboard(args) => leaderboard(service, args, out).await,
    }
}

async fn give<W: Write>(service: &PointsService, args: GiveArgs, out: &mut W) -> anyhow::Result<()> {
    let outcome = match args.amount {
        Some(amount) if !args.all => service.give(&args.from, &args.to, amount).await?,
        _ => service.give_remaining(&args.from, &args.to).await?,
    };

    match outcome {
        GiveOutcome::Given { amount } => {
            writeln!(out, "{} gave {} points to {}", args.from, amount, args.to)?
        }
        GiveOutcome::Insufficient { remaining } => writeln!(
            out,
            "{} does not have enough points ({} remaining)",
            args.from, remaining
        )?,
    }

    Ok(())
}

async fn leaderboard<W: Write>(
    service: &PointsService,
    args: LeaderboardArgs,
    out: &mut W,
) -> anyhow::Result<()> {
    let board = service.leaderboard(args.limit).await?;

    if args.json {
        serde_json::to_writer(&mut *out, &board)?;
        writeln!(out)?;
        return Ok(());
    }

    for (idx, entry) in board.iter().enumerate() {
        writeln!(out, "{}. {} has {} points", idx + 1, entry.user_id, entry.points_received)?;
    }

    Ok(())
}
