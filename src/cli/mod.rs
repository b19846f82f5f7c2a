//! CLI module for the points ledger
//!
//! Every command runs against the storage backend selected by `STORAGE_TYPE`.

pub mod ledger;

use clap::{Args, Parser, Subcommand};

/// Points ledger - give points and inspect per-user totals
#[derive(Parser)]
#[command(name = "points-ledger")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Give points from one user to another
    Give(GiveArgs),

    /// Show how many points a user has received
    Received(UserArgs),

    /// Show how many points a user can still give
    Remaining(UserArgs),

    /// Rank users by points received
    Leaderboard(LeaderboardArgs),
}

#[derive(Args, Debug, PartialEq)]
pub struct GiveArgs {
    /// User giving the points
    #[arg(long)]
    pub from: String,

    /// User receiving the points
    #[arg(long)]
    pub to: String,

    /// Number of points to give
    #[arg(long, required_unless_present = "all", conflicts_with = "all")]
    pub amount: Option<u64>,

    /// Give every point the giver has left
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug, PartialEq)]
pub struct UserArgs {
    /// User id
    #[arg(long)]
    pub user: String,
}

#[derive(Args, Debug, PartialEq)]
pub struct LeaderboardArgs {
    /// Show only the top N users
    #[arg(long)]
    pub limit: Option<usize>,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}
