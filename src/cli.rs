use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;

use crate::config::Config;

/// Win/loss statistics and improvement insights from a PGN game archive.
///
/// Single-player mode (default) tracks one identity across the given
/// archives. Passing one or more `--account` switches to cross-account mode,
/// which merges the archives of several accounts belonging to one person.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// PGN archives to read (`.zst` is decoded); stdin when omitted
    pub files: Vec<PathBuf>,

    /// Exact name of the tracked player (overrides CHESS_PLAYER and config.toml)
    #[arg(short, long)]
    pub player: Option<String>,

    /// Account to merge in cross-account mode (repeatable)
    #[arg(long = "account")]
    pub accounts: Vec<String>,

    /// CSV of opening and ECO performance
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Markdown insights report
    #[arg(long)]
    pub insights: Option<PathBuf>,

    /// JSON dump of the aggregated statistics
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Configuration file
    #[arg(long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Detailed timings/logs
    #[arg(short, long)]
    pub verbose: bool,
}

/// Which analysis a run performs.
#[derive(Debug, PartialEq, Eq)]
pub enum Mode {
    Single(String),
    Combined(Vec<String>),
}

/// `--account` always selects cross-account mode. Otherwise the tracked
/// player (CLI > CHESS_PLAYER > config) selects single-player mode; config
/// `accounts` are used only when no player is known at all.
pub fn resolve_mode(args: &Args, cfg: &Config) -> anyhow::Result<Mode> {
    if !args.accounts.is_empty() {
        return Ok(Mode::Combined(args.accounts.clone()));
    }
    if let Some(player) = args.player.clone().or_else(|| cfg.player.clone()) {
        return Ok(Mode::Single(player));
    }
    if !cfg.accounts.is_empty() {
        return Ok(Mode::Combined(cfg.accounts.clone()));
    }
    bail!("no player given: pass --player, set CHESS_PLAYER, or set `player` in config.toml")
}
