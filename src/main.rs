mod aggregator;
mod archive;
mod cli;
mod combined;
mod config;
mod eco;
mod insights;
mod model;
mod pgn;
mod quality;
mod report;
mod timecontrol;
mod verbose;

use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info, warn};

use cli::{Args, Mode};
use config::Config;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    verbose::init(args.verbose);
    let cfg = Config::load(&args.config)?;

    if let Some(n) = cfg.rayon_threads {
        let _ = rayon::ThreadPoolBuilder::new().num_threads(n).build_global();
    }

    match cli::resolve_mode(&args, &cfg)? {
        Mode::Combined(accounts) => run_combined(&args, &cfg, &accounts),
        Mode::Single(player) => run_single(&args, &cfg, &player),
    }
}

fn run_single(args: &Args, cfg: &Config, player: &str) -> anyhow::Result<()> {
    let t0 = Instant::now();
    let records = archive::load_records(&args.files)?;
    info!("parsed {} games", records.len());

    let stats = aggregator::aggregate(&records, player);
    debug!(
        "aggregated in {:.3}s; rated games={}",
        t0.elapsed().as_secs_f64(),
        stats.rating_history.len()
    );
    if stats.total_games == 0 {
        warn!("no games found in the input");
    }

    print!("{}", report::summary(&stats, player));

    if let Some(out) = args.out.as_deref() {
        aggregator::write_csv(&stats, out)
            .with_context(|| format!("writing {}", out.display()))?;
        info!("CSV written to {}", out.display());
    }
    if let Some(path) = args.insights.as_deref() {
        report::write_text(path, &report::insights_markdown(&stats, cfg))?;
        info!("insights written to {}", path.display());
    }
    if let Some(path) = args.json.as_deref() {
        report::write_json(&stats, path)?;
        info!("JSON written to {}", path.display());
    }
    Ok(())
}

fn run_combined(args: &Args, cfg: &Config, accounts: &[String]) -> anyhow::Result<()> {
    let records = archive::load_records(&args.files)?;
    let games = combined::collect_games(&records, accounts);
    info!(
        "parsed {} games, {} belong to {}",
        records.len(),
        games.len(),
        accounts.join(", ")
    );

    let stats = combined::analyze(&games, cfg);
    print!("{}", report::combined_summary(&stats));

    if let Some(path) = args.insights.as_deref() {
        report::write_text(path, &report::combined_markdown(&stats, cfg))?;
        info!("combined report written to {}", path.display());
    }
    if args.out.is_some() || args.json.is_some() {
        warn!("--out/--json apply to single-player runs only; ignored");
    }
    Ok(())
}
