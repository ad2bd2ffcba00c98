use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;

use crate::combined::{CombinedStats, Season, TimePeriod};
use crate::config::Config;
use crate::eco::family_performance;
use crate::insights::{best_and_worst_openings, top_openings, win_rate_by_rating_gap};
use crate::model::{pct, AggregateStats, UNKNOWN};
use crate::timecontrol::category_distribution;

const RULE: &str = "============================================================";

/// Short console summary for a single-player run.
pub fn summary(stats: &AggregateStats, player: &str) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "{RULE}");
    let _ = writeln!(s, "CHESS ANALYSIS SUMMARY ({player})");
    let _ = writeln!(s, "{RULE}");
    let _ = writeln!(s, "Total Games Analyzed: {}", stats.total_games);
    let _ = writeln!(s, "Win Rate: {:.1}%", stats.win_rate());
    let _ = writeln!(s, "White Win Rate: {:.1}%", stats.white_win_rate());
    let _ = writeln!(s, "Black Win Rate: {:.1}%", stats.black_win_rate());
    if let Some(r) = stats.rating_summary() {
        let _ = writeln!(s, "Rating Change: {:+}", r.change);
        let _ = writeln!(s, "Peak Rating: {}", r.peak);
    }
    let _ = writeln!(s, "Most Played Openings:");
    for (name, c) in top_openings(stats, 5) {
        let _ = writeln!(
            s,
            "  - {}: {} games ({:.1}% WR)",
            truncate(name, 50),
            c.total,
            c.win_rate()
        );
    }
    let _ = writeln!(s, "{RULE}");
    s
}

/// Markdown insights report for a single-player run.
pub fn insights_markdown(stats: &AggregateStats, cfg: &Config) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "# Chess Performance Analysis & Improvement Insights\n");

    let _ = writeln!(s, "## Overall Performance");
    let _ = writeln!(s, "- **Total Games**: {}", stats.total_games);
    let _ = writeln!(s, "- **Win Rate**: {:.1}%", stats.win_rate());
    let _ = writeln!(
        s,
        "- **Wins**: {} | **Losses**: {} | **Draws**: {}\n",
        stats.wins, stats.losses, stats.draws
    );

    color_section(&mut s, stats);
    rating_section(&mut s, stats);
    opening_section(&mut s, stats, cfg);
    quality_section(&mut s, stats);
    families_section(&mut s, stats, cfg);
    time_control_section(&mut s, stats);
    gap_section(&mut s, stats, cfg);
    s
}

fn color_section(s: &mut String, stats: &AggregateStats) {
    let (w, b) = (stats.white_win_rate(), stats.black_win_rate());
    let _ = writeln!(s, "## Color Performance");
    let _ = writeln!(
        s,
        "- **As White**: {:.1}% win rate ({}/{} games)",
        w, stats.white_wins, stats.white_games
    );
    let _ = writeln!(
        s,
        "- **As Black**: {:.1}% win rate ({}/{} games)",
        b, stats.black_wins, stats.black_games
    );
    if w > b + 10.0 {
        let _ = writeln!(
            s,
            "- **INSIGHT**: You perform {:.1}% better as White. Focus on improving the Black repertoire.",
            w - b
        );
    } else if b > w + 10.0 {
        let _ = writeln!(
            s,
            "- **INSIGHT**: You perform {:.1}% better as Black. Review White opening preparation.",
            b - w
        );
    } else {
        let _ = writeln!(s, "- **INSIGHT**: Balanced performance with both colors.");
    }
    s.push('\n');
}

fn rating_section(s: &mut String, stats: &AggregateStats) {
    let Some(r) = stats.rating_summary() else {
        return;
    };
    let _ = writeln!(s, "## Rating Progress");
    let _ = writeln!(s, "- **Starting Rating**: {}", r.start);
    let _ = writeln!(s, "- **Current Rating**: {}", r.current);
    let _ = writeln!(s, "- **Peak Rating**: {}", r.peak);
    let _ = writeln!(s, "- **Change**: {:+} points", r.change);
    let _ = writeln!(s, "- **Average Opponent**: {:.0}", stats.avg_opponent_rating());
    let trend = stats.rating_trend();
    if let Some(best) = trend.iter().max() {
        let worst = trend.iter().min().copied().unwrap_or(*best);
        let _ = writeln!(s, "- **Best / worst swing between games**: {:+} / {:+}", best, worst);
    }
    if r.change > 0 {
        let _ = writeln!(s, "- **INSIGHT**: Positive rating trend. Keep up the good work.");
    } else {
        let _ = writeln!(
            s,
            "- **INSIGHT**: Rating declined. Review recent losses and focus on consistency."
        );
    }
    s.push('\n');
}

fn opening_section(s: &mut String, stats: &AggregateStats, cfg: &Config) {
    let _ = writeln!(s, "## Opening Performance");
    let _ = writeln!(s, "**Most played**:");
    for (name, c) in top_openings(stats, cfg.top_openings) {
        let _ = writeln!(
            s,
            "- {}: {} games, {:.1}% win rate",
            truncate(name, 40),
            c.total,
            c.win_rate()
        );
    }

    let min = cfg.min_opening_games;
    let (best, worst) = best_and_worst_openings(stats, min, 3);
    if let (Some(top), Some(bottom)) = (best.first(), worst.first()) {
        let _ = writeln!(s, "\n**Best Openings ({min}+ games)**:");
        for (name, c) in &best {
            let _ = writeln!(s, "- {}: {:.1}% ({} games)", name, c.win_rate(), c.total);
        }
        let _ = writeln!(s, "\n**Weakest Openings ({min}+ games)**:");
        for (name, c) in &worst {
            let _ = writeln!(s, "- {}: {:.1}% ({} games)", name, c.win_rate(), c.total);
        }
        let _ = writeln!(
            s,
            "\n- **INSIGHT**: Avoid '{}' (your weakest opening) or study it more deeply.",
            bottom.0
        );
        let _ = writeln!(
            s,
            "- **INSIGHT**: '{}' is your strongest opening. Play it more often.",
            top.0
        );
    }
    s.push('\n');
}

fn quality_section(s: &mut String, stats: &AggregateStats) {
    if stats.move_quality.is_empty() {
        return;
    }
    let blunders = stats.avg_blunders();
    let _ = writeln!(s, "## Move Quality Analysis");
    let _ = writeln!(s, "- **Average Blunders per game**: {:.2}", blunders);
    let _ = writeln!(s, "- **Average Mistakes per game**: {:.2}", stats.avg_mistakes());
    let _ = writeln!(s, "- **Average Inaccuracies per game**: {:.2}", stats.avg_inaccuracies());
    if blunders > 1.5 {
        let _ = writeln!(
            s,
            "- **CRITICAL**: Too many blunders. Slow down and double-check moves before playing."
        );
    } else if blunders > 0.8 {
        let _ = writeln!(
            s,
            "- **INSIGHT**: Work on reducing blunders through tactics training and careful play."
        );
    } else {
        let _ = writeln!(s, "- **INSIGHT**: Good blunder rate. Keep maintaining focus.");
    }
    s.push('\n');

    let avg_moves = stats.avg_move_count();
    let _ = writeln!(s, "## Game Characteristics");
    let _ = writeln!(s, "- **Average Game Length**: {:.1} moves", avg_moves);
    if avg_moves < 30.0 {
        let _ = writeln!(
            s,
            "- **INSIGHT**: Games end quickly. Focus on surviving the opening and early middlegame."
        );
    } else if avg_moves > 50.0 {
        let _ = writeln!(
            s,
            "- **INSIGHT**: Games go long. Study endgame technique to convert advantages."
        );
    }
    let _ = writeln!(s, "\n**Terminations**:");
    for (reason, n) in &stats.terminations {
        let _ = writeln!(s, "- {}: {} ({:.1}%)", reason, n, pct(*n, stats.total_games));
    }
    s.push('\n');
}

fn families_section(s: &mut String, stats: &AggregateStats, cfg: &Config) {
    let fams = family_performance(&stats.eco_codes);
    if fams.is_empty() {
        return;
    }
    let mut rows: Vec<_> = fams.iter().collect();
    rows.sort_by_key(|(_, (_, c))| std::cmp::Reverse(c.total));
    let _ = writeln!(s, "## Opening Families (ECO)");
    for (label, (name, c)) in rows.into_iter().take(cfg.top_openings) {
        let _ = writeln!(
            s,
            "- {} {}: {} games, {:.1}% win rate",
            label,
            name,
            c.total,
            c.win_rate()
        );
    }
    s.push('\n');
}

fn time_control_section(s: &mut String, stats: &AggregateStats) {
    if stats.time_controls.is_empty() {
        return;
    }
    let _ = writeln!(s, "## Time Controls");
    for (cat, n) in category_distribution(&stats.time_controls) {
        let label = cat.map(|c| c.as_str()).unwrap_or(UNKNOWN);
        let _ = writeln!(s, "- {}: {} games", label, n);
    }
    s.push('\n');
}

fn gap_section(s: &mut String, stats: &AggregateStats, cfg: &Config) {
    let buckets = win_rate_by_rating_gap(stats, cfg.rating_bucket);
    if buckets.is_empty() {
        return;
    }
    let width = i64::from(cfg.rating_bucket.max(1));
    let _ = writeln!(s, "## Win Rate vs Rating Difference");
    for (gap, b) in &buckets {
        let _ = writeln!(
            s,
            "- {:+} to {:+}: {:.1}% ({} games)",
            gap,
            gap + width - 1,
            b.win_rate(),
            b.games
        );
    }
    s.push('\n');
}

/// Markdown report for a cross-account run.
pub fn combined_markdown(stats: &CombinedStats, cfg: &Config) -> String {
    let mut s = String::new();
    let o = &stats.overall;
    let _ = writeln!(s, "# Combined Account Analysis\n");
    let _ = writeln!(s, "## Results");
    let _ = writeln!(
        s,
        "- **Games**: {} | **Wins**: {} | **Losses**: {} | **Draws**: {}",
        o.total, o.wins, o.losses, o.draws
    );
    let _ = writeln!(s, "- **Win Rate**: {:.1}%", o.win_rate());
    let _ = writeln!(
        s,
        "- **As White**: {:.1}% ({} games) | **As Black**: {:.1}% ({} games)",
        stats.as_white.win_rate(),
        stats.as_white.total,
        stats.as_black.win_rate(),
        stats.as_black.total
    );
    let _ = writeln!(s, "- **Average Game Length**: {:.1} moves", stats.avg_move_count());
    if stats.undated_games > 0 {
        let _ = writeln!(s, "- {} game(s) without UTC date/time", stats.undated_games);
    }
    s.push('\n');

    let _ = writeln!(s, "## Accounts");
    for (account, c) in &stats.per_account {
        let _ = write!(s, "- {}: {} games, {:.1}% win rate", account, c.total, c.win_rate());
        if let Some(journey) = stats.journeys.get(account).and_then(|j| j.last()) {
            let _ = write!(s, ", rating journey ends at {}", journey.rating);
        }
        if let Some(peak) = stats.peak_ratings.get(account) {
            let _ = write!(s, ", peak tagged rating {}", peak);
        }
        s.push('\n');
    }
    s.push('\n');

    let _ = writeln!(s, "## By Game Type");
    for (gt, c) in &stats.by_game_type {
        let label = gt.map(|g| g.as_str()).unwrap_or(UNKNOWN);
        let _ = writeln!(s, "- {}: {:.1}% ({} games)", label, c.win_rate(), c.total);
    }
    s.push('\n');

    let _ = writeln!(s, "## By Time of Day");
    for (period, c) in &stats.by_period {
        let _ = writeln!(s, "- {}: {:.1}% ({} games)", period.as_str(), c.win_rate(), c.total);
    }
    match stats.peak_and_worst_hour(cfg.min_hour_games) {
        Some((peak, worst)) => {
            let _ = writeln!(
                s,
                "- Peak hour {:02}:00, worst hour {:02}:00 (hours with {}+ games)",
                peak, worst, cfg.min_hour_games
            );
        }
        None => {
            let _ = writeln!(s, "- No hour has {}+ games", cfg.min_hour_games);
        }
    }
    s.push('\n');

    let _ = writeln!(s, "## By Season");
    for (season, c) in &stats.by_season {
        let _ = writeln!(s, "- {}: {:.1}% ({} games)", season.as_str(), c.win_rate(), c.total);
    }
    let _ = writeln!(
        s,
        "- Weekday: {:.1}% ({} games) | Weekend: {:.1}% ({} games)\n",
        stats.weekday.win_rate(),
        stats.weekday.total,
        stats.weekend.win_rate(),
        stats.weekend.total
    );

    let _ = writeln!(s, "## Top Openings");
    for (name, c) in stats.top_openings(cfg.top_openings) {
        let _ = writeln!(s, "- {}: {:.1}% ({} games)", truncate(name, 40), c.win_rate(), c.total);
    }
    s.push('\n');

    let _ = writeln!(s, "## Terminations");
    for (reason, n) in &stats.by_termination {
        let _ = writeln!(s, "- {}: {}", reason, n);
    }
    s.push('\n');

    if let Some(Some(last)) = stats.rolling_win_rate.iter().rev().find(|r| r.is_some()) {
        let _ = writeln!(
            s,
            "## Form\n- Rolling win rate over the last {} games: {:.1}%\n",
            cfg.rolling_window, last
        );
    }
    s
}

/// Console one-liner per account for a cross-account run.
pub fn combined_summary(stats: &CombinedStats) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "{RULE}");
    let _ = writeln!(s, "COMBINED ANALYSIS: {} games", stats.overall.total);
    for (account, c) in &stats.per_account {
        let _ = writeln!(s, "  - {}: {} games ({:.1}% WR)", account, c.total, c.win_rate());
    }
    if let Some((season, c)) = best_group(stats.by_season.iter()) {
        let _ = writeln!(s, "Best season: {} ({:.1}%)", Season::as_str(*season), c);
    }
    if let Some((period, c)) = best_group(stats.by_period.iter()) {
        let _ = writeln!(s, "Best time of day: {} ({:.1}%)", TimePeriod::as_str(*period), c);
    }
    let _ = writeln!(s, "{RULE}");
    s
}

fn best_group<'a, K: 'a>(
    groups: impl Iterator<Item = (&'a K, &'a crate::model::ResultCounter)>,
) -> Option<(&'a K, f64)> {
    groups
        .filter(|(_, c)| c.total > 0)
        .map(|(k, c)| (k, c.win_rate()))
        .fold(None, |best, (k, r)| match best {
            Some((_, br)) if br >= r => best,
            _ => Some((k, r)),
        })
}

pub fn write_text(path: &Path, body: &str) -> anyhow::Result<()> {
    std::fs::write(path, body).with_context(|| format!("writing {}", path.display()))
}

pub fn write_json(stats: &AggregateStats, path: &Path) -> anyhow::Result<()> {
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, stats)
        .with_context(|| format!("serializing to {}", path.display()))?;
    w.flush()?;
    Ok(())
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::aggregate;
    use crate::pgn::parse_records;

    const ARCHIVE: &str = "[White \"Me\"]\n[Black \"A\"]\n[Result \"1-0\"]\n[WhiteElo \"1500\"]\n\
        [BlackElo \"1480\"]\n[Opening \"Italian Game\"]\n[ECO \"C50\"]\n[TimeControl \"300+0\"]\n\
        [Termination \"Normal\"]\n\n1. e4 e5 2. Nf3?? 1-0\n\n\n\
        [White \"B\"]\n[Black \"Me\"]\n[Result \"1-0\"]\n[WhiteElo \"1550\"]\n[BlackElo \"1492\"]\n\
        [Opening \"Italian Game\"]\n[ECO \"C50\"]\n[TimeControl \"60+0\"]\n[Termination \"Time forfeit\"]\n\
        \n1. e4 e5? 1-0\n\n\n\
        [White \"Me\"]\n[Black \"C\"]\n[Result \"1/2-1/2\"]\n[WhiteElo \"1492\"]\n[BlackElo \"1490\"]\n\
        [Opening \"Italian Game\"]\n[ECO \"C50\"]\n\n1. d4 d5 1/2-1/2\n\n\n";

    #[test]
    fn insights_cover_sections() {
        let stats = aggregate(&parse_records(ARCHIVE), "Me");
        let md = insights_markdown(&stats, &Config::default());
        assert!(md.starts_with("# Chess Performance Analysis"));
        assert!(md.contains("- **Total Games**: 3"));
        assert!(md.contains("- **Wins**: 1 | **Losses**: 1 | **Draws**: 1"));
        assert!(md.contains("- **As White**: 50.0% win rate (1/2 games)"));
        assert!(md.contains("better as White"));
        assert!(md.contains("- **Change**: -8 points"));
        assert!(md.contains("**Best Openings (3+ games)**"));
        assert!(md.contains("- Italian Game: 33.3% (3 games)"));
        assert!(md.contains("- C50 Italian Game: 3 games, 33.3% win rate"));
        assert!(md.contains("- blitz: 1 games"));
        assert!(md.contains("- bullet: 1 games"));
        assert!(md.contains("- Unknown: 1 games"));
        assert!(md.contains("- Time forfeit: 1 (33.3%)"));
        assert!(md.contains("## Win Rate vs Rating Difference"));
    }

    #[test]
    fn extreme_ratings_render_widened() {
        let text = "[White \"Me\"]\n[Black \"A\"]\n[Result \"1-0\"]\n[WhiteElo \"2000000000\"]\n\
            [BlackElo \"-2000000000\"]\n\n\n\
            [White \"B\"]\n[Black \"Me\"]\n[Result \"1-0\"]\n[WhiteElo \"2000000000\"]\n\
            [BlackElo \"-2000000000\"]\n\n\n";
        let stats = aggregate(&parse_records(text), "Me");
        let md = insights_markdown(&stats, &Config::default());
        assert!(md.contains("- **Change**: -4000000000 points"));
        assert!(md.contains("- +4000000000 to +4000000049: 100.0% (1 games)"));
        assert!(md.contains("- -4000000000 to -3999999951: 0.0% (1 games)"));
    }

    #[test]
    fn empty_stats_render_without_panicking() {
        let stats = AggregateStats::default();
        let md = insights_markdown(&stats, &Config::default());
        assert!(md.contains("- **Total Games**: 0"));
        assert!(md.contains("- **Win Rate**: 0.0%"));
        assert!(!md.contains("## Rating Progress"));
        let sum = summary(&stats, "Me");
        assert!(sum.contains("Win Rate: 0.0%"));
    }

    #[test]
    fn json_dump_round_trips_counters() {
        let stats = aggregate(&parse_records(ARCHIVE), "Me");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        write_json(&stats, &path).unwrap();
        let v: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v["total_games"], 3);
        assert_eq!(v["openings"]["Italian Game"]["total"], 3);
        assert_eq!(v["rated_outcomes"][0], "win");
        assert_eq!(v["move_quality"][0]["blunders"], 1);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("Grünfeld Defense", 3), "Grü");
        assert_eq!(truncate("abc", 10), "abc");
    }

    #[test]
    fn best_group_prefers_first_on_ties() {
        use crate::model::ResultCounter;
        let rows = [
            ("a", ResultCounter { wins: 1, losses: 1, draws: 0, total: 2 }),
            ("b", ResultCounter { wins: 2, losses: 2, draws: 0, total: 4 }),
            ("c", ResultCounter::default()),
        ];
        let best = best_group(rows.iter().map(|(k, c)| (k, c)));
        assert_eq!(best.map(|(k, _)| *k), Some("a"));
    }
}
