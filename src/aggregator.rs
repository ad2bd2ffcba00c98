use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::model::{AggregateStats, GameRecord, Outcome, ResultCounter, Side, UNKNOWN};
use crate::pgn::parse_rating;
use crate::quality;

/// Single pass over `records`, tracking the player named `identity`.
pub fn aggregate(records: &[GameRecord], identity: &str) -> AggregateStats {
    let mut stats = AggregateStats::default();
    for rec in records {
        process_game(rec, identity, &mut stats);
    }
    stats
}

/// Which side the tracked player had. Anything but an exact White match is Black.
pub fn side_of(rec: &GameRecord, identity: &str) -> Side {
    if rec.get("White") == Some(identity) {
        Side::White
    } else {
        Side::Black
    }
}

/// Update aggregates with one game.
fn process_game(rec: &GameRecord, identity: &str, stats: &mut AggregateStats) {
    stats.total_games += 1;

    let side = side_of(rec, identity);
    match side {
        Side::White => stats.white_games += 1,
        Side::Black => stats.black_games += 1,
    }

    let outcome = Outcome::classify(rec.get("Result").unwrap_or(""), side);
    match outcome {
        Outcome::Win => {
            stats.wins += 1;
            match side {
                Side::White => stats.white_wins += 1,
                Side::Black => stats.black_wins += 1,
            }
        }
        Outcome::Loss => stats.losses += 1,
        Outcome::Draw => stats.draws += 1,
        Outcome::Unclassified => {}
    }

    bump(&mut stats.openings, rec.get_or_unknown("Opening"), outcome);
    bump(&mut stats.eco_codes, rec.get_or_unknown("ECO"), outcome);

    // both ratings or neither
    let own = parse_rating(rec.get(side.elo_tag()));
    let opp = parse_rating(rec.get(side.opponent().elo_tag()));
    if let (Some(own), Some(opp)) = (own, opp) {
        stats.rating_history.push(own);
        stats.opponent_ratings.push(opp);
        stats.rated_outcomes.push(outcome);
    }
    if let Some(delta) = parse_rating(rec.get(side.rating_diff_tag())) {
        stats.rating_deltas.push(delta);
    }

    *stats
        .terminations
        .entry(rec.get_or_unknown("Termination").to_string())
        .or_default() += 1;
    *stats
        .time_controls
        .entry(rec.get_or_unknown("TimeControl").to_string())
        .or_default() += 1;

    stats.move_quality.push(quality::scan(&rec.move_text));
}

fn bump(map: &mut BTreeMap<String, ResultCounter>, key: &str, outcome: Outcome) {
    map.entry(key.to_string()).or_default().add(outcome);
}

/// Opening and ECO performance as CSV (percentages included).
pub fn write_csv(stats: &AggregateStats, out_path: &Path) -> io::Result<()> {
    let f = File::create(out_path)?;
    let mut w = BufWriter::new(f);
    writeln!(w, "kind,name,games,wins,losses,draws,win_pct")?;
    for (kind, map) in [("opening", &stats.openings), ("eco", &stats.eco_codes)] {
        for (name, c) in sorted_by_games(map) {
            writeln!(
                w,
                "{},{},{},{},{},{},{:.3}",
                kind,
                escape_csv(name),
                c.total,
                c.wins,
                c.losses,
                c.draws,
                c.win_rate()
            )?;
        }
    }
    w.flush()
}

/// Entries by games played, most first; ties by name.
pub fn sorted_by_games(map: &BTreeMap<String, ResultCounter>) -> Vec<(&String, &ResultCounter)> {
    let mut entries: Vec<_> = map.iter().collect();
    // BTreeMap iteration is name-ordered and sort_by_key is stable
    entries.sort_by_key(|(_, c)| std::cmp::Reverse(c.total));
    entries
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MoveQuality;
    use crate::pgn::parse_records;

    fn run(text: &str, who: &str) -> AggregateStats {
        aggregate(&parse_records(text), who)
    }

    #[test]
    fn scenario_white_win_with_blunder() {
        let s = run("[White \"P1\"]\n[Black \"P2\"]\n[Result \"1-0\"]\n1.e4 e5 2.Nf3??", "P1");
        assert_eq!(s.total_games, 1);
        assert_eq!((s.white_games, s.black_games), (1, 0));
        assert_eq!((s.wins, s.losses, s.draws), (1, 0, 0));
        assert_eq!(s.white_wins, 1);
        assert_eq!(
            s.move_quality,
            vec![MoveQuality { blunders: 1, mistakes: 0, inaccuracies: 0, move_count: 2 }]
        );
    }

    #[test]
    fn unmatched_identity_draw_counts_as_black() {
        let s = run("[White \"A\"]\n[Black \"B\"]\n[Result \"1/2-1/2\"]\n1.d4", "Z");
        assert_eq!((s.white_games, s.black_games), (0, 1));
        assert_eq!(s.draws, 1);
        assert_eq!(s.wins + s.losses, 0);
    }

    #[test]
    fn unmatched_identity_is_scored_as_black() {
        // "1-0" with nobody matching is a loss under the Black assumption
        let s = run("[White \"A\"]\n[Black \"B\"]\n[Result \"1-0\"]", "Z");
        assert_eq!(s.losses, 1);
    }

    #[test]
    fn tag_only_record_has_no_outcome() {
        let s = run("[Event \"Casual Game\"]", "P1");
        assert_eq!(s.total_games, 1);
        assert_eq!(s.wins + s.losses + s.draws, 0);
        assert_eq!(s.openings[UNKNOWN], ResultCounter { total: 1, ..Default::default() });
        assert_eq!(s.terminations[UNKNOWN], 1);
        assert_eq!(s.time_controls[UNKNOWN], 1);
        assert_eq!(s.move_quality, vec![MoveQuality::default()]);
    }

    #[test]
    fn empty_input_is_all_zero() {
        let s = run("", "P1");
        assert_eq!(s, AggregateStats::default());
        assert_eq!(s.win_rate(), 0.0);
    }

    #[test]
    fn identity_match_is_case_sensitive() {
        let s = run("[White \"magnus\"]\n[Result \"1-0\"]", "Magnus");
        assert_eq!(s.black_games, 1);
        assert_eq!(s.losses, 1);
    }

    #[test]
    fn black_win_and_color_ratings() {
        let text = "[White \"Opp\"]\n[Black \"Me\"]\n[Result \"0-1\"]\n[WhiteElo \"1600\"]\n\
                    [BlackElo \"1550\"]\n[BlackRatingDiff \"+9\"]\n[WhiteRatingDiff \"-9\"]";
        let s = run(text, "Me");
        assert_eq!((s.wins, s.black_wins, s.white_wins), (1, 1, 0));
        assert_eq!(s.rating_history, vec![1550]);
        assert_eq!(s.opponent_ratings, vec![1600]);
        assert_eq!(s.rating_deltas, vec![9]);
        assert_eq!(s.rated_outcomes, vec![Outcome::Win]);
    }

    #[test]
    fn placeholder_rating_skips_only_rating_sequences() {
        let text = "[White \"Me\"]\n[Black \"Anon\"]\n[Result \"1-0\"]\n[WhiteElo \"1500\"]\n\
                    [BlackElo \"?\"]\n[WhiteRatingDiff \"+4\"]\n[Termination \"Normal\"]\n\
                    [TimeControl \"300+0\"]\n1. e4 e5?";
        let s = run(text, "Me");
        assert!(s.rating_history.is_empty());
        assert!(s.opponent_ratings.is_empty());
        assert!(s.rated_outcomes.is_empty());
        // delta is read on its own
        assert_eq!(s.rating_deltas, vec![4]);
        assert_eq!(s.terminations["Normal"], 1);
        assert_eq!(s.time_controls["300+0"], 1);
        assert_eq!(s.move_quality[0].mistakes, 1);
    }

    #[test]
    fn missing_delta_does_not_block_rating_history() {
        let text = "[White \"Me\"]\n[WhiteElo \"1500\"]\n[BlackElo \"1400\"]";
        let s = run(text, "Me");
        assert_eq!(s.rating_history, vec![1500]);
        assert!(s.rating_deltas.is_empty());
    }

    #[test]
    fn opening_and_eco_buckets() {
        let text = "[White \"Me\"]\n[Result \"1-0\"]\n[Opening \"Italian Game\"]\n[ECO \"C50\"]\n\n\n\
                    [White \"Me\"]\n[Result \"0-1\"]\n[Opening \"Italian Game\"]\n[ECO \"C50\"]\n\n\n\
                    [Black \"Me\"]\n[Result \"*\"]\n[Opening \"Italian Game\"]";
        let s = run(text, "Me");
        assert_eq!(
            s.openings["Italian Game"],
            ResultCounter { wins: 1, losses: 1, draws: 0, total: 3 }
        );
        assert_eq!(s.eco_codes["C50"].total, 2);
        assert_eq!(s.eco_codes[UNKNOWN].total, 1);
    }

    #[test]
    fn counts_and_lengths_hold() {
        let text = "[White \"Me\"]\n[Result \"1-0\"]\n[WhiteElo \"1500\"]\n[BlackElo \"1500\"]\n1. e4\n\n\n\
                    [White \"Me\"]\n[Result \"*\"]\n\n\n\
                    [Black \"Me\"]\n[Result \"1/2-1/2\"]\n[WhiteElo \"?\"]\n[BlackElo \"1490\"]\n\n\n\
                    no tags here";
        let s = run(text, "Me");
        assert_eq!(s.total_games, 3);
        assert!(s.wins + s.losses + s.draws < s.total_games);
        assert_eq!(s.move_quality.len() as u64, s.total_games);
        assert!(s.rating_history.len() as u64 <= s.total_games);
        assert_eq!(s.rating_history.len(), s.opponent_ratings.len());
        for rate in [s.win_rate(), s.white_win_rate(), s.black_win_rate()] {
            assert!((0.0..=100.0).contains(&rate));
        }
    }

    #[test]
    fn csv_lists_openings_then_eco() {
        let text = "[White \"Me\"]\n[Result \"1-0\"]\n[Opening \"Ruy Lopez, Berlin\"]\n[ECO \"C65\"]\n\n\n\
                    [White \"Me\"]\n[Result \"0-1\"]\n[Opening \"Caro-Kann\"]\n[ECO \"B10\"]\n\n\n\
                    [White \"Me\"]\n[Result \"1-0\"]\n[Opening \"Caro-Kann\"]\n[ECO \"B10\"]";
        let s = run(text, "Me");
        // every result code is recognized, so the counts add up exactly
        assert_eq!(s.wins + s.losses + s.draws, s.total_games);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("perf.csv");
        write_csv(&s, &path).unwrap();
        let body = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = body.lines().collect();
        assert_eq!(lines[0], "kind,name,games,wins,losses,draws,win_pct");
        assert_eq!(lines[1], "opening,Caro-Kann,2,1,1,0,50.000");
        assert_eq!(lines[2], "opening,\"Ruy Lopez, Berlin\",1,1,0,0,100.000");
        assert_eq!(lines[3], "eco,B10,2,1,1,0,50.000");
        assert_eq!(lines[4], "eco,C65,1,1,0,0,100.000");
    }

    #[test]
    fn recognized_results_sum_to_total() {
        let text = "[White \"Me\"]\n[Result \"1-0\"]\n\n\n\
                    [Black \"Me\"]\n[Result \"1-0\"]\n\n\n\
                    [White \"Me\"]\n[Result \"1/2-1/2\"]";
        let s = run(text, "Me");
        assert_eq!((s.wins, s.losses, s.draws), (1, 1, 1));
        assert_eq!(s.wins + s.losses + s.draws, s.total_games);
    }

    #[test]
    fn escape_quotes() {
        assert_eq!(escape_csv("a\"b"), "\"a\"\"b\"");
        assert_eq!(escape_csv("plain"), "plain");
    }
}
