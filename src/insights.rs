use std::collections::BTreeMap;

use crate::aggregator::sorted_by_games;
use crate::model::{pct, AggregateStats, Outcome, ResultCounter};

/// Opening name with its counter, as handed to the report.
pub type OpeningRow<'a> = (&'a str, &'a ResultCounter);

/// Most played openings, at most `n`.
pub fn top_openings(stats: &AggregateStats, n: usize) -> Vec<OpeningRow<'_>> {
    sorted_by_games(&stats.openings)
        .into_iter()
        .take(n)
        .map(|(k, c)| (k.as_str(), c))
        .collect()
}

/// Best and weakest openings (up to `n` each) among those with at least
/// `min_games` games, by win rate. Ties keep name order.
pub fn best_and_worst_openings(
    stats: &AggregateStats,
    min_games: u64,
    n: usize,
) -> (Vec<OpeningRow<'_>>, Vec<OpeningRow<'_>>) {
    let eligible: Vec<OpeningRow<'_>> = stats
        .openings
        .iter()
        .filter(|(_, c)| c.total >= min_games.max(1))
        .map(|(k, c)| (k.as_str(), c))
        .collect();

    let mut best = eligible.clone();
    best.sort_by(|a, b| b.1.win_rate().total_cmp(&a.1.win_rate()));
    best.truncate(n);

    let mut worst = eligible;
    worst.sort_by(|a, b| a.1.win_rate().total_cmp(&b.1.win_rate()));
    worst.truncate(n);

    (best, worst)
}

/// Wins and games per rating-gap bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GapBucket {
    pub wins: u64,
    pub games: u64,
}

impl GapBucket {
    pub fn win_rate(&self) -> f64 {
        pct(self.wins, self.games)
    }
}

/// Win rate by `own - opponent` rating, floored to multiples of `width`.
pub fn win_rate_by_rating_gap(stats: &AggregateStats, width: i32) -> BTreeMap<i64, GapBucket> {
    let width = i64::from(width.max(1));
    let mut out: BTreeMap<i64, GapBucket> = BTreeMap::new();
    let rated = stats
        .rating_history
        .iter()
        .zip(&stats.opponent_ratings)
        .zip(&stats.rated_outcomes);
    for ((own, opp), outcome) in rated {
        let gap = i64::from(*own) - i64::from(*opp);
        let bucket = gap.div_euclid(width) * width;
        let slot = out.entry(bucket).or_default();
        slot.games += 1;
        if *outcome == Outcome::Win {
            slot.wins += 1;
        }
    }
    out
}
