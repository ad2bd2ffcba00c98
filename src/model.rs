use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

/// Placeholder key for categorical tags a record does not carry.
pub const UNKNOWN: &str = "Unknown";

/// One game block: its tags and the (last) move line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameRecord {
    pub fields: HashMap<String, String>,
    pub move_text: String,
}

impl GameRecord {
    /// Tag value, or `None` when the block did not carry it.
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.fields.get(tag).map(String::as_str)
    }

    /// Tag value, or the `UNKNOWN` sentinel.
    pub fn get_or_unknown(&self, tag: &str) -> &str {
        self.get(tag).unwrap_or(UNKNOWN)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn elo_tag(self) -> &'static str {
        match self {
            Side::White => "WhiteElo",
            Side::Black => "BlackElo",
        }
    }

    pub fn rating_diff_tag(self) -> &'static str {
        match self {
            Side::White => "WhiteRatingDiff",
            Side::Black => "BlackRatingDiff",
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
    Unclassified,
}

impl Outcome {
    /// Outcome of `result` ("1-0", "0-1", "1/2-1/2") seen from `side`.
    pub fn classify(result: &str, side: Side) -> Self {
        match (result, side) {
            ("1-0", Side::White) | ("0-1", Side::Black) => Outcome::Win,
            ("0-1", Side::White) | ("1-0", Side::Black) => Outcome::Loss,
            ("1/2-1/2", _) => Outcome::Draw,
            _ => Outcome::Unclassified,
        }
    }
}

/// Percentage helper shared by every win-rate view; 0 on an empty denominator.
pub fn pct(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResultCounter {
    pub wins: u64,
    pub losses: u64,
    pub draws: u64,
    pub total: u64,
}

impl ResultCounter {
    pub fn add(&mut self, outcome: Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Unclassified => {}
        }
    }

    pub fn win_rate(&self) -> f64 {
        pct(self.wins, self.total)
    }
}

/// Annotation glyph counts plus numbered-move count for one game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MoveQuality {
    pub blunders: u32,
    pub mistakes: u32,
    pub inaccuracies: u32,
    pub move_count: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AggregateStats {
    pub total_games: u64,
    pub wins: u64,
    pub losses: u64,
    pub draws: u64,
    pub white_games: u64,
    pub black_games: u64,
    pub white_wins: u64,
    pub black_wins: u64,

    pub openings: BTreeMap<String, ResultCounter>,
    pub eco_codes: BTreeMap<String, ResultCounter>,

    // rating_history, opponent_ratings and rated_outcomes are index-aligned
    pub rating_history: Vec<i32>,
    pub opponent_ratings: Vec<i32>,
    pub rated_outcomes: Vec<Outcome>,
    pub rating_deltas: Vec<i32>,
    pub move_quality: Vec<MoveQuality>,

    pub terminations: BTreeMap<String, u64>,
    pub time_controls: BTreeMap<String, u64>,
}

/// Start/current/peak of the tracked player's rating series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RatingSummary {
    pub start: i32,
    pub current: i32,
    pub peak: i32,
    pub change: i64,
}

impl AggregateStats {
    pub fn win_rate(&self) -> f64 {
        pct(self.wins, self.total_games)
    }

    pub fn white_win_rate(&self) -> f64 {
        pct(self.white_wins, self.white_games)
    }

    pub fn black_win_rate(&self) -> f64 {
        pct(self.black_wins, self.black_games)
    }

    /// Consecutive differences over `rating_history`; the first game has none.
    /// Widened so arbitrary tag values cannot overflow.
    pub fn rating_trend(&self) -> Vec<i64> {
        self.rating_history
            .windows(2)
            .map(|w| i64::from(w[1]) - i64::from(w[0]))
            .collect()
    }

    pub fn rating_summary(&self) -> Option<RatingSummary> {
        let start = *self.rating_history.first()?;
        let current = *self.rating_history.last()?;
        let peak = self.rating_history.iter().copied().max()?;
        let change = i64::from(current) - i64::from(start);
        Some(RatingSummary { start, current, peak, change })
    }

    pub fn avg_blunders(&self) -> f64 {
        self.quality_mean(|q| q.blunders)
    }

    pub fn avg_mistakes(&self) -> f64 {
        self.quality_mean(|q| q.mistakes)
    }

    pub fn avg_inaccuracies(&self) -> f64 {
        self.quality_mean(|q| q.inaccuracies)
    }

    pub fn avg_move_count(&self) -> f64 {
        self.quality_mean(|q| q.move_count)
    }

    pub fn avg_opponent_rating(&self) -> f64 {
        if self.opponent_ratings.is_empty() {
            return 0.0;
        }
        let sum: i64 = self.opponent_ratings.iter().map(|&r| r as i64).sum();
        sum as f64 / self.opponent_ratings.len() as f64
    }

    fn quality_mean(&self, f: impl Fn(&MoveQuality) -> u32) -> f64 {
        if self.move_quality.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.move_quality.iter().map(|q| f(q) as u64).sum();
        sum as f64 / self.move_quality.len() as f64
    }
}
