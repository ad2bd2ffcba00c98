//! Cross-account view: games from several accounts of one person, merged
//! and broken down by account, clock, calendar and game type.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};

use crate::config::Config;
use crate::model::{pct, GameRecord, Outcome, ResultCounter, Side};
use crate::pgn::parse_rating;
use crate::quality;
use crate::timecontrol::{categorize, GameType};

/// One game seen from whichever listed account played it.
#[derive(Clone, Debug, PartialEq)]
pub struct AccountGame {
    pub account: String,
    pub side: Side,
    pub outcome: Outcome,
    pub player_elo: Option<i32>,
    pub rating_change: Option<i32>,
    pub opening: String,
    pub termination: String,
    pub game_type: Option<GameType>,
    pub move_count: u32,
    pub played_at: Option<NaiveDateTime>,
}

/// Keep games where both players are tagged and one of them is a listed
/// account (White is checked first).
pub fn account_game(rec: &GameRecord, accounts: &[String]) -> Option<AccountGame> {
    let white = rec.get("White")?;
    let black = rec.get("Black")?;
    let (account, side) = if accounts.iter().any(|a| a == white) {
        (white, Side::White)
    } else if accounts.iter().any(|a| a == black) {
        (black, Side::Black)
    } else {
        return None;
    };

    Some(AccountGame {
        account: account.to_string(),
        side,
        outcome: Outcome::classify(rec.get("Result").unwrap_or(""), side),
        player_elo: parse_rating(rec.get(side.elo_tag())),
        rating_change: parse_rating(rec.get(side.rating_diff_tag())),
        opening: rec.get_or_unknown("Opening").to_string(),
        termination: rec.get_or_unknown("Termination").to_string(),
        game_type: categorize(rec.get_or_unknown("TimeControl")),
        move_count: quality::scan(&rec.move_text).move_count,
        played_at: played_at(rec),
    })
}

/// UTC timestamp from `UTCDate` ("YYYY.MM.DD") and `UTCTime` ("HH:MM:SS").
fn played_at(rec: &GameRecord) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(rec.get("UTCDate")?, "%Y.%m.%d").ok()?;
    let time = NaiveTime::parse_from_str(rec.get("UTCTime")?, "%H:%M:%S").ok()?;
    Some(date.and_time(time))
}

pub fn collect_games(records: &[GameRecord], accounts: &[String]) -> Vec<AccountGame> {
    records
        .iter()
        .filter_map(|r| account_game(r, accounts))
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimePeriod {
    EarlyMorning,
    LateMorning,
    LunchTime,
    Afternoon,
    Evening,
    Night,
    LateNight,
}

impl TimePeriod {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=8 => TimePeriod::EarlyMorning,
            9..=11 => TimePeriod::LateMorning,
            12..=13 => TimePeriod::LunchTime,
            14..=16 => TimePeriod::Afternoon,
            17..=19 => TimePeriod::Evening,
            20..=22 => TimePeriod::Night,
            _ => TimePeriod::LateNight,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimePeriod::EarlyMorning => "Early Morning",
            TimePeriod::LateMorning => "Late Morning",
            TimePeriod::LunchTime => "Lunch Time",
            TimePeriod::Afternoon => "Afternoon",
            TimePeriod::Evening => "Evening",
            TimePeriod::Night => "Night",
            TimePeriod::LateNight => "Late Night",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Autumn,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
        }
    }
}

/// One point of an account's rating journey.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JourneyPoint {
    pub played_at: Option<NaiveDateTime>,
    pub rating: i64,
}

#[derive(Clone, Debug, Default)]
pub struct CombinedStats {
    pub overall: ResultCounter,
    pub as_white: ResultCounter,
    pub as_black: ResultCounter,
    pub total_moves: u64,
    pub per_account: BTreeMap<String, ResultCounter>,
    pub by_game_type: BTreeMap<Option<GameType>, ResultCounter>,
    pub by_season: BTreeMap<Season, ResultCounter>,
    pub by_period: BTreeMap<TimePeriod, ResultCounter>,
    pub weekday: ResultCounter,
    pub weekend: ResultCounter,
    pub by_hour: BTreeMap<u32, ResultCounter>,
    pub by_opening: BTreeMap<String, ResultCounter>,
    pub by_termination: BTreeMap<String, u64>,
    /// Highest tagged rating seen per account.
    pub peak_ratings: BTreeMap<String, i32>,
    /// Rolling win rate in chronological order; `None` until enough games.
    pub rolling_win_rate: Vec<Option<f64>>,
    pub journeys: BTreeMap<String, Vec<JourneyPoint>>,
    pub undated_games: u64,
}

impl CombinedStats {
    pub fn avg_move_count(&self) -> f64 {
        if self.overall.total == 0 {
            0.0
        } else {
            self.total_moves as f64 / self.overall.total as f64
        }
    }

    /// Hours with at least `min_games` games.
    pub fn active_hours(&self, min_games: u64) -> Vec<(u32, ResultCounter)> {
        self.by_hour
            .iter()
            .filter(|(_, t)| t.total >= min_games)
            .map(|(h, t)| (*h, *t))
            .collect()
    }

    /// `(peak, worst)` hour by win rate among active hours; earliest hour wins ties.
    pub fn peak_and_worst_hour(&self, min_games: u64) -> Option<(u32, u32)> {
        let hours = self.active_hours(min_games);
        let mut peak = *hours.first()?;
        let mut worst = peak;
        for &(h, t) in &hours[1..] {
            if t.win_rate() > peak.1.win_rate() {
                peak = (h, t);
            }
            if t.win_rate() < worst.1.win_rate() {
                worst = (h, t);
            }
        }
        Some((peak.0, worst.0))
    }

    pub fn top_openings(&self, n: usize) -> Vec<(&str, ResultCounter)> {
        let mut rows: Vec<_> = self.by_opening.iter().map(|(k, t)| (k.as_str(), *t)).collect();
        rows.sort_by_key(|(_, t)| std::cmp::Reverse(t.total));
        rows.truncate(n);
        rows
    }
}

/// Group merged games. Games are put in chronological order first; undated
/// games keep their input order after all dated ones.
pub fn analyze(games: &[AccountGame], cfg: &Config) -> CombinedStats {
    let mut ordered: Vec<&AccountGame> = games.iter().collect();
    ordered.sort_by_key(|g| (g.played_at.is_none(), g.played_at));

    let mut out = CombinedStats::default();
    let mut running: HashMap<&str, i64> = HashMap::new();
    for g in &ordered {
        out.overall.add(g.outcome);
        match g.side {
            Side::White => out.as_white.add(g.outcome),
            Side::Black => out.as_black.add(g.outcome),
        }
        out.total_moves += g.move_count as u64;
        out.per_account.entry(g.account.clone()).or_default().add(g.outcome);
        out.by_game_type.entry(g.game_type).or_default().add(g.outcome);
        out.by_opening.entry(g.opening.clone()).or_default().add(g.outcome);
        *out.by_termination.entry(g.termination.clone()).or_default() += 1;
        if let Some(elo) = g.player_elo {
            let peak = out.peak_ratings.entry(g.account.clone()).or_insert(elo);
            *peak = (*peak).max(elo);
        }

        match g.played_at {
            Some(at) => {
                out.by_season.entry(Season::from_month(at.month())).or_default().add(g.outcome);
                out.by_period
                    .entry(TimePeriod::from_hour(at.hour()))
                    .or_default()
                    .add(g.outcome);
                out.by_hour.entry(at.hour()).or_default().add(g.outcome);
                match at.weekday() {
                    Weekday::Sat | Weekday::Sun => out.weekend.add(g.outcome),
                    _ => out.weekday.add(g.outcome),
                }
            }
            None => out.undated_games += 1,
        }

        let rating = running
            .entry(g.account.as_str())
            .or_insert_with(|| i64::from(cfg.initial_rating(&g.account)));
        *rating += i64::from(g.rating_change.unwrap_or(0));
        out.journeys
            .entry(g.account.clone())
            .or_default()
            .push(JourneyPoint { played_at: g.played_at, rating: *rating });
    }

    let wins: Vec<bool> = ordered.iter().map(|g| g.outcome == Outcome::Win).collect();
    out.rolling_win_rate = rolling_rate(&wins, cfg.rolling_window, cfg.rolling_min_games);
    out
}

/// Trailing-window win percentage; `None` while fewer than `min_games`
/// games are inside the window.
pub fn rolling_rate(wins: &[bool], window: usize, min_games: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(wins.len());
    let mut in_window = 0u64;
    for i in 0..wins.len() {
        if wins[i] {
            in_window += 1;
        }
        if i >= window && wins[i - window] {
            in_window -= 1;
        }
        let len = (i + 1).min(window);
        out.push((len >= min_games).then(|| pct(in_window, len as u64)));
    }
    out
}
