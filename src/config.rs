use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Rating assumed for an account without an entry in `initial_ratings`.
pub const DEFAULT_INITIAL_RATING: i32 = 1500;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub player: Option<String>,          // tracked identity (exact match)
    pub accounts: Vec<String>,           // cross-account mode
    pub initial_ratings: HashMap<String, i32>,
    pub top_openings: usize,             // rows in "most played" lists
    pub min_opening_games: u64,          // best/worst opening threshold
    pub rating_bucket: i32,              // rating-gap bucket width
    pub rolling_window: usize,           // games per rolling win-rate window
    pub rolling_min_games: usize,        // games before the rolling rate is defined
    pub min_hour_games: u64,             // hours below this are not reported
    pub rayon_threads: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            player: None,
            accounts: Vec::new(),
            initial_ratings: HashMap::new(),
            top_openings: 10,
            min_opening_games: 3,
            rating_bucket: 50,
            rolling_window: 100,
            rolling_min_games: 10,
            min_hour_games: 20,
            rayon_threads: None,
        }
    }
}

impl Config {
    /// Load `path`; a missing file yields defaults, a malformed one is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut cfg = match std::fs::read_to_string(path) {
            Ok(s) => toml::from_str::<Config>(&s)
                .with_context(|| format!("parsing {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };
        if let Ok(p) = std::env::var("CHESS_PLAYER") {
            if !p.is_empty() {
                cfg.player = Some(p);
            }
        }
        Ok(cfg)
    }

    pub fn initial_rating(&self, account: &str) -> i32 {
        self.initial_ratings
            .get(account)
            .copied()
            .unwrap_or(DEFAULT_INITIAL_RATING)
    }
}
