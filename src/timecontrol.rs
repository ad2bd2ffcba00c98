use std::collections::BTreeMap;

/// Moves assumed when folding the increment into an estimated game duration.
const ESTIMATED_MOVES: u32 = 40;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GameType {
    Bullet,
    Blitz,
    Rapid,
    Classical,
}

impl GameType {
    pub fn as_str(self) -> &'static str {
        match self {
            GameType::Bullet => "bullet",
            GameType::Blitz => "blitz",
            GameType::Rapid => "rapid",
            GameType::Classical => "classical",
        }
    }

    fn from_estimate(seconds: u32) -> Self {
        match seconds {
            0..=179 => GameType::Bullet,
            180..=599 => GameType::Blitz,
            600..=1799 => GameType::Rapid,
            _ => GameType::Classical,
        }
    }
}

/// `(base_seconds, increment_seconds)` from "300+3" or "600".
pub fn parse_timecontrol(raw: &str) -> Option<(u32, u32)> {
    let raw = raw.trim();
    match raw.split_once('+') {
        Some((base, inc)) => Some((base.trim().parse().ok()?, inc.trim().parse().ok()?)),
        None => raw.parse().ok().map(|base| (base, 0)),
    }
}

/// Category from estimated duration `base + 40 * inc`; `None` for "-", "?" and the like.
pub fn categorize(raw: &str) -> Option<GameType> {
    let (base, inc) = parse_timecontrol(raw)?;
    let estimate = base.saturating_add(inc.saturating_mul(ESTIMATED_MOVES));
    Some(GameType::from_estimate(estimate))
}

/// Fold a descriptor histogram into categories; unparseable descriptors are
/// reported under `None`.
pub fn category_distribution(
    time_controls: &BTreeMap<String, u64>,
) -> BTreeMap<Option<GameType>, u64> {
    let mut out = BTreeMap::new();
    for (raw, n) in time_controls {
        *out.entry(categorize(raw)).or_default() += n;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_base_and_increment() {
        assert_eq!(parse_timecontrol("300+3"), Some((300, 3)));
        assert_eq!(parse_timecontrol("600"), Some((600, 0)));
        assert_eq!(parse_timecontrol(" 180 + 2 "), Some((180, 2)));
        assert_eq!(parse_timecontrol("-"), None);
        assert_eq!(parse_timecontrol("?"), None);
        assert_eq!(parse_timecontrol("Unknown"), None);
        assert_eq!(parse_timecontrol("1/259200"), None);
    }

    #[test]
    fn category_thresholds() {
        assert_eq!(categorize("60+0"), Some(GameType::Bullet));
        assert_eq!(categorize("120+1"), Some(GameType::Bullet));
        assert_eq!(categorize("120+2"), Some(GameType::Blitz));
        assert_eq!(categorize("140+1"), Some(GameType::Blitz));
        assert_eq!(categorize("179"), Some(GameType::Bullet));
        assert_eq!(categorize("180"), Some(GameType::Blitz));
        assert_eq!(categorize("300+5"), Some(GameType::Blitz));
        assert_eq!(categorize("600+0"), Some(GameType::Rapid));
        assert_eq!(categorize("900+10"), Some(GameType::Rapid));
        assert_eq!(categorize("1800+0"), Some(GameType::Classical));
        assert_eq!(categorize("-"), None);
    }

    #[test]
    fn distribution_sums_counts() {
        let mut tc = BTreeMap::new();
        tc.insert("60+0".to_string(), 4);
        tc.insert("120+0".to_string(), 1);
        tc.insert("300+0".to_string(), 2);
        tc.insert("-".to_string(), 1);
        let d = category_distribution(&tc);
        assert_eq!(d[&Some(GameType::Bullet)], 5);
        assert_eq!(d[&Some(GameType::Blitz)], 2);
        assert_eq!(d[&None], 1);
    }
}
