use std::sync::LazyLock;

use regex::Regex;

use crate::model::MoveQuality;

static MOVE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.").expect("static move-number regex"));

/// Count `??`, `?` and `?!` annotations plus move numbers in a move line.
///
/// The three glyph classes are disjoint: a `??` is one blunder and never also
/// a mistake, and `?!` is an inaccuracy only.
pub fn scan(move_text: &str) -> MoveQuality {
    let mut q = MoveQuality::default();
    let bytes = move_text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'?' {
            i += 1;
            continue;
        }
        match bytes.get(i + 1) {
            Some(b'?') => {
                q.blunders += 1;
                i += 2;
            }
            Some(b'!') => {
                q.inaccuracies += 1;
                i += 2;
            }
            _ => {
                q.mistakes += 1;
                i += 1;
            }
        }
    }
    q.move_count = MOVE_NUMBER_RE.find_iter(move_text).count() as u32;
    q
}
