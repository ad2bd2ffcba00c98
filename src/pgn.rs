use std::sync::LazyLock;

use regex::Regex;

use crate::model::GameRecord;

// format: [Tag "Value"], anything after the closing bracket is ignored
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\[(\w+)\s+"([^"]+)"\]"#).expect("static tag regex"));

/// Games in an export are separated by two consecutive empty lines.
const BLOCK_DELIMITER: &str = "\n\n\n";

/// Split a whole archive into game records, in input order.
/// Blocks without a single tag are dropped.
pub fn parse_records(text: &str) -> Vec<GameRecord> {
    let text = text.replace("\r\n", "\n");
    text.split(BLOCK_DELIMITER)
        .filter(|block| !block.trim().is_empty())
        .filter_map(parse_block)
        .collect()
}

/// Parse one block into a record; `None` when no tag line matched.
pub fn parse_block(block: &str) -> Option<GameRecord> {
    let mut rec = GameRecord::default();
    for line in block.split('\n') {
        if line.starts_with('[') {
            if let Some((tag, value)) = parse_tag_line(line) {
                rec.fields.insert(tag.to_string(), value.to_string());
            }
        } else if !line.trim().is_empty() {
            // last move line wins
            rec.move_text = line.to_string();
        }
    }
    if rec.fields.is_empty() {
        None
    } else {
        Some(rec)
    }
}

/// `(tag, value)` for a `[Tag "Value"]` line.
pub fn parse_tag_line(line: &str) -> Option<(&str, &str)> {
    let caps = TAG_RE.captures(line)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// Parse a rating-like tag ("1500", "+12", "-8"); `None` for "?" or absent.
pub fn parse_rating(s: Option<&str>) -> Option<i32> {
    s.and_then(|x| x.trim().parse::<i32>().ok())
}
