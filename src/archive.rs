use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use rayon::prelude::*;
use tracing::debug;

use crate::model::GameRecord;
use crate::pgn::parse_records;

/// Read one archive into memory, decoding `.zst` transparently.
pub fn read_archive(path: &Path) -> anyhow::Result<String> {
    let t0 = Instant::now();
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = BufReader::new(f);
    let mut text = String::new();
    if path.extension().and_then(|e| e.to_str()) == Some("zst") {
        zstd::stream::Decoder::new(reader)
            .with_context(|| format!("zstd decoder for {}", path.display()))?
            .read_to_string(&mut text)
            .with_context(|| format!("decoding {}", path.display()))?;
    } else {
        reader
            .read_to_string(&mut text)
            .with_context(|| format!("reading {}", path.display()))?;
    }
    debug!(
        "archive: {} read in {:.3}s ({} bytes)",
        path.display(),
        t0.elapsed().as_secs_f64(),
        text.len()
    );
    Ok(text)
}

pub fn read_stdin() -> anyhow::Result<String> {
    let mut text = String::new();
    io::stdin().lock().read_to_string(&mut text).context("reading stdin")?;
    Ok(text)
}

/// Parse every archive (in parallel) and concatenate records in argument order.
/// No paths means stdin.
pub fn load_records(paths: &[PathBuf]) -> anyhow::Result<Vec<GameRecord>> {
    if paths.is_empty() {
        let recs = parse_records(&read_stdin()?);
        debug!("archive: stdin -> {} records", recs.len());
        return Ok(recs);
    }
    let per_file = load_per_file(paths)?;
    Ok(per_file.into_iter().flatten().collect())
}

/// Records grouped by input file, in argument order.
pub fn load_per_file(paths: &[PathBuf]) -> anyhow::Result<Vec<Vec<GameRecord>>> {
    let t0 = Instant::now();
    let per_file: Vec<Vec<GameRecord>> = paths
        .par_iter()
        .map(|p| -> anyhow::Result<Vec<GameRecord>> {
            let recs = parse_records(&read_archive(p)?);
            debug!("archive: {} -> {} records", p.display(), recs.len());
            Ok(recs)
        })
        .collect::<anyhow::Result<_>>()?;
    debug!(
        "archive: {} file(s) parsed in {:.3}s",
        paths.len(),
        t0.elapsed().as_secs_f64()
    );
    Ok(per_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const GAME: &str = "[White \"Me\"]\n[Result \"1-0\"]\n\n1. e4 e5 1-0\n\n\n";

    #[test]
    fn reads_plain_and_zst_alike() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("games.pgn");
        std::fs::write(&plain, GAME).unwrap();

        let packed = dir.path().join("games.pgn.zst");
        let bytes = zstd::stream::encode_all(GAME.as_bytes(), 3).unwrap();
        File::create(&packed).unwrap().write_all(&bytes).unwrap();

        assert_eq!(read_archive(&plain).unwrap(), GAME);
        assert_eq!(read_archive(&packed).unwrap(), GAME);
    }

    #[test]
    fn records_keep_argument_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pgn");
        let b = dir.path().join("b.pgn");
        std::fs::write(&a, "[Event \"a1\"]\n\n\n[Event \"a2\"]").unwrap();
        std::fs::write(&b, "[Event \"b1\"]").unwrap();

        let recs = load_records(&[b.clone(), a.clone()]).unwrap();
        let events: Vec<_> = recs.iter().filter_map(|r| r.get("Event")).collect();
        assert_eq!(events, vec!["b1", "a1", "a2"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_records(&[dir.path().join("nope.pgn")]).unwrap_err();
        assert!(format!("{err:#}").contains("nope.pgn"));
    }
}
