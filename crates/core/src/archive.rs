//! Local archive files: listing, merging and loading games for analysis

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::chesscom::{Accuracies, MonthArchive};
use crate::error::{Error, Result};
use crate::parser::{parse_pgn_file, parse_pgn_string, PgnGame};

/// A game ready for analysis, with chess.com's accuracy figures when known
#[derive(Debug, Clone, Default)]
pub struct LoadedGame {
    pub pgn: PgnGame,
    pub accuracies: Accuracies,
}

/// JSON and PGN files directly inside `dir`, each list sorted by name
pub fn list_archive_files(dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    if !dir.is_dir() {
        return Err(Error::NotFound(format!("directory {}", dir.display())));
    }

    let mut json_files = Vec::new();
    let mut pgn_files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => json_files.push(path),
            Some("pgn") => pgn_files.push(path),
            _ => {}
        }
    }

    json_files.sort();
    pgn_files.sort();
    Ok((json_files, pgn_files))
}

/// Concatenates text files, each followed by a blank line.
///
/// Missing inputs are logged and skipped. Returns how many files were merged.
pub fn merge_files(files: &[PathBuf], output: &Path) -> Result<usize> {
    let mut out = BufWriter::new(File::create(output)?);
    let mut merged = 0;

    for path in files {
        if path == output {
            continue;
        }
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping file");
                continue;
            }
        };
        for line in BufReader::new(file).lines() {
            writeln!(out, "{}", line?)?;
        }
        writeln!(out)?;
        writeln!(out)?;
        merged += 1;
    }

    out.flush()?;
    Ok(merged)
}

/// Combines month archives into one archive, keeping game order.
///
/// Missing or malformed inputs are logged and skipped.
pub fn merge_json_archives(files: &[PathBuf], output: &Path) -> Result<usize> {
    let mut combined = MonthArchive::default();
    let mut merged = 0;

    for path in files {
        if path == output {
            continue;
        }
        let archive = fs::read_to_string(path)
            .map_err(Error::from)
            .and_then(|text| serde_json::from_str::<MonthArchive>(&text).map_err(Error::from));
        match archive {
            Ok(archive) => {
                combined.games.extend(archive.games);
                merged += 1;
            }
            Err(e) => warn!(path = %path.display(), error = %e, "skipping archive"),
        }
    }

    let out = BufWriter::new(File::create(output)?);
    serde_json::to_writer(out, &combined)?;
    Ok(merged)
}

/// Loads games from a chess.com JSON archive (`.json`) or a PGN file.
///
/// JSON entries that are variants or carry no PGN are skipped.
pub fn load_games(path: &Path) -> Result<Vec<LoadedGame>> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if !is_json {
        let games = parse_pgn_file(path)?;
        return Ok(games
            .into_iter()
            .map(|pgn| LoadedGame {
                pgn,
                accuracies: Accuracies::default(),
            })
            .collect());
    }

    let archive: MonthArchive = serde_json::from_str(&fs::read_to_string(path)?)?;
    let mut games = Vec::with_capacity(archive.games.len());

    for entry in archive.games {
        let url = entry.url.as_deref().unwrap_or("<no url>");
        if !entry.is_standard() {
            debug!(url, rules = ?entry.rules, "skipping variant game");
            continue;
        }
        let Some(text) = entry.pgn.as_deref() else {
            warn!(url, "archive entry has no PGN");
            continue;
        };
        match parse_pgn_string(text) {
            Ok(mut parsed) => {
                let pgn = parsed.swap_remove(0);
                games.push(LoadedGame {
                    pgn,
                    accuracies: entry.accuracies.unwrap_or_default(),
                });
            }
            Err(e) => warn!(url, error = %e, "skipping unparseable game"),
        }
    }

    Ok(games)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONTH_JSON: &str = r#"{"games":[
        {"url":"https://www.chess.com/game/live/1",
         "pgn":"[White \"alice\"]\n[Black \"bob\"]\n[Result \"1-0\"]\n\n1. e4 e5 1-0\n",
         "accuracies":{"white":88.0,"black":64.5},"rules":"chess"},
        {"url":"https://www.chess.com/game/live/2","pgn":"[White \"x\"]\n\n1. e4 *\n","rules":"crazyhouse"},
        {"url":"https://www.chess.com/game/live/3","rules":"chess"}
    ]}"#;

    #[test]
    fn test_list_archive_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pgn", "a.pgn", "m.json", "notes.txt"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let (json, pgn) = list_archive_files(dir.path()).unwrap();
        assert_eq!(json, vec![dir.path().join("m.json")]);
        assert_eq!(pgn, vec![dir.path().join("a.pgn"), dir.path().join("b.pgn")]);

        assert!(matches!(
            list_archive_files(&dir.path().join("missing")),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_merge_files_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pgn");
        let b = dir.path().join("b.pgn");
        fs::write(&a, "[White \"a\"]\n\n1. e4 *").unwrap();
        fs::write(&b, "[White \"b\"]\n\n1. d4 *").unwrap();
        let out = dir.path().join("combined.pgn");

        let merged = merge_files(&[a, dir.path().join("gone.pgn"), b], &out).unwrap();
        assert_eq!(merged, 2);

        let games = parse_pgn_file(&out).unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[1].white(), Some("b"));
    }

    #[test]
    fn test_merge_json_archives() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("2025_01.json");
        let second = dir.path().join("2025_02.json");
        let broken = dir.path().join("broken.json");
        fs::write(&first, MONTH_JSON).unwrap();
        fs::write(&second, MONTH_JSON).unwrap();
        fs::write(&broken, "{not json").unwrap();
        let out = dir.path().join("combined.json");

        let merged = merge_json_archives(&[first, broken, second], &out).unwrap();
        assert_eq!(merged, 2);

        let combined: MonthArchive =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(combined.games.len(), 6);
    }

    #[test]
    fn test_load_json_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("month.json");
        fs::write(&path, MONTH_JSON).unwrap();

        let games = load_games(&path).unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].pgn.white(), Some("alice"));
        assert_eq!(games[0].pgn.moves, vec!["e4", "e5"]);
        assert_eq!(games[0].accuracies.white, Some(88.0));
        assert_eq!(games[0].accuracies.black, Some(64.5));
    }

    #[test]
    fn test_load_pgn_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.pgn");
        fs::write(&path, "[White \"a\"]\n\n1. e4 *\n\n[White \"b\"]\n\n1. d4 *\n").unwrap();

        let games = load_games(&path).unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].accuracies, Accuracies::default());
    }
}
