//! Database operations

use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use super::models::*;
use crate::error::{Error, Result};
use crate::report::{GameReport, Outcome};

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS reports (
                link TEXT PRIMARY KEY NOT NULL,
                white_username TEXT,
                black_username TEXT,
                outcome TEXT,
                total_moves INTEGER NOT NULL,
                report TEXT NOT NULL,
                analyzed_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_reports_analyzed_at ON reports(analyzed_at);
            "#,
        )?;
        Ok(())
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }

    /// Stores a report, replacing any earlier one for the same game
    pub fn insert_report(&self, report: &GameReport) -> Result<()> {
        let link = report
            .link()
            .ok_or_else(|| Error::NotFound("game link for report".into()))?;
        let json = serde_json::to_string(report)?;

        self.conn.execute(
            r#"
            INSERT INTO reports
            (link, white_username, black_username, outcome, total_moves, report, analyzed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(link) DO UPDATE SET
                white_username = ?2, black_username = ?3, outcome = ?4,
                total_moves = ?5, report = ?6, analyzed_at = ?7
            "#,
            params![
                link,
                report.tag("White"),
                report.tag("Black"),
                report.outcome.map(|o| o.as_str()),
                report.total_moves,
                json,
                Self::now(),
            ],
        )?;

        Ok(())
    }

    pub fn is_analyzed(&self, link: &str) -> Result<bool> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM reports WHERE link = ?1",
            params![link],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn count_reports(&self) -> Result<u32> {
        let count: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM reports", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn get_report(&self, link: &str) -> Result<Option<StoredReport>> {
        let mut stmt = self.conn.prepare(
            "SELECT link, white_username, black_username, outcome, total_moves, report, analyzed_at
             FROM reports WHERE link = ?1",
        )?;
        let raw = stmt.query_map(params![link], Self::read_row)?.next().transpose()?;
        raw.map(Self::decode).transpose()
    }

    /// Oldest first
    pub fn get_all_reports(&self) -> Result<Vec<StoredReport>> {
        let mut stmt = self.conn.prepare(
            "SELECT link, white_username, black_username, outcome, total_moves, report, analyzed_at
             FROM reports ORDER BY analyzed_at ASC, rowid ASC",
        )?;

        let rows = stmt
            .query_map([], Self::read_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(Self::decode).collect()
    }

    fn read_row(row: &Row<'_>) -> rusqlite::Result<RawReport> {
        Ok(RawReport {
            link: row.get(0)?,
            white_username: row.get(1)?,
            black_username: row.get(2)?,
            outcome: row.get(3)?,
            total_moves: row.get(4)?,
            report: row.get(5)?,
            analyzed_at: row.get(6)?,
        })
    }

    fn decode(raw: RawReport) -> Result<StoredReport> {
        Ok(StoredReport {
            link: raw.link,
            white_username: raw.white_username,
            black_username: raw.black_username,
            outcome: raw.outcome.as_deref().and_then(Outcome::parse),
            total_moves: raw.total_moves,
            report: serde_json::from_str(&raw.report)?,
            analyzed_at: raw.analyzed_at,
        })
    }
}

/// Row as stored, before the report JSON is decoded
struct RawReport {
    link: String,
    white_username: Option<String>,
    black_username: Option<String>,
    outcome: Option<String>,
    total_moves: u32,
    report: String,
    analyzed_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::GameAnnotation;
    use crate::chesscom::Accuracies;
    use crate::openings::OpeningName;
    use crate::parser::PgnGame;

    fn report(link: &str, total_moves: u32) -> GameReport {
        let game = PgnGame {
            tags: vec![
                ("White".into(), "me".into()),
                ("Black".into(), "you".into()),
                ("Result".into(), "1/2-1/2".into()),
                ("Link".into(), link.into()),
            ],
            moves: Vec::new(),
        };
        let annotation = GameAnnotation {
            black_mistakes: vec![4],
            total_plies: total_moves * 2,
            total_moves,
            ..Default::default()
        };
        GameReport::build(
            &game,
            annotation,
            Accuracies::default(),
            OpeningName::parse("Italian Game"),
            "me",
        )
    }

    #[test]
    fn test_insert_and_read_back() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.count_reports().unwrap(), 0);

        db.insert_report(&report("https://chess.com/game/1", 30)).unwrap();
        db.insert_report(&report("https://chess.com/game/2", 12)).unwrap();
        assert_eq!(db.count_reports().unwrap(), 2);
        assert!(db.is_analyzed("https://chess.com/game/1").unwrap());
        assert!(!db.is_analyzed("https://chess.com/game/3").unwrap());

        let all = db.get_all_reports().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].link, "https://chess.com/game/1");
        assert_eq!(all[0].outcome, Some(Outcome::Draw));
        assert_eq!(all[0].white_username.as_deref(), Some("me"));
        assert_eq!(all[0].report, report("https://chess.com/game/1", 30));
    }

    #[test]
    fn test_insert_is_upsert() {
        let db = Database::open_in_memory().unwrap();
        db.insert_report(&report("https://chess.com/game/1", 30)).unwrap();
        db.insert_report(&report("https://chess.com/game/1", 31)).unwrap();

        assert_eq!(db.count_reports().unwrap(), 1);
        let stored = db.get_report("https://chess.com/game/1").unwrap().unwrap();
        assert_eq!(stored.total_moves, 31);
        assert_eq!(stored.report.annotation.black_mistakes, vec![4]);
        assert!(db.get_report("https://chess.com/game/9").unwrap().is_none());
    }

    #[test]
    fn test_report_without_link_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let mut unlinked = report("x", 1);
        unlinked.tags = vec![None; unlinked.tags.len()];
        assert!(matches!(db.insert_report(&unlinked), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_reopen_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports.db");
        {
            let db = Database::open(&path).unwrap();
            db.insert_report(&report("https://chess.com/game/1", 30)).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert!(db.is_analyzed("https://chess.com/game/1").unwrap());
    }
}
