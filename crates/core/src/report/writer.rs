//! CSV output, one row per analyzed game

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;

use super::record::{GameReport, TAG_COLUMNS};
use crate::analysis::{Severity, Side};
use crate::error::{Error, Result};

/// Columns following the PGN tags
const ANALYSIS_COLUMNS: [&str; 15] = [
    "Full Opening Name",
    "Main Opening Name",
    "Variation Opening Name",
    "Win-Loss-Draw",
    "Total Moves",
    "White Accuracy",
    "Black Accuracy",
    "Black Total Blunders",
    "Black Total Mistakes",
    "White Total Blunders",
    "White Total Mistakes",
    "Black First Blunder",
    "Black First Mistake",
    "White First Blunder",
    "White First Mistake",
];

const EVENT_COLUMNS: [(Side, Severity); 4] = [
    (Side::Black, Severity::Blunder),
    (Side::Black, Severity::Mistake),
    (Side::White, Severity::Blunder),
    (Side::White, Severity::Mistake),
];

pub fn header() -> Vec<&'static str> {
    TAG_COLUMNS.iter().chain(ANALYSIS_COLUMNS.iter()).copied().collect()
}

fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn row(report: &GameReport) -> Vec<String> {
    let mut row: Vec<String> = report.tags.iter().map(|tag| cell(tag.as_deref())).collect();

    row.push(report.opening.full.clone());
    row.push(report.opening.main.clone());
    row.push(report.opening.variation.clone());
    row.push(cell(report.outcome.map(|o| o.as_str())));
    row.push(report.total_moves.to_string());
    row.push(cell(report.white_accuracy));
    row.push(cell(report.black_accuracy));
    for (side, severity) in EVENT_COLUMNS {
        row.push(report.count(side, severity).to_string());
    }
    for (side, severity) in EVENT_COLUMNS {
        row.push(cell(report.first(side, severity)));
    }

    row
}

/// Writes the header once, then a row per [`GameReport`]
pub struct ReportWriter<W: Write> {
    writer: Writer<W>,
    rows: usize,
}

impl ReportWriter<File> {
    /// Creates (or truncates) a CSV file, making parent directories as needed
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::new(File::create(path)?)
    }
}

impl<W: Write> ReportWriter<W> {
    pub fn new(inner: W) -> Result<Self> {
        let mut writer = Writer::from_writer(inner);
        writer.write_record(header())?;
        Ok(Self { writer, rows: 0 })
    }

    pub fn write(&mut self, report: &GameReport) -> Result<()> {
        self.writer.write_record(row(report))?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far, header excluded
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }
}
