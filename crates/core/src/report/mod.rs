//! Per-game reports and their CSV output

mod record;
mod writer;

pub use record::{GameReport, Outcome, TAG_COLUMNS};
pub use writer::{header, ReportWriter};
