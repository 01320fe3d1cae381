//! Database models

use serde::{Deserialize, Serialize};

use crate::report::{GameReport, Outcome};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredReport {
    pub link: String,
    pub white_username: Option<String>,
    pub black_username: Option<String>,
    pub outcome: Option<Outcome>,
    pub total_moves: u32,
    /// Full report as written to the CSV
    pub report: GameReport,
    pub analyzed_at: u64,
}
