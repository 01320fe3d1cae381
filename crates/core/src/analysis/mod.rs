//! Evaluation-delta analysis of a single game
//!
//! [`Replay`] walks the move list, an [`Evaluator`](crate::engine::Evaluator)
//! scores every resulting position, [`classify`] turns consecutive scores into
//! mistake/blunder events and [`analyze_game`] collects them into a
//! [`GameAnnotation`].

mod annotator;
mod classifier;
mod replay;
mod types;

use thiserror::Error;

use crate::engine::EngineError;

pub use annotator::{analyze_game, annotate_in_session};
pub use classifier::{classify, move_number, Thresholds};
pub use replay::Replay;
pub use types::*;

/// Reasons one game's analysis is abandoned
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("illegal move {san:?} at ply {ply}: {reason}")]
    IllegalMove { ply: u32, san: String, reason: String },

    #[error("evaluation failed at ply {ply}: {source}")]
    Evaluation {
        ply: u32,
        #[source]
        source: EngineError,
    },

    #[error("invalid starting position: {0}")]
    InvalidStart(String),
}
