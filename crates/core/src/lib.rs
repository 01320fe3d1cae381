//! Blunder Report Core Library
//!
//! Finds the mistakes and blunders in a player's chess.com games by replaying
//! each game through a UCI engine and comparing consecutive evaluations.

pub mod analysis;
pub mod archive;
pub mod chesscom;
pub mod config;
pub mod engine;
pub mod error;
pub mod openings;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod storage;

pub use analysis::{analyze_game, AnalysisError, GameAnnotation, Thresholds};
pub use archive::{load_games, LoadedGame};
pub use chesscom::ChessComClient;
pub use config::{AnalysisConfig, EngineConfig};
pub use engine::{EngineError, Evaluator, StockfishEngine};
pub use error::{Error, Result};
pub use openings::{OpeningLookup, OpeningName};
pub use pipeline::{BatchSummary, EngineFactory, Pipeline, StockfishFactory};
pub use report::{GameReport, Outcome, ReportWriter};
pub use storage::Database;
