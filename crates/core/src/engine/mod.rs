//! Chess engine integration
//!
//! Provides interface to UCI-compatible engines like Stockfish.

pub mod analysis;
pub mod session;
pub mod stockfish;

pub use analysis::{Evaluation, PositionAnalysis, DEFAULT_MATE_SCORE};
pub use session::{EngineSession, Evaluator};
pub use stockfish::{EngineError, StockfishEngine};
