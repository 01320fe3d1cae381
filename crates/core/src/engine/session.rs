//! Evaluation oracle abstraction and its scoped session guard

use shakmaty::Chess;
use tracing::warn;

use super::stockfish::EngineError;

/// Anything that can score a position to a fixed depth.
///
/// Scores are White-relative centipawns, already bounded so that every
/// forced mate carries the same magnitude.
pub trait Evaluator {
    fn evaluate(&mut self, position: &Chess, depth: u8) -> Result<i32, EngineError>;

    /// Releases whatever the evaluator holds (process, connection).
    fn close(&mut self) -> Result<(), EngineError> {
        Ok(())
    }
}

impl<F> Evaluator for F
where
    F: FnMut(&Chess, u8) -> Result<i32, EngineError>,
{
    fn evaluate(&mut self, position: &Chess, depth: u8) -> Result<i32, EngineError> {
        self(position, depth)
    }
}

/// Owns one evaluator for the span of one analysis.
///
/// The evaluator is closed exactly once: on [`EngineSession::close`], or on
/// drop if the session is abandoned early (error return, panic).
pub struct EngineSession<E: Evaluator> {
    evaluator: E,
    closed: bool,
}

impl<E: Evaluator> EngineSession<E> {
    pub fn new(evaluator: E) -> Self {
        Self {
            evaluator,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Closes the session, reporting any shutdown error
    pub fn close(mut self) -> Result<(), EngineError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<(), EngineError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.evaluator.close()
    }
}

impl<E: Evaluator> Evaluator for EngineSession<E> {
    fn evaluate(&mut self, position: &Chess, depth: u8) -> Result<i32, EngineError> {
        if self.closed {
            return Err(EngineError::Closed);
        }
        self.evaluator.evaluate(position, depth)
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.shutdown()
    }
}

impl<E: Evaluator> Drop for EngineSession<E> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(error = %e, "engine session did not shut down cleanly");
        }
    }
}
