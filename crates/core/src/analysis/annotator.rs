//! Drives replay, evaluation and classification across one game

use shakmaty::Chess;
use tracing::{debug, warn};

use super::classifier::{classify, move_number, Thresholds};
use super::replay::Replay;
use super::types::GameAnnotation;
use super::AnalysisError;
use crate::engine::{EngineSession, Evaluator};

/// Annotates one game.
///
/// Each ply is played, evaluated at `depth`, and compared with the previous
/// ply's evaluation. The first evaluation only seeds the comparison, so ply 1
/// never produces an event. Any illegal move or evaluator failure aborts the
/// whole game; nothing is retried.
pub fn analyze_game<S, E>(
    start: Chess,
    moves: &[S],
    evaluator: &mut E,
    depth: u8,
    thresholds: &Thresholds,
) -> Result<GameAnnotation, AnalysisError>
where
    S: AsRef<str>,
    E: Evaluator + ?Sized,
{
    let mut annotation = GameAnnotation::default();
    let mut previous_eval: Option<i32> = None;

    for step in Replay::new(start, moves) {
        let (ply, position) = step?;
        let current_eval = evaluator
            .evaluate(&position, depth)
            .map_err(|source| AnalysisError::Evaluation { ply, source })?;
        let number = move_number(ply);

        if let Some(previous) = previous_eval {
            if let Some(event) = classify(previous, current_eval, number, thresholds) {
                debug!(
                    ply,
                    move_number = number,
                    side = event.side.as_str(),
                    severity = event.severity.as_str(),
                    delta = current_eval.saturating_sub(previous),
                    "classified move"
                );
                annotation.record(event);
            }
        }

        previous_eval = Some(current_eval);
        annotation.total_plies = ply;
        annotation.total_moves = number;
    }

    if annotation.warning().is_some() {
        warn!("game has no moves, reporting move count 0");
    }

    Ok(annotation)
}

/// Annotates one game inside its own engine session.
///
/// The evaluator is closed exactly once whatever the outcome, so a failed
/// game never leaves an engine behind for the next one.
pub fn annotate_in_session<S, E>(
    evaluator: E,
    start: Chess,
    moves: &[S],
    depth: u8,
    thresholds: &Thresholds,
) -> Result<GameAnnotation, AnalysisError>
where
    S: AsRef<str>,
    E: Evaluator,
{
    let mut session = EngineSession::new(evaluator);
    let result = analyze_game(start, moves, &mut session, depth, thresholds);
    if let Err(e) = session.close() {
        warn!(error = %e, "engine session did not shut down cleanly");
    }
    result
}
