//! Types for representing engine search results

use std::fmt;

use shakmaty::Color;

/// Default bound for evaluations; every forced mate maps to plus or minus this value
pub const DEFAULT_MATE_SCORE: i32 = 1000;

/// Raw engine score, from the side to move's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Centipawn score (positive = side to move is better)
    Centipawns(i32),
    /// Forced mate in N (positive = side to move mates, zero or negative = side to move is mated)
    Mate(i32),
}

impl Evaluation {
    /// Bounded score for the side to move.
    ///
    /// Mate distance is discarded: any forced mate is worth exactly
    /// `mate_score`, and centipawn scores are clamped into the same range,
    /// so deltas between consecutive plies stay comparable.
    pub fn bounded(&self, mate_score: i32) -> i32 {
        match *self {
            Evaluation::Centipawns(cp) => cp.clamp(-mate_score, mate_score),
            Evaluation::Mate(moves) if moves > 0 => mate_score,
            Evaluation::Mate(_) => -mate_score,
        }
    }

    /// Bounded score from White's point of view
    pub fn white_relative(&self, side_to_move: Color, mate_score: i32) -> i32 {
        let score = self.bounded(mate_score);
        match side_to_move {
            Color::White => score,
            Color::Black => -score,
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Centipawns(cp) => {
                let score = *cp as f32 / 100.0;
                if score >= 0.0 {
                    write!(f, "+{:.2}", score)
                } else {
                    write!(f, "{:.2}", score)
                }
            }
            Evaluation::Mate(moves) => write!(f, "M{}", moves),
        }
    }
}

/// Result of one `go depth N` search
#[derive(Debug, Clone)]
pub struct PositionAnalysis {
    /// Best move found, in UCI notation (`(none)` in terminal positions)
    pub best_move: String,
    /// Score of the last info line
    pub evaluation: Evaluation,
    /// Depth reached
    pub depth: u8,
    /// Principal variation
    pub pv: Vec<String>,
    pub nodes: u64,
}

impl PositionAnalysis {
    pub fn summary(&self) -> String {
        format!(
            "Eval: {} | Best: {} | Depth: {} | PV: {}",
            self.evaluation,
            self.best_move,
            self.depth,
            self.pv.iter().take(5).cloned().collect::<Vec<_>>().join(" ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mate_distance_is_discarded() {
        assert_eq!(Evaluation::Mate(1).bounded(1000), 1000);
        assert_eq!(Evaluation::Mate(12).bounded(1000), 1000);
        assert_eq!(Evaluation::Mate(-3).bounded(1000), -1000);
    }

    #[test]
    fn test_mated_side_to_move() {
        // "score mate 0" is reported when the side to move is already mated
        assert_eq!(Evaluation::Mate(0).bounded(1000), -1000);
        assert_eq!(Evaluation::Mate(0).white_relative(Color::Black, 1000), 1000);
    }

    #[test]
    fn test_centipawns_are_clamped() {
        assert_eq!(Evaluation::Centipawns(1500).bounded(1000), 1000);
        assert_eq!(Evaluation::Centipawns(-2200).bounded(1000), -1000);
        assert_eq!(Evaluation::Centipawns(35).bounded(1000), 35);
    }

    #[test]
    fn test_white_relative_flips_for_black() {
        let eval = Evaluation::Centipawns(120);
        assert_eq!(eval.white_relative(Color::White, 1000), 120);
        assert_eq!(eval.white_relative(Color::Black, 1000), -120);
    }

    #[test]
    fn test_display() {
        assert_eq!(Evaluation::Centipawns(-45).to_string(), "-0.45");
        assert_eq!(Evaluation::Centipawns(100).to_string(), "+1.00");
        assert_eq!(Evaluation::Mate(-2).to_string(), "M-2");
    }
}
