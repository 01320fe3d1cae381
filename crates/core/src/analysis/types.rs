//! Classification events and the per-game annotation they accumulate into

use serde::{Deserialize, Serialize};

/// Side blamed for an evaluation swing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::White => "white",
            Side::Black => "black",
        }
    }
}

/// Severity of a classified move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Swing of at least the blunder threshold
    Blunder,
    /// Swing of at least the mistake threshold
    Mistake,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Blunder => "blunder",
            Severity::Mistake => "mistake",
        }
    }
}

/// One mistake or blunder, located by full-move number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationEvent {
    pub side: Side,
    pub severity: Severity,
    pub move_number: u32,
}

/// Non-fatal conditions noticed while annotating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationWarning {
    /// The game has no moves; move count is reported as 0 and no events exist
    EmptyGame,
}

/// Every event found in one game, split by side and severity.
///
/// Each list holds move numbers in ply order. Several events may share a
/// move number; they are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameAnnotation {
    pub white_mistakes: Vec<u32>,
    pub white_blunders: Vec<u32>,
    pub black_mistakes: Vec<u32>,
    pub black_blunders: Vec<u32>,
    /// Half-moves replayed
    pub total_plies: u32,
    /// Full-move number of the last ply (0 for an empty game)
    pub total_moves: u32,
}

impl GameAnnotation {
    pub(crate) fn record(&mut self, event: ClassificationEvent) {
        let list = match (event.side, event.severity) {
            (Side::White, Severity::Mistake) => &mut self.white_mistakes,
            (Side::White, Severity::Blunder) => &mut self.white_blunders,
            (Side::Black, Severity::Mistake) => &mut self.black_mistakes,
            (Side::Black, Severity::Blunder) => &mut self.black_blunders,
        };
        list.push(event.move_number);
    }

    pub fn events(&self, side: Side, severity: Severity) -> &[u32] {
        match (side, severity) {
            (Side::White, Severity::Mistake) => &self.white_mistakes,
            (Side::White, Severity::Blunder) => &self.white_blunders,
            (Side::Black, Severity::Mistake) => &self.black_mistakes,
            (Side::Black, Severity::Blunder) => &self.black_blunders,
        }
    }

    pub fn count(&self, side: Side, severity: Severity) -> usize {
        self.events(side, severity).len()
    }

    /// Move number of the first event of this kind, if any
    pub fn first(&self, side: Side, severity: Severity) -> Option<u32> {
        self.events(side, severity).first().copied()
    }

    pub fn event_count(&self) -> usize {
        self.white_mistakes.len()
            + self.white_blunders.len()
            + self.black_mistakes.len()
            + self.black_blunders.len()
    }

    pub fn warning(&self) -> Option<AnnotationWarning> {
        (self.total_plies == 0).then_some(AnnotationWarning::EmptyGame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_duplicates_in_order() {
        let mut annotation = GameAnnotation::default();
        for move_number in [4, 4, 9] {
            annotation.record(ClassificationEvent {
                side: Side::Black,
                severity: Severity::Mistake,
                move_number,
            });
        }
        assert_eq!(annotation.black_mistakes, vec![4, 4, 9]);
        assert_eq!(annotation.first(Side::Black, Severity::Mistake), Some(4));
        assert_eq!(annotation.first(Side::White, Severity::Blunder), None);
        assert_eq!(annotation.event_count(), 3);
    }

    #[test]
    fn test_empty_warning() {
        assert_eq!(
            GameAnnotation::default().warning(),
            Some(AnnotationWarning::EmptyGame)
        );
        let played = GameAnnotation {
            total_plies: 1,
            total_moves: 1,
            ..Default::default()
        };
        assert_eq!(played.warning(), None);
    }
}
