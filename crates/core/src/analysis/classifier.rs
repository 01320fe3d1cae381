//! Threshold classification of evaluation deltas

use serde::{Deserialize, Serialize};

use super::types::{ClassificationEvent, Severity, Side};

/// Centipawn swings that count as a mistake or a blunder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub mistake: i32,
    pub blunder: i32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            mistake: 100,
            blunder: 300,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<(), String> {
        if self.mistake <= 0 {
            return Err(format!(
                "mistake threshold must be positive, got {}",
                self.mistake
            ));
        }
        if self.blunder < self.mistake {
            return Err(format!(
                "blunder threshold {} is below mistake threshold {}",
                self.blunder, self.mistake
            ));
        }
        Ok(())
    }
}

/// Full-move number for a 1-based ply index
pub fn move_number(ply: u32) -> u32 {
    ply.div_ceil(2)
}

/// Classifies the White-relative change from `previous` to `current`.
///
/// A drop is charged to White, a rise to Black. Blunder is checked before
/// mistake on each side, so a swing is reported once at its worst severity.
pub fn classify(
    previous: i32,
    current: i32,
    move_number: u32,
    thresholds: &Thresholds,
) -> Option<ClassificationEvent> {
    let delta = current.saturating_sub(previous);

    let (side, severity) = if delta >= thresholds.blunder {
        (Side::Black, Severity::Blunder)
    } else if delta >= thresholds.mistake {
        (Side::Black, Severity::Mistake)
    } else if delta <= -thresholds.blunder {
        (Side::White, Severity::Blunder)
    } else if delta <= -thresholds.mistake {
        (Side::White, Severity::Mistake)
    } else {
        return None;
    };

    Some(ClassificationEvent {
        side,
        severity,
        move_number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(prev: i32, curr: i32) -> Option<(Side, Severity)> {
        classify(prev, curr, 1, &Thresholds::default()).map(|e| (e.side, e.severity))
    }

    #[test]
    fn test_move_numbers() {
        let numbers: Vec<u32> = (1..=10).map(move_number).collect();
        assert_eq!(numbers, vec![1, 1, 2, 2, 3, 3, 4, 4, 5, 5]);
        assert_eq!(move_number(0), 0);
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(kind(0, 300), Some((Side::Black, Severity::Blunder)));
        assert_eq!(kind(0, 299), Some((Side::Black, Severity::Mistake)));
        assert_eq!(kind(0, 100), Some((Side::Black, Severity::Mistake)));
        assert_eq!(kind(0, 99), None);
        assert_eq!(kind(0, -99), None);
        assert_eq!(kind(0, -100), Some((Side::White, Severity::Mistake)));
        assert_eq!(kind(0, -300), Some((Side::White, Severity::Blunder)));
    }

    #[test]
    fn test_sign_convention() {
        // White-relative score falling: White's position got worse
        assert_eq!(kind(150, -200), Some((Side::White, Severity::Blunder)));
        // White-relative score rising sharply: charged to Black
        assert_eq!(kind(-1000, 1000), Some((Side::Black, Severity::Blunder)));
    }

    #[test]
    fn test_exactly_one_outcome_per_delta() {
        let thresholds = Thresholds::default();
        for delta in -1200..=1200 {
            let event = classify(0, delta, 3, &thresholds);
            let expected = if delta.abs() >= 300 {
                Some(Severity::Blunder)
            } else if delta.abs() >= 100 {
                Some(Severity::Mistake)
            } else {
                None
            };
            assert_eq!(event.map(|e| e.severity), expected, "delta {delta}");
            if let Some(e) = event {
                assert_eq!(e.side == Side::Black, delta > 0);
                assert_eq!(e.move_number, 3);
            }
        }
    }

    #[test]
    fn test_unbounded_scores_do_not_overflow() {
        assert_eq!(kind(i32::MAX, i32::MIN), Some((Side::White, Severity::Blunder)));
        assert_eq!(kind(i32::MIN, i32::MAX), Some((Side::Black, Severity::Blunder)));
        assert_eq!(kind(i32::MIN, i32::MIN), None);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = Thresholds {
            mistake: 50,
            blunder: 50,
        };
        assert!(thresholds.validate().is_ok());
        let event = classify(0, -50, 7, &thresholds).unwrap();
        assert_eq!(event.severity, Severity::Blunder);
    }

    #[test]
    fn test_validate() {
        assert!(Thresholds::default().validate().is_ok());
        assert!(Thresholds { mistake: 0, blunder: 300 }.validate().is_err());
        assert!(Thresholds { mistake: 200, blunder: 100 }.validate().is_err());
    }
}
