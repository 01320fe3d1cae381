//! Replays a SAN move list against a board

use shakmaty::san::San;
use shakmaty::{Chess, Position};

use super::AnalysisError;

/// Lazy `(ply, position after the move)` sequence over a move list.
///
/// Plies are numbered from 1. The first unparseable or illegal move is
/// yielded as [`AnalysisError::IllegalMove`] and ends the sequence.
pub struct Replay<'a, S> {
    position: Chess,
    moves: std::slice::Iter<'a, S>,
    ply: u32,
    finished: bool,
}

impl<'a, S: AsRef<str>> Replay<'a, S> {
    pub fn new(start: Chess, moves: &'a [S]) -> Self {
        Self {
            position: start,
            moves: moves.iter(),
            ply: 0,
            finished: false,
        }
    }

    fn advance(&mut self, san_str: &str) -> Result<(), AnalysisError> {
        let ply = self.ply;
        let illegal = |reason: String| AnalysisError::IllegalMove {
            ply,
            san: san_str.to_string(),
            reason,
        };

        let san: San = san_str.parse().map_err(|e| illegal(format!("{}", e)))?;
        let mv = san
            .to_move(&self.position)
            .map_err(|e| illegal(format!("{}", e)))?;
        self.position = self
            .position
            .clone()
            .play(mv)
            .map_err(|e| illegal(format!("{}", e)))?;
        Ok(())
    }
}

impl<'a, S: AsRef<str>> Iterator for Replay<'a, S> {
    type Item = Result<(u32, Chess), AnalysisError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let san = self.moves.next()?;
        self.ply += 1;

        match self.advance(san.as_ref()) {
            Ok(()) => Some(Ok((self.ply, self.position.clone()))),
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::Color;

    #[test]
    fn test_replays_in_order() {
        let moves = ["e4", "e5", "Nf3"];
        let plies: Vec<(u32, Chess)> = Replay::new(Chess::default(), &moves)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(plies.len(), 3);
        assert_eq!(plies[0].0, 1);
        assert_eq!(plies[0].1.turn(), Color::Black);
        assert_eq!(plies[2].0, 3);
        assert_eq!(plies[2].1.turn(), Color::Black);
    }

    #[test]
    fn test_stops_at_illegal_move() {
        let moves = ["e4", "e5", "Ke3", "Nf3"];
        let mut replay = Replay::new(Chess::default(), &moves);

        assert!(replay.next().unwrap().is_ok());
        assert!(replay.next().unwrap().is_ok());
        match replay.next() {
            Some(Err(AnalysisError::IllegalMove { ply, san, .. })) => {
                assert_eq!(ply, 3);
                assert_eq!(san, "Ke3");
            }
            other => panic!("expected illegal move, got {:?}", other.map(|r| r.is_ok())),
        }
        assert!(replay.next().is_none());
    }

    #[test]
    fn test_rejects_garbage_san() {
        let moves = vec!["e4".to_string(), "zz9".to_string()];
        let results: Vec<_> = Replay::new(Chess::default(), &moves).collect();
        assert_eq!(results.len(), 2);
        assert!(matches!(results[1], Err(AnalysisError::IllegalMove { ply: 2, .. })));
    }

    #[test]
    fn test_empty_move_list() {
        let moves: [&str; 0] = [];
        assert!(Replay::new(Chess::default(), &moves).next().is_none());
    }
}
