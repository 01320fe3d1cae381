//! One analyzed game flattened into a report row

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::analysis::{GameAnnotation, Severity, Side};
use crate::chesscom::Accuracies;
use crate::openings::OpeningName;
use crate::parser::PgnGame;

/// PGN tags copied into every report, in column order
pub const TAG_COLUMNS: [&str; 21] = [
    "Event",
    "Site",
    "Date",
    "Round",
    "White",
    "Black",
    "Result",
    "CurrentPosition",
    "Timezone",
    "ECO",
    "ECOUrl",
    "UTCDate",
    "UTCTime",
    "WhiteElo",
    "BlackElo",
    "TimeControl",
    "Termination",
    "StartTime",
    "EndDate",
    "EndTime",
    "Link",
];

/// Result of a game from the reporting player's side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    /// `None` when the player is on neither side or the game is unfinished.
    /// Usernames compare case-insensitively, as chess.com treats them.
    pub fn for_player(game: &PgnGame, username: &str) -> Option<Self> {
        let is = |name: Option<&str>| name.is_some_and(|n| n.eq_ignore_ascii_case(username));
        let as_white = is(game.white());
        let as_black = is(game.black());

        match game.result()? {
            "1-0" if as_white => Some(Outcome::Win),
            "1-0" if as_black => Some(Outcome::Loss),
            "0-1" if as_black => Some(Outcome::Win),
            "0-1" if as_white => Some(Outcome::Loss),
            "1/2-1/2" if as_white || as_black => Some(Outcome::Draw),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "Win",
            Outcome::Loss => "Loss",
            Outcome::Draw => "Draw",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Win" => Some(Outcome::Win),
            "Loss" => Some(Outcome::Loss),
            "Draw" => Some(Outcome::Draw),
            _ => None,
        }
    }
}

/// Everything reported for one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameReport {
    /// Values for [`TAG_COLUMNS`], `None` where the tag is absent
    pub tags: Vec<Option<String>>,
    pub opening: OpeningName,
    pub outcome: Option<Outcome>,
    pub total_moves: u32,
    pub white_accuracy: Option<f64>,
    pub black_accuracy: Option<f64>,
    pub annotation: GameAnnotation,
}

impl GameReport {
    pub fn build(
        game: &PgnGame,
        annotation: GameAnnotation,
        accuracies: Accuracies,
        opening: OpeningName,
        username: &str,
    ) -> Self {
        let outcome = Outcome::for_player(game, username);
        if outcome.is_none() {
            warn!(game = %game.summary(), username, "player did not take part in a finished game");
        }

        Self {
            tags: TAG_COLUMNS
                .iter()
                .map(|name| game.tag(name).map(str::to_string))
                .collect(),
            opening,
            outcome,
            total_moves: annotation.total_moves,
            white_accuracy: accuracies.white,
            black_accuracy: accuracies.black,
            annotation,
        }
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        let index = TAG_COLUMNS.iter().position(|column| *column == name)?;
        self.tags.get(index)?.as_deref()
    }

    /// Key used to recognise a game already analyzed
    pub fn link(&self) -> Option<&str> {
        self.tag("Link")
    }

    pub fn count(&self, side: Side, severity: Severity) -> usize {
        self.annotation.count(side, severity)
    }

    pub fn first(&self, side: Side, severity: Severity) -> Option<u32> {
        self.annotation.first(side, severity)
    }
}
