//! PGN file parsing functionality

use pgn_reader::{RawTag, SanPlus, Skip, Visitor};
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess};
use std::fs;
use std::io::{self, Cursor};
use std::ops::ControlFlow;
use std::path::Path;

/// A parsed chess game: every tag in file order plus the mainline moves in SAN
#[derive(Debug, Clone, Default)]
pub struct PgnGame {
    pub tags: Vec<(String, String)>,
    pub moves: Vec<String>,
}

impl PgnGame {
    /// Value of a tag, matched case-sensitively as PGN requires
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn white(&self) -> Option<&str> {
        self.tag("White")
    }

    pub fn black(&self) -> Option<&str> {
        self.tag("Black")
    }

    pub fn result(&self) -> Option<&str> {
        self.tag("Result")
    }

    pub fn eco_url(&self) -> Option<&str> {
        self.tag("ECOUrl")
    }

    /// Game URL as chess.com exports it. `Site` is not a substitute:
    /// it names the server and is shared by every game played there.
    pub fn link(&self) -> Option<&str> {
        self.tag("Link")
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    pub fn summary(&self) -> String {
        let white = self.white().unwrap_or("Unknown");
        let black = self.black().unwrap_or("Unknown");
        let result = self.result().unwrap_or("*");
        format!("{} vs {} - {}", white, black, result)
    }

    /// Position the moves are played from: the `FEN` tag if present, else the standard start
    pub fn starting_position(&self) -> Result<Chess, String> {
        let Some(fen) = self.tag("FEN") else {
            return Ok(Chess::default());
        };
        let mode = match self.tag("Variant") {
            Some(variant) if variant.contains("960") => CastlingMode::Chess960,
            _ => CastlingMode::Standard,
        };
        let fen: Fen = fen.parse().map_err(|e| format!("{}: {}", fen, e))?;
        fen.into_position(mode).map_err(|e| e.to_string())
    }
}

struct GameMoves {
    tags: Vec<(String, String)>,
    moves: Vec<String>,
}

struct GameParser;

impl Visitor for GameParser {
    type Tags = Vec<(String, String)>;
    type Movetext = GameMoves;
    type Output = PgnGame;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(Vec::new())
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        name: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        let name = String::from_utf8_lossy(name).into_owned();
        let value = value.decode_utf8_lossy().to_string();
        tags.push((name, value));
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(GameMoves {
            tags,
            moves: Vec::new(),
        })
    }

    // Legality is checked when the game is replayed, not here
    fn san(&mut self, movetext: &mut Self::Movetext, san: SanPlus) -> ControlFlow<Self::Output> {
        movetext.moves.push(san.san.to_string());
        ControlFlow::Continue(())
    }

    fn begin_variation(
        &mut self,
        _movetext: &mut Self::Movetext,
    ) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn end_game(&mut self, movetext: Self::Movetext) -> Self::Output {
        PgnGame {
            tags: movetext.tags,
            moves: movetext.moves,
        }
    }
}

#[derive(Debug)]
pub enum PgnError {
    FileError(io::Error),
    NoGamesFound,
    ParseError(String),
}

impl std::fmt::Display for PgnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PgnError::FileError(e) => write!(f, "File error: {}", e),
            PgnError::NoGamesFound => write!(f, "No games found in PGN"),
            PgnError::ParseError(s) => write!(f, "Parse error: {}", s),
        }
    }
}

impl std::error::Error for PgnError {}

impl From<io::Error> for PgnError {
    fn from(error: io::Error) -> Self {
        PgnError::FileError(error)
    }
}

impl From<PgnError> for crate::Error {
    fn from(error: PgnError) -> Self {
        match error {
            PgnError::FileError(e) => crate::Error::Io(e),
            other => crate::Error::Pgn(other.to_string()),
        }
    }
}

pub fn parse_pgn_file<P: AsRef<Path>>(path: P) -> Result<Vec<PgnGame>, PgnError> {
    let contents = fs::read_to_string(path)?;
    parse_pgn_string(&contents)
}

pub fn parse_pgn_string(pgn: &str) -> Result<Vec<PgnGame>, PgnError> {
    let mut parser = GameParser;
    let mut games: Vec<PgnGame> = Vec::new();

    let cursor = Cursor::new(pgn.as_bytes());
    let mut reader = pgn_reader::Reader::new(cursor);

    loop {
        match reader.read_game(&mut parser) {
            Ok(Some(game)) => games.push(game),
            Ok(None) => break,
            Err(e) => return Err(PgnError::ParseError(e.to_string())),
        }
    }

    if games.is_empty() {
        Err(PgnError::NoGamesFound)
    } else {
        Ok(games)
    }
}
