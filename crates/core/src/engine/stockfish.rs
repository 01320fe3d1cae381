//! Stockfish chess engine interface
//!
//! Spawns Stockfish as a subprocess and communicates via UCI protocol.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::Duration;

use shakmaty::fen::Fen;
use shakmaty::{Chess, EnPassantMode, Position};
use tracing::debug;

use super::analysis::{Evaluation, PositionAnalysis, DEFAULT_MATE_SCORE};
use super::session::Evaluator;
use crate::config::EngineConfig;

/// Error type for engine operations
#[derive(Debug)]
pub enum EngineError {
    /// Failed to start the engine process
    SpawnError(String),
    /// Failed to communicate with engine
    IoError(std::io::Error),
    /// Engine returned unexpected response
    ProtocolError(String),
    /// Engine closed its output, usually because the process died
    Exited,
    /// Engine was already shut down
    Closed,
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::SpawnError(s) => write!(f, "Failed to start engine: {}", s),
            EngineError::IoError(e) => write!(f, "I/O error: {}", e),
            EngineError::ProtocolError(s) => write!(f, "Protocol error: {}", s),
            EngineError::Exited => write!(f, "Engine process exited unexpectedly"),
            EngineError::Closed => write!(f, "Engine already closed"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<std::io::Error> for EngineError {
    fn from(error: std::io::Error) -> Self {
        EngineError::IoError(error)
    }
}

/// Wrapper around Stockfish chess engine
pub struct StockfishEngine {
    /// The child process
    process: Child,
    /// Stdin for sending commands
    stdin: ChildStdin,
    /// Stdout reader for receiving responses
    stdout: BufReader<ChildStdout>,
    /// Bound applied to every score handed out through [`Evaluator`]
    mate_score: i32,
    closed: bool,
}

impl StockfishEngine {
    /// Creates a new Stockfish engine instance
    ///
    /// # Arguments
    /// * `path` - Path to stockfish binary (or "stockfish" if in PATH)
    ///
    /// # Example
    /// ```ignore
    /// let mut engine = StockfishEngine::new("stockfish")?;
    /// ```
    pub fn new(path: &str) -> Result<Self, EngineError> {
        let mut process = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| EngineError::SpawnError(format!("{}: {}", path, e)))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| EngineError::SpawnError("Failed to open stdin".into()))?;

        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| EngineError::SpawnError("Failed to open stdout".into()))?;

        let mut engine = StockfishEngine {
            process,
            stdin,
            stdout: BufReader::new(stdout),
            mate_score: DEFAULT_MATE_SCORE,
            closed: false,
        };

        engine.init_uci()?;

        Ok(engine)
    }

    /// Starts the engine and applies the session settings (threads, hash, mate bound)
    pub fn launch(config: &EngineConfig, mate_score: i32) -> Result<Self, EngineError> {
        let mut engine = Self::new(&config.path)?;
        engine.set_option("Threads", &config.threads.to_string())?;
        engine.set_option("Hash", &config.hash_mb.to_string())?;
        engine.wait_ready()?;
        engine.mate_score = mate_score;
        Ok(engine)
    }

    /// Sends a command to the engine
    fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        if self.closed {
            return Err(EngineError::Closed);
        }
        debug!(cmd, "uci <");
        writeln!(self.stdin, "{}", cmd)?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Reads a line from the engine
    fn read_line(&mut self) -> Result<String, EngineError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(EngineError::Exited);
        }
        let line = line.trim().to_string();
        debug!(line = %line, "uci >");
        Ok(line)
    }

    /// Reads lines until we get the expected response
    fn read_until(&mut self, expected: &str) -> Result<Vec<String>, EngineError> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line()?;
            let done = line.starts_with(expected);
            lines.push(line);
            if done {
                break;
            }
        }
        Ok(lines)
    }

    /// Initialize UCI protocol
    fn init_uci(&mut self) -> Result<(), EngineError> {
        self.send("uci")?;
        self.read_until("uciok")?;
        self.wait_ready()
    }

    fn wait_ready(&mut self) -> Result<(), EngineError> {
        self.send("isready")?;
        self.read_until("readyok")?;
        Ok(())
    }

    /// Sets a UCI option, e.g. `Threads` or `Hash`
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), EngineError> {
        self.send(&format!("setoption name {} value {}", name, value))
    }

    /// Sets the position to search
    pub fn set_position(&mut self, position: &Chess) -> Result<(), EngineError> {
        let fen = Fen::from_position(position, EnPassantMode::Legal);
        self.send(&format!("position fen {}", fen))
    }

    /// Analyzes the current position to a fixed depth
    pub fn analyze(&mut self, depth: u8) -> Result<PositionAnalysis, EngineError> {
        self.send(&format!("go depth {}", depth))?;

        let best_move;
        let mut evaluation = None;
        let mut pv = Vec::new();
        let mut final_depth = 0u8;
        let mut nodes = 0u64;

        loop {
            let line = self.read_line()?;

            if line.starts_with("bestmove") {
                // "bestmove e2e4 ponder e7e5"
                best_move = line.split_whitespace().nth(1).map(str::to_string);
                break;
            } else if line.starts_with("info") {
                let info = parse_info_line(&line);
                if let Some(score) = info.score {
                    evaluation = Some(score);
                }
                if let Some(d) = info.depth {
                    final_depth = d;
                }
                if let Some(n) = info.nodes {
                    nodes = n;
                }
                if !info.pv.is_empty() {
                    pv = info.pv;
                }
            }
        }

        let best_move = best_move
            .ok_or_else(|| EngineError::ProtocolError("bestmove line without a move".into()))?;
        let evaluation = evaluation
            .ok_or_else(|| EngineError::ProtocolError("search finished without a score".into()))?;

        Ok(PositionAnalysis {
            best_move,
            evaluation,
            depth: final_depth,
            pv,
            nodes,
        })
    }

    /// Quit the engine cleanly. Safe to call more than once.
    pub fn quit(&mut self) -> Result<(), EngineError> {
        if self.closed {
            return Ok(());
        }
        let sent = self.send("quit");
        self.closed = true;
        // Give it a moment to exit
        std::thread::sleep(Duration::from_millis(100));
        if self.process.try_wait()?.is_none() {
            let _ = self.process.kill();
        }
        let _ = self.process.wait();
        sent
    }
}

impl Evaluator for StockfishEngine {
    fn evaluate(&mut self, position: &Chess, depth: u8) -> Result<i32, EngineError> {
        self.set_position(position)?;
        let analysis = self.analyze(depth)?;
        Ok(analysis
            .evaluation
            .white_relative(position.turn(), self.mate_score))
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.quit()
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        let _ = self.quit();
    }
}

#[derive(Debug, Default, PartialEq)]
struct InfoLine {
    depth: Option<u8>,
    score: Option<Evaluation>,
    nodes: Option<u64>,
    pv: Vec<String>,
}

/// Parses an `info` line from Stockfish
fn parse_info_line(line: &str) -> InfoLine {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let mut info = InfoLine::default();
    let mut i = 0;

    while i < parts.len() {
        match parts[i] {
            "depth" => {
                info.depth = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "score" => {
                let value = parts.get(i + 2).and_then(|s| s.parse::<i32>().ok());
                info.score = match (parts.get(i + 1).copied(), value) {
                    (Some("cp"), Some(cp)) => Some(Evaluation::Centipawns(cp)),
                    (Some("mate"), Some(m)) => Some(Evaluation::Mate(m)),
                    _ => None,
                };
                i += 3;
            }
            "nodes" => {
                info.nodes = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "pv" => {
                // Everything after "pv" is the principal variation
                info.pv = parts[i + 1..].iter().map(|s| s.to_string()).collect();
                break;
            }
            _ => {
                i += 1;
            }
        }
    }

    info
}
