//! Batch analysis: every game gets its own engine, results are reported in input order

use std::io::Write;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::analysis::{annotate_in_session, AnalysisError, GameAnnotation, Thresholds};
use crate::archive::LoadedGame;
use crate::config::{AnalysisConfig, EngineConfig};
use crate::engine::{EngineError, Evaluator, StockfishEngine};
use crate::error::{Error, Result};
use crate::openings::{OpeningLookup, OpeningName};
use crate::report::{GameReport, ReportWriter};
use crate::storage::Database;

type Job = JoinHandle<Result<(LoadedGame, GameAnnotation)>>;

/// Starts a fresh evaluator for each game
pub trait EngineFactory: Send + Sync + 'static {
    type Engine: Evaluator;

    fn create(&self) -> std::result::Result<Self::Engine, EngineError>;
}

impl<F, E> EngineFactory for F
where
    F: Fn() -> std::result::Result<E, EngineError> + Send + Sync + 'static,
    E: Evaluator,
{
    type Engine = E;

    fn create(&self) -> std::result::Result<E, EngineError> {
        self()
    }
}

/// Launches Stockfish with the configured threads, hash and mate bound
pub struct StockfishFactory {
    pub config: EngineConfig,
    pub mate_score: i32,
}

impl StockfishFactory {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            config: config.engine.clone(),
            mate_score: config.mate_score,
        }
    }
}

impl EngineFactory for StockfishFactory {
    type Engine = StockfishEngine;

    fn create(&self) -> std::result::Result<StockfishEngine, EngineError> {
        StockfishEngine::launch(&self.config, self.mate_score)
    }
}

/// Counts for one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub analyzed: usize,
    /// Already in the database
    pub skipped: usize,
    /// Abandoned on an illegal move, a bad start position or an engine failure
    pub failed: usize,
}

pub struct Pipeline<F: EngineFactory> {
    factory: Arc<F>,
    depth: u8,
    thresholds: Thresholds,
    jobs: usize,
    username: String,
}

impl<F: EngineFactory> Pipeline<F> {
    pub fn new(factory: F, config: &AnalysisConfig, username: impl Into<String>) -> Self {
        Self {
            factory: Arc::new(factory),
            depth: config.depth,
            thresholds: config.thresholds(),
            jobs: config.jobs.max(1),
            username: username.into(),
        }
    }

    fn annotate(
        factory: &F,
        game: &LoadedGame,
        depth: u8,
        thresholds: &Thresholds,
    ) -> Result<GameAnnotation> {
        let start = game
            .pgn
            .starting_position()
            .map_err(AnalysisError::InvalidStart)?;
        let engine = factory.create()?;
        Ok(annotate_in_session(engine, start, &game.pgn.moves, depth, thresholds)?)
    }

    /// Waits for a job slot, then annotates on the blocking pool.
    ///
    /// A job that gets its slot after the batch has stopped returns without
    /// launching an engine.
    async fn annotate_task(
        factory: Arc<F>,
        semaphore: Arc<Semaphore>,
        game: LoadedGame,
        depth: u8,
        thresholds: Thresholds,
    ) -> Result<(LoadedGame, GameAnnotation)> {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|e| Error::Task(format!("job limiter closed: {}", e)))?;

        let joined = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            if semaphore.is_closed() {
                return Err(Error::Task("batch stopped before this game started".into()));
            }
            Self::annotate(&factory, &game, depth, &thresholds).map(|annotation| (game, annotation))
        })
        .await;

        joined.map_err(|e| Error::Task(e.to_string()))?
    }

    /// Analyzes `games`, writing a CSV row and (when a database is given)
    /// storing each report as soon as its game is done.
    ///
    /// Games are recognised by their `Link` tag. Games without one are
    /// analyzed on every run and never stored.
    ///
    /// A game that fails analysis is logged and counted; the batch moves on.
    /// An engine that cannot be started, or a write failure, stops the batch:
    /// queued games are dropped and games already running are waited for, so
    /// no engine outlives the returned error.
    pub async fn run<W: Write>(
        &self,
        games: Vec<LoadedGame>,
        writer: &mut ReportWriter<W>,
        openings: &mut OpeningLookup,
        db: Option<&Database>,
    ) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();
        let mut queued = Vec::with_capacity(games.len());

        for game in games {
            if let Some(db) = db {
                match game.pgn.link() {
                    Some(link) if db.is_analyzed(link)? => {
                        summary.skipped += 1;
                        continue;
                    }
                    Some(_) => {}
                    None => warn!(
                        game = %game.pgn.summary(),
                        "game has no Link tag, it cannot be resumed"
                    ),
                }
            }
            queued.push(game);
        }

        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let jobs: Vec<Job> = queued
            .into_iter()
            .map(|game| {
                tokio::spawn(Self::annotate_task(
                    Arc::clone(&self.factory),
                    Arc::clone(&semaphore),
                    game,
                    self.depth,
                    self.thresholds,
                ))
            })
            .collect();

        let total = jobs.len();
        let mut jobs = jobs.into_iter().enumerate();
        let consumed = self
            .consume(&mut jobs, total, writer, openings, db, &mut summary)
            .await;

        if consumed.is_err() {
            semaphore.close();
            for (_, job) in jobs {
                let _ = job.await;
            }
        }
        consumed?;

        writer.flush()?;
        Ok(summary)
    }

    /// Reports finished jobs in input order until one fails fatally
    async fn consume<W: Write>(
        &self,
        jobs: &mut impl Iterator<Item = (usize, Job)>,
        total: usize,
        writer: &mut ReportWriter<W>,
        openings: &mut OpeningLookup,
        db: Option<&Database>,
        summary: &mut BatchSummary,
    ) -> Result<()> {
        for (index, job) in jobs {
            let outcome = job.await.map_err(|e| Error::Task(e.to_string()))?;

            let (game, annotation) = match outcome {
                Ok(done) => done,
                Err(Error::Analysis(e)) => {
                    warn!(game = index + 1, total, error = %e, "skipping game");
                    summary.failed += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let opening = match game.pgn.eco_url() {
                Some(url) => openings.lookup(url).await,
                None => OpeningName::default(),
            };

            let report = GameReport::build(
                &game.pgn,
                annotation,
                game.accuracies,
                opening,
                &self.username,
            );
            writer.write(&report)?;

            if let (Some(db), Some(_)) = (db, report.link()) {
                db.insert_report(&report)?;
            }

            info!(
                game = index + 1,
                total,
                summary = %game.pgn.summary(),
                moves = report.total_moves,
                events = report.annotation.event_count(),
                "analyzed game"
            );
            summary.analyzed += 1;
        }

        Ok(())
    }
}
