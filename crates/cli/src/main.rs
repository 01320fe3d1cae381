use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess};
use tracing::info;
use tracing_subscriber::EnvFilter;

use blunder_report_core::archive::{list_archive_files, merge_files, merge_json_archives};
use blunder_report_core::{
    load_games, AnalysisConfig, ChessComClient, Database, OpeningLookup, Pipeline, ReportWriter,
    StockfishEngine, StockfishFactory,
};

#[derive(Parser)]
#[command(name = "blunder-report")]
#[command(about = "Counts the mistakes and blunders in your chess.com games")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download monthly archives (JSON and PGN) from chess.com
    Download {
        #[arg(short, long)]
        username: String,
        /// Contact address sent in the User-Agent, required by chess.com
        #[arg(short, long)]
        email: String,
        /// Defaults to the current year
        #[arg(short, long)]
        year: Option<i32>,
        /// Comma separated, e.g. 01,02; defaults to every month with games that year
        #[arg(short, long, value_delimiter = ',')]
        months: Vec<u32>,
        #[arg(short, long, default_value = "games")]
        out_dir: PathBuf,
    },
    /// Combine every archive in a directory into one JSON and one PGN file
    Merge {
        #[arg(short, long)]
        dir: PathBuf,
        /// Defaults to <dir>/combined.json
        #[arg(long)]
        json_out: Option<PathBuf>,
        /// Defaults to <dir>/combined.pgn
        #[arg(long)]
        pgn_out: Option<PathBuf>,
    },
    /// Analyze games and write one CSV row per game
    Analyze {
        /// chess.com JSON archive or PGN file
        input: PathBuf,
        /// Player the Win-Loss-Draw column is reported for
        #[arg(short, long)]
        username: String,
        /// Path to the UCI engine binary
        #[arg(long)]
        engine: Option<String>,
        #[arg(short, long, default_value = "games.csv")]
        output: PathBuf,
        /// SQLite file; games already stored are skipped
        #[arg(long)]
        db: Option<PathBuf>,
        /// TOML settings file
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        depth: Option<u8>,
        #[arg(long)]
        threads: Option<u32>,
        /// Games analyzed at once, each with its own engine
        #[arg(short, long)]
        jobs: Option<usize>,
        /// Name openings from their URL instead of fetching chess.com pages
        #[arg(long)]
        offline: bool,
    },
    /// Evaluate one position to check the engine works
    Eval {
        /// FEN string; defaults to the starting position
        fen: Option<String>,
        #[arg(long, default_value = "stockfish")]
        engine: String,
        #[arg(long, default_value = "18")]
        depth: u8,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Download {
            username,
            email,
            year,
            months,
            out_dir,
        } => download(&username, &email, year, months, out_dir).await,
        Commands::Merge {
            dir,
            json_out,
            pgn_out,
        } => merge(dir, json_out, pgn_out),
        Commands::Analyze {
            input,
            username,
            engine,
            output,
            db,
            config,
            depth,
            threads,
            jobs,
            offline,
        } => {
            let mut settings = match &config {
                Some(path) => AnalysisConfig::load(path)?,
                None => AnalysisConfig::default(),
            };
            if let Some(engine) = engine {
                settings.engine.path = engine;
            }
            if let Some(depth) = depth {
                settings.depth = depth;
            }
            if let Some(threads) = threads {
                settings.engine.threads = threads;
            }
            if let Some(jobs) = jobs {
                settings.jobs = jobs;
            }
            settings.validate()?;

            analyze(input, &username, output, db, settings, offline).await
        }
        Commands::Eval { fen, engine, depth } => {
            tokio::task::spawn_blocking(move || eval(fen.as_deref(), &engine, depth)).await?
        }
    }
}

async fn download(
    username: &str,
    email: &str,
    year: Option<i32>,
    months: Vec<u32>,
    out_dir: PathBuf,
) -> Result<()> {
    let year = year.unwrap_or_else(|| chrono::Local::now().year());
    if let Some(bad) = months.iter().find(|m| !(1..=12).contains(*m)) {
        bail!("invalid month {}", bad);
    }

    let client = ChessComClient::new(username, email)?;
    let months = if months.is_empty() {
        client
            .fetch_archive_list(username)
            .await
            .context("listing archives")?
            .months()
            .into_iter()
            .filter(|(y, _)| *y == year)
            .map(|(_, m)| m)
            .collect()
    } else {
        months
    };

    if months.is_empty() {
        println!("No games found for {} in {}", username, year);
        return Ok(());
    }

    let downloaded = client
        .download_months(username, year, &months, &out_dir)
        .await?;
    println!(
        "Downloaded {} of {} months into {}",
        downloaded.len(),
        months.len(),
        out_dir.display()
    );
    Ok(())
}

fn merge(dir: PathBuf, json_out: Option<PathBuf>, pgn_out: Option<PathBuf>) -> Result<()> {
    let (json_files, pgn_files) = list_archive_files(&dir)?;
    let json_out = json_out.unwrap_or_else(|| dir.join("combined.json"));
    let pgn_out = pgn_out.unwrap_or_else(|| dir.join("combined.pgn"));

    let pgn_merged = merge_files(&pgn_files, &pgn_out)?;
    let json_merged = merge_json_archives(&json_files, &json_out)?;

    println!("Merged {} PGN files into {}", pgn_merged, pgn_out.display());
    println!("Merged {} JSON archives into {}", json_merged, json_out.display());
    Ok(())
}

async fn analyze(
    input: PathBuf,
    username: &str,
    output: PathBuf,
    db: Option<PathBuf>,
    settings: AnalysisConfig,
    offline: bool,
) -> Result<()> {
    let games = load_games(&input).with_context(|| format!("loading {}", input.display()))?;
    info!(games = games.len(), input = %input.display(), "loaded games");

    let db = db.map(Database::open).transpose()?;
    let mut writer = ReportWriter::create(&output)?;
    let mut openings = if offline {
        OpeningLookup::offline()
    } else {
        OpeningLookup::new()?
    };

    let pipeline = Pipeline::new(StockfishFactory::from_config(&settings), &settings, username);
    let summary = pipeline
        .run(games, &mut writer, &mut openings, db.as_ref())
        .await?;

    println!(
        "Analyzed {} games ({} skipped, {} failed), report written to {}",
        summary.analyzed,
        summary.skipped,
        summary.failed,
        output.display()
    );
    Ok(())
}

fn eval(fen: Option<&str>, engine_path: &str, depth: u8) -> Result<()> {
    let position: Chess = match fen {
        Some(fen) => {
            let parsed: Fen = fen.parse().with_context(|| format!("invalid FEN: {}", fen))?;
            parsed.into_position(CastlingMode::Standard)?
        }
        None => Chess::default(),
    };

    let mut engine = StockfishEngine::new(engine_path)?;
    engine.set_position(&position)?;
    let analysis = engine.analyze(depth)?;
    println!("{}", analysis.summary());
    engine.quit()?;
    Ok(())
}
