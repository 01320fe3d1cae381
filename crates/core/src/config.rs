//! Analysis settings, loadable from a TOML file.
//!
//! Every field has a default, so an empty file (or no file) is valid:
//!
//! ```toml
//! depth = 18
//! mistake_threshold = 100
//! blunder_threshold = 300
//!
//! [engine]
//! path = "stockfish"
//! threads = 10
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::Thresholds;
use crate::engine::DEFAULT_MATE_SCORE;
use crate::error::{Error, Result};

/// Settings for one engine session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Path to the UCI binary, or a name resolved through PATH
    pub path: String,
    /// `Threads` UCI option
    pub threads: u32,
    /// `Hash` UCI option, in MB
    pub hash_mb: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: "stockfish".to_string(),
            threads: 10,
            hash_mb: 256,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Fixed search depth for every ply
    pub depth: u8,
    /// Bound applied to evaluations; forced mates map to plus or minus this
    pub mate_score: i32,
    pub mistake_threshold: i32,
    pub blunder_threshold: i32,
    /// Games analyzed concurrently, each with its own engine
    pub jobs: usize,
    pub engine: EngineConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            depth: 18,
            mate_score: DEFAULT_MATE_SCORE,
            mistake_threshold: 100,
            blunder_threshold: 300,
            jobs: 1,
            engine: EngineConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Reads and validates a TOML config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let config: AnalysisConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.depth == 0 {
            return Err(Error::Config("depth must be at least 1".into()));
        }
        if self.jobs == 0 {
            return Err(Error::Config("jobs must be at least 1".into()));
        }
        if self.mate_score <= 0 {
            return Err(Error::Config("mate_score must be positive".into()));
        }
        if self.engine.threads == 0 {
            return Err(Error::Config("engine.threads must be at least 1".into()));
        }
        self.thresholds().validate().map_err(Error::Config)
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            mistake: self.mistake_threshold,
            blunder: self.blunder_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.depth, 18);
        assert_eq!(config.mate_score, 1000);
        assert_eq!(config.thresholds(), Thresholds::default());
        assert_eq!(config.engine.threads, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "depth = 12\nblunder_threshold = 250\n\n[engine]\nthreads = 2").unwrap();

        let config = AnalysisConfig::load(file.path()).unwrap();
        assert_eq!(config.depth, 12);
        assert_eq!(config.mistake_threshold, 100);
        assert_eq!(config.blunder_threshold, 250);
        assert_eq!(config.engine.threads, 2);
        assert_eq!(config.engine.path, "stockfish");
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let config = AnalysisConfig {
            mistake_threshold: 400,
            blunder_threshold: 300,
            ..AnalysisConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "depth = \"deep\"").unwrap();
        assert!(matches!(
            AnalysisConfig::load(file.path()),
            Err(Error::ConfigParse(_))
        ));
    }
}
