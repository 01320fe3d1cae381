//! chess.com public API client for downloading monthly game archives

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use super::types::*;
use crate::error::{Error, Result};

const CHESS_COM_API_BASE: &str = "https://api.chess.com/pub";

/// Files written for one downloaded month
#[derive(Debug, Clone)]
pub struct DownloadedMonth {
    pub year: i32,
    pub month: u32,
    pub json_path: PathBuf,
    pub pgn_path: PathBuf,
}

pub struct ChessComClient {
    client: Client,
    base_url: String,
}

impl ChessComClient {
    /// chess.com answers 403 to requests without a contact in the user agent
    pub fn new(username: &str, email: &str) -> Result<Self> {
        let agent = format!("username: {}, email: {}", username, email);
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&agent)
                .map_err(|e| Error::ChessCom(format!("invalid user agent: {}", e)))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: CHESS_COM_API_BASE.to_string(),
        })
    }

    /// Points the client at another host, e.g. a local mock server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn month_url(&self, username: &str, year: i32, month: u32) -> String {
        format!(
            "{}/player/{}/games/{}/{:02}",
            self.base_url,
            username.to_lowercase(),
            year,
            month
        )
    }

    async fn get_text(&self, url: &str, accept: &'static str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, accept)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(url.to_string()));
        }
        if !response.status().is_success() {
            return Err(Error::ChessCom(format!(
                "{} - {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        Ok(response.text().await?)
    }

    /// Months for which the player has games
    pub async fn fetch_archive_list(&self, username: &str) -> Result<ArchiveList> {
        let url = format!(
            "{}/player/{}/games/archives",
            self.base_url,
            username.to_lowercase()
        );
        let text = self.get_text(&url, "application/json").await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Raw JSON for one month; carries accuracies the PGN export lacks
    pub async fn fetch_month_json(&self, username: &str, year: i32, month: u32) -> Result<String> {
        self.get_text(&self.month_url(username, year, month), "application/json")
            .await
    }

    pub async fn fetch_month(&self, username: &str, year: i32, month: u32) -> Result<MonthArchive> {
        let text = self.fetch_month_json(username, year, month).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Every game of the month as one multi-game PGN document
    pub async fn fetch_month_pgn(&self, username: &str, year: i32, month: u32) -> Result<String> {
        let url = format!("{}/pgn", self.month_url(username, year, month));
        self.get_text(&url, "application/x-chess-pgn").await
    }

    /// Saves `{user}_{year}_{month}.json` and `.pgn` for each month into `out_dir`.
    ///
    /// A month that fails to download is logged and skipped.
    pub async fn download_months(
        &self,
        username: &str,
        year: i32,
        months: &[u32],
        out_dir: &Path,
    ) -> Result<Vec<DownloadedMonth>> {
        fs::create_dir_all(out_dir)?;
        let mut downloaded = Vec::with_capacity(months.len());

        for &month in months {
            info!(year, month, "downloading games");
            let fetched = async {
                let pgn = self.fetch_month_pgn(username, year, month).await?;
                let json = self.fetch_month_json(username, year, month).await?;
                Ok::<_, Error>((pgn, json))
            }
            .await;

            let (pgn, json) = match fetched {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(year, month, error = %e, "skipping month");
                    continue;
                }
            };

            let stem = format!("{}_{}_{:02}", username, year, month);
            let pgn_path = out_dir.join(format!("{}.pgn", stem));
            let json_path = out_dir.join(format!("{}.json", stem));
            fs::write(&pgn_path, pgn)?;
            fs::write(&json_path, json)?;
            info!(path = %pgn_path.display(), "saved month");

            downloaded.push(DownloadedMonth {
                year,
                month,
                json_path,
                pgn_path,
            });
        }

        Ok(downloaded)
    }
}
