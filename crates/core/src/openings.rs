//! Opening names for chess.com games, resolved from the `ECOUrl` tag

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

const TITLE_SUFFIX: &str = " - Chess Openings - Chess.com";

/// Opening name split into family and variation,
/// e.g. "Pirc Defense" and "Classical, Quiet System"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningName {
    pub full: String,
    pub main: String,
    /// Empty when the mainline of the opening was played
    pub variation: String,
}

impl OpeningName {
    /// Splits on the first colon
    pub fn parse(full: &str) -> Self {
        let full = full.trim();
        match full.split_once(':') {
            Some((main, variation)) => Self {
                full: full.to_string(),
                main: main.trim().to_string(),
                variation: variation.trim().to_string(),
            },
            None => Self {
                full: full.to_string(),
                main: full.to_string(),
                variation: String::new(),
            },
        }
    }

    /// From an opening page `<title>`
    pub fn from_title(title: &str) -> Self {
        let title = title.trim();
        Self::parse(title.strip_suffix(TITLE_SUFFIX).unwrap_or(title))
    }

    /// Offline guess from the URL slug.
    ///
    /// The slug drops the family/variation colon, so everything lands in
    /// `main`; move suffixes like `...3.Nf3` are kept as they appear.
    pub fn from_eco_url(url: &str) -> Self {
        let slug = url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();
        Self::parse(&slug.replace('-', " "))
    }
}

/// Text of the first `<title>` element
fn extract_title(html: &str) -> Option<&str> {
    let open = html.find("<title")?;
    let start = open + html[open..].find('>')? + 1;
    let end = start + html[start..].find("</title>")?;
    Some(html[start..end].trim())
}

/// Fetches opening names, one request per distinct URL
pub struct OpeningLookup {
    client: Option<Client>,
    cache: HashMap<String, OpeningName>,
}

impl OpeningLookup {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client: Some(client),
            cache: HashMap::new(),
        })
    }

    /// Never touches the network; names come from the URL slug
    pub fn offline() -> Self {
        Self {
            client: None,
            cache: HashMap::new(),
        }
    }

    async fn fetch(client: &Client, url: &str) -> Result<OpeningName> {
        let response = client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::ChessCom(format!(
                "opening page {}: {}",
                url,
                response.status()
            )));
        }
        let html = response.text().await?;
        let title = extract_title(&html)
            .ok_or_else(|| Error::ChessCom(format!("opening page {} has no title", url)))?;
        Ok(OpeningName::from_title(title))
    }

    /// Resolves a name, falling back to the URL slug if the page cannot be read
    pub async fn lookup(&mut self, eco_url: &str) -> OpeningName {
        if let Some(name) = self.cache.get(eco_url) {
            return name.clone();
        }

        let name = match &self.client {
            Some(client) => match Self::fetch(client, eco_url).await {
                Ok(name) => name,
                Err(e) => {
                    warn!(url = eco_url, error = %e, "opening lookup failed, using URL slug");
                    OpeningName::from_eco_url(eco_url)
                }
            },
            None => OpeningName::from_eco_url(eco_url),
        };

        debug!(url = eco_url, opening = %name.full, "resolved opening");
        self.cache.insert(eco_url.to_string(), name.clone());
        name
    }
}
