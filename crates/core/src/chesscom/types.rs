//! chess.com public API data types

use serde::{Deserialize, Serialize};
use shakmaty::Color;

/// One month of a player's games, as served by
/// `/pub/player/{user}/games/{yyyy}/{mm}`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MonthArchive {
    #[serde(default)]
    pub games: Vec<ArchivedGame>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArchivedGame {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub pgn: Option<String>,
    /// Only present for games chess.com has reviewed
    #[serde(default)]
    pub accuracies: Option<Accuracies>,
    #[serde(default)]
    pub rules: Option<String>,
}

impl ArchivedGame {
    pub fn accuracy(&self, color: Color) -> Option<f64> {
        let accuracies = self.accuracies.as_ref()?;
        match color {
            Color::White => accuracies.white,
            Color::Black => accuracies.black,
        }
    }

    /// Standard chess only; variants have no meaningful engine evaluation here
    pub fn is_standard(&self) -> bool {
        self.rules.as_deref().map_or(true, |rules| rules == "chess")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct Accuracies {
    #[serde(default)]
    pub white: Option<f64>,
    #[serde(default)]
    pub black: Option<f64>,
}

/// Response of `/pub/player/{user}/games/archives`
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveList {
    #[serde(default)]
    pub archives: Vec<String>,
}

impl ArchiveList {
    /// `(year, month)` pairs parsed from the archive URLs, oldest first
    pub fn months(&self) -> Vec<(i32, u32)> {
        let mut months: Vec<(i32, u32)> = self
            .archives
            .iter()
            .filter_map(|url| {
                // ".../games/2024/03"
                let mut parts = url.trim_end_matches('/').rsplit('/');
                let month = parts.next()?.parse().ok()?;
                let year = parts.next()?.parse().ok()?;
                Some((year, month))
            })
            .collect();
        months.sort();
        months
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month_archive() {
        let json = r#"{"games":[
            {"url":"https://www.chess.com/game/live/1","pgn":"[White \"a\"]\n\n1. e4 *",
             "accuracies":{"white":91.2,"black":78.5},"rules":"chess","rated":true,
             "time_class":"blitz","white":{"username":"a"}},
            {"url":"https://www.chess.com/game/live/2","rules":"chess960"}
        ]}"#;
        let archive: MonthArchive = serde_json::from_str(json).unwrap();
        assert_eq!(archive.games.len(), 2);

        let reviewed = &archive.games[0];
        assert_eq!(reviewed.accuracy(Color::White), Some(91.2));
        assert_eq!(reviewed.accuracy(Color::Black), Some(78.5));
        assert!(reviewed.is_standard());

        let variant = &archive.games[1];
        assert_eq!(variant.accuracy(Color::White), None);
        assert!(!variant.is_standard());
        assert!(variant.pgn.is_none());
    }

    #[test]
    fn test_archive_months() {
        let list = ArchiveList {
            archives: vec![
                "https://api.chess.com/pub/player/x/games/2025/04".into(),
                "https://api.chess.com/pub/player/x/games/2024/12/".into(),
                "garbage".into(),
            ],
        };
        assert_eq!(list.months(), vec![(2024, 12), (2025, 4)]);
    }
}
