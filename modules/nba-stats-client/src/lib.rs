pub mod error;
pub mod types;

pub use error::{Result, StatsError};
pub use types::Player;

use types::{ResultSet, StatsResponse};

const BASE_URL: &str = "https://stats.nba.com/stats";

/// stats.nba.com rejects requests that don't look like they come from a browser.
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
const REFERER: &str = "https://www.nba.com/";

const ALL_PLAYERS_RESULT_SET: &str = "CommonAllPlayers";

pub struct StatsClient {
    client: reqwest::Client,
    base_url: String,
    season: String,
}

impl StatsClient {
    pub fn new(season: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
            season: season.into(),
        }
    }

    /// Point the client at a different API root (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetch every player the league has on record (not only the current season).
    pub async fn all_players(&self) -> Result<Vec<Player>> {
        let url = format!("{}/commonallplayers", self.base_url);
        tracing::info!(season = %self.season, "Fetching player roster");

        let resp = self
            .client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .header("Referer", REFERER)
            .header("Accept", "application/json")
            .query(&[
                ("LeagueID", "00"),
                ("Season", self.season.as_str()),
                ("IsOnlyCurrentSeason", "0"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StatsError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: StatsResponse = resp.json().await?;
        let set = body
            .result_sets
            .into_iter()
            .find(|s| s.name == ALL_PLAYERS_RESULT_SET)
            .ok_or_else(|| StatsError::MissingResultSet(ALL_PLAYERS_RESULT_SET.to_string()))?;

        let players = players_from_result_set(&set)?;
        tracing::info!(count = players.len(), "Fetched player roster");
        Ok(players)
    }
}

fn players_from_result_set(set: &ResultSet) -> Result<Vec<Player>> {
    let id_col = set
        .column("PERSON_ID")
        .ok_or_else(|| StatsError::Parse("PERSON_ID column missing".into()))?;
    let name_col = set
        .column("DISPLAY_LAST_COMMA_FIRST")
        .ok_or_else(|| StatsError::Parse("DISPLAY_LAST_COMMA_FIRST column missing".into()))?;
    let from_col = set.column("FROM_YEAR");
    let to_col = set.column("TO_YEAR");

    let players = set
        .row_set
        .iter()
        .filter_map(|row| {
            let person_id = row.get(id_col)?.as_u64()?;
            let name = row.get(name_col)?.as_str()?.trim().to_string();
            if name.is_empty() {
                return None;
            }
            Some(Player {
                person_id,
                display_last_comma_first: name,
                from_year: cell_text(row, from_col),
                to_year: cell_text(row, to_col),
            })
        })
        .collect();

    Ok(players)
}

/// Year columns come back as strings or numbers depending on the season.
fn cell_text(row: &[serde_json::Value], col: Option<usize>) -> Option<String> {
    col.and_then(|c| row.get(c)).and_then(|v| match v {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_rows_without_id_or_name() {
        let set = ResultSet {
            name: ALL_PLAYERS_RESULT_SET.to_string(),
            headers: vec![
                "PERSON_ID".into(),
                "DISPLAY_LAST_COMMA_FIRST".into(),
                "FROM_YEAR".into(),
            ],
            row_set: vec![
                vec![serde_json::json!(201939), serde_json::json!("Curry, Stephen"), serde_json::json!("2009")],
                vec![serde_json::json!(null), serde_json::json!("Ghost, Player"), serde_json::json!("2001")],
                vec![serde_json::json!(1), serde_json::json!(""), serde_json::json!(1999)],
            ],
        };

        let players = players_from_result_set(&set).unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].person_id, 201939);
        assert_eq!(players[0].display_last_comma_first, "Curry, Stephen");
        assert_eq!(players[0].from_year.as_deref(), Some("2009"));
        assert_eq!(players[0].to_year, None);
    }

    #[test]
    fn missing_columns_are_parse_errors() {
        let set = ResultSet {
            name: ALL_PLAYERS_RESULT_SET.to_string(),
            headers: vec!["PERSON_ID".into()],
            row_set: vec![],
        };
        assert!(matches!(players_from_result_set(&set), Err(StatsError::Parse(_))));
    }
}
