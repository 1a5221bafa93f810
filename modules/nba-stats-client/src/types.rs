use serde::Deserialize;

/// Top-level stats.nba.com response: a list of tabular result sets.
#[derive(Debug, Deserialize)]
pub(crate) struct StatsResponse {
    #[serde(rename = "resultSets")]
    pub result_sets: Vec<ResultSet>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultSet {
    pub name: String,
    pub headers: Vec<String>,
    #[serde(rename = "rowSet")]
    pub row_set: Vec<Vec<serde_json::Value>>,
}

impl ResultSet {
    pub(crate) fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }
}

/// One roster entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub person_id: u64,
    /// Canonical "Last, First" form, e.g. "Curry, Stephen".
    pub display_last_comma_first: String,
    pub from_year: Option<String>,
    pub to_year: Option<String>,
}
