use std::sync::LazyLock;

use regex::Regex;

use shotbot_common::{ChartKind, Query};

/// Queries evaluated per comment. Matches past this are dropped.
pub const MAX_QUERY_SIZE_PER_COMMENT: usize = 10;

static QUERY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]]+)\]\]").expect("valid regex"));
static KIND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)type=(scatter|kde|hex)").expect("valid regex"));

/// Finds `[[first last]]` requests in a comment body.
#[derive(Debug, Clone)]
pub struct QueryExtractor {
    max_queries: usize,
}

impl Default for QueryExtractor {
    fn default() -> Self {
        Self::new(MAX_QUERY_SIZE_PER_COMMENT)
    }
}

impl QueryExtractor {
    pub fn new(max_queries: usize) -> Self {
        Self { max_queries }
    }

    pub fn max_queries(&self) -> usize {
        self.max_queries
    }

    /// Queries in the order they appear, capped at `max_queries`.
    ///
    /// The first `type=` marker anywhere in the comment applies to every query in it.
    pub fn extract(&self, body: &str) -> Vec<Query> {
        let kind = chart_kind(body);
        QUERY_RE
            .captures_iter(body)
            .map(|c| c[1].trim().to_string())
            .filter(|raw| !raw.is_empty())
            .take(self.max_queries)
            .map(|raw_text| Query { raw_text, kind })
            .collect()
    }
}

/// Chart kind requested by the first `type=` marker, or the default.
pub fn chart_kind(body: &str) -> ChartKind {
    KIND_RE
        .captures(body)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(queries: &[Query]) -> Vec<&str> {
        queries.iter().map(|q| q.raw_text.as_str()).collect()
    }

    #[test]
    fn extracts_queries_in_order() {
        let body = "Compare [[Stephen Curry]] with [[Lebron James]] please";
        let queries = QueryExtractor::default().extract(body);
        assert_eq!(raw(&queries), vec!["Stephen Curry", "Lebron James"]);
        assert!(queries.iter().all(|q| q.kind == ChartKind::Scatter));
    }

    #[test]
    fn first_kind_marker_applies_to_every_query() {
        let body = "[[Stephen Curry]] type=HEX and [[Kevin Durant]] type=kde";
        let queries = QueryExtractor::default().extract(body);
        assert_eq!(queries.len(), 2);
        assert!(queries.iter().all(|q| q.kind == ChartKind::Hex));
    }

    #[test]
    fn marker_before_queries_still_counts() {
        let queries = QueryExtractor::default().extract("Type=Kde [[Klay Thompson]]");
        assert_eq!(queries[0].kind, ChartKind::Kde);
    }

    #[test]
    fn unknown_kind_falls_back_to_scatter() {
        assert_eq!(chart_kind("type=heatmap [[Stephen Curry]]"), ChartKind::Scatter);
    }

    #[test]
    fn caps_at_max_queries() {
        let body: String = (0..15).map(|i| format!("[[Player Number{i}]] ")).collect();
        let queries = QueryExtractor::default().extract(&body);
        assert_eq!(queries.len(), MAX_QUERY_SIZE_PER_COMMENT);
        assert_eq!(queries[0].raw_text, "Player Number0");
        assert_eq!(queries[9].raw_text, "Player Number9");
    }

    #[test]
    fn keeps_malformed_queries_for_the_resolver() {
        let queries = QueryExtractor::default().extract("[[Magic Johnson Jr]] [[ Nene ]]");
        assert_eq!(raw(&queries), vec!["Magic Johnson Jr", "Nene"]);
    }

    #[test]
    fn empty_or_plain_text_yields_nothing() {
        let extractor = QueryExtractor::default();
        assert!(extractor.extract("").is_empty());
        assert!(extractor.extract("Curry is the best shooter ever").is_empty());
        assert!(extractor.extract("[[ ]] [single] [[unclosed").is_empty());
    }

    #[test]
    fn escaped_brackets_are_not_queries() {
        assert!(QueryExtractor::default().extract(r"\[\[First Last\]\]").is_empty());
    }
}
