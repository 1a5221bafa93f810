use std::fmt;
use std::str::FromStr;

// --- Chart kinds ---

/// Presentation style of a generated shot chart.
///
/// Scatter is the default whenever a comment carries no `type=` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChartKind {
    #[default]
    Scatter,
    Kde,
    Hex,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scatter => "scatter",
            Self::Kde => "kde",
            Self::Hex => "hex",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scatter" => Ok(Self::Scatter),
            "kde" => Ok(Self::Kde),
            "hex" => Ok(Self::Hex),
            other => Err(format!("unknown chart kind: {other}")),
        }
    }
}

// --- Entities ---

/// Opaque player identifier (stats.nba.com PERSON_ID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A query resolved against the canonical name directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMatch {
    pub entity_id: EntityId,
    /// Canonical "Last, First" form, e.g. "Curry, Stephen".
    pub canonical_name: String,
}

impl EntityMatch {
    pub fn new(entity_id: EntityId, canonical_name: impl Into<String>) -> Self {
        Self {
            entity_id,
            canonical_name: canonical_name.into(),
        }
    }

    /// "Curry, Stephen" → "Stephen Curry".
    pub fn display_name(&self) -> String {
        display_name(&self.canonical_name)
    }
}

/// Convert a canonical "Last, First" name into reading order.
/// Names without a comma (single-name players) are returned unchanged.
pub fn display_name(canonical: &str) -> String {
    let parts: Vec<&str> = canonical.split(", ").collect();
    parts.into_iter().rev().collect::<Vec<_>>().join(" ")
}

// --- Comments & queries ---

/// A comment observed on the platform. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    pub body: String,
}

impl Comment {
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
        }
    }
}

/// One `[[first last]]` request found in a comment body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub raw_text: String,
    pub kind: ChartKind,
}

/// One successfully answered query: a label and the hosted chart URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry {
    pub label: String,
    pub url: String,
}

impl ResultEntry {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_kind_parses_case_insensitively() {
        assert_eq!("HEX".parse::<ChartKind>().unwrap(), ChartKind::Hex);
        assert_eq!("Scatter".parse::<ChartKind>().unwrap(), ChartKind::Scatter);
        assert_eq!("kde".parse::<ChartKind>().unwrap(), ChartKind::Kde);
        assert!("heatmap".parse::<ChartKind>().is_err());
    }

    #[test]
    fn chart_kind_defaults_to_scatter() {
        assert_eq!(ChartKind::default(), ChartKind::Scatter);
        assert_eq!(ChartKind::default().to_string(), "scatter");
    }

    #[test]
    fn display_name_reverses_canonical_form() {
        assert_eq!(display_name("Curry, Stephen"), "Stephen Curry");
        assert_eq!(display_name("Nene"), "Nene");
        let m = EntityMatch::new(EntityId(2544), "James, LeBron");
        assert_eq!(m.display_name(), "LeBron James");
    }
}
