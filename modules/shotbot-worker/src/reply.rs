use shotbot_common::ResultEntry;

/// Usage footer. Brackets are escaped so the bot never parses its own reply as a request.
fn usage(max_queries: usize) -> String {
    format!(
        "^(Request shot charts by putting a player's name in double brackets, e.g. \
\\[\\[Stephen Curry\\]\\]. Up to {max_queries} players per comment. Add type=scatter, \
type=hex or type=kde to pick the chart style.)"
    )
}

const SIGNATURE: &str =
    "^(I'm a bot. Charts are rebuilt once a day from stats.nba.com shot data.)";

/// Render the reply body for one comment's results, in the order they were produced.
/// `max_queries` is the per-comment cap quoted in the usage footer.
pub fn compose(entries: &[ResultEntry], max_queries: usize) -> String {
    let links = entries
        .iter()
        .map(|e| format!("[{}]({})", escape_label(&e.label), e.url))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{links}\n\n---\n\n{}\n\n{SIGNATURE}", usage(max_queries))
}

fn escape_label(label: &str) -> String {
    label.replace('[', "\\[").replace(']', "\\]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{QueryExtractor, MAX_QUERY_SIZE_PER_COMMENT};

    #[test]
    fn links_appear_in_order() {
        let body = compose(
            &[
                ResultEntry::new("Stephen Curry", "https://i.imgur.com/a.png"),
                ResultEntry::new("LeBron James", "https://i.imgur.com/b.png"),
            ],
            MAX_QUERY_SIZE_PER_COMMENT,
        );

        let curry = body.find("[Stephen Curry](https://i.imgur.com/a.png)").unwrap();
        let lebron = body.find("[LeBron James](https://i.imgur.com/b.png)").unwrap();
        assert!(curry < lebron);
        assert!(body.contains(&usage(MAX_QUERY_SIZE_PER_COMMENT)));
        assert!(body.ends_with(SIGNATURE));
    }

    #[test]
    fn is_deterministic() {
        let entries = [ResultEntry::new("Kevin Durant", "https://i.imgur.com/k.png")];
        assert_eq!(compose(&entries, 10), compose(&entries, 10));
    }

    #[test]
    fn reply_does_not_trigger_the_bot() {
        let body = compose(
            &[ResultEntry::new("Stephen Curry", "https://i.imgur.com/a.png")],
            MAX_QUERY_SIZE_PER_COMMENT,
        );
        assert!(QueryExtractor::default().extract(&body).is_empty());
    }

    #[test]
    fn usage_quotes_the_configured_cap() {
        let entries = [ResultEntry::new("Kevin Durant", "https://i.imgur.com/k.png")];
        assert!(compose(&entries, 10).contains("Up to 10 players per comment"));

        let body = compose(&entries, 3);
        assert!(body.contains("Up to 3 players per comment"));
        assert!(!body.contains("Up to 10"));
    }
}
