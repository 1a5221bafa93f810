//! Roster fetch against a mock stats.nba.com.

use nba_stats_client::{StatsClient, StatsError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn parses_common_all_players() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "resource": "commonallplayers",
        "resultSets": [{
            "name": "CommonAllPlayers",
            "headers": ["PERSON_ID", "DISPLAY_LAST_COMMA_FIRST", "DISPLAY_FIRST_LAST", "FROM_YEAR", "TO_YEAR"],
            "rowSet": [
                [201939, "Curry, Stephen", "Stephen Curry", "2009", "2016"],
                [2544, "James, LeBron", "LeBron James", "2003", "2016"]
            ]
        }]
    });

    Mock::given(method("GET"))
        .and(path("/commonallplayers"))
        .and(query_param("Season", "2015-16"))
        .and(query_param("IsOnlyCurrentSeason", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = StatsClient::new("2015-16").with_base_url(server.uri());
    let players = client.all_players().await.unwrap();

    assert_eq!(players.len(), 2);
    assert_eq!(players[0].person_id, 201939);
    assert_eq!(players[1].display_last_comma_first, "James, LeBron");
    assert_eq!(players[1].to_year.as_deref(), Some("2016"));
}

#[tokio::test]
async fn missing_result_set_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/commonallplayers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "resultSets": [] })))
        .mount(&server)
        .await;

    let client = StatsClient::new("2015-16").with_base_url(server.uri());
    let err = client.all_players().await.unwrap_err();
    assert!(matches!(err, StatsError::MissingResultSet(_)));
}

#[tokio::test]
async fn upstream_failure_carries_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/commonallplayers"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let client = StatsClient::new("2015-16").with_base_url(server.uri());
    let err = client.all_players().await.unwrap_err();
    match err {
        StatsError::Api { status, message } => {
            assert_eq!(status, 429);
            assert_eq!(message, "slow down");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}
