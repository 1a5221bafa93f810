//! Reddit client flows against a mock API server.

use reddit_client::{Credentials, RedditClient, RedditError};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> Credentials {
    Credentials {
        client_id: "id".to_string(),
        client_secret: "secret".to_string(),
        username: "shotbot".to_string(),
        password: "pw".to_string(),
        user_agent: "test:shotbot:0.1".to_string(),
    }
}

async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .and(body_string_contains("grant_type=password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok-1",
            "token_type": "bearer",
            "expires_in": 3600,
            "scope": "*"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn fetches_comments_and_reuses_token() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    let listing = serde_json::json!({
        "kind": "Listing",
        "data": {
            "after": null,
            "children": [
                { "kind": "t1", "data": { "id": "c1", "name": "t1_c1", "body": "[[Stephen Curry]]", "author": "fan" } },
                { "kind": "t3", "data": { "id": "p1", "name": "t3_p1", "body": "" } },
                { "kind": "t1", "data": { "id": "c2", "name": "t1_c2", "body": "nice" } }
            ]
        }
    });

    Mock::given(method("GET"))
        .and(path("/r/nba/comments"))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&listing))
        .expect(2)
        .mount(&server)
        .await;

    let client = RedditClient::new(credentials()).with_base_url(server.uri());

    let first = client.subreddit_comments("nba").await.unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].id, "c1");
    assert_eq!(first[0].body, "[[Stephen Curry]]");
    assert_eq!(first[1].id, "c2");

    // Second call must not re-authenticate.
    let second = client.subreddit_comments("nba").await.unwrap();
    assert_eq!(second.len(), 2);
}

#[tokio::test]
async fn bad_credentials_are_auth_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "error": "invalid_grant" })),
        )
        .mount(&server)
        .await;

    let client = RedditClient::new(credentials()).with_base_url(server.uri());
    let err = client.subreddit_comments("nba").await.unwrap_err();
    match err {
        RedditError::Auth(msg) => assert_eq!(msg, "invalid_grant"),
        other => panic!("expected auth error, got {other:?}"),
    }
}

#[tokio::test]
async fn reply_posts_to_comment_fullname() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/api/comment"))
        .and(body_string_contains("thing_id=t1_c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "json": { "errors": [], "data": { "things": [] } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = RedditClient::new(credentials()).with_base_url(server.uri());
    client.reply("c1", "hello").await.unwrap();
}

#[tokio::test]
async fn reply_rejections_surface_reddit_errors() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/api/comment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "json": { "errors": [["RATELIMIT", "you are doing that too much", "ratelimit"]] }
        })))
        .mount(&server)
        .await;

    let client = RedditClient::new(credentials()).with_base_url(server.uri());
    let err = client.reply("t1_c9", "hello").await.unwrap_err();
    match err {
        RedditError::Rejected(msg) => {
            assert!(msg.starts_with("RATELIMIT: you are doing that too much"), "{msg}")
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn server_errors_carry_status() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/r/nba/comments"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&server)
        .await;

    let client = RedditClient::new(credentials()).with_base_url(server.uri());
    let err = client.subreddit_comments("nba").await.unwrap_err();
    assert!(matches!(err, RedditError::Api { status: 503, .. }));
}
