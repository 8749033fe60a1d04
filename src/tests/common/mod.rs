// tests/common/mod.rs
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use httpmock::prelude::*;
use httpmock::Mock;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use crate::config::provider::ProviderConfig;
use crate::config::settings::{RetryConfig, SettingsConfig};
use crate::sources::reddit::RedditClient;

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";
/// base64("test-client:test-secret")
pub const BASIC_AUTH: &str = "Basic dGVzdC1jbGllbnQ6dGVzdC1zZWNyZXQ=";
pub const USERNAME: &str = "tester";
pub const USER_AGENT: &str = "post-feed-tests/1.0";
pub const TOKEN_PATH: &str = "/api/v1/access_token";
pub const LISTING_PATH: &str = "/user/tester/submitted";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn start_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

pub fn test_settings(page_size: u32, max_pages: u32) -> SettingsConfig {
    let mut settings = SettingsConfig::default();
    settings.pagination.page_size = page_size;
    settings.pagination.max_pages = max_pages;
    settings.http.timeout_ms = 2000;
    settings.retry = RetryConfig { attempts: 2, base_delay_ms: 1, max_delay_ms: 2 };
    settings
}

pub fn provider(token_url: String, api_base_url: String) -> ProviderConfig {
    ProviderConfig {
        token_url,
        api_base_url,
        user_agent: USER_AGENT.to_owned(),
        client_id: CLIENT_ID.to_owned(),
        client_secret: CLIENT_SECRET.to_owned(),
        username: USERNAME.to_owned(),
    }
}

pub fn build_client(token_server: &MockServer, api_base_url: String, settings: &SettingsConfig) -> RedditClient {
    RedditClient::new(provider(token_server.url(TOKEN_PATH), api_base_url), settings)
        .expect("reddit client")
}

/// Token endpoint that answers every well-formed client-credentials exchange.
pub async fn mock_token<'a>(server: &'a MockServer, token: &str, expires_in: u64) -> Mock<'a> {
    let body = json!({ "access_token": token, "token_type": "bearer", "expires_in": expires_in, "scope": "*" });
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path(TOKEN_PATH)
                .header("authorization", BASIC_AUTH)
                .header("user-agent", USER_AGENT)
                .body("grant_type=client_credentials");
            then.status(200).header("content-type", "application/json").json_body(body);
        })
        .await
}

pub async fn mock_token_failure(server: &MockServer, status: u16) -> Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(POST).path(TOKEN_PATH);
            then.status(status).json_body(json!({ "error": "invalid_client" }));
        })
        .await
}

/// `n` raw posts titled `{prefix}-{i}`
pub fn items(prefix: &str, n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| {
            json!({
                "title": format!("{prefix}-{i}"),
                "url": format!("https://example.com/{prefix}/{i}"),
                "permalink": format!("/r/test/comments/{prefix}{i}/"),
                "selftext": "text",
                "subreddit": "test",
                "score": i,
                "created_utc": 1_700_000_000.0 + i as f64,
            })
        })
        .collect()
}

pub fn listing(items: Vec<Value>, after: Option<&str>) -> String {
    let children: Vec<Value> = items.into_iter().map(|data| json!({ "kind": "t3", "data": data })).collect();
    json!({ "kind": "Listing", "data": { "after": after, "children": children } }).to_string()
}

/// What the listing server saw for one call.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub after: Option<String>,
    pub limit: Option<String>,
    pub authorization: Option<String>,
    pub user_agent: Option<String>,
}

pub type Seen = Arc<Mutex<Vec<SeenRequest>>>;

/// Listing server answering by the `after` query parameter; `None` is the first page.
/// Unknown cursors get a 404.
pub async fn spawn_listing_server(
    pages: HashMap<Option<String>, (StatusCode, String)>,
) -> (JoinHandle<()>, SocketAddr, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let pages = Arc::new(pages);
    let seen_clone = seen.clone();

    let router = Router::new().route(
        LISTING_PATH,
        get(move |Query(query): Query<HashMap<String, String>>, headers: HeaderMap| {
            let pages = pages.clone();
            let seen = seen_clone.clone();
            async move {
                let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_owned);
                let after = query.get("after").cloned();
                seen.lock().unwrap().push(SeenRequest {
                    after: after.clone(),
                    limit: query.get("limit").cloned(),
                    authorization: header("authorization"),
                    user_agent: header("user-agent"),
                });
                pages
                    .get(&after)
                    .cloned()
                    .unwrap_or((StatusCode::NOT_FOUND, "{}".to_owned()))
            }
        }),
    );

    let (handle, addr) = spawn_axum(router).await;
    (handle, addr, seen)
}

pub fn ok(body: String) -> (StatusCode, String) {
    (StatusCode::OK, body)
}
