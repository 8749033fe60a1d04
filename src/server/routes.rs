use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::{error, warn};

use crate::error::FetchError;
use crate::helpers::time::to_iso8601;
use crate::parser::normalize::NormalizedPost;
use crate::server::server::AppState;

static FETCH_ERROR_MSG: &str = "Could not fetch posts";

/// Upstream failure as seen by a client: always a generic 500.
pub struct ApiError(FetchError);

impl From<FetchError> for ApiError {
    fn from(e: FetchError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("fetching posts failed: {}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": FETCH_ERROR_MSG }))).into_response()
    }
}

async fn load_posts(state: &AppState) -> Result<Vec<NormalizedPost>, ApiError> {
    match state.feed.fetch_posts().await {
        Ok(feed) => Ok(feed.posts),
        Err(e) => {
            state.metrics.feed_failures.with_label_values(&[e.reason()]).inc();
            Err(e.into())
        }
    }
}

/// Same envelope the provider uses: `{ data: { children: [ { data: post } ] } }`.
pub async fn reddit_posts(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let posts = load_posts(&state).await?;
    let children: Vec<Value> = posts.into_iter().map(|post| json!({ "data": post })).collect();
    Ok(Json(json!({ "data": { "children": children } })))
}

pub async fn posts(State(state): State<AppState>) -> Result<Json<Vec<NormalizedPost>>, ApiError> {
    Ok(Json(load_posts(&state).await?))
}

/// Compares digests so the time taken does not depend on where the inputs differ
/// or on the expected secret's length.
fn secrets_match(given: &str, expected: &str) -> bool {
    let given = Sha256::digest(given.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    given.iter().zip(expected.iter()).fold(0u8, |diff, (a, b)| diff | (a ^ b)) == 0
}

#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    secret: Option<String>,
}

pub async fn admin_status(
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> Response {
    let authorized = query
        .secret
        .as_deref()
        .is_some_and(|given| secrets_match(given, &state.admin_secret));
    if !authorized {
        warn!("admin status requested with a wrong secret");
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "unauthorized" }))).into_response();
    }

    let credential = state.feed.cache().snapshot().await.map(|c| {
        json!({ "expiresAt": to_iso8601(c.expires_at) })
    });
    let last_fetch = state.feed.last_fetch().await.map(|stats| {
        json!({
            "pages": stats.pages,
            "posts": stats.posts,
            "fetchedAt": to_iso8601(stats.fetched_at),
        })
    });

    Json(json!({
        "username": state.feed.username(),
        "credential": credential,
        "lastFetch": last_fetch,
    }))
    .into_response()
}
