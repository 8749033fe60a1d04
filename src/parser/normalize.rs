use serde::Serialize;
use serde_json::Value;

use crate::helpers::time::{from_epoch_seconds, to_iso8601};

const PERMALINK_ORIGIN: &str = "https://www.reddit.com";

/// Provider-independent shape of a post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPost {
    pub title: String,
    pub url: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    pub body: String,
    pub subreddit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub permalink: String,
}

/// Maps one raw item. Never fails: absent text fields become `""` and an absent
/// creation time becomes the Unix epoch.
pub fn normalize(raw: &Value) -> NormalizedPost {
    let permalink = text(raw, "permalink");
    let url = match raw.get("url").and_then(Value::as_str) {
        Some(url) if !url.is_empty() => url.to_owned(),
        _ if !permalink.is_empty() => format!("{PERMALINK_ORIGIN}{permalink}"),
        _ => String::new(),
    };
    let created = raw.get("created_utc").and_then(Value::as_f64).unwrap_or(0.0);

    NormalizedPost {
        title: text(raw, "title"),
        url,
        created_at: to_iso8601(from_epoch_seconds(created)),
        score: raw.get("score").and_then(Value::as_i64),
        body: text(raw, "selftext"),
        subreddit: text(raw, "subreddit"),
        author: raw.get("author").and_then(Value::as_str).map(str::to_owned),
        permalink,
    }
}

pub fn normalize_all(raw: &[Value]) -> Vec<NormalizedPost> {
    raw.iter().map(normalize).collect()
}

fn text(raw: &Value, field: &str) -> String {
    raw.get(field).and_then(Value::as_str).unwrap_or_default().to_owned()
}
