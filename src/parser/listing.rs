use serde::Deserialize;
use serde_json::Value;

use crate::error::FetchError;

/// One page of a listing: the raw items in order and the cursor to the next page.
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    pub items: Vec<Value>,
    /// `None` on the terminal page
    pub after: Option<String>,
}

#[derive(Deserialize)]
struct Envelope {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    children: Vec<Child>,
    #[serde(default)]
    after: Option<String>,
}

#[derive(Deserialize)]
struct Child {
    #[serde(default)]
    data: Value,
}

/// Parses `{ "data": { "children": [ { "data": {..} } ], "after": ".." } }`.
///
/// A missing `data` or `data.children` is an error; anything inside a child is left untouched.
/// An empty-string cursor is treated the same as `null`.
pub fn parse_listing(body: &str) -> Result<ListingPage, FetchError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| FetchError::MalformedEnvelope(e.to_string()))?;

    Ok(ListingPage {
        items: envelope.data.children.into_iter().map(|child| child.data).collect(),
        after: envelope.data.after.filter(|cursor| !cursor.is_empty()),
    })
}
