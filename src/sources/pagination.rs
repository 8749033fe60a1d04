use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::credential::Credential;
use crate::error::FetchError;
use crate::sources::reddit::RedditClient;

/// Every item of a listing, in provider order.
#[derive(Debug, Clone, Default)]
pub struct PageWalk {
    pub items: Vec<Value>,
    pub pages: u32,
}

impl RedditClient {
    /// Walks the listing until the cursor runs out.
    ///
    /// Any failing page aborts the walk and the items gathered so far are dropped.
    /// A cursor still present after `max_pages` pages is reported as
    /// [`FetchError::PaginationLimitExceeded`].
    pub async fn fetch_all(
        &self,
        resource_path: &str,
        credential: &Credential,
    ) -> Result<PageWalk, FetchError> {
        let mut walk = PageWalk::default();
        let mut cursor: Option<String> = None;

        loop {
            if walk.pages >= self.max_pages {
                warn!("listing {} still has a cursor after {} pages", resource_path, walk.pages);
                return Err(FetchError::PaginationLimitExceeded { max_pages: self.max_pages });
            }

            let page = self
                .retry
                .run_with_retry(|| self.fetch_page(resource_path, credential, cursor.as_deref()))
                .await?;
            walk.pages += 1;
            debug!("page {} of {}: {} items", walk.pages, resource_path, page.items.len());
            walk.items.extend(page.items);

            match page.after {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        info!("fetched {} items from {} in {} pages", walk.items.len(), resource_path, walk.pages);
        Ok(walk)
    }
}
