//! Ties the credential cache, the pagination walk and the normalizer together.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::cache::credential::Credential;
use crate::cache::token_cache::TokenCache;
use crate::error::FetchError;
use crate::helpers::time::Clock;
use crate::observability::metrics::get_metrics;
use crate::parser::normalize::{normalize_all, NormalizedPost};
use crate::sources::reddit::RedditClient;

/// Successful fetch. An empty `posts` means the account has no posts, nothing else.
#[derive(Debug, Clone)]
pub struct Feed {
    pub posts: Vec<NormalizedPost>,
    pub pages: u32,
}

/// Summary of the most recent successful fetch.
#[derive(Debug, Clone)]
pub struct FetchStats {
    pub pages: u32,
    pub posts: usize,
    pub fetched_at: DateTime<Utc>,
}

pub struct PostFeed {
    client: RedditClient,
    cache: TokenCache<RedditClient>,
    clock: Arc<dyn Clock>,
    resource_path: String,
    last_fetch: RwLock<Option<FetchStats>>,
}

impl PostFeed {
    pub fn new(client: RedditClient, clock: Arc<dyn Clock>, safety_margin_seconds: u64) -> Self {
        let resource_path = client.provider().submitted_path();
        let cache = TokenCache::new(client.clone(), clock.clone(), safety_margin_seconds);
        Self {
            client,
            cache,
            clock,
            resource_path,
            last_fetch: RwLock::new(None),
        }
    }

    /// Seed the credential cache, mostly for tests.
    pub fn with_credential(self, credential: Credential) -> Self {
        Self { cache: self.cache.with_credential(credential), ..self }
    }

    pub fn username(&self) -> &str {
        &self.client.provider().username
    }

    pub fn cache(&self) -> &TokenCache<RedditClient> {
        &self.cache
    }

    /// Credential, every page, normalized. Credential failures propagate like any other.
    pub async fn fetch_posts(&self) -> Result<Feed, FetchError> {
        let credential = self.cache.ensure_token().await?;

        let walk = match self.client.fetch_all(&self.resource_path, &credential).await {
            Ok(walk) => walk,
            Err(e) => {
                if e.is_unauthorized() {
                    warn!("listing rejected the cached credential, dropping it");
                    self.cache.invalidate().await;
                }
                return Err(e);
            }
        };

        let posts = normalize_all(&walk.items);
        info!("serving {} posts for {}", posts.len(), self.username());
        get_metrics().await.posts_served.inc_by(posts.len() as u64);

        *self.last_fetch.write().await = Some(FetchStats {
            pages: walk.pages,
            posts: posts.len(),
            fetched_at: self.clock.now(),
        });
        Ok(Feed { posts, pages: walk.pages })
    }

    pub async fn last_fetch(&self) -> Option<FetchStats> {
        self.last_fetch.read().await.clone()
    }
}
