use std::future::Future;
use std::sync::Arc;

use prometheus::IntGauge;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::credential::{Credential, TokenGrant};
use crate::error::FetchError;
use crate::helpers::time::Clock;
use crate::observability::metrics::get_metrics;

/// Performs the credential exchange against the provider's token endpoint.
pub trait CredentialExchange: Send + Sync {
    fn exchange(&self) -> impl Future<Output = Result<TokenGrant, FetchError>> + Send;
}

/// Lazily refreshed bearer credential.
///
/// The lock only guards the pointer swap and is never held across the exchange call,
/// so two requests that both see an expired credential will both refresh. Last writer wins.
pub struct TokenCache<E> {
    exchange: E,
    clock: Arc<dyn Clock>,
    safety_margin_seconds: u64,
    current: RwLock<Option<Arc<Credential>>>,
    /// defaults to the process-wide `token_expiry_unix_seconds`
    expiry_gauge: Option<IntGauge>,
}

impl<E: CredentialExchange> TokenCache<E> {
    pub fn new(exchange: E, clock: Arc<dyn Clock>, safety_margin_seconds: u64) -> Self {
        Self {
            exchange,
            clock,
            safety_margin_seconds,
            current: RwLock::new(None),
            expiry_gauge: None,
        }
    }

    /// Report the usable-until timestamp on `gauge` instead of the process metrics.
    pub fn with_expiry_gauge(self, gauge: IntGauge) -> Self {
        Self { expiry_gauge: Some(gauge), ..self }
    }

    /// Start with a credential already in place.
    pub fn with_credential(self, credential: Credential) -> Self {
        Self { current: RwLock::new(Some(Arc::new(credential))), ..self }
    }

    /// Returns the cached credential while it is valid, otherwise exchanges for a new one.
    pub async fn ensure_token(&self) -> Result<Arc<Credential>, FetchError> {
        let now = self.clock.now();
        if let Some(credential) = self.current.read().await.as_ref() {
            if credential.is_valid_at(now) {
                debug!("credential cache hit, expires at {}", credential.expires_at);
                return Ok(credential.clone());
            }
        }

        info!("credential missing or expired, refreshing");
        let metrics = get_metrics().await;
        metrics.token_refreshes.inc();
        let grant = self.exchange.exchange().await?;
        let credential = Arc::new(Credential::from_grant(
            grant,
            self.clock.now(),
            self.safety_margin_seconds,
        )?);
        *self.current.write().await = Some(credential.clone());
        self.expiry_gauge().await.set(credential.expires_at.timestamp());
        info!("credential refreshed, usable until {}", credential.expires_at);
        Ok(credential)
    }

    /// Forget the cached credential so the next call refreshes.
    pub async fn invalidate(&self) {
        self.current.write().await.take();
        self.expiry_gauge().await.set(0);
    }

    pub async fn snapshot(&self) -> Option<Arc<Credential>> {
        self.current.read().await.clone()
    }

    async fn expiry_gauge(&self) -> IntGauge {
        match &self.expiry_gauge {
            Some(gauge) => gauge.clone(),
            None => get_metrics().await.token_expiry_unix.clone(),
        }
    }
}
