use std::time::Duration;

use reqwest::{Client, Response};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cache::credential::{Credential, TokenGrant};
use crate::cache::token_cache::CredentialExchange;
use crate::config::provider::ProviderConfig;
use crate::config::settings::SettingsConfig;
use crate::error::FetchError;
use crate::observability::metrics::get_metrics;
use crate::parser::listing::{parse_listing, ListingPage};
use crate::resilience::retry::RetrySettings;
use crate::utils::constants::GRANT_TYPE_CLIENT_CREDENTIALS;

static TOKEN_ENDPOINT: &str = "token";
static LISTING_ENDPOINT: &str = "listing";

/// HTTP client for the provider. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RedditClient {
    client: Client,
    provider: ProviderConfig,
    pub(crate) retry: RetrySettings,
    pub(crate) page_size: u32,
    pub(crate) max_pages: u32,
}

impl RedditClient {
    pub fn new(provider: ProviderConfig, settings: &SettingsConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.http.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            provider,
            retry: RetrySettings::from(&settings.retry),
            page_size: settings.pagination.page_size,
            max_pages: settings.pagination.max_pages,
        })
    }

    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }

    /// GET one listing page, passing `after` when continuing from a previous page.
    pub async fn fetch_page(
        &self,
        resource_path: &str,
        credential: &Credential,
        after: Option<&str>,
    ) -> Result<ListingPage, FetchError> {
        let url = format!("{}{}", self.provider.api_base_url.trim_end_matches('/'), resource_path);
        let mut query = vec![("limit", self.page_size.to_string())];
        if let Some(cursor) = after {
            query.push(("after", cursor.to_owned()));
        }
        debug!("fetching page {} after {:?}", url, after);

        let request = self
            .client
            .get(&url)
            .query(&query)
            .bearer_auth(&credential.token)
            .header(http::header::USER_AGENT, &self.provider.user_agent);

        let body = observed(LISTING_ENDPOINT, async {
            let response = request.send().await?;
            success_body(LISTING_ENDPOINT, response).await
        })
        .await?;

        let page = parse_listing(&body).inspect_err(|e| {
            warn!("unexpected listing response from {}: {}", url, e);
        })?;
        get_metrics().await.pages_fetched.inc();
        Ok(page)
    }
}

impl CredentialExchange for RedditClient {
    /// POST `grant_type=client_credentials` with basic auth.
    async fn exchange(&self) -> Result<TokenGrant, FetchError> {
        self.retry
            .run_with_retry(|| async move {
                let request = self
                    .client
                    .post(&self.provider.token_url)
                    .basic_auth(&self.provider.client_id, Some(&self.provider.client_secret))
                    .header(http::header::USER_AGENT, &self.provider.user_agent)
                    .form(&[("grant_type", GRANT_TYPE_CLIENT_CREDENTIALS)]);

                let body = observed(TOKEN_ENDPOINT, async {
                    let response = request.send().await?;
                    success_body(TOKEN_ENDPOINT, response).await
                })
                .await?;

                serde_json::from_str::<TokenGrant>(&body)
                    .map_err(|e| FetchError::MalformedEnvelope(format!("token response: {e}")))
            })
            .await
    }
}

async fn success_body(endpoint: &str, response: Response) -> Result<String, FetchError> {
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Rejected { endpoint: endpoint.to_owned(), status });
    }
    Ok(response.text().await?)
}

/// Records request count, duration and failure reason for one provider call.
async fn observed<F>(endpoint: &str, call: F) -> Result<String, FetchError>
where
    F: std::future::Future<Output = Result<String, FetchError>>,
{
    let metrics = get_metrics().await;
    let start = Instant::now();
    metrics.upstream_requests.with_label_values(&[endpoint]).inc();

    let result = call.await;
    metrics
        .upstream_duration
        .with_label_values(&[endpoint])
        .observe(start.elapsed().as_secs_f64());
    if let Err(e) = &result {
        metrics.upstream_failures.with_label_values(&[endpoint, e.reason()]).inc();
    }
    result
}
