use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the process metrics.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Upstream calls
    pub upstream_requests: IntCounterVec,
    pub upstream_failures: IntCounterVec,
    pub upstream_duration: HistogramVec,

    // Credential cache
    pub token_refreshes: IntCounter,
    pub token_expiry_unix: IntGauge,

    // Feed
    pub pages_fetched: IntCounter,
    pub posts_served: IntCounter,
    pub feed_failures: IntCounterVec,

    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("postfeed".into()), None).expect("metrics registry");

        let metrics: Arc<Metrics> = Arc::new(Self {
            upstream_requests: IntCounterVec::new(Opts::new("upstream_requests_total", "Calls made to the provider"), &["endpoint"]).expect("metric"),
            upstream_failures: IntCounterVec::new(Opts::new("upstream_failures_total", "Provider call failures by reason"), &["endpoint", "reason"]).expect("metric"),
            upstream_duration: HistogramVec::new(HistogramOpts::new("upstream_request_duration_seconds", "Provider call duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]), &["endpoint"]).expect("metric"),

            token_refreshes: IntCounter::new("token_refreshes_total", "Credential exchanges triggered by the cache").expect("metric"),
            token_expiry_unix: IntGauge::new("token_expiry_unix_seconds", "Usable-until timestamp of the cached credential").expect("metric"),

            pages_fetched: IntCounter::new("pages_fetched_total", "Listing pages fetched").expect("metric"),
            posts_served: IntCounter::new("posts_served_total", "Normalized posts returned to clients").expect("metric"),
            feed_failures: IntCounterVec::new(Opts::new("feed_failures_total", "Requests answered with 500"), &["reason"]).expect("metric"),

            up: IntGauge::new("up", "1 if service is serving").expect("metric"),

            registry,
        });

        let reg = &metrics.registry;
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(metrics.upstream_requests.clone()),
            Box::new(metrics.upstream_failures.clone()),
            Box::new(metrics.upstream_duration.clone()),
            Box::new(metrics.token_refreshes.clone()),
            Box::new(metrics.token_expiry_unix.clone()),
            Box::new(metrics.pages_fetched.clone()),
            Box::new(metrics.posts_served.clone()),
            Box::new(metrics.feed_failures.clone()),
            Box::new(metrics.up.clone()),
        ];
        for collector in collectors {
            reg.register(collector).expect("metric registration");
        }

        metrics
    }
}
