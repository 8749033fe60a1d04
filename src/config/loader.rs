use std::{fs, path::Path};

use regex::Regex;
use tracing::{debug, error};

use crate::config::provider::ServiceConfig;
use crate::error::ConfigError;

/// Load and validate config from YAML file
pub fn file_to_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&expand_env_vars(&content))
}

pub fn parse_config(content: &str) -> Result<ServiceConfig, ConfigError> {
    let service_config: ServiceConfig = serde_yaml::from_str(content)
        .inspect_err(|e| error!("parse config error: {}", e))?;

    debug!("validation config ...");
    validate_service_config(&service_config)?;
    Ok(service_config)
}

/// Required secrets must be present before any traffic is served.
pub fn validate_service_config(config: &ServiceConfig) -> Result<(), ConfigError> {
    let provider = &config.provider;
    let required = [
        ("provider.client_id", &provider.client_id),
        ("provider.client_secret", &provider.client_secret),
        ("provider.username", &provider.username),
        ("admin.secret", &config.admin.secret),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::Missing(name));
        }
    }

    let settings = &config.settings;
    if settings.pagination.page_size == 0 {
        return Err(ConfigError::Invalid("pagination.page_size must be > 0".into()));
    }
    if settings.pagination.max_pages == 0 {
        return Err(ConfigError::Invalid("pagination.max_pages must be > 0".into()));
    }
    if settings.retry.attempts == 0 {
        return Err(ConfigError::Invalid("retry.attempts must be > 0".into()));
    }
    if settings.retry.max_delay_ms < settings.retry.base_delay_ms {
        return Err(ConfigError::Invalid(
            "retry.max_delay_ms must be >= retry.base_delay_ms".into(),
        ));
    }
    if !settings.metrics.path.starts_with('/') {
        return Err(ConfigError::Invalid(format!(
            "metrics.path '{}' must start with '/'",
            settings.metrics.path
        )));
    }
    Ok(())
}

/// Replaces `${VAR}` and `${VAR:default}` with values from the process environment.
pub fn expand_env_vars(input: &str) -> String {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}").expect("static regex");
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}
