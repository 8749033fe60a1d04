use serde::{Deserialize, Deserializer};

use crate::config::settings::SettingsConfig;

pub const DEFAULT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
pub const DEFAULT_API_BASE_URL: &str = "https://oauth.reddit.com";
pub const DEFAULT_USER_AGENT: &str = "post-feed/0.1";

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    pub provider: ProviderConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

/// ================================
/// Upstream provider
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub client_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub client_secret: String,
    /// account whose submissions are served
    #[serde(default, deserialize_with = "null_as_empty")]
    pub username: String,
}

impl ProviderConfig {
    pub fn submitted_path(&self) -> String {
        format!("/user/{}/submitted", self.username)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AdminConfig {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub secret: String,
}

/// An unset `${VAR}` expands to nothing, which YAML reads as null.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_owned()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_owned()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_owned()
}
