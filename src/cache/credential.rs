use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

use crate::error::FetchError;

/// Bearer token plus the instant after which it must not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub expires_at: DateTime<Utc>, // already reduced by the safety margin
}

impl Credential {
    pub fn new(token: String, expires_at: DateTime<Utc>) -> Self {
        Self { token, expires_at }
    }

    /// `expires_at = now + (lifetime - safety_margin)`
    ///
    /// A lifetime that does not fit a timestamp is a malformed response, not a panic.
    pub fn from_grant(
        grant: TokenGrant,
        now: DateTime<Utc>,
        safety_margin_seconds: u64,
    ) -> Result<Self, FetchError> {
        let expires_at = i64::try_from(grant.expires_in)
            .ok()
            .zip(i64::try_from(safety_margin_seconds).ok())
            .and_then(|(lifetime, margin)| lifetime.checked_sub(margin))
            .and_then(TimeDelta::try_seconds)
            .and_then(|usable| now.checked_add_signed(usable))
            .ok_or_else(|| {
                FetchError::MalformedEnvelope(format!(
                    "token lifetime {} seconds is out of range",
                    grant.expires_in
                ))
            })?;

        Ok(Self { token: grant.access_token, expires_at })
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Body of a successful token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    /// lifetime in seconds
    pub expires_in: u64,
}
