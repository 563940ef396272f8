/// Token Claims structure
///
/// Payload of an issued token: the caller's claims merged with the
/// standard registered claims (RFC 7519).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims for signed access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// Subject, present only when configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Audience, present only when supplied at signing time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Caller payload, merged into the claim set
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Claims {
    /// Create new claims expiring `validity_period` seconds from now.
    pub fn new(
        payload: Map<String, Value>,
        issuer: String,
        subject: Option<String>,
        audience: Option<String>,
        validity_period: i64,
    ) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            iss: issuer,
            sub: subject,
            aud: audience,
            iat: now,
            exp: now + validity_period,
            payload,
        }
    }

    /// Check if the token has expired.
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        self.exp < now
    }
}
