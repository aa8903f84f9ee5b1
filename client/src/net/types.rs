//! Wire DTOs for the identity provider.
//!
//! DESIGN
//! ======
//! Only the fields the client uses are modeled; everything else in the
//! provider documents is ignored by serde.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::state::auth::UserClaims;

/// Subset of `/.well-known/openid-configuration`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    /// RP-initiated logout endpoint; absent on providers without one.
    #[serde(default)]
    pub end_session_endpoint: Option<String>,
}

/// Successful token endpoint response.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Access token lifetime in seconds.
    #[serde(default, deserialize_with = "deserialize_optional_seconds")]
    pub expires_in: Option<u32>,
    #[serde(default)]
    pub id_token: Option<String>,
}

/// Error body returned by the token endpoint (RFC 6749 section 5.2).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl TokenErrorResponse {
    #[must_use]
    pub fn describe(&self) -> String {
        match self.error_description.as_deref() {
            Some(description) if !description.is_empty() => format!("{}: {description}", self.error),
            _ => self.error.clone(),
        }
    }
}

/// Claims read from an ID token (or access token) payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl From<TokenClaims> for UserClaims {
    fn from(claims: TokenClaims) -> Self {
        Self {
            subject: claims.sub,
            preferred_username: claims.preferred_username,
            name: claims.name,
            email: claims.email,
        }
    }
}

/// Accept `expires_in` as a JSON number or a numeric string; some providers
/// send the latter.
fn deserialize_optional_seconds<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(number)) => number
            .as_u64()
            .and_then(|secs| u32::try_from(secs).ok())
            .map(Some)
            .ok_or_else(|| D::Error::custom("expires_in out of range")),
        Some(serde_json::Value::String(raw)) => raw
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid expires_in {raw:?}"))),
        Some(_) => Err(D::Error::custom("expected number for expires_in")),
    }
}
