//! OpenID Connect authorization-code + PKCE protocol helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! `oidc_client::OidcClient` does the browser and network work; this module
//! holds the parts that are pure string and JSON manipulation: configuration,
//! URL building, callback parsing, PKCE, and turning a token response into a
//! `Session`.
//!
//! The authority follows the Keycloak layout `<url>/realms/<realm>`.

#[cfg(test)]
#[path = "oidc_test.rs"]
mod oidc_test;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;
use uuid::Uuid;

use super::types::{ProviderMetadata, TokenClaims, TokenResponse};
use crate::state::auth::{AuthError, BearerCredential, Session, UserClaims};

pub const DEFAULT_SCOPE: &str = "openid profile email";

/// Query parameters the provider appends to the redirect URI.
const CALLBACK_PARAMS: [&str; 6] = ["code", "state", "session_state", "iss", "error", "error_description"];

// =============================================================================
// CONFIG
// =============================================================================

/// What `initialize` does when no session exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OnLoad {
    /// Redirect to the provider's login page straight away.
    #[default]
    LoginRequired,
    /// Stay on the page and report `Unauthenticated`.
    CheckSso,
}

impl OnLoad {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "login-required" | "login_required" => Some(Self::LoginRequired),
            "check-sso" | "check_sso" => Some(Self::CheckSso),
            _ => None,
        }
    }
}

/// Identity provider settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OidcConfig {
    pub identity_provider_url: String,
    pub realm: String,
    pub client_id: String,
    /// Defaults to the application's own origin when `None`.
    pub redirect_uri: Option<String>,
    pub on_load: OnLoad,
    pub scope: String,
}

impl OidcConfig {
    #[must_use]
    pub fn authority(&self) -> String {
        format!("{}/realms/{}", self.identity_provider_url.trim_end_matches('/'), self.realm.trim())
    }

    #[must_use]
    pub fn discovery_url(&self) -> String {
        format!("{}/.well-known/openid-configuration", self.authority())
    }

    /// Redirect URI for this config, falling back to `<origin>/`.
    #[must_use]
    pub fn redirect_uri_for(&self, origin: &str) -> String {
        self.redirect_uri
            .clone()
            .unwrap_or_else(|| format!("{}/", origin.trim_end_matches('/')))
    }

    /// Reject configurations that cannot possibly reach a provider.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Init`] naming the first offending setting.
    pub fn validate(&self) -> Result<(), AuthError> {
        let required = [
            ("identity provider URL", &self.identity_provider_url),
            ("realm", &self.realm),
            ("client id", &self.client_id),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AuthError::Init(format!("missing {name}")));
            }
        }
        parse_http_url("identity provider URL", &self.identity_provider_url)?;
        if let Some(redirect_uri) = &self.redirect_uri {
            parse_http_url("redirect URI", redirect_uri)?;
        }
        Ok(())
    }
}

fn parse_http_url(name: &str, raw: &str) -> Result<Url, AuthError> {
    let url = Url::parse(raw.trim()).map_err(|e| AuthError::Init(format!("invalid {name} {raw:?}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AuthError::Init(format!("{name} must use http or https: {raw:?}")));
    }
    Ok(url)
}

// =============================================================================
// PKCE + PENDING SIGN-IN
// =============================================================================

/// S256 code challenge for `verifier` (RFC 7636 section 4.2).
#[must_use]
pub fn code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// State kept in session storage across the login redirect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSignIn {
    pub state: String,
    pub code_verifier: String,
    pub redirect_uri: String,
}

impl PendingSignIn {
    /// Fresh state and a 64-character verifier for one login attempt.
    #[must_use]
    pub fn generate(redirect_uri: impl Into<String>) -> Self {
        Self {
            state: Uuid::new_v4().simple().to_string(),
            code_verifier: format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple()),
            redirect_uri: redirect_uri.into(),
        }
    }
}

/// Build the provider login URL for `pending`.
///
/// # Errors
///
/// Returns [`AuthError::Init`] if the discovered authorization endpoint is
/// not a valid URL.
pub fn authorize_url(
    metadata: &ProviderMetadata,
    config: &OidcConfig,
    pending: &PendingSignIn,
) -> Result<String, AuthError> {
    let mut url = parse_http_url("authorization endpoint", &metadata.authorization_endpoint)?;
    url.query_pairs_mut()
        .append_pair("client_id", &config.client_id)
        .append_pair("redirect_uri", &pending.redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", &config.scope)
        .append_pair("state", &pending.state)
        .append_pair("code_challenge", &code_challenge(&pending.code_verifier))
        .append_pair("code_challenge_method", "S256");
    Ok(url.into())
}

/// Form body for the authorization-code token request.
#[must_use]
pub fn token_request_body(client_id: &str, code: &str, pending: &PendingSignIn) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("grant_type", "authorization_code")
        .append_pair("client_id", client_id)
        .append_pair("code", code)
        .append_pair("redirect_uri", &pending.redirect_uri)
        .append_pair("code_verifier", &pending.code_verifier)
        .finish()
}

/// Logout URL at the provider, or `None` when it has no end-session endpoint.
///
/// # Errors
///
/// Returns [`AuthError::Redirect`] if the end-session endpoint is malformed.
pub fn logout_url(
    metadata: &ProviderMetadata,
    client_id: &str,
    session: &Session,
    post_logout_redirect_uri: &str,
) -> Result<Option<String>, AuthError> {
    let Some(endpoint) = metadata.end_session_endpoint.as_deref() else {
        return Ok(None);
    };
    let mut url =
        Url::parse(endpoint).map_err(|e| AuthError::Redirect(format!("invalid end-session endpoint: {e}")))?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("client_id", client_id)
            .append_pair("post_logout_redirect_uri", post_logout_redirect_uri);
        if let Some(id_token) = &session.id_token {
            query.append_pair("id_token_hint", id_token);
        }
    }
    Ok(Some(url.into()))
}

// =============================================================================
// CALLBACK
// =============================================================================

/// What the current URL says about a returning redirect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackParams {
    Code { code: String, state: Option<String> },
    Error { error: String, description: Option<String> },
    None,
}

/// Inspect `href` for authorization response parameters.
#[must_use]
pub fn parse_callback(href: &str) -> CallbackParams {
    let Ok(url) = Url::parse(href) else {
        return CallbackParams::None;
    };
    let lookup = |key: &str| {
        url.query_pairs()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.into_owned())
    };

    if let Some(error) = lookup("error") {
        return CallbackParams::Error { error, description: lookup("error_description") };
    }
    match lookup("code") {
        Some(code) if !code.is_empty() => CallbackParams::Code { code, state: lookup("state") },
        _ => CallbackParams::None,
    }
}

/// `href` without the authorization response parameters.
#[must_use]
pub fn strip_callback_params(href: &str) -> String {
    let Ok(mut url) = Url::parse(href) else {
        return href.to_owned();
    };
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| !CALLBACK_PARAMS.iter().any(|param| name == param))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    url.into()
}

/// Match the returned `state` against the stored pending sign-in.
///
/// # Errors
///
/// Returns [`AuthError::Redirect`] if nothing is pending or the state differs.
pub fn verify_state(pending: Option<PendingSignIn>, returned: Option<&str>) -> Result<PendingSignIn, AuthError> {
    let pending = pending.ok_or_else(|| AuthError::Redirect("no sign-in in progress for this callback".to_owned()))?;
    match returned {
        Some(state) if state == pending.state => Ok(pending),
        Some(_) => Err(AuthError::Redirect("state mismatch in sign-in callback".to_owned())),
        None => Err(AuthError::Redirect("missing state in sign-in callback".to_owned())),
    }
}

// =============================================================================
// TOKENS
// =============================================================================

/// Read the claims from a JWT payload. The signature is not checked; the
/// token came straight from the token endpoint.
///
/// # Errors
///
/// Returns [`AuthError::Redirect`] if `jwt` is not a three-part token with a
/// base64url JSON payload.
pub fn decode_claims(jwt: &str) -> Result<UserClaims, AuthError> {
    let mut parts = jwt.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return Err(AuthError::Redirect("token is not a JWT".to_owned())),
    };
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AuthError::Redirect(format!("token payload is not base64url: {e}")))?;
    let claims: TokenClaims =
        serde_json::from_slice(&bytes).map_err(|e| AuthError::Redirect(format!("token payload is not JSON: {e}")))?;
    Ok(claims.into())
}

/// Build a session from a token response received at `now_ms`.
///
/// Claims come from the ID token only. The access token is opaque and is
/// forwarded as-is, so a response without an ID token yields empty claims.
///
/// # Errors
///
/// Returns [`AuthError::Redirect`] if the access token is empty or the ID
/// token is unreadable.
pub fn session_from_tokens(tokens: TokenResponse, now_ms: f64) -> Result<Session, AuthError> {
    let credential = BearerCredential::new(tokens.access_token)
        .ok_or_else(|| AuthError::Redirect("token response has an empty access token".to_owned()))?;
    let claims = match tokens.id_token.as_deref() {
        Some(id_token) => decode_claims(id_token)?,
        None => UserClaims::default(),
    };
    let expires_at_ms = tokens.expires_in.map(|secs| now_ms + f64::from(secs) * 1000.0);
    Ok(Session { claims, credential, id_token: tokens.id_token, expires_at_ms })
}
