//! Browser OIDC client: redirect login against a Keycloak-style provider.
//!
//! SYSTEM CONTEXT
//! ==============
//! Implements `IdentityClient` for `AuthSession`. Client-side (hydrate) it
//! talks to the provider with `gloo-net` and keeps state in `sessionStorage`;
//! server-side (SSR) every network step reports "not available on server"
//! because sign-in only makes sense in the browser.
//!
//! FLOW
//! ====
//! 1. `sign_in` discovers the provider, stores a `PendingSignIn`, and sends the
//!    browser to the authorization endpoint.
//! 2. The provider redirects back with `?code=..&state=..`. On the next load
//!    `complete_sign_in` removes the pending record, scrubs the URL, checks the
//!    state, exchanges the code, and stores the session.
//! 3. Reloads restore the stored session through `cached_session` until it
//!    expires.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "oidc_client_test.rs"]
mod oidc_client_test;

use std::sync::OnceLock;

use super::oidc::{self, CallbackParams, OidcConfig, OnLoad, PendingSignIn};
use super::types::{ProviderMetadata, TokenResponse};
use crate::state::auth::{AuthError, Session};
use crate::state::session::{IdentityClient, SignInOutcome, SignOutOutcome};
use crate::util::browser;

/// `sessionStorage` key for the signed-in session.
pub const SESSION_KEY: &str = "waffle_reviews.oidc.session";
/// `sessionStorage` key for the sign-in awaiting its callback.
pub const PENDING_KEY: &str = "waffle_reviews.oidc.pending";

#[cfg(any(test, feature = "hydrate"))]
fn discovery_failed_message(status: u16) -> String {
    format!("provider discovery failed: {status}")
}

#[cfg(any(test, feature = "hydrate"))]
fn token_failed_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<super::types::TokenErrorResponse>(body) {
        Ok(err) => format!("token request failed: {}", err.describe()),
        Err(_) => format!("token request failed: {status}"),
    }
}

fn callback_error_message(error: &str, description: Option<&str>) -> String {
    match description {
        Some(description) if !description.is_empty() => format!("{error}: {description}"),
        _ => error.to_owned(),
    }
}

pub struct OidcClient {
    config: OidcConfig,
    metadata: OnceLock<ProviderMetadata>,
}

impl OidcClient {
    pub fn new(config: OidcConfig) -> Self {
        Self { config, metadata: OnceLock::new() }
    }

    pub fn config(&self) -> &OidcConfig {
        &self.config
    }

    fn redirect_uri(&self) -> String {
        self.config.redirect_uri_for(&browser::origin().unwrap_or_default())
    }

    /// Provider metadata, fetched once per page load.
    async fn metadata(&self) -> Result<ProviderMetadata, AuthError> {
        if let Some(metadata) = self.metadata.get() {
            return Ok(metadata.clone());
        }
        let metadata = fetch_metadata(&self.config.discovery_url()).await?;
        log::debug!("discovered identity provider {}", metadata.issuer);
        Ok(self.metadata.get_or_init(|| metadata).clone())
    }

    async fn start_redirect(&self) -> Result<SignInOutcome, AuthError> {
        let metadata = self.metadata().await?;
        let pending = PendingSignIn::generate(self.redirect_uri());
        let url = oidc::authorize_url(&metadata, &self.config, &pending)?;

        browser::session_set_json(PENDING_KEY, &pending);
        if !browser::navigate(&url) {
            browser::session_remove(PENDING_KEY);
            return Err(AuthError::Redirect("browser refused to open the sign-in page".to_owned()));
        }
        log::info!("redirecting to identity provider for sign-in");
        Ok(SignInOutcome::Redirecting)
    }

    async fn finish_callback(&self, code: &str, state: Option<&str>) -> Result<SignInOutcome, AuthError> {
        // The pending record and the callback URL are single-use whatever happens next.
        let pending = browser::session_get_json::<PendingSignIn>(PENDING_KEY);
        browser::session_remove(PENDING_KEY);
        scrub_callback_url();

        let pending = oidc::verify_state(pending, state)?;
        let metadata = self.metadata().await?;
        let tokens = exchange_code(&metadata, &self.config.client_id, code, &pending).await?;
        let session = oidc::session_from_tokens(tokens, browser::now_ms())?;

        browser::session_set_json(SESSION_KEY, &session);
        log::info!("signed in as {}", session.claims.display_name());
        Ok(SignInOutcome::Completed(session))
    }
}

#[async_trait::async_trait(?Send)]
impl IdentityClient for OidcClient {
    fn cached_session(&self) -> Option<Session> {
        let session = browser::session_get_json::<Session>(SESSION_KEY)?;
        if session.is_expired_at(browser::now_ms()) {
            log::info!("stored session expired");
            browser::session_remove(SESSION_KEY);
            return None;
        }
        Some(session)
    }

    async fn complete_sign_in(&self) -> Result<SignInOutcome, AuthError> {
        self.config.validate()?;

        match oidc::parse_callback(&browser::current_href().unwrap_or_default()) {
            CallbackParams::Error { error, description } => {
                browser::session_remove(PENDING_KEY);
                scrub_callback_url();
                Err(AuthError::Redirect(callback_error_message(&error, description.as_deref())))
            }
            CallbackParams::Code { code, state } => self.finish_callback(&code, state.as_deref()).await,
            CallbackParams::None => match self.config.on_load {
                OnLoad::LoginRequired => self.start_redirect().await,
                OnLoad::CheckSso => {
                    // Surface an unreachable provider at start-up rather than at login.
                    self.metadata().await?;
                    Ok(SignInOutcome::NoSession)
                }
            },
        }
    }

    async fn sign_in(&self) -> Result<SignInOutcome, AuthError> {
        self.config.validate()?;
        self.start_redirect().await
    }

    async fn sign_out(&self, session: &Session) -> Result<SignOutOutcome, AuthError> {
        browser::session_remove(SESSION_KEY);

        let metadata = self.metadata().await?;
        let Some(url) = oidc::logout_url(&metadata, &self.config.client_id, session, &self.redirect_uri())? else {
            log::info!("provider has no end-session endpoint; signed out locally");
            return Ok(SignOutOutcome::Completed);
        };
        if !browser::navigate(&url) {
            return Err(AuthError::Redirect("browser refused to open the sign-out page".to_owned()));
        }
        Ok(SignOutOutcome::Redirecting)
    }
}

fn scrub_callback_url() {
    if let Some(href) = browser::current_href() {
        browser::replace_url(&oidc::strip_callback_params(&href));
    }
}

async fn fetch_metadata(discovery_url: &str) -> Result<ProviderMetadata, AuthError> {
    #[cfg(feature = "hydrate")]
    {
        let resp = gloo_net::http::Request::get(discovery_url)
            .send()
            .await
            .map_err(|e| AuthError::Init(e.to_string()))?;
        if !resp.ok() {
            return Err(AuthError::Init(discovery_failed_message(resp.status())));
        }
        resp.json::<ProviderMetadata>()
            .await
            .map_err(|e| AuthError::Init(format!("invalid provider metadata: {e}")))
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = discovery_url;
        Err(AuthError::Init("not available on server".to_owned()))
    }
}

async fn exchange_code(
    metadata: &ProviderMetadata,
    client_id: &str,
    code: &str,
    pending: &PendingSignIn,
) -> Result<TokenResponse, AuthError> {
    #[cfg(feature = "hydrate")]
    {
        let resp = gloo_net::http::Request::post(&metadata.token_endpoint)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(oidc::token_request_body(client_id, code, pending))
            .map_err(|e| AuthError::Redirect(e.to_string()))?
            .send()
            .await
            .map_err(|e| AuthError::Redirect(e.to_string()))?;
        if !resp.ok() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::Redirect(token_failed_message(status, &body)));
        }
        resp.json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::Redirect(format!("invalid token response: {e}")))
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (metadata, client_id, code, pending);
        Err(AuthError::Redirect("not available on server".to_owned()))
    }
}
