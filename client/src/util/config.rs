//! Application configuration baked in at build time.
//!
//! The WASM bundle has no process environment, so settings are captured with
//! `option_env!` when the client is compiled. `from_lookup` holds the parsing
//! so it can be tested with any key/value source.
//!
//! Missing identity provider settings are not an error here; they surface as
//! `AuthError::Init` when the session initializes, which the page shows.

use crate::net::oidc::{DEFAULT_SCOPE, OidcConfig, OnLoad};

pub const OIDC_URL_VAR: &str = "WAFFLE_OIDC_URL";
pub const OIDC_REALM_VAR: &str = "WAFFLE_OIDC_REALM";
pub const OIDC_CLIENT_ID_VAR: &str = "WAFFLE_OIDC_CLIENT_ID";
pub const OIDC_REDIRECT_URI_VAR: &str = "WAFFLE_OIDC_REDIRECT_URI";
pub const OIDC_ON_LOAD_VAR: &str = "WAFFLE_OIDC_ON_LOAD";
pub const OIDC_SCOPE_VAR: &str = "WAFFLE_OIDC_SCOPE";
pub const API_URL_VAR: &str = "WAFFLE_API_URL";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub oidc: OidcConfig,
    /// Base URL of the review backend; empty means the page's own origin.
    pub api_base_url: String,
}

impl AppConfig {
    /// Build config from the variables captured at compile time.
    pub fn from_build_env() -> Self {
        Self::from_lookup(|key| {
            let value = match key {
                OIDC_URL_VAR => option_env!("WAFFLE_OIDC_URL"),
                OIDC_REALM_VAR => option_env!("WAFFLE_OIDC_REALM"),
                OIDC_CLIENT_ID_VAR => option_env!("WAFFLE_OIDC_CLIENT_ID"),
                OIDC_REDIRECT_URI_VAR => option_env!("WAFFLE_OIDC_REDIRECT_URI"),
                OIDC_ON_LOAD_VAR => option_env!("WAFFLE_OIDC_ON_LOAD"),
                OIDC_SCOPE_VAR => option_env!("WAFFLE_OIDC_SCOPE"),
                API_URL_VAR => option_env!("WAFFLE_API_URL"),
                _ => None,
            };
            value.map(str::to_owned)
        })
    }

    /// Build config from `lookup`.
    ///
    /// Optional:
    /// - `WAFFLE_OIDC_REDIRECT_URI`: defaults to the page origin
    /// - `WAFFLE_OIDC_ON_LOAD`: `login-required` (default) or `check-sso`
    /// - `WAFFLE_OIDC_SCOPE`: default `openid profile email`
    /// - `WAFFLE_API_URL`: default same origin
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let on_load = match non_empty(OIDC_ON_LOAD_VAR) {
            None => OnLoad::default(),
            Some(raw) => OnLoad::parse(&raw).unwrap_or_else(|| {
                log::warn!("unknown {OIDC_ON_LOAD_VAR} {raw:?}; using login-required");
                OnLoad::default()
            }),
        };

        let oidc = OidcConfig {
            identity_provider_url: non_empty(OIDC_URL_VAR).unwrap_or_default(),
            realm: non_empty(OIDC_REALM_VAR).unwrap_or_default(),
            client_id: non_empty(OIDC_CLIENT_ID_VAR).unwrap_or_default(),
            redirect_uri: non_empty(OIDC_REDIRECT_URI_VAR),
            on_load,
            scope: non_empty(OIDC_SCOPE_VAR).unwrap_or_else(|| DEFAULT_SCOPE.to_owned()),
        };
        let api_base_url = non_empty(API_URL_VAR)
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_owned();

        Self { oidc, api_base_url }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
