//! Networking modules for the identity provider and the review backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `oidc` holds the pure OpenID Connect protocol helpers, `oidc_client` drives
//! them from the browser, `api` submits reviews, and `types` defines the
//! provider wire schema.

pub mod api;
pub mod oidc;
pub mod oidc_client;
pub mod types;
