//! # client
//!
//! Leptos + WASM frontend for submitting waffle restaurant reviews.
//!
//! Users sign in through an OpenID Connect provider (Keycloak layout) and
//! post reviews to the review backend with their bearer token. This crate
//! holds the auth session state machine, the OIDC redirect client, the review
//! form state, and the page and components that render them.

pub mod app;
pub mod components;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: hydrate the server-rendered page.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    leptos::mount::hydrate_body(app::App);
}
