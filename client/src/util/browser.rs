//! Browser location, history, and sessionStorage helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! The OIDC client needs to read the current URL, leave the page for the
//! identity provider, scrub callback parameters, and keep a small amount of
//! state across the redirect. These helpers centralize that web-sys glue so
//! the protocol code stays testable.
//!
//! On the server every helper is a no-op returning `None`/`false`.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Full URL of the current page.
pub fn current_href() -> Option<String> {
    #[cfg(feature = "hydrate")]
    {
        web_sys::window()?.location().href().ok()
    }
    #[cfg(not(feature = "hydrate"))]
    {
        None
    }
}

/// `scheme://host[:port]` of the current page.
pub fn origin() -> Option<String> {
    #[cfg(feature = "hydrate")]
    {
        web_sys::window()?.location().origin().ok()
    }
    #[cfg(not(feature = "hydrate"))]
    {
        None
    }
}

/// Leave the app for `url`. Returns `false` if the browser refused.
pub fn navigate(url: &str) -> bool {
    #[cfg(feature = "hydrate")]
    {
        web_sys::window().is_some_and(|w| w.location().set_href(url).is_ok())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = url;
        false
    }
}

/// Swap the address bar to `url` without reloading or adding history.
pub fn replace_url(url: &str) {
    #[cfg(feature = "hydrate")]
    {
        let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
            return;
        };
        let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(url));
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = url;
    }
}

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> f64 {
    #[cfg(feature = "hydrate")]
    {
        js_sys::Date::now()
    }
    #[cfg(not(feature = "hydrate"))]
    {
        0.0
    }
}

/// Load a JSON value from `sessionStorage` for `key`.
pub fn session_get_json<T: DeserializeOwned>(key: &str) -> Option<T> {
    #[cfg(feature = "hydrate")]
    {
        let storage = web_sys::window().and_then(|w| w.session_storage().ok().flatten())?;
        let raw = storage.get_item(key).ok().flatten()?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("discarding unreadable session entry {key}: {e}");
                let _ = storage.remove_item(key);
                None
            }
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = key;
        None
    }
}

/// Save a JSON value to `sessionStorage` for `key`.
pub fn session_set_json<T: Serialize>(key: &str, value: &T) {
    #[cfg(feature = "hydrate")]
    {
        let Some(storage) = web_sys::window().and_then(|w| w.session_storage().ok().flatten()) else {
            return;
        };
        let Ok(raw) = serde_json::to_string(value) else {
            return;
        };
        let _ = storage.set_item(key, &raw);
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (key, value);
    }
}

/// Remove `key` from `sessionStorage`.
pub fn session_remove(key: &str) {
    #[cfg(feature = "hydrate")]
    {
        if let Some(storage) = web_sys::window().and_then(|w| w.session_storage().ok().flatten()) {
            let _ = storage.remove_item(key);
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = key;
    }
}
