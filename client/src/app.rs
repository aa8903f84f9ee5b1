//! Root application component with routing and context providers.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::net::oidc_client::OidcClient;
use crate::pages::review::ReviewPage;
use crate::state::session::AuthSession;
use crate::util::config::AppConfig;

/// The application's auth session, backed by the browser OIDC client.
pub type AppSession = AuthSession<OidcClient>;

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Creates the single auth session, shares it and the config through context,
/// and starts sign-in once the app is running in the browser.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let config = AppConfig::from_build_env();
    let session: AppSession = AuthSession::new(OidcClient::new(config.oidc.clone()));
    provide_context(config);
    provide_context(session.clone());

    #[cfg(feature = "hydrate")]
    Effect::new(move |_| {
        let session = session.clone();
        leptos::task::spawn_local(async move {
            if let Err(err) = session.initialize().await {
                log::warn!("auth initialization failed: {err}");
            }
        });
    });
    #[cfg(not(feature = "hydrate"))]
    let _ = session;

    view! {
        <Stylesheet id="leptos" href="/pkg/waffle-reviews.css"/>
        <Title text="Waffle Reviews"/>

        <Router>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route path=StaticSegment("") view=ReviewPage/>
            </Routes>
        </Router>
    }
}
