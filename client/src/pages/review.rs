//! Review page: sign-in status and the review submission form.
//!
//! SYSTEM CONTEXT
//! ==============
//! The single route of the app. It reads the shared `AppSession` and
//! `AppConfig` from context, decides what to render with `screen_for`, and
//! owns the `ReviewForm` signal.
//!
//! RENDER CONTRACT
//! ===============
//! While signing in or out only a progress indicator is shown, so nothing can
//! be clicked mid-redirect. The form exists only while authenticated.

#[cfg(test)]
#[path = "review_test.rs"]
mod review_test;

use leptos::prelude::*;

use crate::app::AppSession;
use crate::components::notice_banner::NoticeBanner;
use crate::components::review_form::ReviewFormPanel;
use crate::components::session_bar::SessionBar;
use crate::net::api;
use crate::state::auth::AuthStatus;
use crate::state::review::{FieldName, ReviewForm};
use crate::util::config::AppConfig;

/// What the page shows for one auth status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    Progress,
    Failed(String),
    LoginPrompt,
    Form { display_name: String },
}

impl Screen {
    pub fn shows_form(&self) -> bool {
        matches!(self, Self::Form { .. })
    }

    /// Login action: the prompt itself, or "Try again" after a failure.
    pub fn shows_login(&self) -> bool {
        matches!(self, Self::LoginPrompt | Self::Failed(_))
    }

    pub fn shows_logout(&self) -> bool {
        self.shows_form()
    }

    pub fn shows_progress(&self) -> bool {
        matches!(self, Self::Progress)
    }
}

pub fn screen_for(status: &AuthStatus) -> Screen {
    match status {
        AuthStatus::Uninitialized | AuthStatus::SigningIn | AuthStatus::SigningOut => Screen::Progress,
        AuthStatus::Errored(message) => Screen::Failed(message.clone()),
        AuthStatus::Unauthenticated => Screen::LoginPrompt,
        AuthStatus::Authenticated(session) => Screen::Form { display_name: session.claims.display_name().to_owned() },
    }
}

#[component]
pub fn ReviewPage() -> impl IntoView {
    let session = expect_context::<AppSession>();
    let config = expect_context::<AppConfig>();
    let endpoint = api::reviews_endpoint(&config.api_base_url);

    let status = session.status();
    let screen = Memo::new(move |_| screen_for(&status.get()));
    let form = RwSignal::new(ReviewForm::default());

    let on_login = Callback::new({
        let session = session.clone();
        move |()| {
            #[cfg(feature = "hydrate")]
            {
                let session = session.clone();
                leptos::task::spawn_local(async move {
                    if let Err(err) = session.login().await {
                        log::warn!("login failed: {err}");
                    }
                });
            }
            #[cfg(not(feature = "hydrate"))]
            {
                let _ = &session;
            }
        }
    });

    let on_logout = Callback::new({
        let session = session.clone();
        move |()| {
            form.update(ReviewForm::clear);
            #[cfg(feature = "hydrate")]
            {
                let session = session.clone();
                leptos::task::spawn_local(async move {
                    if let Err(err) = session.logout().await {
                        log::warn!("logout failed: {err}");
                    }
                });
            }
            #[cfg(not(feature = "hydrate"))]
            {
                let _ = &session;
            }
        }
    });

    let on_field = Callback::new(move |(field, value): (FieldName, String)| {
        form.update(|f| f.update_field(field, value));
    });

    let on_submit = Callback::new(move |()| {
        let current = session.current_status();
        let Some(Ok(request)) = form.try_update(|f| f.begin_submit(&current)) else {
            return;
        };
        #[cfg(feature = "hydrate")]
        {
            let endpoint = endpoint.clone();
            leptos::task::spawn_local(async move {
                let outcome = api::submit_review(&api::HttpTransport, &endpoint, &request).await;
                form.update(|f| f.finish_submit(outcome));
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (&endpoint, request);
        }
    });

    let notice = Signal::derive(move || form.with(|f| f.notice.clone()));

    view! {
        <main class="review-page">
            <h1 class="review-page__title">"Waffle Reviews"</h1>
            {move || match screen.get() {
                Screen::Progress => {
                    view! { <p class="review-page__progress" role="status">"Loading..."</p> }.into_any()
                }
                Screen::Failed(message) => {
                    view! {
                        <div class="review-page__error" role="alert">
                            <p>{message}</p>
                            <button type="button" on:click=move |_| on_login.run(())>"Try again"</button>
                        </div>
                    }
                        .into_any()
                }
                Screen::LoginPrompt => {
                    view! {
                        <button class="review-page__login" type="button" on:click=move |_| on_login.run(())>
                            "Log in"
                        </button>
                    }
                        .into_any()
                }
                Screen::Form { display_name } => {
                    view! {
                        <SessionBar display_name=display_name on_logout=on_logout/>
                        <ReviewFormPanel form=form on_field=on_field on_submit=on_submit/>
                        <NoticeBanner notice=notice/>
                    }
                        .into_any()
                }
            }}
        </main>
    }
}
