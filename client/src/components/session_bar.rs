//! Signed-in header: who is logged in and the logout action.

use leptos::prelude::*;

#[component]
pub fn SessionBar(#[prop(into)] display_name: String, on_logout: Callback<()>) -> impl IntoView {
    view! {
        <header class="session-bar">
            <span class="session-bar__user">"Signed in as " <strong>{display_name}</strong></span>
            <button class="session-bar__logout" type="button" on:click=move |_| on_logout.run(())>
                "Log out"
            </button>
        </header>
    }
}
