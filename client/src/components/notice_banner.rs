//! Confirmation/error banner under the review form.

use leptos::prelude::*;

use crate::state::review::Notice;

/// CSS modifier class for a notice.
pub fn notice_class(notice: &Notice) -> &'static str {
    if notice.is_error() { "notice notice--error" } else { "notice notice--confirmation" }
}

/// ARIA role for a notice. Errors interrupt, confirmations are polite.
pub fn notice_role(notice: &Notice) -> &'static str {
    if notice.is_error() { "alert" } else { "status" }
}

#[component]
pub fn NoticeBanner(#[prop(into)] notice: Signal<Option<Notice>>) -> impl IntoView {
    move || {
        notice.get().map(|notice| {
            view! {
                <p class=notice_class(&notice) role=notice_role(&notice)>
                    {notice.message().to_owned()}
                </p>
            }
        })
    }
}

#[cfg(test)]
#[path = "notice_banner_test.rs"]
mod notice_banner_test;
