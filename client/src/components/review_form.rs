//! Review form: restaurant name, review text, and submit button.
//!
//! SYSTEM CONTEXT
//! ==============
//! Rendered only while authenticated. The page owns the `ReviewForm` signal
//! and the submit logic; this component reads the signal and reports edits
//! and submits through callbacks.

use leptos::prelude::*;

use crate::state::review::{FieldName, ReviewForm};

/// Submit button text for the current in-flight state.
pub fn submit_label(in_flight: bool) -> &'static str {
    if in_flight { "Submitting..." } else { "Submit review" }
}

/// Remaining characters for `field`, shown under each input.
pub fn remaining_chars(field: FieldName, value: &str) -> usize {
    field.max_len().saturating_sub(value.chars().count())
}

#[component]
pub fn ReviewFormPanel(
    form: RwSignal<ReviewForm>,
    on_field: Callback<(FieldName, String)>,
    on_submit: Callback<()>,
) -> impl IntoView {
    let value_of = move |field: FieldName| form.with(|f| f.draft.field(field).to_owned());
    let in_flight = move || form.with(|f| f.in_flight);

    let on_form_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        on_submit.run(());
    };

    view! {
        <form class="review-form" on:submit=on_form_submit>
            <label class="review-form__label" for="review-restaurant">"Restaurant"</label>
            <input
                id="review-restaurant"
                class="review-form__input"
                type="text"
                name=FieldName::Restaurant.as_str()
                maxlength=FieldName::Restaurant.max_len().to_string()
                placeholder="Where did you eat?"
                prop:value=move || value_of(FieldName::Restaurant)
                on:input=move |ev| on_field.run((FieldName::Restaurant, event_target_value(&ev)))
            />
            <small class="review-form__hint">
                {move || remaining_chars(FieldName::Restaurant, &value_of(FieldName::Restaurant))}
                " characters left"
            </small>

            <label class="review-form__label" for="review-text">"Review"</label>
            <textarea
                id="review-text"
                class="review-form__input review-form__input--multiline"
                name=FieldName::Review.as_str()
                maxlength=FieldName::Review.max_len().to_string()
                rows="5"
                placeholder="How were the waffles?"
                prop:value=move || value_of(FieldName::Review)
                on:input=move |ev| on_field.run((FieldName::Review, event_target_value(&ev)))
            ></textarea>
            <small class="review-form__hint">
                {move || remaining_chars(FieldName::Review, &value_of(FieldName::Review))}
                " characters left"
            </small>

            <button class="review-form__submit" type="submit" disabled=in_flight>
                {move || submit_label(in_flight())}
            </button>
        </form>
    }
}

#[cfg(test)]
#[path = "review_form_test.rs"]
mod review_form_test;
