//! Review draft and submission state for the review form.
//!
//! DESIGN
//! ======
//! The form is a plain value held in one `RwSignal`. Submission is split into
//! `begin_submit` (gate + capture, synchronous) and `finish_submit` (apply the
//! network outcome) so the in-flight guard and the draft reset are decided in
//! one place, outside of any async glue.

#[cfg(test)]
#[path = "review_test.rs"]
mod review_test;

use serde::{Deserialize, Serialize};

use super::auth::{AuthStatus, BearerCredential};

/// The two editable review fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldName {
    Restaurant,
    Review,
}

impl FieldName {
    pub const ALL: [Self; 2] = [Self::Restaurant, Self::Review];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Restaurant => "restaurant",
            Self::Review => "review",
        }
    }

    /// Maximum length in characters accepted by the review backend.
    #[must_use]
    pub const fn max_len(self) -> usize {
        match self {
            Self::Restaurant => 100,
            Self::Review => 500,
        }
    }
}

/// In-progress review. Serialized as the POST body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDraft {
    pub restaurant: String,
    pub review: String,
}

impl ReviewDraft {
    #[must_use]
    pub fn field(&self, field: FieldName) -> &str {
        match field {
            FieldName::Restaurant => &self.restaurant,
            FieldName::Review => &self.review,
        }
    }

    /// Replace one field, leaving the other untouched.
    pub fn update_field(&mut self, field: FieldName, value: impl Into<String>) {
        let slot = match field {
            FieldName::Restaurant => &mut self.restaurant,
            FieldName::Review => &mut self.review,
        };
        *slot = value.into();
    }

    #[must_use]
    pub fn with_field(&self, field: FieldName, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.update_field(field, value);
        next
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.restaurant.is_empty() && self.review.is_empty()
    }

    /// Check the backend's length limits.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::TooLong`] for the first field over its limit.
    pub fn validate(&self) -> Result<(), SubmitError> {
        for field in FieldName::ALL {
            let max = field.max_len();
            if self.field(field).chars().count() > max {
                return Err(SubmitError::TooLong { field: field.as_str(), max });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("sign in before submitting a review")]
    NotAuthenticated,
    #[error("a review submission is already in progress")]
    InFlight,
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    /// Non-2xx answer from the review backend.
    #[error("review submission failed with status {status}")]
    Rejected { status: u16 },
    #[error("could not reach the review service: {0}")]
    Network(String),
}

/// Everything one POST needs, captured at submit time.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmitRequest {
    pub draft: ReviewDraft,
    pub credential: BearerCredential,
}

/// Successful backend answer.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmitReceipt {
    pub status: u16,
    pub payload: serde_json::Value,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    Confirmation(String),
    Error(String),
}

impl Notice {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Confirmation(msg) | Self::Error(msg) => msg,
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Confirmation text shown after a successful submit.
#[must_use]
pub fn confirmation_message(receipt: &SubmitReceipt) -> String {
    format!("Review submitted: {}", receipt.payload)
}

/// Form state: the draft, the in-flight flag, and the last notice.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReviewForm {
    pub draft: ReviewDraft,
    pub in_flight: bool,
    pub notice: Option<Notice>,
}

impl ReviewForm {
    pub fn update_field(&mut self, field: FieldName, value: impl Into<String>) {
        self.draft.update_field(field, value);
    }

    /// Drop the draft and notice. An outstanding request keeps the form in
    /// flight until `finish_submit` sees its outcome.
    pub fn clear(&mut self) {
        self.draft = ReviewDraft::default();
        self.notice = None;
    }

    /// Whether the submit action is enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.in_flight
    }

    /// Gate a submit and capture the request to send.
    ///
    /// The credential comes from `status` as it is right now, so a request can
    /// never carry a token from an earlier session.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::NotAuthenticated`], [`SubmitError::InFlight`] or
    /// [`SubmitError::TooLong`]; in each case no request may be sent and the
    /// error is recorded as a notice.
    pub fn begin_submit(&mut self, status: &AuthStatus) -> Result<SubmitRequest, SubmitError> {
        if self.in_flight {
            return Err(self.reject(SubmitError::InFlight));
        }
        let Some(credential) = status.credential().cloned() else {
            return Err(self.reject(SubmitError::NotAuthenticated));
        };
        if let Err(err) = self.draft.validate() {
            return Err(self.reject(err));
        }

        self.in_flight = true;
        self.notice = None;
        Ok(SubmitRequest { draft: self.draft.clone(), credential })
    }

    /// Apply the outcome of the request started by `begin_submit`.
    ///
    /// Success resets the draft; failure keeps it so nothing typed is lost.
    pub fn finish_submit(&mut self, outcome: Result<SubmitReceipt, SubmitError>) {
        self.in_flight = false;
        match outcome {
            Ok(receipt) => {
                log::info!("review submitted with status {}", receipt.status);
                self.draft = ReviewDraft::default();
                self.notice = Some(Notice::Confirmation(confirmation_message(&receipt)));
            }
            Err(err) => {
                self.reject(err);
            }
        }
    }

    /// Record a local error notice. The draft and in-flight flag are untouched.
    pub fn reject(&mut self, err: SubmitError) -> SubmitError {
        log::error!("review submission rejected: {err}");
        self.notice = Some(Notice::Error(err.to_string()));
        err
    }
}
