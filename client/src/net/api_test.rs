use std::cell::RefCell;

use futures::executor::block_on;

use super::*;
use crate::state::auth::{AuthStatus, Session, UserClaims};
use crate::state::review::{FieldName, ReviewForm};

#[derive(Default)]
struct FakeTransport {
    reply: Option<Result<HttpReply, SubmitError>>,
    calls: RefCell<Vec<(String, String, ReviewDraft)>>,
}

impl FakeTransport {
    fn replying(status: u16, body: &str) -> Self {
        Self { reply: Some(Ok(HttpReply { status, body: body.to_owned() })), ..Self::default() }
    }

    fn failing(err: SubmitError) -> Self {
        Self { reply: Some(Err(err)), ..Self::default() }
    }

    fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

#[async_trait::async_trait(?Send)]
impl ReviewTransport for FakeTransport {
    async fn post_review(
        &self,
        url: &str,
        credential: &BearerCredential,
        draft: &ReviewDraft,
    ) -> Result<HttpReply, SubmitError> {
        self.calls
            .borrow_mut()
            .push((url.to_owned(), credential.authorization_header(), draft.clone()));
        self.reply.clone().unwrap_or_else(|| Ok(HttpReply { status: 200, body: String::new() }))
    }
}

fn authenticated(token: &str) -> AuthStatus {
    AuthStatus::Authenticated(Session {
        claims: UserClaims { subject: "sub-1".to_owned(), ..UserClaims::default() },
        credential: BearerCredential::new(token).unwrap(),
        id_token: None,
        expires_at_ms: None,
    })
}

fn filled_form() -> ReviewForm {
    let mut form = ReviewForm::default();
    form.update_field(FieldName::Restaurant, "Waffle Hut");
    form.update_field(FieldName::Review, "Great waffles");
    form
}

/// Drive one submit the way the review page does.
fn submit(form: &mut ReviewForm, status: &AuthStatus, transport: &FakeTransport) {
    let Ok(request) = form.begin_submit(status) else {
        return;
    };
    let outcome = block_on(submit_review(transport, &reviews_endpoint("http://api.test"), &request));
    form.finish_submit(outcome);
}

// =============================================================
// Endpoint / payload helpers
// =============================================================

#[test]
fn reviews_endpoint_joins_base_url() {
    assert_eq!(reviews_endpoint("http://localhost:8000"), "http://localhost:8000/api/waffle/reviews");
    assert_eq!(reviews_endpoint("http://localhost:8000/"), "http://localhost:8000/api/waffle/reviews");
    assert_eq!(reviews_endpoint(""), "/api/waffle/reviews");
}

#[test]
fn http_reply_success_is_2xx() {
    assert!(HttpReply { status: 200, body: String::new() }.is_success());
    assert!(HttpReply { status: 204, body: String::new() }.is_success());
    assert!(!HttpReply { status: 302, body: String::new() }.is_success());
    assert!(!HttpReply { status: 401, body: String::new() }.is_success());
}

#[test]
fn parse_payload_handles_json_text_and_empty() {
    assert_eq!(parse_payload(r#"{"ok":true}"#), serde_json::json!({ "ok": true }));
    assert_eq!(parse_payload("created"), serde_json::json!("created"));
    assert_eq!(parse_payload("  "), serde_json::Value::Null);
}

// =============================================================
// submit_review
// =============================================================

#[test]
fn submit_review_posts_draft_with_bearer_header() {
    let transport = FakeTransport::replying(200, r#"{"message":"Review submitted successfully!"}"#);
    let request = SubmitRequest {
        draft: filled_form().draft,
        credential: BearerCredential::new("tok-1").unwrap(),
    };

    let receipt = block_on(submit_review(&transport, "http://api.test/api/waffle/reviews", &request)).unwrap();

    assert_eq!(receipt.status, 200);
    assert_eq!(receipt.payload["message"], "Review submitted successfully!");
    let calls = transport.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "http://api.test/api/waffle/reviews");
    assert_eq!(calls[0].1, "Bearer tok-1");
    assert_eq!(calls[0].2, request.draft);
}

#[test]
fn submit_review_maps_non_success_to_rejected() {
    let transport = FakeTransport::replying(500, "boom");
    let request = SubmitRequest { draft: filled_form().draft, credential: BearerCredential::new("t").unwrap() };

    assert_eq!(
        block_on(submit_review(&transport, "http://api.test", &request)),
        Err(SubmitError::Rejected { status: 500 })
    );
}

// =============================================================
// Review page flow
// =============================================================

#[test]
fn successful_submit_sends_once_and_clears_form() {
    let transport = FakeTransport::replying(200, r#"{"id":42}"#);
    let mut form = filled_form();

    submit(&mut form, &authenticated("tok"), &transport);

    assert_eq!(transport.call_count(), 1);
    assert!(form.draft.is_empty());
    assert!(form.notice.as_ref().is_some_and(|n| !n.is_error() && n.message().contains("42")));
}

#[test]
fn server_error_keeps_draft_and_reports_status() {
    let transport = FakeTransport::replying(500, "");
    let mut form = filled_form();

    submit(&mut form, &authenticated("tok"), &transport);

    assert_eq!(transport.call_count(), 1);
    assert_eq!(form.draft, filled_form().draft);
    assert!(form.notice.as_ref().is_some_and(|n| n.is_error() && n.message().contains("500")));
    assert!(form.can_submit());
}

#[test]
fn network_failure_keeps_draft() {
    let transport = FakeTransport::failing(SubmitError::Network("offline".to_owned()));
    let mut form = filled_form();

    submit(&mut form, &authenticated("tok"), &transport);

    assert_eq!(form.draft, filled_form().draft);
    assert!(form.notice.as_ref().is_some_and(|n| n.message().contains("offline")));
}

#[test]
fn unauthenticated_submit_sends_nothing() {
    let transport = FakeTransport::default();
    let mut form = filled_form();

    submit(&mut form, &AuthStatus::Unauthenticated, &transport);

    assert_eq!(transport.call_count(), 0);
    assert_eq!(form.draft, filled_form().draft);
    assert!(form.notice.as_ref().is_some_and(|n| n.is_error()));
}

#[test]
fn submit_uses_credential_of_current_session() {
    let transport = FakeTransport::default();
    let mut form = filled_form();

    submit(&mut form, &authenticated("first"), &transport);
    form.update_field(FieldName::Restaurant, "Waffle Hut");
    submit(&mut form, &authenticated("second"), &transport);

    let calls = transport.calls.borrow();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].1, "Bearer second");
}

#[test]
fn server_transport_reports_network_error() {
    let request = SubmitRequest { draft: filled_form().draft, credential: BearerCredential::new("t").unwrap() };
    assert!(matches!(
        block_on(submit_review(&HttpTransport, "http://api.test", &request)),
        Err(SubmitError::Network(_))
    ));
}
