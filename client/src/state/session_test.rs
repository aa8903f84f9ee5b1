use std::cell::{Cell, RefCell};

use futures::executor::block_on;

use super::*;
use crate::state::auth::UserClaims;

// =========================================================================
// FakeIdentity
// =========================================================================

struct FakeIdentity {
    cached: Option<Session>,
    on_complete: RefCell<Option<Result<SignInOutcome, AuthError>>>,
    on_sign_in: Result<SignInOutcome, AuthError>,
    on_sign_out: Result<SignOutOutcome, AuthError>,
    complete_calls: Cell<u32>,
    sign_in_calls: Cell<u32>,
    sign_out_calls: Cell<u32>,
}

impl FakeIdentity {
    fn new() -> Self {
        Self {
            cached: None,
            on_complete: RefCell::new(Some(Ok(SignInOutcome::Redirecting))),
            on_sign_in: Ok(SignInOutcome::Redirecting),
            on_sign_out: Ok(SignOutOutcome::Redirecting),
            complete_calls: Cell::new(0),
            sign_in_calls: Cell::new(0),
            sign_out_calls: Cell::new(0),
        }
    }

    fn completing_with(self, outcome: Result<SignInOutcome, AuthError>) -> Self {
        *self.on_complete.borrow_mut() = Some(outcome);
        self
    }
}

#[async_trait::async_trait(?Send)]
impl IdentityClient for FakeIdentity {
    fn cached_session(&self) -> Option<Session> {
        self.cached.clone()
    }

    async fn complete_sign_in(&self) -> Result<SignInOutcome, AuthError> {
        self.complete_calls.set(self.complete_calls.get() + 1);
        self.on_complete
            .borrow_mut()
            .take()
            .unwrap_or(Ok(SignInOutcome::NoSession))
    }

    async fn sign_in(&self) -> Result<SignInOutcome, AuthError> {
        self.sign_in_calls.set(self.sign_in_calls.get() + 1);
        self.on_sign_in.clone()
    }

    async fn sign_out(&self, _session: &Session) -> Result<SignOutOutcome, AuthError> {
        self.sign_out_calls.set(self.sign_out_calls.get() + 1);
        self.on_sign_out.clone()
    }
}

fn session(token: &str) -> Session {
    Session {
        claims: UserClaims {
            subject: "sub-1".to_owned(),
            preferred_username: Some("waffler".to_owned()),
            name: None,
            email: None,
        },
        credential: BearerCredential::new(token).unwrap(),
        id_token: Some("id-token".to_owned()),
        expires_at_ms: None,
    }
}

fn authenticated(client: FakeIdentity) -> AuthSession<FakeIdentity> {
    let auth = AuthSession::new(client.completing_with(Ok(SignInOutcome::Completed(session("tok-1")))));
    block_on(auth.initialize()).unwrap();
    auth
}

// =========================================================================
// initialize
// =========================================================================

#[test]
fn new_session_starts_uninitialized() {
    let auth = AuthSession::new(FakeIdentity::new());
    assert_eq!(auth.current_status(), AuthStatus::Uninitialized);
    assert!(auth.credential().is_none());
}

#[test]
fn initialize_with_cached_session_skips_provider() {
    let mut client = FakeIdentity::new();
    client.cached = Some(session("cached"));
    let auth = AuthSession::new(client);

    block_on(auth.initialize()).unwrap();

    assert_eq!(auth.current_status(), AuthStatus::Authenticated(session("cached")));
    assert_eq!(auth.client().complete_calls.get(), 0);
}

#[test]
fn initialize_stays_signing_in_while_redirecting() {
    let auth = AuthSession::new(FakeIdentity::new());
    block_on(auth.initialize()).unwrap();
    assert_eq!(auth.current_status(), AuthStatus::SigningIn);
    assert_eq!(auth.client().complete_calls.get(), 1);
}

#[test]
fn initialize_completes_callback_exchange() {
    let auth = authenticated(FakeIdentity::new());
    assert_eq!(auth.current_status(), AuthStatus::Authenticated(session("tok-1")));
    assert_eq!(auth.credential().map(|c| c.as_str().to_owned()), Some("tok-1".to_owned()));
}

#[test]
fn initialize_without_provider_session_is_unauthenticated() {
    let auth = AuthSession::new(FakeIdentity::new().completing_with(Ok(SignInOutcome::NoSession)));
    block_on(auth.initialize()).unwrap();
    assert_eq!(auth.current_status(), AuthStatus::Unauthenticated);
}

#[test]
fn initialize_failure_surfaces_error_message() {
    let err = AuthError::Init("discovery request failed: connection refused".to_owned());
    let auth = AuthSession::new(FakeIdentity::new().completing_with(Err(err.clone())));

    let result = block_on(auth.initialize());

    assert_eq!(result, Err(err.clone()));
    assert_eq!(auth.current_status(), AuthStatus::Errored(err.to_string()));
}

#[test]
fn initialize_twice_is_rejected_without_state_change() {
    let auth = authenticated(FakeIdentity::new());
    assert_eq!(block_on(auth.initialize()), Err(AuthError::AlreadyInitialized));
    assert!(auth.current_status().is_authenticated());
    assert_eq!(auth.client().complete_calls.get(), 1);
}

// =========================================================================
// login
// =========================================================================

#[test]
fn login_from_unauthenticated_redirects_exactly_once() {
    let auth = AuthSession::new(FakeIdentity::new().completing_with(Ok(SignInOutcome::NoSession)));
    block_on(auth.initialize()).unwrap();

    block_on(auth.login()).unwrap();

    assert_eq!(auth.current_status(), AuthStatus::SigningIn);
    assert_eq!(auth.client().sign_in_calls.get(), 1);
}

#[test]
fn login_while_signing_in_does_not_redirect_again() {
    let auth = AuthSession::new(FakeIdentity::new().completing_with(Ok(SignInOutcome::NoSession)));
    block_on(auth.initialize()).unwrap();
    block_on(auth.login()).unwrap();

    let second = block_on(auth.login());

    assert!(matches!(second, Err(AuthError::InvalidTransition { .. })));
    assert_eq!(auth.client().sign_in_calls.get(), 1);
}

#[test]
fn login_recovers_from_errored() {
    let mut client = FakeIdentity::new().completing_with(Err(AuthError::Init("offline".to_owned())));
    client.on_sign_in = Ok(SignInOutcome::Completed(session("fresh")));
    let auth = AuthSession::new(client);
    let _ = block_on(auth.initialize());
    assert!(matches!(auth.current_status(), AuthStatus::Errored(_)));

    block_on(auth.login()).unwrap();

    assert_eq!(auth.current_status(), AuthStatus::Authenticated(session("fresh")));
}

#[test]
fn login_while_authenticated_is_rejected() {
    let auth = authenticated(FakeIdentity::new());
    assert!(block_on(auth.login()).is_err());
    assert_eq!(auth.client().sign_in_calls.get(), 0);
    assert!(auth.current_status().is_authenticated());
}

#[test]
fn login_redirect_failure_moves_to_errored() {
    let mut client = FakeIdentity::new().completing_with(Ok(SignInOutcome::NoSession));
    client.on_sign_in = Err(AuthError::Redirect("storage unavailable".to_owned()));
    let auth = AuthSession::new(client);
    block_on(auth.initialize()).unwrap();

    assert!(block_on(auth.login()).is_err());
    assert_eq!(
        auth.current_status(),
        AuthStatus::Errored("redirect failed: storage unavailable".to_owned())
    );
}

// =========================================================================
// logout
// =========================================================================

#[test]
fn logout_redirect_keeps_signing_out() {
    let auth = authenticated(FakeIdentity::new());
    block_on(auth.logout()).unwrap();
    assert_eq!(auth.current_status(), AuthStatus::SigningOut);
    assert_eq!(auth.client().sign_out_calls.get(), 1);
    assert!(auth.credential().is_none());
}

#[test]
fn logout_completed_in_page_is_unauthenticated() {
    let mut client = FakeIdentity::new();
    client.on_sign_out = Ok(SignOutOutcome::Completed);
    let auth = authenticated(client);

    block_on(auth.logout()).unwrap();

    assert_eq!(auth.current_status(), AuthStatus::Unauthenticated);
}

#[test]
fn logout_while_unauthenticated_is_rejected() {
    let auth = AuthSession::new(FakeIdentity::new().completing_with(Ok(SignInOutcome::NoSession)));
    block_on(auth.initialize()).unwrap();

    assert!(block_on(auth.logout()).is_err());
    assert_eq!(auth.client().sign_out_calls.get(), 0);
    assert_eq!(auth.current_status(), AuthStatus::Unauthenticated);
}

#[test]
fn logout_failure_moves_to_errored() {
    let mut client = FakeIdentity::new();
    client.on_sign_out = Err(AuthError::Redirect("bad end-session url".to_owned()));
    let auth = authenticated(client);

    assert!(block_on(auth.logout()).is_err());
    assert!(matches!(auth.current_status(), AuthStatus::Errored(msg) if msg.contains("bad end-session url")));
}

#[test]
fn new_sign_in_replaces_previous_credential() {
    let mut client = FakeIdentity::new();
    client.on_sign_out = Ok(SignOutOutcome::Completed);
    client.on_sign_in = Ok(SignInOutcome::Completed(session("tok-2")));
    let auth = authenticated(client);

    block_on(auth.logout()).unwrap();
    block_on(auth.login()).unwrap();

    assert_eq!(auth.credential().map(|c| c.as_str().to_owned()), Some("tok-2".to_owned()));
}

#[test]
fn status_signal_tracks_transitions() {
    let auth = AuthSession::new(FakeIdentity::new().completing_with(Ok(SignInOutcome::NoSession)));
    let status = auth.status();
    assert_eq!(status.get_untracked(), AuthStatus::Uninitialized);
    block_on(auth.initialize()).unwrap();
    assert_eq!(status.get_untracked(), AuthStatus::Unauthenticated);
}
