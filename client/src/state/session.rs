//! Auth session manager: owns the authentication lifecycle.
//!
//! SYSTEM CONTEXT
//! ==============
//! `AuthSession` is created once by the root `App` component, handed to the
//! review page through context, and initialized once in the browser. It wraps
//! an `IdentityClient` (the OIDC redirect client in production) and publishes a
//! single reactive `AuthStatus`.
//!
//! DESIGN
//! ======
//! The identity client reports what happened; the session decides what that
//! means for the status. A client answering `Redirecting` leaves the status in
//! its transient state because the page is about to unload. A client answering
//! `Completed` finishes in-page, which is how popup or device-code flows (and
//! the tests) drive the same state machine.
//!
//! ERROR HANDLING
//! ==============
//! Provider failures move the status to `Errored` with the error message and
//! are never retried. Calls that are not valid for the current status are
//! logged and rejected without touching the status.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use leptos::prelude::*;

use super::auth::{AuthError, AuthEvent, AuthStatus, BearerCredential, Session};

/// Result of a sign-in attempt as reported by the identity client.
#[derive(Clone, Debug, PartialEq)]
pub enum SignInOutcome {
    /// The browser is navigating to the identity provider.
    Redirecting,
    /// The flow finished without leaving the page.
    Completed(Session),
    /// The provider reports no active session.
    NoSession,
}

/// Result of a sign-out attempt as reported by the identity client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignOutOutcome {
    Redirecting,
    Completed,
}

/// Provider-neutral identity client. Enables fakes in tests.
#[async_trait::async_trait(?Send)]
pub trait IdentityClient {
    /// A still-valid session persisted from an earlier sign-in.
    fn cached_session(&self) -> Option<Session>;

    /// Resolve sign-in during start-up: finish a redirect callback, start a
    /// login redirect, or report that there is no session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Init`] for configuration or discovery failures and
    /// [`AuthError::Redirect`] for failures reported by the callback.
    async fn complete_sign_in(&self) -> Result<SignInOutcome, AuthError>;

    /// Start an explicit sign-in.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the redirect cannot be started.
    async fn sign_in(&self) -> Result<SignInOutcome, AuthError>;

    /// End `session` at the provider and drop any local copy of it.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the logout redirect cannot be started.
    async fn sign_out(&self, session: &Session) -> Result<SignOutOutcome, AuthError>;
}

/// Handle to the single authentication session of the application.
///
/// Cloning is cheap; every clone shares the same status signal and client.
pub struct AuthSession<C> {
    status: RwSignal<AuthStatus>,
    client: Arc<C>,
}

impl<C> Clone for AuthSession<C> {
    fn clone(&self) -> Self {
        Self { status: self.status, client: Arc::clone(&self.client) }
    }
}

impl<C: IdentityClient> AuthSession<C> {
    pub fn new(client: C) -> Self {
        Self { status: RwSignal::new(AuthStatus::Uninitialized), client: Arc::new(client) }
    }

    /// Reactive view of the status. Readers re-render on every change.
    pub fn status(&self) -> ReadSignal<AuthStatus> {
        self.status.read_only()
    }

    /// Snapshot of the status without subscribing to changes.
    pub fn current_status(&self) -> AuthStatus {
        self.status.get_untracked()
    }

    /// Credential of the session that is authenticated right now.
    pub fn credential(&self) -> Option<BearerCredential> {
        self.status.with_untracked(|status| status.credential().cloned())
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Resolve the initial status. Must be called once per application.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AlreadyInitialized`] on a second call, or the
    /// provider error that moved the status to `Errored`.
    pub async fn initialize(&self) -> Result<(), AuthError> {
        if !matches!(self.current_status(), AuthStatus::Uninitialized) {
            log::warn!("auth session initialize called more than once");
            return Err(AuthError::AlreadyInitialized);
        }

        if let Some(session) = self.client.cached_session() {
            log::info!("restored session for {}", session.claims.display_name());
            return self.transition(AuthEvent::SessionRestored(session));
        }

        self.transition(AuthEvent::InitStarted)?;
        let outcome = self.client.complete_sign_in().await;
        self.settle_sign_in(outcome)
    }

    /// Start a sign-in. Allowed while `Unauthenticated` or `Errored`.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the call is not valid for the current
    /// status or the provider fails.
    pub async fn login(&self) -> Result<(), AuthError> {
        self.transition(AuthEvent::SignInRequested)?;
        let outcome = self.client.sign_in().await;
        self.settle_sign_in(outcome)
    }

    /// Sign out of the current session. Allowed only while `Authenticated`.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the call is not valid for the current
    /// status or the provider fails.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let session = self.status.with_untracked(|status| status.session().cloned());
        self.transition(AuthEvent::SignOutRequested)?;
        let Some(session) = session else {
            return Ok(());
        };

        match self.client.sign_out(&session).await {
            Ok(SignOutOutcome::Redirecting) => Ok(()),
            Ok(SignOutOutcome::Completed) => self.transition(AuthEvent::SignOutCompleted),
            Err(err) => self.fail(err),
        }
    }

    fn settle_sign_in(&self, outcome: Result<SignInOutcome, AuthError>) -> Result<(), AuthError> {
        match outcome {
            Ok(SignInOutcome::Redirecting) => {
                log::debug!("redirecting to identity provider");
                Ok(())
            }
            Ok(SignInOutcome::Completed(session)) => {
                log::info!("signed in as {}", session.claims.display_name());
                self.transition(AuthEvent::SignInCompleted(session))
            }
            Ok(SignInOutcome::NoSession) => self.transition(AuthEvent::NoSession),
            Err(err) => self.fail(err),
        }
    }

    fn fail(&self, err: AuthError) -> Result<(), AuthError> {
        log::error!("{err}");
        self.transition(AuthEvent::Failed(err.to_string()))?;
        Err(err)
    }

    fn transition(&self, event: AuthEvent) -> Result<(), AuthError> {
        let next = self
            .status
            .with_untracked(|status| status.apply(event))
            .inspect_err(|err| log::warn!("ignored auth action: {err}"))?;
        self.status.set(next);
        Ok(())
    }
}
