//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! `AuthStatus` is the only thing the review screen renders authentication
//! from. It is owned by `state::session::AuthSession`; views read it through a
//! signal and never mutate it.
//!
//! DESIGN
//! ======
//! Every status change goes through `AuthStatus::apply`. An event that is not
//! valid for the current status is rejected with `AuthError::InvalidTransition`
//! and the status stays as it was.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// CREDENTIAL + CLAIMS
// =============================================================================

/// Opaque access token forwarded to the review backend.
///
/// Never empty: construction rejects blank tokens, and deserialization goes
/// through the same check.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BearerCredential(String);

impl BearerCredential {
    /// Wrap a raw access token. Returns `None` for an empty or blank token.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return None;
        }
        Some(Self(token))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the HTTP `Authorization` header.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl TryFrom<String> for BearerCredential {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or("bearer credential must not be empty")
    }
}

impl From<BearerCredential> for String {
    fn from(value: BearerCredential) -> Self {
        value.0
    }
}

impl fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerCredential(<redacted>)")
    }
}

/// Identity attributes the UI needs, taken from the provider's token.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    pub subject: String,
    pub preferred_username: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserClaims {
    /// Name shown next to the logout action.
    ///
    /// Prefers the full name, then the username, then the subject id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        [self.name.as_deref(), self.preferred_username.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or(self.subject.as_str())
    }
}

/// An authenticated session as produced by the identity client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub claims: UserClaims,
    pub credential: BearerCredential,
    /// Raw ID token, kept only as the logout `id_token_hint`.
    pub id_token: Option<String>,
    /// Access token expiry in milliseconds since the Unix epoch.
    pub expires_at_ms: Option<f64>,
}

impl Session {
    /// Whether the access token has expired at `now_ms`. Sessions without a
    /// known expiry never expire locally.
    #[must_use]
    pub fn is_expired_at(&self, now_ms: f64) -> bool {
        self.expires_at_ms.is_some_and(|expires| expires <= now_ms)
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Bad configuration or an unreachable identity provider.
    #[error("identity provider initialization failed: {0}")]
    Init(String),
    /// Failure in the middle of a sign-in or sign-out redirect.
    #[error("redirect failed: {0}")]
    Redirect(String),
    #[error("cannot {action} while {from}")]
    InvalidTransition { from: &'static str, action: &'static str },
    #[error("auth session is already initialized")]
    AlreadyInitialized,
}

// =============================================================================
// STATUS MACHINE
// =============================================================================

/// Inputs that move the status machine.
#[derive(Clone, Debug, PartialEq)]
pub enum AuthEvent {
    InitStarted,
    SessionRestored(Session),
    SignInRequested,
    SignInCompleted(Session),
    NoSession,
    Failed(String),
    SignOutRequested,
    SignOutCompleted,
}

impl AuthEvent {
    /// Short action name used in transition errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::InitStarted => "initialize",
            Self::SessionRestored(_) => "restore a session",
            Self::SignInRequested => "sign in",
            Self::SignInCompleted(_) => "complete sign-in",
            Self::NoSession => "report no session",
            Self::Failed(_) => "report a failure",
            Self::SignOutRequested => "sign out",
            Self::SignOutCompleted => "complete sign-out",
        }
    }
}

/// Current authentication status.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum AuthStatus {
    #[default]
    Uninitialized,
    SigningIn,
    SigningOut,
    Authenticated(Session),
    Unauthenticated,
    Errored(String),
}

impl AuthStatus {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::SigningIn => "signing in",
            Self::SigningOut => "signing out",
            Self::Authenticated(_) => "authenticated",
            Self::Unauthenticated => "unauthenticated",
            Self::Errored(_) => "errored",
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    /// Credential of the current session, if authenticated.
    #[must_use]
    pub fn credential(&self) -> Option<&BearerCredential> {
        self.session().map(|session| &session.credential)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Apply `event` and return the next status.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidTransition`] when `event` is not allowed
    /// from the current status.
    pub fn apply(&self, event: AuthEvent) -> Result<Self, AuthError> {
        match (self, event) {
            (Self::Uninitialized, AuthEvent::InitStarted)
            | (Self::Unauthenticated | Self::Errored(_), AuthEvent::SignInRequested) => Ok(Self::SigningIn),
            (Self::Uninitialized, AuthEvent::SessionRestored(session))
            | (Self::SigningIn, AuthEvent::SignInCompleted(session)) => Ok(Self::Authenticated(session)),
            (Self::SigningIn, AuthEvent::NoSession) | (Self::SigningOut, AuthEvent::SignOutCompleted) => {
                Ok(Self::Unauthenticated)
            }
            (Self::Uninitialized | Self::SigningIn | Self::SigningOut, AuthEvent::Failed(message)) => {
                Ok(Self::Errored(message))
            }
            (Self::Authenticated(_), AuthEvent::SignOutRequested) => Ok(Self::SigningOut),
            (from, event) => Err(AuthError::InvalidTransition { from: from.name(), action: event.name() }),
        }
    }
}
