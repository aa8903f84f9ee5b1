use super::*;
use crate::state::auth::{BearerCredential, Session, UserClaims};

fn session(name: Option<&str>) -> Session {
    Session {
        claims: UserClaims {
            subject: "sub-1".to_owned(),
            preferred_username: Some("waffler".to_owned()),
            name: name.map(str::to_owned),
            email: None,
        },
        credential: BearerCredential::new("tok").unwrap(),
        id_token: None,
        expires_at_ms: None,
    }
}

fn all_statuses() -> Vec<AuthStatus> {
    vec![
        AuthStatus::Uninitialized,
        AuthStatus::SigningIn,
        AuthStatus::SigningOut,
        AuthStatus::Unauthenticated,
        AuthStatus::Errored("provider unreachable".to_owned()),
        AuthStatus::Authenticated(session(None)),
    ]
}

#[test]
fn transient_statuses_render_progress_only() {
    for status in [AuthStatus::Uninitialized, AuthStatus::SigningIn, AuthStatus::SigningOut] {
        let screen = screen_for(&status);
        assert_eq!(screen, Screen::Progress);
        assert!(screen.shows_progress());
        assert!(!screen.shows_form());
        assert!(!screen.shows_login());
        assert!(!screen.shows_logout());
    }
}

#[test]
fn errored_renders_message_without_form() {
    let screen = screen_for(&AuthStatus::Errored("provider unreachable".to_owned()));
    assert_eq!(screen, Screen::Failed("provider unreachable".to_owned()));
    assert!(!screen.shows_form());
    assert!(screen.shows_login());
}

#[test]
fn unauthenticated_renders_login_only() {
    let screen = screen_for(&AuthStatus::Unauthenticated);
    assert_eq!(screen, Screen::LoginPrompt);
    assert!(screen.shows_login());
    assert!(!screen.shows_form());
    assert!(!screen.shows_logout());
    assert!(!screen.shows_progress());
}

#[test]
fn authenticated_renders_form_name_and_logout() {
    let screen = screen_for(&AuthStatus::Authenticated(session(Some("Wa Ffler"))));
    assert_eq!(screen, Screen::Form { display_name: "Wa Ffler".to_owned() });
    assert!(screen.shows_form());
    assert!(screen.shows_logout());
    assert!(!screen.shows_login());
}

#[test]
fn display_name_falls_back_to_username() {
    assert_eq!(
        screen_for(&AuthStatus::Authenticated(session(None))),
        Screen::Form { display_name: "waffler".to_owned() }
    );
}

#[test]
fn form_is_visible_only_when_authenticated() {
    for status in all_statuses() {
        assert_eq!(screen_for(&status).shows_form(), status.is_authenticated(), "{}", status.name());
    }
}
