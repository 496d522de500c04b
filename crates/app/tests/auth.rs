mod support;

use chrono::Duration;
use ledger_app::{AppError, AuthMethod, TokenSigner};
use support::{SECRET, now, setup_app};

#[test]
fn bearer_token_resolves_without_a_session() {
    let app = setup_app();
    let auth = &app.state.services.auth;
    let token = auth.issue_token("u1", Some("ada"), now()).expect("issue");

    let identity = auth.resolve(Some(&token), None, now()).expect("identity");
    assert_eq!(identity.user_id, "u1");
    assert_eq!(identity.username.as_deref(), Some("ada"));
    assert_eq!(identity.method, AuthMethod::Bearer);
}

#[test]
fn bearer_wins_over_session_cookie() {
    let app = setup_app();
    let db = app.state.open_db().expect("db");
    db.create_session("cookie", "web-user", None, "2025-07-01T00:00:00Z")
        .expect("session");
    let token = TokenSigner::new(SECRET)
        .issue("cli-user", None, now())
        .expect("issue");

    let identity = app
        .state
        .services
        .auth
        .resolve(Some(&token), Some("cookie"), now())
        .expect("identity");
    assert_eq!(identity.user_id, "cli-user");
    assert_eq!(identity.method, AuthMethod::Bearer);
}

#[test]
fn invalid_bearer_falls_back_to_session() {
    let app = setup_app();
    let db = app.state.open_db().expect("db");
    db.create_session("cookie", "web-user", Some("grace"), "2025-07-01T00:00:00Z")
        .expect("session");
    let forged = TokenSigner::new("not-the-secret")
        .issue("cli-user", None, now())
        .expect("issue");

    let identity = app
        .state
        .services
        .auth
        .resolve(Some(&forged), Some("cookie"), now())
        .expect("identity");
    assert_eq!(identity.user_id, "web-user");
    assert_eq!(identity.method, AuthMethod::Session);
}

#[test]
fn unresolved_callers_are_unauthorized() {
    let app = setup_app();
    let auth = &app.state.services.auth;
    let db = app.state.open_db().expect("db");
    db.create_session("old", "web-user", None, "2025-06-01T00:00:00Z")
        .expect("session");
    let expired = auth
        .issue_token("u1", None, now() - Duration::days(31))
        .expect("issue");

    for (bearer, session) in [
        (None, None),
        (Some(expired.as_str()), None),
        (Some("garbage"), Some("missing")),
        (None, Some("old")),
    ] {
        let err = auth.resolve(bearer, session, now()).expect_err("unauthorized");
        assert!(matches!(err, AppError::Unauthorized));
    }
}
