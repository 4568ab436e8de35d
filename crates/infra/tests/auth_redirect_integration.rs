//! Integration tests for the 401 login redirect

mod support;

use std::sync::Arc;

use pitwall_core::{Navigator, SessionStore};
use pitwall_domain::{AppSurface, ClientConfig};
use pitwall_infra::{
    ApiClient, ClassifiedError, DriverService, InMemorySession, LeagueService, LocationState,
    UserService,
};
use serde_json::json;
use support::{profile, TestApp};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn unauthenticated() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthenticated."}))
}

#[tokio::test]
async fn test_expired_session_redirects_to_login_and_clears_user() {
    let app = TestApp::start(Some("token")).await;
    Mock::given(method("GET"))
        .and(path("/api/leagues/1"))
        .respond_with(unauthenticated())
        .mount(&app.server)
        .await;

    let err = LeagueService::new(app.client.clone()).get(1, None).await.unwrap_err();

    match err {
        ClassifiedError::HttpFailure { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Unauthenticated.");
        }
        other => panic!("expected HttpFailure, got {other:?}"),
    }
    assert_eq!(app.host.redirects(), vec!["/login".to_string()]);
    assert_eq!(app.host.clears(), 1);
    assert!(!app.host.is_authenticated());
}

#[tokio::test]
async fn test_no_redirect_while_on_login_page() {
    let app = TestApp::start_at(Some("token"), "/login/").await;
    Mock::given(method("GET"))
        .and(path("/api/user"))
        .respond_with(unauthenticated())
        .mount(&app.server)
        .await;

    let err = UserService::new(app.client.clone()).me(None).await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(app.host.redirects().is_empty());
    assert_eq!(app.host.clears(), 0);
    assert_eq!(app.host.current_user(), Some(profile()));
}

#[tokio::test]
async fn test_follow_up_failures_after_redirect_do_not_navigate_again() {
    let app = TestApp::start(Some("token")).await;
    Mock::given(method("GET"))
        .respond_with(unauthenticated())
        .expect(2)
        .mount(&app.server)
        .await;

    let drivers = DriverService::new(app.client.clone());
    assert!(drivers.get(1, None).await.is_err());
    assert!(drivers.get(2, None).await.is_err());

    // The first redirect moved the page onto the login route.
    assert_eq!(app.host.redirects().len(), 1);
}

#[tokio::test]
async fn test_other_failures_do_not_redirect() {
    let app = TestApp::start(Some("token")).await;
    Mock::given(method("GET"))
        .and(path("/api/leagues/1"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Forbidden."})))
        .mount(&app.server)
        .await;

    let err = LeagueService::new(app.client.clone()).get(1, None).await.unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert!(app.host.redirects().is_empty());
}

#[tokio::test]
async fn test_admin_surface_redirects_to_admin_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/leagues/1"))
        .respond_with(unauthenticated())
        .mount(&server)
        .await;

    let location = Arc::new(LocationState::new("/admin/leagues?tab=settings"));
    let session = Arc::new(InMemorySession::new());
    session.set_user(profile());
    let mut navigations = location.subscribe();

    let client = ApiClient::builder()
        .surface(AppSurface::Admin)
        .config(ClientConfig::with_origin(server.uri()))
        .navigator(location.clone())
        .session(session.clone())
        .build()
        .expect("admin client");

    let result = LeagueService::new(Arc::new(client)).get(1, None).await;

    assert!(result.is_err());
    assert!(navigations.has_changed().unwrap());
    assert_eq!(*navigations.borrow_and_update(), "/admin/login");
    assert_eq!(location.current_path(), "/admin/login");
    assert!(!session.is_authenticated());
}
