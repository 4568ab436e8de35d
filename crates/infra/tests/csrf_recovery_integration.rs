//! Integration tests for anti-forgery credentials and 419 recovery
//!
//! Runs the user-surface client against a mock backend that rejects stale
//! tokens with 419 and reissues the `XSRF-TOKEN` cookie on the refresh route.

mod support;

use std::time::Duration;

use futures::future::join_all;
use pitwall_domain::NewLeague;
use pitwall_infra::{ClassifiedError, LeagueService};
use serde_json::json;
use support::{envelope, league_json, TestApp};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn new_league(name: &str) -> NewLeague {
    NewLeague { name: name.into(), description: None, platform: None, is_public: true }
}

fn refresh_response(raw_cookie: &str) -> ResponseTemplate {
    ResponseTemplate::new(204).insert_header("set-cookie", format!("XSRF-TOKEN={raw_cookie}; Path=/"))
}

#[tokio::test]
async fn test_state_changing_request_carries_both_token_headers() {
    let app = TestApp::start(Some("meta-token")).await;
    Mock::given(method("POST"))
        .and(path("/api/leagues"))
        .and(header("x-csrf-token", "meta-token"))
        .and(header("x-xsrf-token", "meta-token"))
        .respond_with(ResponseTemplate::new(201).set_body_json(envelope(league_json(1, "Sunday Cup"))))
        .expect(1)
        .mount(&app.server)
        .await;

    let leagues = LeagueService::new(app.client.clone());
    let created = leagues.create(&new_league("Sunday Cup"), None).await.expect("create");

    assert_eq!(created.map(|league| league.id), Some(1));
    assert_eq!(app.client.csrf().refresh_count(), 0);
}

#[tokio::test]
async fn test_read_requests_carry_no_token_headers() {
    let app = TestApp::start(Some("meta-token")).await;
    Mock::given(method("GET"))
        .and(path("/api/leagues/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(league_json(1, "Sunday Cup"))))
        .mount(&app.server)
        .await;

    LeagueService::new(app.client.clone()).get(1, None).await.expect("get");

    let requests = app.requests_to("GET", "/api/leagues/1").await;
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("x-csrf-token").is_none());
    assert!(requests[0].headers.get("x-xsrf-token").is_none());
}

#[tokio::test]
async fn test_cookie_token_is_used_when_page_has_none() {
    let app = TestApp::start(None).await;
    app.seed_xsrf_cookie("from%2Bcookie%3D");
    Mock::given(method("DELETE"))
        .and(path("/api/leagues/4"))
        .and(header("x-xsrf-token", "from+cookie="))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.server)
        .await;

    let deleted = LeagueService::new(app.client.clone()).delete(4, None).await.expect("delete");
    assert_eq!(deleted, Some(()));
}

#[tokio::test]
async fn test_token_mismatch_refreshes_and_replays_once() {
    let app = TestApp::start(Some("stale")).await;
    Mock::given(method("POST"))
        .and(path("/api/leagues"))
        .and(header("x-xsrf-token", "stale"))
        .respond_with(ResponseTemplate::new(419).set_body_json(json!({"message": "CSRF token mismatch."})))
        .expect(1)
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sanctum/csrf-cookie"))
        .respond_with(refresh_response("fresh%3D%3D"))
        .expect(1)
        .mount(&app.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/leagues"))
        .and(header("x-csrf-token", "fresh=="))
        .and(header("x-xsrf-token", "fresh=="))
        .respond_with(ResponseTemplate::new(201).set_body_json(envelope(league_json(9, "Night Series"))))
        .expect(1)
        .mount(&app.server)
        .await;

    let leagues = LeagueService::new(app.client.clone());
    let created = leagues.create(&new_league("Night Series"), None).await.expect("recovered");

    assert_eq!(created.map(|league| league.name), Some("Night Series".to_string()));
    assert_eq!(app.client.csrf().refresh_count(), 1);
    assert_eq!(app.client.csrf().cached().as_deref(), Some("fresh=="));
}

#[tokio::test]
async fn test_concurrent_mismatches_share_one_refresh() {
    let app = TestApp::start(Some("stale")).await;
    Mock::given(method("POST"))
        .and(header("x-xsrf-token", "stale"))
        .respond_with(ResponseTemplate::new(419))
        .expect(5)
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sanctum/csrf-cookie"))
        .respond_with(refresh_response("fresh").set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&app.server)
        .await;
    Mock::given(method("POST"))
        .and(header("x-xsrf-token", "fresh"))
        .respond_with(ResponseTemplate::new(201).set_body_json(envelope(league_json(2, "Endurance"))))
        .expect(5)
        .mount(&app.server)
        .await;

    let leagues = LeagueService::new(app.client.clone());
    let payloads: Vec<_> = (0..5).map(|n| new_league(&format!("League {n}"))).collect();
    let results = join_all(payloads.iter().map(|payload| leagues.create(payload, None))).await;

    for result in results {
        assert!(matches!(result, Ok(Some(_))), "unexpected outcome: {result:?}");
    }
    assert_eq!(app.client.csrf().refresh_count(), 1);
    assert_eq!(app.requests_to("GET", "/sanctum/csrf-cookie").await.len(), 1);
}

#[tokio::test]
async fn test_failed_replay_is_not_retried() {
    let app = TestApp::start(Some("stale")).await;
    Mock::given(method("GET"))
        .and(path("/sanctum/csrf-cookie"))
        .respond_with(refresh_response("fresh"))
        .expect(1)
        .mount(&app.server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/leagues/3"))
        .respond_with(ResponseTemplate::new(419).set_body_json(json!({"message": "CSRF token mismatch."})))
        .expect(2)
        .mount(&app.server)
        .await;

    let leagues = LeagueService::new(app.client.clone());
    let err = leagues.update(3, &Default::default(), None).await.unwrap_err();

    match err {
        ClassifiedError::HttpFailure { status, message } => {
            assert_eq!(status, 419);
            assert_eq!(message, "CSRF token mismatch.");
        }
        other => panic!("expected HttpFailure, got {other:?}"),
    }
    assert_eq!(app.client.csrf().refresh_count(), 1);
}

#[tokio::test]
async fn test_unauthenticated_replay_does_not_redirect() {
    let app = TestApp::start(Some("stale")).await;
    Mock::given(method("GET"))
        .and(path("/sanctum/csrf-cookie"))
        .respond_with(refresh_response("fresh"))
        .mount(&app.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/leagues"))
        .and(header("x-xsrf-token", "stale"))
        .respond_with(ResponseTemplate::new(419))
        .mount(&app.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/leagues"))
        .and(header("x-xsrf-token", "fresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthenticated."})))
        .expect(1)
        .mount(&app.server)
        .await;

    let err = LeagueService::new(app.client.clone())
        .create(&new_league("Ghost League"), None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(app.host.redirects().is_empty());
    assert_eq!(app.host.clears(), 0);
}

#[tokio::test]
async fn test_failed_refresh_surfaces_original_mismatch() {
    let app = TestApp::start(Some("stale")).await;
    Mock::given(method("GET"))
        .and(path("/sanctum/csrf-cookie"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/leagues"))
        .respond_with(ResponseTemplate::new(419).set_body_json(json!({"message": "Page expired."})))
        .expect(1)
        .mount(&app.server)
        .await;

    let err = LeagueService::new(app.client.clone())
        .create(&new_league("Doomed"), None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(419));
    assert_eq!(err.to_string(), "Page expired.");
}

#[tokio::test]
async fn test_refresh_completes_after_its_caller_cancels() {
    let app = TestApp::start(Some("stale")).await;
    Mock::given(method("GET"))
        .and(path("/sanctum/csrf-cookie"))
        .respond_with(refresh_response("late").set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&app.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/leagues"))
        .respond_with(ResponseTemplate::new(419))
        .expect(1)
        .mount(&app.server)
        .await;

    let token = pitwall_infra::CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let outcome = LeagueService::new(app.client.clone())
        .create(&new_league("Abandoned"), Some(&token))
        .await
        .expect("cancellation is not an error");
    assert_eq!(outcome, None);

    // The refresh keeps running; its cookie lands in the jar.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(app.client.csrf().cookie_token().as_deref(), Some("late"));
    assert_eq!(app.client.csrf().refresh_count(), 1);
}

#[tokio::test]
async fn test_mismatch_arriving_after_refresh_replays_without_refreshing_again() {
    let app = TestApp::start(Some("stale")).await;
    Mock::given(method("PUT"))
        .and(path("/api/leagues/1"))
        .and(header("x-xsrf-token", "stale"))
        .respond_with(ResponseTemplate::new(419))
        .expect(1)
        .mount(&app.server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/leagues/2"))
        .and(header("x-xsrf-token", "stale"))
        .respond_with(ResponseTemplate::new(419).set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sanctum/csrf-cookie"))
        .respond_with(refresh_response("fresh"))
        .expect(1)
        .mount(&app.server)
        .await;
    Mock::given(method("PUT"))
        .and(header("x-xsrf-token", "fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(league_json(1, "Sunday Cup"))))
        .expect(2)
        .mount(&app.server)
        .await;

    let leagues = LeagueService::new(app.client.clone());
    let changes = Default::default();
    let (quick, late) = tokio::join!(leagues.update(1, &changes, None), leagues.update(2, &changes, None));

    assert!(matches!(quick, Ok(Some(_))), "unexpected outcome: {quick:?}");
    assert!(matches!(late, Ok(Some(_))), "unexpected outcome: {late:?}");
    assert_eq!(app.client.csrf().refresh_count(), 1);
    assert_eq!(app.requests_to("GET", "/sanctum/csrf-cookie").await.len(), 1);
}

#[tokio::test]
async fn test_refresh_without_cookie_does_not_replay_rejected_token() {
    let app = TestApp::start(Some("stale")).await;
    Mock::given(method("GET"))
        .and(path("/sanctum/csrf-cookie"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/leagues"))
        .respond_with(ResponseTemplate::new(419).set_body_json(json!({"message": "CSRF token mismatch."})))
        .expect(1)
        .mount(&app.server)
        .await;

    let err = LeagueService::new(app.client.clone())
        .create(&new_league("No Cookie"), None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(419));
    assert_eq!(err.to_string(), "CSRF token mismatch.");
    assert!(app.client.csrf().cached().is_none());
}
