//! Integration tests for the resource services
//!
//! Covers envelope unwrapping, page normalization, error classification and
//! the session side effects of the user endpoints.

mod support;

use pitwall_domain::constants::GENERIC_UNKNOWN_MESSAGE;
use pitwall_domain::{NewDriver, PageRequest, ProfileUpdate};
use pitwall_infra::api::error_message;
use pitwall_infra::{ClassifiedError, DriverService, LeagueService, UserService};
use pitwall_core::SessionStore;
use serde_json::json;
use support::{driver_json, envelope, league_json, page_meta, profile, TestApp};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_validation_failure_keeps_field_errors() {
    let app = TestApp::start(Some("token")).await;
    Mock::given(method("POST"))
        .and(path("/api/leagues/7/drivers"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "The name field is required.",
            "errors": {
                "name": ["required"],
                "number": "The number must be between 1 and 999."
            }
        })))
        .mount(&app.server)
        .await;

    let driver = NewDriver { name: String::new(), nickname: None, number: Some(0), country: None };
    let err = DriverService::new(app.client.clone()).create(7, &driver, None).await.unwrap_err();

    let ClassifiedError::ValidationFailed { message, errors, .. } = &err else {
        panic!("expected ValidationFailed, got {err:?}");
    };
    assert_eq!(message, "The name field is required.");
    assert_eq!(errors["name"], vec!["required".to_string()]);
    assert_eq!(errors["number"], vec!["The number must be between 1 and 999.".to_string()]);

    // The untouched failure is still reachable, structured body included.
    let original = err.original().expect("original failure");
    assert_eq!(original.status(), Some(422));
    assert_eq!(original.body().unwrap()["errors"]["name"][0], "required");
}

#[tokio::test]
async fn test_unprocessable_without_field_errors_is_an_http_failure() {
    let app = TestApp::start(Some("token")).await;
    Mock::given(method("DELETE"))
        .and(path("/api/leagues/5"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"message": "League has races."})))
        .mount(&app.server)
        .await;

    let err = LeagueService::new(app.client.clone()).delete(5, None).await.unwrap_err();

    assert!(matches!(err, ClassifiedError::HttpFailure { status: 422, .. }));
    assert_eq!(error_message(&err), "League has races.");
}

#[tokio::test]
async fn test_plain_text_server_error_gets_fallback_message() {
    let app = TestApp::start(None).await;
    Mock::given(method("GET"))
        .and(path("/api/leagues/1/standings"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&app.server)
        .await;

    let err = LeagueService::new(app.client.clone()).standings(1, None).await.unwrap_err();

    match err {
        ClassifiedError::HttpFailure { status, message } => {
            assert_eq!(status, 502);
            assert_eq!(message, "Request failed with status 502");
        }
        other => panic!("expected HttpFailure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unexpected_shape_is_unknown() {
    let app = TestApp::start(None).await;
    Mock::given(method("GET"))
        .and(path("/api/leagues/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({"id": "not a league"}))))
        .mount(&app.server)
        .await;

    let err = LeagueService::new(app.client.clone()).get(1, None).await.unwrap_err();

    assert!(matches!(err, ClassifiedError::Unknown { .. }));
    assert_eq!(err.to_string(), GENERIC_UNKNOWN_MESSAGE);
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_both_page_shapes_normalize_equally() {
    let app = TestApp::start(None).await;
    let items = json!([league_json(1, "Sunday Cup"), league_json(2, "Night Series")]);
    let meta = page_meta(2, 2, 6, 3);

    Mock::given(method("GET"))
        .and(path("/api/leagues"))
        .and(query_param("per_page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": items,
            "meta": meta
        })))
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/leagues/9/drivers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [driver_json(1, 9, "Ayrton"), driver_json(2, 9, "Alain")],
            "meta": meta,
            "links": {"first": "/api/leagues/9/drivers?page=1", "next": "/api/leagues/9/drivers?page=3"}
        })))
        .mount(&app.server)
        .await;

    let page = PageRequest::new(1, 2);
    let leagues = LeagueService::new(app.client.clone()).list(page, None).await.unwrap().unwrap();
    let drivers = DriverService::new(app.client.clone()).list(9, page, None).await.unwrap().unwrap();

    assert_eq!(leagues.meta, drivers.meta);
    assert_eq!(leagues.page_index(), 1);
    assert_eq!(drivers.page_index(), 1);
    assert!(leagues.has_next());
    assert_eq!(leagues.links, None);
    assert_eq!(
        drivers.links.and_then(|links| links.next).as_deref(),
        Some("/api/leagues/9/drivers?page=3")
    );
}

#[tokio::test]
async fn test_first_page_index_maps_to_backend_page_one() {
    let app = TestApp::start(None).await;
    Mock::given(method("GET"))
        .and(path("/api/leagues"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [league_json(1, "Sunday Cup")],
            "meta": page_meta(1, 15, 1, 1)
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    let page = LeagueService::new(app.client.clone())
        .list(PageRequest::default(), None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(page.current_page(), 1);
    assert_eq!(page.page_index(), 0);
    assert_eq!(page.total(), 1);
    assert!(!page.has_next());
}

#[tokio::test]
async fn test_logo_upload_travels_as_post_with_method_override() {
    let app = TestApp::start(Some("token")).await;
    Mock::given(method("POST"))
        .and(path("/api/leagues/3/logo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(league_json(3, "Sunday Cup"))))
        .expect(1)
        .mount(&app.server)
        .await;

    let league = LeagueService::new(app.client.clone())
        .upload_logo(3, "logo.png", "image/png", vec![0x89, b'P', b'N', b'G'], None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(league.id, 3);

    let requests = app.requests_to("POST", "/api/leagues/3/logo").await;
    assert_eq!(requests.len(), 1);
    let request = &requests[0];

    let content_type = request.headers.get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="));
    assert_eq!(request.headers.get("x-csrf-token").unwrap(), "token");

    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("name=\"_method\""));
    assert!(body.contains("PUT"));
    assert!(body.contains("name=\"logo\"; filename=\"logo.png\""));
}

#[tokio::test]
async fn test_json_update_keeps_its_verb() {
    let app = TestApp::start(Some("token")).await;
    Mock::given(method("PATCH"))
        .and(path("/api/drivers/4"))
        .and(body_json(json!({"nickname": "Rain Master"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(driver_json(4, 1, "Ayrton"))))
        .expect(1)
        .mount(&app.server)
        .await;

    let changes = pitwall_domain::DriverUpdate {
        nickname: Some("Rain Master".into()),
        ..Default::default()
    };
    let driver = DriverService::new(app.client.clone()).update(4, &changes, None).await.unwrap();
    assert_eq!(driver.map(|driver| driver.id), Some(4));
}

#[tokio::test]
async fn test_me_records_session_and_logout_clears_it() {
    let app = TestApp::start(Some("token")).await;
    app.host.clear();
    Mock::given(method("GET"))
        .and(path("/api/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "id": 1,
            "name": "Charles",
            "email": "charles@example.com"
        }))))
        .mount(&app.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/logout"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.server)
        .await;

    let users = UserService::new(app.client.clone());
    let me = users.me(None).await.unwrap().unwrap();
    assert_eq!(me, profile());
    assert_eq!(app.host.current_user(), Some(profile()));

    assert_eq!(users.logout(None).await.unwrap(), Some(()));
    assert!(!app.host.is_authenticated());
    assert_eq!(app.client.csrf().cached(), None);
}

#[tokio::test]
async fn test_bare_profile_body_is_accepted() {
    let app = TestApp::start(Some("token")).await;
    Mock::given(method("PUT"))
        .and(path("/api/user/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "name": "Charles L.",
            "email": "charles@example.com",
            "timezone": "Europe/Monaco"
        })))
        .mount(&app.server)
        .await;

    let changes = ProfileUpdate {
        name: Some("Charles L.".into()),
        timezone: Some("Europe/Monaco".into()),
        ..Default::default()
    };
    let updated = UserService::new(app.client.clone()).update_profile(&changes, None).await.unwrap();

    assert_eq!(updated.as_ref().map(|user| user.name.as_str()), Some("Charles L."));
    assert_eq!(app.host.current_user(), updated);
}
