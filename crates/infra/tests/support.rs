#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use pitwall_core::{Navigator, SessionStore};
use pitwall_domain::{AppSurface, ClientConfig, UserProfile};
use pitwall_infra::ApiClient;
use serde_json::{json, Value};
use wiremock::MockServer;

/// Navigator and session store that record what the client did to them.
#[derive(Default)]
pub struct RecordingHost {
    path: Mutex<String>,
    redirects: Mutex<Vec<String>>,
    user: Mutex<Option<UserProfile>>,
    clears: Mutex<usize>,
}

impl RecordingHost {
    pub fn at(path: &str) -> Arc<Self> {
        let host = Self::default();
        *host.path.lock() = path.to_string();
        Arc::new(host)
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().clone()
    }

    pub fn clears(&self) -> usize {
        *self.clears.lock()
    }
}

impl Navigator for RecordingHost {
    fn current_path(&self) -> String {
        self.path.lock().clone()
    }

    fn redirect(&self, path: &str) {
        self.redirects.lock().push(path.to_string());
        *self.path.lock() = path.to_string();
    }
}

impl SessionStore for RecordingHost {
    fn set_user(&self, user: UserProfile) {
        *self.user.lock() = Some(user);
    }

    fn current_user(&self) -> Option<UserProfile> {
        self.user.lock().clone()
    }

    fn clear(&self) {
        *self.clears.lock() += 1;
        *self.user.lock() = None;
    }
}

/// A mock backend plus a user-surface client pointed at it.
pub struct TestApp {
    pub server: MockServer,
    pub host: Arc<RecordingHost>,
    pub client: Arc<ApiClient>,
}

impl TestApp {
    /// Backend with a page-embedded token of `page_token`, viewed from
    /// `/dashboard` by a signed-in user.
    pub async fn start(page_token: Option<&str>) -> Self {
        Self::start_at(page_token, "/dashboard").await
    }

    pub async fn start_at(page_token: Option<&str>, path: &str) -> Self {
        let server = MockServer::start().await;
        let host = RecordingHost::at(path);
        host.set_user(profile());

        let client = ApiClient::builder()
            .surface(AppSurface::User)
            .config(ClientConfig::with_origin(server.uri()))
            .navigator(host.clone())
            .session(host.clone())
            .page_token(Arc::new(page_token.map(ToString::to_string)))
            .build()
            .expect("api client");

        Self { server, host, client: Arc::new(client) }
    }

    /// Put an `XSRF-TOKEN` cookie into the client's jar, as if the backend
    /// had set it. `raw` is the encoded cookie value.
    pub fn seed_xsrf_cookie(&self, raw: &str) {
        let origin = self.client.transport().origin().clone();
        self.client
            .transport()
            .cookie_jar()
            .add_cookie_str(&format!("XSRF-TOKEN={raw}; Path=/"), &origin);
    }

    pub async fn requests_to(&self, method: &str, path: &str) -> Vec<wiremock::Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.method.as_str() == method && request.url.path() == path)
            .collect()
    }
}

pub fn profile() -> UserProfile {
    UserProfile {
        id: 1,
        name: "Charles".into(),
        email: "charles@example.com".into(),
        is_admin: false,
        avatar_url: None,
        timezone: None,
    }
}

pub fn envelope(data: Value) -> Value {
    json!({"success": true, "data": data, "message": null})
}

pub fn league_json(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "slug": name.to_lowercase().replace(' ', "-"),
        "description": null,
        "platform": "iRacing",
        "logo_url": null,
        "is_public": true,
        "created_at": "2026-03-01T10:00:00Z",
        "updated_at": null
    })
}

pub fn driver_json(id: u64, league_id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "league_id": league_id,
        "name": name,
        "nickname": null,
        "number": id,
        "country": "MC",
        "status": "active"
    })
}

pub fn page_meta(current_page: u32, per_page: u32, total: u64, last_page: u32) -> Value {
    json!({
        "current_page": current_page,
        "per_page": per_page,
        "total": total,
        "last_page": last_page,
        "from": if total == 0 { Value::Null } else { json!(u64::from(current_page - 1) * u64::from(per_page) + 1) },
        "to": if total == 0 { Value::Null } else { json!((u64::from(current_page) * u64::from(per_page)).min(total)) }
    })
}
