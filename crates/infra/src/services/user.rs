//! Signed-in user endpoints

use std::sync::Arc;

use pitwall_domain::{ProfileUpdate, UserProfile};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use super::call;
use crate::api::{unwrap_data, unwrap_unit, ApiClient, ClassifiedError};
use crate::http::ApiRequest;

/// Profile and session endpoints; keeps the client-side session store in
/// step with what the backend reports.
#[derive(Debug, Clone)]
pub struct UserService {
    client: Arc<ApiClient>,
}

impl UserService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Profile of the signed-in account; recorded in the session store.
    #[instrument(skip(self, cancel))]
    pub async fn me(
        &self,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<UserProfile>, ClassifiedError> {
        let profile: Option<UserProfile> =
            call(&self.client, "user.me", Ok(ApiRequest::get("/user")), cancel, unwrap_data)
                .await?;

        if let Some(profile) = &profile {
            self.client.session().set_user(profile.clone());
        }
        Ok(profile)
    }

    #[instrument(skip(self, changes, cancel))]
    pub async fn update_profile(
        &self,
        changes: &ProfileUpdate,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<UserProfile>, ClassifiedError> {
        let request = ApiRequest::put("/user/profile").json(changes);
        let profile: Option<UserProfile> =
            call(&self.client, "user.update_profile", request, cancel, unwrap_data).await?;

        if let Some(profile) = &profile {
            self.client.session().set_user(profile.clone());
        }
        Ok(profile)
    }

    /// End the backend session, then forget the local one.
    #[instrument(skip(self, cancel))]
    pub async fn logout(
        &self,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<()>, ClassifiedError> {
        let outcome =
            call(&self.client, "user.logout", Ok(ApiRequest::post("/logout")), cancel, unwrap_unit)
                .await?;

        if outcome.is_some() {
            self.client.session().clear();
            self.client.csrf().invalidate();
            info!("Signed out");
        }
        Ok(outcome)
    }
}
