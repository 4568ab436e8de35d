//! League endpoints

use std::sync::Arc;

use pitwall_domain::{League, LeagueUpdate, NewLeague, PageRequest, Paginated, Standing};
use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::call;
use crate::api::{unwrap_data, unwrap_page, unwrap_unit, ApiClient, ClassifiedError};
use crate::http::{ApiRequest, MultipartPayload};

/// League CRUD, logo upload and standings
#[derive(Debug, Clone)]
pub struct LeagueService {
    client: Arc<ApiClient>,
}

impl LeagueService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// One page of leagues. `page.index` is 0-based; the returned
    /// [`Paginated::page_index`] maps back to the same index.
    #[instrument(skip(self, cancel), fields(index = page.index, per_page = page.per_page))]
    pub async fn list(
        &self,
        page: PageRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<Paginated<League>>, ClassifiedError> {
        let request = ApiRequest::get("/leagues").query(page.query_pairs());
        let leagues = call(&self.client, "league.list", Ok(request), cancel, unwrap_page).await?;

        if let Some(leagues) = &leagues {
            debug!(count = leagues.data.len(), total = leagues.total(), "Leagues listed");
        }
        Ok(leagues)
    }

    #[instrument(skip(self, cancel))]
    pub async fn get(
        &self,
        id: u64,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<League>, ClassifiedError> {
        let request = ApiRequest::get(format!("/leagues/{id}"));
        call(&self.client, "league.get", Ok(request), cancel, unwrap_data).await
    }

    #[instrument(skip(self, league, cancel), fields(name = %league.name))]
    pub async fn create(
        &self,
        league: &NewLeague,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<League>, ClassifiedError> {
        let request = ApiRequest::post("/leagues").json(league);
        let created: Option<League> =
            call(&self.client, "league.create", request, cancel, unwrap_data).await?;

        if let Some(league) = &created {
            debug!(league_id = league.id, "League created");
        }
        Ok(created)
    }

    #[instrument(skip(self, changes, cancel))]
    pub async fn update(
        &self,
        id: u64,
        changes: &LeagueUpdate,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<League>, ClassifiedError> {
        let request = ApiRequest::put(format!("/leagues/{id}")).json(changes);
        call(&self.client, "league.update", request, cancel, unwrap_data).await
    }

    #[instrument(skip(self, cancel))]
    pub async fn delete(
        &self,
        id: u64,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<()>, ClassifiedError> {
        let request = ApiRequest::delete(format!("/leagues/{id}"));
        call(&self.client, "league.delete", Ok(request), cancel, unwrap_unit).await
    }

    /// Replace the league logo. Sent as multipart PUT, which travels as POST
    /// with `_method=PUT`.
    #[instrument(skip(self, bytes, cancel), fields(size = bytes.len()))]
    pub async fn upload_logo(
        &self,
        id: u64,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<League>, ClassifiedError> {
        let payload = MultipartPayload::new().file("logo", file_name, mime, bytes);
        let request = ApiRequest::new(Method::PUT, format!("/leagues/{id}/logo")).multipart(payload);
        call(&self.client, "league.upload_logo", Ok(request), cancel, unwrap_data).await
    }

    #[instrument(skip(self, cancel))]
    pub async fn standings(
        &self,
        id: u64,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<Vec<Standing>>, ClassifiedError> {
        let request = ApiRequest::get(format!("/leagues/{id}/standings"));
        call(&self.client, "league.standings", Ok(request), cancel, unwrap_data).await
    }
}
