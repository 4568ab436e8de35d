//! Driver endpoints

use std::sync::Arc;

use pitwall_domain::{Driver, DriverUpdate, NewDriver, PageRequest, Paginated};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::call;
use crate::api::{unwrap_data, unwrap_page, unwrap_unit, ApiClient, ClassifiedError};
use crate::http::ApiRequest;

/// Driver roster endpoints
#[derive(Debug, Clone)]
pub struct DriverService {
    client: Arc<ApiClient>,
}

impl DriverService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// One page of a league's roster (0-based `page.index`).
    #[instrument(skip(self, cancel), fields(index = page.index))]
    pub async fn list(
        &self,
        league_id: u64,
        page: PageRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<Paginated<Driver>>, ClassifiedError> {
        let request =
            ApiRequest::get(format!("/leagues/{league_id}/drivers")).query(page.query_pairs());
        call(&self.client, "driver.list", Ok(request), cancel, unwrap_page).await
    }

    #[instrument(skip(self, cancel))]
    pub async fn get(
        &self,
        id: u64,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<Driver>, ClassifiedError> {
        let request = ApiRequest::get(format!("/drivers/{id}"));
        call(&self.client, "driver.get", Ok(request), cancel, unwrap_data).await
    }

    #[instrument(skip(self, driver, cancel))]
    pub async fn create(
        &self,
        league_id: u64,
        driver: &NewDriver,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<Driver>, ClassifiedError> {
        let request = ApiRequest::post(format!("/leagues/{league_id}/drivers")).json(driver);
        let created: Option<Driver> =
            call(&self.client, "driver.create", request, cancel, unwrap_data).await?;

        if let Some(driver) = &created {
            debug!(driver_id = driver.id, "Driver created");
        }
        Ok(created)
    }

    #[instrument(skip(self, changes, cancel))]
    pub async fn update(
        &self,
        id: u64,
        changes: &DriverUpdate,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<Driver>, ClassifiedError> {
        let request = ApiRequest::patch(format!("/drivers/{id}")).json(changes);
        call(&self.client, "driver.update", request, cancel, unwrap_data).await
    }

    #[instrument(skip(self, cancel))]
    pub async fn delete(
        &self,
        id: u64,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<()>, ClassifiedError> {
        let request = ApiRequest::delete(format!("/drivers/{id}"));
        call(&self.client, "driver.delete", Ok(request), cancel, unwrap_unit).await
    }

    /// Free-text driver search. Pair with a single-slot cancel scope so only
    /// the latest query's result is observed.
    #[instrument(skip(self, query, cancel), fields(query_len = query.len()))]
    pub async fn search(
        &self,
        query: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<Vec<Driver>>, ClassifiedError> {
        let request = ApiRequest::get("/drivers/search").query([("q", query)]);
        call(&self.client, "driver.search", Ok(request), cancel, unwrap_data).await
    }
}
