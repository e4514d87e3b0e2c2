use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::common::Envelope;
use crate::models::{ApiMessage, Driver, EntityId, Page};

impl ApiClient {
    /// `GET /api/admin/drivers?page=N`
    pub async fn list_drivers(&self, page: u32) -> Result<Page<Driver>, Error> {
        debug!(page, "listing drivers");
        self.get_page("api/admin/drivers", page, "drivers").await
    }

    /// `GET /api/admin/drivers/{id}`
    pub async fn get_driver(&self, id: &EntityId) -> Result<Driver, Error> {
        debug!(%id, "fetching driver");
        let env: Envelope<Driver> = self.get(&format!("api/admin/drivers/{id}")).await?;
        Ok(env.data)
    }

    /// `PUT /api/admin/approved-driver/{id}`
    pub async fn approve_driver(&self, id: &EntityId) -> Result<ApiMessage, Error> {
        debug!(%id, "approving driver");
        self.put_empty(&format!("api/admin/approved-driver/{id}"))
            .await
    }

    /// `PUT /api/admin/reject-driver/{id}`
    pub async fn reject_driver(&self, id: &EntityId) -> Result<ApiMessage, Error> {
        debug!(%id, "rejecting driver");
        self.put_empty(&format!("api/admin/reject-driver/{id}"))
            .await
    }

    /// `DELETE /api/admin/drivers/{id}`
    pub async fn delete_driver(&self, id: &EntityId) -> Result<ApiMessage, Error> {
        debug!(%id, "deleting driver");
        self.delete(&format!("api/admin/drivers/{id}")).await
    }
}
