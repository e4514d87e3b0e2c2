use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{ApiMessage, EntityId, Page, Service, ServiceInput};

impl ApiClient {
    /// `GET /api/service?page=N`
    pub async fn list_services(&self, page: u32) -> Result<Page<Service>, Error> {
        debug!(page, "listing services");
        self.get_page("api/service", page, "services").await
    }

    /// `POST /api/service/create`
    pub async fn create_service(&self, input: &ServiceInput) -> Result<ApiMessage, Error> {
        debug!(name = %input.name, "creating service");
        self.post("api/service/create", input).await
    }

    /// `PUT /api/service/services/{id}`
    pub async fn update_service(
        &self,
        id: &EntityId,
        input: &ServiceInput,
    ) -> Result<ApiMessage, Error> {
        debug!(%id, "updating service");
        self.put(&format!("api/service/services/{id}"), input).await
    }

    /// `DELETE /api/service/services/{id}`
    pub async fn delete_service(&self, id: &EntityId) -> Result<ApiMessage, Error> {
        debug!(%id, "deleting service");
        self.delete(&format!("api/service/services/{id}")).await
    }
}
