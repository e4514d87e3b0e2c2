use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{ApiMessage, DriverRequest, EntityId, Page};

impl ApiClient {
    /// `GET /api/admin/driver-requests?page=N`
    pub async fn list_driver_requests(&self, page: u32) -> Result<Page<DriverRequest>, Error> {
        debug!(page, "listing driver requests");
        self.get_page("api/admin/driver-requests", page, "requests")
            .await
    }

    /// `PUT /api/admin/driver-requests/{id}/approve`
    pub async fn approve_driver_request(&self, id: &EntityId) -> Result<ApiMessage, Error> {
        debug!(%id, "approving driver request");
        self.put_empty(&format!("api/admin/driver-requests/{id}/approve"))
            .await
    }

    /// `PUT /api/admin/driver-requests/{id}/reject`
    pub async fn reject_driver_request(&self, id: &EntityId) -> Result<ApiMessage, Error> {
        debug!(%id, "rejecting driver request");
        self.put_empty(&format!("api/admin/driver-requests/{id}/reject"))
            .await
    }
}
