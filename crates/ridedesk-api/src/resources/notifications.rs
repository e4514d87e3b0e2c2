use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{ApiMessage, EntityId, Notification, Page};

impl ApiClient {
    /// `GET /api/notification?page=N`
    pub async fn list_notifications(&self, page: u32) -> Result<Page<Notification>, Error> {
        debug!(page, "listing notifications");
        self.get_page("api/notification", page, "notifications")
            .await
    }

    /// `PUT /api/notification/{id}/read`
    pub async fn mark_notification_read(&self, id: &EntityId) -> Result<ApiMessage, Error> {
        debug!(%id, "marking notification read");
        self.put_empty(&format!("api/notification/{id}/read"))
            .await
    }

    /// `PUT /api/notification/read-all`
    pub async fn mark_all_notifications_read(&self) -> Result<ApiMessage, Error> {
        debug!("marking all notifications read");
        self.put_empty("api/notification/read-all").await
    }

    /// `DELETE /api/notification/{id}`
    pub async fn delete_notification(&self, id: &EntityId) -> Result<ApiMessage, Error> {
        debug!(%id, "deleting notification");
        self.delete(&format!("api/notification/{id}")).await
    }
}
