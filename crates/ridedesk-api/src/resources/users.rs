use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::common::Envelope;
use crate::models::{ApiMessage, EntityId, Page, User, UserDetails};

impl ApiClient {
    /// `GET /api/admin/users?page=N`
    pub async fn list_users(&self, page: u32) -> Result<Page<User>, Error> {
        debug!(page, "listing users");
        self.get_page("api/admin/users", page, "users").await
    }

    /// `GET /api/admin/users/{id}`
    pub async fn get_user(&self, id: &EntityId) -> Result<UserDetails, Error> {
        debug!(%id, "fetching user");
        let env: Envelope<UserDetails> = self.get(&format!("api/admin/users/{id}")).await?;
        Ok(env.data)
    }

    /// `DELETE /api/admin/users/{id}`
    pub async fn delete_user(&self, id: &EntityId) -> Result<ApiMessage, Error> {
        debug!(%id, "deleting user");
        self.delete(&format!("api/admin/users/{id}")).await
    }
}
