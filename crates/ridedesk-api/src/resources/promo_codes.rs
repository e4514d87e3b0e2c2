use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{ApiMessage, EntityId, Page, PromoCode, PromoCodeInput};

impl ApiClient {
    /// `GET /api/admin/promo-codes?page=N`
    pub async fn list_promo_codes(&self, page: u32) -> Result<Page<PromoCode>, Error> {
        debug!(page, "listing promo codes");
        self.get_page("api/admin/promo-codes", page, "promoCodes")
            .await
    }

    /// `POST /api/admin/promo-codes`
    pub async fn create_promo_code(&self, input: &PromoCodeInput) -> Result<ApiMessage, Error> {
        debug!(value = input.discount_value, "creating promo code");
        self.post("api/admin/promo-codes", input).await
    }

    /// `PUT /api/admin/promo-codes/{id}`
    pub async fn update_promo_code(
        &self,
        id: &EntityId,
        input: &PromoCodeInput,
    ) -> Result<ApiMessage, Error> {
        debug!(%id, "updating promo code");
        self.put(&format!("api/admin/promo-codes/{id}"), input)
            .await
    }

    /// `DELETE /api/admin/promo-codes/{id}`
    pub async fn delete_promo_code(&self, id: &EntityId) -> Result<ApiMessage, Error> {
        debug!(%id, "deleting promo code");
        self.delete(&format!("api/admin/promo-codes/{id}")).await
    }
}
