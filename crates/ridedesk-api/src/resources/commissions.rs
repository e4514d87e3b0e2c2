use serde_json::Value;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::page::normalize_page;
use crate::models::{ApiMessage, CommissionHistory, CommissionInput};

impl ApiClient {
    /// Commission taken per ride, with the running total.
    ///
    /// `GET /api/admin/commission/history?page=N`
    pub async fn commission_history(&self, page: u32) -> Result<CommissionHistory, Error> {
        debug!(page, "fetching commission history");
        let body: Value = self
            .get_with_params("api/admin/commission/history", &[("page", page.to_string())])
            .await?;

        let total_commission = body
            .pointer("/data/totalCommission")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        let rides = normalize_page(body, "rides", page)?;

        Ok(CommissionHistory {
            rides,
            total_commission,
        })
    }

    /// `POST /api/admin/commission` with `{date, commission}`
    pub async fn create_commission(&self, input: &CommissionInput) -> Result<ApiMessage, Error> {
        debug!(date = %input.date, "creating commission");
        self.post("api/admin/commission", input).await
    }
}
