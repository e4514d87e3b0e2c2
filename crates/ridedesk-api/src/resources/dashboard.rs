use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::DashboardStats;
use crate::models::common::Envelope;

impl ApiClient {
    /// Headline counters and the monthly ride / revenue series.
    ///
    /// `GET /api/admin/dashboard/stats`
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, Error> {
        debug!("fetching dashboard stats");
        let env: Envelope<DashboardStats> = self.get("api/admin/dashboard/stats").await?;
        Ok(env.data)
    }
}
