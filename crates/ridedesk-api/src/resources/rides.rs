use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Page, Ride};

impl ApiClient {
    /// Platform-wide trip history.
    ///
    /// `GET /api/driver/trip-history?page=N`
    pub async fn list_rides(&self, page: u32) -> Result<Page<Ride>, Error> {
        debug!(page, "listing rides");
        self.get_page("api/driver/trip-history", page, "rides")
            .await
    }
}
