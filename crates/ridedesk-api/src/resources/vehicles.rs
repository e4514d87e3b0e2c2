// Fleet ("taxi") endpoints.
//
// Listing lives under `/api/admin/vehicle`, writes under
// `/api/admin/services/...` since every vehicle belongs to a service.

use serde_json::Value;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::page::normalize_page;
use crate::models::vehicle::AssignVehicle;
use crate::models::{ApiMessage, EntityId, Page, Vehicle, VehicleInput};

impl ApiClient {
    /// `GET /api/admin/vehicle?page=N`
    pub async fn list_vehicles(&self, page: u32) -> Result<Page<Vehicle>, Error> {
        debug!(page, "listing vehicles");
        self.get_page("api/admin/vehicle", page, "vehicles").await
    }

    /// All vehicles registered under one service.
    ///
    /// `GET /api/service/vehicle/{serviceId}`
    pub async fn service_vehicles(&self, service_id: &EntityId) -> Result<Vec<Vehicle>, Error> {
        debug!(%service_id, "listing service vehicles");
        let body: Value = self
            .get(&format!("api/service/vehicle/{service_id}"))
            .await?;
        normalize_page(body, "vehicles", 1).map(|page| page.items)
    }

    /// `POST /api/admin/services/{serviceId}/vehicle`
    pub async fn create_vehicle(
        &self,
        service_id: &EntityId,
        input: &VehicleInput,
    ) -> Result<ApiMessage, Error> {
        debug!(%service_id, plate = %input.plate_number, "creating vehicle");
        self.post(&format!("api/admin/services/{service_id}/vehicle"), input)
            .await
    }

    /// Put a driver behind the wheel of a vehicle.
    ///
    /// `PUT /api/admin/services/vehicle/assign-vehicle` with
    /// `{vehicleId, driverId}`
    pub async fn assign_vehicle(
        &self,
        vehicle_id: &EntityId,
        driver_id: &EntityId,
    ) -> Result<ApiMessage, Error> {
        debug!(%vehicle_id, %driver_id, "assigning vehicle");
        self.put(
            "api/admin/services/vehicle/assign-vehicle",
            &AssignVehicle {
                vehicle_id,
                driver_id,
            },
        )
        .await
    }

    /// `DELETE /api/admin/services/vehicle/{id}`
    pub async fn delete_vehicle(&self, id: &EntityId) -> Result<ApiMessage, Error> {
        debug!(%id, "deleting vehicle");
        self.delete(&format!("api/admin/services/vehicle/{id}"))
            .await
    }
}
