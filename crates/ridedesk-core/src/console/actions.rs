// ── Console writes ──
//
// One mutation per write the console can perform. Each declares the key
// groups it invalidates and publishes a notice when it settles. The
// notification actions patch the inbox optimistically instead.

use std::future::Future;

use ridedesk_api::models::{
    ApiMessage, CommissionInput, EntityId, Notification, Page, PasswordChange, PromoCodeInput,
    ServiceInput, VehicleInput,
};
use ridedesk_api::{ApiClient, Error};

use super::{Console, Notice};
use crate::keys;
use crate::mutation::{Mutation, MutationBuilder};
use crate::query::{KeyFilter, QueryClient, Transaction};

/// Input of [`Console::create_vehicle`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewVehicle {
    pub service_id: EntityId,
    pub input: VehicleInput,
}

/// Input of [`Console::assign_vehicle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleAssignment {
    pub vehicle_id: EntityId,
    pub driver_id: EntityId,
}

/// Input of the update mutations: which record, and its new fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Update<T> {
    pub id: EntityId,
    pub input: T,
}

impl Console {
    /// Start a mutation that calls `f` with a clone of the API client.
    fn mutation<I, F, Fut>(&self, f: F) -> MutationBuilder<I, ApiMessage>
    where
        I: Clone + Send + Sync + 'static,
        F: Fn(ApiClient, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ApiMessage, Error>> + Send + 'static,
    {
        let api = self.api().clone();
        Mutation::builder(self.queries(), move |input: I| f(api.clone(), input))
    }

    /// Attach success / failure notices and build.
    fn with_notices<I>(
        &self,
        builder: MutationBuilder<I, ApiMessage>,
        success: &'static str,
        failure: &'static str,
    ) -> Mutation<I, ApiMessage>
    where
        I: Clone + Send + Sync + 'static,
    {
        let ok = self.clone();
        let err = self.clone();
        builder
            .on_success(move |_, _, _| ok.notify(Notice::success(success)))
            .on_error(move |_, e, _| err.notify(Notice::error(format!("{failure}: {e}"))))
            .build()
    }

    // ── Drivers ──────────────────────────────────────────────────────

    pub fn approve_driver(&self) -> Mutation<EntityId, ApiMessage> {
        let b = self
            .mutation(|api, id: EntityId| async move { api.approve_driver(&id).await })
            .label("approve_driver")
            .invalidates(KeyFilter::resource(keys::DRIVERS));
        self.with_notices(b, "Driver approved successfully", "Failed to approve driver")
    }

    pub fn reject_driver(&self) -> Mutation<EntityId, ApiMessage> {
        let b = self
            .mutation(|api, id: EntityId| async move { api.reject_driver(&id).await })
            .label("reject_driver")
            .invalidates(KeyFilter::resource(keys::DRIVERS));
        self.with_notices(b, "Driver rejected successfully", "Failed to reject driver")
    }

    pub fn delete_driver(&self) -> Mutation<EntityId, ApiMessage> {
        let b = self
            .mutation(|api, id: EntityId| async move { api.delete_driver(&id).await })
            .label("delete_driver")
            .invalidates(KeyFilter::resource(keys::DRIVERS));
        self.with_notices(b, "Driver deleted successfully", "Failed to delete driver")
    }

    // ── Driver requests ──────────────────────────────────────────────

    pub fn approve_driver_request(&self) -> Mutation<EntityId, ApiMessage> {
        let b = self
            .mutation(|api, id: EntityId| async move { api.approve_driver_request(&id).await })
            .label("approve_driver_request")
            .invalidates(KeyFilter::resource(keys::DRIVER_REQUESTS))
            .invalidates(KeyFilter::resource(keys::DRIVERS));
        self.with_notices(b, "Request approved successfully", "Failed to approve request")
    }

    pub fn reject_driver_request(&self) -> Mutation<EntityId, ApiMessage> {
        let b = self
            .mutation(|api, id: EntityId| async move { api.reject_driver_request(&id).await })
            .label("reject_driver_request")
            .invalidates(KeyFilter::resource(keys::DRIVER_REQUESTS))
            .invalidates(KeyFilter::resource(keys::DRIVERS));
        self.with_notices(b, "Request rejected successfully", "Failed to reject request")
    }

    // ── Vehicles ─────────────────────────────────────────────────────

    pub fn create_vehicle(&self) -> Mutation<NewVehicle, ApiMessage> {
        let b = self
            .mutation(|api, v: NewVehicle| async move {
                api.create_vehicle(&v.service_id, &v.input).await
            })
            .label("create_vehicle")
            .validate(|v: &NewVehicle| v.input.validate())
            .invalidates(KeyFilter::resource(keys::TAXIS));
        self.with_notices(b, "Taxi created successfully", "Failed to create taxi")
    }

    pub fn assign_vehicle(&self) -> Mutation<VehicleAssignment, ApiMessage> {
        let b = self
            .mutation(|api, a: VehicleAssignment| async move {
                api.assign_vehicle(&a.vehicle_id, &a.driver_id).await
            })
            .label("assign_vehicle")
            .invalidates(KeyFilter::resource(keys::TAXIS));
        self.with_notices(b, "Taxi assigned successfully", "Failed to assign taxi")
    }

    pub fn delete_vehicle(&self) -> Mutation<EntityId, ApiMessage> {
        let b = self
            .mutation(|api, id: EntityId| async move { api.delete_vehicle(&id).await })
            .label("delete_vehicle")
            .invalidates(KeyFilter::resource(keys::TAXIS));
        self.with_notices(b, "Taxi deleted successfully", "Failed to delete taxi")
    }

    // ── Services ─────────────────────────────────────────────────────

    pub fn create_service(&self) -> Mutation<ServiceInput, ApiMessage> {
        let b = self
            .mutation(|api, input: ServiceInput| async move { api.create_service(&input).await })
            .label("create_service")
            .validate(ServiceInput::validate)
            .invalidates(KeyFilter::resource(keys::SERVICES))
            .invalidates(KeyFilter::resource(keys::SERVICES_LIST));
        self.with_notices(b, "Service created successfully", "Failed to create service")
    }

    pub fn update_service(&self) -> Mutation<Update<ServiceInput>, ApiMessage> {
        let b = self
            .mutation(|api, u: Update<ServiceInput>| async move {
                api.update_service(&u.id, &u.input).await
            })
            .label("update_service")
            .validate(|u: &Update<ServiceInput>| u.input.validate())
            .invalidates(KeyFilter::resource(keys::SERVICES))
            .invalidates(KeyFilter::resource(keys::SERVICES_LIST));
        self.with_notices(b, "Service updated successfully", "Failed to update service")
    }

    pub fn delete_service(&self) -> Mutation<EntityId, ApiMessage> {
        let b = self
            .mutation(|api, id: EntityId| async move { api.delete_service(&id).await })
            .label("delete_service")
            .invalidates(KeyFilter::resource(keys::SERVICES))
            .invalidates(KeyFilter::resource(keys::SERVICES_LIST));
        self.with_notices(b, "Service deleted successfully", "Failed to delete service")
    }

    // ── Promo codes ──────────────────────────────────────────────────

    pub fn create_promo_code(&self) -> Mutation<PromoCodeInput, ApiMessage> {
        let b = self
            .mutation(|api, input: PromoCodeInput| async move {
                api.create_promo_code(&input).await
            })
            .label("create_promo_code")
            .validate(PromoCodeInput::validate)
            .invalidates(KeyFilter::resource(keys::PROMO_CODES));
        self.with_notices(b, "Promo code created successfully", "Failed to create promo code")
    }

    pub fn update_promo_code(&self) -> Mutation<Update<PromoCodeInput>, ApiMessage> {
        let b = self
            .mutation(|api, u: Update<PromoCodeInput>| async move {
                api.update_promo_code(&u.id, &u.input).await
            })
            .label("update_promo_code")
            .validate(|u: &Update<PromoCodeInput>| u.input.validate())
            .invalidates(KeyFilter::resource(keys::PROMO_CODES));
        self.with_notices(b, "Promo code updated successfully", "Failed to update promo code")
    }

    pub fn delete_promo_code(&self) -> Mutation<EntityId, ApiMessage> {
        let b = self
            .mutation(|api, id: EntityId| async move { api.delete_promo_code(&id).await })
            .label("delete_promo_code")
            .invalidates(KeyFilter::resource(keys::PROMO_CODES));
        self.with_notices(b, "Promo code deleted successfully", "Failed to delete promo code")
    }

    // ── Commissions ──────────────────────────────────────────────────

    pub fn create_commission(&self) -> Mutation<CommissionInput, ApiMessage> {
        let b = self
            .mutation(|api, input: CommissionInput| async move {
                api.create_commission(&input).await
            })
            .label("create_commission")
            .validate(CommissionInput::validate)
            .invalidates(KeyFilter::resource(keys::COMMISSIONS));
        self.with_notices(b, "Commission created successfully", "Failed to create commission")
    }

    // ── Users ────────────────────────────────────────────────────────

    pub fn delete_user(&self) -> Mutation<EntityId, ApiMessage> {
        let b = self
            .mutation(|api, id: EntityId| async move { api.delete_user(&id).await })
            .label("delete_user")
            .invalidates(KeyFilter::resource(keys::USERS));
        self.with_notices(b, "User deleted successfully", "Failed to delete user")
    }

    // ── Notifications ────────────────────────────────────────────────

    pub fn mark_notification_read(&self) -> Mutation<EntityId, ApiMessage> {
        let b = self
            .mutation(|api, id: EntityId| async move { api.mark_notification_read(&id).await })
            .label("mark_notification_read")
            .on_mutate(|client, id| {
                patch_inbox(client, |items| {
                    for n in items.iter_mut().filter(|n| n.id == *id) {
                        n.is_read = true;
                    }
                })
            });
        self.with_notices(b, "Notification marked as read", "Failed to mark notification")
    }

    pub fn mark_all_notifications_read(&self) -> Mutation<(), ApiMessage> {
        let b = self
            .mutation(|api, (): ()| async move { api.mark_all_notifications_read().await })
            .label("mark_all_notifications_read")
            .on_mutate(|client, ()| {
                patch_inbox(client, |items| {
                    for n in items.iter_mut() {
                        n.is_read = true;
                    }
                })
            });
        self.with_notices(
            b,
            "All notifications marked as read",
            "Failed to mark notifications",
        )
    }

    pub fn delete_notification(&self) -> Mutation<EntityId, ApiMessage> {
        let b = self
            .mutation(|api, id: EntityId| async move { api.delete_notification(&id).await })
            .label("delete_notification")
            .on_mutate(|client, id| {
                patch_inbox(client, |items| items.retain(|n| n.id != *id))
            });
        self.with_notices(b, "Notification deleted", "Failed to delete notification")
    }

    // ── Account ──────────────────────────────────────────────────────

    pub fn change_password(&self) -> Mutation<PasswordChange, ApiMessage> {
        let b = self
            .mutation(|api, change: PasswordChange| async move {
                api.change_password(&change).await
            })
            .label("change_password")
            .validate(PasswordChange::validate);
        self.with_notices(b, "Password changed successfully", "Failed to change password")
    }
}

/// Optimistically edit the cached inbox. Keeps `total` in step with
/// removals.
fn patch_inbox(client: &QueryClient, f: impl FnOnce(&mut Vec<Notification>)) -> Transaction {
    let key = keys::notifications();
    let mut tx = client.begin(&KeyFilter::from(&key));
    tx.patch::<Page<Notification>, _>(&key, |page| {
        let before = page.items.len();
        f(&mut page.items);
        let removed = before.saturating_sub(page.items.len());
        page.total = page
            .total
            .saturating_sub(u64::try_from(removed).unwrap_or_default());
    });
    tx
}
