//! The console's key space.
//!
//! One tag per resource; paged screens add a `page` parameter and detail
//! screens an `id` parameter. Invalidation works on tags, so a mutation
//! that touches drivers refreshes every cached page of them.

use ridedesk_api::models::EntityId;

use crate::query::QueryKey;

pub const DASHBOARD_STATS: &str = "dashboardStats";
pub const DRIVERS: &str = "drivers";
pub const DRIVER: &str = "driver";
pub const DRIVER_REQUESTS: &str = "driverRequests";
pub const TAXIS: &str = "taxis";
pub const SERVICES: &str = "services";
pub const SERVICES_LIST: &str = "services-list";
pub const RIDES: &str = "rides";
pub const PROMO_CODES: &str = "promoCodes";
pub const COMMISSIONS: &str = "commissions";
pub const USERS: &str = "users";
pub const USER: &str = "user";
pub const NOTIFICATIONS: &str = "notifications";

fn paged(tag: &str, page: u32) -> QueryKey {
    QueryKey::new(tag).with("page", page)
}

pub fn dashboard_stats() -> QueryKey {
    QueryKey::new(DASHBOARD_STATS)
}

pub fn drivers(page: u32) -> QueryKey {
    paged(DRIVERS, page)
}

pub fn driver(id: &EntityId) -> QueryKey {
    QueryKey::new(DRIVER).with("id", id)
}

pub fn driver_requests(page: u32) -> QueryKey {
    paged(DRIVER_REQUESTS, page)
}

pub fn taxis(page: u32) -> QueryKey {
    paged(TAXIS, page)
}

pub fn services(page: u32) -> QueryKey {
    paged(SERVICES, page)
}

pub fn services_list() -> QueryKey {
    QueryKey::new(SERVICES_LIST)
}

pub fn rides(page: u32) -> QueryKey {
    paged(RIDES, page)
}

pub fn promo_codes(page: u32) -> QueryKey {
    paged(PROMO_CODES, page)
}

pub fn commissions(page: u32) -> QueryKey {
    paged(COMMISSIONS, page)
}

pub fn users(page: u32) -> QueryKey {
    paged(USERS, page)
}

pub fn user(id: &EntityId) -> QueryKey {
    QueryKey::new(USER).with("id", id)
}

pub fn notifications() -> QueryKey {
    QueryKey::new(NOTIFICATIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_render_like_the_screens_expect() {
        assert_eq!(drivers(1).to_string(), "drivers:page=1");
        assert_eq!(driver(&EntityId::from("d1")).to_string(), "driver:id=d1");
        assert_eq!(services_list().to_string(), "services-list");
        assert_eq!(notifications().to_string(), "notifications");
    }
}
