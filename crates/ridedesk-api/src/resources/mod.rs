// Endpoint groups, each an inherent `impl ApiClient` block.

mod account;
mod commissions;
mod dashboard;
mod driver_requests;
mod drivers;
mod notifications;
mod promo_codes;
mod rides;
mod services;
mod users;
mod vehicles;
