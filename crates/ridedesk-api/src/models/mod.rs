// Wire models for the admin API.
//
// Field names follow the backend's camelCase JSON via serde renames; ids
// are the Mongo-style `_id` strings wrapped in `EntityId`.

pub mod account;
pub mod commission;
pub mod common;
pub mod dashboard;
pub mod driver;
pub mod notification;
pub mod page;
pub mod promo_code;
pub mod ride;
pub mod service;
pub mod user;
pub mod vehicle;

pub use account::{AccountUser, LoginSession, OtpPurpose, PasswordChange};
pub use commission::{CommissionCharge, CommissionHistory, CommissionInput, CommissionRide};
pub use common::{ApiMessage, EntityId, HasId, Populated, UserRef, ValidationError};
pub use dashboard::{DashboardStats, MonthlyStat, Overview};
pub use driver::{Driver, DriverRequest, DriverStatus, with_status};
pub use notification::{Notification, unread_count};
pub use page::Page;
pub use promo_code::{PromoCode, PromoCodeInput, PromoStatus};
pub use ride::Ride;
pub use service::{Service, ServiceInput};
pub use user::{User, UserDetails};
pub use vehicle::{Vehicle, VehicleInput};
