pub mod advertisements;
pub mod authorization;
pub mod enums;
pub mod iam;
pub mod packages;
pub mod places;
pub mod subscriptions;
