pub mod advertisements;
pub mod packages;
pub mod places;
pub mod subscriptions;
pub mod users;
