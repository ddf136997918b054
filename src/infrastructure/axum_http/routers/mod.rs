pub mod advertisements;
pub mod auth;
pub mod packages;
pub mod places;
pub mod users;
