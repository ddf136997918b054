pub mod advertisements;
pub mod error;
pub mod iam;
pub mod packages;
pub mod places;
pub mod role_resolver;
