pub mod place_categories;
pub mod place_statuses;
pub mod roles;
