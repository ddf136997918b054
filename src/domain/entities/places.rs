use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::places;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = places)]
pub struct PlaceEntity {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub address: String,
    pub phone: String,
    pub website: String,
    pub category: String,
    pub owner_id: Uuid,
    pub status: String,
    pub is_featured: bool,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = places)]
pub struct InsertPlaceEntity {
    pub name: String,
    pub description: String,
    pub address: String,
    pub phone: String,
    pub website: String,
    pub category: String,
    pub owner_id: Uuid,
    pub status: String,
    pub is_featured: bool,
    pub image_url: String,
}

/// `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, AsChangeset)]
#[diesel(table_name = places)]
pub struct EditPlaceEntity {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub status: Option<String>,
    pub is_featured: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}
