use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::advertisements;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = advertisements)]
pub struct AdvertisementEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub place_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = advertisements)]
pub struct InsertAdvertisementEntity {
    pub owner_id: Uuid,
    pub place_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
}

/// `place_id: Some(None)` clears the link to a place.
#[derive(Debug, Clone, Default, PartialEq, AsChangeset)]
#[diesel(table_name = advertisements)]
pub struct EditAdvertisementEntity {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub place_id: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
    pub end_date: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
