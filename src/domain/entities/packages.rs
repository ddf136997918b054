use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::packages;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = packages)]
pub struct PackageEntity {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price_minor: i64,
    pub duration_days: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = packages)]
pub struct InsertPackageEntity {
    pub name: String,
    pub description: String,
    pub price_minor: i64,
    pub duration_days: i32,
}
