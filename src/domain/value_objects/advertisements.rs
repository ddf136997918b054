use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::entities::advertisements::{
    AdvertisementEntity, EditAdvertisementEntity, InsertAdvertisementEntity,
};

pub const DEFAULT_AD_DURATION_DAYS: i64 = 30;

/// An advertisement row joined with its owner's username and, when linked,
/// the place name.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvertisementRecord {
    pub advertisement: AdvertisementEntity,
    pub owner_username: String,
    pub place_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdvertisementModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub place_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub place_name: Option<String>,
    pub user_name: String,
}

impl From<AdvertisementRecord> for AdvertisementModel {
    fn from(record: AdvertisementRecord) -> Self {
        let ad = record.advertisement;
        Self {
            id: ad.id,
            user_id: ad.owner_id,
            place_id: ad.place_id,
            title: ad.title,
            content: ad.content,
            image_url: ad.image_url,
            start_date: ad.start_date,
            end_date: ad.end_date,
            is_active: ad.is_active,
            created_at: ad.created_at,
            updated_at: ad.updated_at,
            place_name: record.place_name,
            user_name: record.owner_username,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdvertisementMessageEnvelope {
    pub message: String,
    pub advertisement: AdvertisementModel,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAdvertisementModel {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub place_id: Option<Uuid>,
    pub end_date: Option<String>,
}

impl CreateAdvertisementModel {
    pub fn to_entity(
        &self,
        owner_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<InsertAdvertisementEntity, String> {
        let title = required_text(self.title.as_deref(), "title")?;
        let content = required_text(self.content.as_deref(), "content")?;

        let end_date = match self.end_date.as_deref() {
            Some(raw) => parse_end_date(raw, now)?,
            None => now + Duration::days(DEFAULT_AD_DURATION_DAYS),
        };

        Ok(InsertAdvertisementEntity {
            owner_id,
            place_id: self.place_id,
            title,
            content,
            image_url: self.image_url.clone().unwrap_or_default(),
            start_date: now,
            end_date,
            is_active: true,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAdvertisementModel {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub place_id: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
    pub end_date: Option<String>,
}

impl UpdateAdvertisementModel {
    pub fn to_edit_entity(
        &self,
        current: &AdvertisementEntity,
        now: DateTime<Utc>,
    ) -> Result<EditAdvertisementEntity, String> {
        let end_date = self
            .end_date
            .as_deref()
            .map(|raw| parse_end_date(raw, current.start_date))
            .transpose()?;

        Ok(EditAdvertisementEntity {
            title: non_empty(self.title.as_deref()),
            content: non_empty(self.content.as_deref()),
            image_url: non_empty(self.image_url.as_deref()),
            place_id: self.place_id,
            is_active: self.is_active,
            end_date,
            updated_at: Some(now),
        })
    }

    pub fn place_id_to_link(&self) -> Option<Uuid> {
        self.place_id.flatten()
    }
}

/// `is_active` alone is not enough: the ad must also be inside its window.
pub fn is_publicly_visible(ad: &AdvertisementEntity, now: DateTime<Utc>) -> bool {
    ad.is_active && ad.start_date <= now && now <= ad.end_date
}

/// Accepts RFC 3339, or a naive date/datetime read as UTC.
pub fn parse_end_date(raw: &str, start_date: DateTime<Utc>) -> Result<DateTime<Utc>, String> {
    let end_date = parse_timestamp(raw.trim())
        .ok_or_else(|| format!("end_date '{}' is not a valid ISO-8601 timestamp", raw))?;
    if end_date <= start_date {
        return Err("end_date must be after start_date".to_string());
    }
    Ok(end_date)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn required_text(value: Option<&str>, field: &str) -> Result<String, String> {
    non_empty(value).ok_or_else(|| format!("{} is required", field))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
