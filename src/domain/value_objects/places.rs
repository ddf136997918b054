use std::cmp::Reverse;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::places::{EditPlaceEntity, InsertPlaceEntity, PlaceEntity},
    value_objects::enums::{place_categories::PlaceCategory, place_statuses::PlaceStatus},
};

/// A place row joined with its owner's username.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceRecord {
    pub place: PlaceEntity,
    pub owner_username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaceModel {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub address: String,
    pub phone: String,
    pub website: String,
    pub category: PlaceCategory,
    pub owner_id: Uuid,
    pub owner: String,
    pub status: PlaceStatus,
    pub is_featured: bool,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PlaceRecord> for PlaceModel {
    type Error = anyhow::Error;

    fn try_from(record: PlaceRecord) -> Result<Self, Self::Error> {
        let place = record.place;
        let category = PlaceCategory::from_str(&place.category).map_err(|err| anyhow!(err))?;
        let status = PlaceStatus::from_str(&place.status).map_err(|err| anyhow!(err))?;
        Ok(Self {
            id: place.id,
            name: place.name,
            description: place.description,
            address: place.address,
            phone: place.phone,
            website: place.website,
            category,
            owner_id: place.owner_id,
            owner: record.owner_username,
            status,
            is_featured: place.is_featured,
            image_url: place.image_url,
            created_at: place.created_at,
            updated_at: place.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaceMessageEnvelope {
    pub message: String,
    pub place: PlaceModel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryModel {
    pub value: PlaceCategory,
    pub label: String,
}

pub fn categories() -> Vec<CategoryModel> {
    PlaceCategory::ALL
        .into_iter()
        .map(|category| CategoryModel {
            value: category,
            label: category.label().to_string(),
        })
        .collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePlaceModel {
    #[serde(default)]
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub image_url: Option<String>,
}

impl CreatePlaceModel {
    /// New places always start `pending` and not featured.
    pub fn to_entity(&self, owner_id: Uuid) -> Result<InsertPlaceEntity, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("name is required".to_string());
        }
        let category = self
            .category
            .as_deref()
            .ok_or_else(|| "category is required".to_string())
            .and_then(PlaceCategory::from_str)?;

        Ok(InsertPlaceEntity {
            name: name.to_string(),
            description: self.description.clone().unwrap_or_default(),
            address: self.address.clone().unwrap_or_default(),
            phone: self.phone.clone().unwrap_or_default(),
            website: self.website.clone().unwrap_or_default(),
            category: category.to_string(),
            owner_id,
            status: PlaceStatus::Pending.to_string(),
            is_featured: false,
            image_url: self.image_url.clone().unwrap_or_default(),
        })
    }
}

/// Request body for `PUT /places/:id`; split into the owner-mutable and
/// admin-only halves before authorization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePlaceModel {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub category: Option<PlaceCategory>,
    pub image_url: Option<String>,
    pub status: Option<PlaceStatus>,
    pub is_featured: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceOwnerPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub category: Option<PlaceCategory>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceModerationPatch {
    pub status: Option<PlaceStatus>,
    pub is_featured: Option<bool>,
}

impl PlaceModerationPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.is_featured.is_none()
    }
}

impl UpdatePlaceModel {
    pub fn split(self) -> (PlaceOwnerPatch, PlaceModerationPatch) {
        (
            PlaceOwnerPatch {
                name: self.name,
                description: self.description,
                address: self.address,
                phone: self.phone,
                website: self.website,
                category: self.category,
                image_url: self.image_url,
            },
            PlaceModerationPatch {
                status: self.status,
                is_featured: self.is_featured,
            },
        )
    }
}

pub fn to_edit_entity(
    owner_patch: PlaceOwnerPatch,
    moderation_patch: PlaceModerationPatch,
    now: DateTime<Utc>,
) -> Result<EditPlaceEntity, String> {
    if owner_patch
        .name
        .as_deref()
        .is_some_and(|name| name.trim().is_empty())
    {
        return Err("name must not be empty".to_string());
    }

    Ok(EditPlaceEntity {
        name: owner_patch.name.map(|name| name.trim().to_string()),
        description: owner_patch.description,
        address: owner_patch.address,
        phone: owner_patch.phone,
        website: owner_patch.website,
        category: owner_patch.category.map(|category| category.to_string()),
        image_url: owner_patch.image_url,
        status: moderation_patch.status.map(|status| status.to_string()),
        is_featured: moderation_patch.is_featured,
        updated_at: Some(now),
    })
}

/// Query string of `GET /places`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPlacesQuery {
    pub status: Option<PlaceStatus>,
    pub category: Option<PlaceCategory>,
    pub featured: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaceListFilter {
    pub status: PlaceStatus,
    pub category: Option<PlaceCategory>,
    pub featured: Option<bool>,
}

impl From<&ListPlacesQuery> for PlaceListFilter {
    fn from(query: &ListPlacesQuery) -> Self {
        Self {
            status: query.status.unwrap_or(PlaceStatus::Approved),
            category: query.category,
            // Only `featured=true` narrows the listing.
            featured: query.featured.filter(|featured| *featured),
        }
    }
}

/// Featured first, then newest first.
pub fn sort_for_listing(records: &mut [PlaceRecord]) {
    records.sort_by_key(|record| {
        (
            Reverse(record.place.is_featured),
            Reverse(record.place.created_at),
        )
    });
}
