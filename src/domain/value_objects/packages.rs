use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::packages::{InsertPackageEntity, PackageEntity};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageModel {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price_minor: i64,
    pub duration_days: i32,
    pub created_at: DateTime<Utc>,
}

impl From<PackageEntity> for PackageModel {
    fn from(entity: PackageEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            price_minor: entity.price_minor,
            duration_days: entity.duration_days,
            created_at: entity.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageMessageEnvelope {
    pub message: String,
    pub package: PackageModel,
}

/// One hundred years.
pub const MAX_PACKAGE_DURATION_DAYS: i32 = 36_500;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePackageModel {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub price_minor: Option<i64>,
    pub duration_days: Option<i32>,
}

impl CreatePackageModel {
    pub fn to_entity(&self) -> Result<InsertPackageEntity, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("name is required".to_string());
        }

        let price_minor = self.price_minor.ok_or("price_minor is required")?;
        if price_minor < 0 {
            return Err("price_minor must not be negative".to_string());
        }

        let duration_days = self.duration_days.ok_or("duration_days is required")?;
        if !(1..=MAX_PACKAGE_DURATION_DAYS).contains(&duration_days) {
            return Err(format!(
                "duration_days must be between 1 and {}",
                MAX_PACKAGE_DURATION_DAYS
            ));
        }

        Ok(InsertPackageEntity {
            name: name.to_string(),
            description: self.description.clone().unwrap_or_default(),
            price_minor,
            duration_days,
        })
    }
}
