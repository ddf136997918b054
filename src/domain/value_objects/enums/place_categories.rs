use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlaceCategory {
    Restaurant,
    Entertainment,
    Pharmacy,
    Hotel,
    Shopping,
    Hospital,
    GasStation,
    Bank,
    Other,
}

impl PlaceCategory {
    pub const ALL: [PlaceCategory; 9] = [
        PlaceCategory::Restaurant,
        PlaceCategory::Entertainment,
        PlaceCategory::Pharmacy,
        PlaceCategory::Hotel,
        PlaceCategory::Shopping,
        PlaceCategory::Hospital,
        PlaceCategory::GasStation,
        PlaceCategory::Bank,
        PlaceCategory::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PlaceCategory::Restaurant => "Restaurants & Cafes",
            PlaceCategory::Entertainment => "Entertainment",
            PlaceCategory::Pharmacy => "Pharmacies",
            PlaceCategory::Hotel => "Hotels",
            PlaceCategory::Shopping => "Shopping",
            PlaceCategory::Hospital => "Hospitals & Clinics",
            PlaceCategory::GasStation => "Gas Stations",
            PlaceCategory::Bank => "Banks",
            PlaceCategory::Other => "Other",
        }
    }
}

impl Display for PlaceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let category = match self {
            PlaceCategory::Restaurant => "restaurant",
            PlaceCategory::Entertainment => "entertainment",
            PlaceCategory::Pharmacy => "pharmacy",
            PlaceCategory::Hotel => "hotel",
            PlaceCategory::Shopping => "shopping",
            PlaceCategory::Hospital => "hospital",
            PlaceCategory::GasStation => "gas_station",
            PlaceCategory::Bank => "bank",
            PlaceCategory::Other => "other",
        };
        write!(f, "{}", category)
    }
}

impl FromStr for PlaceCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        PlaceCategory::ALL
            .into_iter()
            .find(|category| category.to_string() == value.to_lowercase())
            .ok_or_else(|| format!("Unsupported category: {}", value))
    }
}
