use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlaceStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl Display for PlaceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            PlaceStatus::Pending => "pending",
            PlaceStatus::Approved => "approved",
            PlaceStatus::Rejected => "rejected",
        };
        write!(f, "{}", status)
    }
}

impl FromStr for PlaceStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "pending" => Ok(PlaceStatus::Pending),
            "approved" => Ok(PlaceStatus::Approved),
            "rejected" => Ok(PlaceStatus::Rejected),
            other => Err(format!("Unsupported place status: {}", other)),
        }
    }
}
