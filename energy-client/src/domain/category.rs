use std::{fmt, str::FromStr};

use super::DomainError;

/// Consumption category a reading is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Category {
    #[cfg_attr(feature = "serde", serde(rename = "HVAC"))]
    Hvac,
    Lighting,
    Renewable,
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [Category::Hvac, Category::Lighting, Category::Renewable, Category::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Hvac => "HVAC",
            Category::Lighting => "Lighting",
            Category::Renewable => "Renewable",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| DomainError::InvalidCategory(s.to_string()))
    }
}
