use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    #[default]
    Beat,
    Drumkit,
    Loopkit,
    Preset,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Beat => "beat",
            ProductType::Drumkit => "drumkit",
            ProductType::Loopkit => "loopkit",
            ProductType::Preset => "preset",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "beat" => Some(ProductType::Beat),
            "drumkit" => Some(ProductType::Drumkit),
            "loopkit" => Some(ProductType::Loopkit),
            "preset" => Some(ProductType::Preset),
            _ => None,
        }
    }
}

impl Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
