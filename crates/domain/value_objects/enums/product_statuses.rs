use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Draft,
    Approved,
}

impl Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            ProductStatus::Draft => "draft",
            ProductStatus::Approved => "approved",
        };
        write!(f, "{}", status)
    }
}

impl ProductStatus {
    pub fn from_str(value: &str) -> Self {
        match value {
            "approved" => ProductStatus::Approved,
            _ => ProductStatus::Draft,
        }
    }
}
