use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
    Popular,
}

impl ProductSort {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "newest" => Some(ProductSort::Newest),
            "oldest" => Some(ProductSort::Oldest),
            "price_asc" => Some(ProductSort::PriceAsc),
            "price_desc" => Some(ProductSort::PriceDesc),
            "popular" => Some(ProductSort::Popular),
            _ => None,
        }
    }
}
