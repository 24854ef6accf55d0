use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CouponScope {
    #[default]
    All,
    Product,
    Category,
}

impl Display for CouponScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scope = match self {
            CouponScope::All => "all",
            CouponScope::Product => "product",
            CouponScope::Category => "category",
        };
        write!(f, "{}", scope)
    }
}

impl CouponScope {
    pub fn from_str(value: &str) -> Self {
        match value {
            "product" => CouponScope::Product,
            "category" => CouponScope::Category,
            _ => CouponScope::All,
        }
    }

    pub fn requires_target(&self) -> bool {
        !matches!(self, CouponScope::All)
    }
}
