use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Derived at read time from the validity window; never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CouponStatus {
    Scheduled,
    Active,
    Expired,
}

impl Display for CouponStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            CouponStatus::Scheduled => "scheduled",
            CouponStatus::Active => "active",
            CouponStatus::Expired => "expired",
        };
        write!(f, "{}", status)
    }
}
