use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    entities::coupons::{CouponEntity, InsertCouponEntity},
    value_objects::enums::{coupon_scopes::CouponScope, coupon_statuses::CouponStatus},
};

pub const COUPON_CODE_MIN_LEN: usize = 3;
pub const COUPON_CODE_MAX_LEN: usize = 32;

/// A coupon grants either a percentage or a fixed amount off, never both.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum CouponDiscount {
    Percent(i32),
    Amount(f64),
}

impl CouponDiscount {
    pub fn from_columns(percent: Option<i32>, amount: Option<f64>) -> Option<Self> {
        match (percent, amount) {
            (Some(percent), None) => Some(CouponDiscount::Percent(percent)),
            (None, Some(amount)) => Some(CouponDiscount::Amount(amount)),
            _ => None,
        }
    }

    pub fn percent(&self) -> Option<i32> {
        match self {
            CouponDiscount::Percent(percent) => Some(*percent),
            CouponDiscount::Amount(_) => None,
        }
    }

    pub fn amount(&self) -> Option<f64> {
        match self {
            CouponDiscount::Percent(_) => None,
            CouponDiscount::Amount(amount) => Some(*amount),
        }
    }

    /// Discount applied to `subtotal`, never more than the subtotal itself.
    pub fn apply_to(&self, subtotal: f64) -> f64 {
        let subtotal = subtotal.max(0.0);
        let discount = match self {
            CouponDiscount::Percent(percent) => subtotal * f64::from(*percent) / 100.0,
            CouponDiscount::Amount(amount) => *amount,
        };
        round_cents(discount.min(subtotal))
    }
}

pub fn coupon_status(
    valid_from: DateTime<Utc>,
    valid_to: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> CouponStatus {
    if valid_from > now {
        return CouponStatus::Scheduled;
    }
    match valid_to {
        Some(valid_to) if valid_to < now => CouponStatus::Expired,
        _ => CouponStatus::Active,
    }
}

pub fn normalize_coupon_code(code: &str) -> Result<String> {
    let code = code.trim().to_uppercase();
    let len = code.chars().count();
    if !(COUPON_CODE_MIN_LEN..=COUPON_CODE_MAX_LEN).contains(&len) {
        bail!(
            "Coupon code must be between {} and {} characters",
            COUPON_CODE_MIN_LEN,
            COUPON_CODE_MAX_LEN
        );
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        bail!("Coupon code may only contain letters, digits, '_' and '-'");
    }
    Ok(code)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CouponModel {
    pub id: Uuid,
    pub producer_id: Uuid,
    pub code: String,
    pub discount: CouponDiscount,
    pub scope: CouponScope,
    pub target_id: Option<String>,
    pub valid_from: DateTime<Utc>,
    pub valid_to: Option<DateTime<Utc>>,
    pub usage_limit: Option<i32>,
    /// Read-only here. Checkout does not apply coupons, so nothing in this
    /// service increments it; an external redemption flow owns the counter.
    pub used_count: i32,
    pub min_purchase: f64,
    pub status: CouponStatus,
    pub created_at: DateTime<Utc>,
}

impl CouponModel {
    /// Rows whose discount columns are inconsistent are skipped.
    pub fn from_entity(entity: CouponEntity, now: DateTime<Utc>) -> Option<Self> {
        let discount = CouponDiscount::from_columns(entity.discount_percent, entity.discount_amount)?;
        Some(Self {
            id: entity.id,
            producer_id: entity.producer_id,
            code: entity.code,
            discount,
            scope: CouponScope::from_str(&entity.scope),
            target_id: entity.target_id,
            valid_from: entity.valid_from,
            valid_to: entity.valid_to,
            usage_limit: entity.usage_limit,
            used_count: entity.used_count,
            min_purchase: entity.min_purchase,
            status: coupon_status(entity.valid_from, entity.valid_to, now),
            created_at: entity.created_at,
        })
    }

    /// Discount granted on a cart, or why the coupon does not apply.
    pub fn discount_for(&self, cart: &CouponCart, now: DateTime<Utc>) -> Result<f64, CouponRejection> {
        let status = coupon_status(self.valid_from, self.valid_to, now);
        if status != CouponStatus::Active {
            return Err(CouponRejection::NotActive(status));
        }
        if let Some(limit) = self.usage_limit {
            if self.used_count >= limit {
                return Err(CouponRejection::UsageLimitReached);
            }
        }
        if cart.subtotal < self.min_purchase {
            return Err(CouponRejection::BelowMinimum(self.min_purchase));
        }

        let target = self.target_id.as_deref();
        let in_scope = match self.scope {
            CouponScope::All => true,
            CouponScope::Product => {
                cart.product_id.map(|id| id.to_string()).as_deref() == target
            }
            CouponScope::Category => cart.category.as_deref() == target,
        };
        if !in_scope {
            return Err(CouponRejection::OutOfScope);
        }

        Ok(self.discount.apply_to(cart.subtotal))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CouponCart {
    pub subtotal: f64,
    pub product_id: Option<Uuid>,
    pub category: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum CouponRejection {
    #[error("Coupon is {0}")]
    NotActive(CouponStatus),
    #[error("Coupon usage limit reached")]
    UsageLimitReached,
    #[error("Minimum purchase of {0:.2} not reached")]
    BelowMinimum(f64),
    #[error("Coupon does not apply to this product")]
    OutOfScope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InsertCouponModel {
    pub code: String,
    pub percent: Option<i32>,
    pub amount: Option<f64>,
    #[serde(default)]
    pub scope: CouponScope,
    pub target_id: Option<String>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
    pub usage_limit: Option<i32>,
    pub min_purchase: Option<f64>,
}

impl InsertCouponModel {
    pub fn validate(&self, producer_id: Uuid, now: DateTime<Utc>) -> Result<InsertCouponEntity> {
        let code = normalize_coupon_code(&self.code)?;

        let discount = match CouponDiscount::from_columns(self.percent, self.amount) {
            Some(discount) => discount,
            None => bail!("Exactly one of percent or amount must be set"),
        };
        match discount {
            CouponDiscount::Percent(percent) if !(1..=100).contains(&percent) => {
                bail!("Percent must be between 1 and 100")
            }
            CouponDiscount::Amount(amount) if !amount.is_finite() || amount <= 0.0 => {
                bail!("Amount must be greater than 0")
            }
            _ => {}
        }

        let valid_from = self.valid_from.unwrap_or(now);
        if let Some(valid_to) = self.valid_to {
            if valid_to <= valid_from {
                bail!("valid_to must be after valid_from");
            }
        }

        if let Some(limit) = self.usage_limit {
            if limit <= 0 {
                bail!("usage_limit must be greater than 0");
            }
        }

        let min_purchase = self.min_purchase.unwrap_or(0.0);
        if !min_purchase.is_finite() || min_purchase < 0.0 {
            bail!("min_purchase must be 0 or more");
        }

        let target_id = self
            .target_id
            .as_deref()
            .map(str::trim)
            .filter(|target| !target.is_empty())
            .map(str::to_string);
        if self.scope.requires_target() && target_id.is_none() {
            bail!("A {} coupon needs a target_id", self.scope);
        }

        Ok(InsertCouponEntity {
            producer_id,
            code,
            discount_percent: discount.percent(),
            discount_amount: discount.amount(),
            scope: self.scope.to_string(),
            target_id: if self.scope.requires_target() { target_id } else { None },
            valid_from,
            valid_to: self.valid_to,
            usage_limit: self.usage_limit,
            min_purchase,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidateCouponRequest {
    pub producer_id: Uuid,
    pub code: String,
    pub subtotal: f64,
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CouponValidationDto {
    pub coupon_id: Uuid,
    pub code: String,
    pub discount: f64,
    pub total: f64,
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
