use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::{
    Rng,
    distributions::{Distribution, WeightedIndex},
};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::gift_cards::{GiftCardEntity, InsertGiftCardEntity};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GiftCardPrize {
    pub card_type: &'static str,
    pub label: &'static str,
    pub value: f64,
    /// `true` for a percent-off card, `false` for account credit in USD.
    pub is_discount: bool,
    pub weight: u32,
}

impl GiftCardPrize {
    pub fn to_entity(&self, owner_id: Uuid) -> InsertGiftCardEntity {
        InsertGiftCardEntity {
            owner_id,
            card_type: self.card_type.to_string(),
            label: self.label.to_string(),
            value: self.value,
            is_discount: self.is_discount,
        }
    }
}

pub const SPIN_PRIZES: [GiftCardPrize; 6] = [
    GiftCardPrize {
        card_type: "discount_5",
        label: "5% off your next beat",
        value: 5.0,
        is_discount: true,
        weight: 35,
    },
    GiftCardPrize {
        card_type: "discount_10",
        label: "10% off your next beat",
        value: 10.0,
        is_discount: true,
        weight: 25,
    },
    GiftCardPrize {
        card_type: "credit_1",
        label: "$1 store credit",
        value: 1.0,
        is_discount: false,
        weight: 20,
    },
    GiftCardPrize {
        card_type: "discount_20",
        label: "20% off your next beat",
        value: 20.0,
        is_discount: true,
        weight: 10,
    },
    GiftCardPrize {
        card_type: "credit_3",
        label: "$3 store credit",
        value: 3.0,
        is_discount: false,
        weight: 8,
    },
    GiftCardPrize {
        card_type: "credit_10",
        label: "$10 store credit",
        value: 10.0,
        is_discount: false,
        weight: 2,
    },
];

pub const WELCOME_PRIZE: GiftCardPrize = GiftCardPrize {
    card_type: "welcome",
    label: "Welcome gift: 15% off",
    value: 15.0,
    is_discount: true,
    weight: 1,
};

/// Month bucket used by the spin gate, e.g. `2024-06`.
pub fn spin_month_key(now: DateTime<Utc>) -> String {
    now.format("%Y-%m").to_string()
}

pub fn can_spin(last_spin_month: Option<&str>, now: DateTime<Utc>) -> bool {
    last_spin_month != Some(spin_month_key(now).as_str())
}

pub fn draw_prize<R: Rng + ?Sized>(rng: &mut R) -> Result<GiftCardPrize> {
    let weights = WeightedIndex::new(SPIN_PRIZES.iter().map(|prize| prize.weight))
        .context("gift_cards: invalid prize weights")?;
    Ok(SPIN_PRIZES[weights.sample(rng)])
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GiftCardDto {
    pub id: Uuid,
    pub card_type: String,
    pub label: String,
    pub value: f64,
    pub is_discount: bool,
    pub is_used: bool,
    pub created_at: DateTime<Utc>,
}

impl From<GiftCardEntity> for GiftCardDto {
    fn from(value: GiftCardEntity) -> Self {
        Self {
            id: value.id,
            card_type: value.card_type,
            label: value.label,
            value: value.value,
            is_discount: value.is_discount,
            is_used: value.is_used,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GiftCardsOverviewDto {
    pub cards: Vec<GiftCardDto>,
    pub can_spin: bool,
    pub welcome_claimed: bool,
}
