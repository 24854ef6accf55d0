use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::{
        products::{InsertProductEntity, ProductEntity, UpdateProductEntity},
        users::ProducerSnippetEntity,
    },
    value_objects::{
        enums::{
            asset_slots::AssetSlot, discount_types::DiscountType, product_sorts::ProductSort,
            product_statuses::ProductStatus, product_types::ProductType, visibilities::Visibility,
        },
        licenses::{DerivedPricing, LicenseSet},
    },
};

pub const MAX_TAGS: usize = 5;
pub const UNTITLED_DRAFT_NAME: &str = "Untitled draft";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub nickname: Option<String>,
    pub product_type: Option<ProductType>,
    pub sort: ProductSort,
}

/// Raw catalog query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub nickname: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    pub sort: Option<String>,
}

impl ProductQuery {
    pub fn to_filter(&self) -> Result<ProductFilter> {
        let product_type = match non_blank(self.product_type.as_deref()) {
            Some(value) => match ProductType::from_str(value) {
                Some(product_type) => Some(product_type),
                None => bail!("Unknown product type: {}", value),
            },
            None => None,
        };

        let sort = match non_blank(self.sort.as_deref()) {
            Some(value) => match ProductSort::from_str(value) {
                Some(sort) => sort,
                None => bail!("Unknown sort: {}", value),
            },
            None => ProductSort::default(),
        };

        Ok(ProductFilter {
            nickname: non_blank(self.nickname.as_deref()).map(str::to_string),
            product_type,
            sort,
        })
    }
}

/// Storage references for each asset slot. Public slots hold URLs, restricted
/// slots hold bare storage paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AssetRefs {
    pub image_url: Option<String>,
    pub mp3_url: Option<String>,
    pub wav_url: Option<String>,
    pub stems_url: Option<String>,
}

impl AssetRefs {
    pub fn get(&self, slot: AssetSlot) -> Option<&str> {
        match slot {
            AssetSlot::Cover => self.image_url.as_deref(),
            AssetSlot::Mp3 => self.mp3_url.as_deref(),
            AssetSlot::Wav => self.wav_url.as_deref(),
            AssetSlot::Stems => self.stems_url.as_deref(),
        }
    }

    pub fn set(&mut self, slot: AssetSlot, reference: String) {
        let target = match slot {
            AssetSlot::Cover => &mut self.image_url,
            AssetSlot::Mp3 => &mut self.mp3_url,
            AssetSlot::Wav => &mut self.wav_url,
            AssetSlot::Stems => &mut self.stems_url,
        };
        *target = Some(reference);
    }
}

/// Metadata sent by the publish wizard.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductPayload {
    /// Set when editing an existing product.
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub product_type: Option<ProductType>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub tags: Vec<String>,
    pub bpm: Option<i32>,
    pub key: Option<String>,
    #[serde(default)]
    pub licenses: LicenseSet,
    pub price_exclusive: Option<f64>,
    pub discount_amount: Option<f64>,
    pub discount_type: Option<DiscountType>,
    /// References already stored for this product.
    #[serde(flatten)]
    pub assets: AssetRefs,
}

impl ProductPayload {
    /// Trimmed, non-empty tags in first-seen order, without repeats.
    pub fn normalized_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in self.tags.iter().map(|tag| tag.trim()) {
            if !tag.is_empty() && !tags.iter().any(|seen| seen == tag) {
                tags.push(tag.to_string());
            }
        }
        tags
    }

    /// Checks that apply to drafts and published products alike.
    pub fn validate_common(&self) -> Result<()> {
        if self.normalized_tags().len() > MAX_TAGS {
            bail!("A product can have at most {} tags", MAX_TAGS);
        }
        self.licenses.validate_amounts()?;
        if let Some(price) = self.price_exclusive {
            if !price.is_finite() || price < 0.0 {
                bail!("Invalid exclusive price: {}", price);
            }
        }
        if let Some(amount) = self.discount_amount {
            if !amount.is_finite() || amount < 0.0 {
                bail!("Invalid discount amount: {}", amount);
            }
            if self.discount_type == Some(DiscountType::Percent) && amount > 100.0 {
                bail!("Percent discount cannot exceed 100");
            }
        }
        Ok(())
    }

    pub fn validate_for_publish(&self) -> Result<()> {
        self.validate_common()?;
        if self.name.trim().is_empty() {
            bail!("Title is required");
        }
        if !matches!(self.bpm, Some(bpm) if bpm > 0) {
            bail!("BPM must be a positive number");
        }
        if !self.licenses.has_enabled_tier() {
            bail!("At least one license must be enabled to publish");
        }
        Ok(())
    }
}

/// The merged row handed to the product writer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub name: String,
    pub description: Option<String>,
    pub product_type: ProductType,
    pub status: ProductStatus,
    pub visibility: Visibility,
    pub tags: Vec<String>,
    pub bpm: Option<i32>,
    pub musical_key: Option<String>,
    pub assets: AssetRefs,
    pub licenses: LicenseSet,
    pub pricing: DerivedPricing,
    pub price_exclusive: Option<f64>,
    pub discount_amount: Option<f64>,
    pub discount_type: Option<DiscountType>,
}

impl ProductRecord {
    pub fn merge(
        payload: ProductPayload,
        assets: AssetRefs,
        pricing: DerivedPricing,
        status: ProductStatus,
    ) -> Self {
        let name = match payload.name.trim() {
            "" if status == ProductStatus::Draft => UNTITLED_DRAFT_NAME.to_string(),
            name => name.to_string(),
        };
        let tags = payload.normalized_tags();

        Self {
            name,
            description: payload.description,
            product_type: payload.product_type.unwrap_or_default(),
            status,
            visibility: payload.visibility,
            tags,
            bpm: payload.bpm,
            musical_key: payload.key,
            assets,
            licenses: payload.licenses,
            pricing,
            price_exclusive: payload.price_exclusive,
            discount_amount: payload.discount_amount,
            discount_type: payload.discount_type,
        }
    }

    pub fn to_insert_entity(&self, producer_id: Uuid) -> InsertProductEntity {
        InsertProductEntity {
            producer_id,
            name: self.name.clone(),
            description: self.description.clone(),
            product_type: self.product_type.to_string(),
            status: self.status.to_string(),
            visibility: self.visibility.to_string(),
            tags: self.tags.clone(),
            bpm: self.bpm,
            musical_key: self.musical_key.clone(),
            image_url: self.assets.image_url.clone(),
            mp3_url: self.assets.mp3_url.clone(),
            wav_url: self.assets.wav_url.clone(),
            stems_url: self.assets.stems_url.clone(),
            price_basic: self.pricing.price_basic,
            price_premium: self.pricing.price_premium,
            price_stems: self.pricing.price_stems,
            price_exclusive: self.price_exclusive,
            licenses: self.licenses.to_json(),
            is_free: self.pricing.is_free,
            discount_amount: self.discount_amount,
            discount_type: self.discount_type.map(|t| t.to_string()),
        }
    }

    pub fn to_update_entity(&self, now: DateTime<Utc>) -> UpdateProductEntity {
        UpdateProductEntity {
            name: self.name.clone(),
            description: self.description.clone(),
            product_type: self.product_type.to_string(),
            status: self.status.to_string(),
            visibility: self.visibility.to_string(),
            tags: self.tags.clone(),
            bpm: self.bpm,
            musical_key: self.musical_key.clone(),
            image_url: self.assets.image_url.clone(),
            mp3_url: self.assets.mp3_url.clone(),
            wav_url: self.assets.wav_url.clone(),
            stems_url: self.assets.stems_url.clone(),
            price_basic: self.pricing.price_basic,
            price_premium: self.pricing.price_premium,
            price_stems: self.pricing.price_stems,
            price_exclusive: self.price_exclusive,
            licenses: self.licenses.to_json(),
            is_free: self.pricing.is_free,
            discount_amount: self.discount_amount,
            discount_type: self.discount_type.map(|t| t.to_string()),
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProducerSnippetDto {
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<ProducerSnippetEntity> for ProducerSnippetDto {
    fn from(value: ProducerSnippetEntity) -> Self {
        Self {
            nickname: value.nickname,
            avatar_url: value.avatar_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductDto {
    pub id: Uuid,
    pub producer_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub product_type: ProductType,
    pub status: ProductStatus,
    pub visibility: Visibility,
    pub tags: Vec<String>,
    pub bpm: Option<i32>,
    pub key: Option<String>,
    pub image_url: Option<String>,
    pub mp3_url: Option<String>,
    pub price_basic: f64,
    pub price_premium: Option<f64>,
    pub price_stems: Option<f64>,
    pub price_exclusive: Option<f64>,
    pub licenses: LicenseSet,
    pub is_free: bool,
    pub discount_amount: Option<f64>,
    pub discount_type: Option<DiscountType>,
    pub play_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer: Option<ProducerSnippetDto>,
}

impl ProductDto {
    /// Restricted-bucket paths (`wav_url`, `stems_url`) are never exposed.
    pub fn from_entity(entity: ProductEntity, producer: Option<ProducerSnippetEntity>) -> Self {
        Self {
            id: entity.id,
            producer_id: entity.producer_id,
            name: entity.name,
            description: entity.description,
            product_type: ProductType::from_str(&entity.product_type).unwrap_or_default(),
            status: ProductStatus::from_str(&entity.status),
            visibility: Visibility::from_str(&entity.visibility),
            tags: entity.tags,
            bpm: entity.bpm,
            key: entity.musical_key,
            image_url: entity.image_url,
            mp3_url: entity.mp3_url,
            price_basic: entity.price_basic,
            price_premium: entity.price_premium,
            price_stems: entity.price_stems,
            price_exclusive: entity.price_exclusive,
            licenses: LicenseSet::from_json(entity.licenses),
            is_free: entity.is_free,
            discount_amount: entity.discount_amount,
            discount_type: entity.discount_type.as_deref().and_then(DiscountType::from_str),
            play_count: entity.play_count,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            producer: producer.map(ProducerSnippetDto::from),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::licenses::{
        LicenseTier, LicenseTierName, derive_pricing,
    };

    fn payload() -> ProductPayload {
        ProductPayload {
            name: "Night Drive".to_string(),
            bpm: Some(140),
            licenses: LicenseSet::new().with_tier(
                LicenseTierName::Basic,
                LicenseTier::new("Basic", true, 24.99),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn catalog_query_rejects_unknown_values() {
        let query = ProductQuery {
            nickname: Some("  ".to_string()),
            product_type: Some("drumkit".to_string()),
            sort: Some("price_desc".to_string()),
        };
        let filter = query.to_filter().unwrap();
        assert_eq!(filter.nickname, None);
        assert_eq!(filter.product_type, Some(ProductType::Drumkit));
        assert_eq!(filter.sort, ProductSort::PriceDesc);

        let bad_sort = ProductQuery {
            sort: Some("cheapest".to_string()),
            ..Default::default()
        };
        assert!(bad_sort.to_filter().is_err());

        let bad_type = ProductQuery {
            product_type: Some("vst".to_string()),
            ..Default::default()
        };
        assert!(bad_type.to_filter().is_err());
    }

    #[test]
    fn publish_requires_title_bpm_and_a_license() {
        assert!(payload().validate_for_publish().is_ok());

        let mut untitled = payload();
        untitled.name = "   ".to_string();
        assert!(untitled.validate_for_publish().is_err());

        let mut no_bpm = payload();
        no_bpm.bpm = Some(0);
        assert!(no_bpm.validate_for_publish().is_err());

        let mut unlicensed = payload();
        unlicensed.licenses = LicenseSet::new();
        assert!(unlicensed.validate_for_publish().is_err());
        assert!(unlicensed.validate_common().is_ok());

        let mut tagged = payload();
        tagged.tags = (0..6).map(|i| format!("tag{}", i)).collect();
        assert!(tagged.validate_common().is_err());
    }

    #[test]
    fn tags_are_stored_as_a_trimmed_set() {
        let mut repeated = payload();
        repeated.tags = vec![
            "trap".to_string(),
            "trap".to_string(),
            " trap ".to_string(),
            "".to_string(),
            "dark".to_string(),
        ];
        assert!(repeated.validate_common().is_ok());

        let pricing = derive_pricing(&repeated.licenses);
        let record = ProductRecord::merge(repeated, AssetRefs::default(), pricing, ProductStatus::Approved);
        assert_eq!(record.tags, vec!["trap".to_string(), "dark".to_string()]);

        let mut padded = payload();
        padded.tags = vec!["a", "b", "c", "d", "e", "  "]
            .into_iter()
            .map(String::from)
            .collect();
        assert!(padded.validate_common().is_ok());
    }

    #[test]
    fn drafts_without_title_get_a_placeholder() {
        let mut draft = payload();
        draft.name = String::new();
        let pricing = derive_pricing(&draft.licenses);

        let record = ProductRecord::merge(draft, AssetRefs::default(), pricing, ProductStatus::Draft);
        assert_eq!(record.name, UNTITLED_DRAFT_NAME);
        assert_eq!(record.product_type, ProductType::Beat);
    }

    #[test]
    fn insert_entity_carries_derived_pricing() {
        let payload = payload();
        let pricing = derive_pricing(&payload.licenses);
        let mut assets = AssetRefs::default();
        assets.set(AssetSlot::Cover, "https://cdn/cover.png".to_string());

        let record = ProductRecord::merge(payload, assets, pricing, ProductStatus::Approved);
        let entity = record.to_insert_entity(Uuid::new_v4());

        assert_eq!(entity.price_basic, 24.99);
        assert!(!entity.is_free);
        assert_eq!(entity.status, "approved");
        assert_eq!(entity.product_type, "beat");
        assert_eq!(entity.image_url.as_deref(), Some("https://cdn/cover.png"));
    }

    #[test]
    fn payload_reads_wizard_json() {
        let json = serde_json::json!({
            "name": "Night Drive",
            "bpm": 140,
            "key": "Am",
            "tags": ["trap", "dark"],
            "image_url": "https://cdn/old.png",
            "licenses": { "basic": { "enabled": true, "price": 24.99 } }
        });
        let payload: ProductPayload = serde_json::from_value(json).unwrap();

        assert_eq!(payload.key.as_deref(), Some("Am"));
        assert_eq!(payload.assets.get(AssetSlot::Cover), Some("https://cdn/old.png"));
        assert_eq!(payload.visibility, Visibility::Public);
    }
}
