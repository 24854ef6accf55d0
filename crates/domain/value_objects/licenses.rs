use std::collections::BTreeMap;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LicenseTierName {
    Basic,
    Premium,
    Unlimited,
}

/// Which deliverables a license unlocks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LicenseFiles {
    #[serde(default)]
    pub mp3: bool,
    #[serde(default)]
    pub wav: bool,
    #[serde(default)]
    pub stems: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LicenseTier {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub files: LicenseFiles,
}

impl LicenseTier {
    pub fn new(name: &str, enabled: bool, price: f64) -> Self {
        Self {
            enabled,
            name: name.to_string(),
            price,
            files: LicenseFiles::default(),
        }
    }
}

/// Per-product license configuration, stored as JSONB on the product row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct LicenseSet(BTreeMap<LicenseTierName, LicenseTier>);

impl LicenseSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tier(mut self, name: LicenseTierName, tier: LicenseTier) -> Self {
        self.0.insert(name, tier);
        self
    }

    pub fn get(&self, name: LicenseTierName) -> Option<&LicenseTier> {
        self.0.get(&name)
    }

    pub fn enabled_tiers(&self) -> impl Iterator<Item = (&LicenseTierName, &LicenseTier)> {
        self.0.iter().filter(|(_, tier)| tier.enabled)
    }

    pub fn has_enabled_tier(&self) -> bool {
        self.enabled_tiers().next().is_some()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn from_json(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Tier prices must be finite and non-negative.
    pub fn validate_amounts(&self) -> Result<()> {
        for (name, tier) in &self.0 {
            if !tier.price.is_finite() || tier.price < 0.0 {
                bail!("Invalid license amount for {:?}: {}", name, tier.price);
            }
        }
        Ok(())
    }
}

/// Canonical price fields reduced from a [`LicenseSet`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedPricing {
    /// Starting price shown across the catalog.
    pub price_basic: f64,
    pub price_premium: Option<f64>,
    pub price_stems: Option<f64>,
    pub is_free: bool,
}

/// `price_basic` is the minimum price over enabled tiers. With no enabled tier the
/// product is priced at 0 and therefore free, which is indistinguishable from a
/// deliberately free product; callers that care must check
/// [`LicenseSet::has_enabled_tier`] themselves.
pub fn derive_pricing(licenses: &LicenseSet) -> DerivedPricing {
    let price_basic = licenses
        .enabled_tiers()
        .map(|(_, tier)| tier.price)
        .fold(None, |min: Option<f64>, price| match min {
            Some(current) if current <= price => Some(current),
            _ => Some(price),
        })
        .unwrap_or(0.0);

    let enabled_price = |name| {
        licenses
            .get(name)
            .filter(|tier| tier.enabled)
            .map(|tier| tier.price)
    };

    DerivedPricing {
        price_basic,
        price_premium: enabled_price(LicenseTierName::Premium),
        price_stems: enabled_price(LicenseTierName::Unlimited),
        is_free: price_basic == 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiers(basic: (bool, f64), premium: (bool, f64), unlimited: (bool, f64)) -> LicenseSet {
        LicenseSet::new()
            .with_tier(
                LicenseTierName::Basic,
                LicenseTier::new("Basic", basic.0, basic.1),
            )
            .with_tier(
                LicenseTierName::Premium,
                LicenseTier::new("Premium", premium.0, premium.1),
            )
            .with_tier(
                LicenseTierName::Unlimited,
                LicenseTier::new("Unlimited", unlimited.0, unlimited.1),
            )
    }

    #[test]
    fn starting_price_is_minimum_of_enabled_tiers() {
        let pricing = derive_pricing(&tiers((true, 29.95), (true, 49.95), (false, 99.95)));

        assert_eq!(pricing.price_basic, 29.95);
        assert!(!pricing.is_free);
        assert_eq!(pricing.price_premium, Some(49.95));
        assert_eq!(pricing.price_stems, None);
    }

    #[test]
    fn disabled_cheaper_tier_is_ignored() {
        let pricing = derive_pricing(&tiers((false, 5.0), (true, 49.95), (true, 99.95)));
        assert_eq!(pricing.price_basic, 49.95);
    }

    #[test]
    fn no_enabled_tier_falls_back_to_free() {
        let licenses = tiers((false, 29.95), (false, 49.95), (false, 99.95));
        let pricing = derive_pricing(&licenses);

        assert_eq!(pricing.price_basic, 0.0);
        assert!(pricing.is_free);
        assert!(!licenses.has_enabled_tier());
    }

    #[test]
    fn enabled_zero_price_tier_marks_product_free() {
        let pricing = derive_pricing(&tiers((true, 0.0), (true, 49.95), (false, 0.0)));
        assert!(pricing.is_free);
    }

    #[test]
    fn negative_or_nan_amounts_are_rejected() {
        assert!(tiers((true, -1.0), (false, 0.0), (false, 0.0)).validate_amounts().is_err());
        assert!(tiers((true, f64::NAN), (false, 0.0), (false, 0.0)).validate_amounts().is_err());
        assert!(tiers((true, 10.0), (false, 0.0), (false, 0.0)).validate_amounts().is_ok());
    }

    #[test]
    fn license_set_reads_frontend_json() {
        let json = serde_json::json!({
            "basic": { "enabled": true, "name": "Basic", "price": 24.99, "files": { "mp3": true } },
            "premium": { "enabled": false, "price": 49.99 }
        });
        let licenses = LicenseSet::from_json(json);

        let basic = licenses.get(LicenseTierName::Basic).unwrap();
        assert!(basic.files.mp3);
        assert!(!basic.files.wav);
        assert_eq!(derive_pricing(&licenses).price_basic, 24.99);
    }
}
