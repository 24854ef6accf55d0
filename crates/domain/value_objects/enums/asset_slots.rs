use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Which of the two storage buckets an asset lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketKind {
    /// Publicly readable (`products`).
    Public,
    /// Access-restricted (`secure-products`); served through signed URLs only.
    Secure,
}

/// Logical file slot of a product.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AssetSlot {
    Cover,
    Mp3,
    Wav,
    Stems,
}

impl AssetSlot {
    /// Upload order used by the publish pipeline.
    pub const ALL: [AssetSlot; 4] = [
        AssetSlot::Cover,
        AssetSlot::Mp3,
        AssetSlot::Wav,
        AssetSlot::Stems,
    ];

    pub fn bucket_kind(&self) -> BucketKind {
        match self {
            AssetSlot::Cover | AssetSlot::Mp3 => BucketKind::Public,
            AssetSlot::Wav | AssetSlot::Stems => BucketKind::Secure,
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            AssetSlot::Cover => "covers",
            AssetSlot::Mp3 => "mp3",
            AssetSlot::Wav => "wav",
            AssetSlot::Stems => "stems",
        }
    }

    pub fn from_field_name(value: &str) -> Option<Self> {
        match value {
            "cover" => Some(AssetSlot::Cover),
            "mp3" => Some(AssetSlot::Mp3),
            "wav" => Some(AssetSlot::Wav),
            "stems" => Some(AssetSlot::Stems),
            _ => None,
        }
    }
}

impl Display for AssetSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = match self {
            AssetSlot::Cover => "cover",
            AssetSlot::Mp3 => "mp3",
            AssetSlot::Wav => "wav",
            AssetSlot::Stems => "stems",
        };
        write!(f, "{}", slot)
    }
}
