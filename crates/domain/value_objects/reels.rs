use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::reels::{InsertReelEntity, ReelEntity, UpdateReelEntity};

pub const MIN_REEL_SECONDS: f64 = 10.0;

pub fn validate_trim(trim_start: f64, trim_end: f64) -> Result<()> {
    if !trim_start.is_finite() || !trim_end.is_finite() || trim_start < 0.0 {
        bail!("Trim start must be 0 or more");
    }
    if trim_end - trim_start < MIN_REEL_SECONDS {
        bail!("A reel must be at least {} seconds long", MIN_REEL_SECONDS);
    }
    Ok(())
}

/// Cloudinary public id of a delivery URL, e.g.
/// `https://res.cloudinary.com/demo/video/upload/v1712/reels/abc.mp4` -> `reels/abc`.
pub fn cloudinary_public_id(url: &str) -> Option<String> {
    let re = Regex::new(r"/upload/(?:v\d+/)?(.+?)\.[a-z0-9]+$").ok()?;
    re.captures(url)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().to_string())
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReelRequest {
    pub video_url: String,
    pub product_id: Option<Uuid>,
    pub title: Option<String>,
    #[serde(default)]
    pub trim_start: f64,
    pub trim_end: f64,
}

impl CreateReelRequest {
    pub fn to_entity(&self, owner_id: Uuid) -> Result<InsertReelEntity> {
        let video_url = self.video_url.trim();
        if video_url.is_empty() {
            bail!("video_url is required");
        }
        validate_trim(self.trim_start, self.trim_end)?;

        Ok(InsertReelEntity {
            owner_id,
            video_url: video_url.to_string(),
            product_id: self.product_id,
            title: self.title.clone(),
            trim_start: self.trim_start,
            trim_end: self.trim_end,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReelRequest {
    pub product_id: Option<Uuid>,
    pub title: Option<String>,
    pub trim_start: Option<f64>,
    pub trim_end: Option<f64>,
}

impl UpdateReelRequest {
    /// Applies the changes on top of the stored reel and re-checks the trim window.
    pub fn apply_to(&self, current: &ReelEntity, now: DateTime<Utc>) -> Result<UpdateReelEntity> {
        let trim_start = self.trim_start.unwrap_or(current.trim_start);
        let trim_end = self.trim_end.unwrap_or(current.trim_end);
        validate_trim(trim_start, trim_end)?;

        Ok(UpdateReelEntity {
            product_id: self.product_id.or(current.product_id),
            title: self.title.clone().or_else(|| current.title.clone()),
            trim_start,
            trim_end,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReelDto {
    pub id: Uuid,
    pub video_url: String,
    pub product_id: Option<Uuid>,
    pub title: Option<String>,
    pub trim_start: f64,
    pub trim_end: f64,
    pub created_at: DateTime<Utc>,
}

impl From<ReelEntity> for ReelDto {
    fn from(value: ReelEntity) -> Self {
        Self {
            id: value.id,
            video_url: value.video_url,
            product_id: value.product_id,
            title: value.title,
            trim_start: value.trim_start,
            trim_end: value.trim_end,
            created_at: value.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reels_must_last_ten_seconds() {
        assert!(validate_trim(0.0, 10.0).is_ok());
        assert!(validate_trim(5.0, 14.9).is_err());
        assert!(validate_trim(-1.0, 20.0).is_err());
        assert!(validate_trim(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn public_id_is_taken_from_the_upload_path() {
        assert_eq!(
            cloudinary_public_id("https://res.cloudinary.com/demo/video/upload/v1712345/reels/u1/clip.mp4")
                .as_deref(),
            Some("reels/u1/clip")
        );
        assert_eq!(
            cloudinary_public_id("https://res.cloudinary.com/demo/video/upload/clip.webm").as_deref(),
            Some("clip")
        );
        assert_eq!(cloudinary_public_id("https://example.com/clip.mp4"), None);
    }

    #[test]
    fn updates_recheck_the_trim_window() {
        let now = Utc::now();
        let reel = ReelEntity {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            video_url: "https://res.cloudinary.com/demo/video/upload/clip.mp4".to_string(),
            product_id: None,
            title: Some("Hook".to_string()),
            trim_start: 0.0,
            trim_end: 30.0,
            created_at: now,
            updated_at: now,
        };

        let shorter = UpdateReelRequest {
            trim_start: Some(25.0),
            ..Default::default()
        };
        assert!(shorter.apply_to(&reel, now).is_err());

        let retitled = UpdateReelRequest {
            title: Some("Drop".to_string()),
            ..Default::default()
        };
        let update = retitled.apply_to(&reel, now).unwrap();
        assert_eq!(update.title.as_deref(), Some("Drop"));
        assert_eq!(update.trim_end, 30.0);
    }
}
