use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{entities::users::UserEntity, value_objects::enums::user_plans::UserPlan};

pub const NICKNAME_MIN_LEN: usize = 3;
pub const NICKNAME_MAX_LEN: usize = 30;
pub const DISPLAY_NAME_MAX_LEN: usize = 60;
pub const BIO_MAX_LEN: usize = 500;

/// Lower-cases and checks a nickname: 3 to 30 characters of `[a-z0-9_.]`.
pub fn normalize_nickname(nickname: &str) -> Result<String> {
    let nickname = nickname.trim().to_lowercase();
    let len = nickname.chars().count();
    if !(NICKNAME_MIN_LEN..=NICKNAME_MAX_LEN).contains(&len) {
        bail!(
            "Nickname must be between {} and {} characters",
            NICKNAME_MIN_LEN,
            NICKNAME_MAX_LEN
        );
    }
    if !nickname
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.')
    {
        bail!("Nickname may only contain letters, digits, '_' and '.'");
    }
    Ok(nickname)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PublicProfileDto {
    pub id: Uuid,
    pub nickname: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<UserEntity> for PublicProfileDto {
    fn from(value: UserEntity) -> Self {
        Self {
            id: value.id,
            nickname: value.nickname,
            display_name: value.display_name,
            bio: value.bio,
            avatar_url: value.avatar_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CurrentUserDto {
    pub id: Uuid,
    pub nickname: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub plan: UserPlan,
    pub onboarding_completed: bool,
}

impl From<UserEntity> for CurrentUserDto {
    fn from(value: UserEntity) -> Self {
        Self {
            id: value.id,
            nickname: value.nickname,
            display_name: value.display_name,
            bio: value.bio,
            avatar_url: value.avatar_url,
            plan: UserPlan::from_str(&value.plan),
            onboarding_completed: value.onboarding_completed,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompleteProfileRequest {
    pub nickname: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
}

/// A validated profile update.
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteProfile {
    pub nickname: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
}

impl CompleteProfileRequest {
    pub fn validate(&self) -> Result<CompleteProfile> {
        let nickname = normalize_nickname(&self.nickname)?;
        let display_name = trimmed(self.display_name.as_deref());
        if display_name
            .as_ref()
            .is_some_and(|name| name.chars().count() > DISPLAY_NAME_MAX_LEN)
        {
            bail!("Display name is too long");
        }
        let bio = trimmed(self.bio.as_deref());
        if bio.as_ref().is_some_and(|bio| bio.chars().count() > BIO_MAX_LEN) {
            bail!("Bio is too long");
        }

        Ok(CompleteProfile {
            nickname,
            display_name,
            bio,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NicknameQuery {
    pub nickname: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NicknameAvailabilityDto {
    pub nickname: String,
    pub available: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CropArea {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvatarUploadRequest {
    /// Raw base64 or a `data:image/...;base64,` URL.
    pub image_base64: String,
    pub crop: Option<CropArea>,
    #[serde(default)]
    pub is_gif: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AvatarDto {
    pub avatar_url: String,
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nickname_is_lower_cased() {
        assert_eq!(normalize_nickname("  DJ.Nova_99 ").unwrap(), "dj.nova_99");
    }

    #[test]
    fn nickname_rules() {
        assert!(normalize_nickname("ab").is_err());
        assert!(normalize_nickname(&"a".repeat(31)).is_err());
        assert!(normalize_nickname("dj nova").is_err());
        assert!(normalize_nickname("dj-nova").is_err());
        assert!(normalize_nickname("ñandu").is_err());
        assert!(normalize_nickname(&"a".repeat(30)).is_ok());
    }

    #[test]
    fn blank_optional_fields_are_dropped() {
        let request = CompleteProfileRequest {
            nickname: "nova".to_string(),
            display_name: Some("   ".to_string()),
            bio: Some(" beats from Lima ".to_string()),
        };
        let profile = request.validate().unwrap();

        assert_eq!(profile.display_name, None);
        assert_eq!(profile.bio.as_deref(), Some("beats from Lima"));
    }
}
