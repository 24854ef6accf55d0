use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use offszn::{
    domain::{
        repositories::{storage::AssetStorage, users::UserRepository},
        value_objects::{
            enums::{asset_slots::BucketKind, user_plans::UserPlan},
            profiles::{AvatarDto, AvatarUploadRequest, CropArea},
            storage::object_path_from_reference,
        },
    },
    media::cloudinary_client::{
        CloudinaryClient, CloudinaryResource, CloudinaryUpload, avatar_delivery_url,
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CloudinaryGateway: Send + Sync {
    async fn upload(
        &self,
        file: &str,
        folder: &str,
        resource: CloudinaryResource,
    ) -> AnyResult<CloudinaryUpload>;

    async fn destroy(&self, public_id: &str, resource: CloudinaryResource) -> AnyResult<()>;

    fn avatar_url(&self, upload: &CloudinaryUpload, crop: Option<CropArea>) -> String;
}

#[async_trait]
impl CloudinaryGateway for CloudinaryClient {
    async fn upload(
        &self,
        file: &str,
        folder: &str,
        resource: CloudinaryResource,
    ) -> AnyResult<CloudinaryUpload> {
        self.upload(file, folder, resource, Utc::now().timestamp())
            .await
    }

    async fn destroy(&self, public_id: &str, resource: CloudinaryResource) -> AnyResult<()> {
        self.destroy(public_id, resource, Utc::now().timestamp())
            .await
    }

    fn avatar_url(&self, upload: &CloudinaryUpload, crop: Option<CropArea>) -> String {
        avatar_delivery_url(self.cloud_name(), upload, crop.as_ref())
    }
}

#[derive(Debug, Error)]
pub enum AvatarError {
    #[error("{0}")]
    InvalidImage(String),
    #[error("animated avatars require a pro plan")]
    GifRequiresPro,
    #[error("user not found")]
    UserNotFound,
    #[error("avatar upload failed")]
    UploadFailed,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AvatarError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AvatarError::InvalidImage(_) => StatusCode::BAD_REQUEST,
            AvatarError::GifRequiresPro => StatusCode::FORBIDDEN,
            AvatarError::UserNotFound => StatusCode::NOT_FOUND,
            AvatarError::UploadFailed => StatusCode::BAD_GATEWAY,
            AvatarError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, AvatarError>;

/// An image payload as a data URI plus its declared mime type.
#[derive(Debug, Clone, PartialEq)]
struct AvatarImage {
    data_uri: String,
    mime: String,
}

fn parse_avatar_image(raw: &str) -> UseCaseResult<AvatarImage> {
    let raw = raw.trim();
    let (mime, payload) = match raw.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| AvatarError::InvalidImage("Malformed data URI".to_string()))?;
            let mime = header
                .strip_suffix(";base64")
                .ok_or_else(|| AvatarError::InvalidImage("Image must be base64 encoded".to_string()))?;
            (mime.to_ascii_lowercase(), payload)
        }
        None => ("image/png".to_string(), raw),
    };

    if !mime.starts_with("image/") {
        return Err(AvatarError::InvalidImage(format!("Unsupported image type: {}", mime)));
    }

    let bytes = STANDARD
        .decode(payload)
        .map_err(|_| AvatarError::InvalidImage("Image is not valid base64".to_string()))?;
    if bytes.is_empty() {
        return Err(AvatarError::InvalidImage("Image is empty".to_string()));
    }

    Ok(AvatarImage {
        data_uri: format!("data:{};base64,{}", mime, payload),
        mime,
    })
}

pub struct AvatarUseCase<U, S, C>
where
    U: UserRepository + Send + Sync + 'static,
    S: AssetStorage + Send + Sync + 'static,
    C: CloudinaryGateway + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    storage: Arc<S>,
    cloudinary: Arc<C>,
}

impl<U, S, C> AvatarUseCase<U, S, C>
where
    U: UserRepository + Send + Sync + 'static,
    S: AssetStorage + Send + Sync + 'static,
    C: CloudinaryGateway + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, storage: Arc<S>, cloudinary: Arc<C>) -> Self {
        Self {
            user_repo,
            storage,
            cloudinary,
        }
    }

    pub async fn upload_avatar(
        &self,
        user_id: Uuid,
        request: AvatarUploadRequest,
    ) -> UseCaseResult<AvatarDto> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "avatars: failed to load user");
                AvatarError::Internal(err)
            })?
            .ok_or(AvatarError::UserNotFound)?;

        let image = parse_avatar_image(&request.image_base64)?;
        let is_gif = request.is_gif || image.mime == "image/gif";
        if is_gif && UserPlan::from_str(&user.plan) != UserPlan::Pro {
            return Err(AvatarError::GifRequiresPro);
        }

        let folder = format!("avatars/{}", user_id);
        let upload = self
            .cloudinary
            .upload(&image.data_uri, &folder, CloudinaryResource::Image)
            .await
            .map_err(|err| {
                error!(%user_id, error = ?err, "avatars: cloudinary upload failed");
                AvatarError::UploadFailed
            })?;

        let avatar_url = self.cloudinary.avatar_url(&upload, request.crop);

        self.user_repo
            .update_avatar(user_id, &avatar_url)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "avatars: failed to save avatar url");
                AvatarError::Internal(err)
            })?;

        if let Some(previous) = user.avatar_url.as_deref() {
            self.delete_stored_avatar(user_id, previous).await;
        }

        info!(%user_id, is_gif, "avatars: avatar updated");
        Ok(AvatarDto { avatar_url })
    }

    /// Only avatars kept in the public bucket are ours to delete.
    async fn delete_stored_avatar(&self, user_id: Uuid, previous: &str) {
        if !previous.starts_with("http") {
            return;
        }
        let bucket = self.storage.bucket_name(BucketKind::Public);
        let Some(path) = object_path_from_reference(previous, &bucket) else {
            return;
        };

        if let Err(err) = self.storage.delete_object(&bucket, &path).await {
            warn!(%user_id, %bucket, %path, error = ?err, "avatars: failed to delete previous avatar");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::profiles::tests::sample_user;
    use offszn::domain::repositories::{storage::MockAssetStorage, users::MockUserRepository};

    const PNG_B64: &str = "iVBORw0KGgo=";

    fn upload() -> CloudinaryUpload {
        CloudinaryUpload {
            public_id: "avatars/u/abc".to_string(),
            secure_url: "https://res.cloudinary.com/demo/image/upload/v1/avatars/u/abc.png".to_string(),
            version: Some(1),
            format: Some("png".to_string()),
        }
    }

    fn user_repo(user_id: Uuid, plan: &'static str, avatar_url: Option<&'static str>) -> MockUserRepository {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(move |_| {
            let mut user = sample_user(user_id, "producer");
            user.plan = plan.to_string();
            user.avatar_url = avatar_url.map(str::to_string);
            Box::pin(async move { Ok(Some(user)) })
        });
        repo
    }

    #[test]
    fn data_uri_and_raw_base64_are_accepted() {
        let image = parse_avatar_image(&format!("data:image/gif;base64,{PNG_B64}")).unwrap();
        assert_eq!(image.mime, "image/gif");

        let image = parse_avatar_image(PNG_B64).unwrap();
        assert_eq!(image.data_uri, format!("data:image/png;base64,{PNG_B64}"));

        assert!(parse_avatar_image("data:text/plain;base64,aGk=").is_err());
        assert!(parse_avatar_image("not base64 at all!").is_err());
    }

    #[tokio::test]
    async fn gif_avatar_on_free_plan_is_forbidden() {
        let user_id = Uuid::new_v4();
        let mut cloudinary = MockCloudinaryGateway::new();
        cloudinary.expect_upload().never();

        let usecase = AvatarUseCase::new(
            Arc::new(user_repo(user_id, "free", None)),
            Arc::new(MockAssetStorage::new()),
            Arc::new(cloudinary),
        );

        let err = usecase
            .upload_avatar(
                user_id,
                AvatarUploadRequest {
                    image_base64: format!("data:image/gif;base64,{PNG_B64}"),
                    crop: None,
                    is_gif: false,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AvatarError::GifRequiresPro));
    }

    #[tokio::test]
    async fn replaces_platform_stored_avatar() {
        let user_id = Uuid::new_v4();
        let mut repo = user_repo(
            user_id,
            "pro",
            Some("https://proj.supabase.co/storage/v1/object/public/products/avatars/old.png"),
        );
        repo.expect_update_avatar()
            .withf(|_, url| url.contains("c_crop,x_1,y_2,w_3,h_4/c_fill,w_400,h_400"))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let mut cloudinary = MockCloudinaryGateway::new();
        cloudinary
            .expect_upload()
            .withf(move |_, folder, resource| {
                folder == format!("avatars/{user_id}") && *resource == CloudinaryResource::Image
            })
            .returning(|_, _, _| Ok(upload()));
        cloudinary.expect_avatar_url().returning(|upload, crop| {
            avatar_delivery_url("demo", upload, crop.as_ref())
        });

        let mut storage = MockAssetStorage::new();
        storage
            .expect_bucket_name()
            .returning(|_| "products".to_string());
        storage
            .expect_delete_object()
            .withf(|bucket, path| bucket == "products" && path == "avatars/old.png")
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let usecase = AvatarUseCase::new(Arc::new(repo), Arc::new(storage), Arc::new(cloudinary));
        let avatar = usecase
            .upload_avatar(
                user_id,
                AvatarUploadRequest {
                    image_base64: PNG_B64.to_string(),
                    crop: Some(CropArea { x: 1, y: 2, width: 3, height: 4 }),
                    is_gif: false,
                },
            )
            .await
            .unwrap();

        assert!(avatar.avatar_url.starts_with("https://res.cloudinary.com/demo/"));
    }

    #[tokio::test]
    async fn cloudinary_avatars_are_left_alone() {
        let user_id = Uuid::new_v4();
        let mut repo = user_repo(
            user_id,
            "free",
            Some("https://res.cloudinary.com/demo/image/upload/v1/avatars/old.png"),
        );
        repo.expect_update_avatar()
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let mut cloudinary = MockCloudinaryGateway::new();
        cloudinary.expect_upload().returning(|_, _, _| Ok(upload()));
        cloudinary
            .expect_avatar_url()
            .returning(|upload, _| upload.secure_url.clone());

        let mut storage = MockAssetStorage::new();
        storage
            .expect_bucket_name()
            .returning(|_| "products".to_string());
        storage.expect_delete_object().never();

        let usecase = AvatarUseCase::new(Arc::new(repo), Arc::new(storage), Arc::new(cloudinary));
        usecase
            .upload_avatar(
                user_id,
                AvatarUploadRequest {
                    image_base64: PNG_B64.to_string(),
                    crop: None,
                    is_gif: false,
                },
            )
            .await
            .unwrap();
    }
}
