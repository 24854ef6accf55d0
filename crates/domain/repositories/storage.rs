use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::enums::asset_slots::BucketKind;

#[async_trait]
#[automock]
pub trait AssetStorage {
    fn bucket_name(&self, kind: BucketKind) -> String;

    async fn put_object(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()>;

    async fn delete_object(&self, bucket: &str, path: &str) -> Result<()>;

    /// `{project_url}/storage/v1/object/public/{bucket}/{path}`
    fn public_url(&self, bucket: &str, path: &str) -> String;
}
