use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, timeout::TimeoutConfig};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    Client,
    config::{Region, StalledStreamProtectionConfig},
    error::{ProvideErrorMetadata, SdkError},
    primitives::ByteStream,
};
use http::Uri;

use crate::domain::{
    repositories::storage::AssetStorage, value_objects::enums::asset_slots::BucketKind,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
// Stems archives can take minutes on slow uplinks.
const READ_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct SupabaseStorageConfig {
    pub project_url: String,
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub public_bucket: String,
    pub secure_bucket: String,
}

/// Supabase Storage through its S3-compatible API:
/// https://supabase.com/docs/guides/storage/s3/compatibility
pub struct SupabaseStorageClient {
    client: Client,
    project_url: String,
    public_bucket: String,
    secure_bucket: String,
}

impl SupabaseStorageClient {
    pub async fn new(config: SupabaseStorageConfig) -> Result<Self> {
        let client = connect(&config)
            .await
            .context("failed to build Supabase s3 client")?;

        Ok(Self {
            client,
            project_url: config.project_url,
            public_bucket: config.public_bucket,
            secure_bucket: config.secure_bucket,
        })
    }
}

/// Supabase serves S3 under `{project}/storage/v1/s3` and wants path-style
/// addressing, so bucket names never land in the host.
fn s3_endpoint(endpoint: &str) -> Result<String> {
    let endpoint = format!("{}/", endpoint.trim_end_matches('/'));
    Uri::from_str(&endpoint).context("invalid Supabase s3 endpoint URL")?;
    Ok(endpoint)
}

async fn connect(config: &SupabaseStorageConfig) -> Result<Client> {
    let endpoint = s3_endpoint(&config.endpoint)?;
    let region = Region::new(config.region.clone());
    let credentials = Credentials::new(
        config.access_key.clone(),
        config.secret_key.clone(),
        None,
        None,
        "supabase-s3",
    );

    let shared = aws_config::defaults(BehaviorVersion::latest())
        .region(region.clone())
        .credentials_provider(credentials)
        .timeout_config(
            TimeoutConfig::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .read_timeout(READ_TIMEOUT)
                .build(),
        )
        .load()
        .await;

    let s3 = aws_sdk_s3::config::Builder::from(&shared)
        .endpoint_url(endpoint)
        .force_path_style(true)
        .region(region)
        .stalled_stream_protection(StalledStreamProtectionConfig::disabled())
        .build();

    Ok(Client::from_conf(s3))
}

#[async_trait]
impl AssetStorage for SupabaseStorageClient {
    fn bucket_name(&self, kind: BucketKind) -> String {
        match kind {
            BucketKind::Public => self.public_bucket.clone(),
            BucketKind::Secure => self.secure_bucket.clone(),
        }
    }

    async fn put_object(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(path)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|err| map_sdk_error(err, "upload object to", bucket, path))?;

        Ok(())
    }

    async fn delete_object(&self, bucket: &str, path: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(path)
            .send()
            .await
            .map_err(|err| map_sdk_error(err, "delete object from", bucket, path))?;

        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        public_object_url(&self.project_url, bucket, path)
    }
}

pub fn public_object_url(project_url: &str, bucket: &str, path: &str) -> String {
    format!(
        "{}/storage/v1/object/public/{}/{}",
        project_url.trim_end_matches('/'),
        bucket,
        path.trim_start_matches('/')
    )
}

fn map_sdk_error<E>(err: SdkError<E>, action: &str, bucket: &str, object_key: &str) -> anyhow::Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    if let SdkError::ServiceError(service_err) = &err {
        let raw = service_err.raw();
        let status = raw.status().as_u16();
        let code = service_err.err().code().unwrap_or("unknown");
        let message = service_err.err().message().unwrap_or_default();
        let body = raw
            .body()
            .bytes()
            .map(|b| String::from_utf8_lossy(b).trim().to_owned())
            .filter(|b| !b.is_empty())
            .unwrap_or_default();

        let mut detail = format!(
            "failed to {} Supabase Storage (status {}, code {})",
            action, status, code
        );

        if !message.is_empty() {
            detail.push_str(&format!(": {}", message));
        }

        detail.push_str(&format!(" [bucket={}, key={}]", bucket, object_key));

        if !body.is_empty() {
            let preview = body.chars().take(512).collect::<String>();
            detail.push_str(&format!("; body={}", preview));
        }

        return anyhow::anyhow!(detail);
    }

    anyhow::Error::new(err).context(format!("failed to {} Supabase Storage", action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::storage::object_path_from_reference;

    #[test]
    fn endpoint_gets_a_single_trailing_slash() {
        assert_eq!(
            s3_endpoint("https://abc.supabase.co/storage/v1/s3//").unwrap(),
            "https://abc.supabase.co/storage/v1/s3/"
        );
        assert!(s3_endpoint("https://abc supabase.co/storage/v1/s3").is_err());
    }

    #[test]
    fn public_url_round_trips_through_reference_parsing() {
        let url = public_object_url("https://abc.supabase.co/", "products", "u1/covers/1_art.png");

        assert_eq!(
            url,
            "https://abc.supabase.co/storage/v1/object/public/products/u1/covers/1_art.png"
        );
        assert_eq!(
            object_path_from_reference(&url, "products").as_deref(),
            Some("u1/covers/1_art.png")
        );
    }

    fn load_supabase_config_from_env() -> SupabaseStorageConfig {
        dotenvy::dotenv().ok();

        let project_url =
            std::env::var("SUPABASE_PROJECT_URL").expect("SUPABASE_PROJECT_URL is required");
        let endpoint = std::env::var("SUPABASE_S3_ENDPOINT").unwrap_or_else(|_| {
            format!("{}/storage/v1/s3", project_url.trim_end_matches('/'))
        });

        SupabaseStorageConfig {
            project_url,
            endpoint,
            region: std::env::var("SUPABASE_S3_REGION").expect("SUPABASE_S3_REGION is required"),
            access_key: std::env::var("SUPABASE_S3_ACCESS_KEY_ID")
                .expect("SUPABASE_S3_ACCESS_KEY_ID is required"),
            secret_key: std::env::var("SUPABASE_S3_SECRET_ACCESS_KEY")
                .expect("SUPABASE_S3_SECRET_ACCESS_KEY is required"),
            public_bucket: std::env::var("SUPABASE_PUBLIC_BUCKET")
                .unwrap_or_else(|_| "products".into()),
            secure_bucket: std::env::var("SUPABASE_SECURE_BUCKET")
                .unwrap_or_else(|_| "secure-products".into()),
        }
    }

    // Manual check: export the Supabase S3 credentials, then run:
    // cargo test -p offszn supabase_storage::tests::put_and_delete_object -- --ignored --nocapture
    #[tokio::test]
    #[ignore = "hits real Supabase Storage and needs credentials"]
    async fn put_and_delete_object() -> Result<()> {
        let client = SupabaseStorageClient::new(load_supabase_config_from_env()).await?;
        let bucket = client.bucket_name(BucketKind::Secure);
        let path = format!("manual-check/{}.txt", uuid::Uuid::new_v4());

        client
            .put_object(&bucket, &path, b"offszn".to_vec(), "text/plain")
            .await?;
        client.delete_object(&bucket, &path).await?;
        println!("uploaded and removed {}/{}", bucket, path);

        Ok(())
    }
}
