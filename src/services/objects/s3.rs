use super::{object_url, ObjectStore};
use crate::models::errors::AppError;
use crate::utils::config::AppConfig;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{
    config::{Credentials, Region},
    types::ObjectCannedAcl,
    Client as S3Client,
};
use axum::body::Bytes;
use tokio::sync::OnceCell;

pub struct S3ObjectStore {
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    region: Option<String>,
    bucket: Option<String>,
    acl: Option<ObjectCannedAcl>,
    client: OnceCell<S3Client>,
}

impl S3ObjectStore {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            access_key_id: config.aws_access_key_id.clone(),
            secret_access_key: config.aws_secret_access_key.clone(),
            region: config.aws_region.clone(),
            bucket: config.s3_bucket.clone(),
            acl: config.s3_object_acl.as_deref().map(ObjectCannedAcl::from),
            client: OnceCell::new(),
        }
    }

    fn required<'a>(value: &'a Option<String>, variable: &str) -> Result<&'a str, AppError> {
        value.as_deref().ok_or_else(|| AppError::missing_config(variable))
    }

    async fn client(&self) -> Result<&S3Client, AppError> {
        self.client
            .get_or_try_init(|| async {
                let access_key_id = Self::required(&self.access_key_id, "AWS_ACCESS_KEY_ID")?;
                let secret_access_key =
                    Self::required(&self.secret_access_key, "AWS_SECRET_ACCESS_KEY")?;
                let region = Self::required(&self.region, "AWS_REGION")?;

                let credentials = Credentials::new(
                    access_key_id,
                    secret_access_key,
                    None,
                    None,
                    "content-intake-config",
                );

                let config = aws_config::defaults(BehaviorVersion::latest())
                    .credentials_provider(credentials)
                    .region(Region::new(region.to_string()))
                    .load()
                    .await;

                tracing::info!("Initialized S3 client for region {}", region);
                Ok::<_, AppError>(S3Client::new(&config))
            })
            .await
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload(&self, key: &str, data: Bytes) -> Result<String, AppError> {
        let bucket = Self::required(&self.bucket, "AWS_S3_BUCKET_NAME")?;
        let region = Self::required(&self.region, "AWS_REGION")?;
        let client = self.client().await?;

        let size = data.len();
        client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data))
            .set_acl(self.acl.clone())
            .send()
            .await
            .map_err(|e| AppError::object_store_failed(DisplayErrorContext(&e).to_string()))?;

        tracing::debug!("Uploaded {} bytes to s3://{}/{}", size, bucket, key);
        Ok(object_url(bucket, region, key))
    }
}
