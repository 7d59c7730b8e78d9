use anyhow::Context;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    presigning::PresigningConfig,
    Client,
};
use async_trait::async_trait;
use time::{Duration as TimeDuration, OffsetDateTime};

/// A time-limited write capability for one object key. The expiry is baked
/// into the URL itself and does not depend on the request lifetime.
#[derive(Debug, Clone)]
pub struct PresignedUpload {
    pub url: String,
    pub expires_at: OffsetDateTime,
}

#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        seconds: u64,
    ) -> anyhow::Result<PresignedUpload>;
}

/// S3-compatible object storage (MinIO, R2, AWS) with static credentials
/// and path-style addressing. Issues capabilities only; owns no state.
#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
}

impl Storage {
    pub async fn new(
        endpoint: &str,
        bucket: &str,
        access_key: &str,
        secret_key: &str,
        region: &str,
    ) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(Credentials::new(
                access_key, secret_key, None, None, "static",
            ))
            .endpoint_url(endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: bucket.to_string(),
        })
    }
}

#[async_trait]
impl StorageClient for Storage {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        seconds: u64,
    ) -> anyhow::Result<PresignedUpload> {
        let req = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type);
        let presigned = req
            .presigned(PresigningConfig::expires_in(
                std::time::Duration::from_secs(seconds),
            )?)
            .await
            .context("s3 presign_put")?;
        Ok(PresignedUpload {
            url: presigned.uri().to_string(),
            expires_at: OffsetDateTime::now_utc() + TimeDuration::seconds(seconds as i64),
        })
    }
}
