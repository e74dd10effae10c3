use anyhow::Context;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use axum::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Hosted image reference returned by the upload gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedMedia {
    pub public_id: String,
    pub url: String,
}

/// The media upload gateway. The registration flow only needs to push
/// bytes and get back a stable public reference.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> anyhow::Result<UploadedMedia>;
}

#[derive(Clone)]
pub struct MediaStorage {
    client: Client,
    bucket: String,
    endpoint: String,
}

impl MediaStorage {
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
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MediaStore for MediaStorage {
    async fn upload(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> anyhow::Result<UploadedMedia> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .context("s3 put_object")?;

        Ok(UploadedMedia {
            public_id: key.to_string(),
            url: format!("{}/{}/{}", self.endpoint, self.bucket, key),
        })
    }
}
