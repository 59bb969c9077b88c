use crate::config::S3StorageConfig;
use crate::service::storage::types::{PutObjectOptions, StorageError, StorageResult};
use crate::service::storage::Storage;
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{
    config::{Credentials, Region},
    Client, Config,
};
use bytes::Bytes;
use cyder_tools::log::info;

#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    region: String,
    endpoint: Option<String>,
    public_url: Option<String>,
}

impl S3Storage {
    pub async fn new(config: &S3StorageConfig) -> Self {
        let region_name = config
            .region
            .clone()
            .unwrap_or_else(|| "us-east-1".to_string());
        let region = Region::new(region_name.clone());
        let credentials = Credentials::new(
            config.access_key.clone().unwrap_or_default(),
            config.secret_key.clone().unwrap_or_default(),
            None,
            None,
            "default",
        );
        let mut s3_config_builder = Config::builder()
            .region(region)
            .credentials_provider(credentials)
            .behavior_version_latest();

        if let Some(endpoint) = &config.endpoint {
            s3_config_builder = s3_config_builder
                .endpoint_url(endpoint.as_str())
                .force_path_style(true);
        } else if config.force_path_style {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        let s3_config = s3_config_builder.build();
        let client = Client::from_conf(s3_config);
        info!("S3 storage initialized for bucket: {}", &config.bucket);
        Self {
            client,
            bucket: config.bucket.clone(),
            region: region_name,
            endpoint: config.endpoint.clone(),
            public_url: config.public_url.clone(),
        }
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        options: Option<PutObjectOptions<'_>>,
    ) -> StorageResult<()> {
        let stream = ByteStream::from(data);
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(stream);

        if let Some(content_type) = options.as_ref().and_then(|o| o.content_type) {
            request = request.content_type(content_type);
        }

        request
            .send()
            .await
            .map(|_| ())
            .map_err(|e| StorageError::Put(e.to_string()))
    }

    async fn get_object(&self, key: &str) -> StorageResult<Bytes> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Get(e.to_string()))?;

        let data = resp
            .body
            .collect()
            .await
            .map(|d| d.into_bytes())
            .map_err(|e| StorageError::Get(e.to_string()))?;
        Ok(data)
    }

    async fn delete_object(&self, key: &str) -> StorageResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| StorageError::Delete(e.to_string()))
    }

    fn public_url(&self, key: &str) -> String {
        if let Some(base) = &self.public_url {
            format!("{}/{}", base.trim_end_matches('/'), key)
        } else if let Some(endpoint) = &self.endpoint {
            format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }
}
