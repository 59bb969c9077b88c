use crate::config::{StorageConfig, CONFIG};
use crate::service::storage::local::LocalStorage;
use crate::service::storage::s3::S3Storage;
use crate::service::storage::types::{PutObjectOptions, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::OnceCell;

pub mod local;
pub mod s3;
pub mod types;

#[async_trait]
pub trait Storage: Send + Sync {
    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        options: Option<PutObjectOptions<'_>>,
    ) -> StorageResult<()>;
    async fn get_object(&self, key: &str) -> StorageResult<Bytes>;
    async fn delete_object(&self, key: &str) -> StorageResult<()>;
    /// The URL clients can fetch the stored object from.
    fn public_url(&self, key: &str) -> String;
}

static STORAGE: OnceCell<Box<dyn Storage>> = OnceCell::const_new();

async fn initialize_storage() -> Box<dyn Storage> {
    let storage_config = &CONFIG.storage;
    new_storage(storage_config).await
}

pub async fn get_storage() -> &'static Box<dyn Storage> {
    STORAGE.get_or_init(initialize_storage).await
}

pub async fn new_storage(config: &StorageConfig) -> Box<dyn Storage> {
    match config.driver {
        crate::config::StorageDriver::Local => Box::new(LocalStorage::new(
            &config.local.root,
            &config.local.public_base,
        )),
        crate::config::StorageDriver::S3 => {
            if let Some(s3_config) = config.s3.as_ref() {
                Box::new(S3Storage::new(s3_config).await)
            } else {
                Box::new(LocalStorage::new(
                    &config.local.root,
                    &config.local.public_base,
                ))
            }
        }
    }
}
