use crate::service::storage::types::{PutObjectOptions, StorageError, StorageResult};
use crate::service::storage::Storage;
use async_trait::async_trait;
use bytes::Bytes;
use cyder_tools::log::error;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
    public_base: String,
}

impl LocalStorage {
    pub fn new(root: &str, public_base: &str) -> Self {
        let root_path = Path::new(root);
        if !root_path.exists() {
            fs::create_dir_all(root_path).expect("Failed to create local storage directory");
        }
        Self {
            root: root_path.to_path_buf(),
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }

    fn get_full_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        _options: Option<PutObjectOptions<'_>>,
    ) -> StorageResult<()> {
        let full_path = self.get_full_path(key);
        if let Some(parent) = full_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    error!("Failed to create directory for local storage: {}", e);
                    StorageError::Put("Failed to create directory".to_string())
                })?;
            }
        }
        fs::write(&full_path, data)
            .map_err(|e| StorageError::Put(format!("Failed to write to file: {}", e)))
    }

    async fn get_object(&self, key: &str) -> StorageResult<Bytes> {
        let full_path = self.get_full_path(key);
        let data = fs::read(&full_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound
            } else {
                StorageError::Get(format!("Failed to read file: {}", e))
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn delete_object(&self, key: &str) -> StorageResult<()> {
        let full_path = self.get_full_path(key);
        fs::remove_file(full_path)
            .map_err(|e| StorageError::Delete(format!("Failed to delete file: {}", e)))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_local_storage_round_trip() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().to_str().unwrap(), "/files");
        let key = "41/ai_1700000000000.png";
        let data = Bytes::from_static(b"not really a png");

        storage.put_object(key, data.clone(), None).await.unwrap();

        let read_back = storage.get_object(key).await.unwrap();
        assert_eq!(read_back, data);
        assert_eq!(storage.public_url(key), "/files/41/ai_1700000000000.png");

        storage.delete_object(key).await.unwrap();
        assert!(matches!(
            storage.get_object(key).await,
            Err(StorageError::NotFound)
        ));
    }
}
