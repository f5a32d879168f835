use crate::core::io::Storage;
use anyhow::{Context, Result};
use std::sync::Arc;

pub const CREDENTIAL_KEY: &str = "gemini-api-key";

pub struct CredentialStore {
    storage: Arc<dyn Storage>,
    key: String,
}

impl CredentialStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_key(storage, CREDENTIAL_KEY)
    }

    pub fn with_key(storage: Arc<dyn Storage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// An empty stored value counts as absent.
    pub async fn load(&self) -> Result<Option<String>> {
        if !self.storage.exists(&self.key).await? {
            return Ok(None);
        }
        let bytes = self.storage.read(&self.key).await?;
        let secret = String::from_utf8(bytes).context("Stored API key is not valid UTF-8")?;
        let secret = secret.trim().to_string();
        Ok(if secret.is_empty() { None } else { Some(secret) })
    }

    pub async fn save(&self, secret: &str) -> Result<()> {
        self.storage
            .write(&self.key, secret.as_bytes())
            .await
            .context("Failed to save API key")?;
        log::info!("API key saved");
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        self.storage
            .delete(&self.key)
            .await
            .context("Failed to delete API key")?;
        log::info!("API key deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::{MemoryStorage, NativeStorage};

    #[tokio::test]
    async fn test_save_load_clear_in_memory() -> Result<()> {
        let storage = Arc::new(MemoryStorage::new());
        let store = CredentialStore::new(storage.clone());

        assert_eq!(store.load().await?, None);

        store.save("first").await?;
        store.save("second").await?;
        assert_eq!(store.load().await?, Some("second".to_string()));
        assert!(storage.exists(CREDENTIAL_KEY).await?);

        store.clear().await?;
        assert_eq!(store.load().await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_value_is_absent() -> Result<()> {
        let store = CredentialStore::new(Arc::new(MemoryStorage::new()));
        store.save("  ").await?;
        assert_eq!(store.load().await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_persists_across_store_instances_on_disk() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("data").join(CREDENTIAL_KEY);
        let path = path.to_str().unwrap().to_string();

        CredentialStore::with_key(Arc::new(NativeStorage::new()), &path)
            .save("secret-key")
            .await?;

        let reopened = CredentialStore::with_key(Arc::new(NativeStorage::new()), &path);
        assert_eq!(reopened.load().await?, Some("secret-key".to_string()));
        Ok(())
    }
}
