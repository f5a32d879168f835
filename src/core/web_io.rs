use crate::core::io::Storage;
use anyhow::{anyhow, Result};
use async_trait::async_trait;

/// `window.localStorage` backed storage. Values must be UTF-8.
pub struct WebStorage {
    store: web_sys::Storage,
}

impl WebStorage {
    pub fn new() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| anyhow!("No window available"))?;
        let store = window
            .local_storage()
            .map_err(|e| anyhow!("localStorage error: {:?}", e))?
            .ok_or_else(|| anyhow!("localStorage is not available"))?;
        Ok(Self { store })
    }
}

#[async_trait(?Send)]
impl Storage for WebStorage {
    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let value = self
            .store
            .get_item(path)
            .map_err(|e| anyhow!("Get error: {:?}", e))?;

        match value {
            Some(v) => Ok(v.into_bytes()),
            None => Err(anyhow!("Key not found: {}", path)),
        }
    }

    async fn write(&self, path: &str, content: &[u8]) -> Result<()> {
        let value = std::str::from_utf8(content)?;
        self.store
            .set_item(path, value)
            .map_err(|e| anyhow!("Set error: {:?}", e))?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.store
            .remove_item(path)
            .map_err(|e| anyhow!("Remove error: {:?}", e))?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let value = self
            .store
            .get_item(path)
            .map_err(|e| anyhow!("Get error: {:?}", e))?;
        Ok(value.is_some())
    }
}
