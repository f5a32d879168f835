use crate::core::error::LockError;
use crate::core::io::Storage;
use crate::core::lock::CharacterLock;
use crate::core::state::{Character, CharacterRegistry, CharacterUpdate, ImageData};
use crate::services::aggregator::BatchAggregator;
use crate::services::credential::CredentialStore;
use crate::services::inference::InferenceClient;
use std::sync::{Arc, Mutex, MutexGuard};

pub const DESCRIBING_PLACEHOLDER: &str = "Generating description...";

pub fn render_failure(err: &LockError) -> String {
    format!("Error: {}", err.detail())
}

/// One editing session: the character registry, the stored API key and the
/// most recent character lock.
///
/// The registry lock is never held across an await, so describing one
/// character and a batch run can interleave freely.
pub struct Studio {
    registry: Mutex<CharacterRegistry>,
    credentials: CredentialStore,
    inference: Arc<InferenceClient>,
    aggregator: BatchAggregator,
    last_lock: Mutex<Option<CharacterLock>>,
}

impl Studio {
    pub fn new(credentials: CredentialStore, inference: InferenceClient) -> Self {
        let inference = Arc::new(inference);
        Self {
            registry: Mutex::new(CharacterRegistry::new()),
            credentials,
            aggregator: BatchAggregator::new(inference.clone()),
            inference,
            last_lock: Mutex::new(None),
        }
    }

    fn registry(&self) -> MutexGuard<'_, CharacterRegistry> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }

    // --- Characters ---

    pub fn add_character(&self) -> Character {
        self.registry().add().clone()
    }

    pub fn update_character(&self, id: &str, update: CharacterUpdate) -> bool {
        self.registry().update(id, update)
    }

    pub fn remove_character(&self, id: &str) -> bool {
        self.registry().remove(id)
    }

    pub fn character(&self, id: &str) -> Option<Character> {
        self.registry().get(id).cloned()
    }

    pub fn characters(&self) -> Vec<Character> {
        self.registry().snapshot()
    }

    // --- Credential ---

    pub async fn credential(&self) -> Result<Option<String>, LockError> {
        self.credentials.load().await.map_err(LockError::Storage)
    }

    pub async fn save_credential(&self, secret: &str) -> Result<(), LockError> {
        self.credentials.save(secret).await.map_err(LockError::Storage)
    }

    pub async fn clear_credential(&self) -> Result<(), LockError> {
        self.credentials.clear().await.map_err(LockError::Storage)
    }

    pub async fn require_credential(&self) -> Result<String, LockError> {
        self.credential().await?.ok_or_else(|| {
            LockError::InvalidInput("Please save an API key before analysing".to_string())
        })
    }

    // --- Single character description ---

    /// A failed request is written into the description as `Error: ...`.
    pub async fn analyze_character(&self, id: &str) -> Result<(), LockError> {
        let image = self.character_image(id)?;
        let api_key = self.require_credential().await?;

        self.mark_analyzing(id);
        let description = self.describe(&api_key, &image).await;
        self.complete_analysis(id, description);
        Ok(())
    }

    pub fn character_image(&self, id: &str) -> Result<ImageData, LockError> {
        let registry = self.registry();
        let character = registry
            .get(id)
            .ok_or_else(|| LockError::InvalidInput(format!("Unknown character: {}", id)))?;
        character.usable_image().cloned().ok_or_else(|| {
            LockError::InvalidInput("Please upload an image before analysing".to_string())
        })
    }

    pub fn mark_analyzing(&self, id: &str) {
        self.registry()
            .update(id, CharacterUpdate::loading(DESCRIBING_PLACEHOLDER));
    }

    pub async fn describe(&self, api_key: &str, image: &ImageData) -> String {
        match self
            .inference
            .describe_character(api_key, &image.data, &image.mime_type)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Description failed: {}", e);
                render_failure(&e)
            }
        }
    }

    /// No-op when the character was removed while the request was in flight.
    pub fn complete_analysis(&self, id: &str, description: String) {
        self.registry()
            .update(id, CharacterUpdate::finished(description));
    }

    // --- Character lock ---

    pub fn is_generating(&self) -> bool {
        self.aggregator.is_running()
    }

    /// Runs a batch over the current characters. The previous lock is only
    /// replaced when the run succeeds.
    pub async fn generate_lock(&self) -> Result<CharacterLock, LockError> {
        let api_key = self.credential().await?;
        let snapshot = self.characters();

        let lock = self.aggregator.run(api_key.as_deref(), &snapshot).await?;

        *self.last_lock.lock().unwrap_or_else(|e| e.into_inner()) = Some(lock.clone());
        Ok(lock)
    }

    pub fn last_lock(&self) -> Option<CharacterLock> {
        self.last_lock.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn export_json(&self) -> Result<String, LockError> {
        let lock = self.last_lock().ok_or(LockError::NothingToExport)?;
        lock.to_pretty_json().map_err(LockError::Storage)
    }

    pub async fn export_lock(&self, storage: &dyn Storage, path: &str) -> Result<(), LockError> {
        let content = self.export_json()?;
        storage
            .write(path, content.as_bytes())
            .await
            .map_err(LockError::Storage)?;
        log::info!("Character lock exported to {}", path);
        Ok(())
    }
}
