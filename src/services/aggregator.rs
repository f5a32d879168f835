use crate::core::error::LockError;
use crate::core::lock::{error_record, lock_key, profile_record, CharacterLock};
use crate::core::state::{Character, ImageData};
use crate::services::inference::InferenceClient;
#[cfg(not(target_arch = "wasm32"))]
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Characters are processed one at a time in snapshot order.
pub struct BatchAggregator {
    inference: Arc<InferenceClient>,
    running: AtomicBool,
}

struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, LockError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| LockError::RunAlreadyInProgress)?;
        Ok(Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl BatchAggregator {
    pub fn new(inference: Arc<InferenceClient>) -> Self {
        Self {
            inference,
            running: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub async fn run(
        &self,
        api_key: Option<&str>,
        characters: &[Character],
    ) -> Result<CharacterLock, LockError> {
        let _guard = RunGuard::acquire(&self.running)?;

        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| LockError::InvalidInput("Please save an API key first".to_string()))?;

        let eligible: Vec<(&Character, &ImageData)> = characters
            .iter()
            .filter_map(|c| c.usable_image().map(|img| (c, img)))
            .collect();

        if eligible.is_empty() {
            return Err(LockError::NoEligibleCharacters);
        }

        log::info!("Generating character lock for {} characters", eligible.len());

        #[cfg(not(target_arch = "wasm32"))]
        let pb = ProgressBar::new(eligible.len() as u64);
        #[cfg(not(target_arch = "wasm32"))]
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let mut lock = CharacterLock::new();
        let mut failures = 0;

        for (i, (character, image)) in eligible.into_iter().enumerate() {
            let key = lock_key(i + 1);
            #[cfg(not(target_arch = "wasm32"))]
            pb.set_message(character.name.clone());

            let record = match self.extract_record(api_key, &key, character, image).await {
                Ok(record) => record,
                Err(e) => {
                    log::warn!("Failed to build profile for {} ({}): {}", character.name, key, e);
                    failures += 1;
                    error_record(&key, &character.name, &e.detail())
                }
            };
            lock.insert(key, record);

            #[cfg(not(target_arch = "wasm32"))]
            pb.inc(1);
        }

        #[cfg(not(target_arch = "wasm32"))]
        pb.finish_with_message("Character lock complete");

        log::info!(
            "Character lock complete: {} entries, {} failed",
            lock.len(),
            failures
        );
        Ok(lock)
    }

    async fn extract_record(
        &self,
        api_key: &str,
        key: &str,
        character: &Character,
        image: &ImageData,
    ) -> Result<Map<String, Value>, LockError> {
        let raw = self
            .inference
            .extract_character_profile(api_key, &image.data, &image.mime_type)
            .await?;
        let fields = parse_profile(&raw)?;
        Ok(profile_record(key, &character.name, fields))
    }
}

/// The model's answer must be a single JSON object; its fields are not checked.
pub fn parse_profile(raw: &str) -> Result<Map<String, Value>, LockError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(LockError::Inference(
            "Model response is not a JSON object".to_string(),
        )),
        Err(e) => Err(LockError::Inference(format!(
            "Model response is not valid JSON: {}",
            e
        ))),
    }
}
