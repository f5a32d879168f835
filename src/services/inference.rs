use crate::core::error::LockError;
use crate::services::llm::VisionClient;
use crate::services::prompts::{describe_prompt, extract_prompt};

/// Inputs are checked before any network call.
#[derive(Debug)]
pub struct InferenceClient {
    vision: Box<dyn VisionClient>,
    language: String,
}

impl InferenceClient {
    pub fn new(vision: Box<dyn VisionClient>, language: impl Into<String>) -> Self {
        Self {
            vision,
            language: language.into(),
        }
    }

    pub async fn describe_character(
        &self,
        api_key: &str,
        image_base64: &str,
        mime_type: &str,
    ) -> Result<String, LockError> {
        check_inputs(api_key, image_base64, mime_type)?;

        let prompt = describe_prompt(&self.language);
        let text = self
            .vision
            .analyze_image(api_key, image_base64, mime_type, &prompt)
            .await
            .map_err(|e| {
                log::error!("Description request failed: {:#}", e);
                LockError::Inference(format!("{:#}", e))
            })?;

        Ok(text.trim().to_string())
    }

    pub async fn extract_character_profile(
        &self,
        api_key: &str,
        image_base64: &str,
        mime_type: &str,
    ) -> Result<String, LockError> {
        check_inputs(api_key, image_base64, mime_type)?;

        let text = self
            .vision
            .analyze_image(api_key, image_base64, mime_type, &extract_prompt())
            .await
            .map_err(|e| {
                log::error!("Profile request failed: {:#}", e);
                LockError::Inference(format!("{:#}", e))
            })?;

        Ok(strip_json_fence(&text))
    }
}

fn check_inputs(api_key: &str, image_base64: &str, mime_type: &str) -> Result<(), LockError> {
    if api_key.trim().is_empty() {
        return Err(LockError::InvalidInput(
            "Please provide an API key for the inference service".to_string(),
        ));
    }
    if image_base64.is_empty() || mime_type.is_empty() {
        return Err(LockError::InvalidInput(
            "Please upload an image to analyse".to_string(),
        ));
    }
    Ok(())
}

/// Drops a leading "```json" and a trailing "```" around a model answer.
pub fn strip_json_fence(s: &str) -> String {
    let mut s = s.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim().to_string()
}
