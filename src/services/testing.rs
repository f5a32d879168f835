use crate::services::llm::VisionClient;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub api_key: String,
    pub image: String,
    pub mime_type: String,
    pub prompt: String,
}

/// Scripted vision model keyed by image payload. Each call yields once before
/// answering so concurrent callers interleave.
#[derive(Debug, Default)]
pub struct MockVision {
    responses: HashMap<String, Result<String, String>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockVision {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, image: &str, response: Result<&str, &str>) -> Self {
        self.responses.insert(
            image.to_string(),
            response.map(str::to_string).map_err(str::to_string),
        );
        self
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<RecordedCall>>> {
        self.calls.clone()
    }

    pub fn max_in_flight(&self) -> Arc<AtomicUsize> {
        self.max_in_flight.clone()
    }
}

#[async_trait]
impl VisionClient for MockVision {
    async fn analyze_image(
        &self,
        api_key: &str,
        image_base64: &str,
        mime_type: &str,
        prompt: &str,
    ) -> Result<String> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        self.calls.lock().unwrap().push(RecordedCall {
            api_key: api_key.to_string(),
            image: image_base64.to_string(),
            mime_type: mime_type.to_string(),
            prompt: prompt.to_string(),
        });

        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.responses.get(image_base64) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(msg)) => Err(anyhow!("{}", msg)),
            None => Err(anyhow!("no scripted response for image {}", image_base64)),
        }
    }
}
