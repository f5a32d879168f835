use thiserror::Error;

/// Per-character failures inside a batch run are folded into the aggregate
/// record and never surface as one of these.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("No characters with an image to process")]
    NoEligibleCharacters,

    #[error("A character lock run is already in progress")]
    RunAlreadyInProgress,

    #[error("No character lock has been generated yet")]
    NothingToExport,

    #[error(transparent)]
    Storage(anyhow::Error),
}

impl LockError {
    /// Message without the kind prefix, as stored in aggregate error records.
    pub fn detail(&self) -> String {
        match self {
            LockError::InvalidInput(msg) | LockError::Inference(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_strips_kind_prefix() {
        let err = LockError::Inference("timeout".to_string());
        assert_eq!(err.to_string(), "Inference error: timeout");
        assert_eq!(err.detail(), "timeout");
        assert_eq!(
            LockError::NoEligibleCharacters.detail(),
            "No characters with an image to process"
        );
    }
}
