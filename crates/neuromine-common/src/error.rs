use thiserror::Error;

/// Error taxonomy shared by every pipeline stage.
///
/// Per-item variants (`Transport`, `Xml`, `Parse`, `MissingField`) are caught
/// by the stage loops and logged; `Config` is fatal.
#[derive(Debug, Error)]
pub enum NeuromineError {
    #[error("HTTP request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Network capabilities capped: {0}")]
    Sandbox(String),

    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Tabular file error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NeuromineError {
    /// True for errors that must stop the whole run rather than one item.
    pub fn is_fatal(&self) -> bool {
        matches!(self, NeuromineError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, NeuromineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_config_errors_are_fatal() {
        assert!(NeuromineError::Config("OPENAI_API_KEY not set".into()).is_fatal());
        assert!(!NeuromineError::Parse("not json".into()).is_fatal());
        assert!(!NeuromineError::MissingField("compound_name".into()).is_fatal());
    }

    #[test]
    fn test_display_includes_context() {
        let err = NeuromineError::MissingField("compound_name".into());
        assert_eq!(err.to_string(), "Missing required field: compound_name");
    }
}
