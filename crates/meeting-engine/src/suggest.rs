//! The external suggestion service (agenda items, improvement ideas).
//!
//! Its output is free text and never feeds back into scheduling decisions. Every
//! caller treats a failure as recoverable.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SuggestionError {
    #[error("suggestion service unavailable")]
    Unavailable,

    #[error("suggestion service failed: {0}")]
    Failed(String),
}

pub trait SuggestionService: Send + Sync {
    fn generate(&self, prompt: &str) -> std::result::Result<String, SuggestionError>;
}

/// A service that is never reachable; every soft path degrades to its
/// deterministic output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSuggestions;

impl SuggestionService for NoSuggestions {
    fn generate(&self, _prompt: &str) -> std::result::Result<String, SuggestionError> {
        Err(SuggestionError::Unavailable)
    }
}

/// Answers every prompt with the same text.
#[derive(Debug, Clone)]
pub struct FixedSuggestions(pub String);

impl FixedSuggestions {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

impl SuggestionService for FixedSuggestions {
    fn generate(&self, _prompt: &str) -> std::result::Result<String, SuggestionError> {
        Ok(self.0.clone())
    }
}

/// Split a comma-separated suggestion reply into trimmed, non-empty items.
pub fn split_suggestions(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_suggestions_trims_and_drops_empty() {
        let items = split_suggestions(" Review goals,  Demo ,, Next steps,");
        assert_eq!(items, vec!["Review goals", "Demo", "Next steps"]);
    }

    #[test]
    fn test_no_suggestions_is_unavailable() {
        assert_eq!(
            NoSuggestions.generate("anything"),
            Err(SuggestionError::Unavailable)
        );
    }
}
