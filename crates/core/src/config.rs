use crate::chunking::{ChunkingConfig, DEFAULT_CHUNK_WORDS};
use crate::error::LoadError;
use serde::{Deserialize, Serialize};

/// Chunk scores at or below this value yield the fallback reply.
pub const DEFAULT_THRESHOLD: f64 = 0.15;

pub const DEFAULT_FALLBACK_MESSAGE: &str =
    "Sorry, I didn\u{2019}t understand your question. Do you want to connect with a live agent?";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerConfig {
    pub target_words: usize,
    pub threshold: f64,
    pub fallback_message: String,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            target_words: DEFAULT_CHUNK_WORDS,
            threshold: DEFAULT_THRESHOLD,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
        }
    }
}

impl AnswerConfig {
    pub fn chunking(&self) -> ChunkingConfig {
        ChunkingConfig {
            target_words: self.target_words,
        }
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        if self.target_words == 0 {
            return Err(LoadError::InvalidConfig(
                "target_words must be at least 1".to_string(),
            ));
        }

        if !self.threshold.is_finite() || !(-1.0..=1.0).contains(&self.threshold) {
            return Err(LoadError::InvalidConfig(format!(
                "threshold {} is outside [-1, 1]",
                self.threshold
            )));
        }

        if self.fallback_message.trim().is_empty() {
            return Err(LoadError::InvalidConfig(
                "fallback_message is empty".to_string(),
            ));
        }

        Ok(())
    }
}
