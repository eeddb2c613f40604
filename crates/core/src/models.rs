use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
    pub sentence_count: usize,
    pub word_count: usize,
}

/// Position and cosine score of the best candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub index: usize,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadReport {
    /// Hex sha256 of the normalized document text.
    pub document_id: String,
    pub chunk_count: usize,
    pub word_count: usize,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Answer {
    Sentence {
        text: String,
        chunk_index: usize,
        chunk_score: f64,
        sentence_score: f64,
    },
    /// No chunk scored above the confidence threshold.
    LowConfidence { best_score: f64 },
}

impl Answer {
    pub fn sentence(&self) -> Option<&str> {
        match self {
            Answer::Sentence { text, .. } => Some(text),
            Answer::LowConfidence { .. } => None,
        }
    }

    pub fn is_low_confidence(&self) -> bool {
        matches!(self, Answer::LowConfidence { .. })
    }
}
