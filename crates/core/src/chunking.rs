use crate::error::ChunkError;
use crate::models::Chunk;
use crate::normalize::word_count;
use crate::sentences::SentenceSplitter;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CHUNK_WORDS: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// A chunk closes as soon as its running word count reaches this budget.
    pub target_words: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            target_words: DEFAULT_CHUNK_WORDS,
        }
    }
}

/// Splits normalized text into sentence-aligned chunks.
///
/// Sentences are never cut. Every chunk except the last holds at least
/// `target_words` whitespace-delimited words.
pub fn chunk_text(
    text: &str,
    splitter: &dyn SentenceSplitter,
    config: ChunkingConfig,
) -> Result<Vec<Chunk>, ChunkError> {
    let sentences = splitter.split(text);
    if sentences.is_empty() {
        return Err(ChunkError::NoSentences);
    }

    let chunks = group_sentences(&sentences, config.target_words);
    if chunks.is_empty() {
        return Err(ChunkError::NoChunks);
    }

    Ok(chunks)
}

fn group_sentences(sentences: &[String], target_words: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_words = 0usize;

    for sentence in sentences {
        current_words += word_count(sentence);
        current.push(sentence);

        if current_words >= target_words {
            chunks.push(close_chunk(chunks.len(), &current, current_words));
            current.clear();
            current_words = 0;
        }
    }

    if !current.is_empty() {
        chunks.push(close_chunk(chunks.len(), &current, current_words));
    }

    chunks
}

fn close_chunk(index: usize, sentences: &[&str], words: usize) -> Chunk {
    Chunk {
        index,
        text: sentences.join(" "),
        sentence_count: sentences.len(),
        word_count: words,
    }
}
