use crate::chunking::chunk_text;
use crate::config::AnswerConfig;
use crate::embeddings::Embedder;
use crate::error::{EmbeddingError, ExtractionError, QueryError, Result};
use crate::extractor::{is_pdf_path, DocumentSource};
use crate::messages::{query_reply, upload_reply};
use crate::models::{Answer, Chunk, LoadReport};
use crate::normalize::{normalize, require_content, word_count};
use crate::sentences::{SentenceSplitter, UnicodeSentenceSplitter};
use crate::similarity::best_match;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Chunks of the loaded document with their index-aligned embeddings.
#[derive(Debug, Clone)]
pub struct DocumentIndex {
    report: LoadReport,
    chunks: Vec<Chunk>,
    embeddings: Vec<Vec<f32>>,
}

impl DocumentIndex {
    pub fn new(
        report: LoadReport,
        chunks: Vec<Chunk>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self, EmbeddingError> {
        if chunks.len() != embeddings.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: chunks.len(),
                actual: embeddings.len(),
            });
        }

        Ok(Self {
            report,
            chunks,
            embeddings,
        })
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn embeddings(&self) -> &[Vec<f32>] {
        &self.embeddings
    }
}

/// Holds at most one loaded document and answers questions about it.
///
/// The loaded index is swapped in and out as a single `Arc`, so a query that
/// races a reload sees either the old document or the new one, never a mix.
pub struct Session<E, S = UnicodeSentenceSplitter> {
    embedder: E,
    splitter: S,
    config: AnswerConfig,
    current: RwLock<Option<Arc<DocumentIndex>>>,
}

impl<E: Embedder> Session<E> {
    pub fn with_embedder(embedder: E, config: AnswerConfig) -> Result<Self> {
        Self::new(embedder, UnicodeSentenceSplitter::default(), config)
    }
}

impl<E, S> Session<E, S>
where
    E: Embedder,
    S: SentenceSplitter,
{
    pub fn new(embedder: E, splitter: S, config: AnswerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            embedder,
            splitter,
            config,
            current: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &AnswerConfig {
        &self.config
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub fn has_document(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn current_document(&self) -> Option<Arc<DocumentIndex>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.replace(None);
    }

    /// Normalizes, chunks and embeds `raw_text`, replacing any loaded document.
    ///
    /// On failure the session is left with no document.
    pub fn load_document(&self, raw_text: &str) -> Result<LoadReport> {
        match self.build_index(raw_text) {
            Ok(index) => {
                let report = index.report().clone();
                info!(
                    document_id = %report.document_id,
                    chunks = report.chunk_count,
                    words = report.word_count,
                    "document loaded"
                );
                self.replace(Some(Arc::new(index)));
                Ok(report)
            }
            Err(error) => {
                warn!(error = %error, "document load failed, session cleared");
                self.replace(None);
                Err(error)
            }
        }
    }

    /// Extracts text from a PDF through `source` and loads it.
    ///
    /// A path without a `.pdf` extension is refused before anything else and
    /// leaves the current document in place.
    pub fn load_pdf<D>(&self, source: &D, path: &Path) -> Result<LoadReport>
    where
        D: DocumentSource + ?Sized,
    {
        if !is_pdf_path(path) {
            return Err(ExtractionError::UnsupportedFormat(path.display().to_string()).into());
        }

        match source.extract_raw_text(path) {
            Ok(raw_text) => self.load_document(&raw_text),
            Err(error) => {
                warn!(path = %path.display(), error = %error, "extraction failed, session cleared");
                self.replace(None);
                Err(error.into())
            }
        }
    }

    pub fn answer_query(&self, query: &str) -> Result<Answer, QueryError> {
        let document = self.current_document().ok_or(QueryError::NoDocumentLoaded)?;

        let query_embedding = self.embedder.embed(query)?;
        let chunk_match = best_match(&query_embedding, document.embeddings())?;
        debug!(
            chunk = chunk_match.index,
            score = chunk_match.score,
            threshold = self.config.threshold,
            "best chunk"
        );

        if chunk_match.score <= self.config.threshold {
            return Ok(Answer::LowConfidence {
                best_score: chunk_match.score,
            });
        }

        let chunk = &document.chunks()[chunk_match.index];
        let sentences = self.splitter.split(&chunk.text);
        if sentences.is_empty() {
            return Err(QueryError::NoSentencesInChunk);
        }
        debug!(chunk = chunk.index, sentences = ?sentences, "refining within chunk");

        let sentence_refs = sentences.iter().map(String::as_str).collect::<Vec<_>>();
        let sentence_embeddings = self.embedder.embed_batch(&sentence_refs)?;
        if sentence_embeddings.len() != sentences.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: sentences.len(),
                actual: sentence_embeddings.len(),
            }
            .into());
        }

        let sentence_match = best_match(&query_embedding, &sentence_embeddings)?;
        debug!(
            sentence = sentence_match.index,
            score = sentence_match.score,
            "best sentence"
        );

        Ok(Answer::Sentence {
            text: sentences[sentence_match.index].clone(),
            chunk_index: chunk.index,
            chunk_score: chunk_match.score,
            sentence_score: sentence_match.score,
        })
    }

    pub fn respond_to_upload(&self, raw_text: &str) -> String {
        upload_reply(&self.load_document(raw_text))
    }

    pub fn respond_to_pdf<D>(&self, source: &D, path: &Path) -> String
    where
        D: DocumentSource + ?Sized,
    {
        upload_reply(&self.load_pdf(source, path))
    }

    pub fn respond_to_query(&self, query: &str) -> String {
        query_reply(&self.answer_query(query), &self.config.fallback_message)
    }

    fn build_index(&self, raw_text: &str) -> Result<DocumentIndex> {
        require_content(raw_text)?;
        let normalized = normalize(raw_text);
        let chunks = chunk_text(&normalized, &self.splitter, self.config.chunking())?;

        let texts = chunks
            .iter()
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>();
        let embeddings = self.embedder.embed_batch(&texts)?;

        let report = LoadReport {
            document_id: digest_text(&normalized),
            chunk_count: chunks.len(),
            word_count: word_count(&normalized),
            loaded_at: Utc::now(),
        };

        Ok(DocumentIndex::new(report, chunks, embeddings)?)
    }

    fn replace(&self, next: Option<Arc<DocumentIndex>>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

fn digest_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_FALLBACK_MESSAGE;
    use crate::embeddings::CharacterNgramEmbedder;
    use crate::error::{ChunkError, LoadError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PARIS: &str =
        "Paris is the capital of France. It has a population of over two million.";

    /// Counts vocabulary words, one dimension per word.
    struct KeywordEmbedder {
        vocabulary: Vec<&'static str>,
        fail_on: Option<&'static str>,
    }

    impl KeywordEmbedder {
        fn new(vocabulary: &[&'static str]) -> Self {
            Self {
                vocabulary: vocabulary.to_vec(),
                fail_on: None,
            }
        }
    }

    impl Embedder for KeywordEmbedder {
        fn dimensions(&self) -> usize {
            self.vocabulary.len()
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            if self.fail_on.is_some_and(|trigger| text.contains(trigger)) {
                return Err(EmbeddingError::Unavailable("model offline".to_string()));
            }

            let tokens = text
                .split(|ch: char| !ch.is_alphanumeric())
                .filter(|token| !token.is_empty())
                .map(|token| token.to_lowercase())
                .collect::<Vec<_>>();

            Ok(self
                .vocabulary
                .iter()
                .map(|word| tokens.iter().filter(|token| token == word).count() as f32)
                .collect())
        }
    }

    /// Yields the whole text as one sentence on the first call and nothing afterwards.
    struct OneShotSplitter {
        calls: AtomicUsize,
    }

    impl SentenceSplitter for OneShotSplitter {
        fn split(&self, text: &str) -> Vec<String> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                vec![text.to_string()]
            } else {
                Vec::new()
            }
        }
    }

    struct FixedSource(&'static str);

    impl DocumentSource for FixedSource {
        fn extract_raw_text(&self, _path: &Path) -> Result<String, ExtractionError> {
            if self.0.trim().is_empty() {
                Err(ExtractionError::NoExtractableText)
            } else {
                Ok(self.0.to_string())
            }
        }
    }

    fn paris_session() -> Session<KeywordEmbedder> {
        let embedder = KeywordEmbedder::new(&[
            "capital",
            "france",
            "paris",
            "population",
            "million",
            "weather",
        ]);
        Session::with_embedder(embedder, AnswerConfig::default())
            .expect("default config is valid")
    }

    #[test]
    fn answers_with_best_sentence_verbatim() -> Result<(), Box<dyn std::error::Error>> {
        let session = paris_session();
        let report = session.load_document(PARIS)?;
        assert_eq!(report.chunk_count, 1);
        assert_eq!(report.word_count, 14);

        let answer = session.answer_query("What is the capital of France?")?;
        assert_eq!(answer.sentence(), Some("Paris is the capital of France."));
        match answer {
            Answer::Sentence {
                chunk_index,
                chunk_score,
                sentence_score,
                ..
            } => {
                assert_eq!(chunk_index, 0);
                assert!(chunk_score > 0.15);
                assert!(sentence_score >= chunk_score);
            }
            Answer::LowConfidence { .. } => panic!("expected a sentence answer"),
        }
        Ok(())
    }

    #[test]
    fn trigram_embedder_answers_the_same_question() -> Result<(), Box<dyn std::error::Error>> {
        let session =
            Session::with_embedder(CharacterNgramEmbedder::default(), AnswerConfig::default())?;
        session.load_document(PARIS)?;
        assert_eq!(
            session.respond_to_query("What is the capital of France?"),
            "Paris is the capital of France."
        );
        Ok(())
    }

    #[test]
    fn query_without_document_is_refused() {
        let session = paris_session();
        assert!(!session.has_document());
        assert!(matches!(
            session.answer_query("anything"),
            Err(QueryError::NoDocumentLoaded)
        ));
        assert_eq!(
            session.respond_to_query("anything"),
            "No PDF uploaded. Please upload a PDF first."
        );
    }

    #[test]
    fn low_similarity_returns_fallback() -> Result<(), Box<dyn std::error::Error>> {
        let session = paris_session();
        session.load_document(PARIS)?;

        let answer = session.answer_query("How is the weather today?")?;
        assert!(answer.is_low_confidence());
        assert_eq!(
            session.respond_to_query("How is the weather today?"),
            DEFAULT_FALLBACK_MESSAGE
        );
        assert!(session.has_document());
        Ok(())
    }

    #[test]
    fn score_equal_to_threshold_is_low_confidence() -> Result<(), Box<dyn std::error::Error>> {
        let config = AnswerConfig {
            threshold: 1.0,
            ..AnswerConfig::default()
        };
        let session = Session::with_embedder(KeywordEmbedder::new(&["paris"]), config)?;
        session.load_document("Paris. Paris again.")?;
        assert!(session.answer_query("paris")?.is_low_confidence());
        Ok(())
    }

    #[test]
    fn document_without_sentences_clears_session() -> Result<(), Box<dyn std::error::Error>> {
        let session = paris_session();
        session.load_document(PARIS)?;
        assert!(session.has_document());

        let result = session.load_document("\u{65e5}\u{672c}\u{8a9e} \u{2014}\u{2014}");
        assert!(matches!(
            result,
            Err(LoadError::Chunking(ChunkError::NoSentences))
        ));
        assert!(!session.has_document());
        Ok(())
    }

    #[test]
    fn blank_text_is_empty_content() {
        let session = paris_session();
        assert!(matches!(
            session.load_document(" \n\t"),
            Err(LoadError::EmptyContent)
        ));
        assert!(!session.has_document());
    }

    #[test]
    fn embedding_failure_during_load_clears_session() -> Result<(), Box<dyn std::error::Error>> {
        let mut embedder = KeywordEmbedder::new(&["paris"]);
        embedder.fail_on = Some("Berlin");
        let session = Session::with_embedder(embedder, AnswerConfig::default())?;

        session.load_document(PARIS)?;
        let result = session.load_document("Berlin is the capital of Germany.");
        assert!(matches!(result, Err(LoadError::Embedding(_))));
        assert!(!session.has_document());
        Ok(())
    }

    #[test]
    fn failed_query_keeps_document() -> Result<(), Box<dyn std::error::Error>> {
        let mut embedder = KeywordEmbedder::new(&["paris", "capital"]);
        embedder.fail_on = Some("explode");
        let session = Session::with_embedder(embedder, AnswerConfig::default())?;
        session.load_document(PARIS)?;

        let reply = session.respond_to_query("explode please");
        assert_eq!(
            reply,
            "Error finding answer: embedding model unavailable: model offline"
        );
        assert!(session.has_document());
        assert_eq!(
            session.answer_query("capital of paris")?.sentence(),
            Some("Paris is the capital of France.")
        );
        Ok(())
    }

    #[test]
    fn chunk_without_sentences_is_reported() -> Result<(), Box<dyn std::error::Error>> {
        let splitter = OneShotSplitter {
            calls: AtomicUsize::new(0),
        };
        let session = Session::new(
            KeywordEmbedder::new(&["capital", "france"]),
            splitter,
            AnswerConfig::default(),
        )?;
        session.load_document(PARIS)?;

        assert!(matches!(
            session.answer_query("capital of France"),
            Err(QueryError::NoSentencesInChunk)
        ));
        assert_eq!(
            session.respond_to_query("capital of France"),
            "No sentences found in the chunk."
        );
        Ok(())
    }

    #[test]
    fn best_chunk_is_refined_across_many_chunks() -> Result<(), Box<dyn std::error::Error>> {
        let config = AnswerConfig {
            target_words: 8,
            ..AnswerConfig::default()
        };
        let embedder = KeywordEmbedder::new(&["pump", "valve", "pressure", "filter", "monthly"]);
        let session = Session::with_embedder(embedder, config)?;

        let text = "The pump moves oil through the line. It runs all day.\n\n\
                    The valve limits pressure in the circuit. Close the valve slowly.\n\
                    Replace the filter every month. Inspect the filter monthly.";
        let report = session.load_document(text)?;
        assert_eq!(report.chunk_count, 3);

        let answer = session.answer_query("How often is the filter checked monthly?")?;
        match answer {
            Answer::Sentence {
                text, chunk_index, ..
            } => {
                assert_eq!(chunk_index, 2);
                assert_eq!(text, "Inspect the filter monthly.");
            }
            Answer::LowConfidence { .. } => panic!("expected a sentence answer"),
        }
        Ok(())
    }

    #[test]
    fn new_upload_replaces_previous_document() -> Result<(), Box<dyn std::error::Error>> {
        let session = paris_session();
        let first = session.load_document(PARIS)?;
        let second = session.load_document("The weather in Paris is mild.")?;
        assert_ne!(first.document_id, second.document_id);

        let current = session.current_document().ok_or("document should be loaded")?;
        assert_eq!(current.report().document_id, second.document_id);
        assert_eq!(current.chunks().len(), current.embeddings().len());
        assert_eq!(
            session.answer_query("weather")?.sentence(),
            Some("The weather in Paris is mild.")
        );
        Ok(())
    }

    #[test]
    fn clear_drops_document() -> Result<(), Box<dyn std::error::Error>> {
        let session = paris_session();
        session.load_document(PARIS)?;
        session.clear();
        assert!(!session.has_document());
        Ok(())
    }

    #[test]
    fn pdf_uploads_go_through_the_source() -> Result<(), Box<dyn std::error::Error>> {
        let session = paris_session();
        assert_eq!(
            session.respond_to_pdf(&FixedSource(PARIS), Path::new("atlas.pdf")),
            "PDF uploaded and processed successfully! You can now ask questions."
        );
        assert!(session.has_document());

        assert_eq!(
            session.respond_to_pdf(&FixedSource(PARIS), Path::new("atlas.txt")),
            "Invalid file format. Please upload a PDF file."
        );
        assert!(session.has_document());

        assert_eq!(
            session.respond_to_pdf(&FixedSource("  "), Path::new("scan.pdf")),
            "Error processing PDF: The uploaded PDF has no extractable text."
        );
        assert!(!session.has_document());
        Ok(())
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = AnswerConfig {
            target_words: 0,
            ..AnswerConfig::default()
        };
        assert!(matches!(
            Session::with_embedder(KeywordEmbedder::new(&["a"]), config),
            Err(LoadError::InvalidConfig(_))
        ));
    }

    #[test]
    fn concurrent_readers_never_see_a_torn_document() -> Result<(), Box<dyn std::error::Error>> {
        let session = paris_session();
        session.load_document(PARIS)?;
        let restated = "The capital of France is Paris. The weather there is mild.";

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for round in 0..50 {
                    let text = if round % 2 == 0 { restated } else { PARIS };
                    let _ = session.load_document(text);
                }
            });

            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..50 {
                        if let Some(document) = session.current_document() {
                            assert_eq!(document.chunks().len(), document.embeddings().len());
                        }
                        let reply = session.respond_to_query("capital of France");
                        assert!(
                            reply == "Paris is the capital of France."
                                || reply == "The capital of France is Paris.",
                            "unexpected reply {reply:?}"
                        );
                    }
                });
            }
        });
        Ok(())
    }
}
