pub mod chunking;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod http_embedder;
pub mod messages;
pub mod models;
pub mod normalize;
pub mod sentences;
pub mod session;
pub mod similarity;

pub use chunking::{chunk_text, ChunkingConfig, DEFAULT_CHUNK_WORDS};
pub use config::{AnswerConfig, DEFAULT_FALLBACK_MESSAGE, DEFAULT_THRESHOLD};
pub use embeddings::{CharacterNgramEmbedder, Embedder, DEFAULT_EMBEDDING_DIMENSIONS};
pub use error::{ChunkError, EmbeddingError, ExtractionError, LoadError, QueryError, SearchError};
pub use extractor::{is_pdf_path, DocumentSource, LopdfSource};
pub use http_embedder::{
    HttpEmbedder, HttpEmbedderConfig, DEFAULT_EMBEDDING_MODEL, DEFAULT_MODEL_DIMENSIONS,
};
pub use messages::{query_reply, upload_reply, INVALID_FORMAT, UPLOAD_SUCCESS};
pub use models::{Answer, Chunk, LoadReport, Match};
pub use normalize::{normalize, require_content};
pub use sentences::{SentenceSplitter, UnicodeSentenceSplitter, DEFAULT_ABBREVIATIONS};
pub use session::{DocumentIndex, Session};
pub use similarity::{best_match, cosine_similarity};
