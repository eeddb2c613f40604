use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("The uploaded PDF has no extractable text.")]
    NoExtractableText,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("No valid sentences found in the text.")]
    NoSentences,

    #[error("No valid chunks could be created from the text.")]
    NoChunks,
}

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("embedding api error: {0}")]
    Api(String),

    #[error("model returned {actual} embeddings for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedding model unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum SearchError {
    #[error("no candidates to compare against")]
    EmptyCandidateSet,

    #[error("candidate {index} has {actual} dimensions, query has {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("The uploaded PDF has no extractable text.")]
    EmptyContent,

    #[error(transparent)]
    Chunking(#[from] ChunkError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("No PDF uploaded. Please upload a PDF first.")]
    NoDocumentLoaded,

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("No sentences found in the chunk.")]
    NoSentencesInChunk,
}

pub type Result<T, E = LoadError> = std::result::Result<T, E>;
