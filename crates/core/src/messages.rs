//! Human-readable replies shown by hosts after an upload or a question.

use crate::error::{ExtractionError, LoadError, QueryError};
use crate::models::{Answer, LoadReport};

pub const UPLOAD_SUCCESS: &str =
    "PDF uploaded and processed successfully! You can now ask questions.";

pub const INVALID_FORMAT: &str = "Invalid file format. Please upload a PDF file.";

pub fn upload_reply(result: &Result<LoadReport, LoadError>) -> String {
    match result {
        Ok(_) => UPLOAD_SUCCESS.to_string(),
        Err(LoadError::Extraction(ExtractionError::UnsupportedFormat(_))) => {
            INVALID_FORMAT.to_string()
        }
        Err(error) => format!("Error processing PDF: {error}"),
    }
}

pub fn query_reply(result: &Result<Answer, QueryError>, fallback_message: &str) -> String {
    match result {
        Ok(Answer::Sentence { text, .. }) => text.clone(),
        Ok(Answer::LowConfidence { .. }) => fallback_message.to_string(),
        Err(error @ (QueryError::NoDocumentLoaded | QueryError::NoSentencesInChunk)) => {
            error.to_string()
        }
        Err(error) => format!("Error finding answer: {error}"),
    }
}
