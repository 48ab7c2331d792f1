//! Text extraction sits upstream of the screening engine: callers hand the
//! engine already-extracted text, so nothing in `workflows::screening`
//! touches this module. The CLI ingest is its one consumer.

/// Per-item extraction failure; one bad document never aborts an ingest.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("document '{name}' is not valid UTF-8 text")]
    InvalidEncoding { name: String },
    #[error("document '{name}' contains no text")]
    EmptyDocument { name: String },
}

/// Turns an uploaded document into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, name: &str, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// Extractor for documents that are already plain text.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, name: &str, bytes: &[u8]) -> Result<String, ExtractionError> {
        let text = std::str::from_utf8(bytes).map_err(|_| ExtractionError::InvalidEncoding {
            name: name.to_string(),
        })?;

        if text.trim().is_empty() {
            return Err(ExtractionError::EmptyDocument {
                name: name.to_string(),
            });
        }

        Ok(text.to_string())
    }
}
