//! External collaborators for the screening engine: the scoring oracle that
//! judges one (document, question) pair, and the text-extraction contract
//! that turns uploaded files into plain text upstream of the engine.

pub mod extract;
mod openai;

pub use extract::{ExtractionError, PlainTextExtractor, TextExtractor};
pub use openai::OpenAiOracle;

use crate::workflows::screening::{Judgment, Question};
use std::future::Future;

/// Judges a single document against a single question.
///
/// The engine only depends on this contract: the call eventually settles
/// with a judgment or an error, and errors are per (document, question)
/// pair. Futures are `Send` so batch runs can be driven from spawned tasks.
pub trait JudgmentOracle: Send + Sync {
    fn judge(
        &self,
        document: &str,
        question: &Question,
        guidance: &str,
    ) -> impl Future<Output = Result<Judgment, OracleError>> + Send;
}

/// Transport-level oracle failures. Unparseable-but-delivered replies are
/// recovered inside the adapter and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("oracle request failed (model {model}): {source}")]
    Request {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("oracle returned no content (model {model})")]
    EmptyReply { model: String },
}

impl OracleError {
    pub fn request(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        OracleError::Request {
            model: model.into(),
            source: Box::new(source),
        }
    }
}
