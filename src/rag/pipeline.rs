//! Online question-answering flow.
//!
//! One `ask` records the query in short-term memory, retrieves the nearest
//! segments and asks the generator for an answer grounded in them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::prompt::{build_grounded_prompt, REFUSAL_SENTENCE};
use super::retriever::Retriever;
use crate::core::errors::RagError;
use crate::llm::AnswerGenerator;
use crate::memory::ShortTermMemory;

/// Answer text returned in place of a generated answer when the generator
/// fails. The failure itself travels in [`AskOutcome::error`].
pub const GENERATION_ERROR_ANSWER: &str = "The answer could not be generated at this time.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskFailure {
    pub kind: String,
    pub message: String,
}

impl From<&RagError> for AskFailure {
    fn from(err: &RagError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskOutcome {
    pub answer: String,
    pub retrieved_chunks: Vec<String>,
    pub chat_history: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<AskFailure>,
}

impl AskOutcome {
    pub fn is_refusal(&self) -> bool {
        super::prompt::is_refusal(&self.answer)
    }
}

#[derive(Clone)]
pub struct RagPipeline {
    retriever: Retriever,
    generator: Arc<dyn AnswerGenerator>,
    memory: ShortTermMemory,
    top_k: usize,
}

impl RagPipeline {
    pub fn new(
        retriever: Retriever,
        generator: Arc<dyn AnswerGenerator>,
        memory: ShortTermMemory,
        top_k: usize,
    ) -> Self {
        Self {
            retriever,
            generator,
            memory,
            top_k,
        }
    }

    pub fn memory(&self) -> &ShortTermMemory {
        &self.memory
    }

    /// Answer `query` on behalf of `user`.
    ///
    /// Retrieval failures are returned as errors. A generation failure is
    /// not: it yields [`GENERATION_ERROR_ANSWER`] with `error` set.
    pub async fn ask(&self, user: &str, query: &str) -> Result<AskOutcome, RagError> {
        // the query is remembered even when retrieval fails afterwards
        self.memory.add(user, query);

        let segments = self.retriever.retrieve(query, self.top_k).await?;
        let retrieved_chunks: Vec<String> = segments.into_iter().map(|s| s.text).collect();

        let (answer, error) = if retrieved_chunks.is_empty() {
            tracing::info!("No segments retrieved; answering with refusal");
            (REFUSAL_SENTENCE.to_string(), None)
        } else {
            let prompt = build_grounded_prompt(query, &retrieved_chunks);
            match self.generator.generate(&prompt).await {
                Ok(answer) => (answer.trim().to_string(), None),
                Err(err @ RagError::Generation(_)) => {
                    tracing::error!("Answer generation failed: {}", err);
                    (GENERATION_ERROR_ANSWER.to_string(), Some(AskFailure::from(&err)))
                }
                Err(err) => return Err(err),
            }
        };

        let chat_history = self
            .memory
            .get_history()
            .iter()
            .map(|entry| entry.as_pair())
            .collect();

        Ok(AskOutcome {
            answer,
            retrieved_chunks,
            chat_history,
            error,
        })
    }
}
