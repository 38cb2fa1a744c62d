// src/generator/mod.rs

//! Question generation collaborator.

pub mod llm;
pub mod prompts;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::question::{Difficulty, GeneratedQuestion, QuestionKind},
};

pub use llm::LlmQuestionGenerator;

/// Options every multiple-choice question carries.
pub const MCQ_OPTION_COUNT: usize = 4;

/// Rejects a multiple-choice option list of the wrong length.
pub fn ensure_option_count(options: &[String]) -> Result<(), AppError> {
    if options.len() != MCQ_OPTION_COUNT {
        return Err(AppError::GenerationFailed(format!(
            "expected {} options, got {}",
            MCQ_OPTION_COUNT,
            options.len()
        )));
    }
    Ok(())
}

/// Produces one question per call. Any error aborts the current batch.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(
        &self,
        topic: &str,
        difficulty: Difficulty,
        kind: QuestionKind,
    ) -> Result<GeneratedQuestion, AppError>;
}
