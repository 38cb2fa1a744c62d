// src/quiz/mod.rs

pub mod grading;
pub mod orchestrator;

pub use orchestrator::{QuizAttempt, QuizConfig, QuizOrchestrator, QuizOutcome, QuizState, QuizView};
