// src/models/question.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Question difficulty.
///
/// Ordered Easy < Medium < Hard so that ordered maps iterate in the
/// step-down scan order used by the recommendation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Lower-case form used inside generation prompts.
    pub fn prompt_label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// Kind of question presented to the learner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionKind {
    #[default]
    #[serde(rename = "Multiple Choice", alias = "MCQ")]
    MultipleChoice,
    #[serde(rename = "Fill in the Blank", alias = "Fill in the blank")]
    FillBlank,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "Multiple Choice",
            QuestionKind::FillBlank => "Fill in the Blank",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "multiple choice" | "mcq" => Ok(QuestionKind::MultipleChoice),
            "fill in the blank" | "fill-blank" | "fill_blank" => Ok(QuestionKind::FillBlank),
            other => Err(format!("unknown question type '{}'", other)),
        }
    }
}

/// A question as returned by the generation collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question: String,
    pub correct_answer: String,
    pub explanation: String,
    /// Exactly four entries for multiple choice, empty for fill-in-the-blank.
    #[serde(default)]
    pub options: Vec<String>,
}

/// A question held by an in-flight quiz and snapshotted into the session record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    #[serde(rename = "type", default)]
    pub kind: QuestionKind,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

impl QuizQuestion {
    pub fn from_generated(kind: QuestionKind, generated: GeneratedQuestion) -> Self {
        let options = match kind {
            QuestionKind::MultipleChoice => generated.options,
            QuestionKind::FillBlank => Vec::new(),
        };

        Self {
            kind,
            question: generated.question,
            options,
            correct_answer: generated.correct_answer,
            explanation: generated.explanation,
        }
    }
}

/// DTO for sending a question to the client (excludes answer and explanation).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub index: usize,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub question: String,
    pub options: Vec<String>,
}

/// Graded outcome of one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_number: usize,
    pub question: String,
    #[serde(default)]
    pub question_type: QuestionKind,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub user_answer: String,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
    /// Seconds between presentation and submission. Older snapshots lack it.
    #[serde(default)]
    pub time_taken: i64,
    #[serde(default)]
    pub is_correct: bool,
}
