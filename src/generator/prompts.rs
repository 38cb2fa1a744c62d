// src/generator/prompts.rs

use crate::models::question::{Difficulty, QuestionKind};

pub const SYSTEM_PROMPT: &str =
    "You write exam practice questions. Reply with a single JSON object and nothing else.";

const MCQ_TEMPLATE: &str = r#"Generate a {difficulty} multiple-choice question about {topic}.

Return ONLY a JSON object with these exact fields:
- "question": a clear, specific question
- "options": an array of exactly 4 possible answers
- "correct_answer": the option that is correct, copied verbatim
- "explanation": 2-3 sentences on why the correct answer is right

Example:
{
  "question": "What is the time complexity of binary search?",
  "options": ["O(n)", "O(log n)", "O(n^2)", "O(1)"],
  "correct_answer": "O(log n)",
  "explanation": "Each comparison halves the remaining search space, so the number of steps grows logarithmically with the input size."
}

Your response:"#;

const FILL_BLANK_TEMPLATE: &str = r#"Generate a {difficulty} fill-in-the-blank question about {topic}.

Return ONLY a JSON object with these exact fields:
- "question": a sentence with "___" marking the blank
- "answer": the word or short phrase that fills the blank
- "explanation": 2-3 sentences on why this answer is correct

Example:
{
  "question": "The ___ scheduling algorithm runs the process with the shortest burst time first.",
  "answer": "SJF",
  "explanation": "Shortest Job First picks the process with the smallest execution time, which minimizes average waiting time."
}

Your response:"#;

/// Renders the user prompt for one question.
pub fn render(topic: &str, difficulty: Difficulty, kind: QuestionKind) -> String {
    let template = match kind {
        QuestionKind::MultipleChoice => MCQ_TEMPLATE,
        QuestionKind::FillBlank => FILL_BLANK_TEMPLATE,
    };

    template
        .replace("{difficulty}", difficulty.prompt_label())
        .replace("{topic}", topic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_topic_and_lowercase_difficulty() {
        let prompt = render("Operating Systems - Paging", Difficulty::Hard, QuestionKind::MultipleChoice);
        assert!(prompt.starts_with("Generate a hard multiple-choice question about Operating Systems - Paging."));
        assert!(prompt.contains("exactly 4 possible answers"));
        assert!(!prompt.contains("{topic}"));
    }

    #[test]
    fn fill_blank_asks_for_answer_field() {
        let prompt = render("SQL", Difficulty::Easy, QuestionKind::FillBlank);
        assert!(prompt.contains("fill-in-the-blank"));
        assert!(prompt.contains("\"answer\""));
        assert!(!prompt.contains("\"options\""));
    }
}
