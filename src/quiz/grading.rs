// src/quiz/grading.rs

//! Answer checking shared by live grading and legacy review reconstruction.

use crate::models::question::{QuestionKind, QuestionResult, QuizQuestion};

/// Multiple choice must match exactly; fill-in-the-blank ignores
/// surrounding whitespace and case.
pub fn is_correct(kind: QuestionKind, submitted: &str, correct: &str) -> bool {
    match kind {
        QuestionKind::MultipleChoice => submitted == correct,
        QuestionKind::FillBlank => {
            submitted.trim().to_lowercase() == correct.trim().to_lowercase()
        }
    }
}

/// Grades each question against the answer at the same index.
///
/// Missing answers grade as empty strings. `time_taken` supplies seconds
/// per question index.
pub fn grade_results(
    questions: &[QuizQuestion],
    answers: &[String],
    time_taken: impl Fn(usize) -> i64,
) -> Vec<QuestionResult> {
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let user_answer = answers.get(i).cloned().unwrap_or_default();
            QuestionResult {
                question_number: i + 1,
                question: q.question.clone(),
                question_type: q.kind,
                options: q.options.clone(),
                is_correct: is_correct(q.kind, &user_answer, &q.correct_answer),
                user_answer,
                correct_answer: q.correct_answer.clone(),
                explanation: q.explanation.clone(),
                time_taken: time_taken(i).max(0),
            }
        })
        .collect()
}

/// (correct count, percentage). An empty list scores 0.
pub fn score(results: &[QuestionResult]) -> (usize, f64) {
    let correct = results.iter().filter(|r| r.is_correct).count();
    if results.is_empty() {
        return (0, 0.0);
    }
    (correct, correct as f64 / results.len() as f64 * 100.0)
}
