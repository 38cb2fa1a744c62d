// src/utils/links.rs

use serde::Serialize;
use url::Url;

/// Deep links that open an assistant pre-filled with a study prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyLinks {
    pub chatgpt: String,
    pub gemini: String,
    pub claude: String,
    pub perplexity: String,
}

const ASSISTANTS: [&str; 4] = [
    "https://chat.openai.com/",
    "https://gemini.google.com/",
    "https://claude.ai/",
    "https://www.perplexity.ai/",
];

/// Builds the study prompt for a question.
///
/// A wrong answer turns the prompt into "why is X right and Y wrong".
pub fn study_query(question: &str, correct_answer: &str, topic: &str, user_answer: &str) -> String {
    if !user_answer.is_empty() && user_answer != correct_answer {
        format!(
            "Explain why '{}' is the correct answer to this {} question: '{}'. Also explain why '{}' is wrong.",
            correct_answer, topic, question, user_answer
        )
    } else {
        format!(
            "Explain this {} concept in detail: '{}' Answer: '{}'",
            topic, question, correct_answer
        )
    }
}

fn with_query(base: &str, query: &str) -> String {
    match Url::parse_with_params(base, &[("q", query)]) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::warn!("Failed to build study link for {}: {}", base, e);
            base.to_string()
        }
    }
}

pub fn study_links(question: &str, correct_answer: &str, topic: &str, user_answer: &str) -> StudyLinks {
    let query = study_query(question, correct_answer, topic, user_answer);
    let [chatgpt, gemini, claude, perplexity] = ASSISTANTS.map(|base| with_query(base, &query));

    StudyLinks {
        chatgpt,
        gemini,
        claude,
        perplexity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_answer_asks_why() {
        let q = study_query("Capital of France?", "Paris", "Geography", "Lyon");
        assert!(q.contains("Also explain why 'Lyon' is wrong."));
    }

    #[test]
    fn correct_answer_asks_for_concept() {
        let q = study_query("Capital of France?", "Paris", "Geography", "Paris");
        assert!(q.starts_with("Explain this Geography concept"));
    }

    #[test]
    fn links_are_percent_encoded() {
        let links = study_links("What is O(log n)?", "binary search", "DSA", "");
        assert!(links.perplexity.starts_with("https://www.perplexity.ai/?q="));
        assert!(!links.chatgpt.contains(' '));
        let parsed = Url::parse(&links.gemini).unwrap();
        let (_, q) = parsed.query_pairs().next().unwrap();
        assert!(q.contains("What is O(log n)?"));
    }
}
