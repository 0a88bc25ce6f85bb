//! Test fixtures and factory functions for creating test data.

#![allow(dead_code)]

use serde_json::json;

use quiz_core::{Difficulty, NewQuestion, QuestionKind};

/// An approved-ready open text question.
pub fn open_text(prompt: &str, answer: &str) -> NewQuestion {
    NewQuestion {
        category: "Histoire".to_string(),
        prompt: prompt.to_string(),
        kind: QuestionKind::OpenText,
        choices: vec![],
        answer: answer.to_string(),
        keywords: vec![],
        difficulty: Difficulty::Medium,
    }
}

/// The French motto as a multiple-select question.
pub fn devise_question() -> NewQuestion {
    NewQuestion {
        category: "Symboles".to_string(),
        prompt: "Quelle est la devise de la République ?".to_string(),
        kind: QuestionKind::MultipleSelect,
        choices: vec![
            "Liberté".to_string(),
            "Égalité".to_string(),
            "Fraternité".to_string(),
            "Solidarité".to_string(),
        ],
        answer: r#"["liberté","égalité","fraternité"]"#.to_string(),
        keywords: vec!["devise".to_string()],
        difficulty: Difficulty::Easy,
    }
}

/// A multiple-choice question about the capital.
pub fn capital_question() -> NewQuestion {
    NewQuestion {
        category: "Géographie".to_string(),
        prompt: "Quelle est la capitale de la France ?".to_string(),
        kind: QuestionKind::MultipleChoice,
        choices: vec!["Lyon".to_string(), "Paris".to_string(), "Marseille".to_string()],
        answer: "Paris".to_string(),
        keywords: vec![],
        difficulty: Difficulty::Easy,
    }
}

/// Generate `count` numbered open text questions.
pub fn numbered_questions(count: usize) -> Vec<NewQuestion> {
    (1..=count)
        .map(|i| open_text(&format!("Question {}?", i), &format!("Answer {}", i)))
        .collect()
}

/// Create a question request body.
pub fn question_request(
    prompt: &str,
    question_type: &str,
    choices: &[&str],
    answer: serde_json::Value,
) -> serde_json::Value {
    json!({
        "category": "Institutions",
        "question": prompt,
        "question_type": question_type,
        "choices": choices,
        "answer": answer,
        "keywords": ["test"],
        "difficulty": "medium",
    })
}

/// Create a progress request body.
pub fn progress_request(question_id: i64, answer: &str) -> serde_json::Value {
    json!({
        "question_id": question_id,
        "user_answer": answer,
        "time_taken_seconds": 5,
    })
}

/// Create a register request body.
pub fn register_request(name: &str) -> serde_json::Value {
    json!({ "name": name })
}
