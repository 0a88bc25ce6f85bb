//! Question draft validation, shared by create, update and bulk import.
//!
//! # Import format
//! ```json
//! {
//!   "category": "Histoire",
//!   "question": "Quelle est la devise de la France ?",
//!   "question_type": "multiple_select",
//!   "choices": ["Liberté", "Égalité", "Fraternité", "Solidarité"],
//!   "answer": ["Liberté", "Égalité", "Fraternité"],
//!   "keywords": ["devise"],
//!   "difficulty": "easy"
//! }
//! ```
//! `answer` may also be a single string; for `multiple_select` that string is
//! either a JSON array or a comma-separated list.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ValidationError;
use crate::matching::normalize;
use crate::types::{Difficulty, ModerationStatus, NewQuestion, QuestionKind};

/// Maximum number of questions accepted in one import batch.
pub const MAX_IMPORT_BATCH: usize = 1000;

/// An answer as submitted by an author: one string, or a list of strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerInput {
    Text(String),
    List(Vec<String>),
    Other(serde_json::Value),
}

impl Default for AnswerInput {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// Unvalidated question as received from an author or an import file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionDraft {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub question_type: String,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub answer: AnswerInput,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub difficulty: String,
    /// Requested moderation status. Only privileged authors may set it, and
    /// import ignores it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ModerationStatus>,
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub total_questions: usize,
    pub imported_questions: usize,
    pub skipped_questions: usize,
    pub errors: Vec<String>,
    pub time_taken_ms: u64,
}

/// Validated batch: the questions to insert plus the report so far.
#[derive(Debug, Clone, Default)]
pub struct ImportPlan {
    pub accepted: Vec<NewQuestion>,
    pub report: ImportReport,
}

/// Validate a single draft into a storable question.
pub fn validate_draft(draft: &QuestionDraft) -> Result<NewQuestion, ValidationError> {
    if draft.question.trim().is_empty() {
        return Err(ValidationError::EmptyQuestion);
    }
    if answer_is_empty(&draft.answer) {
        return Err(ValidationError::EmptyAnswer);
    }
    if draft.category.trim().is_empty() {
        return Err(ValidationError::EmptyCategory);
    }

    let kind = parse_kind(&draft.question_type)?;

    let choices: Vec<String> = if kind.has_choices() {
        draft.choices.iter().map(|c| c.trim().to_string()).collect()
    } else {
        Vec::new()
    };
    if kind.has_choices() && choices.len() < 2 {
        return Err(ValidationError::InsufficientChoices {
            kind: kind.to_string(),
        });
    }

    let answer = canonical_answer(&kind, &draft.answer, &choices)?;
    let difficulty = parse_difficulty(&draft.difficulty)?;

    Ok(NewQuestion {
        category: draft.category.trim().to_string(),
        prompt: draft.question.trim().to_string(),
        kind,
        choices,
        answer,
        keywords: draft
            .keywords
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect(),
        difficulty,
    })
}

/// Validate an import batch, skipping invalid items and duplicates.
///
/// `existing_prompts` holds the normalized prompts already in storage.
/// Duplicates within the batch itself are skipped as well.
pub fn validate_batch(drafts: &[QuestionDraft], existing_prompts: &HashSet<String>) -> ImportPlan {
    let mut plan = ImportPlan {
        accepted: Vec::new(),
        report: ImportReport {
            total_questions: drafts.len(),
            ..Default::default()
        },
    };
    let mut seen: HashSet<String> = existing_prompts.clone();

    for (idx, draft) in drafts.iter().enumerate() {
        let number = idx + 1;

        let question = match validate_draft(draft) {
            Ok(question) => question,
            Err(e) => {
                plan.skip(format!("Question {}: {}", number, e));
                continue;
            }
        };

        if !seen.insert(normalize(&question.prompt)) {
            plan.skip(format!("Question {}: duplicate question already exists", number));
            continue;
        }

        plan.accepted.push(question);
    }

    plan.report.imported_questions = plan.accepted.len();
    info!(
        total = plan.report.total_questions,
        accepted = plan.report.imported_questions,
        skipped = plan.report.skipped_questions,
        "validated import batch"
    );
    plan
}

impl ImportPlan {
    fn skip(&mut self, reason: String) {
        debug!(%reason, "skipping import item");
        self.report.errors.push(reason);
        self.report.skipped_questions += 1;
    }
}

fn answer_is_empty(answer: &AnswerInput) -> bool {
    match answer {
        AnswerInput::Text(s) => s.trim().is_empty(),
        AnswerInput::Other(serde_json::Value::Null) => true,
        AnswerInput::List(_) | AnswerInput::Other(_) => false,
    }
}

fn parse_kind(tag: &str) -> Result<QuestionKind, ValidationError> {
    if tag.trim().is_empty() {
        return Ok(QuestionKind::OpenText);
    }
    let kind = QuestionKind::parse(tag);
    if kind.is_known() {
        Ok(kind)
    } else {
        Err(ValidationError::InvalidQuestionType(tag.to_string()))
    }
}

fn parse_difficulty(label: &str) -> Result<Difficulty, ValidationError> {
    let label = label.trim().to_lowercase();
    if label.is_empty() {
        return Ok(Difficulty::default());
    }
    Difficulty::from_str(&label).ok_or(ValidationError::InvalidDifficulty(label))
}

fn canonical_answer(
    kind: &QuestionKind,
    answer: &AnswerInput,
    choices: &[String],
) -> Result<String, ValidationError> {
    match (kind, answer) {
        (QuestionKind::MultipleSelect, AnswerInput::Text(text)) => {
            let text = text.trim();
            let items = if text.starts_with('[') {
                serde_json::from_str::<Vec<String>>(text)
                    .map_err(|e| ValidationError::InvalidAnswerArray(e.to_string()))?
            } else {
                text.split(',').map(|s| s.to_string()).collect()
            };
            selection_answer(items, choices)
        }
        (QuestionKind::MultipleSelect, AnswerInput::List(items)) => {
            selection_answer(items.clone(), choices)
        }
        (QuestionKind::MultipleChoice, AnswerInput::Text(text)) => {
            let text = text.trim();
            if !in_choices(text, choices) {
                return Err(ValidationError::AnswerNotInChoices(text.to_string()));
            }
            Ok(text.to_string())
        }
        (_, AnswerInput::Text(text)) => Ok(text.trim().to_string()),
        _ => Err(ValidationError::InvalidAnswerType),
    }
}

fn selection_answer(items: Vec<String>, choices: &[String]) -> Result<String, ValidationError> {
    let items: Vec<String> = items.into_iter().map(|s| s.trim().to_string()).collect();
    if items.is_empty() {
        return Err(ValidationError::EmptyAnswerArray);
    }
    if let Some(missing) = items.iter().find(|item| !in_choices(item, choices)) {
        return Err(ValidationError::AnswerNotInChoices(missing.clone()));
    }
    // Canonical answers are sets.
    let mut seen = HashSet::new();
    if let Some(repeated) = items.iter().find(|item| !seen.insert(normalize(item))) {
        return Err(ValidationError::DuplicateAnswer(repeated.clone()));
    }
    serde_json::to_string(&items).map_err(|e| ValidationError::InvalidAnswerArray(e.to_string()))
}

fn in_choices(answer: &str, choices: &[String]) -> bool {
    let answer = normalize(answer);
    choices.iter().any(|c| normalize(c) == answer)
}
