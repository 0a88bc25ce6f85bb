//! Answer verification.
//!
//! Every comparison unit goes through [`normalize`]: trim surrounding
//! whitespace, then lowercase. There is no diacritic or synonym folding.

use std::collections::HashSet;

use tracing::{debug, error, warn};

use crate::error::SelectionParseError;
use crate::types::{Question, QuestionKind};

/// Normalize an answer for comparison.
pub fn normalize(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Judge a submitted answer against a question's canonical answer.
///
/// Malformed input never escapes as an error: it is logged and judged incorrect.
pub fn verify(question: &Question, user_answer: &str) -> bool {
    verify_answer(&question.kind, &question.answer, user_answer)
}

/// Judge a submitted answer given the kind and canonical answer directly.
pub fn verify_answer(kind: &QuestionKind, canonical: &str, user_answer: &str) -> bool {
    match kind {
        QuestionKind::OpenText | QuestionKind::MultipleChoice | QuestionKind::TrueFalse => {
            normalize(user_answer) == normalize(canonical)
        }
        QuestionKind::MultipleSelect => verify_selection(canonical, user_answer),
        QuestionKind::Unrecognized(tag) => {
            error!(question_type = %tag, "unknown question type, judging answer incorrect");
            false
        }
    }
}

/// Parse a submitted multiple-select answer.
///
/// Input starting with `[` (after trimming) is read as a JSON array of
/// strings; anything else is split on commas with each segment trimmed. An
/// empty input is an empty selection.
pub fn parse_selection(user_answer: &str) -> Result<Vec<String>, SelectionParseError> {
    let trimmed = user_answer.trim();

    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    Ok(trimmed.split(',').map(|s| s.trim().to_string()).collect())
}

/// Parse a stored multiple-select canonical answer (always a JSON array).
pub fn parse_canonical_selection(canonical: &str) -> Result<Vec<String>, SelectionParseError> {
    Ok(serde_json::from_str(canonical)?)
}

fn verify_selection(canonical: &str, user_answer: &str) -> bool {
    let expected = match parse_canonical_selection(canonical) {
        Ok(items) => items,
        Err(e) => {
            error!(error = %e, "failed to parse stored multiple_select answer");
            return false;
        }
    };

    let submitted = match parse_selection(user_answer) {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "failed to parse submitted multiple_select answer");
            return false;
        }
    };

    selections_match(&expected, &submitted)
}

/// Exact set equality without deduplicating the submission: the sizes must
/// agree, the normalized sets must be equal, and a repeated submitted
/// element is never correct.
fn selections_match(expected: &[String], submitted: &[String]) -> bool {
    if expected.len() != submitted.len() {
        debug!(
            expected = expected.len(),
            submitted = submitted.len(),
            "selection size mismatch"
        );
        return false;
    }

    let expected: HashSet<String> = expected.iter().map(|s| normalize(s)).collect();
    let submitted_set: HashSet<String> = submitted.iter().map(|s| normalize(s)).collect();
    if submitted_set.len() != submitted.len() {
        debug!("duplicate element in submitted selection");
        return false;
    }
    submitted_set == expected
}
