//! Question authoring, moderation and bulk import.

use std::time::Instant;

use quiz_core::import::MAX_IMPORT_BATCH;
use quiz_core::{
    normalize, shuffle_for_presentation, validate_batch, validate_draft, ImportReport,
    ModerationStatus, Question, QuestionDraft,
};
use tracing::info;

use crate::db::{QuestionChanges, QuestionRepository, QuestionUpdate};
use crate::error::{ApiError, Result};
use crate::models::{QuestionListQuery, ReviewAction, User, UserRole};

/// Admins and moderators may edit any question; a user may edit only their
/// own pending question.
pub fn can_edit(user: &User, question: &Question) -> bool {
    user.role.is_privileged()
        || (question.created_by == user.id && question.status == ModerationStatus::Pending)
}

fn can_view(user: &User, question: &Question) -> bool {
    user.role.is_privileged()
        || question.status == ModerationStatus::Approved
        || (question.created_by == user.id && question.status == ModerationStatus::Pending)
}

/// Status given to questions a user authors. Admins choose (approved by
/// default), everyone else starts pending.
fn authored_status(user: &User, requested: Option<ModerationStatus>) -> ModerationStatus {
    match user.role {
        UserRole::Admin => requested.unwrap_or(ModerationStatus::Approved),
        _ => ModerationStatus::Pending,
    }
}

/// Learners see choices in a fresh order every time.
fn present(user: &User, mut question: Question) -> Question {
    if user.role == UserRole::User {
        shuffle_for_presentation(&mut question);
    }
    question
}

pub fn list_questions<R: QuestionRepository>(
    repo: &R,
    user: &User,
    query: &QuestionListQuery,
) -> Result<Vec<Question>> {
    let questions = if user.role.is_privileged() {
        repo.get_all_questions()?
    } else {
        repo.get_visible_questions(user.id)?
    };

    let category = query.category.as_deref().map(normalize);
    Ok(questions
        .into_iter()
        .filter(|q| category.as_ref().map_or(true, |c| normalize(&q.category) == *c))
        .filter(|q| query.status.map_or(true, |s| q.status == s))
        .map(|q| present(user, q))
        .collect())
}

/// A question the user may see, as stored. Hidden questions read as not found.
pub(crate) fn visible_question<R: QuestionRepository>(
    repo: &R,
    user: &User,
    id: i64,
) -> Result<Question> {
    repo.get_question(id)?
        .filter(|q| can_view(user, q))
        .ok_or_else(|| ApiError::NotFound(format!("Question {}", id)))
}

pub fn get_question<R: QuestionRepository>(repo: &R, user: &User, id: i64) -> Result<Question> {
    let question = visible_question(repo, user, id)?;
    Ok(present(user, question))
}

pub fn create_question<R: QuestionRepository>(
    repo: &R,
    user: &User,
    draft: &QuestionDraft,
) -> Result<Question> {
    let new = validate_draft(draft)?;
    let status = authored_status(user, draft.status);
    let question = repo.create_question(&new, user.id, status)?;

    info!(question_id = question.id, user_id = user.id, status = status.as_str(), "question created");
    Ok(question)
}

/// Edit a question. A changed canonical answer discards its recorded progress.
pub fn update_question<R: QuestionRepository>(
    repo: &R,
    user: &User,
    id: i64,
    draft: &QuestionDraft,
) -> Result<QuestionUpdate> {
    let current = repo
        .get_question(id)?
        .ok_or_else(|| ApiError::NotFound(format!("Question {}", id)))?;
    if !can_edit(user, &current) {
        return Err(ApiError::Forbidden(format!(
            "Not allowed to edit question {}",
            id
        )));
    }

    let draft = keep_current_shape(draft, &current);
    let content = validate_draft(&draft)?;
    let status = if user.role.is_privileged() {
        draft.status
    } else {
        None
    };

    let update = repo.update_question(
        id,
        &QuestionChanges {
            content: &content,
            status,
            changed_by: user.id,
        },
    )?;
    info!(
        question_id = id,
        user_id = user.id,
        progress_cleared = update.progress_cleared,
        "question updated"
    );
    Ok(update)
}

/// An edit that omits the question type keeps the stored type, and its
/// choices when none are given.
fn keep_current_shape(draft: &QuestionDraft, current: &Question) -> QuestionDraft {
    let mut draft = draft.clone();
    if draft.question_type.trim().is_empty() {
        draft.question_type = current.kind.as_str().to_string();
        if draft.choices.is_empty() {
            draft.choices = current.choices.clone();
        }
    }
    draft
}

/// Delete a question and, with it, every progress row that references it.
pub fn delete_question<R: QuestionRepository>(repo: &R, user: &User, id: i64) -> Result<usize> {
    let current = repo
        .get_question(id)?
        .ok_or_else(|| ApiError::NotFound(format!("Question {}", id)))?;
    if !can_edit(user, &current) {
        return Err(ApiError::Forbidden(format!(
            "Not allowed to delete question {}",
            id
        )));
    }

    let progress_deleted = repo.delete_question(id)?;
    info!(question_id = id, user_id = user.id, progress_deleted, "question deleted");
    Ok(progress_deleted)
}

/// Approve or reject a pending question.
pub fn review_question<R: QuestionRepository>(
    repo: &R,
    user: &User,
    id: i64,
    action: ReviewAction,
) -> Result<Question> {
    if !user.role.is_privileged() {
        return Err(ApiError::Forbidden(
            "Only moderators and admins can review questions".to_string(),
        ));
    }

    let current = repo
        .get_question(id)?
        .ok_or_else(|| ApiError::NotFound(format!("Question {}", id)))?;
    if current.status != ModerationStatus::Pending {
        return Err(ApiError::BadRequest(
            "Question is not pending approval".to_string(),
        ));
    }

    let status = match action {
        ReviewAction::Approve => ModerationStatus::Approved,
        ReviewAction::Reject => ModerationStatus::Rejected,
    };
    let question = repo.set_question_status(id, status, user.id)?;
    info!(question_id = id, reviewer = user.id, status = status.as_str(), "question reviewed");
    Ok(question)
}

/// Validate and insert a batch, skipping invalid items and duplicates.
pub fn import_questions<R: QuestionRepository>(
    repo: &R,
    user: &User,
    drafts: &[QuestionDraft],
) -> Result<ImportReport> {
    if drafts.is_empty() {
        return Err(ApiError::BadRequest("No questions provided".to_string()));
    }
    if drafts.len() > MAX_IMPORT_BATCH {
        return Err(ApiError::BadRequest(format!(
            "Too many questions (max {} per import)",
            MAX_IMPORT_BATCH
        )));
    }

    let start = Instant::now();
    let existing = repo.existing_prompts()?;
    let plan = validate_batch(drafts, &existing);

    let status = authored_status(user, None);
    repo.import_questions(&plan.accepted, user.id, status)?;

    let mut report = plan.report;
    report.time_taken_ms = start.elapsed().as_millis() as u64;

    info!(
        user_id = user.id,
        imported = report.imported_questions,
        skipped = report.skipped_questions,
        time_taken_ms = report.time_taken_ms,
        "import completed"
    );
    Ok(report)
}
