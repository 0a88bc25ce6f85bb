//! Question authoring, import and practice queue API tests.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use serde_json::json;

use common::fixtures;
use common::TestContext;
use quiz_backend::models::{ModerationStatus, UserRole};

fn ids(body: &serde_json::Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_i64().unwrap())
        .collect()
}

/// Admin-created questions are approved; learner-created ones are pending.
#[tokio::test]
async fn test_create_question_status_by_role() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let admin = ctx.create_user("admin", UserRole::Admin);
    let learner = ctx.create_user("learner", UserRole::User);

    let body = fixtures::question_request(
        "Capitale de la France ?",
        "multiple_choice",
        &["Paris", "Lyon", "Marseille"],
        json!("Paris"),
    );

    let response = server
        .post("/api/questions")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&admin.token))
        .json(&body)
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: serde_json::Value = response.json();
    assert_eq!(created["status"], "approved");
    assert_eq!(created["question_type"], "multiple_choice");
    assert_eq!(created["approved_by"], admin.id);

    let response = server
        .post("/api/questions")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&learner.token))
        .json(&fixtures::question_request("Autre ?", "open_text", &[], json!("oui")))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: serde_json::Value = response.json();
    assert_eq!(created["status"], "pending");
}

/// Invalid drafts are rejected with a validation error.
#[tokio::test]
async fn test_create_question_validation() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let admin = ctx.create_user("admin", UserRole::Admin);

    let cases = vec![
        fixtures::question_request("", "open_text", &[], json!("x")),
        fixtures::question_request("Q?", "essay", &[], json!("x")),
        fixtures::question_request("Q?", "multiple_choice", &["seul"], json!("seul")),
        fixtures::question_request("Q?", "multiple_choice", &["a", "b"], json!("c")),
        fixtures::question_request("Q?", "multiple_select", &["a", "b"], json!(["a", "z"])),
    ];

    for body in cases {
        let response = server
            .post("/api/questions")
            .add_header(AUTHORIZATION, TestContext::auth_header_value(&admin.token))
            .json(&body)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error: serde_json::Value = response.json();
        assert_eq!(error["error"], "validation_error");
    }
}

/// Multiple-select answers given as a list are stored as a JSON array string.
#[tokio::test]
async fn test_multiple_select_answer_is_stored_as_json() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let admin = ctx.create_user("admin", UserRole::Admin);

    let response = server
        .post("/api/questions")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&admin.token))
        .json(&fixtures::question_request(
            "Couleurs du drapeau ?",
            "multiple_select",
            &["Bleu", "Blanc", "Rouge", "Vert"],
            json!("Bleu, Blanc, Rouge"),
        ))
        .await;
    response.assert_status(StatusCode::CREATED);

    let created: serde_json::Value = response.json();
    assert_eq!(created["answer"], r#"["Bleu","Blanc","Rouge"]"#);
}

/// Learners see approved questions and their own pending ones.
#[tokio::test]
async fn test_list_visibility() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let admin = ctx.create_user("admin", UserRole::Admin);
    let alice = ctx.create_user("alice", UserRole::User);
    let bob = ctx.create_user("bob", UserRole::User);

    let approved = ctx.seed_question(&fixtures::open_text("A?", "a"), admin.id, ModerationStatus::Approved);
    let own = ctx.seed_question(&fixtures::open_text("B?", "b"), alice.id, ModerationStatus::Pending);
    ctx.seed_question(&fixtures::open_text("C?", "c"), bob.id, ModerationStatus::Pending);
    ctx.seed_question(&fixtures::open_text("D?", "d"), admin.id, ModerationStatus::Rejected);

    let response = server
        .get("/api/questions")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&alice.token))
        .await;
    response.assert_status_ok();
    assert_eq!(ids(&response.json()), vec![approved.id, own.id]);

    let response = server
        .get("/api/questions")
        .add_query_param("status", "pending")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&admin.token))
        .await;
    response.assert_status_ok();
    assert_eq!(ids(&response.json()).len(), 2);
}

/// Fetching a question hidden from the caller is a 404.
#[tokio::test]
async fn test_get_hidden_question() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let alice = ctx.create_user("alice", UserRole::User);
    let bob = ctx.create_user("bob", UserRole::User);
    let q = ctx.seed_question(&fixtures::open_text("Bob?", "b"), bob.id, ModerationStatus::Pending);

    server
        .get(&format!("/api/questions/{}", q.id))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&alice.token))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server
        .get(&format!("/api/questions/{}", q.id))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&bob.token))
        .await
        .assert_status_ok();
}

/// A fresh user with 15 approved questions gets 10 unseen questions by default.
#[tokio::test]
async fn test_next_questions_default_count() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let admin = ctx.create_user("admin", UserRole::Admin);
    let learner = ctx.create_user("learner", UserRole::User);
    for q in fixtures::numbered_questions(15) {
        ctx.seed_question(&q, admin.id, ModerationStatus::Approved);
    }

    let response = server
        .get("/api/questions/next")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&learner.token))
        .await;
    response.assert_status_ok();
    assert_eq!(ids(&response.json()).len(), 10);

    // Out-of-range counts fall back to the default.
    for count in ["0", "51", "-4"] {
        let response = server
            .get("/api/questions/next")
            .add_query_param("count", count)
            .add_header(AUTHORIZATION, TestContext::auth_header_value(&learner.token))
            .await;
        assert_eq!(ids(&response.json()).len(), 10);
    }

    let response = server
        .get("/api/questions/next")
        .add_query_param("count", 3)
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&learner.token))
        .await;
    assert_eq!(ids(&response.json()).len(), 3);
}

/// Missed questions come back before correctly answered ones; pending ones never.
#[tokio::test]
async fn test_next_questions_priority() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let admin = ctx.create_user("admin", UserRole::Admin);
    let learner = ctx.create_user("learner", UserRole::User);

    let right = ctx.seed_question(&fixtures::open_text("Right?", "yes"), admin.id, ModerationStatus::Approved);
    let wrong = ctx.seed_question(&fixtures::open_text("Wrong?", "yes"), admin.id, ModerationStatus::Approved);
    let fresh = ctx.seed_question(&fixtures::open_text("Fresh?", "yes"), admin.id, ModerationStatus::Approved);
    ctx.seed_question(&fixtures::open_text("Pending?", "yes"), admin.id, ModerationStatus::Pending);

    for (question_id, answer) in [(right.id, "yes"), (wrong.id, "no")] {
        server
            .post("/api/progress")
            .add_header(AUTHORIZATION, TestContext::auth_header_value(&learner.token))
            .json(&fixtures::progress_request(question_id, answer))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = server
        .get("/api/questions/next")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&learner.token))
        .await;
    assert_eq!(ids(&response.json()), vec![fresh.id, wrong.id, right.id]);
}

/// Bulk import skips invalid items and duplicates and reports each one.
#[tokio::test]
async fn test_import_report() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let admin = ctx.create_user("admin", UserRole::Admin);
    ctx.seed_question(&fixtures::open_text("Déjà là ?", "oui"), admin.id, ModerationStatus::Approved);

    let payload = json!({
        "questions": [
            { "category": "Histoire", "question": "déjà là ?", "answer": "oui" },
            { "category": "Histoire", "question": "Nouvelle ?", "answer": "oui", "difficulty": "hard" },
            { "category": "Histoire", "question": "Type ?", "question_type": "essay", "answer": "x" },
            {
                "category": "Symboles",
                "question": "Devise ?",
                "question_type": "multiple_select",
                "choices": ["Liberté", "Égalité", "Fraternité"],
                "answer": ["Liberté", "Égalité", "Fraternité"]
            }
        ]
    });

    let response = server
        .post("/api/questions/import")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&admin.token))
        .json(&payload)
        .await;
    response.assert_status(StatusCode::CREATED);

    let report: serde_json::Value = response.json();
    assert_eq!(report["total_questions"], 4);
    assert_eq!(report["imported_questions"], 2);
    assert_eq!(report["skipped_questions"], 2);
    let errors = report["errors"].as_array().unwrap();
    assert!(errors[0].as_str().unwrap().starts_with("Question 1:"));
    assert!(errors[1].as_str().unwrap().starts_with("Question 3:"));
}

/// An import where nothing is accepted answers 200; an empty one is rejected.
#[tokio::test]
async fn test_import_nothing_imported() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let admin = ctx.create_user("admin", UserRole::Admin);

    let response = server
        .post("/api/questions/import")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&admin.token))
        .json(&json!({ "questions": [{ "category": "", "question": "Q?", "answer": "a" }] }))
        .await;
    response.assert_status_ok();
    let report: serde_json::Value = response.json();
    assert_eq!(report["imported_questions"], 0);

    server
        .post("/api/questions/import")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&admin.token))
        .json(&json!({ "questions": [] }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

/// Learners cannot edit approved questions; moderators can.
#[tokio::test]
async fn test_update_permissions() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let admin = ctx.create_user("admin", UserRole::Admin);
    let moderator = ctx.create_user("mod", UserRole::Moderator);
    let learner = ctx.create_user("learner", UserRole::User);
    let q = ctx.seed_question(&fixtures::open_text("Q?", "a"), admin.id, ModerationStatus::Approved);

    let edit = fixtures::question_request("Q edited?", "open_text", &[], json!("a"));

    server
        .put(&format!("/api/questions/{}", q.id))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&learner.token))
        .json(&edit)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let response = server
        .put(&format!("/api/questions/{}", q.id))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&moderator.token))
        .json(&edit)
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["question"], "Q edited?");
    assert_eq!(body["progress_cleared"], 0);

    server
        .put("/api/questions/9999")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&moderator.token))
        .json(&edit)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

/// An edit that omits the type keeps the question's type and choices.
#[tokio::test]
async fn test_update_without_type_keeps_choices() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let admin = ctx.create_user("admin", UserRole::Admin);
    let q = ctx.seed_question(&fixtures::capital_question(), admin.id, ModerationStatus::Approved);

    let response = server
        .put(&format!("/api/questions/{}", q.id))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&admin.token))
        .json(&json!({
            "category": "Géographie",
            "question": "Capitale de la France ?",
            "answer": "Paris",
        }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["question_type"], "multiple_choice");
    assert_eq!(body["choices"], json!(["Lyon", "Paris", "Marseille"]));
    assert_eq!(body["question"], "Capitale de la France ?");
}

/// Moderators approve pending questions, which then become practiceable.
#[tokio::test]
async fn test_review_pending_question() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let moderator = ctx.create_user("mod", UserRole::Moderator);
    let learner = ctx.create_user("learner", UserRole::User);
    let q = ctx.seed_question(&fixtures::open_text("Q?", "a"), learner.id, ModerationStatus::Pending);

    server
        .post(&format!("/api/questions/{}/review", q.id))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&learner.token))
        .json(&json!({ "action": "approve" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let response = server
        .post(&format!("/api/questions/{}/review", q.id))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&moderator.token))
        .json(&json!({ "action": "approve" }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "approved");
    assert_eq!(body["approved_by"], moderator.id);

    let next = server
        .get("/api/questions/next")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&learner.token))
        .await;
    assert_eq!(ids(&next.json()), vec![q.id]);
}

/// Checking an answer judges it without recording progress.
#[tokio::test]
async fn test_check_answer_does_not_record() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let admin = ctx.create_user("admin", UserRole::Admin);
    let learner = ctx.create_user("learner", UserRole::User);
    let q = ctx.seed_question(&fixtures::devise_question(), admin.id, ModerationStatus::Approved);

    let response = server
        .post(&format!("/api/questions/{}/check", q.id))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&learner.token))
        .json(&json!({ "answer": "Fraternité, Liberté, égalité" }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["is_correct"], true);

    let stats = server
        .get("/api/progress/stats")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&learner.token))
        .await;
    let stats: serde_json::Value = stats.json();
    assert_eq!(stats["answered"], 0);
}

/// Deleting a question removes it and its progress.
#[tokio::test]
async fn test_delete_question_cascades() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let admin = ctx.create_user("admin", UserRole::Admin);
    let learner = ctx.create_user("learner", UserRole::User);
    let q = ctx.seed_question(&fixtures::open_text("Q?", "a"), admin.id, ModerationStatus::Approved);

    server
        .post("/api/progress")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&learner.token))
        .json(&fixtures::progress_request(q.id, "a"))
        .await
        .assert_status(StatusCode::CREATED);

    server
        .delete(&format!("/api/questions/{}", q.id))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&admin.token))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let stats: serde_json::Value = server
        .get("/api/progress/stats")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&learner.token))
        .await
        .json();
    assert_eq!(stats["answered"], 0);
    assert_eq!(stats["total_questions"], 0);
}
