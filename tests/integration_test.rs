//! Integration tests for the pure core of the service: tree shaping, token
//! round-trips, blob naming conventions, prompt composition, and output
//! repair. No Postgres or network backends are required.

use chrono::Utc;
use uuid::Uuid;

use clara_backend::auth::token::{issue_token, validate_token};
use clara_backend::error::TokenError;
use clara_backend::llm::compose::{build_messages, extract_json};
use clara_backend::models::{Exercise, FileRecord, RevisionSheet, RAW_CATEGORY};
use clara_backend::storage::blob::BlobSigner;
use clara_backend::storage::hierarchy::build_file_tree;

fn file(owner: Uuid, uuid: Uuid, category: &str, parent: Option<Uuid>) -> FileRecord {
    FileRecord {
        uuid,
        owner_id: owner,
        original_filename: "lecture.pdf".to_string(),
        blob_name: format!("user_{owner}/{uuid}.pdf"),
        size: 2048,
        mime_type: "application/pdf".to_string(),
        category: category.to_string(),
        module_name: "Operating Systems".to_string(),
        parent_uuid: parent,
        uploaded_at: Utc::now(),
        children: Vec::new(),
    }
}

/// A typical user listing: two uploads, one with two derived artifacts, and
/// one stray record whose parent was deleted.
#[test]
fn test_file_tree_from_realistic_listing() {
    let owner = Uuid::new_v4();
    let raw_a = Uuid::new_v4();
    let raw_b = Uuid::new_v4();
    let summary = Uuid::new_v4();
    let quiz = Uuid::new_v4();
    let stray = Uuid::new_v4();

    let tree = build_file_tree(vec![
        file(owner, raw_a, RAW_CATEGORY, None),
        file(owner, summary, "SUMMARY", Some(raw_a)),
        file(owner, quiz, "QUIZ", Some(raw_a)),
        file(owner, raw_b, RAW_CATEGORY, None),
        file(owner, stray, "SUMMARY", Some(Uuid::new_v4())),
    ]);

    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].uuid, raw_a);
    assert_eq!(tree[0].children.len(), 2);
    assert_eq!(tree[0].children[0].uuid, summary);
    assert_eq!(tree[0].children[1].uuid, quiz);
    assert_eq!(tree[1].uuid, raw_b);
    assert!(tree[1].children.is_empty());
}

#[test]
fn test_token_issued_at_login_is_accepted_later() {
    let user_id = Uuid::new_v4();
    let token = issue_token("integration-secret", "dana@example.com", user_id, 30).unwrap();
    let claims = validate_token("integration-secret", &token).unwrap();
    assert_eq!(claims.user_id, user_id);
    assert_eq!(claims.sub, "dana@example.com");
}

#[test]
fn test_token_from_another_deployment_is_rejected() {
    let token = issue_token("secret-a", "eve@example.com", Uuid::new_v4(), 30).unwrap();
    assert_eq!(
        validate_token("secret-b", &token),
        Err(TokenError::SignatureInvalid)
    );
}

#[test]
fn test_blob_names_keep_users_isolated() {
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let shared_uuid = Uuid::new_v4();

    let a = BlobSigner::upload_blob_name(alice, shared_uuid, "notes.pdf");
    let b = BlobSigner::upload_blob_name(bob, shared_uuid, "notes.pdf");
    assert_ne!(a, b);
    assert!(a.starts_with(&format!("user_{alice}/")));
    assert!(b.starts_with(&format!("user_{bob}/")));
}

#[test]
fn test_transform_blob_lives_under_its_own_uuid_folder() {
    let owner = Uuid::new_v4();
    let transform = Uuid::new_v4();
    let name = BlobSigner::transform_blob_name(owner, transform, "summary.md");
    assert_eq!(name, format!("user_{owner}/{transform}/summary.md"));
}

#[test]
fn test_prompt_keeps_context_and_query_in_separate_messages() {
    let messages = build_messages(
        "Answer concisely.",
        "Paging replaces segments with fixed-size frames.",
        "How does paging work?",
    );
    assert_eq!(messages.len(), 4);
    // Retrieved content is delimited and never merged into the query turn
    assert!(messages[2].content.contains("---\nPaging replaces"));
    assert_eq!(messages[3].content, "How does paging work?");
}

#[test]
fn test_chatty_model_output_still_yields_exercises() {
    let raw = concat!(
        "Of course! Here are the questions you asked for:\n\n",
        "[\n",
        "  {\"question\": \"What is a page fault?\", \"choices\": [\"A crash\", \"A miss in the page table\", \"A disk error\", \"A syscall\"], \"correct_answer\": 1, \"explanation\": \"Raised when a page is not resident.\"},\n",
        "  {\"question\": \"What does the TLB cache?\", \"choices\": [\"Disk blocks\", \"Translations\", \"Instructions\", \"Interrupts\"], \"correct_answer\": 1, \"explanation\": \"It caches address translations.\"}\n",
        "]\n\n",
        "Let me know if you want more!"
    );
    let exercises: Vec<Exercise> = extract_json(raw).unwrap();
    assert_eq!(exercises.len(), 2);
    assert_eq!(exercises[0].correct_answer, 1);
    assert_eq!(exercises[1].choices.len(), 4);
}

#[test]
fn test_refusal_output_is_not_silently_accepted() {
    let result: Result<Vec<RevisionSheet>, _> =
        extract_json("I'm sorry, the provided context does not cover this topic.");
    assert!(result.is_err());
}
