use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Category value marking an originally uploaded file, the root of its
/// transformation tree. Anything else is a derived artifact.
pub const RAW_CATEGORY: &str = "RAW";

/// A stored file, RAW or transformed. `children` is never read from the
/// database; the hierarchy builder populates it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileRecord {
    pub uuid: Uuid,
    pub owner_id: Uuid,
    pub original_filename: String,
    pub blob_name: String,
    pub size: i64,
    pub mime_type: String,
    pub category: String,
    pub module_name: String,
    pub parent_uuid: Option<Uuid>,
    pub uploaded_at: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(default)]
    pub children: Vec<FileRecord>,
}

impl FileRecord {
    pub fn is_raw(&self) -> bool {
        self.category == RAW_CATEGORY
    }
}

/// A registered user, including the stored password hash. Never serialized
/// to responses as-is.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub user_type: String,
}

/// User view safe for the debug listing (no password hash).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserSummary {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub user_type: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Module {
    pub module_id: i32,
    pub module_name: String,
    pub creator_user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Class {
    pub class_id: i32,
    pub class_name: String,
    pub teacher_id: Uuid,
    pub enrollment_code: String,
    pub module_id: i32,
    pub created_at: DateTime<Utc>,
    /// Joined module name, present when listing a teacher's classes
    pub teaching_module_name: Option<String>,
}

/// Reduced class view returned when looking a class up by enrollment code.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ClassSummary {
    pub class_id: i32,
    pub class_name: String,
    pub enrollment_code: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Enrollment {
    pub enrollment_id: i32,
    pub class_id: i32,
    pub student_id: Uuid,
}

// ─── Auth requests/responses ─────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub user_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub access_token: String,
    pub token_type: String,
    pub username: String,
}

// ─── Module/class/enrollment requests/responses ──────────

#[derive(Debug, Clone, Deserialize)]
pub struct ModuleCreateRequest {
    pub module_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleCreateResponse {
    pub module_id: i32,
    pub module_name: String,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleListResponse {
    pub modules: Vec<Module>,
    pub count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassCreateRequest {
    pub class_name: String,
    pub teacher_id: Uuid,
    pub enrollment_code: String,
    pub module_id: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassCreateResponse {
    pub class_id: i32,
    pub class_name: String,
    pub enrollment_code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassListResponse {
    pub classes: Vec<Class>,
    pub count: usize,
}

/// GET /db/classes accepts either a teacher id or an enrollment code.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassesQuery {
    pub teacher_id: Option<Uuid>,
    pub enrollment_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrollmentCreateRequest {
    pub class_id: i32,
    pub student_id: Uuid,
    pub enrollment_code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentCreateResponse {
    pub enrollment_id: i32,
    pub class_id: i32,
    pub student_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentListResponse {
    pub enrollments: Vec<Enrollment>,
    pub count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrollmentsQuery {
    pub student_id: Uuid,
}

// ─── Storage requests/responses ──────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct UploadUrlRequest {
    pub original_filename: String,
    pub size: i64,
    pub mime_type: String,
    pub module_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadUrlResponse {
    pub file_uuid: Uuid,
    pub blob_name: String,
    pub upload_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadUrlResponse {
    pub file_uuid: Uuid,
    pub blob_name: String,
    pub download_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransformRequest {
    pub parent_uuid: Uuid,
    pub filename: String,
    pub size: i64,
    pub mime_type: String,
    /// Transformation kind, e.g. "SUMMARY" or "QUIZ"
    pub category: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransformResponse {
    pub file_uuid: Uuid,
    pub blob_name: String,
}

// ─── Retrieval result shapes ─────────────────────────────

/// One ranked document from the hybrid search backend. Field order and
/// result ordering follow the backend's ranking and are preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub search_score: Option<f64>,
    pub reranker_score: Option<f64>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub chunk_id: Option<String>,
    pub storage_path: Option<String>,
    pub content_type: Option<String>,
    pub caption: Option<String>,
    pub caption_highlights: Option<String>,
}

/// Extractive answer produced by the backend's semantic ranker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticAnswer {
    pub score: Option<f64>,
    pub text: Option<String>,
    pub highlights: Option<String>,
}

/// Normalized outcome of one hybrid search call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub total_count: Option<i64>,
    pub answers: Vec<SemanticAnswer>,
    pub results: Vec<SearchResult>,
}

// ─── Generation artifacts ────────────────────────────────

/// One multiple-choice exercise parsed from model output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub question: String,
    pub choices: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
}

/// One revision sheet parsed from model output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevisionSheet {
    pub title: String,
    pub key_concepts: Vec<String>,
    pub detailed_explanation: String,
}

// ─── RAG requests/responses ──────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExercisesRequest {
    pub query: String,
    #[serde(default = "default_n_questions")]
    pub n_questions: usize,
}

fn default_n_questions() -> usize {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct RevisionRequest {
    pub query: String,
}
