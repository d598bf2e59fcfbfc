//! Typed accessors over the relational record store.
//!
//! Every function returns flat rows or scalar ids; shaping (file trees,
//! response envelopes) happens in the callers. Each mutation is a single
//! autocommitted statement, so one request never observes another's
//! uncommitted writes.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{Class, ClassSummary, Enrollment, FileRecord, Module, User, UserSummary};

/// Column set for one file-record insert. `uuid` is generated by the caller
/// because the blob name embeds it before the row exists.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub uuid: Uuid,
    pub owner_id: Uuid,
    pub original_filename: String,
    pub blob_name: String,
    pub size: i64,
    pub mime_type: String,
    pub category: String,
    pub module_name: String,
    pub parent_uuid: Option<Uuid>,
}

/// Outcome of an enrollment attempt. The already-enrolled and wrong-code
/// cases must stay distinct so callers can map them to different statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentOutcome {
    Created(i32),
    AlreadyEnrolled,
    WrongCode,
    ClassMissing,
}

pub async fn ping(pool: &PgPool) -> Result<(), ApiError> {
    sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await?;
    Ok(())
}

// ─── Users ───────────────────────────────────────────────

pub async fn create_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
    user_type: &str,
) -> Result<Uuid, ApiError> {
    let user_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (user_id, username, email, password_hash, user_type) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(user_id)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(user_type)
    .execute(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiError::Conflict("this email address is already in use".to_string())
        }
        _ => e.into(),
    })?;
    Ok(user_id)
}

pub async fn get_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, ApiError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT user_id, username, email, password_hash, user_type FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Debug listing; deliberately omits password hashes.
pub async fn list_users(pool: &PgPool) -> Result<Vec<UserSummary>, ApiError> {
    let users = sqlx::query_as::<_, UserSummary>(
        "SELECT user_id, username, email, user_type FROM users",
    )
    .fetch_all(pool)
    .await?;
    Ok(users)
}

// ─── Files ───────────────────────────────────────────────

pub async fn create_file_record(pool: &PgPool, record: &NewFileRecord) -> Result<(), ApiError> {
    sqlx::query(
        "INSERT INTO files \
         (uuid, owner_id, original_filename, blob_name, size, mime_type, category, module_name, parent_uuid) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(record.uuid)
    .bind(record.owner_id)
    .bind(&record.original_filename)
    .bind(&record.blob_name)
    .bind(record.size)
    .bind(&record.mime_type)
    .bind(&record.category)
    .bind(&record.module_name)
    .bind(record.parent_uuid)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_file_details(pool: &PgPool, uuid: Uuid) -> Result<Option<FileRecord>, ApiError> {
    let record = sqlx::query_as::<_, FileRecord>("SELECT * FROM files WHERE uuid = $1")
        .bind(uuid)
        .fetch_optional(pool)
        .await?;
    Ok(record)
}

/// All files owned by one user, newest upload first.
pub async fn get_user_files(pool: &PgPool, owner_id: Uuid) -> Result<Vec<FileRecord>, ApiError> {
    let records = sqlx::query_as::<_, FileRecord>(
        "SELECT * FROM files WHERE owner_id = $1 ORDER BY uploaded_at DESC",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;
    Ok(records)
}

// ─── Modules ─────────────────────────────────────────────

pub async fn create_module(
    pool: &PgPool,
    module_name: &str,
    creator_user_id: Uuid,
) -> Result<i32, ApiError> {
    let module_id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO modules (module_name, creator_user_id) VALUES ($1, $2) RETURNING module_id",
    )
    .bind(module_name)
    .bind(creator_user_id)
    .fetch_one(pool)
    .await?;
    Ok(module_id)
}

pub async fn get_modules_by_creator(
    pool: &PgPool,
    creator_user_id: Uuid,
) -> Result<Vec<Module>, ApiError> {
    let modules = sqlx::query_as::<_, Module>(
        "SELECT module_id, module_name, creator_user_id, created_at \
         FROM modules WHERE creator_user_id = $1",
    )
    .bind(creator_user_id)
    .fetch_all(pool)
    .await?;
    Ok(modules)
}

pub async fn get_module_by_id(pool: &PgPool, module_id: i32) -> Result<Option<Module>, ApiError> {
    let module = sqlx::query_as::<_, Module>(
        "SELECT module_id, module_name, creator_user_id, created_at \
         FROM modules WHERE module_id = $1",
    )
    .bind(module_id)
    .fetch_optional(pool)
    .await?;
    Ok(module)
}

// ─── Classes ─────────────────────────────────────────────

pub async fn create_class(
    pool: &PgPool,
    class_name: &str,
    teacher_id: Uuid,
    enrollment_code: &str,
    module_id: i32,
) -> Result<i32, ApiError> {
    let class_id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO classes (class_name, teacher_id, enrollment_code, module_id) \
         VALUES ($1, $2, $3, $4) RETURNING class_id",
    )
    .bind(class_name)
    .bind(teacher_id)
    .bind(enrollment_code)
    .bind(module_id)
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiError::Conflict("this enrollment code already exists".to_string())
        }
        _ => e.into(),
    })?;
    Ok(class_id)
}

/// A teacher's classes, with the taught module name joined in.
pub async fn get_classes_by_teacher(
    pool: &PgPool,
    teacher_id: Uuid,
) -> Result<Vec<Class>, ApiError> {
    let classes = sqlx::query_as::<_, Class>(
        "SELECT c.class_id, c.class_name, c.teacher_id, c.enrollment_code, c.module_id, \
                c.created_at, m.module_name AS teaching_module_name \
         FROM classes c \
         JOIN modules m ON c.module_id = m.module_id \
         WHERE c.teacher_id = $1",
    )
    .bind(teacher_id)
    .fetch_all(pool)
    .await?;
    Ok(classes)
}

pub async fn get_class_by_enrollment_code(
    pool: &PgPool,
    code: &str,
) -> Result<Option<ClassSummary>, ApiError> {
    let class = sqlx::query_as::<_, ClassSummary>(
        "SELECT class_id, class_name, enrollment_code FROM classes WHERE enrollment_code = $1",
    )
    .bind(code)
    .fetch_optional(pool)
    .await?;
    Ok(class)
}

// ─── Enrollments ─────────────────────────────────────────

/// Enroll a student after checking the class's real enrollment code.
///
/// The pre-insert existence check gives the common duplicate a clean
/// `AlreadyEnrolled`; the unique (class_id, student_id) constraint catches
/// the race where two identical requests pass the check concurrently.
pub async fn create_enrollment(
    pool: &PgPool,
    class_id: i32,
    student_id: Uuid,
    enrollment_code: &str,
) -> Result<EnrollmentOutcome, ApiError> {
    let existing = sqlx::query_scalar::<_, i32>(
        "SELECT enrollment_id FROM enrollments WHERE class_id = $1 AND student_id = $2",
    )
    .bind(class_id)
    .bind(student_id)
    .fetch_optional(pool)
    .await?;
    if existing.is_some() {
        return Ok(EnrollmentOutcome::AlreadyEnrolled);
    }

    let real_code = sqlx::query_scalar::<_, String>(
        "SELECT enrollment_code FROM classes WHERE class_id = $1",
    )
    .bind(class_id)
    .fetch_optional(pool)
    .await?;
    let real_code = match real_code {
        Some(code) => code,
        None => return Ok(EnrollmentOutcome::ClassMissing),
    };

    if real_code != enrollment_code {
        tracing::warn!(class_id, %student_id, "enrollment rejected: wrong code");
        return Ok(EnrollmentOutcome::WrongCode);
    }

    let inserted = sqlx::query_scalar::<_, i32>(
        "INSERT INTO enrollments (class_id, student_id) VALUES ($1, $2) RETURNING enrollment_id",
    )
    .bind(class_id)
    .bind(student_id)
    .fetch_one(pool)
    .await;

    match inserted {
        Ok(id) => Ok(EnrollmentOutcome::Created(id)),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            Ok(EnrollmentOutcome::AlreadyEnrolled)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn get_enrollments_by_student(
    pool: &PgPool,
    student_id: Uuid,
) -> Result<Vec<Enrollment>, ApiError> {
    let enrollments = sqlx::query_as::<_, Enrollment>(
        "SELECT enrollment_id, class_id, student_id FROM enrollments WHERE student_id = $1",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;
    Ok(enrollments)
}
