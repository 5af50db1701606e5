//! Records consumed from the EduLearn REST API.
//!
//! These are immutable value types as returned by the server. The core
//! never persists them; callers fetch them per view and hand them to the
//! sequencing, aggregation and certificate modules.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const LEVEL_BEGINNER: &str = "beginner";
pub const LEVEL_INTERMEDIATE: &str = "intermediate";
pub const LEVEL_ADVANCED: &str = "advanced";

/// All valid course level strings.
pub const VALID_COURSE_LEVELS: &[&str] = &[LEVEL_BEGINNER, LEVEL_INTERMEDIATE, LEVEL_ADVANCED];

pub const COURSE_STATUS_DRAFT: &str = "draft";
pub const COURSE_STATUS_PUBLISHED: &str = "published";

/// All valid course status strings.
pub const VALID_COURSE_STATUSES: &[&str] = &[COURSE_STATUS_DRAFT, COURSE_STATUS_PUBLISHED];

pub const ENROLLMENT_ACTIVE: &str = "active";
pub const ENROLLMENT_COMPLETED: &str = "completed";
pub const ENROLLMENT_CANCELLED: &str = "cancelled";

/// All valid enrollment status strings.
pub const VALID_ENROLLMENT_STATUSES: &[&str] =
    &[ENROLLMENT_ACTIVE, ENROLLMENT_COMPLETED, ENROLLMENT_CANCELLED];

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Difficulty level of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    /// Convert from the wire string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            LEVEL_BEGINNER => Ok(Self::Beginner),
            LEVEL_INTERMEDIATE => Ok(Self::Intermediate),
            LEVEL_ADVANCED => Ok(Self::Advanced),
            _ => Err(format!(
                "Invalid course level '{s}'. Must be one of: {}",
                VALID_COURSE_LEVELS.join(", ")
            )),
        }
    }

    /// Convert to the wire string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => LEVEL_BEGINNER,
            Self::Intermediate => LEVEL_INTERMEDIATE,
            Self::Advanced => LEVEL_ADVANCED,
        }
    }
}

/// Publication state of a course. Only published courses accept enrollments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    #[default]
    Draft,
    Published,
}

impl CourseStatus {
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            COURSE_STATUS_DRAFT => Ok(Self::Draft),
            COURSE_STATUS_PUBLISHED => Ok(Self::Published),
            _ => Err(format!(
                "Invalid course status '{s}'. Must be one of: {}",
                VALID_COURSE_STATUSES.join(", ")
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => COURSE_STATUS_DRAFT,
            Self::Published => COURSE_STATUS_PUBLISHED,
        }
    }
}

/// Lifecycle state of an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Cancelled,
}

impl EnrollmentStatus {
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            ENROLLMENT_ACTIVE => Ok(Self::Active),
            ENROLLMENT_COMPLETED => Ok(Self::Completed),
            ENROLLMENT_CANCELLED => Ok(Self::Cancelled),
            _ => Err(format!(
                "Invalid enrollment status '{s}'. Must be one of: {}",
                VALID_ENROLLMENT_STATUSES.join(", ")
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => ENROLLMENT_ACTIVE,
            Self::Completed => ENROLLMENT_COMPLETED,
            Self::Cancelled => ENROLLMENT_CANCELLED,
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A single lesson of a course.
///
/// `position` defines the learning sequence. It is meant to be unique
/// within a course but input lists are neither sorted nor contiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: EntityId,
    pub course_id: EntityId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub position: i32,
}

/// A course as returned by `GET /courses/{id}`, lessons embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub level: CourseLevel,
    #[serde(default)]
    pub status: CourseStatus,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub instructor_id: EntityId,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub enrollment_count: Option<i64>,
}

/// Completion flag for one lesson within one enrollment.
///
/// A missing record means the lesson has not been started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonProgress {
    pub lesson_id: EntityId,
    pub is_completed: bool,
    #[serde(default)]
    pub completed_at: Option<Timestamp>,
}

/// A student's enrollment in a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EntityId,
    pub student_id: EntityId,
    pub course_id: EntityId,
    pub status: EnrollmentStatus,
    /// Server-computed and advisory; gating recomputes from progress records.
    pub progress_percent: f64,
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

/// Body of `POST /enrollments/{id}/progress`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub lesson_id: EntityId,
    pub is_completed: bool,
}

/// Catalog entry as returned by `GET /courses`, without lessons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSummary {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub level: CourseLevel,
    #[serde(default)]
    pub status: CourseStatus,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub enrollment_count: i64,
}

/// Query parameters of `GET /courses`. Unset filters are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CourseFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<CourseLevel>,
}

/// Body of `POST /enrollments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentCreate {
    pub course_id: EntityId,
}

/// Response of `POST /auth/token`. Not `Debug` so the token never ends
/// up in logs.
#[derive(Clone, PartialEq, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Completion certificate returned by `GET /enrollments/{id}/certificate`.
///
/// Every field defaults when absent so that the certificate builder can
/// report exactly which one is missing instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Certificate {
    pub enrollment_id: EntityId,
    pub course_id: EntityId,
    pub course_title: String,
    pub student_id: EntityId,
    pub student_name: String,
    pub issued_at: Option<Timestamp>,
    pub progress_percent: f64,
}

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Validate a lesson before it takes part in sequencing.
pub fn validate_lesson(lesson: &Lesson) -> Result<(), CoreError> {
    if lesson.id.trim().is_empty() {
        return Err(CoreError::MissingField {
            entity: "lesson",
            field: "id",
        });
    }
    Ok(())
}

/// Validate that every embedded lesson belongs to the given course.
///
/// Lessons with an empty `course_id` are accepted as belonging to the
/// enclosing course.
pub fn validate_course_lessons(course: &Course) -> Result<(), CoreError> {
    for lesson in &course.lessons {
        validate_lesson(lesson)?;
        if !lesson.course_id.is_empty() && lesson.course_id != course.id {
            return Err(CoreError::Validation(format!(
                "Lesson '{}' belongs to course '{}', not '{}'",
                lesson.id, lesson.course_id, course.id
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
