//! Course completion percentages and enrollment summaries.
//!
//! The server keeps its own `progress_percent` on each enrollment, but
//! the client recomputes completion from the lesson list and progress
//! records so the progress bar and the certificate eligibility check
//! always agree with the gating state shown to the learner.

use serde::Serialize;

use crate::models::{Enrollment, EnrollmentStatus, Lesson};
use crate::progress::ProgressIndex;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Derived completion state of one course for one enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CourseProgress {
    pub completed_count: usize,
    pub total_count: usize,
    /// `round(100 * completed / total)`, 0 for an empty course.
    pub percent: u8,
    pub is_course_complete: bool,
}

/// Counts across a student's enrollments, for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentSummary {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub cancelled: usize,
    /// Completed share of all enrollments, one decimal place.
    pub completion_rate_pct: f64,
}

// ---------------------------------------------------------------------------
// Aggregation functions
// ---------------------------------------------------------------------------

/// Compute a completion percentage from total and completed counts.
///
/// Returns 0 if `total` is 0.
pub fn compute_progress_pct(total: usize, completed: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (completed as f64 / total as f64 * 100.0).round();
    pct.min(100.0) as u8
}

/// Aggregate completion for a course's lessons.
///
/// Only records for lessons in `lessons` count; stray records for other
/// courses' lessons are ignored.
pub fn aggregate(lessons: &[Lesson], progress: &ProgressIndex) -> CourseProgress {
    let total_count = lessons.len();
    let completed_count = lessons
        .iter()
        .filter(|lesson| progress.is_completed(&lesson.id))
        .count();
    let percent = compute_progress_pct(total_count, completed_count);

    CourseProgress {
        completed_count,
        total_count,
        percent,
        is_course_complete: percent >= 100,
    }
}

/// Whether the client should ask the server for a certificate.
///
/// This only predicts the server's decision; the request may still be
/// rejected upstream.
pub fn can_request_certificate(progress: &CourseProgress) -> bool {
    progress.is_course_complete
}

/// Predict the enrollment status the server will store after a progress
/// update.
///
/// The server overwrites the status on every update, so a cancelled
/// enrollment that receives progress comes back active or completed.
pub fn derive_enrollment_status(percent: u8) -> EnrollmentStatus {
    if percent >= 100 {
        EnrollmentStatus::Completed
    } else {
        EnrollmentStatus::Active
    }
}

/// Clamp an advisory percentage (e.g. `Enrollment::progress_percent`) for
/// display in a progress bar.
pub fn clamp_display_pct(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.clamp(0.0, 100.0).round() as u8
}

/// Summarize a student's enrollments by status.
pub fn summarize_enrollments(enrollments: &[Enrollment]) -> EnrollmentSummary {
    let mut summary = EnrollmentSummary {
        total: enrollments.len(),
        active: 0,
        completed: 0,
        cancelled: 0,
        completion_rate_pct: 0.0,
    };

    for enrollment in enrollments {
        match enrollment.status {
            EnrollmentStatus::Active => summary.active += 1,
            EnrollmentStatus::Completed => summary.completed += 1,
            EnrollmentStatus::Cancelled => summary.cancelled += 1,
        }
    }

    if summary.total > 0 {
        let rate = summary.completed as f64 / summary.total as f64 * 100.0;
        summary.completion_rate_pct = (rate * 10.0).round() / 10.0;
    }
    summary
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
