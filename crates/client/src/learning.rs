//! The learning flow: fetch course state, derive gating and progress,
//! forward completion changes, and lay out certificates.
//!
//! Derived state is never cached or patched locally. After every change
//! the course is re-fetched and re-derived from the server's records.

use edulearn_core::aggregation::{
    aggregate, can_request_certificate, clamp_display_pct, derive_enrollment_status,
    summarize_enrollments, CourseProgress, EnrollmentSummary,
};
use edulearn_core::certificate::{
    certificate_file_name, CertificateDocumentBuilder, DrawInstruction,
};
use edulearn_core::models::{
    validate_course_lessons, Certificate, Course, CourseFilter, CourseSummary, Enrollment,
    EnrollmentStatus, Lesson, ProgressUpdate,
};
use edulearn_core::progress::ProgressIndex;
use edulearn_core::sequencing::{LessonOutlineEntry, LessonSequence};
use edulearn_core::types::EntityId;
use serde::Serialize;

use crate::api::LearningApi;
use crate::error::{ClientError, ClientResult};

/// Everything the learning page needs for one course, as last fetched.
#[derive(Debug, Clone)]
pub struct CourseView {
    pub course: Course,
    pub enrollment: Enrollment,
    pub progress: ProgressIndex,
}

impl CourseView {
    /// The course's lessons in learning order.
    pub fn sequence(&self) -> ClientResult<LessonSequence<'_>> {
        Ok(LessonSequence::new(&self.course.lessons)?)
    }

    pub fn course_progress(&self) -> CourseProgress {
        aggregate(&self.course.lessons, &self.progress)
    }

    /// The status the server will store for this enrollment on its next
    /// progress update.
    pub fn expected_status(&self) -> EnrollmentStatus {
        derive_enrollment_status(self.course_progress().percent)
    }

    pub fn outline(&self) -> ClientResult<Vec<LessonOutlineEntry>> {
        Ok(self.sequence()?.outline(&self.progress))
    }

    pub fn is_completed(&self, lesson_id: &str) -> bool {
        self.progress.is_completed(lesson_id)
    }

    pub fn is_locked(&self, lesson_id: &str) -> ClientResult<bool> {
        Ok(self.sequence()?.is_locked(lesson_id, &self.progress))
    }

    /// The lesson that has to be completed before `lesson_id` opens up.
    pub fn blocking_lesson(&self, lesson_id: &str) -> ClientResult<Option<&Lesson>> {
        Ok(self.sequence()?.blocking_lesson(lesson_id, &self.progress))
    }
}

/// A laid-out certificate ready for rendering and download.
#[derive(Debug, Clone, Serialize)]
pub struct CertificateDocument {
    pub file_name: String,
    pub certificate: Certificate,
    pub instructions: Vec<DrawInstruction>,
}

/// One enrollment as shown on the student dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentOverview {
    pub enrollment_id: EntityId,
    pub course_id: EntityId,
    pub status: EnrollmentStatus,
    /// Server-reported progress, clamped for a progress bar.
    pub progress_pct: u8,
    pub certificate_available: bool,
}

/// The student dashboard: status counts plus one row per enrollment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentDashboard {
    pub summary: EnrollmentSummary,
    pub enrollments: Vec<EnrollmentOverview>,
}

/// Drives the learning flow against a [`LearningApi`].
pub struct LearningService<A> {
    api: A,
}

impl<A: LearningApi> LearningService<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Browse the course catalog.
    pub async fn catalog(&self, filter: &CourseFilter) -> ClientResult<Vec<CourseSummary>> {
        let courses = self.api.list_courses(filter).await?;
        tracing::debug!(count = courses.len(), "Fetched course catalog");
        Ok(courses)
    }

    /// Enroll the current user in a course and return its fresh view.
    pub async fn enroll(&self, course_id: &str) -> ClientResult<CourseView> {
        let enrollment = self.api.enroll(course_id).await?;
        tracing::info!(
            course_id,
            enrollment_id = %enrollment.id,
            "Enrolled in course",
        );
        self.load_course(course_id).await
    }

    /// Summarize the current user's enrollments.
    ///
    /// Progress comes from the server's advisory `progress_percent`; the
    /// per-course view recomputes it from progress records instead.
    pub async fn dashboard(&self) -> ClientResult<StudentDashboard> {
        let enrollments = self.api.my_enrollments().await?;
        let summary = summarize_enrollments(&enrollments);
        let enrollments = enrollments
            .into_iter()
            .map(|enrollment| {
                let progress_pct = clamp_display_pct(enrollment.progress_percent);
                EnrollmentOverview {
                    enrollment_id: enrollment.id,
                    course_id: enrollment.course_id,
                    status: enrollment.status,
                    progress_pct,
                    certificate_available: progress_pct >= 100,
                }
            })
            .collect();
        Ok(StudentDashboard {
            summary,
            enrollments,
        })
    }

    /// Fetch the course, the current user's enrollment in it, and the
    /// enrollment's progress records.
    pub async fn load_course(&self, course_id: &str) -> ClientResult<CourseView> {
        let course = self.api.get_course(course_id).await?;
        validate_course_lessons(&course)?;

        let duplicates = LessonSequence::new(&course.lessons)?.duplicate_positions();
        if !duplicates.is_empty() {
            tracing::warn!(
                course_id = %course.id,
                positions = ?duplicates,
                "Course has lessons sharing a position; keeping input order",
            );
        }

        let enrollment = self
            .api
            .my_enrollments()
            .await?
            .into_iter()
            .find(|e| e.course_id == course.id)
            .ok_or_else(|| ClientError::NotEnrolled {
                course_id: course.id.clone(),
            })?;

        let records = self.api.get_progress(&enrollment.id).await?;
        let progress = ProgressIndex::build(records);

        let view = CourseView {
            course,
            enrollment,
            progress,
        };
        let summary = view.course_progress();
        tracing::debug!(
            course_id = %view.course.id,
            enrollment_id = %view.enrollment.id,
            completed = summary.completed_count,
            total = summary.total_count,
            percent = summary.percent,
            "Loaded course view",
        );
        Ok(view)
    }

    /// Set a lesson's completion flag, then re-fetch the course view.
    ///
    /// Marking complete is refused locally while an earlier lesson is
    /// incomplete. Marking incomplete is always forwarded.
    pub async fn set_lesson_completion(
        &self,
        view: &CourseView,
        lesson_id: &str,
        completed: bool,
    ) -> ClientResult<CourseView> {
        view.sequence()?
            .check_completion(lesson_id, completed, &view.progress)?;

        let update = ProgressUpdate {
            lesson_id: lesson_id.to_string(),
            is_completed: completed,
        };
        let updated = self
            .api
            .update_progress(&view.enrollment.id, &update)
            .await?;
        tracing::info!(
            enrollment_id = %view.enrollment.id,
            lesson_id,
            completed,
            status = updated.status.as_str(),
            "Lesson progress updated",
        );

        let refreshed = self.load_course(&view.course.id).await?;
        if refreshed.expected_status() != updated.status {
            tracing::debug!(
                enrollment_id = %updated.id,
                expected = refreshed.expected_status().as_str(),
                stored = updated.status.as_str(),
                "Server status differs from recomputed progress",
            );
        }
        Ok(refreshed)
    }

    /// Flip a lesson between complete and incomplete.
    pub async fn toggle_lesson(
        &self,
        view: &CourseView,
        lesson_id: &str,
    ) -> ClientResult<CourseView> {
        let completed = !view.is_completed(lesson_id);
        self.set_lesson_completion(view, lesson_id, completed).await
    }

    /// Request the enrollment's certificate and lay it out.
    ///
    /// Refused locally with [`ClientError::CertificateNotReady`] unless
    /// every lesson is complete; a server-side refusal is returned as
    /// [`ClientError::Upstream`].
    pub async fn certificate_document(
        &self,
        view: &CourseView,
        builder: &CertificateDocumentBuilder,
    ) -> ClientResult<CertificateDocument> {
        let progress = view.course_progress();
        if !can_request_certificate(&progress) {
            return Err(ClientError::CertificateNotReady {
                percent: progress.percent,
            });
        }

        let certificate = self.api.get_certificate(&view.enrollment.id).await?;
        let instructions = builder.build(&certificate)?;
        let file_name = certificate_file_name(&certificate.course_title);

        tracing::info!(
            enrollment_id = %view.enrollment.id,
            file_name = %file_name,
            instructions = instructions.len(),
            "Certificate laid out",
        );
        Ok(CertificateDocument {
            file_name,
            certificate,
            instructions,
        })
    }
}
