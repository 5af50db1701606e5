//! Lesson ordering, sequential gating and navigation.
//!
//! A lesson may be marked complete only once every lesson before it in
//! the course sequence is complete. The sequence is the course's lessons
//! sorted by `position`, ties kept in input order. Completed lessons are
//! never reported locked, so a learner can always mark a completed lesson
//! incomplete again even if an earlier lesson has since regressed.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::CoreError;
use crate::models::{validate_lesson, Lesson};
use crate::progress::ProgressIndex;
use crate::types::EntityId;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Display state of a lesson in the course outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonState {
    /// Marked complete in the progress records.
    Completed,
    /// Not complete, every predecessor is complete.
    Available,
    /// Not complete, some predecessor is still incomplete.
    Locked,
}

/// One row of the course outline sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonOutlineEntry {
    pub lesson_id: EntityId,
    pub title: String,
    pub position: i32,
    /// 1-based index within the sorted sequence ("Lesson 2 of 5").
    pub sequence_number: usize,
    pub state: LessonState,
    /// First incomplete predecessor when `state` is `Locked`.
    pub blocking_lesson_id: Option<EntityId>,
}

/// A course's lessons in learning order.
#[derive(Debug, Clone)]
pub struct LessonSequence<'a> {
    lessons: Vec<&'a Lesson>,
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Sort lessons ascending by position. The sort is stable, so lessons
/// sharing a position keep their input order.
pub fn sort_lessons(lessons: &[Lesson]) -> Vec<&Lesson> {
    let mut sorted: Vec<&Lesson> = lessons.iter().collect();
    sorted.sort_by_key(|lesson| lesson.position);
    sorted
}

impl<'a> LessonSequence<'a> {
    /// Validate and sort a course's lessons.
    ///
    /// Fails when a lesson has a blank id or when two lessons share an id,
    /// since gating queries address lessons by id.
    pub fn new(lessons: &'a [Lesson]) -> Result<Self, CoreError> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(lessons.len());
        for lesson in lessons {
            validate_lesson(lesson)?;
            if !seen.insert(lesson.id.as_str()) {
                return Err(CoreError::Validation(format!(
                    "Duplicate lesson id '{}' in course sequence",
                    lesson.id
                )));
            }
        }
        Ok(Self {
            lessons: sort_lessons(lessons),
        })
    }

    pub fn lessons(&self) -> &[&'a Lesson] {
        &self.lessons
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    pub fn first(&self) -> Option<&'a Lesson> {
        self.lessons.first().copied()
    }

    pub fn get(&self, lesson_id: &str) -> Option<&'a Lesson> {
        self.index_of(lesson_id).map(|i| self.lessons[i])
    }

    /// 1-based place of the lesson in the sequence.
    pub fn sequence_number(&self, lesson_id: &str) -> Option<usize> {
        self.index_of(lesson_id).map(|i| i + 1)
    }

    /// Positions that occur on more than one lesson, ascending.
    pub fn duplicate_positions(&self) -> Vec<i32> {
        let mut duplicates: Vec<i32> = self
            .lessons
            .windows(2)
            .filter(|pair| pair[0].position == pair[1].position)
            .map(|pair| pair[0].position)
            .collect();
        duplicates.dedup();
        duplicates
    }

    fn index_of(&self, lesson_id: &str) -> Option<usize> {
        self.lessons.iter().position(|l| l.id == lesson_id)
    }

    // -----------------------------------------------------------------------
    // Gating
    // -----------------------------------------------------------------------

    /// The lowest-position predecessor that is not completed.
    ///
    /// Returns `None` when the lesson is not locked: it is unknown, already
    /// completed, or every predecessor is completed.
    pub fn blocking_lesson(&self, lesson_id: &str, progress: &ProgressIndex) -> Option<&'a Lesson> {
        let idx = self.index_of(lesson_id)?;
        if progress.is_completed(lesson_id) {
            return None;
        }
        self.lessons[..idx]
            .iter()
            .copied()
            .find(|prev| !progress.is_completed(&prev.id))
    }

    /// Whether the lesson may not yet be marked complete.
    pub fn is_locked(&self, lesson_id: &str, progress: &ProgressIndex) -> bool {
        self.blocking_lesson(lesson_id, progress).is_some()
    }

    pub fn state_of(&self, lesson_id: &str, progress: &ProgressIndex) -> Option<LessonState> {
        self.index_of(lesson_id)?;
        Some(if progress.is_completed(lesson_id) {
            LessonState::Completed
        } else if self.is_locked(lesson_id, progress) {
            LessonState::Locked
        } else {
            LessonState::Available
        })
    }

    /// Pre-check a request to set a lesson's completion flag.
    ///
    /// Marking incomplete is always allowed. Marking complete fails with
    /// [`CoreError::LessonLocked`] naming the first incomplete predecessor.
    pub fn check_completion(
        &self,
        lesson_id: &str,
        completed: bool,
        progress: &ProgressIndex,
    ) -> Result<(), CoreError> {
        if self.index_of(lesson_id).is_none() {
            return Err(CoreError::NotFound {
                entity: "lesson",
                id: lesson_id.to_string(),
            });
        }
        if !completed {
            return Ok(());
        }
        match self.blocking_lesson(lesson_id, progress) {
            Some(blocking) => Err(CoreError::LessonLocked {
                lesson_id: lesson_id.to_string(),
                blocking_lesson_id: blocking.id.clone(),
                blocking_position: blocking.position,
                blocking_title: blocking.title.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Per-lesson state for the outline sidebar, in sequence order.
    pub fn outline(&self, progress: &ProgressIndex) -> Vec<LessonOutlineEntry> {
        let mut first_incomplete: Option<&Lesson> = None;
        let mut entries = Vec::with_capacity(self.lessons.len());

        for (i, lesson) in self.lessons.iter().copied().enumerate() {
            let completed = progress.is_completed(&lesson.id);
            let (state, blocking) = match (completed, first_incomplete) {
                (true, _) => (LessonState::Completed, None),
                (false, Some(prev)) => (LessonState::Locked, Some(prev.id.clone())),
                (false, None) => (LessonState::Available, None),
            };
            entries.push(LessonOutlineEntry {
                lesson_id: lesson.id.clone(),
                title: lesson.title.clone(),
                position: lesson.position,
                sequence_number: i + 1,
                state,
                blocking_lesson_id: blocking,
            });
            if !completed && first_incomplete.is_none() {
                first_incomplete = Some(lesson);
            }
        }
        entries
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    pub fn next(&self, lesson_id: &str) -> Option<&'a Lesson> {
        let idx = self.index_of(lesson_id)?;
        self.lessons.get(idx + 1).copied()
    }

    pub fn previous(&self, lesson_id: &str) -> Option<&'a Lesson> {
        let idx = self.index_of(lesson_id)?;
        idx.checked_sub(1).map(|i| self.lessons[i])
    }

    /// Where a returning learner should continue: the first lesson not yet
    /// completed, or the last lesson once everything is done.
    pub fn resume_lesson(&self, progress: &ProgressIndex) -> Option<&'a Lesson> {
        self.lessons
            .iter()
            .copied()
            .find(|l| !progress.is_completed(&l.id))
            .or_else(|| self.lessons.last().copied())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::models::LessonProgress;

    fn lesson(id: &str, position: i32) -> Lesson {
        Lesson {
            id: id.to_string(),
            course_id: "c1".to_string(),
            title: format!("Title {id}"),
            content: String::new(),
            video_url: None,
            thumbnail_url: None,
            position,
        }
    }

    fn done(ids: &[&str]) -> ProgressIndex {
        ProgressIndex::build(ids.iter().map(|id| LessonProgress {
            lesson_id: id.to_string(),
            is_completed: true,
            completed_at: None,
        }))
    }

    fn ids(lessons: &[&Lesson]) -> Vec<String> {
        lessons.iter().map(|l| l.id.clone()).collect()
    }

    // -- sort_lessons ---------------------------------------------------------

    #[test]
    fn sort_orders_by_position() {
        let lessons = vec![lesson("c", 3), lesson("a", 1), lesson("b", 2)];
        assert_eq!(ids(&sort_lessons(&lessons)), vec!["a", "b", "c"]);
    }

    #[test]
    fn sort_is_stable_for_equal_positions() {
        let lessons = vec![lesson("x", 2), lesson("y", 1), lesson("z", 2)];
        assert_eq!(ids(&sort_lessons(&lessons)), vec!["y", "x", "z"]);
    }

    #[test]
    fn sort_handles_gaps_in_positions() {
        let lessons = vec![lesson("b", 10), lesson("a", 5), lesson("c", 40)];
        assert_eq!(ids(&sort_lessons(&lessons)), vec!["a", "b", "c"]);
    }

    // -- LessonSequence::new --------------------------------------------------

    #[test]
    fn duplicate_lesson_ids_are_rejected() {
        let lessons = vec![lesson("a", 1), lesson("a", 2)];
        assert_matches!(LessonSequence::new(&lessons), Err(CoreError::Validation(_)));
    }

    #[test]
    fn blank_lesson_id_is_rejected() {
        let lessons = vec![lesson("", 1)];
        assert_matches!(
            LessonSequence::new(&lessons),
            Err(CoreError::MissingField { field: "id", .. })
        );
    }

    #[test]
    fn duplicate_positions_are_reported() {
        let lessons = vec![lesson("a", 1), lesson("b", 2), lesson("c", 2), lesson("d", 2)];
        let seq = LessonSequence::new(&lessons).unwrap();
        assert_eq!(seq.duplicate_positions(), vec![2]);
    }

    #[test]
    fn earlier_of_equal_positions_gates_the_later() {
        let lessons = vec![lesson("x", 2), lesson("y", 1), lesson("z", 2)];
        let seq = LessonSequence::new(&lessons).unwrap();

        let progress = done(&["y"]);
        assert!(!seq.is_locked("x", &progress));
        assert!(seq.is_locked("z", &progress));
        assert_eq!(seq.blocking_lesson("z", &progress).unwrap().id, "x");

        let progress = done(&["y", "x"]);
        assert!(!seq.is_locked("z", &progress));
    }

    // -- Gating ---------------------------------------------------------------

    #[test]
    fn first_lesson_is_never_locked() {
        let lessons = vec![lesson("b", 2), lesson("a", 1)];
        let seq = LessonSequence::new(&lessons).unwrap();
        assert!(!seq.is_locked("a", &ProgressIndex::default()));
    }

    #[test]
    fn single_lesson_course_is_never_locked() {
        let lessons = vec![lesson("only", 7)];
        let seq = LessonSequence::new(&lessons).unwrap();
        assert!(!seq.is_locked("only", &ProgressIndex::default()));
        assert!(seq.blocking_lesson("only", &ProgressIndex::default()).is_none());
    }

    #[test]
    fn later_lesson_locked_until_predecessors_complete() {
        let lessons = vec![lesson("l1", 1), lesson("l2", 2), lesson("l3", 3)];
        let seq = LessonSequence::new(&lessons).unwrap();
        let progress = done(&["l1"]);

        assert!(!seq.is_locked("l2", &progress));
        assert!(seq.is_locked("l3", &progress));
        assert_eq!(seq.blocking_lesson("l3", &progress).unwrap().id, "l2");
    }

    #[test]
    fn blocking_lesson_is_lowest_incomplete_predecessor() {
        let lessons = vec![lesson("l1", 1), lesson("l2", 2), lesson("l3", 3), lesson("l4", 4)];
        let seq = LessonSequence::new(&lessons).unwrap();
        let progress = done(&["l2"]);
        assert_eq!(seq.blocking_lesson("l4", &progress).unwrap().id, "l1");
    }

    #[test]
    fn completed_lesson_is_never_locked() {
        let lessons = vec![lesson("l1", 1), lesson("l2", 2), lesson("l3", 3)];
        let seq = LessonSequence::new(&lessons).unwrap();
        // l1 regressed to incomplete after l3 was completed.
        let progress = done(&["l3"]);
        assert!(!seq.is_locked("l3", &progress));
        assert!(seq.blocking_lesson("l3", &progress).is_none());
    }

    #[test]
    fn unknown_lesson_is_not_locked() {
        let lessons = vec![lesson("l1", 1)];
        let seq = LessonSequence::new(&lessons).unwrap();
        assert!(!seq.is_locked("nope", &ProgressIndex::default()));
        assert!(seq.state_of("nope", &ProgressIndex::default()).is_none());
    }

    #[test]
    fn state_of_reports_all_three_states() {
        let lessons = vec![lesson("l1", 1), lesson("l2", 2), lesson("l3", 3)];
        let seq = LessonSequence::new(&lessons).unwrap();
        let progress = done(&["l1"]);
        assert_eq!(seq.state_of("l1", &progress), Some(LessonState::Completed));
        assert_eq!(seq.state_of("l2", &progress), Some(LessonState::Available));
        assert_eq!(seq.state_of("l3", &progress), Some(LessonState::Locked));
    }

    // -- check_completion -----------------------------------------------------

    #[test]
    fn check_completion_names_prerequisite() {
        let lessons = vec![lesson("l1", 1), lesson("l2", 2), lesson("l3", 3)];
        let seq = LessonSequence::new(&lessons).unwrap();
        let err = seq
            .check_completion("l3", true, &ProgressIndex::default())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please complete lesson 1 (Title l1) first before marking this lesson as complete."
        );
        assert_matches!(err, CoreError::LessonLocked { blocking_position: 1, .. });
    }

    #[test]
    fn mark_incomplete_is_always_allowed() {
        let lessons = vec![lesson("l1", 1), lesson("l2", 2)];
        let seq = LessonSequence::new(&lessons).unwrap();
        assert!(seq
            .check_completion("l2", false, &ProgressIndex::default())
            .is_ok());
    }

    #[test]
    fn check_completion_unknown_lesson_is_not_found() {
        let lessons = vec![lesson("l1", 1)];
        let seq = LessonSequence::new(&lessons).unwrap();
        assert_matches!(
            seq.check_completion("l9", true, &ProgressIndex::default()),
            Err(CoreError::NotFound { entity: "lesson", .. })
        );
    }

    // -- outline --------------------------------------------------------------

    #[test]
    fn outline_matches_gating_queries() {
        let lessons = vec![lesson("l3", 3), lesson("l1", 1), lesson("l2", 2)];
        let seq = LessonSequence::new(&lessons).unwrap();
        let progress = done(&["l1"]);
        let outline = seq.outline(&progress);

        assert_eq!(outline.len(), 3);
        assert_eq!(outline[0].state, LessonState::Completed);
        assert_eq!(outline[1].state, LessonState::Available);
        assert_eq!(outline[2].state, LessonState::Locked);
        assert_eq!(outline[2].blocking_lesson_id.as_deref(), Some("l2"));
        assert_eq!(outline[2].sequence_number, 3);

        for entry in &outline {
            assert_eq!(
                entry.state == LessonState::Locked,
                seq.is_locked(&entry.lesson_id, &progress)
            );
        }
    }

    // -- Navigation -----------------------------------------------------------

    #[test]
    fn navigation_follows_sorted_order() {
        let lessons = vec![lesson("l2", 20), lesson("l1", 10), lesson("l3", 30)];
        let seq = LessonSequence::new(&lessons).unwrap();
        assert_eq!(seq.next("l1").unwrap().id, "l2");
        assert_eq!(seq.previous("l3").unwrap().id, "l2");
        assert!(seq.previous("l1").is_none());
        assert!(seq.next("l3").is_none());
        assert!(seq.next("missing").is_none());
    }

    #[test]
    fn empty_course_has_no_navigation() {
        let lessons: Vec<Lesson> = Vec::new();
        let seq = LessonSequence::new(&lessons).unwrap();
        assert!(seq.is_empty());
        assert!(seq.first().is_none());
        assert!(seq.resume_lesson(&ProgressIndex::default()).is_none());
        assert!(!seq.is_locked("any", &ProgressIndex::default()));
    }

    #[test]
    fn resume_lesson_picks_first_incomplete_then_last() {
        let lessons = vec![lesson("l1", 1), lesson("l2", 2)];
        let seq = LessonSequence::new(&lessons).unwrap();
        assert_eq!(seq.resume_lesson(&done(&["l1"])).unwrap().id, "l2");
        assert_eq!(seq.resume_lesson(&done(&["l1", "l2"])).unwrap().id, "l2");
    }
}
