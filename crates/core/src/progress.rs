//! Lookup of lesson completion state for one enrollment.

use std::collections::HashMap;

use crate::models::LessonProgress;
use crate::types::EntityId;

/// Progress records keyed by lesson id.
///
/// Lessons without a record are treated as not completed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressIndex {
    by_lesson: HashMap<EntityId, LessonProgress>,
}

impl ProgressIndex {
    /// Build the index from the records of `GET /enrollments/{id}/progress`.
    ///
    /// When the same lesson appears more than once, the last record in
    /// input order wins.
    pub fn build<I>(records: I) -> Self
    where
        I: IntoIterator<Item = LessonProgress>,
    {
        let mut by_lesson = HashMap::new();
        for record in records {
            by_lesson.insert(record.lesson_id.clone(), record);
        }
        Self { by_lesson }
    }

    pub fn get(&self, lesson_id: &str) -> Option<&LessonProgress> {
        self.by_lesson.get(lesson_id)
    }

    /// Whether the lesson has a record marked completed.
    pub fn is_completed(&self, lesson_id: &str) -> bool {
        self.by_lesson
            .get(lesson_id)
            .is_some_and(|p| p.is_completed)
    }

    /// Ids of all lessons marked completed, sorted for stable output.
    pub fn completed_lesson_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .by_lesson
            .values()
            .filter(|p| p.is_completed)
            .map(|p| p.lesson_id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.by_lesson.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_lesson.is_empty()
    }
}

impl FromIterator<LessonProgress> for ProgressIndex {
    fn from_iter<T: IntoIterator<Item = LessonProgress>>(iter: T) -> Self {
        Self::build(iter)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
