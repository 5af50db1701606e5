use crate::types::EntityId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {entity} is missing required field '{field}'")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: EntityId },

    #[error(
        "Please complete lesson {blocking_position} ({blocking_title}) first before marking this lesson as complete."
    )]
    LessonLocked {
        lesson_id: EntityId,
        blocking_lesson_id: EntityId,
        blocking_position: i32,
        blocking_title: String,
    },
}
