//! Database error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("no valid records to import: every row has an empty definition")]
    NoValidRecords,

    #[error("storage failure: {0}")]
    StorageFailure(#[from] rusqlite::Error),

    #[error("word not found: {0}")]
    WordNotFound(String),

    #[error("lesson not found: {0}")]
    LessonNotFound(i64),

    #[error("exercise group not found: {0}")]
    GroupNotFound(String),

    #[error("exercise {position} not found in group {group_id}")]
    ExerciseNotFound { group_id: String, position: usize },

    #[error("invalid data: {0}")]
    InvalidData(String),
}
