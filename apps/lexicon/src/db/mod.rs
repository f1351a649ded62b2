//! Local SQLite storage for words, lessons and exercises.

pub mod error;
pub mod repository;
pub mod schema;
pub mod time;

pub use error::RepositoryError;
pub use repository::{
    ExerciseRepository, LessonRepository, ReviewRepository, SqliteRepository, StatsRepository,
    VocabularyStats, WordRepository,
};
