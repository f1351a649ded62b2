//! Word, review and lesson commands.

use crate::db::{
    LessonRepository, RepositoryError, ReviewRepository, StatsRepository, VocabularyStats,
    WordRepository,
};
use crate::generation::GenerationError;
use crate::state::AppState;
use chrono::Utc;
use lexicon_core::parser;
use lexicon_core::types::{Lesson, ReviewOutcome, ReviewStats, Word};
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, serde::Serialize)]
pub struct ImportResult {
    /// Rows read from the file.
    pub parsed: usize,
    /// Definitions stored.
    pub imported: usize,
    pub source: String,
}

#[derive(Debug, serde::Serialize)]
pub struct ReviewResponse {
    pub word: String,
    pub stats: ReviewStats,
}

#[derive(Debug, thiserror::Error, serde::Serialize, serde::Deserialize)]
#[error("{message}")]
pub struct CommandError {
    pub message: String,
}

impl From<RepositoryError> for CommandError {
    fn from(e: RepositoryError) -> Self {
        Self { message: e.to_string() }
    }
}

impl From<lexicon_core::ImportError> for CommandError {
    fn from(e: lexicon_core::ImportError) -> Self {
        Self { message: e.to_string() }
    }
}

impl From<GenerationError> for CommandError {
    fn from(e: GenerationError) -> Self {
        Self { message: e.to_string() }
    }
}

impl From<std::io::Error> for CommandError {
    fn from(e: std::io::Error) -> Self {
        Self { message: e.to_string() }
    }
}

/// Import a CSV word list from disk.
pub fn import_file(path: &Path, state: &AppState) -> Result<ImportResult, CommandError> {
    let content = fs::read_to_string(path)?;
    import_csv(&content, &path.display().to_string(), state)
}

/// Import CSV content. `source` is only used for reporting.
pub fn import_csv(content: &str, source: &str, state: &AppState) -> Result<ImportResult, CommandError> {
    let records = parser::parse(content)?;
    let imported = state.repository().import_records(&records)?;
    info!(source, parsed = records.len(), imported, "import finished");

    Ok(ImportResult {
        parsed: records.len(),
        imported,
        source: source.to_string(),
    })
}

pub fn list_words(state: &AppState) -> Result<Vec<Word>, CommandError> {
    state.repository().list_words().map_err(Into::into)
}

pub fn get_word(text: &str, state: &AppState) -> Result<Word, CommandError> {
    state
        .repository()
        .get_word(text)?
        .ok_or_else(|| RepositoryError::WordNotFound(text.to_string()).into())
}

/// Words whose next review date has passed, soonest first.
pub fn due_words(state: &AppState) -> Result<Vec<Word>, CommandError> {
    state.repository().words_due(Utc::now()).map_err(Into::into)
}

pub fn delete_word(text: &str, state: &AppState) -> Result<(), CommandError> {
    state.repository().delete_word(text).map_err(Into::into)
}

/// Record a flashcard or quiz answer for a word.
pub fn record_review(text: &str, correct: bool, state: &AppState) -> Result<ReviewResponse, CommandError> {
    let stats = state
        .repository()
        .record_review(text, ReviewOutcome::from_correct(correct), Utc::now())?;

    Ok(ReviewResponse {
        word: text.to_string(),
        stats,
    })
}

pub fn vocabulary_stats(state: &AppState) -> Result<VocabularyStats, CommandError> {
    state.repository().vocabulary_stats(Utc::now()).map_err(Into::into)
}

pub fn create_lesson(name: &str, state: &AppState) -> Result<Lesson, CommandError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CommandError {
            message: "lesson name must not be empty".to_string(),
        });
    }
    state.repository().create_lesson(name, Utc::now()).map_err(Into::into)
}

pub fn assign_word_to_lesson(text: &str, lesson_id: i64, state: &AppState) -> Result<(), CommandError> {
    state
        .repository()
        .assign_word_to_lesson(text, lesson_id)
        .map_err(Into::into)
}

pub fn list_lessons(state: &AppState) -> Result<Vec<Lesson>, CommandError> {
    state.repository().list_lessons().map_err(Into::into)
}

/// Delete a lesson together with its words.
pub fn delete_lesson(lesson_id: i64, state: &AppState) -> Result<(), CommandError> {
    state.repository().delete_lesson(lesson_id).map_err(Into::into)
}
