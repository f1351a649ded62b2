//! Repository pattern for database access.

use crate::db::error::RepositoryError;
use crate::db::time;
use chrono::{DateTime, Utc};
use lexicon_core::srs;
use lexicon_core::types::{
    CefrLevel, Definition, Exercise, ExerciseGroup, ExerciseKind, ImportedRecord, Lesson,
    MasteryTier, ReviewOutcome, ReviewStats, Word, WordClass,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::{debug, info};

type Result<T> = std::result::Result<T, RepositoryError>;

/// Repository for word and definition lifecycle.
pub trait WordRepository {
    fn import_records(&self, records: &[ImportedRecord]) -> Result<usize>;
    fn get_word(&self, text: &str) -> Result<Option<Word>>;
    fn list_words(&self) -> Result<Vec<Word>>;
    fn words_due(&self, now: DateTime<Utc>) -> Result<Vec<Word>>;
    fn delete_word(&self, text: &str) -> Result<()>;
}

/// Repository for review outcomes.
pub trait ReviewRepository {
    fn record_review(
        &self,
        text: &str,
        outcome: ReviewOutcome,
        now: DateTime<Utc>,
    ) -> Result<ReviewStats>;
}

/// Repository for lesson operations.
pub trait LessonRepository {
    fn create_lesson(&self, name: &str, now: DateTime<Utc>) -> Result<Lesson>;
    fn assign_word_to_lesson(&self, text: &str, lesson_id: i64) -> Result<()>;
    fn list_lessons(&self) -> Result<Vec<Lesson>>;
    fn delete_lesson(&self, lesson_id: i64) -> Result<()>;
}

/// Repository for generated exercises.
pub trait ExerciseRepository {
    fn save_group(&self, group: &ExerciseGroup) -> Result<()>;
    fn save_groups(&self, groups: &[ExerciseGroup]) -> Result<()>;
    fn get_group(&self, id: &str) -> Result<Option<ExerciseGroup>>;
    fn list_groups(&self) -> Result<Vec<ExerciseGroup>>;
    fn record_exercise_attempt(
        &self,
        group_id: &str,
        position: usize,
        correct: bool,
        now: DateTime<Utc>,
    ) -> Result<Exercise>;
    fn delete_group(&self, id: &str) -> Result<()>;
}

/// Vocabulary statistics.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct VocabularyStats {
    pub total_words: usize,
    pub due_words: usize,
    pub new_words: usize,
    pub learning_words: usize,
    pub familiar_words: usize,
    pub mastered_words: usize,
}

/// Repository for statistics operations.
pub trait StatsRepository {
    fn vocabulary_stats(&self, now: DateTime<Utc>) -> Result<VocabularyStats>;
}

const WORD_COLUMNS: &str =
    "id, text, date_added, lesson_id, next_review_date, review_count, correct_count";

/// SQLite implementation of repositories.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open database at path, creating if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(super::schema::SCHEMA)?;
        Ok(())
    }

    fn find_word_id(conn: &Connection, text: &str) -> Result<Option<i64>> {
        conn.query_row("SELECT id FROM words WHERE text = ?1", params![text], |row| row.get(0))
            .optional()
            .map_err(Into::into)
    }

    fn insert_definition(conn: &Connection, word_id: i64, definition: &Definition) -> Result<()> {
        let synonyms = serde_json::to_string(&definition.synonyms)
            .map_err(|e| RepositoryError::InvalidData(e.to_string()))?;
        conn.execute(
            "INSERT INTO definitions (word_id, position, text, word_class, level, translation, synonyms)
             VALUES (?1, (SELECT COUNT(*) FROM definitions WHERE word_id = ?1), ?2, ?3, ?4, ?5, ?6)",
            params![
                word_id,
                definition.text,
                definition.word_class.as_str(),
                definition.level.as_str(),
                definition.translation,
                synonyms,
            ],
        )?;
        Ok(())
    }

    fn load_definitions(&self, word_id: i64) -> Result<Vec<Definition>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT text, word_class, level, translation, synonyms
             FROM definitions WHERE word_id = ?1 ORDER BY position, id",
        )?;
        let definitions = stmt
            .query_map(params![word_id], |row| {
                Ok(Definition {
                    text: row.get(0)?,
                    word_class: WordClass::from_loose(&row.get::<_, String>(1)?),
                    level: CefrLevel::from_loose(&row.get::<_, String>(2)?),
                    translation: row.get(3)?,
                    synonyms: json_column(row, 4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(definitions)
    }

    fn query_words(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Word>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut words = stmt
            .query_map(params, Self::row_to_word)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        for word in &mut words {
            word.definitions = self.load_definitions(word.id)?;
        }
        Ok(words)
    }

    fn row_to_word(row: &Row) -> rusqlite::Result<Word> {
        Ok(Word {
            id: row.get(0)?,
            text: row.get(1)?,
            date_added: time_column(row, 2)?,
            lesson_id: row.get(3)?,
            review: ReviewStats::restore(time_column(row, 4)?, row.get(5)?, row.get(6)?),
            definitions: Vec::new(),
        })
    }

    fn row_to_exercise(row: &Row) -> rusqlite::Result<Exercise> {
        Ok(Exercise {
            id: row.get(0)?,
            kind: ExerciseKind::from_loose(&row.get::<_, String>(1)?),
            instruction: row.get(2)?,
            sentence: row.get(3)?,
            answer: row.get(4)?,
            hint: row.get(5)?,
            options: match row.get::<_, Option<String>>(6)? {
                Some(raw) => Some(serde_json::from_str(&raw).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e))
                })?),
                None => None,
            },
            difficulty: row.get(7)?,
            times_shown: row.get(8)?,
            times_correct: row.get(9)?,
            last_shown_at: match row.get::<_, Option<String>>(10)? {
                Some(raw) => Some(time::decode(&raw).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(10, Type::Text, Box::new(e))
                })?),
                None => None,
            },
        })
    }

    fn load_exercises(&self, group_id: &str) -> Result<Vec<Exercise>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT exercise_id, kind, instruction, sentence, answer, hint, options, difficulty,
                    times_shown, times_correct, last_shown_at
             FROM exercises WHERE group_id = ?1 ORDER BY position",
        )?;
        let exercises = stmt
            .query_map(params![group_id], Self::row_to_exercise)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(exercises)
    }

    fn query_groups(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<ExerciseGroup>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut groups = stmt
            .query_map(params, |row| {
                Ok(ExerciseGroup {
                    id: row.get(0)?,
                    source_id: row.get(1)?,
                    name: row.get(2)?,
                    word_texts: json_column(row, 3)?,
                    generated_at: time_column(row, 4)?,
                    exercises: Vec::new(),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        for group in &mut groups {
            group.exercises = self.load_exercises(&group.id)?;
        }
        Ok(groups)
    }

    /// Insert one group and its exercises. Runs inside the caller's transaction.
    fn insert_group(conn: &Connection, group: &ExerciseGroup) -> Result<()> {
        let word_texts = serde_json::to_string(&group.word_texts)
            .map_err(|e| RepositoryError::InvalidData(e.to_string()))?;

        conn.execute(
            "INSERT INTO exercise_groups (id, source_id, name, word_texts, generated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                group.id,
                group.source_id,
                group.name,
                word_texts,
                time::encode(group.generated_at),
            ],
        )?;

        for (position, exercise) in group.exercises.iter().enumerate() {
            let options = exercise
                .options
                .as_ref()
                .map(serde_json::to_string)
                .transpose()
                .map_err(|e| RepositoryError::InvalidData(e.to_string()))?;
            conn.execute(
                "INSERT INTO exercises (group_id, position, exercise_id, kind, instruction, sentence,
                                        answer, hint, options, difficulty, times_shown, times_correct,
                                        last_shown_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    group.id,
                    position,
                    exercise.id,
                    exercise.kind.as_tag(),
                    exercise.instruction,
                    exercise.sentence,
                    exercise.answer,
                    exercise.hint,
                    options,
                    exercise.difficulty,
                    exercise.times_shown,
                    exercise.times_correct,
                    exercise.last_shown_at.map(time::encode),
                ],
            )?;
        }

        Ok(())
    }

    /// Delete words and their definitions. Runs inside the caller's transaction.
    fn delete_words_where(conn: &Connection, condition: &str, param: &dyn rusqlite::ToSql) -> Result<usize> {
        conn.execute(
            &format!("DELETE FROM definitions WHERE word_id IN (SELECT id FROM words WHERE {condition})"),
            params![param],
        )?;
        let count = conn.execute(&format!("DELETE FROM words WHERE {condition}"), params![param])?;
        Ok(count)
    }
}

impl WordRepository for SqliteRepository {
    /// Merge parsed records into the store as one transaction.
    ///
    /// A record whose text matches an existing word (or one created earlier in
    /// the same batch) gains a new definition; otherwise a word is created.
    fn import_records(&self, records: &[ImportedRecord]) -> Result<usize> {
        let valid: Vec<&ImportedRecord> = records
            .iter()
            .filter(|r| !r.definition.trim().is_empty())
            .collect();
        if valid.is_empty() {
            return Err(RepositoryError::NoValidRecords);
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut saved = 0;
        let mut created = 0;

        for record in valid {
            let word_id = match Self::find_word_id(&tx, &record.text)? {
                Some(id) => id,
                None => {
                    let added = time::encode(record.date_added);
                    tx.execute(
                        "INSERT INTO words (text, date_added, next_review_date, mastery)
                         VALUES (?1, ?2, ?2, ?3)",
                        params![record.text, added, MasteryTier::New.as_str()],
                    )?;
                    created += 1;
                    tx.last_insert_rowid()
                }
            };
            Self::insert_definition(&tx, word_id, &record.to_definition())?;
            saved += 1;
        }

        tx.commit()?;
        info!(saved, created, skipped = records.len() - saved, "imported vocabulary records");
        Ok(saved)
    }

    fn get_word(&self, text: &str) -> Result<Option<Word>> {
        let word = self
            .conn
            .query_row(
                &format!("SELECT {WORD_COLUMNS} FROM words WHERE text = ?1"),
                params![text],
                Self::row_to_word,
            )
            .optional()?;

        match word {
            Some(mut word) => {
                word.definitions = self.load_definitions(word.id)?;
                Ok(Some(word))
            }
            None => Ok(None),
        }
    }

    fn list_words(&self) -> Result<Vec<Word>> {
        self.query_words(&format!("SELECT {WORD_COLUMNS} FROM words ORDER BY text"), [])
    }

    fn words_due(&self, now: DateTime<Utc>) -> Result<Vec<Word>> {
        self.query_words(
            &format!(
                "SELECT {WORD_COLUMNS} FROM words
                 WHERE next_review_date <= ?1
                 ORDER BY next_review_date, text"
            ),
            params![time::encode(now)],
        )
    }

    fn delete_word(&self, text: &str) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let count = Self::delete_words_where(&tx, "text = ?1", &text)?;
        if count == 0 {
            return Err(RepositoryError::WordNotFound(text.to_string()));
        }
        tx.commit()?;
        Ok(())
    }
}

impl ReviewRepository for SqliteRepository {
    fn record_review(
        &self,
        text: &str,
        outcome: ReviewOutcome,
        now: DateTime<Utc>,
    ) -> Result<ReviewStats> {
        let tx = self.conn.unchecked_transaction()?;

        let (word_id, current) = tx
            .query_row(
                "SELECT id, next_review_date, review_count, correct_count FROM words WHERE text = ?1",
                params![text],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        ReviewStats::restore(time_column(row, 1)?, row.get(2)?, row.get(3)?),
                    ))
                },
            )
            .optional()?
            .ok_or_else(|| RepositoryError::WordNotFound(text.to_string()))?;

        let next = srs::apply_review(&current, outcome, now);

        tx.execute(
            "UPDATE words SET next_review_date = ?1, review_count = ?2, correct_count = ?3, mastery = ?4
             WHERE id = ?5",
            params![
                time::encode(next.next_review_date()),
                next.review_count(),
                next.correct_count(),
                next.mastery().as_str(),
                word_id,
            ],
        )?;
        tx.commit()?;

        debug!(word = text, tier = next.mastery().as_str(), "recorded review");
        Ok(next)
    }
}

impl LessonRepository for SqliteRepository {
    fn create_lesson(&self, name: &str, now: DateTime<Utc>) -> Result<Lesson> {
        let sort_order: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM lessons",
            [],
            |row| row.get(0),
        )?;
        self.conn.execute(
            "INSERT INTO lessons (name, created_at, sort_order) VALUES (?1, ?2, ?3)",
            params![name, time::encode(now), sort_order],
        )?;

        Ok(Lesson::new(
            self.conn.last_insert_rowid(),
            name.to_string(),
            now,
            sort_order,
            0,
            0,
        ))
    }

    fn assign_word_to_lesson(&self, text: &str, lesson_id: i64) -> Result<()> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM lessons WHERE id = ?1)",
            params![lesson_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(RepositoryError::LessonNotFound(lesson_id));
        }

        let count = self.conn.execute(
            "UPDATE words SET lesson_id = ?1 WHERE text = ?2",
            params![lesson_id, text],
        )?;
        if count == 0 {
            return Err(RepositoryError::WordNotFound(text.to_string()));
        }
        Ok(())
    }

    fn list_lessons(&self) -> Result<Vec<Lesson>> {
        let mut stmt = self.conn.prepare(
            "SELECT l.id, l.name, l.created_at, l.sort_order,
                    COUNT(w.id),
                    COALESCE(SUM(CASE WHEN w.mastery = ?1 THEN 1 ELSE 0 END), 0)
             FROM lessons l
             LEFT JOIN words w ON w.lesson_id = l.id
             GROUP BY l.id
             ORDER BY l.sort_order, l.id",
        )?;

        let lessons = stmt
            .query_map(params![MasteryTier::Mastered.as_str()], |row| {
                Ok(Lesson::new(
                    row.get(0)?,
                    row.get(1)?,
                    time_column(row, 2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(lessons)
    }

    /// Deleting a lesson deletes its words and their definitions.
    fn delete_lesson(&self, lesson_id: i64) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        Self::delete_words_where(&tx, "lesson_id = ?1", &lesson_id)?;
        let count = tx.execute("DELETE FROM lessons WHERE id = ?1", params![lesson_id])?;
        if count == 0 {
            return Err(RepositoryError::LessonNotFound(lesson_id));
        }
        tx.commit()?;
        Ok(())
    }
}

impl ExerciseRepository for SqliteRepository {
    /// Store a group and all of its exercises, or nothing.
    fn save_group(&self, group: &ExerciseGroup) -> Result<()> {
        self.save_groups(std::slice::from_ref(group))
    }

    /// Store every group with its exercises in one transaction.
    fn save_groups(&self, groups: &[ExerciseGroup]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for group in groups {
            Self::insert_group(&tx, group)?;
        }
        tx.commit()?;
        debug!(groups = groups.len(), "saved exercise groups");
        Ok(())
    }

    fn get_group(&self, id: &str) -> Result<Option<ExerciseGroup>> {
        let mut groups = self.query_groups(
            "SELECT id, source_id, name, word_texts, generated_at FROM exercise_groups WHERE id = ?1",
            params![id],
        )?;
        Ok(groups.pop())
    }

    fn list_groups(&self) -> Result<Vec<ExerciseGroup>> {
        self.query_groups(
            "SELECT id, source_id, name, word_texts, generated_at
             FROM exercise_groups ORDER BY generated_at DESC, rowid DESC",
            [],
        )
    }

    fn record_exercise_attempt(
        &self,
        group_id: &str,
        position: usize,
        correct: bool,
        now: DateTime<Utc>,
    ) -> Result<Exercise> {
        let tx = self.conn.unchecked_transaction()?;

        let mut exercise = tx
            .query_row(
                "SELECT exercise_id, kind, instruction, sentence, answer, hint, options, difficulty,
                        times_shown, times_correct, last_shown_at
                 FROM exercises WHERE group_id = ?1 AND position = ?2",
                params![group_id, position],
                Self::row_to_exercise,
            )
            .optional()?
            .ok_or_else(|| RepositoryError::ExerciseNotFound {
                group_id: group_id.to_string(),
                position,
            })?;

        exercise.record_attempt(correct, now);

        tx.execute(
            "UPDATE exercises SET times_shown = ?1, times_correct = ?2, last_shown_at = ?3
             WHERE group_id = ?4 AND position = ?5",
            params![
                exercise.times_shown,
                exercise.times_correct,
                exercise.last_shown_at.map(time::encode),
                group_id,
                position,
            ],
        )?;
        tx.commit()?;

        Ok(exercise)
    }

    /// Deleting a group deletes its exercises.
    fn delete_group(&self, id: &str) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM exercises WHERE group_id = ?1", params![id])?;
        let count = tx.execute("DELETE FROM exercise_groups WHERE id = ?1", params![id])?;
        if count == 0 {
            return Err(RepositoryError::GroupNotFound(id.to_string()));
        }
        tx.commit()?;
        Ok(())
    }
}

impl StatsRepository for SqliteRepository {
    fn vocabulary_stats(&self, now: DateTime<Utc>) -> Result<VocabularyStats> {
        self.conn
            .query_row(
                "SELECT
                    COUNT(*),
                    COALESCE(SUM(CASE WHEN next_review_date <= ?1 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN mastery = 'New' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN mastery = 'Learning' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN mastery = 'Familiar' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN mastery = 'Mastered' THEN 1 ELSE 0 END), 0)
                 FROM words",
                params![time::encode(now)],
                |row| {
                    Ok(VocabularyStats {
                        total_words: row.get(0)?,
                        due_words: row.get(1)?,
                        new_words: row.get(2)?,
                        learning_words: row.get(3)?,
                        familiar_words: row.get(4)?,
                        mastered_words: row.get(5)?,
                    })
                },
            )
            .map_err(Into::into)
    }
}

fn time_column(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    time::decode(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn json_column<T: serde::de::DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
