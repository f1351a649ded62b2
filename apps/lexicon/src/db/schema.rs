//! SQLite schema definitions.
//!
//! Child rows reference their owner, but deletes are cascaded explicitly by
//! the repository rather than by `ON DELETE` clauses.

/// Complete schema for the vocabulary store.
pub const SCHEMA: &str = r#"
-- Lessons (named word groupings)
CREATE TABLE IF NOT EXISTS lessons (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    sort_order INTEGER NOT NULL DEFAULT 0
);

-- Words with their review state
CREATE TABLE IF NOT EXISTS words (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    text TEXT NOT NULL UNIQUE,
    date_added TEXT NOT NULL,
    lesson_id INTEGER REFERENCES lessons(id),
    next_review_date TEXT NOT NULL,
    review_count INTEGER NOT NULL DEFAULT 0,
    correct_count INTEGER NOT NULL DEFAULT 0,
    mastery TEXT NOT NULL DEFAULT 'New',
    CHECK (correct_count >= 0 AND review_count >= correct_count)
);

-- Definitions, owned by exactly one word
CREATE TABLE IF NOT EXISTS definitions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    word_id INTEGER NOT NULL REFERENCES words(id),
    position INTEGER NOT NULL,
    text TEXT NOT NULL,
    word_class TEXT NOT NULL DEFAULT 'other',
    level TEXT NOT NULL DEFAULT 'B2',
    translation TEXT,
    synonyms TEXT NOT NULL DEFAULT '[]'
);

-- Generated exercise groups
CREATE TABLE IF NOT EXISTS exercise_groups (
    id TEXT PRIMARY KEY,
    source_id TEXT NOT NULL,
    name TEXT NOT NULL,
    word_texts TEXT NOT NULL,
    generated_at TEXT NOT NULL
);

-- Exercises, owned by exactly one group
CREATE TABLE IF NOT EXISTS exercises (
    group_id TEXT NOT NULL REFERENCES exercise_groups(id),
    position INTEGER NOT NULL,
    exercise_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    instruction TEXT NOT NULL,
    sentence TEXT NOT NULL,
    answer TEXT NOT NULL,
    hint TEXT,
    options TEXT,
    difficulty TEXT NOT NULL DEFAULT 'B2',
    times_shown INTEGER NOT NULL DEFAULT 0,
    times_correct INTEGER NOT NULL DEFAULT 0,
    last_shown_at TEXT,
    PRIMARY KEY (group_id, position)
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_words_next_review ON words(next_review_date);
CREATE INDEX IF NOT EXISTS idx_words_lesson ON words(lesson_id);
CREATE INDEX IF NOT EXISTS idx_definitions_word ON definitions(word_id, position);
"#;
