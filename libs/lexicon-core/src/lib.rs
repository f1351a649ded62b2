//! Core vocabulary library used by the lexicon application.
//!
//! Provides:
//! - CSV parser for word lists
//! - Spaced repetition scheduling (single transition for every review flow)
//! - Exercise generation payloads and response decoding
//! - Answer checking for exercise practice
//! - Shared types (Word, Definition, ReviewStats, ExerciseGroup, etc.)

pub mod error;
pub mod exercise;
pub mod matching;
pub mod parser;
pub mod srs;
pub mod types;

pub use error::{DecodeError, ImportError, Result};
pub use exercise::{decode_response, GroupDraft, VocabularyPayload, SYSTEM_PROMPT};
pub use matching::{check_answer, AnswerCheck};
pub use parser::{parse, parse_at};
pub use srs::apply_review;
pub use types::{
    CefrLevel, Definition, Exercise, ExerciseGroup, ExerciseKind, ImportedRecord, Lesson,
    MasteryTier, ReviewOutcome, ReviewStats, Word, WordClass,
};
