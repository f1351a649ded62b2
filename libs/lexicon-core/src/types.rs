//! Core types for the vocabulary library.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::srs;

/// Grammatical class of a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordClass {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Other,
}

impl Default for WordClass {
    fn default() -> Self {
        Self::Other
    }
}

impl WordClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Noun => "noun",
            Self::Verb => "verb",
            Self::Adjective => "adjective",
            Self::Adverb => "adverb",
            Self::Other => "other",
        }
    }

    /// Normalize a loosely written class name. Unknown values map to `Other`.
    pub fn from_loose(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "noun" => Self::Noun,
            "verb" => Self::Verb,
            "adjective" | "adj" => Self::Adjective,
            "adverb" | "adv" => Self::Adverb,
            _ => Self::Other,
        }
    }
}

/// CEFR proficiency level, ordered from A1 (lowest) to C2 (highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CefrLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl Default for CefrLevel {
    fn default() -> Self {
        Self::B2
    }
}

impl CefrLevel {
    pub const ALL: [CefrLevel; 6] = [Self::A1, Self::A2, Self::B1, Self::B2, Self::C1, Self::C2];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::C1 => "C1",
            Self::C2 => "C2",
        }
    }

    /// Parse an exact level name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_uppercase();
        Self::ALL.into_iter().find(|level| level.as_str() == upper)
    }

    /// Like [`CefrLevel::parse`], falling back to B2.
    pub fn from_loose(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }
}

/// Mastery classification derived from review accuracy and attempt count.
///
/// Never stored independently of the counters it is computed from; see
/// [`srs::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MasteryTier {
    New,
    Learning,
    Familiar,
    Mastered,
}

impl Default for MasteryTier {
    fn default() -> Self {
        Self::New
    }
}

impl MasteryTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Learning => "Learning",
            Self::Familiar => "Familiar",
            Self::Mastered => "Mastered",
        }
    }
}

/// Outcome of a single review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewOutcome {
    Correct,
    Incorrect,
}

impl ReviewOutcome {
    pub fn from_correct(correct: bool) -> Self {
        if correct { Self::Correct } else { Self::Incorrect }
    }

    pub fn is_correct(self) -> bool {
        matches!(self, Self::Correct)
    }
}

/// Spaced-repetition state of a word.
///
/// Fields are read-only from outside the crate: the only way to move a word
/// forward is [`srs::apply_review`], and the tier is always derived from the
/// counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewStats {
    next_review_date: DateTime<Utc>,
    review_count: u32,
    correct_count: u32,
    mastery: MasteryTier,
}

impl ReviewStats {
    /// Stats for a word that has never been reviewed. It is due immediately
    /// from `first_due`.
    pub fn new(first_due: DateTime<Utc>) -> Self {
        Self {
            next_review_date: first_due,
            review_count: 0,
            correct_count: 0,
            mastery: MasteryTier::New,
        }
    }

    /// Rebuild stats from stored counters. `correct_count` is clamped to
    /// `review_count` and the tier is recomputed.
    pub fn restore(next_review_date: DateTime<Utc>, review_count: u32, correct_count: u32) -> Self {
        let correct_count = correct_count.min(review_count);
        Self {
            next_review_date,
            review_count,
            correct_count,
            mastery: srs::classify(review_count, correct_count),
        }
    }

    pub(crate) fn from_transition(
        next_review_date: DateTime<Utc>,
        review_count: u32,
        correct_count: u32,
        mastery: MasteryTier,
    ) -> Self {
        Self {
            next_review_date,
            review_count,
            correct_count,
            mastery,
        }
    }

    pub fn next_review_date(&self) -> DateTime<Utc> {
        self.next_review_date
    }

    pub fn review_count(&self) -> u32 {
        self.review_count
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn mastery(&self) -> MasteryTier {
        self.mastery
    }

    /// Fraction of correct reviews, 0 when never reviewed.
    pub fn accuracy(&self) -> f64 {
        srs::accuracy(self.review_count, self.correct_count)
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        srs::is_due(self, now)
    }
}

/// One sense of a word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub text: String,
    pub word_class: WordClass,
    pub level: CefrLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

/// A vocabulary entry with its owned definitions.
#[derive(Debug, Clone, Serialize)]
pub struct Word {
    pub id: i64,
    pub text: String,
    pub date_added: DateTime<Utc>,
    pub definitions: Vec<Definition>,
    pub review: ReviewStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lesson_id: Option<i64>,
}

impl Word {
    /// The first definition, used as the main sense in quizzes and prompts.
    pub fn primary_definition(&self) -> Option<&Definition> {
        self.definitions.first()
    }
}

/// Row parsed from an import file, before it is merged into the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedRecord {
    pub text: String,
    pub word_class: WordClass,
    pub definition: String,
    pub level: CefrLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    pub synonyms: Vec<String>,
    pub date_added: DateTime<Utc>,
}

impl ImportedRecord {
    pub fn to_definition(&self) -> Definition {
        Definition {
            text: self.definition.clone(),
            word_class: self.word_class,
            level: self.level,
            translation: self.translation.clone(),
            synonyms: self.synonyms.clone(),
        }
    }
}

/// Exercise format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    FillBlank,
    MultipleChoice,
    ParagraphCloze,
    ConfusionPair,
}

impl Default for ExerciseKind {
    fn default() -> Self {
        Self::FillBlank
    }
}

impl ExerciseKind {
    /// Wire tag used in generation responses and storage.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::FillBlank => "fill_blank",
            Self::MultipleChoice => "multiple_choice",
            Self::ParagraphCloze => "word_group_paragraph",
            Self::ConfusionPair => "confusion_pair",
        }
    }

    pub fn parse_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().replace('-', "_").as_str() {
            "fill_blank" => Some(Self::FillBlank),
            "multiple_choice" => Some(Self::MultipleChoice),
            "word_group_paragraph" | "paragraph_cloze" => Some(Self::ParagraphCloze),
            "confusion_pair" => Some(Self::ConfusionPair),
            _ => None,
        }
    }

    /// Unknown tags become `FillBlank`.
    pub fn from_loose(tag: &str) -> Self {
        Self::parse_tag(tag).unwrap_or_default()
    }
}

/// A generated practice item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub kind: ExerciseKind,
    pub instruction: String,
    pub sentence: String,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Present only for multiple-choice exercises.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub difficulty: String,
    pub times_shown: u32,
    pub times_correct: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_shown_at: Option<DateTime<Utc>>,
}

impl Exercise {
    pub fn accuracy(&self) -> f64 {
        if self.times_shown == 0 {
            0.0
        } else {
            f64::from(self.times_correct) / f64::from(self.times_shown)
        }
    }

    pub fn record_attempt(&mut self, correct: bool, now: DateTime<Utc>) {
        self.times_shown += 1;
        if correct {
            self.times_correct += 1;
        }
        self.last_shown_at = Some(now);
    }
}

/// Exercises produced by one generation call for one group of words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseGroup {
    pub id: String,
    /// Group id as reported by the generator; not unique across runs.
    pub source_id: String,
    pub name: String,
    pub word_texts: Vec<String>,
    pub generated_at: DateTime<Utc>,
    pub exercises: Vec<Exercise>,
}

/// Named collection of words with progress counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub sort_order: i64,
    pub word_count: usize,
    pub mastered_count: usize,
    /// Share of the lesson's words that are mastered; 0 for an empty lesson.
    pub progress: f64,
}

impl Lesson {
    pub fn new(
        id: i64,
        name: String,
        created_at: DateTime<Utc>,
        sort_order: i64,
        word_count: usize,
        mastered_count: usize,
    ) -> Self {
        let progress = if word_count == 0 {
            0.0
        } else {
            mastered_count as f64 / word_count as f64
        };
        Self {
            id,
            name,
            created_at,
            sort_order,
            word_count,
            mastered_count,
            progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_class_accepts_abbreviations() {
        assert_eq!(WordClass::from_loose("adj"), WordClass::Adjective);
        assert_eq!(WordClass::from_loose(" ADV "), WordClass::Adverb);
        assert_eq!(WordClass::from_loose("Noun"), WordClass::Noun);
        assert_eq!(WordClass::from_loose("phrasal verb"), WordClass::Other);
        assert_eq!(WordClass::from_loose(""), WordClass::Other);
    }

    #[test]
    fn cefr_level_falls_back_to_b2() {
        assert_eq!(CefrLevel::from_loose("c1"), CefrLevel::C1);
        assert_eq!(CefrLevel::from_loose(" a2 "), CefrLevel::A2);
        assert_eq!(CefrLevel::from_loose("B3"), CefrLevel::B2);
        assert_eq!(CefrLevel::from_loose(""), CefrLevel::B2);
    }

    #[test]
    fn cefr_levels_are_totally_ordered() {
        assert!(CefrLevel::A1 < CefrLevel::A2);
        assert!(CefrLevel::B2 < CefrLevel::C1);
        assert_eq!(CefrLevel::ALL.iter().max(), Some(&CefrLevel::C2));
    }

    #[test]
    fn exercise_kind_unknown_tag_is_fill_blank() {
        assert_eq!(ExerciseKind::from_loose("multiple_choice"), ExerciseKind::MultipleChoice);
        assert_eq!(ExerciseKind::from_loose("confusion-pair"), ExerciseKind::ConfusionPair);
        assert_eq!(ExerciseKind::from_loose("word_group_paragraph"), ExerciseKind::ParagraphCloze);
        assert_eq!(ExerciseKind::from_loose("crossword"), ExerciseKind::FillBlank);
    }

    #[test]
    fn exercise_kind_tags_round_trip() {
        for kind in [
            ExerciseKind::FillBlank,
            ExerciseKind::MultipleChoice,
            ExerciseKind::ParagraphCloze,
            ExerciseKind::ConfusionPair,
        ] {
            assert_eq!(ExerciseKind::parse_tag(kind.as_tag()), Some(kind));
        }
    }

    #[test]
    fn restore_clamps_correct_count() {
        let stats = ReviewStats::restore(Utc::now(), 3, 7);
        assert_eq!(stats.correct_count(), 3);
        assert_eq!(stats.mastery(), MasteryTier::Familiar);
    }

    #[test]
    fn exercise_attempts_update_counters() {
        let mut exercise = Exercise {
            id: "e1".into(),
            kind: ExerciseKind::FillBlank,
            instruction: "Fill in the blank".into(),
            sentence: "She was ___ in her efforts.".into(),
            answer: "persistent".into(),
            hint: None,
            options: None,
            difficulty: "B2".into(),
            times_shown: 0,
            times_correct: 0,
            last_shown_at: None,
        };
        assert_eq!(exercise.accuracy(), 0.0);

        let now = Utc::now();
        exercise.record_attempt(true, now);
        exercise.record_attempt(false, now);
        assert_eq!(exercise.times_shown, 2);
        assert_eq!(exercise.times_correct, 1);
        assert_eq!(exercise.accuracy(), 0.5);
        assert_eq!(exercise.last_shown_at, Some(now));
    }

    #[test]
    fn empty_lesson_has_zero_progress() {
        let lesson = Lesson::new(1, "Unit 1".into(), Utc::now(), 0, 0, 0);
        assert_eq!(lesson.progress, 0.0);
    }

    #[test]
    fn lesson_progress_is_serialized() {
        let lesson = Lesson::new(1, "Unit 1".into(), Utc::now(), 0, 4, 1);
        let value = serde_json::to_value(&lesson).unwrap();
        assert_eq!(value["progress"], 0.25);
        assert_eq!(value["word_count"], 4);
    }
}
