//! Exercise generation payloads and response decoding.
//!
//! The generator receives a JSON vocabulary payload and must answer with:
//! ```json
//! {"word_groups": [{"group_id": "g1", "group_name": "Business verbs",
//!   "words": ["negotiate"], "exercises": [{"id": "e1", "type": "fill_blank",
//!   "instruction": "...", "sentence": "...", "answer": "...",
//!   "hint": null, "options": null, "difficulty": "B2"}]}]}
//! ```

use crate::error::DecodeError;
use crate::types::{CefrLevel, Exercise, ExerciseGroup, ExerciseKind, Word, WordClass};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Difficulty assigned when the generator omits one.
pub const DEFAULT_DIFFICULTY: &str = "B2";

/// Instructions sent as the system message of every generation request.
pub const SYSTEM_PROMPT: &str = r#"You generate vocabulary practice exercises for a language learning app.

Tasks:
1. Read the vocabulary list in the user message.
2. Group the words by word class, semantic theme and CEFR level.
3. Write exercises for every group.

Exercise types:
- fill_blank: a sentence with ___ where the target word belongs.
- multiple_choice: a question about the word with exactly 4 options in "options"; "answer" is the correct option.
- word_group_paragraph: a short paragraph with blanks for several words of the group.
- confusion_pair: a sentence that distinguishes two easily confused words.

Output format:
{"word_groups":[{"group_id":string,"group_name":string,"words":[string],
"exercises":[{"id":string,"type":string,"instruction":string,"sentence":string,
"answer":string,"hint":string|null,"options":[string]|null,"difficulty":string}]}]}

Return ONLY valid JSON in this format. No markdown, no commentary."#;

/// One word as described to the generator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordPayload {
    pub word: String,
    #[serde(rename = "type")]
    pub word_class: WordClass,
    pub level: CefrLevel,
    pub definitions: Vec<String>,
}

/// User message body of a generation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VocabularyPayload {
    pub vocabulary: Vec<WordPayload>,
}

impl VocabularyPayload {
    /// Describe each word by its primary definition's class and level plus
    /// all of its definition texts.
    pub fn from_words(words: &[Word]) -> Self {
        let vocabulary = words
            .iter()
            .map(|word| {
                let primary = word.primary_definition();
                WordPayload {
                    word: word.text.clone(),
                    word_class: primary.map(|d| d.word_class).unwrap_or_default(),
                    level: primary.map(|d| d.level).unwrap_or_default(),
                    definitions: word.definitions.iter().map(|d| d.text.clone()).collect(),
                }
            })
            .collect();
        Self { vocabulary }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    word_groups: Vec<WordGroupData>,
}

#[derive(Debug, Deserialize)]
struct WordGroupData {
    group_id: String,
    group_name: String,
    words: Vec<String>,
    exercises: Vec<ExerciseData>,
}

#[derive(Debug, Deserialize)]
struct ExerciseData {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    instruction: String,
    sentence: String,
    answer: String,
    #[serde(default)]
    hint: Option<String>,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    difficulty: Option<String>,
}

impl ExerciseData {
    fn into_exercise(self) -> Exercise {
        let mut kind = ExerciseKind::from_loose(&self.kind);
        let options = self.options.filter(|opts| !opts.is_empty());

        // Options only belong to multiple choice, which cannot work without them
        let options = match kind {
            ExerciseKind::MultipleChoice if options.is_none() => {
                kind = ExerciseKind::FillBlank;
                None
            }
            ExerciseKind::MultipleChoice => options,
            _ => None,
        };

        Exercise {
            id: self.id,
            kind,
            instruction: self.instruction,
            sentence: self.sentence,
            answer: self.answer,
            hint: self.hint.filter(|h| !h.trim().is_empty()),
            options,
            difficulty: self
                .difficulty
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string()),
            times_shown: 0,
            times_correct: 0,
            last_shown_at: None,
        }
    }
}

/// A decoded group, not yet assigned a storage id.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDraft {
    pub source_id: String,
    pub name: String,
    pub words: Vec<String>,
    pub exercises: Vec<Exercise>,
}

impl GroupDraft {
    pub fn into_group(self, id: String, generated_at: DateTime<Utc>) -> ExerciseGroup {
        ExerciseGroup {
            id,
            source_id: self.source_id,
            name: self.name,
            word_texts: self.words,
            generated_at,
            exercises: self.exercises,
        }
    }
}

/// Decode generator output into group drafts.
///
/// Structural problems fail the whole response. Unknown exercise types are
/// tolerated and become fill-blank exercises.
pub fn decode_response(text: &str) -> Result<Vec<GroupDraft>, DecodeError> {
    let response: GenerationResponse = serde_json::from_str(text.trim())?;

    Ok(response
        .word_groups
        .into_iter()
        .map(|group| GroupDraft {
            source_id: group.group_id,
            name: group.group_name,
            words: group.words,
            exercises: group
                .exercises
                .into_iter()
                .map(ExerciseData::into_exercise)
                .collect(),
        })
        .collect())
}
