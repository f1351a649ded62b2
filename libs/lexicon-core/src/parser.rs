//! CSV parser for vocabulary word lists.
//!
//! # Format
//! ```text
//! Word,Type,Definition,Level,Vietnamese,Synonym,Date Added
//! persistent,adj,"continuing, despite difficulty",C1,kiên trì,"tenacious, dogged",3/14/2024
//! ```
//!
//! Columns are located by header name, so they may appear in any order.
//! `word`, `type` and `definition` are required; the rest are optional.
//!
//! Known limitation: a `"` always toggles quoting, so escaped quotes (`""`)
//! inside a quoted field are not supported.

use crate::error::{ImportError, Result};
use crate::types::{CefrLevel, ImportedRecord, WordClass};
use chrono::{DateTime, NaiveDate, Utc};

const WORD: &str = "word";
const TYPE: &str = "type";
const DEFINITION: &str = "definition";
const LEVEL: &str = "level";
const TRANSLATION: &str = "vietnamese";
const SYNONYM: &str = "synonym";
const DATE_ADDED: &str = "date added";

/// Date formats tried in order. `%m` and `%d` accept both padded and
/// unpadded values, so the first entry covers `M/d/yyyy` and `MM/dd/yyyy`.
const DATE_FORMATS: [&str; 3] = ["%m/%d/%Y", "%Y-%m-%d", "%d/%m/%Y"];

/// Parse CSV content into records, using the current time for missing dates.
pub fn parse(content: &str) -> Result<Vec<ImportedRecord>> {
    parse_at(content, Utc::now())
}

/// Parse CSV content into records. `now` is used wherever a row has no
/// usable date, which makes the output fully deterministic.
pub fn parse_at(content: &str, now: DateTime<Utc>) -> Result<Vec<ImportedRecord>> {
    let lines: Vec<&str> = content
        .split(['\n', '\r'])
        .filter(|line| !line.trim().is_empty())
        .collect();

    let Some((header_line, rows)) = lines.split_first() else {
        return Err(ImportError::EmptyFile);
    };
    if rows.is_empty() {
        return Err(ImportError::EmptyFile);
    }

    let columns = Columns::from_header(header_line)?;

    Ok(rows
        .iter()
        .filter_map(|line| columns.read_row(&split_fields(line), now))
        .collect())
}

/// Column positions resolved from the header row.
#[derive(Debug)]
struct Columns {
    word: usize,
    word_class: usize,
    definition: usize,
    level: Option<usize>,
    translation: Option<usize>,
    synonyms: Option<usize>,
    date_added: Option<usize>,
}

impl Columns {
    fn from_header(line: &str) -> Result<Self> {
        let header: Vec<String> = split_fields(line)
            .iter()
            .map(|name| name.trim_start_matches('\u{feff}').trim().to_lowercase())
            .collect();
        let find = |name: &str| header.iter().position(|h| h == name);

        let (word, word_class, definition) = match (find(WORD), find(TYPE), find(DEFINITION)) {
            (Some(w), Some(t), Some(d)) => (w, t, d),
            _ => {
                let missing = [WORD, TYPE, DEFINITION]
                    .into_iter()
                    .filter(|name| find(name).is_none())
                    .map(str::to_string)
                    .collect();
                return Err(ImportError::MissingColumns { missing });
            }
        };

        Ok(Self {
            word,
            word_class,
            definition,
            level: find(LEVEL),
            translation: find(TRANSLATION),
            synonyms: find(SYNONYM),
            date_added: find(DATE_ADDED),
        })
    }

    fn required_len(&self) -> usize {
        self.word.max(self.word_class).max(self.definition) + 1
    }

    /// Build a record from one row. Ragged rows and rows without a word are
    /// skipped rather than reported.
    fn read_row(&self, fields: &[String], now: DateTime<Utc>) -> Option<ImportedRecord> {
        if fields.len() < self.required_len() {
            return None;
        }

        let text = fields[self.word].trim();
        if text.is_empty() {
            return None;
        }

        let optional = |index: Option<usize>| {
            index
                .and_then(|i| fields.get(i))
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
        };

        Some(ImportedRecord {
            text: text.to_string(),
            word_class: WordClass::from_loose(&fields[self.word_class]),
            definition: fields[self.definition].trim().to_string(),
            level: optional(self.level).map(CefrLevel::from_loose).unwrap_or_default(),
            translation: optional(self.translation).map(str::to_string),
            synonyms: optional(self.synonyms).map(split_synonyms).unwrap_or_default(),
            date_added: optional(self.date_added).and_then(parse_date).unwrap_or(now),
        })
    }
}

/// Split one line on commas that are not inside double quotes.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut inside_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => inside_quotes = !inside_quotes,
            ',' if !inside_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);

    fields
}

fn split_synonyms(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a date in the first matching format, as midnight UTC.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let cleaned = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(cleaned, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
