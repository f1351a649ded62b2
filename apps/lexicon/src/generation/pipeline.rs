//! Exercise generation pipeline.
//!
//! Builds the vocabulary payload, makes a single generation call, decodes
//! the reply and stores every group with its exercises in one transaction.
//! Nothing is stored until the whole reply has decoded, and a failed save
//! stores no group at all.
//!
//! Callers must not run two generations for the same word set at once; the
//! pipeline does no locking of its own beyond the repository mutex.

use super::client::GenerationClient;
use super::error::GenerationError;
use crate::db::{ExerciseRepository, SqliteRepository};
use chrono::Utc;
use lexicon_core::exercise::{decode_response, VocabularyPayload, SYSTEM_PROMPT};
use lexicon_core::types::{ExerciseGroup, Word};
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

pub struct ExercisePipeline {
    client: Arc<dyn GenerationClient>,
    repository: Arc<Mutex<SqliteRepository>>,
}

impl ExercisePipeline {
    pub fn new(client: Arc<dyn GenerationClient>, repository: Arc<Mutex<SqliteRepository>>) -> Self {
        Self { client, repository }
    }

    /// Generate and store exercise groups for `words`.
    pub async fn generate(&self, words: &[Word]) -> Result<Vec<ExerciseGroup>, GenerationError> {
        self.generate_cancellable(words, &CancellationToken::new()).await
    }

    /// Like [`generate`](Self::generate), aborting the in-flight request when
    /// `cancel` fires. A cancelled run stores nothing.
    pub async fn generate_cancellable(
        &self,
        words: &[Word],
        cancel: &CancellationToken,
    ) -> Result<Vec<ExerciseGroup>, GenerationError> {
        if words.is_empty() {
            return Ok(Vec::new());
        }

        let payload = VocabularyPayload::from_words(words)
            .to_json()
            .map_err(|e| GenerationError::Decoding(e.to_string()))?;

        info!(words = words.len(), "requesting exercise generation");

        let reply = tokio::select! {
            _ = cancel.cancelled() => {
                warn!("exercise generation cancelled");
                return Err(GenerationError::Cancelled);
            }
            result = self.client.send(SYSTEM_PROMPT, &payload, true) => result?,
        };

        let drafts = decode_response(&reply).map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        let generated_at = Utc::now();
        let groups: Vec<ExerciseGroup> = drafts
            .into_iter()
            .map(|draft| draft.into_group(Uuid::new_v4().to_string(), generated_at))
            .collect();

        for group in groups.iter().filter(|g| g.exercises.is_empty()) {
            warn!(group = %group.name, "generated group has no exercises");
        }

        self.repository
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .save_groups(&groups)?;

        info!(
            groups = groups.len(),
            exercises = groups.iter().map(|g| g.exercises.len()).sum::<usize>(),
            "stored generated exercises"
        );
        Ok(groups)
    }
}
