//! Exercise generation and practice commands.

use crate::db::{ExerciseRepository, RepositoryError, WordRepository};
use crate::generation::{ExercisePipeline, GenerationClient, OpenAiClient, RetryPolicy, RetryingClient};
use crate::state::AppState;
use chrono::Utc;
use lexicon_core::matching::{check_answer, AnswerCheck};
use lexicon_core::types::{Exercise, ExerciseGroup};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::vocabulary::CommandError;

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct GenerateRequest {
    /// Only use words that are due for review.
    #[serde(default)]
    pub due_only: bool,
    /// Cap on the number of words sent.
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, serde::Serialize)]
pub struct CheckResult {
    #[serde(flatten)]
    pub check: AnswerCheck,
    pub exercise: Exercise,
}

/// Generate exercises with the configured service.
pub async fn generate_exercises(
    request: GenerateRequest,
    state: &AppState,
    cancel: &CancellationToken,
) -> Result<Vec<ExerciseGroup>, CommandError> {
    let client = OpenAiClient::new(&state.config.generation)?;
    let client = RetryingClient::new(client, RetryPolicy::default());
    generate_with_client(Arc::new(client), request, state, cancel).await
}

/// Generate exercises through an explicit client.
pub async fn generate_with_client(
    client: Arc<dyn GenerationClient>,
    request: GenerateRequest,
    state: &AppState,
    cancel: &CancellationToken,
) -> Result<Vec<ExerciseGroup>, CommandError> {
    let words = {
        let repo = state.repository();
        let mut words = if request.due_only {
            repo.words_due(Utc::now())?
        } else {
            repo.list_words()?
        };
        if let Some(limit) = request.limit {
            words.truncate(limit);
        }
        words
    };

    if words.is_empty() {
        return Err(CommandError {
            message: "no words to generate exercises for".to_string(),
        });
    }

    let pipeline = ExercisePipeline::new(client, state.repository.clone());
    pipeline
        .generate_cancellable(&words, cancel)
        .await
        .map_err(Into::into)
}

/// All stored groups, newest first.
pub fn list_groups(state: &AppState) -> Result<Vec<ExerciseGroup>, CommandError> {
    state.repository().list_groups().map_err(Into::into)
}

pub fn get_group(group_id: &str, state: &AppState) -> Result<ExerciseGroup, CommandError> {
    state
        .repository()
        .get_group(group_id)?
        .ok_or_else(|| RepositoryError::GroupNotFound(group_id.to_string()).into())
}

/// Check a typed answer and record the attempt.
pub fn check_exercise_answer(
    group_id: &str,
    position: usize,
    typed_answer: &str,
    state: &AppState,
) -> Result<CheckResult, CommandError> {
    let repo = state.repository();
    let group = repo
        .get_group(group_id)?
        .ok_or_else(|| RepositoryError::GroupNotFound(group_id.to_string()))?;
    let exercise = group
        .exercises
        .get(position)
        .ok_or_else(|| RepositoryError::ExerciseNotFound {
            group_id: group_id.to_string(),
            position,
        })?;

    let check = check_answer(typed_answer, &exercise.answer);
    let exercise = repo.record_exercise_attempt(group_id, position, check.is_correct, Utc::now())?;

    Ok(CheckResult { check, exercise })
}

pub fn delete_group(group_id: &str, state: &AppState) -> Result<(), CommandError> {
    state.repository().delete_group(group_id).map_err(Into::into)
}
