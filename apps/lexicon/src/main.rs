// Lexicon - vocabulary trainer with spaced repetition and generated exercises

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use lexicon::commands::{self, GenerateRequest};
use lexicon::config::Config;
use lexicon::db::SqliteRepository;
use lexicon::state::AppState;
use serde::Serialize;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser)]
#[command(name = "lexicon")]
#[command(about = "Vocabulary trainer with spaced repetition and generated exercises")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a CSV word list
    Import {
        /// Path to the CSV file
        path: PathBuf,
    },

    /// Record a review answer for a word
    #[command(group(ArgGroup::new("outcome").required(true).args(["correct", "incorrect"])))]
    Review {
        word: String,
        #[arg(long)]
        correct: bool,
        #[arg(long)]
        incorrect: bool,
    },

    /// List all words
    Words,

    /// List words due for review
    Due,

    /// Delete a word and its definitions
    DeleteWord { word: String },

    /// Show vocabulary statistics
    Stats,

    /// List lessons with progress
    Lessons,

    /// Create a lesson
    LessonCreate { name: String },

    /// Assign a word to a lesson
    LessonAssign { word: String, lesson_id: i64 },

    /// Delete a lesson and its words
    LessonDelete { lesson_id: i64 },

    /// Generate exercises for stored words
    Generate {
        /// Only use words due for review
        #[arg(long)]
        due: bool,
        /// Maximum number of words to send
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List generated exercise groups
    Groups,

    /// Check an answer for an exercise and record the attempt
    Check {
        group_id: String,
        /// Zero-based exercise position within the group
        position: usize,
        answer: String,
    },

    /// Delete an exercise group
    DeleteGroup { group_id: String },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open_state(config: Config) -> Result<AppState> {
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating data directory {}", parent.display()))?;
    }
    let repository = SqliteRepository::open(&config.database_path)
        .with_context(|| format!("opening database {}", config.database_path.display()))?;
    info!(path = %config.database_path.display(), "database ready");
    Ok(AppState::new(repository, config))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    lexicon::init_tracing();

    let cli = Cli::parse();
    let state = open_state(Config::from_env())?;

    match cli.command {
        Commands::Import { path } => {
            print_json(&commands::import_file(&path, &state)?)?;
        }
        Commands::Review { word, correct, .. } => {
            print_json(&commands::record_review(&word, correct, &state)?)?;
        }
        Commands::Words => print_json(&commands::list_words(&state)?)?,
        Commands::Due => print_json(&commands::due_words(&state)?)?,
        Commands::DeleteWord { word } => commands::delete_word(&word, &state)?,
        Commands::Stats => print_json(&commands::vocabulary_stats(&state)?)?,
        Commands::Lessons => print_json(&commands::list_lessons(&state)?)?,
        Commands::LessonCreate { name } => print_json(&commands::create_lesson(&name, &state)?)?,
        Commands::LessonAssign { word, lesson_id } => {
            commands::assign_word_to_lesson(&word, lesson_id, &state)?;
        }
        Commands::LessonDelete { lesson_id } => commands::delete_lesson(lesson_id, &state)?,
        Commands::Generate { due, limit } => {
            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let request = GenerateRequest { due_only: due, limit };
            print_json(&commands::generate_exercises(request, &state, &cancel).await?)?;
        }
        Commands::Groups => print_json(&commands::list_groups(&state)?)?,
        Commands::Check {
            group_id,
            position,
            answer,
        } => {
            print_json(&commands::check_exercise_answer(&group_id, position, &answer, &state)?)?;
        }
        Commands::DeleteGroup { group_id } => commands::delete_group(&group_id, &state)?,
    }

    Ok(())
}
