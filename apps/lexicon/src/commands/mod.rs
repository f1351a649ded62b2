//! Commands exposed to the CLI.

pub mod exercise;
pub mod vocabulary;

pub use exercise::{
    check_exercise_answer, delete_group, generate_exercises, generate_with_client, get_group,
    list_groups, CheckResult, GenerateRequest,
};
pub use vocabulary::{
    assign_word_to_lesson, create_lesson, delete_lesson, delete_word, due_words, get_word,
    import_csv, import_file, list_lessons, list_words, record_review, vocabulary_stats,
    CommandError, ImportResult, ReviewResponse,
};
