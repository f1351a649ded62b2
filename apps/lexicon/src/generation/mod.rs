//! Exercise generation: transport client, retry decorator and pipeline.

pub mod client;
pub mod error;
pub mod pipeline;
pub mod retry;

pub use client::{GenerationClient, OpenAiClient};
pub use error::GenerationError;
pub use pipeline::ExercisePipeline;
pub use retry::{RetryPolicy, RetryingClient};
