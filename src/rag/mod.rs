//! Retrieval-augmented question generation.
//!
//! [`ContextBuilder`] builds and queries the chunk index, [`QuizEngine`]
//! turns retrieved passages into validated quiz questions.

pub mod context;
mod engine;

pub use context::{format_context, ContextBuilder, RetrievedChunk};
pub use engine::{QuizEngine, DEFAULT_TOP_K};
