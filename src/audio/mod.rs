//! Audio track handling for media sources.

mod extract;

pub use extract::{extract_audio, probe_duration, split_audio};
