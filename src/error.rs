use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("dialogue '{dialogue_id}' turn '{turn_id}': missing required field `{field}`")]
    MissingField {
        field: &'static str,
        dialogue_id: String,
        turn_id: String,
    },

    #[error("dialogue '{dialogue_id}' turn '{turn_id}': unknown speaker '{speaker}'")]
    UnknownSpeaker {
        speaker: String,
        dialogue_id: String,
        turn_id: String,
    },

    #[error("{origin}:{line}: record has no string `target` field")]
    MissingTarget { origin: String, line: usize },

    #[error("intent '{intent}': template references unknown slot '{placeholder}'")]
    UnknownPlaceholder { intent: String, placeholder: String },

    #[error("intent '{intent}' is not in the catalog")]
    UnknownIntent { intent: String },

    #[error("intent '{intent}': {reason}")]
    InvalidCatalog { intent: String, reason: String },

    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}
