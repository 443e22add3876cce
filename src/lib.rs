//! Offline preparation of a dialogue intent/slot dataset for text-to-text
//! training: flattening dialogues into `(input, target)` pairs, templated
//! augmentation, distribution analysis and JSONL merging.

pub mod analyze;
pub mod augment;
pub mod config;
pub mod convert;
pub mod dialogue;
pub mod error;
pub mod flatten;
pub mod jsonl;
pub mod merge;
pub mod target;
pub mod view;

pub use dialogue::{Dialogue, Frame, Speaker, Turn};
pub use error::{Error, Result};
pub use flatten::{FlattenedExample, flatten};
pub use target::{Slot, TargetLabel};
