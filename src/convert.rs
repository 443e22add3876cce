//! Dialogue files in, flattened training JSONL out.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::dialogue;
use crate::error::{Error, Result};
use crate::flatten::flatten;
use crate::jsonl::JsonlWriter;

/// Expand glob patterns in order. Patterns matching nothing are logged and skipped.
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns {
        let paths = glob::glob(pattern).map_err(|source| Error::Pattern {
            pattern: pattern.clone(),
            source,
        })?;

        let before = files.len();
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => warn!(pattern = pattern.as_str(), error = %e, "unreadable glob entry"),
            }
        }
        if files.len() == before {
            warn!(pattern = pattern.as_str(), "pattern matched no files");
        }
    }

    Ok(files)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    pub files: usize,
    pub dialogues: usize,
    pub examples: usize,
}

/// Every input is loaded and flattened before `output` is opened, so a
/// malformed file leaves no partial output behind.
pub fn convert_files(files: &[PathBuf], output: &Path, keep_ids: bool) -> Result<ConvertSummary> {
    let mut summary = ConvertSummary { files: files.len(), ..Default::default() };
    let mut examples = Vec::new();

    for file in files {
        let dialogues = dialogue::load_dialogues(file)?;
        let before = examples.len();
        examples.extend(dialogues.iter().flat_map(flatten));
        debug!(
            file = %file.display(),
            dialogues = dialogues.len(),
            examples = examples.len() - before,
            "flattened file"
        );
        summary.dialogues += dialogues.len();
    }

    let mut writer = JsonlWriter::create(output)?;
    for example in &examples {
        if keep_ids {
            writer.write(example)?;
        } else {
            writer.write(&example.record())?;
        }
    }
    summary.examples = writer.finish()?;
    Ok(summary)
}
