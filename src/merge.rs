use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::jsonl::{self, JsonlWriter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    pub output: PathBuf,
    pub files: usize,
    pub lines: usize,
}

/// Concatenate the non-blank lines of `inputs` into `output`, in order.
///
/// With `validate`, every copied line must parse as JSON.
pub fn merge_jsonl(output: &Path, inputs: &[PathBuf], validate: bool) -> Result<MergeSummary> {
    let mut writer = JsonlWriter::create(output)?;

    for input in inputs {
        let lines = jsonl::read_lines(input)?;
        for (line_no, line) in &lines {
            if validate {
                serde_json::from_str::<serde_json::Value>(line).map_err(|source| Error::Json {
                    origin: format!("{}:{}", input.display(), line_no),
                    source,
                })?;
            }
            writer.write_line(line.trim_end_matches('\r'))?;
        }
        debug!(input = %input.display(), lines = lines.len(), "merged file");
    }

    let lines = writer.finish()?;
    Ok(MergeSummary { output: output.to_path_buf(), files: inputs.len(), lines })
}
