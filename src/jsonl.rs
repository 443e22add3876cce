use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};

/// Buffered JSONL writer that creates parent directories on open.
pub struct JsonlWriter {
    path: PathBuf,
    inner: BufWriter<File>,
    written: usize,
}

impl JsonlWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let write_error = |source| Error::Write { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        let file = File::create(path).map_err(write_error)?;
        Ok(Self { path: path.to_path_buf(), inner: BufWriter::new(file), written: 0 })
    }

    pub fn write<T: Serialize>(&mut self, record: &T) -> Result<()> {
        serde_json::to_writer(&mut self.inner, record).map_err(|source| Error::Json {
            origin: self.path.display().to_string(),
            source,
        })?;
        self.end_line()
    }

    /// Write raw text followed by exactly one newline.
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        self.inner
            .write_all(line.as_bytes())
            .map_err(|source| Error::Write { path: self.path.clone(), source })?;
        self.end_line()
    }

    fn end_line(&mut self) -> Result<()> {
        self.inner
            .write_all(b"\n")
            .map_err(|source| Error::Write { path: self.path.clone(), source })?;
        self.written += 1;
        Ok(())
    }

    pub fn finish(mut self) -> Result<usize> {
        self.inner
            .flush()
            .map_err(|source| Error::Write { path: self.path.clone(), source })?;
        Ok(self.written)
    }
}

/// Non-blank lines of a file, with their 1-based line numbers.
pub fn read_lines(path: &Path) -> Result<Vec<(usize, String)>> {
    let read_error = |source| Error::Read { path: path.to_path_buf(), source };
    let reader = BufReader::new(File::open(path).map_err(read_error)?);

    let mut lines = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(read_error)?;
        if line.trim().is_empty() {
            continue;
        }
        lines.push((idx + 1, line));
    }
    Ok(lines)
}
