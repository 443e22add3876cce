//! Intent and slot frequency analysis over flattened JSONL files.

use std::fmt::Write as _;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::jsonl;
use crate::target::TargetLabel;

pub const DEFAULT_TOP_VALUES: usize = 10;

/// Insertion-ordered frequency counter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Counter {
    counts: IndexMap<String, usize>,
}

impl Counter {
    pub fn add(&mut self, key: &str) {
        *self.counts.entry(key.to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, key: &str) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Entries by descending count; ties keep first-seen order.
    pub fn most_common(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> =
            self.counts.iter().map(|(key, count)| (key.as_str(), *count)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distribution {
    pub records: usize,
    pub intents: Counter,
    pub slots: Counter,
    pub slot_values: IndexMap<String, Counter>,
}

#[derive(Deserialize)]
struct TargetRecord {
    target: Option<serde_json::Value>,
}

impl Distribution {
    pub fn observe(&mut self, label: &TargetLabel) {
        self.records += 1;
        for intent in &label.intents {
            self.intents.add(intent);
        }
        for slot in &label.slots {
            self.slots.add(&slot.name);
            if let Some(value) = &slot.value {
                self.slot_values.entry(slot.name.clone()).or_default().add(value);
            }
        }
    }
}

/// Count intents and slots over `(line number, line)` pairs of a JSONL source.
pub fn analyze_records<'a, I>(lines: I, origin: &str) -> Result<Distribution>
where
    I: IntoIterator<Item = (usize, &'a str)>,
{
    let mut distribution = Distribution::default();

    for (line_no, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let record: TargetRecord = serde_json::from_str(line).map_err(|source| Error::Json {
            origin: format!("{}:{}", origin, line_no),
            source,
        })?;
        let target = match record.target {
            Some(serde_json::Value::String(target)) => target,
            _ => return Err(Error::MissingTarget { origin: origin.to_string(), line: line_no }),
        };
        distribution.observe(&TargetLabel::parse(&target));
    }

    debug!(origin, records = distribution.records, "analysed targets");
    Ok(distribution)
}

pub fn analyze_file(path: &Path) -> Result<Distribution> {
    let lines = jsonl::read_lines(path)?;
    analyze_records(
        lines.iter().map(|(no, line)| (*no, line.as_str())),
        &path.display().to_string(),
    )
}

// =============================================================================
// Reports
// =============================================================================

pub fn render_text(distribution: &Distribution, top_values: usize) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "\n=== Intent Distribution ===");
    for (intent, count) in distribution.intents.most_common() {
        let _ = writeln!(out, "{}: {}", intent, count);
    }

    let _ = writeln!(out, "\n=== Slot Distribution ===");
    for (slot, count) in distribution.slots.most_common() {
        let _ = writeln!(out, "{}: {}", slot, count);
    }

    let _ = writeln!(out, "\n=== Slot Values Distribution (Top {} for each slot) ===", top_values);
    for (slot, values) in &distribution.slot_values {
        let _ = writeln!(out, "\nSlot: {}", slot);
        for (value, count) in values.most_common().into_iter().take(top_values) {
            let _ = writeln!(out, "  {}: {}", value, count);
        }
    }

    out
}

pub fn render_markdown(distribution: &Distribution, top_values: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Slot values (top {})\n", top_values);

    if distribution.slot_values.is_empty() {
        let _ = writeln!(out, "_No slot values found._");
        return out;
    }

    for (slot, values) in &distribution.slot_values {
        let _ = writeln!(out, "## `{}`\n", slot);
        for (value, count) in values.most_common().into_iter().take(top_values) {
            let _ = writeln!(out, "- **{}**: {}", value, count);
        }
        let _ = writeln!(out);
    }

    out
}
