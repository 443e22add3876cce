//! The `intents: ...; slots: ...` target label.
//!
//! Rendering is exact; parsing is lenient so hand-edited or augmented files
//! can still be analysed.

use std::fmt;

use crate::dialogue::NO_INTENT;

const INTENTS_PREFIX: &str = "intents:";
const SLOTS_PREFIX: &str = "slots:";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slot {
    pub name: String,
    /// `None` only for bare slot names found while parsing.
    pub value: Option<String>,
}

impl Slot {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: Some(value.into()) }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.name, value),
            None => f.write_str(&self.name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetLabel {
    pub intents: Vec<String>,
    pub slots: Vec<Slot>,
}

impl TargetLabel {
    pub fn parse(target: &str) -> Self {
        let (intents_part, slots_part) = match target.find(SLOTS_PREFIX) {
            Some(idx) => (&target[..idx], &target[idx + SLOTS_PREFIX.len()..]),
            None => (target, ""),
        };

        let intents_part = intents_part.trim().trim_end_matches(';').trim();
        let intents_part = intents_part
            .strip_prefix(INTENTS_PREFIX)
            .unwrap_or(intents_part)
            .trim();

        let intents = if intents_part.is_empty() || intents_part == NO_INTENT {
            Vec::new()
        } else {
            intents_part
                .split('|')
                .map(str::trim)
                .filter(|intent| !intent.is_empty())
                .map(str::to_string)
                .collect()
        };

        let slots = slots_part
            .split(';')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| match entry.split_once('=') {
                Some((name, value)) => Slot::new(name.trim(), value.trim()),
                None => Slot { name: entry.to_string(), value: None },
            })
            .collect();

        Self { intents, slots }
    }
}

impl fmt::Display for TargetLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let intents = if self.intents.is_empty() {
            NO_INTENT.to_string()
        } else {
            self.intents.join("|")
        };
        let slots: Vec<String> = self.slots.iter().map(Slot::to_string).collect();
        write!(f, "intents: {}; slots: {}", intents, slots.join("; "))
    }
}
