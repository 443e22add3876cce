//! Template-driven synthetic samples for under-represented intents.
//!
//! Each intent has candidate values per slot and a handful of utterance
//! templates with `{slot-name}` placeholders. A sample picks one value per
//! slot and one template, and renders the same target format the flattener
//! produces (slots sorted by name, values kept as written).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use indexmap::IndexMap;
use rand::prelude::*;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dialogue::Speaker;
use crate::error::{Error, Result};
use crate::flatten::format_turn;
use crate::jsonl::JsonlWriter;
use crate::target::{Slot, TargetLabel};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("placeholder pattern is valid"));

// =============================================================================
// Built-in emergency-services catalog
// =============================================================================

struct IntentTable {
    intent: &'static str,
    slots: &'static [(&'static str, &'static [&'static str])],
    templates: &'static [&'static str],
}

const EMERGENCY_INTENTS: &[IntentTable] = &[
    IntentTable {
        intent: "find_hospital",
        slots: &[
            ("hospital-department", &[
                "emergency department", "neurology", "infectious diseases",
                "cardiology", "paediatric clinic", "intensive care unit",
            ]),
            ("hospital-name", &[
                "addenbrookes hospital", "cambridge general hospital",
                "queen mary hospital", "st john's hospital",
            ]),
        ],
        templates: &[
            "I need information about the {hospital-department} at {hospital-name}",
            "Where is the {hospital-department} in {hospital-name}?",
            "Find the {hospital-department} department in {hospital-name}",
            "Tell me about {hospital-name}'s {hospital-department}",
        ],
    },
    IntentTable {
        intent: "find_police",
        slots: &[
            ("police-station", &[
                "cambridge police station", "central police station",
                "north district police", "west end police office",
            ]),
        ],
        templates: &[
            "Where is the {police-station}?",
            "Find the nearest {police-station}",
            "I need the address of {police-station}",
            "Locate {police-station}",
        ],
    },
    IntentTable {
        intent: "find_pharmacy",
        slots: &[
            ("pharmacy-name", &[
                "boots pharmacy", "cambridge pharmacy", "healthplus",
                "city centre pharmacy", "green cross pharmacy",
            ]),
            ("pharmacy-area", &["centre", "north", "south", "east", "west"]),
        ],
        templates: &[
            "Find a pharmacy named {pharmacy-name} in the {pharmacy-area}",
            "Where is {pharmacy-name} pharmacy in the {pharmacy-area} area?",
            "Locate {pharmacy-name} pharmacy around {pharmacy-area}",
            "I need directions to {pharmacy-name} in {pharmacy-area}",
        ],
    },
    IntentTable {
        intent: "find_embassy",
        slots: &[
            ("embassy-country", &["france", "germany", "italy", "spain", "usa", "canada"]),
            ("embassy-city", &["london", "manchester", "birmingham", "leeds"]),
        ],
        templates: &[
            "Where is the {embassy-country} embassy in {embassy-city}?",
            "Find the {embassy-country} embassy located in {embassy-city}",
            "I need contact info for the {embassy-country} embassy at {embassy-city}",
            "Locate the {embassy-country} embassy in {embassy-city}",
        ],
    },
];

/// Intent counts of the source dataset before augmentation.
pub const DEFAULT_BASELINE: &[(&str, usize)] = &[
    ("find_hospital", 727),
    ("find_police", 482),
    ("find_pharmacy", 200),
    ("find_embassy", 200),
];

pub const DEFAULT_TARGET_COUNT: usize = 12_500;

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentSpec {
    pub slots: IndexMap<String, Vec<String>>,
    pub templates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    intents: IndexMap<String, IntentSpec>,
}

impl Catalog {
    pub fn new(intents: IndexMap<String, IntentSpec>) -> Result<Self> {
        let catalog = Self { intents };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn emergency() -> Self {
        let intents = EMERGENCY_INTENTS
            .iter()
            .map(|table| {
                let slots = table
                    .slots
                    .iter()
                    .map(|(name, values)| {
                        (name.to_string(), values.iter().map(|v| v.to_string()).collect())
                    })
                    .collect();
                let templates = table.templates.iter().map(|t| t.to_string()).collect();
                (table.intent.to_string(), IntentSpec { slots, templates })
            })
            .collect();
        Self { intents }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let intents = serde_json::from_str(&text).map_err(|source| Error::Json {
            origin: path.display().to_string(),
            source,
        })?;
        Self::new(intents)
    }

    pub fn intents(&self) -> impl Iterator<Item = &str> {
        self.intents.keys().map(String::as_str)
    }

    pub fn get(&self, intent: &str) -> Result<&IntentSpec> {
        self.intents.get(intent).ok_or_else(|| Error::UnknownIntent { intent: intent.to_string() })
    }

    fn validate(&self) -> Result<()> {
        for (intent, spec) in &self.intents {
            let invalid = |reason: &str| Error::InvalidCatalog {
                intent: intent.clone(),
                reason: reason.to_string(),
            };
            if spec.templates.is_empty() {
                return Err(invalid("no templates"));
            }
            if let Some((slot, _)) = spec.slots.iter().find(|(_, values)| values.is_empty()) {
                return Err(invalid(&format!("slot '{}' has no values", slot)));
            }
            for template in &spec.templates {
                for caps in PLACEHOLDER.captures_iter(template) {
                    if !spec.slots.contains_key(&caps[1]) {
                        return Err(Error::UnknownPlaceholder {
                            intent: intent.clone(),
                            placeholder: caps[1].to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Sampling
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AugmentedSample {
    pub input: String,
    pub target: String,
}

fn fill_placeholders(template: &str, values: &BTreeMap<&str, &str>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            values.get(&caps[1]).map(|v| v.to_string()).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

pub fn generate_sample<R: Rng>(catalog: &Catalog, intent: &str, rng: &mut R) -> Result<AugmentedSample> {
    let spec = catalog.get(intent)?;

    let mut chosen: BTreeMap<&str, &str> = BTreeMap::new();
    for (slot, values) in &spec.slots {
        if let Some(value) = values.choose(rng) {
            chosen.insert(slot.as_str(), value.as_str());
        }
    }

    let template = spec
        .templates
        .choose(rng)
        .ok_or_else(|| Error::InvalidCatalog { intent: intent.to_string(), reason: "no templates".into() })?;
    let text = fill_placeholders(template, &chosen);

    let label = TargetLabel {
        intents: vec![intent.to_string()],
        slots: chosen.iter().map(|(name, value)| Slot::new(*name, *value)).collect(),
    };

    Ok(AugmentedSample { input: format_turn(Speaker::User, &text), target: label.to_string() })
}

// =============================================================================
// Planning and output
// =============================================================================

/// How many samples each catalog intent needs to reach `target_count`.
pub fn plan(catalog: &Catalog, baseline: &IndexMap<String, usize>, target_count: usize) -> Vec<(String, usize)> {
    catalog
        .intents()
        .map(|intent| {
            let current = baseline.get(intent).copied().unwrap_or(0);
            (intent.to_string(), target_count.saturating_sub(current))
        })
        .collect()
}

pub fn default_baseline() -> IndexMap<String, usize> {
    DEFAULT_BASELINE.iter().map(|(intent, count)| (intent.to_string(), *count)).collect()
}

pub fn output_path(out_dir: &Path, intent: &str) -> PathBuf {
    out_dir.join(format!("augmented_{}.jsonl", intent))
}

#[derive(Debug, Clone, PartialEq)]
pub struct AugmentOutcome {
    pub intent: String,
    pub path: Option<PathBuf>,
    pub generated: usize,
}

pub fn augment<R: Rng>(
    catalog: &Catalog,
    plan: &[(String, usize)],
    out_dir: &Path,
    rng: &mut R,
) -> Result<Vec<AugmentOutcome>> {
    let mut outcomes = Vec::with_capacity(plan.len());

    for (intent, to_generate) in plan {
        if *to_generate == 0 {
            info!(intent = intent.as_str(), "already at target, skipping");
            outcomes.push(AugmentOutcome { intent: intent.clone(), path: None, generated: 0 });
            continue;
        }

        info!(intent = intent.as_str(), count = *to_generate, "generating samples");
        let path = output_path(out_dir, intent);
        let mut writer = JsonlWriter::create(&path)?;
        for _ in 0..*to_generate {
            writer.write(&generate_sample(catalog, intent, rng)?)?;
        }
        let generated = writer.finish()?;

        outcomes.push(AugmentOutcome { intent: intent.clone(), path: Some(path), generated });
    }

    Ok(outcomes)
}
