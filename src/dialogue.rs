//! Typed dialogue records and their loading from SGD-style JSON.
//!
//! The wire structs mirror the JSON loosely (every field optional) and are
//! converted into [`Dialogue`] at the boundary, so a missing field fails with
//! the dialogue and turn it belongs to.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Sentinel the dataset uses for "no active intent".
pub const NO_INTENT: &str = "NONE";

// =============================================================================
// Typed records
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    System,
}

impl Speaker {
    pub fn label(self) -> &'static str {
        match self {
            Speaker::User => "USER",
            Speaker::System => "SYSTEM",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "USER" => Some(Speaker::User),
            "SYSTEM" => Some(Speaker::System),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub active_intent: Option<String>,
    pub slot_values: IndexMap<String, Vec<String>>,
}

impl Frame {
    /// The active intent, unless it is absent, empty or the `NONE` sentinel.
    pub fn intent(&self) -> Option<&str> {
        self.active_intent
            .as_deref()
            .filter(|intent| !intent.is_empty() && *intent != NO_INTENT)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub turn_id: String,
    pub speaker: Speaker,
    pub utterance: String,
    pub frames: Vec<Frame>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dialogue {
    pub dialogue_id: String,
    pub turns: Vec<Turn>,
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Deserialize)]
struct RawDialogue {
    dialogue_id: Option<String>,
    turns: Option<Vec<RawTurn>>,
}

#[derive(Deserialize)]
struct RawTurn {
    turn_id: Option<String>,
    speaker: Option<String>,
    utterance: Option<String>,
    #[serde(default)]
    frames: Vec<RawFrame>,
}

#[derive(Deserialize)]
struct RawFrame {
    state: Option<RawState>,
}

#[derive(Deserialize)]
struct RawState {
    active_intent: Option<String>,
    #[serde(default)]
    slot_values: IndexMap<String, Vec<String>>,
}

impl RawDialogue {
    fn into_dialogue(self) -> Result<Dialogue> {
        let dialogue_id = self.dialogue_id.unwrap_or_default();
        let raw_turns = self.turns.ok_or_else(|| Error::MissingField {
            field: "turns",
            dialogue_id: dialogue_id.clone(),
            turn_id: String::new(),
        })?;

        let turns = raw_turns
            .into_iter()
            .map(|turn| turn.into_turn(&dialogue_id))
            .collect::<Result<Vec<_>>>()?;

        Ok(Dialogue { dialogue_id, turns })
    }
}

impl RawTurn {
    fn into_turn(self, dialogue_id: &str) -> Result<Turn> {
        let turn_id = self.turn_id.unwrap_or_default();
        let missing = |field| Error::MissingField {
            field,
            dialogue_id: dialogue_id.to_string(),
            turn_id: turn_id.clone(),
        };

        let raw_speaker = self.speaker.ok_or_else(|| missing("speaker"))?;
        let utterance = self.utterance.ok_or_else(|| missing("utterance"))?;
        let speaker = Speaker::parse(&raw_speaker).ok_or_else(|| Error::UnknownSpeaker {
            speaker: raw_speaker.clone(),
            dialogue_id: dialogue_id.to_string(),
            turn_id: turn_id.clone(),
        })?;

        let mut frames = Vec::with_capacity(self.frames.len());
        for frame in self.frames {
            match (frame.state, speaker) {
                (Some(state), _) => frames.push(Frame {
                    active_intent: state.active_intent,
                    slot_values: state.slot_values,
                }),
                // System frames carry actions, not state
                (None, Speaker::System) => {}
                (None, Speaker::User) => return Err(missing("state")),
            }
        }

        Ok(Turn {
            turn_id,
            speaker,
            utterance: utterance.trim().to_string(),
            frames,
        })
    }
}

/// Parse a dialogue file body: either a single dialogue object or an array.
pub fn parse_dialogues(text: &str, origin: &str) -> Result<Vec<Dialogue>> {
    let json_error = |source| Error::Json {
        origin: origin.to_string(),
        source,
    };
    let value: Value = serde_json::from_str(text).map_err(json_error)?;

    let raw: Vec<RawDialogue> = match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| {
                serde_json::from_value::<RawDialogue>(item).map_err(|source| Error::Json {
                    origin: format!("{}[{}]", origin, idx),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?,
        single => vec![serde_json::from_value(single).map_err(json_error)?],
    };

    raw.into_iter().map(RawDialogue::into_dialogue).collect()
}

pub fn load_dialogues(path: &Path) -> Result<Vec<Dialogue>> {
    let text = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_dialogues(&text, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SINGLE: &str = r#"{
        "dialogue_id": "d1",
        "turns": [
            {"speaker": "SYSTEM", "turn_id": "0", "utterance": " Hi ", "frames": [{"service": "hospital", "actions": []}]},
            {"speaker": "user", "turn_id": "1", "utterance": "I need a hospital",
             "frames": [{"state": {"active_intent": "find_hospital",
                                   "slot_values": {"hospital-name": ["Addenbrookes"], "hospital-department": ["Emergency"]}}}]}
        ]
    }"#;

    #[test]
    fn parses_single_object() {
        let dialogues = parse_dialogues(SINGLE, "test").unwrap();
        let actual = dialogues.len();
        let expected = 1;
        assert_eq!(actual, expected);

        let dialogue = &dialogues[0];
        assert_eq!(dialogue.dialogue_id, "d1");
        assert_eq!(dialogue.turns[0].speaker, Speaker::System);
        assert_eq!(dialogue.turns[0].utterance, "Hi");
        assert!(dialogue.turns[0].frames.is_empty());
        assert_eq!(dialogue.turns[1].speaker, Speaker::User);
    }

    #[test]
    fn slot_values_keep_document_order() {
        let dialogues = parse_dialogues(SINGLE, "test").unwrap();
        let frame = &dialogues[0].turns[1].frames[0];
        let actual: Vec<&str> = frame.slot_values.keys().map(String::as_str).collect();
        let expected = vec!["hospital-name", "hospital-department"];
        assert_eq!(actual, expected);
    }

    #[test]
    fn parses_array_and_defaults_ids() {
        let text = r#"[{"turns": []}, {"dialogue_id": "b", "turns": [{"speaker": "USER", "utterance": "x"}]}]"#;
        let dialogues = parse_dialogues(text, "test").unwrap();
        assert_eq!(dialogues.len(), 2);
        assert_eq!(dialogues[0].dialogue_id, "");
        assert_eq!(dialogues[1].turns[0].turn_id, "");
        assert!(dialogues[1].turns[0].frames.is_empty());
    }

    #[test]
    fn missing_turns_fails_fast() {
        let error = parse_dialogues(r#"{"dialogue_id": "d9"}"#, "test").unwrap_err();
        assert!(matches!(error, Error::MissingField { field: "turns", ref dialogue_id, .. } if dialogue_id == "d9"));
    }

    #[test]
    fn user_frame_without_state_fails_fast() {
        let text = r#"{"dialogue_id": "d", "turns": [{"speaker": "USER", "turn_id": "3", "utterance": "x", "frames": [{"service": "s"}]}]}"#;
        let error = parse_dialogues(text, "test").unwrap_err();
        assert!(matches!(error, Error::MissingField { field: "state", ref turn_id, .. } if turn_id == "3"));
    }

    #[test]
    fn unknown_speaker_is_rejected() {
        let text = r#"{"turns": [{"speaker": "BOT", "utterance": "x"}]}"#;
        let error = parse_dialogues(text, "test").unwrap_err();
        assert!(matches!(error, Error::UnknownSpeaker { ref speaker, .. } if speaker == "BOT"));
    }

    #[test]
    fn none_sentinel_is_not_an_intent() {
        let fixture = Frame { active_intent: Some(NO_INTENT.to_string()), ..Frame::default() };
        assert_eq!(fixture.intent(), None);

        let fixture = Frame { active_intent: Some(String::new()), ..Frame::default() };
        assert_eq!(fixture.intent(), None);

        let fixture = Frame { active_intent: Some("find_police".to_string()), ..Frame::default() };
        assert_eq!(fixture.intent(), Some("find_police"));
    }

    #[test]
    fn absent_intent_and_slot_values_mean_no_labels() {
        let text = r#"{"dialogue_id": "d", "turns": [
            {"speaker": "SYSTEM", "turn_id": "0", "utterance": "s",
             "frames": [{"state": {"active_intent": "find_hospital", "slot_values": {"hospital-name": ["Queen Mary"]}}}]},
            {"speaker": "USER", "turn_id": "1", "utterance": "u",
             "frames": [{"state": {"active_intent": null}}, {"state": {}}]}
        ]}"#;
        let dialogues = parse_dialogues(text, "test").unwrap();
        let user = &dialogues[0].turns[1];
        assert_eq!(user.frames, vec![Frame::default(), Frame::default()]);

        let actual = crate::flatten::flatten(&dialogues[0]);
        let expected = vec![crate::flatten::FlattenedExample {
            dialogue_id: "d".into(),
            turn_id: "1".into(),
            input: "SYSTEM: s USER: u".into(),
            target: "intents: NONE; slots: ".into(),
        }];
        assert_eq!(actual, expected);
    }

    #[test]
    fn wire_type_error_names_the_dialogue_index() {
        let text = r#"[{"turns": []}, {"turns": [{"speaker": "USER", "turn_id": 0, "utterance": "x"}]}]"#;
        let error = parse_dialogues(text, "dialogues.json").unwrap_err();
        assert!(matches!(error, Error::Json { ref origin, .. } if origin == "dialogues.json[1]"));
    }

    #[test]
    fn load_reports_path_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let error = load_dialogues(&path).unwrap_err();
        assert!(matches!(error, Error::Read { path: ref p, .. } if p == &path));
    }
}
