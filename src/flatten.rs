//! Dialogue to (input, target) pairs, one per user turn.

use indexmap::IndexSet;
use serde::Serialize;

use crate::dialogue::{Dialogue, Speaker, Turn};
use crate::target::{Slot, TargetLabel};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlattenedExample {
    pub dialogue_id: String,
    pub turn_id: String,
    pub input: String,
    pub target: String,
}

/// The two-field record written to training files.
#[derive(Debug, Serialize)]
pub struct TrainingRecord<'a> {
    pub input: &'a str,
    pub target: &'a str,
}

impl FlattenedExample {
    pub fn record(&self) -> TrainingRecord<'_> {
        TrainingRecord { input: &self.input, target: &self.target }
    }
}

pub fn format_turn(speaker: Speaker, utterance: &str) -> String {
    format!("{}: {}", speaker.label(), utterance)
}

/// Intents and slots of one turn, deduplicated in first-occurrence order.
pub fn extract_label(turn: &Turn) -> TargetLabel {
    let mut intents = IndexSet::new();
    let mut slots = IndexSet::new();

    for frame in &turn.frames {
        if let Some(intent) = frame.intent() {
            intents.insert(intent.to_string());
        }
        for (name, values) in &frame.slot_values {
            for value in values {
                slots.insert(Slot::new(name.as_str(), value.to_lowercase()));
            }
        }
    }

    TargetLabel {
        intents: intents.into_iter().collect(),
        slots: slots.into_iter().collect(),
    }
}

pub fn flatten(dialogue: &Dialogue) -> Vec<FlattenedExample> {
    let mut history = Vec::with_capacity(dialogue.turns.len());
    let mut examples = Vec::new();

    for turn in &dialogue.turns {
        history.push(format_turn(turn.speaker, &turn.utterance));

        if turn.speaker == Speaker::User {
            examples.push(FlattenedExample {
                dialogue_id: dialogue.dialogue_id.clone(),
                turn_id: turn.turn_id.clone(),
                input: history.join(" "),
                target: extract_label(turn).to_string(),
            });
        }
    }

    examples
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dialogue::Frame;

    fn turn(speaker: Speaker, id: &str, utterance: &str, frames: Vec<Frame>) -> Turn {
        Turn { turn_id: id.into(), speaker, utterance: utterance.into(), frames }
    }

    fn frame(intent: Option<&str>, slots: Vec<(&str, Vec<&str>)>) -> Frame {
        let slot_values: IndexMap<String, Vec<String>> = slots
            .into_iter()
            .map(|(name, values)| (name.to_string(), values.iter().map(|v| v.to_string()).collect()))
            .collect();
        Frame { active_intent: intent.map(str::to_string), slot_values }
    }

    #[test]
    fn hospital_example() {
        let fixture = Dialogue {
            dialogue_id: "d1".into(),
            turns: vec![
                turn(Speaker::System, "0", "Hi", vec![]),
                turn(
                    Speaker::User,
                    "1",
                    "I need a hospital",
                    vec![frame(Some("find_hospital"), vec![("hospital-department", vec!["Emergency"])])],
                ),
            ],
        };
        let actual = flatten(&fixture);
        let expected = vec![FlattenedExample {
            dialogue_id: "d1".into(),
            turn_id: "1".into(),
            input: "SYSTEM: Hi USER: I need a hospital".into(),
            target: "intents: find_hospital; slots: hospital-department=emergency".into(),
        }];
        assert_eq!(actual, expected);
    }

    #[test]
    fn user_turn_without_frames() {
        let fixture = Dialogue {
            dialogue_id: String::new(),
            turns: vec![turn(Speaker::User, "0", "hello", vec![])],
        };
        let actual = flatten(&fixture)[0].target.clone();
        let expected = "intents: NONE; slots: ";
        assert_eq!(actual, expected);
    }

    #[test]
    fn one_example_per_user_turn_with_growing_history() {
        let fixture = Dialogue {
            dialogue_id: "d".into(),
            turns: vec![
                turn(Speaker::User, "0", "a", vec![]),
                turn(Speaker::System, "1", "b", vec![]),
                turn(Speaker::User, "2", "c", vec![]),
                turn(Speaker::System, "3", "d", vec![]),
            ],
        };
        let examples = flatten(&fixture);
        let user_turns = fixture.turns.iter().filter(|t| t.speaker == Speaker::User).count();
        assert_eq!(examples.len(), user_turns);

        let actual: Vec<&str> = examples.iter().map(|e| e.input.as_str()).collect();
        let expected = vec!["USER: a", "USER: a SYSTEM: b USER: c"];
        assert_eq!(actual, expected);
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let fixture = turn(
            Speaker::User,
            "0",
            "x",
            vec![
                frame(Some("find_police"), vec![("police-station", vec!["Central", "central"]), ("area", vec!["North"])]),
                frame(Some("NONE"), vec![]),
                frame(Some("find_hospital"), vec![("area", vec!["north", "South"])]),
                frame(Some("find_police"), vec![]),
            ],
        );
        let actual = extract_label(&fixture).to_string();
        let expected =
            "intents: find_police|find_hospital; slots: police-station=central; area=north; area=south";
        assert_eq!(actual, expected);
    }

    #[test]
    fn none_only_frames_render_none() {
        let fixture = turn(Speaker::User, "0", "x", vec![frame(Some("NONE"), vec![]), frame(None, vec![])]);
        let actual = extract_label(&fixture).to_string();
        let expected = "intents: NONE; slots: ";
        assert_eq!(actual, expected);
    }

    #[test]
    fn flatten_is_idempotent() {
        let fixture = Dialogue {
            dialogue_id: "d".into(),
            turns: vec![turn(Speaker::User, "0", "x", vec![frame(Some("find_embassy"), vec![("embassy-city", vec!["Leeds"])])])],
        };
        assert_eq!(flatten(&fixture), flatten(&fixture));
    }

    #[test]
    fn training_record_has_two_fields() {
        let fixture = FlattenedExample {
            dialogue_id: "d".into(),
            turn_id: "t".into(),
            input: "USER: x".into(),
            target: "intents: NONE; slots: ".into(),
        };
        let actual = serde_json::to_string(&fixture.record()).unwrap();
        let expected = r#"{"input":"USER: x","target":"intents: NONE; slots: "}"#;
        assert_eq!(actual, expected);
    }
}
