use std::fs;

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use rand::prelude::*;

use dialogue_prep::augment::{self, Catalog};
use dialogue_prep::{analyze, convert, merge};

const DIALOGUES: &str = r#"[
  {
    "dialogue_id": "PMUL0001",
    "turns": [
      {"speaker": "SYSTEM", "turn_id": "0", "utterance": "Hi", "frames": []},
      {"speaker": "USER", "turn_id": "1", "utterance": "I need a hospital",
       "frames": [{"service": "hospital",
                   "state": {"active_intent": "find_hospital",
                             "slot_values": {"hospital-department": ["Emergency"]}}}]},
      {"speaker": "SYSTEM", "turn_id": "2", "utterance": "Addenbrookes has one.", "frames": [{"service": "hospital"}]},
      {"speaker": "USER", "turn_id": "3", "utterance": "Thanks, bye",
       "frames": [{"state": {"active_intent": "NONE", "slot_values": {}}}]}
    ]
  },
  {
    "dialogue_id": "PMUL0002",
    "turns": [
      {"speaker": "USER", "turn_id": "0", "utterance": "Where is the police?",
       "frames": [{"state": {"active_intent": "find_police", "slot_values": {}}}]}
    ]
  }
]"#;

#[test]
fn convert_augment_merge_analyze() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("dialogues.json"), DIALOGUES).unwrap();

    // convert
    let files = convert::expand_inputs(&[format!("{}/*.json", root.display())]).unwrap();
    let flattened = root.join("flat.jsonl");
    let summary = convert::convert_files(&files, &flattened, false).unwrap();
    assert_eq!((summary.dialogues, summary.examples), (2, 3));

    let actual: Vec<String> = fs::read_to_string(&flattened).unwrap().lines().map(String::from).collect();
    let expected = vec![
        r#"{"input":"SYSTEM: Hi USER: I need a hospital","target":"intents: find_hospital; slots: hospital-department=emergency"}"#.to_string(),
        r#"{"input":"SYSTEM: Hi USER: I need a hospital SYSTEM: Addenbrookes has one. USER: Thanks, bye","target":"intents: NONE; slots: "}"#.to_string(),
        r#"{"input":"USER: Where is the police?","target":"intents: find_police; slots: "}"#.to_string(),
    ];
    assert_eq!(actual, expected);

    // augment from a measured baseline
    let baseline = analyze::analyze_file(&flattened).unwrap();
    let catalog = Catalog::emergency();
    let counts: IndexMap<String, usize> = catalog
        .intents()
        .map(|intent| (intent.to_string(), baseline.intents.get(intent)))
        .collect();
    let plan = augment::plan(&catalog, &counts, 3);
    let mut rng = StdRng::seed_from_u64(42);
    let outcomes = augment::augment(&catalog, &plan, root, &mut rng).unwrap();
    let generated: Vec<usize> = outcomes.iter().map(|o| o.generated).collect();
    assert_eq!(generated, vec![2, 2, 3, 3]);

    // merge everything and re-analyse
    let mut inputs = vec![flattened];
    inputs.extend(outcomes.iter().filter_map(|o| o.path.clone()));
    let merged = root.join("merged.jsonl");
    let summary = merge::merge_jsonl(&merged, &inputs, true).unwrap();
    assert_eq!(summary.lines, 13);

    let distribution = analyze::analyze_file(&merged).unwrap();
    for intent in ["find_hospital", "find_police", "find_pharmacy", "find_embassy"] {
        assert_eq!(distribution.intents.get(intent), 3, "{}", intent);
    }
    assert_eq!(distribution.records, 13);
}
