use branchline_dsl::codec::{dtl, source};
use branchline_dsl::validation::error_codes;
use branchline_dsl::{
    generate, parse, serialize, validate_dialogue, voice_lines, Character, ChoiceOption, Dialogue,
    DialogueStore, EdgeField, Event, Node, NodeKind, Value, ValueMap,
};
use pretty_assertions::assert_eq;

fn assert_positions_match(left: &Dialogue, right: &Dialogue) {
    for (id, node) in &left.nodes {
        let other = right.node(id).unwrap_or_else(|| panic!("node {} missing after round trip", id));
        assert!((node.ui.x - other.ui.x).abs() < 1e-6, "x differs for {}", id);
        assert!((node.ui.y - other.ui.y).abs() < 1e-6, "y differs for {}", id);
    }
}

fn strip_positions(dialogue: &Dialogue) -> Dialogue {
    let mut copy = dialogue.clone();
    for node in copy.nodes.values_mut() {
        node.ui = Default::default();
    }
    copy
}

fn build_quest_dialogue() -> DialogueStore {
    let mut store = DialogueStore::from_dialogue(Dialogue::with_id("quest_giver"));
    store.add_character("smith", Character::new("Blacksmith").with_color("#884422"));
    store.add_character("hero", Character::new("Hero").with_portrait("res://hero.png"));

    let mut assignments = ValueMap::new();
    assignments.insert("quest".to_string(), Value::from("sword"));
    assignments.insert("reward".to_string(), Value::from(25u64));

    let mut args = ValueMap::new();
    args.insert("id".to_string(), Value::from("sword"));

    let nodes = vec![
        Node::with_id("greet", NodeKind::say(Some("smith"), "Need a blade?", Some("offer"))).at(0.0, 0.0),
        Node::with_id(
            "offer",
            NodeKind::choice(vec![
                ChoiceOption::new("Yes", Some("accept")),
                ChoiceOption::new("With gold", Some("rich")).with_condition("{gold} >= 100"),
                ChoiceOption::new("No", Some("refuse")),
            ]),
        )
        .at(200.25, 40.5),
        Node::with_id("accept", NodeKind::Set { assignments, next: Some("notify".to_string()) }).at(400.0, -12.75),
        Node::with_id(
            "notify",
            NodeKind::Signal { name: "quest_started".to_string(), args, next: Some("done".to_string()) },
        ),
        Node::with_id("rich", NodeKind::branch("{gold} >= 500", Some("done"), Some("accept"))),
        Node::with_id("refuse", NodeKind::say(Some("hero"), "Maybe later.", None)),
        Node::with_id("done", NodeKind::end(Some("accepted"))).at(1e3, 1e-3),
    ];
    for node in nodes {
        store.add_node(node).unwrap();
    }
    store
}

#[test]
fn test_round_trip_after_store_operations() {
    let mut store = build_quest_dialogue();
    store.add_node(Node::with_id("scratch", NodeKind::jump("greet"))).unwrap();
    store.update_position("scratch", 33.3, 44.4);
    store.remove_node("scratch");
    store.update_position("refuse", 1.0 / 3.0, -2.0 / 3.0);

    let original = store.dialogue();
    let text = serialize(original).unwrap();
    let reloaded = parse(&text).unwrap().unwrap();

    assert_eq!(strip_positions(&reloaded), strip_positions(original));
    assert_positions_match(original, &reloaded);

    // Serializing the reloaded dialogue yields the same text
    assert_eq!(serialize(&reloaded).unwrap(), text);
}

#[test]
fn test_save_and_load_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quest_giver.yaml");

    let mut store = build_quest_dialogue();
    assert!(store.is_modified());
    let written = source::save(&mut store, Some(&path)).unwrap();
    assert_eq!(written, path);
    assert!(!store.is_modified());

    let loaded = source::load_file(&path).unwrap().unwrap();
    assert_eq!(loaded.source_path(), Some(path.as_path()));
    assert_eq!(strip_positions(loaded.dialogue()), strip_positions(store.dialogue()));

    // Saving again without a path reuses the source path
    let mut loaded = loaded;
    loaded.update_position("greet", 5.0, 6.0);
    assert_eq!(source::save(&mut loaded, None).unwrap(), path);
}

#[test]
fn test_save_without_destination_fails() {
    let mut store = DialogueStore::new();
    let error = source::save(&mut store, None).unwrap_err();
    assert_eq!(error.error_code(), "ERR_DIALOGUE_NO_DESTINATION");
}

#[test]
fn test_reference_integrity_after_removals() {
    let mut store = build_quest_dialogue();
    for id in ["accept", "done", "greet"] {
        assert!(store.remove_node(id).is_some());
    }

    let dialogue = store.dialogue();
    assert_eq!(dialogue.start, None);
    for node in dialogue.nodes.values() {
        for (field, target) in node.edges() {
            assert!(
                dialogue.contains_node(target),
                "{}.{} still points at removed node {}",
                node.id,
                field,
                target
            );
        }
    }

    // The choice keeps all three options; only the removed target is cleared
    match &dialogue.node("offer").unwrap().kind {
        NodeKind::Choice { options } => {
            let targets: Vec<Option<&str>> = options.iter().map(|o| o.next.as_deref()).collect();
            assert_eq!(targets, vec![None, Some("rich"), Some("refuse")]);
        }
        other => panic!("Expected choice, got {:?}", other),
    }
    match &dialogue.node("rich").unwrap().kind {
        NodeKind::If { then, otherwise, .. } => {
            assert_eq!(then, &None);
            assert_eq!(otherwise, &None);
        }
        other => panic!("Expected if, got {:?}", other),
    }
}

#[test]
fn test_single_unreachable_node() {
    let yaml = r#"
id: small
start: a
nodes:
  a:
    say: First
    next: b
  b:
    end: true
  c:
    say: Orphan
"#;
    let dialogue = parse(yaml).unwrap().unwrap();
    let diagnostics = validate_dialogue(&dialogue);

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, error_codes::UNREACHABLE_NODE);
    assert_eq!(diagnostics[0].node.as_deref(), Some("c"));
}

#[test]
fn test_dangling_choice_index() {
    let yaml = r#"
id: choices
start: pick
nodes:
  pick:
    choice:
      - text: Fine
        next: end
      - text: Broken
        next: nowhere
  end:
    end: true
"#;
    let dialogue = parse(yaml).unwrap().unwrap();
    let diagnostics = validate_dialogue(&dialogue);

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, error_codes::DANGLING_REFERENCE);
    assert_eq!(diagnostics[0].node.as_deref(), Some("pick"));
    assert_eq!(diagnostics[0].field, Some(EdgeField::Option(1).to_string()));
}

#[test]
fn test_cycles_terminate() {
    let yaml = r#"
id: loop
start: a
nodes:
  a:
    say: Again?
    next: b
  b:
    choice:
      - text: Yes
        next: a
      - text: Check
        next: c
  c:
    if: "{tired}"
    then: b
    else: a
"#;
    let dialogue = parse(yaml).unwrap().unwrap();
    assert!(validate_dialogue(&dialogue).is_empty());

    let events = generate(&dialogue);
    let labels: Vec<&str> = events
        .iter()
        .filter_map(|event| match event {
            Event::Label { id } => Some(id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(labels, vec!["a", "b", "c"]);
}

#[test]
fn test_lowering_is_deterministic() {
    let store = build_quest_dialogue();
    let first = generate(store.dialogue());

    // A reloaded copy lowers to the same events
    let reloaded = parse(&serialize(store.dialogue()).unwrap()).unwrap().unwrap();
    for _ in 0..5 {
        assert_eq!(generate(&reloaded), first);
    }
    assert_eq!(dtl::render(&first), dtl::render(&generate(&reloaded)));
}

#[test]
fn test_lowering_visits_branches_in_order() {
    let store = build_quest_dialogue();
    let labels: Vec<String> = generate(store.dialogue())
        .into_iter()
        .filter_map(|event| match event {
            Event::Label { id } => Some(id),
            _ => None,
        })
        .collect();
    assert_eq!(labels, vec!["greet", "offer", "accept", "notify", "done", "rich", "refuse"]);
}

#[test]
fn test_voice_lines_resolve_speakers() {
    let store = build_quest_dialogue();
    let lines = voice_lines(store.dialogue());

    let summary: Vec<(&str, Option<&str>, &str)> = lines
        .iter()
        .map(|line| (line.node_id.as_str(), line.speaker_name.as_deref(), line.text.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("greet", Some("Blacksmith"), "Need a blade?"),
            ("refuse", Some("Hero"), "Maybe later."),
        ]
    );
}
