//! YAML source format: parse into a [`Dialogue`] and serialize back.
//!
//! Parsing is deliberately lenient so partially authored files still load:
//! absent optional fields default to empty values, identifier-shaped values
//! are coerced to strings, and node variants are picked by key probing.
//! Serialization omits zero-valued fields, except `start` and each node's
//! `ui` position, which are always written.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value as Yaml};
use tracing::{debug, info};

use crate::error::DialogueError;
use crate::model::{
    Character, ChoiceOption, Dialogue, Node, NodeId, NodeKind, Position, ValueMap,
};
use crate::store::DialogueStore;
use crate::utils::color::DEFAULT_COLOR;

/// Parse a YAML document into a dialogue.
///
/// Returns `Ok(None)` for an empty document.
pub fn parse(document: &str) -> Result<Option<Dialogue>, DialogueError> {
    if document.trim().is_empty() {
        return Ok(None);
    }
    let root: Yaml = serde_yaml::from_str(document)?;
    parse_value(&root)
}

/// Parse an already-loaded YAML value into a dialogue
pub fn parse_value(root: &Yaml) -> Result<Option<Dialogue>, DialogueError> {
    let root = match root {
        Yaml::Null => return Ok(None),
        Yaml::Mapping(map) if map.is_empty() => return Ok(None),
        Yaml::Mapping(map) => map,
        other => {
            return Err(DialogueError::parse(
                "$",
                format!("expected a mapping at the top level, found {}", describe(other)),
            ))
        }
    };

    let id = text_field(root, "id", "id")?;
    let title = text_field(root, "title", "title")?;
    let mut dialogue = Dialogue {
        title: if title.is_empty() { id.clone() } else { title },
        id,
        start: identifier(root.get("start"), "start")?,
        tags: string_list(root.get("tags"), "tags")?,
        ..Default::default()
    };

    if let Some(characters) = mapping_field(root, "characters", "characters")? {
        for (key, value) in characters {
            let char_id = key_text(key, "characters")?;
            let path = format!("characters.{}", char_id);
            let character = parse_character(&char_id, value, &path)?;
            dialogue.characters.insert(char_id, character);
        }
    }

    if let Some(nodes) = mapping_field(root, "nodes", "nodes")? {
        for (key, value) in nodes {
            let node_id = key_text(key, "nodes")?;
            let path = format!("nodes.{}", node_id);
            let node = parse_node(&node_id, value, &path)?;
            dialogue.nodes.insert(node_id, node);
        }
    }

    debug!(
        dialogue_id = %dialogue.id,
        nodes = dialogue.nodes.len(),
        characters = dialogue.characters.len(),
        "Parsed dialogue"
    );
    Ok(Some(dialogue))
}

fn parse_character(id: &str, value: &Yaml, path: &str) -> Result<Character, DialogueError> {
    let map = match value {
        Yaml::Mapping(map) => map,
        // A bare scalar is just the display name
        other => {
            let name = scalar_text(other, path)?.unwrap_or_default();
            return Ok(Character::new(if name.is_empty() { id.to_string() } else { name }));
        }
    };

    let name = text_field(map, "name", &format!("{}.name", path))?;
    let color = match map.get("color") {
        Some(value) => scalar_text(value, &format!("{}.color", path))?.unwrap_or_default(),
        None => DEFAULT_COLOR.to_string(),
    };

    Ok(Character {
        display_name: if name.is_empty() { id.to_string() } else { name },
        portrait_path: non_empty(text_field(map, "portrait", &format!("{}.portrait", path))?),
        color,
        tags: string_list(map.get("tags"), &format!("{}.tags", path))?,
    })
}

/// Parse one node record.
///
/// Variant keys are probed in the order say, choice, set, if, jump, signal;
/// an `end` key overrides whatever was found. A record with none of them is
/// an empty say node.
fn parse_node(id: &str, value: &Yaml, path: &str) -> Result<Node, DialogueError> {
    let empty = Mapping::new();
    let record = match value {
        Yaml::Mapping(map) => map,
        Yaml::Null => &empty,
        other => {
            return Err(DialogueError::parse(
                path,
                format!("expected a node mapping, found {}", describe(other)),
            ))
        }
    };

    let mut kind = if let Some(say) = record.get("say") {
        parse_say(say, &format!("{}.say", path))?
    } else if let Some(choice) = record.get("choice") {
        parse_choice(choice, &format!("{}.choice", path))?
    } else if let Some(set) = record.get("set") {
        NodeKind::Set {
            assignments: value_map(set, &format!("{}.set", path))?,
            next: None,
        }
    } else if let Some(condition) = record.get("if") {
        NodeKind::If {
            condition: scalar_text(condition, &format!("{}.if", path))?.unwrap_or_default(),
            then: identifier(record.get("then"), &format!("{}.then", path))?,
            otherwise: identifier(record.get("else"), &format!("{}.else", path))?,
        }
    } else if let Some(target) = record.get("jump") {
        NodeKind::Jump {
            target: identifier(Some(target), &format!("{}.jump", path))?,
        }
    } else if let Some(signal) = record.get("signal") {
        parse_signal(signal, &format!("{}.signal", path))?
    } else {
        NodeKind::default()
    };

    if let Some(end) = record.get("end") {
        kind = NodeKind::End {
            outcome: parse_outcome(end, &format!("{}.end", path))?,
        };
    }

    let next_value = identifier(record.get("next"), &format!("{}.next", path))?;
    if let NodeKind::Say { next, .. } | NodeKind::Set { next, .. } | NodeKind::Signal { next, .. } =
        &mut kind
    {
        *next = next_value;
    }

    Ok(Node {
        id: id.to_string(),
        kind,
        ui: parse_position(record.get("ui"), &format!("{}.ui", path))?,
    })
}

fn parse_say(value: &Yaml, path: &str) -> Result<NodeKind, DialogueError> {
    match value {
        Yaml::Mapping(map) => Ok(NodeKind::Say {
            speaker: identifier(map.get("speaker"), &format!("{}.speaker", path))?,
            text: text_field(map, "text", &format!("{}.text", path))?,
            next: None,
        }),
        other => Ok(NodeKind::Say {
            speaker: None,
            text: scalar_text(other, path)?.unwrap_or_default(),
            next: None,
        }),
    }
}

fn parse_choice(value: &Yaml, path: &str) -> Result<NodeKind, DialogueError> {
    let items = match value {
        Yaml::Null => return Ok(NodeKind::Choice { options: Vec::new() }),
        Yaml::Sequence(items) => items,
        other => {
            return Err(DialogueError::parse(
                path,
                format!("expected a list of options, found {}", describe(other)),
            ))
        }
    };

    let mut options = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let option_path = format!("{}[{}]", path, index);
        let map = match item {
            Yaml::Mapping(map) => map,
            other => {
                return Err(DialogueError::parse(
                    option_path,
                    format!("expected an option mapping, found {}", describe(other)),
                ))
            }
        };
        options.push(ChoiceOption {
            text: text_field(map, "text", &format!("{}.text", option_path))?,
            next: identifier(map.get("next"), &format!("{}.next", option_path))?,
            condition: non_empty(text_field(map, "if", &format!("{}.if", option_path))?),
        });
    }

    Ok(NodeKind::Choice { options })
}

fn parse_signal(value: &Yaml, path: &str) -> Result<NodeKind, DialogueError> {
    match value {
        Yaml::Mapping(map) => Ok(NodeKind::Signal {
            name: text_field(map, "name", &format!("{}.name", path))?,
            args: match map.get("args") {
                Some(args) => value_map(args, &format!("{}.args", path))?,
                None => ValueMap::new(),
            },
            next: None,
        }),
        other => Ok(NodeKind::Signal {
            name: scalar_text(other, path)?.unwrap_or_default(),
            args: ValueMap::new(),
            next: None,
        }),
    }
}

/// `end: true` (or an empty `end:`) ends without an outcome; any other value
/// is kept as the outcome text.
fn parse_outcome(value: &Yaml, path: &str) -> Result<Option<String>, DialogueError> {
    match value {
        Yaml::Bool(true) | Yaml::Null => Ok(None),
        Yaml::Mapping(_) | Yaml::Sequence(_) => {
            Ok(non_empty(serde_yaml::to_string(value)?.trim().to_string()))
        }
        other => Ok(scalar_text(other, path)?.and_then(non_empty)),
    }
}

fn parse_position(value: Option<&Yaml>, path: &str) -> Result<Position, DialogueError> {
    let map = match value {
        None | Some(Yaml::Null) => return Ok(Position::default()),
        Some(Yaml::Mapping(map)) => map,
        Some(other) => {
            return Err(DialogueError::parse(
                path,
                format!("expected {{x, y}}, found {}", describe(other)),
            ))
        }
    };

    let coordinate = |axis: &str| -> Result<f64, DialogueError> {
        match map.get(axis) {
            None | Some(Yaml::Null) => Ok(0.0),
            Some(Yaml::Number(number)) => number.as_f64().ok_or_else(|| {
                DialogueError::parse(format!("{}.{}", path, axis), "coordinate out of range")
            }),
            Some(other) => Err(DialogueError::parse(
                format!("{}.{}", path, axis),
                format!("expected a number, found {}", describe(other)),
            )),
        }
    };

    Ok(Position::new(coordinate("x")?, coordinate("y")?))
}

fn value_map(value: &Yaml, path: &str) -> Result<ValueMap, DialogueError> {
    match value {
        Yaml::Null => Ok(ValueMap::new()),
        Yaml::Mapping(map) => map
            .iter()
            .map(|(key, value)| Ok((key_text(key, path)?, value.clone())))
            .collect(),
        other => Err(DialogueError::parse(
            path,
            format!("expected a mapping, found {}", describe(other)),
        )),
    }
}

fn mapping_field<'a>(
    map: &'a Mapping,
    key: &str,
    path: &str,
) -> Result<Option<&'a Mapping>, DialogueError> {
    match map.get(key) {
        None | Some(Yaml::Null) => Ok(None),
        Some(Yaml::Mapping(inner)) => Ok(Some(inner)),
        Some(other) => Err(DialogueError::parse(
            path,
            format!("expected a mapping, found {}", describe(other)),
        )),
    }
}

fn string_list(value: Option<&Yaml>, path: &str) -> Result<Vec<String>, DialogueError> {
    match value {
        None | Some(Yaml::Null) => Ok(Vec::new()),
        Some(Yaml::Sequence(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                Ok(scalar_text(item, &format!("{}[{}]", path, index))?.unwrap_or_default())
            })
            .collect(),
        // A single tag written without brackets
        Some(other) => Ok(scalar_text(other, path)?.into_iter().collect()),
    }
}

/// Text of an optional scalar field; absent means empty
fn text_field(map: &Mapping, key: &str, path: &str) -> Result<String, DialogueError> {
    match map.get(key) {
        Some(value) => Ok(scalar_text(value, path)?.unwrap_or_default()),
        None => Ok(String::new()),
    }
}

/// An identifier-shaped field. Numbers and booleans are coerced to their
/// textual form so ids compare by exact string equality; empty means unset.
fn identifier(value: Option<&Yaml>, path: &str) -> Result<Option<NodeId>, DialogueError> {
    match value {
        None => Ok(None),
        Some(value) => Ok(scalar_text(value, path)?.and_then(non_empty)),
    }
}

fn key_text(key: &Yaml, path: &str) -> Result<String, DialogueError> {
    scalar_text(key, path)?
        .ok_or_else(|| DialogueError::parse(path, "mapping keys must not be null"))
}

fn scalar_text(value: &Yaml, path: &str) -> Result<Option<String>, DialogueError> {
    match value {
        Yaml::Null => Ok(None),
        Yaml::String(text) => Ok(Some(text.clone())),
        Yaml::Number(number) => Ok(Some(number.to_string())),
        Yaml::Bool(flag) => Ok(Some(flag.to_string())),
        Yaml::Tagged(tagged) => scalar_text(&tagged.value, path),
        other => Err(DialogueError::parse(
            path,
            format!("expected a scalar, found {}", describe(other)),
        )),
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn describe(value: &Yaml) -> &'static str {
    match value {
        Yaml::Null => "null",
        Yaml::Bool(_) => "a boolean",
        Yaml::Number(_) => "a number",
        Yaml::String(_) => "a string",
        Yaml::Sequence(_) => "a list",
        Yaml::Mapping(_) => "a mapping",
        Yaml::Tagged(_) => "a tagged value",
    }
}

/// Serialize a dialogue to YAML text
pub fn serialize(dialogue: &Dialogue) -> Result<String, DialogueError> {
    Ok(serde_yaml::to_string(&to_value(dialogue))?)
}

/// Build the YAML document for a dialogue.
///
/// Top-level order: id, title, tags, characters, start, nodes.
pub fn to_value(dialogue: &Dialogue) -> Yaml {
    let mut root = Mapping::new();
    root.insert(key("id"), Yaml::from(dialogue.id.as_str()));

    if !dialogue.title.is_empty() && dialogue.title != dialogue.id {
        root.insert(key("title"), Yaml::from(dialogue.title.as_str()));
    }

    if !dialogue.tags.is_empty() {
        root.insert(key("tags"), string_seq(&dialogue.tags));
    }

    if !dialogue.characters.is_empty() {
        let mut characters = Mapping::new();
        for (char_id, character) in &dialogue.characters {
            characters.insert(Yaml::from(char_id.as_str()), character_value(character));
        }
        root.insert(key("characters"), Yaml::Mapping(characters));
    }

    root.insert(
        key("start"),
        Yaml::from(dialogue.start.as_deref().unwrap_or_default()),
    );

    let mut nodes = Mapping::new();
    for (node_id, node) in &dialogue.nodes {
        nodes.insert(Yaml::from(node_id.as_str()), node_value(node));
    }
    root.insert(key("nodes"), Yaml::Mapping(nodes));

    Yaml::Mapping(root)
}

fn character_value(character: &Character) -> Yaml {
    let mut map = Mapping::new();
    map.insert(key("name"), Yaml::from(character.display_name.as_str()));
    if let Some(portrait) = &character.portrait_path {
        map.insert(key("portrait"), Yaml::from(portrait.as_str()));
    }
    if character.color != DEFAULT_COLOR {
        map.insert(key("color"), Yaml::from(character.color.as_str()));
    }
    if !character.tags.is_empty() {
        map.insert(key("tags"), string_seq(&character.tags));
    }
    Yaml::Mapping(map)
}

/// Node record: variant content, then `next`, then `ui`
fn node_value(node: &Node) -> Yaml {
    let mut map = Mapping::new();

    match &node.kind {
        NodeKind::Say { speaker, text, .. } => {
            let mut say = Mapping::new();
            if let Some(speaker) = speaker {
                say.insert(key("speaker"), Yaml::from(speaker.as_str()));
            }
            if !text.is_empty() {
                say.insert(key("text"), Yaml::from(text.as_str()));
            }
            map.insert(key("say"), Yaml::Mapping(say));
        }
        NodeKind::Choice { options } => {
            let options = options
                .iter()
                .map(|option| {
                    let mut entry = Mapping::new();
                    if !option.text.is_empty() {
                        entry.insert(key("text"), Yaml::from(option.text.as_str()));
                    }
                    if let Some(next) = &option.next {
                        entry.insert(key("next"), Yaml::from(next.as_str()));
                    }
                    if let Some(condition) = &option.condition {
                        entry.insert(key("if"), Yaml::from(condition.as_str()));
                    }
                    Yaml::Mapping(entry)
                })
                .collect();
            map.insert(key("choice"), Yaml::Sequence(options));
        }
        NodeKind::Set { assignments, .. } => {
            map.insert(key("set"), mapping_of(assignments));
        }
        NodeKind::If { condition, then, otherwise } => {
            map.insert(key("if"), Yaml::from(condition.as_str()));
            if let Some(then) = then {
                map.insert(key("then"), Yaml::from(then.as_str()));
            }
            if let Some(otherwise) = otherwise {
                map.insert(key("else"), Yaml::from(otherwise.as_str()));
            }
        }
        NodeKind::Jump { target } => {
            map.insert(key("jump"), Yaml::from(target.as_deref().unwrap_or_default()));
        }
        NodeKind::Signal { name, args, .. } => {
            if args.is_empty() {
                map.insert(key("signal"), Yaml::from(name.as_str()));
            } else {
                let mut signal = Mapping::new();
                signal.insert(key("name"), Yaml::from(name.as_str()));
                signal.insert(key("args"), mapping_of(args));
                map.insert(key("signal"), Yaml::Mapping(signal));
            }
        }
        NodeKind::End { outcome } => {
            let value = match outcome {
                Some(outcome) => Yaml::from(outcome.as_str()),
                None => Yaml::Bool(true),
            };
            map.insert(key("end"), value);
        }
    }

    if let Some(next) = node.kind.next() {
        map.insert(key("next"), Yaml::from(next.as_str()));
    }

    let mut ui = Mapping::new();
    ui.insert(key("x"), Yaml::from(node.ui.x));
    ui.insert(key("y"), Yaml::from(node.ui.y));
    map.insert(key("ui"), Yaml::Mapping(ui));

    Yaml::Mapping(map)
}

fn key(name: &str) -> Yaml {
    Yaml::String(name.to_string())
}

fn string_seq(items: &[String]) -> Yaml {
    Yaml::Sequence(items.iter().map(|item| Yaml::from(item.as_str())).collect())
}

fn mapping_of(values: &ValueMap) -> Yaml {
    Yaml::Mapping(
        values
            .iter()
            .map(|(name, value)| (Yaml::from(name.as_str()), value.clone()))
            .collect(),
    )
}

/// Load a dialogue file into a store that remembers where it came from.
///
/// Returns `Ok(None)` when the file is empty.
pub fn load_file(path: impl AsRef<Path>) -> Result<Option<DialogueStore>, DialogueError> {
    let path = path.as_ref();
    let document = fs::read_to_string(path)?;
    Ok(parse(&document)?.map(|dialogue| DialogueStore::from_dialogue(dialogue).with_source_path(path)))
}

/// Write a dialogue to `path`, or to the path it was loaded from.
///
/// Fails with [`DialogueError::NoDestination`] when neither is available.
/// On success the store is marked unmodified.
pub fn save(store: &mut DialogueStore, path: Option<&Path>) -> Result<PathBuf, DialogueError> {
    let destination = path
        .or_else(|| store.source_path())
        .map(Path::to_path_buf)
        .ok_or(DialogueError::NoDestination)?;

    let document = serialize(store.dialogue())?;
    fs::write(&destination, document)?;
    info!(dialogue_id = %store.dialogue().id, path = %destination.display(), "Saved dialogue");

    store.mark_saved(destination.clone());
    Ok(destination)
}
