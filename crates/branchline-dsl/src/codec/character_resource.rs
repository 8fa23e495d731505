//! Dialogic character resources (`.dch`), one per entry of the character table.

use indexmap::IndexMap;

use crate::model::{Character, CharacterId, Dialogue};
use crate::utils::color::parse_hex_color;

/// Resource script every character resource points at
pub const CHARACTER_SCRIPT: &str = "res://addons/dialogic/Resources/character.gd";

/// Render the resource text for one character.
///
/// Strings are JSON-quoted, which is a valid Godot string literal.
pub fn render(id: &str, character: &Character) -> String {
    let [r, g, b] = parse_hex_color(character.display_color(id)).unwrap_or([1.0, 1.0, 1.0]);

    let portraits = match &character.portrait_path {
        Some(path) => format!("{{\"default\": {{\"scene\": \"\", \"image\": {}}}}}", quote(path)),
        None => "{}".to_string(),
    };
    let default_portrait = if character.portrait_path.is_some() { "default" } else { "" };

    [
        "{".to_string(),
        format!("\"@path\": {},", quote(CHARACTER_SCRIPT)),
        "\"@subpath\": NodePath(\"\"),".to_string(),
        format!("\"display_name\": {},", quote(&character.display_name)),
        "\"nicknames\": [],".to_string(),
        format!("\"color\": Color({}, {}, {}, 1),", r, g, b),
        "\"description\": \"\",".to_string(),
        "\"scale\": 1.0,".to_string(),
        "\"offset\": Vector2(0, 0),".to_string(),
        "\"mirror\": false,".to_string(),
        format!("\"default_portrait\": {},", quote(default_portrait)),
        format!("\"portraits\": {},", portraits),
        "\"custom_info\": {}".to_string(),
        "}".to_string(),
    ]
    .join("\n")
}

/// Render every character of a dialogue, keyed by character id
pub fn render_all(dialogue: &Dialogue) -> IndexMap<CharacterId, String> {
    dialogue
        .characters
        .iter()
        .map(|(id, character)| (id.clone(), render(id, character)))
        .collect()
}

fn quote(text: &str) -> String {
    serde_json::Value::from(text).to_string()
}
