use indexmap::IndexMap;

use super::{Character, CharacterId, Node, NodeId};
use crate::utils::id::generate_dialogue_id;

/// One complete dialogue graph: nodes, character table, and entry point.
///
/// Construction never checks references; a dialogue may be transiently
/// inconsistent while it is being edited. The validator reports problems.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dialogue {
    pub id: String,
    pub title: String,

    /// Entry node
    pub start: Option<NodeId>,

    /// Character table, in authoring order
    pub characters: IndexMap<CharacterId, Character>,

    /// Nodes keyed by id, in authoring order
    pub nodes: IndexMap<NodeId, Node>,

    pub tags: Vec<String>,
}

impl Dialogue {
    /// Create an empty dialogue with a generated id. The title defaults to the id.
    pub fn new() -> Self {
        Self::with_id(generate_dialogue_id())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            ..Default::default()
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.get(id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    pub fn character_ids(&self) -> impl Iterator<Item = &CharacterId> {
        self.characters.keys()
    }

    /// Display name of a speaker, if the speaker is in the character table
    pub fn speaker_name(&self, speaker: &str) -> Option<&str> {
        self.characters
            .get(speaker)
            .map(|character| character.display_name.as_str())
    }
}
