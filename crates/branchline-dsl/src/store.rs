//! Mutation operations over a single dialogue.
//!
//! All editing goes through [`DialogueStore`], which keeps reference fields
//! consistent when nodes are deleted.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::DialogueError;
use crate::model::{Character, CharacterId, Dialogue, Node, NodeId};
use crate::utils::id::{generate_character_id, generate_node_id};

/// Owns one dialogue and tracks edit state for it
#[derive(Debug, Clone, Default)]
pub struct DialogueStore {
    dialogue: Dialogue,

    /// Where the dialogue was loaded from or last saved to
    source_path: Option<PathBuf>,

    /// Unsaved changes exist
    modified: bool,

    /// Ids of nodes removed during this session; never handed out again
    retired_ids: HashSet<NodeId>,
}

impl DialogueStore {
    /// Start editing a brand-new empty dialogue
    pub fn new() -> Self {
        Self::from_dialogue(Dialogue::new())
    }

    /// Wrap an existing dialogue. The store starts unmodified.
    pub fn from_dialogue(dialogue: Dialogue) -> Self {
        Self {
            dialogue,
            source_path: None,
            modified: false,
            retired_ids: HashSet::new(),
        }
    }

    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    pub fn dialogue(&self) -> &Dialogue {
        &self.dialogue
    }

    pub fn into_dialogue(self) -> Dialogue {
        self.dialogue
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Record a successful save to `path`
    pub fn mark_saved(&mut self, path: impl Into<PathBuf>) {
        self.source_path = Some(path.into());
        self.modified = false;
    }

    /// Generate a node id that is neither in use nor retired
    pub fn generate_node_id(&self) -> NodeId {
        loop {
            let id = generate_node_id();
            if !self.dialogue.nodes.contains_key(&id) && !self.retired_ids.contains(&id) {
                return id;
            }
        }
    }

    /// Insert a node. The first node added to a dialogue without a start
    /// becomes the start node.
    pub fn add_node(&mut self, node: Node) -> Result<(), DialogueError> {
        if self.dialogue.nodes.contains_key(&node.id) {
            return Err(DialogueError::DuplicateId(node.id));
        }

        if self.dialogue.start.is_none() {
            debug!(node_id = %node.id, "Using first node as dialogue start");
            self.dialogue.start = Some(node.id.clone());
        }

        debug!(node_id = %node.id, kind = node.kind.type_name(), "Adding node");
        self.dialogue.nodes.insert(node.id.clone(), node);
        self.modified = true;
        Ok(())
    }

    /// Remove a node and clear every reference to it.
    ///
    /// Every remaining node is swept, so after this returns no reference field
    /// in the dialogue names `id`.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let removed = self.dialogue.nodes.shift_remove(id)?;
        self.modified = true;
        self.retired_ids.insert(removed.id.clone());

        if self.dialogue.start.as_deref() == Some(id) {
            self.dialogue.start = None;
        }

        let cleared: usize = self
            .dialogue
            .nodes
            .values_mut()
            .map(|node| node.clear_references_to(id))
            .sum();

        debug!(node_id = %id, cleared_references = cleared, "Removed node");
        Some(removed)
    }

    /// Point the dialogue at a different entry node. The id is not checked;
    /// an empty id clears the start.
    pub fn set_start(&mut self, id: Option<NodeId>) {
        self.dialogue.start = id.filter(|id| !id.is_empty());
        self.modified = true;
    }

    /// Move a node on the editor canvas. Returns false if the node does not exist.
    pub fn update_position(&mut self, id: &str, x: f64, y: f64) -> bool {
        match self.dialogue.nodes.get_mut(id) {
            Some(node) => {
                node.ui.x = x;
                node.ui.y = y;
                self.modified = true;
                true
            }
            None => false,
        }
    }

    /// Insert or replace a character. A blank display name falls back to the id.
    pub fn add_character(&mut self, id: impl Into<CharacterId>, mut character: Character) {
        let id = id.into();
        if character.display_name.is_empty() {
            character.display_name = id.clone();
        }
        debug!(character_id = %id, "Adding character");
        self.dialogue.characters.insert(id, character);
        self.modified = true;
    }

    /// Add a character under a freshly generated id and return the id
    pub fn create_character(&mut self, display_name: impl Into<String>) -> CharacterId {
        let id = loop {
            let id = generate_character_id();
            if !self.dialogue.characters.contains_key(&id) {
                break id;
            }
        };
        self.add_character(id.clone(), Character::new(display_name));
        id
    }

    /// Remove a character. Say nodes that reference it keep the dangling
    /// speaker; the validator reports them.
    pub fn remove_character(&mut self, id: &str) -> Option<Character> {
        let removed = self.dialogue.characters.shift_remove(id);
        if removed.is_some() {
            debug!(character_id = %id, "Removed character");
            self.modified = true;
        }
        removed
    }
}
