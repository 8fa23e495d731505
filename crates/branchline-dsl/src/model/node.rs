use indexmap::IndexMap;
use std::fmt;

use crate::utils::id::generate_node_id;

/// Identifier of a node, unique within one dialogue
pub type NodeId = String;

/// Identifier of a character in the dialogue's character table
pub type CharacterId = String;

/// A value authored in the source document (assignment values, signal args)
pub type Value = serde_yaml::Value;

/// Ordered name → value mapping; iteration follows authoring order
pub type ValueMap = IndexMap<String, Value>;

/// Optional reference or text; an empty string means unset
fn present(value: Option<&str>) -> Option<String> {
    value.filter(|value| !value.is_empty()).map(str::to_string)
}

/// Editor canvas position. Carried through every round trip, never interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A single option of a choice node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChoiceOption {
    /// Text shown to the player
    pub text: String,

    /// Node the option leads to
    pub next: Option<NodeId>,

    /// Optional runtime condition controlling whether the option is offered
    pub condition: Option<String>,
}

impl ChoiceOption {
    pub fn new(text: impl Into<String>, next: Option<&str>) -> Self {
        Self {
            text: text.into(),
            next: present(next),
            condition: None,
        }
    }

    /// Attach a condition. An empty condition leaves the option unconditional.
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into()).filter(|condition| !condition.is_empty());
        self
    }
}

/// The content of a node. Only linear variants carry a `next` link.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A spoken line
    Say {
        speaker: Option<CharacterId>,
        text: String,
        next: Option<NodeId>,
    },

    /// A multi-way branch picked by the player
    Choice { options: Vec<ChoiceOption> },

    /// Variable assignments
    Set {
        assignments: ValueMap,
        next: Option<NodeId>,
    },

    /// Two-way branch on a runtime condition
    If {
        condition: String,
        then: Option<NodeId>,
        otherwise: Option<NodeId>,
    },

    /// Unconditional redirect
    Jump { target: Option<NodeId> },

    /// End of the dialogue
    End { outcome: Option<String> },

    /// Notification for the host game
    Signal {
        name: String,
        args: ValueMap,
        next: Option<NodeId>,
    },
}

impl Default for NodeKind {
    fn default() -> Self {
        NodeKind::Say {
            speaker: None,
            text: String::new(),
            next: None,
        }
    }
}

impl NodeKind {
    pub fn say(speaker: Option<&str>, text: impl Into<String>, next: Option<&str>) -> Self {
        NodeKind::Say {
            speaker: present(speaker),
            text: text.into(),
            next: present(next),
        }
    }

    pub fn choice(options: Vec<ChoiceOption>) -> Self {
        NodeKind::Choice { options }
    }

    pub fn branch(condition: impl Into<String>, then: Option<&str>, otherwise: Option<&str>) -> Self {
        NodeKind::If {
            condition: condition.into(),
            then: present(then),
            otherwise: present(otherwise),
        }
    }

    pub fn jump(target: &str) -> Self {
        NodeKind::Jump {
            target: present(Some(target)),
        }
    }

    pub fn end(outcome: Option<&str>) -> Self {
        NodeKind::End {
            outcome: present(outcome),
        }
    }

    /// Short lowercase name of the variant, as used for the source key
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Say { .. } => "say",
            NodeKind::Choice { .. } => "choice",
            NodeKind::Set { .. } => "set",
            NodeKind::If { .. } => "if",
            NodeKind::Jump { .. } => "jump",
            NodeKind::End { .. } => "end",
            NodeKind::Signal { .. } => "signal",
        }
    }

    /// The `next` link of linear variants; `None` for branching and terminal ones
    pub fn next(&self) -> Option<&NodeId> {
        match self {
            NodeKind::Say { next, .. }
            | NodeKind::Set { next, .. }
            | NodeKind::Signal { next, .. } => next.as_ref(),
            _ => None,
        }
    }
}

/// Which reference field of a node an edge comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeField {
    Next,
    Then,
    Else,
    Jump,
    /// A choice option, by index
    Option(usize),
}

impl fmt::Display for EdgeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeField::Next => write!(f, "next"),
            EdgeField::Then => write!(f, "then"),
            EdgeField::Else => write!(f, "else"),
            EdgeField::Jump => write!(f, "jump"),
            EdgeField::Option(index) => write!(f, "choice[{}]", index),
        }
    }
}

/// One unit of dialogue flow
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub ui: Position,
}

impl Node {
    /// Create a node with a freshly generated id
    pub fn new(kind: NodeKind) -> Self {
        Self::with_id("", kind)
    }

    /// Create a node with the given id, generating one if it is blank
    pub fn with_id(id: impl Into<String>, kind: NodeKind) -> Self {
        let mut id = id.into();
        if id.trim().is_empty() {
            id = generate_node_id();
        }
        Self {
            id,
            kind,
            ui: Position::default(),
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.ui = Position::new(x, y);
        self
    }

    /// All outgoing references of this node, in field order.
    /// Unset fields are skipped.
    pub fn edges(&self) -> Vec<(EdgeField, &NodeId)> {
        let mut edges = Vec::new();
        match &self.kind {
            NodeKind::Say { next, .. }
            | NodeKind::Set { next, .. }
            | NodeKind::Signal { next, .. } => {
                if let Some(next) = next {
                    edges.push((EdgeField::Next, next));
                }
            }
            NodeKind::Choice { options } => {
                for (index, option) in options.iter().enumerate() {
                    if let Some(next) = &option.next {
                        edges.push((EdgeField::Option(index), next));
                    }
                }
            }
            NodeKind::If { then, otherwise, .. } => {
                if let Some(then) = then {
                    edges.push((EdgeField::Then, then));
                }
                if let Some(otherwise) = otherwise {
                    edges.push((EdgeField::Else, otherwise));
                }
            }
            NodeKind::Jump { target } => {
                if let Some(target) = target {
                    edges.push((EdgeField::Jump, target));
                }
            }
            NodeKind::End { .. } => {}
        }
        edges
    }

    /// Clear every reference field naming `id`. Returns how many were cleared.
    pub fn clear_references_to(&mut self, id: &str) -> usize {
        fn clear(slot: &mut Option<NodeId>, id: &str) -> usize {
            if slot.as_deref() == Some(id) {
                *slot = None;
                1
            } else {
                0
            }
        }

        match &mut self.kind {
            NodeKind::Say { next, .. }
            | NodeKind::Set { next, .. }
            | NodeKind::Signal { next, .. } => clear(next, id),
            NodeKind::Choice { options } => options
                .iter_mut()
                .map(|option| clear(&mut option.next, id))
                .sum(),
            NodeKind::If { then, otherwise, .. } => clear(then, id) + clear(otherwise, id),
            NodeKind::Jump { target } => clear(target, id),
            NodeKind::End { .. } => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_id_is_generated() {
        let node = Node::with_id("  ", NodeKind::end(None));
        assert_eq!(node.id.len(), crate::utils::id::NODE_ID_LEN);

        let named = Node::with_id("intro", NodeKind::end(None));
        assert_eq!(named.id, "intro");
    }

    #[test]
    fn test_edges_follow_field_order() {
        let node = Node::with_id(
            "pick",
            NodeKind::choice(vec![
                ChoiceOption::new("Yes", Some("yes")),
                ChoiceOption::new("Later", None),
                ChoiceOption::new("No", Some("no")),
            ]),
        );

        let edges = node.edges();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0], (EdgeField::Option(0), &"yes".to_string()));
        assert_eq!(edges[1], (EdgeField::Option(2), &"no".to_string()));
        assert_eq!(EdgeField::Option(2).to_string(), "choice[2]");
    }

    #[test]
    fn test_branch_edges() {
        let node = Node::with_id("check", NodeKind::branch("gold > 5", Some("rich"), Some("poor")));
        let fields: Vec<EdgeField> = node.edges().into_iter().map(|(field, _)| field).collect();
        assert_eq!(fields, vec![EdgeField::Then, EdgeField::Else]);
        assert!(node.kind.next().is_none());
    }

    #[test]
    fn test_empty_strings_mean_unset() {
        let option = ChoiceOption::new("Go", Some("")).with_condition("");
        assert_eq!(option.next, None);
        assert_eq!(option.condition, None);

        assert_eq!(NodeKind::end(Some("")), NodeKind::End { outcome: None });
        assert_eq!(NodeKind::jump(""), NodeKind::Jump { target: None });
        assert_eq!(
            NodeKind::say(Some(""), "Hi", Some("")),
            NodeKind::Say { speaker: None, text: "Hi".to_string(), next: None }
        );
        assert!(Node::with_id("b", NodeKind::branch("x", Some(""), None)).edges().is_empty());
    }

    #[test]
    fn test_clear_references() {
        let mut node = Node::with_id(
            "pick",
            NodeKind::choice(vec![
                ChoiceOption::new("A", Some("gone")),
                ChoiceOption::new("B", Some("stay")),
                ChoiceOption::new("C", Some("gone")),
            ]),
        );

        assert_eq!(node.clear_references_to("gone"), 2);
        assert_eq!(node.edges().len(), 1);
        assert_eq!(node.clear_references_to("gone"), 0);

        let mut branch = Node::with_id("b", NodeKind::branch("x", Some("gone"), Some("gone")));
        assert_eq!(branch.clear_references_to("gone"), 2);
        assert!(branch.edges().is_empty());
    }
}
