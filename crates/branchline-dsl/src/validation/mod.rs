use std::fmt;
use crate::error::DialogueError;
use crate::model::{Dialogue, EdgeField, NodeId};

mod reachability;
mod reference;
mod structure;

pub use reachability::reachable_nodes;

/// A single finding of the validator. Diagnostics are advisory: they never
/// abort a pass and never block generation on their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    /// Diagnostic code (one of [`error_codes`])
    pub code: &'static str,

    /// Human-readable message
    pub message: String,

    /// Node the finding is about, if any
    pub node: Option<NodeId>,

    /// Reference field on that node (e.g. "next", "choice[1]")
    pub field: Option<String>,
}

impl ValidationDiagnostic {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            node: None,
            field: None,
        }
    }

    pub fn at_node(mut self, node: &str) -> Self {
        self.node = Some(node.to_string());
        self
    }

    pub fn at_field(mut self, field: EdgeField) -> Self {
        self.field = Some(field.to_string());
        self
    }
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.node, &self.field) {
            (Some(node), Some(field)) => write!(f, "{}: {} (at {}.{})", self.code, self.message, node, field),
            (Some(node), None) => write!(f, "{}: {} (at {})", self.code, self.message, node),
            _ => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

/// Diagnostic codes
pub mod error_codes {
    /// Dialogue has no id
    pub const MISSING_ID: &str = "ERR_VALIDATION_MISSING_ID";

    /// Dialogue has no start node
    pub const MISSING_START: &str = "ERR_VALIDATION_MISSING_START";

    /// Start names a node that does not exist
    pub const INVALID_START: &str = "ERR_VALIDATION_INVALID_START";

    /// A reference field names a node that does not exist
    pub const DANGLING_REFERENCE: &str = "ERR_VALIDATION_DANGLING_REFERENCE";

    /// A say node's speaker is not in the character table
    pub const UNKNOWN_SPEAKER: &str = "ERR_VALIDATION_UNKNOWN_SPEAKER";

    /// A node cannot be reached from the start node
    pub const UNREACHABLE_NODE: &str = "ERR_VALIDATION_UNREACHABLE_NODE";
}

/// A trait for validators that check one aspect of a dialogue
pub trait Validator {
    /// Validate the dialogue and return the diagnostics found (if any)
    fn validate(&self, dialogue: &Dialogue) -> Vec<ValidationDiagnostic>;
}

/// Run every validator over the dialogue and collect all findings.
///
/// Order is fixed: dialogue id, start node, references, speakers,
/// reachability. An empty list means the dialogue is valid.
pub fn validate_dialogue(dialogue: &Dialogue) -> Vec<ValidationDiagnostic> {
    let validators: Vec<Box<dyn Validator>> = vec![
        Box::new(structure::StructureValidator::new()),
        Box::new(reference::ReferenceValidator::new()),
        Box::new(reference::SpeakerValidator::new()),
        Box::new(reachability::ReachabilityValidator::new()),
    ];

    let mut diagnostics = Vec::new();
    for validator in validators {
        diagnostics.extend(validator.validate(dialogue));
    }

    tracing::debug!(
        dialogue_id = %dialogue.id,
        diagnostics = diagnostics.len(),
        "Validated dialogue"
    );
    diagnostics
}

/// Validate and fail on any diagnostic. For build pipelines that must not
/// ship a dialogue with problems.
pub fn check(dialogue: &Dialogue) -> Result<(), DialogueError> {
    let diagnostics = validate_dialogue(dialogue);
    if !diagnostics.is_empty() {
        return Err(DialogueError::Validation(diagnostics));
    }
    Ok(())
}
