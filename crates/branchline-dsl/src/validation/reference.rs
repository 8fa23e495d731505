use crate::model::{Dialogue, NodeKind};
use crate::validation::{error_codes, ValidationDiagnostic, Validator};

/// Validates that every outgoing reference names an existing node:
/// - `next` on say / set / signal nodes
/// - every choice option's `next`
/// - `then` / `else` on if nodes
/// - jump targets
pub struct ReferenceValidator;

impl ReferenceValidator {
    /// Create a new reference validator
    pub fn new() -> Self {
        ReferenceValidator
    }
}

impl Validator for ReferenceValidator {
    fn validate(&self, dialogue: &Dialogue) -> Vec<ValidationDiagnostic> {
        let mut diagnostics = Vec::new();

        for (node_id, node) in &dialogue.nodes {
            for (field, target) in node.edges() {
                if dialogue.contains_node(target) {
                    continue;
                }
                diagnostics.push(
                    ValidationDiagnostic::new(
                        error_codes::DANGLING_REFERENCE,
                        format!(
                            "Node '{}': '{}' references unknown node '{}'",
                            node_id, field, target
                        ),
                    )
                    .at_node(node_id)
                    .at_field(field),
                );
            }
        }

        diagnostics
    }
}

/// Validates that say nodes only name speakers from the character table
pub struct SpeakerValidator;

impl SpeakerValidator {
    /// Create a new speaker validator
    pub fn new() -> Self {
        SpeakerValidator
    }
}

impl Validator for SpeakerValidator {
    fn validate(&self, dialogue: &Dialogue) -> Vec<ValidationDiagnostic> {
        dialogue
            .nodes
            .iter()
            .filter_map(|(node_id, node)| match &node.kind {
                NodeKind::Say { speaker: Some(speaker), .. }
                    if !speaker.is_empty() && !dialogue.characters.contains_key(speaker) =>
                {
                    Some(
                        ValidationDiagnostic::new(
                            error_codes::UNKNOWN_SPEAKER,
                            format!("Node '{}': speaker '{}' not in characters", node_id, speaker),
                        )
                        .at_node(node_id),
                    )
                }
                _ => None,
            })
            .collect()
    }
}
