use crate::model::Dialogue;
use crate::validation::{error_codes, ValidationDiagnostic, Validator};

/// Validates dialogue-level fields: the dialogue id and the start node
pub struct StructureValidator;

impl StructureValidator {
    /// Create a new structure validator
    pub fn new() -> Self {
        StructureValidator
    }
}

impl Validator for StructureValidator {
    fn validate(&self, dialogue: &Dialogue) -> Vec<ValidationDiagnostic> {
        let mut diagnostics = Vec::new();

        if dialogue.id.trim().is_empty() {
            diagnostics.push(ValidationDiagnostic::new(
                error_codes::MISSING_ID,
                "Dialogue missing 'id'",
            ));
        }

        match dialogue.start.as_deref() {
            None => diagnostics.push(ValidationDiagnostic::new(
                error_codes::MISSING_START,
                "Dialogue missing 'start' node",
            )),
            Some(start) if !dialogue.contains_node(start) => {
                diagnostics.push(
                    ValidationDiagnostic::new(
                        error_codes::INVALID_START,
                        format!("Start node '{}' does not exist", start),
                    )
                    .at_node(start),
                );
            }
            Some(_) => {}
        }

        diagnostics
    }
}
