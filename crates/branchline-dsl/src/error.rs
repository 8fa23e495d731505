use thiserror::Error;
use crate::model::NodeId;
use crate::validation::ValidationDiagnostic;
use std::fmt;

/// All possible errors that can occur while loading, editing, or saving dialogues
#[derive(Error, Debug)]
pub enum DialogueError {
    /// Errors that occur during YAML parsing or emission
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Errors that occur while encoding timeline output
    #[error("JSON processing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem errors while reading or writing documents
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is valid YAML but not a valid dialogue
    #[error("Malformed dialogue document at '{path}': {message}")]
    Parse {
        /// Location inside the document (e.g. "nodes.intro.choice[1]")
        path: String,
        /// What was wrong there
        message: String,
    },

    /// A node with this id already exists in the dialogue
    #[error("Duplicate node id: '{0}'")]
    DuplicateId(NodeId),

    /// Save was requested without a path and the dialogue was never loaded from one
    #[error("No destination path specified for dialogue")]
    NoDestination,

    /// Validation produced diagnostics where a clean dialogue was required
    #[error("{}", DiagnosticsFormat(.0))]
    Validation(Vec<ValidationDiagnostic>),
}

// Helper struct to format multiple diagnostics
struct DiagnosticsFormat<'a>(&'a [ValidationDiagnostic]);

impl fmt::Display for DiagnosticsFormat<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dialogue failed validation ({} issues):", self.0.len())?;
        for (i, diagnostic) in self.0.iter().enumerate() {
            write!(f, "\n  {}. {}", i + 1, diagnostic)?;
        }
        Ok(())
    }
}

impl DialogueError {
    pub(crate) fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        DialogueError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            DialogueError::Yaml(_) => "ERR_DIALOGUE_YAML",
            DialogueError::Json(_) => "ERR_DIALOGUE_JSON",
            DialogueError::Io(_) => "ERR_DIALOGUE_IO",
            DialogueError::Parse { .. } => "ERR_DIALOGUE_PARSE",
            DialogueError::DuplicateId(_) => "ERR_DIALOGUE_DUPLICATE_ID",
            DialogueError::NoDestination => "ERR_DIALOGUE_NO_DESTINATION",
            DialogueError::Validation(_) => "ERR_DIALOGUE_VALIDATION",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::error_codes;

    #[test]
    fn test_validation_error_lists_every_diagnostic() {
        let err = DialogueError::Validation(vec![
            ValidationDiagnostic::new(error_codes::MISSING_ID, "Dialogue missing 'id'"),
            ValidationDiagnostic::new(error_codes::MISSING_START, "Dialogue missing 'start' node"),
        ]);

        let text = err.to_string();
        assert!(text.contains("2 issues"));
        assert!(text.contains("1. ERR_VALIDATION_MISSING_ID"));
        assert!(text.contains("2. ERR_VALIDATION_MISSING_START"));
        assert_eq!(err.error_code(), "ERR_DIALOGUE_VALIDATION");
    }

    #[test]
    fn test_parse_error_display() {
        let err = DialogueError::parse("nodes.a.choice", "expected a sequence");
        assert_eq!(
            err.to_string(),
            "Malformed dialogue document at 'nodes.a.choice': expected a sequence"
        );
    }
}
