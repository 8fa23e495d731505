//! # Branchline DSL
//!
//! Branchline describes branching dialogue as a graph of nodes authored in
//! YAML. This crate provides the node model, an editing store, a validator,
//! the YAML source codec and the lowering of a dialogue into a flat timeline
//! event stream.
//!
//! ## Features
//!
//! * Tagged node variants: say, choice, set, if, jump, end and signal
//! * Editing operations that keep references consistent when nodes are removed
//! * Validation of start node, references, speakers and reachability
//! * Lenient YAML loading with canonical, stable serialization
//! * Deterministic lowering to timeline events, text and character resources
//!
//! ## Example
//!
//! ```
//! use branchline_dsl::{generate, parse_and_validate, Event};
//!
//! let yaml = r#"
//! id: greeting
//! characters:
//!   guard: Gate Guard
//! start: hello
//! nodes:
//!   hello:
//!     say:
//!       speaker: guard
//!       text: Halt!
//!     next: bye
//!   bye:
//!     end: true
//! "#;
//!
//! let dialogue = parse_and_validate(yaml).unwrap();
//! let events = generate(&dialogue);
//! assert_eq!(events[0], Event::Label { id: "hello".to_string() });
//! ```

mod error;
mod utils;

pub mod codec;
pub mod model;
pub mod project;
pub mod store;
pub mod validation;

pub use codec::source::{load_file, parse, save, serialize};
pub use codec::timeline::{generate, generate_with, voice_lines, Event, GenerateOptions, VoiceLine};
pub use error::DialogueError;
pub use model::{
    Character, CharacterId, ChoiceOption, Dialogue, EdgeField, Node, NodeId, NodeKind, Position,
    Value, ValueMap,
};
pub use project::{LoadFailure, Project};
pub use store::DialogueStore;
pub use utils::color::speaker_color;
pub use validation::{check, validate_dialogue, ValidationDiagnostic};

/// Parse a YAML document and fail on any validation diagnostic.
///
/// An empty document is a parse error here, since there is nothing to
/// validate.
///
/// # Examples
///
/// ```
/// use branchline_dsl::{parse_and_validate, DialogueError};
///
/// let yaml = r#"
/// id: broken
/// start: a
/// nodes:
///   a:
///     say: Hello
///     next: nowhere
/// "#;
///
/// match parse_and_validate(yaml) {
///     Err(DialogueError::Validation(diagnostics)) => {
///         assert_eq!(diagnostics[0].code, "ERR_VALIDATION_DANGLING_REFERENCE");
///     }
///     other => panic!("unexpected result: {:?}", other),
/// }
/// ```
pub fn parse_and_validate(document: &str) -> Result<Dialogue, DialogueError> {
    let dialogue = parse(document)?
        .ok_or_else(|| DialogueError::parse("$", "document is empty"))?;
    check(&dialogue)?;
    Ok(dialogue)
}

/// Returns the version of this crate
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
