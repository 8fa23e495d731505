//! Conversions between the dialogue graph and its persisted forms.
//!
//! * [`source`]: the human-authored YAML format (both directions)
//! * [`timeline`]: lowering into runtime events
//! * [`dtl`]: text rendering of timeline events
//! * [`character_resource`]: character resources for the runtime

pub mod character_resource;
pub mod dtl;
pub mod source;
pub mod timeline;
