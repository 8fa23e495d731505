use crate::utils::color::{speaker_color, DEFAULT_COLOR};

/// A character that can speak in a dialogue
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    /// Name shown in the runtime
    pub display_name: String,

    /// Resource path of the default portrait
    pub portrait_path: Option<String>,

    /// "#rrggbb" colour
    pub color: String,

    pub tags: Vec<String>,
}

impl Character {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            portrait_path: None,
            color: DEFAULT_COLOR.to_string(),
            tags: Vec::new(),
        }
    }

    pub fn with_portrait(mut self, path: impl Into<String>) -> Self {
        self.portrait_path = Some(path.into()).filter(|path| !path.is_empty());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Colour to use when rendering this character. Characters that kept the
    /// default white get a stable palette colour derived from their id.
    pub fn display_color<'a>(&'a self, id: &str) -> &'a str {
        if self.color.is_empty() || self.color.eq_ignore_ascii_case(DEFAULT_COLOR) {
            speaker_color(id)
        } else {
            &self.color
        }
    }
}
