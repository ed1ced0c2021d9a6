/// Characters of free text shown before the "more" control.
pub const DESCRIPTION_LIMIT: usize = 300;

/// A free-text metric field, clipped for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Description<'a> {
    Verbatim(&'a str),
    Clipped { preview: &'a str, full: &'a str },
}

impl<'a> Description<'a> {
    pub fn new(text: &'a str) -> Self {
        match text.char_indices().nth(DESCRIPTION_LIMIT) {
            Some((cut, _)) => Description::Clipped {
                preview: &text[..cut],
                full: text,
            },
            None => Description::Verbatim(text),
        }
    }

    pub fn has_more(&self) -> bool {
        matches!(self, Description::Clipped { .. })
    }

    pub fn full(&self) -> &'a str {
        match *self {
            Description::Verbatim(text) => text,
            Description::Clipped { full, .. } => full,
        }
    }

    /// The collapsed form: clipped text ends in `...` and a `more` marker.
    pub fn collapsed(&self) -> String {
        match self {
            Description::Verbatim(text) => text.to_string(),
            Description::Clipped { preview, .. } => format!("{}... [more]", preview),
        }
    }
}
