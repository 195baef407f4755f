use serde::{Deserialize, Serialize};

use crate::error::StructeditError;
use crate::syntax::Span;

/// A single contiguous text replacement, `text[from..to] = value`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub from: usize,
    pub to: usize,
    pub value: String,
}

impl Patch {
    /// The canonical "nothing happened" patch.
    pub fn noop() -> Self {
        Self::default()
    }

    pub fn is_noop(&self) -> bool {
        self.from == self.to && self.value.is_empty()
    }

    pub fn replace(span: Span, value: impl Into<String>) -> Self {
        Self {
            from: span.start,
            to: span.end,
            value: value.into(),
        }
    }

    pub fn insert(at: usize, value: impl Into<String>) -> Self {
        Self {
            from: at,
            to: at,
            value: value.into(),
        }
    }

    pub fn delete(span: Span) -> Self {
        Self::replace(span, String::new())
    }

    pub fn span(&self) -> Span {
        Span::new(self.from, self.to)
    }

    pub fn validate(&self, text: &str) -> Result<(), StructeditError> {
        let in_bounds = self.from <= self.to && self.to <= text.len();
        if !in_bounds || !text.is_char_boundary(self.from) || !text.is_char_boundary(self.to) {
            return Err(StructeditError::invalid_span(self.from, self.to, text.len()));
        }
        Ok(())
    }

    pub fn apply(&self, text: &str) -> Result<String, StructeditError> {
        self.validate(text)?;
        let mut patched = String::with_capacity(text.len() + self.value.len());
        patched.push_str(&text[..self.from]);
        patched.push_str(&self.value);
        patched.push_str(&text[self.to..]);
        Ok(patched)
    }
}
