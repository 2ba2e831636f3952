pub mod debounce;

pub use debounce::Debouncer;

/// Normalised form of a raw query: trimmed and lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameQuery {
    needle: String,
}

impl NameQuery {
    pub fn parse(input: &str) -> Self {
        Self {
            needle: input.trim().to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.needle
    }

    /// Case-insensitive substring match; the empty query matches every name.
    pub fn matches(&self, name: &str) -> bool {
        self.needle.is_empty() || name.to_lowercase().contains(&self.needle)
    }
}
