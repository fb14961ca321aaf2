//! Mapped Diagnostic Context: ordered key/value metadata rendered as a
//! prefix on every log line.

/// Insertion-ordered key/value mapping with a cached string render.
///
/// Overwriting an existing key keeps its original position; new keys are
/// appended. The render is recomputed lazily and invalidated by every
/// mutation, so a non-empty cache always matches the current mapping.
#[derive(Debug, Default)]
pub struct Mdc {
    entries: Vec<(String, String)>,
    rendered: Option<String>,
}

impl Mdc {
    pub fn new() -> Self {
        Mdc::default()
    }

    /// Inserts or overwrites a key, preserving its position if it already
    /// exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.rendered = None;
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn delete(&mut self, key: &str) {
        self.rendered = None;
        self.entries.retain(|(existing, _)| existing.as_str() != key);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.as_str() == key)
            .map(|(_, value)| value.as_str())
    }

    /// The cached or freshly computed render: `key=value ` per entry in
    /// insertion order, every entry followed by one trailing space. An empty
    /// mapping renders as the empty string.
    pub fn format_string(&mut self) -> &str {
        self.rendered.get_or_insert_with(|| {
            let mut rendered = String::new();
            for (key, value) in &self.entries {
                rendered.push_str(key);
                rendered.push('=');
                rendered.push_str(value);
                rendered.push(' ');
            }
            rendered
        })
    }
}
