//! Reader presentation preferences, persisted through a host key-value
//! store (localStorage in the browser, anything string-keyed elsewhere).

/// Minimal persistence capability the host must provide.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory store for native use and tests.
#[derive(Default)]
pub struct MemoryStore {
    values: std::collections::HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

pub const MIN_FONT_SIZE: i32 = 12;
pub const MAX_FONT_SIZE: i32 = 32;
pub const DEFAULT_FONT_SIZE: i32 = 16;

const FONT_SIZE_KEY: &str = "folio-font-size";
const DARK_MODE_KEY: &str = "folio-dark-mode";

/// Font size and dark-mode preferences over a backing store.
///
/// Stored values are validated on read; anything unparsable or out of
/// range falls back to the default, and writes are clamped so the
/// persisted value is always within bounds.
pub struct Preferences<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Current font size in pixels, always within [12, 32].
    pub fn font_size(&self) -> i32 {
        match self.store.get(FONT_SIZE_KEY).and_then(|v| v.parse().ok()) {
            Some(size) if (MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&size) => size,
            _ => DEFAULT_FONT_SIZE,
        }
    }

    /// Set and persist the font size, clamped to [12, 32]. Returns the
    /// effective value.
    pub fn set_font_size(&mut self, size: i32) -> i32 {
        let clamped = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        self.store.set(FONT_SIZE_KEY, &clamped.to_string());
        clamped
    }

    pub fn dark_mode(&self) -> bool {
        self.store
            .get(DARK_MODE_KEY)
            .map(|v| v == "true")
            .unwrap_or(false)
    }

    pub fn set_dark_mode(&mut self, enabled: bool) {
        self.store.set(DARK_MODE_KEY, if enabled { "true" } else { "false" });
    }

    /// Toggle dark mode and return the new state.
    pub fn toggle_dark_mode(&mut self) -> bool {
        let enabled = !self.dark_mode();
        self.set_dark_mode(enabled);
        enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs() -> Preferences<MemoryStore> {
        Preferences::new(MemoryStore::new())
    }

    #[test]
    fn test_font_size_default() {
        assert_eq!(prefs().font_size(), 16);
    }

    #[test]
    fn test_font_size_clamped_on_write() {
        let mut p = prefs();
        assert_eq!(p.set_font_size(40), 32);
        assert_eq!(p.font_size(), 32);

        assert_eq!(p.set_font_size(5), 12);
        assert_eq!(p.font_size(), 12);

        assert_eq!(p.set_font_size(18), 18);
        assert_eq!(p.font_size(), 18);
    }

    #[test]
    fn test_font_size_invalid_stored_value() {
        let mut store = MemoryStore::new();
        store.set("folio-font-size", "not-a-number");
        assert_eq!(Preferences::new(store).font_size(), 16);

        let mut store = MemoryStore::new();
        store.set("folio-font-size", "64");
        assert_eq!(Preferences::new(store).font_size(), 16);
    }

    #[test]
    fn test_dark_mode_roundtrip() {
        let mut p = prefs();
        assert!(!p.dark_mode());

        p.set_dark_mode(true);
        assert!(p.dark_mode());

        assert!(!p.toggle_dark_mode());
        assert!(!p.dark_mode());
    }
}
