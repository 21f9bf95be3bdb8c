//! Preference and last-result persistence
//!
//! Three keys are kept: the display name, the theme and a JSON snapshot of
//! the last completed run. Missing or unreadable values read as defaults.

mod file;

pub use file::FileStore;

use crate::{
    error::Result,
    models::Snapshot,
    types::Theme,
};
use std::collections::HashMap;

pub const USER_KEY: &str = "glc_user";
pub const THEME_KEY: &str = "glc_theme";
pub const LAST_RESULT_KEY: &str = "glc_last";

/// String key-value storage
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Volatile store for tests and `--no-save` runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Typed access to the stored preferences
pub struct Preferences<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn display_name(&self) -> Result<Option<String>> {
        Ok(self.store.get(USER_KEY)?.filter(|name| !name.is_empty()))
    }

    /// Store a display name. Blank input is ignored and returns `false`.
    pub fn sign_in(&mut self, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }

        self.store.set(USER_KEY, name)?;
        Ok(true)
    }

    pub fn sign_out(&mut self) -> Result<()> {
        self.store.remove(USER_KEY)
    }

    pub fn theme(&self) -> Result<Theme> {
        Ok(Theme::from_stored(self.store.get(THEME_KEY)?.as_deref()))
    }

    /// Flip the theme and persist it
    pub fn toggle_theme(&mut self) -> Result<Theme> {
        let theme = self.theme()?.toggled();
        self.store.set(THEME_KEY, theme.as_str())?;
        Ok(theme)
    }

    /// Last stored snapshot; an unparsable record reads as none
    pub fn last_snapshot(&self) -> Result<Option<Snapshot>> {
        Ok(self.store
            .get(LAST_RESULT_KEY)?
            .and_then(|raw| serde_json::from_str(&raw).ok()))
    }

    pub fn save_snapshot(&mut self, snapshot: &Snapshot) -> Result<()> {
        let raw = serde_json::to_string(snapshot)?;
        self.store.set(LAST_RESULT_KEY, &raw)
    }

    /// Text for the user line
    pub fn user_line(&self) -> Result<String> {
        Ok(match self.display_name()? {
            Some(name) => format!("Signed in as {}", name),
            None => "Not signed in".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        Snapshot { time: 1_700_000_000_000, upload: 6.47, stability: Some(0), ping: 93, jitter: 250 }
    }

    #[test]
    fn test_defaults_when_empty() {
        let prefs = Preferences::new(MemoryStore::new());
        assert_eq!(prefs.display_name().unwrap(), None);
        assert_eq!(prefs.theme().unwrap(), Theme::Dark);
        assert_eq!(prefs.last_snapshot().unwrap(), None);
        assert_eq!(prefs.user_line().unwrap(), "Not signed in");
    }

    #[test]
    fn test_sign_in_and_out() {
        let mut prefs = Preferences::new(MemoryStore::new());
        assert!(prefs.sign_in("Ada").unwrap());
        assert_eq!(prefs.user_line().unwrap(), "Signed in as Ada");

        prefs.sign_out().unwrap();
        assert_eq!(prefs.user_line().unwrap(), "Not signed in");
    }

    #[test]
    fn test_blank_sign_in_is_ignored() {
        let mut prefs = Preferences::new(MemoryStore::new());
        prefs.sign_in("Ada").unwrap();

        assert!(!prefs.sign_in("").unwrap());
        assert!(!prefs.sign_in("   ").unwrap());
        assert_eq!(prefs.display_name().unwrap().as_deref(), Some("Ada"));
    }

    #[test]
    fn test_toggle_theme_keeps_name() {
        let mut prefs = Preferences::new(MemoryStore::new());
        prefs.sign_in("Ada").unwrap();

        assert_eq!(prefs.toggle_theme().unwrap(), Theme::Light);
        assert_eq!(prefs.store().get(THEME_KEY).unwrap().as_deref(), Some("light"));
        assert_eq!(prefs.display_name().unwrap().as_deref(), Some("Ada"));

        assert_eq!(prefs.toggle_theme().unwrap(), Theme::Dark);
        assert_eq!(prefs.store().get(THEME_KEY).unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_sign_out_keeps_theme() {
        let mut prefs = Preferences::new(MemoryStore::new());
        prefs.toggle_theme().unwrap();
        prefs.sign_in("Ada").unwrap();
        prefs.sign_out().unwrap();
        assert_eq!(prefs.theme().unwrap(), Theme::Light);
    }

    #[test]
    fn test_unknown_theme_value_is_dark() {
        let mut store = MemoryStore::new();
        store.set(THEME_KEY, "sepia").unwrap();
        assert_eq!(Preferences::new(store).theme().unwrap(), Theme::Dark);
    }

    #[test]
    fn test_snapshot_overwrite() {
        let mut prefs = Preferences::new(MemoryStore::new());
        prefs.save_snapshot(&snapshot()).unwrap();

        let mut newer = snapshot();
        newer.time += 60_000;
        newer.upload = 7.1;
        prefs.save_snapshot(&newer).unwrap();

        assert_eq!(prefs.last_snapshot().unwrap(), Some(newer));
        assert_eq!(prefs.store().len(), 1);
    }

    #[test]
    fn test_snapshot_field_names() {
        let mut prefs = Preferences::new(MemoryStore::new());
        prefs.save_snapshot(&snapshot()).unwrap();

        let raw = prefs.store().get(LAST_RESULT_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        for key in ["time", "upload", "stability", "ping", "jitter"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_unparsable_snapshot_reads_as_none() {
        let mut store = MemoryStore::new();
        store.set(LAST_RESULT_KEY, "{not json").unwrap();
        assert_eq!(Preferences::new(store).last_snapshot().unwrap(), None);
    }

    #[test]
    fn test_boxed_store() {
        let store: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
        let mut prefs = Preferences::new(store);
        prefs.sign_in("Grace").unwrap();
        assert_eq!(prefs.user_line().unwrap(), "Signed in as Grace");
    }
}
