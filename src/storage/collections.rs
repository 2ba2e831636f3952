use indexmap::{IndexMap, IndexSet};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{KeyValueStore, StoreError};

pub const FAVORITES_KEY: &str = "favorites";
pub const NOTES_KEY: &str = "notes";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("encoding {key}: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("writing {key}: {source}")]
    Write {
        key: &'static str,
        #[source]
        source: StoreError,
    },
}

/// Favorite club names in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites(IndexSet<String>);

impl Favorites {
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Flips membership; returns whether `name` is a favorite afterwards.
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.0.shift_remove(name) {
            false
        } else {
            self.0.insert(name.to_string());
            true
        }
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.0.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Favorites {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Note text keyed by club name. A present key may hold an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Notes(IndexMap<String, String>);

impl Notes {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Note text worth showing: empty notes read as absent.
    pub fn visible(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|text| !text.is_empty())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn set(&mut self, name: &str, text: String) {
        self.0.insert(name.to_string(), text);
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.0.shift_remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Notes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, text)| (name.into(), text.into()))
                .collect(),
        )
    }
}

pub fn load_favorites(store: &dyn KeyValueStore) -> Favorites {
    load_or_default(store, FAVORITES_KEY)
}

pub fn load_notes(store: &dyn KeyValueStore) -> Notes {
    load_or_default(store, NOTES_KEY)
}

pub fn save_favorites(
    store: &dyn KeyValueStore,
    favorites: &Favorites,
) -> Result<(), PersistError> {
    save(store, FAVORITES_KEY, favorites)
}

pub fn save_notes(store: &dyn KeyValueStore, notes: &Notes) -> Result<(), PersistError> {
    save(store, NOTES_KEY, notes)
}

fn load_or_default<T>(store: &dyn KeyValueStore, key: &'static str) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(err) => {
            tracing::warn!(?err, key, "reading persisted collection failed, starting empty");
            return T::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(%err, key, "persisted collection is malformed, starting empty");
            T::default()
        }
    }
}

fn save<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &'static str,
    value: &T,
) -> Result<(), PersistError> {
    let json =
        serde_json::to_string(value).map_err(|source| PersistError::Encode { key, source })?;
    store
        .set(key, &json)
        .map_err(|source| PersistError::Write { key, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn missing_keys_load_as_empty() {
        let store = MemoryStore::new();
        assert!(load_favorites(&store).is_empty());
        assert!(load_notes(&store).is_empty());
    }

    #[test]
    fn malformed_values_fall_back_to_empty() {
        let store = MemoryStore::new()
            .with_value(FAVORITES_KEY, "{not json")
            .with_value(NOTES_KEY, r#"["wrong","shape"]"#);
        assert!(load_favorites(&store).is_empty());
        assert!(load_notes(&store).is_empty());
        // the broken value stays until the next write replaces it
        assert_eq!(store.raw(FAVORITES_KEY).as_deref(), Some("{not json"));
    }

    #[test]
    fn favorites_keep_insertion_order_through_storage() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let mut favorites: Favorites = ["Hiking", "Chess"].into_iter().collect();
        favorites.toggle("Book Circle");
        save_favorites(&store, &favorites)?;

        insta::assert_snapshot!(
            store.raw(FAVORITES_KEY).unwrap_or_default(),
            @r#"["Hiking","Chess","Book Circle"]"#
        );
        let loaded = load_favorites(&store);
        assert_eq!(
            loaded.iter().collect::<Vec<_>>(),
            vec!["Hiking", "Chess", "Book Circle"]
        );
        Ok(())
    }

    #[test]
    fn toggle_and_remove_preserve_remaining_order() {
        let mut favorites: Favorites = ["A", "B", "C"].into_iter().collect();
        assert!(!favorites.toggle("B"));
        assert!(favorites.toggle("B"));
        assert_eq!(favorites.iter().collect::<Vec<_>>(), vec!["A", "C", "B"]);
        assert!(favorites.remove("A"));
        assert!(!favorites.remove("A"));
        assert_eq!(favorites.iter().collect::<Vec<_>>(), vec!["C", "B"]);
    }

    #[test]
    fn empty_notes_keep_their_key_but_are_not_visible() {
        let mut notes = Notes::default();
        notes.set("Chess", String::new());
        assert!(notes.contains("Chess"));
        assert_eq!(notes.get("Chess"), Some(""));
        assert_eq!(notes.visible("Chess"), None);

        notes.set("Chess", "Tuesdays".into());
        assert_eq!(notes.visible("Chess"), Some("Tuesdays"));
        assert!(notes.remove("Chess"));
        assert!(!notes.contains("Chess"));
    }

    #[test]
    fn failed_writes_surface_as_persist_errors() {
        let store = MemoryStore::new();
        store.fail_writes(true);
        let err = save_notes(&store, &Notes::default()).expect_err("write should fail");
        assert!(matches!(err, PersistError::Write { key: NOTES_KEY, .. }));
        assert!(err.to_string().contains("notes"));
    }
}
