// Copyright (c) James Kassemi, SC, US. All rights reserved.
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Per-window results in configuration order.
///
/// Lookups by id return the first matching window; a literal configured twice
/// appears twice when iterating.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> WindowMap<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, window: impl Into<String>, value: T) {
        self.entries.push((window.into(), value));
    }

    pub fn get(&self, window: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(id, _)| id == window)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(id, value)| (id.as_str(), value))
    }

    pub fn windows(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn map<U, F>(self, mut f: F) -> WindowMap<U>
    where
        F: FnMut(T) -> U,
    {
        self.entries
            .into_iter()
            .map(|(id, value)| (id, f(value)))
            .collect()
    }

    pub fn into_entries(self) -> Vec<(String, T)> {
        self.entries
    }
}

impl<T> Default for WindowMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(String, T)> for WindowMap<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for WindowMap<T> {
    type Item = (String, T);
    type IntoIter = std::vec::IntoIter<(String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<T: Serialize> Serialize for WindowMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, value) in &self.entries {
            map.serialize_entry(id, value)?;
        }
        map.end()
    }
}
