use crate::{
    core::constants::SELF_LOCATION_KEY, layers::marker::Marker,
    rendering::backend::NativeMarkerId, prelude::HashMap,
};

/// Address of a rendered marker: the self-location slot or an ordinary id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarkerKey {
    SelfLocation,
    Ordinary(String),
}

impl MarkerKey {
    pub fn as_str(&self) -> &str {
        match self {
            MarkerKey::SelfLocation => SELF_LOCATION_KEY,
            MarkerKey::Ordinary(id) => id,
        }
    }
}

impl std::fmt::Display for MarkerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker data plus the renderer object it was drawn as.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMarkerEntry {
    pub marker: Marker,
    pub native: NativeMarkerId,
}

/// What the engine currently has on screen.
///
/// The self-location marker lives in its own slot so that no ordinary id can
/// ever address it.
#[derive(Debug, Default)]
pub struct MarkerRegistry {
    entries: HashMap<String, RenderedMarkerEntry>,
    self_marker: Option<RenderedMarkerEntry>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &MarkerKey) -> Option<&RenderedMarkerEntry> {
        match key {
            MarkerKey::SelfLocation => self.self_marker.as_ref(),
            MarkerKey::Ordinary(id) => self.entries.get(id),
        }
    }

    pub fn insert(&mut self, key: MarkerKey, entry: RenderedMarkerEntry) {
        match key {
            MarkerKey::SelfLocation => self.self_marker = Some(entry),
            MarkerKey::Ordinary(id) => {
                self.entries.insert(id, entry);
            }
        }
    }

    pub fn remove(&mut self, key: &MarkerKey) -> Option<RenderedMarkerEntry> {
        match key {
            MarkerKey::SelfLocation => self.self_marker.take(),
            MarkerKey::Ordinary(id) => self.entries.remove(id),
        }
    }

    pub fn self_marker(&self) -> Option<&RenderedMarkerEntry> {
        self.self_marker.as_ref()
    }

    pub fn contains(&self, key: &MarkerKey) -> bool {
        self.get(key).is_some()
    }

    pub fn ordinary_keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn ordinary(&self) -> impl Iterator<Item = (&String, &RenderedMarkerEntry)> {
        self.entries.iter()
    }

    /// Number of ordinary markers, excluding the self-location slot.
    pub fn ordinary_len(&self) -> usize {
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len() + usize::from(self.self_marker.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empties the registry, self slot included, returning what was held.
    pub fn drain(&mut self) -> Vec<RenderedMarkerEntry> {
        let mut drained: Vec<_> = self.entries.drain().map(|(_, entry)| entry).collect();
        drained.extend(self.self_marker.take());
        drained
    }
}
