use std::collections::HashMap;

/// Output filename to location map shared by every conversion of a run
///
/// Entries are write-once. [`ArticleMap::alias`] is the only way to point a
/// second key at an existing location.
#[derive(Debug, Clone, Default)]
pub struct ArticleMap {
    entries: HashMap<String, String>,
}

impl ArticleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `filename` at `location`
    ///
    /// # Returns
    ///
    /// `true` if the entry was created, `false` if `filename` was already
    /// mapped (the existing location is kept).
    pub fn insert(&mut self, filename: &str, location: &str) -> bool {
        if self.entries.contains_key(filename) {
            return false;
        }
        self.entries
            .insert(filename.to_string(), location.to_string());
        true
    }

    /// Points `key` at the location of `target`
    ///
    /// Returns `false` and leaves the map untouched if `target` is unknown.
    pub fn alias(&mut self, key: &str, target: &str) -> bool {
        match self.entries.get(target).cloned() {
            Some(location) => {
                self.entries.insert(key.to_string(), location);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, filename: &str) -> Option<&str> {
        self.entries.get(filename).map(String::as_str)
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.entries.contains_key(filename)
    }

    /// Removes `filename` and any alias of its location
    pub fn withdraw(&mut self, filename: &str) -> Option<String> {
        let location = self.entries.remove(filename)?;
        self.entries.retain(|_, l| *l != location);
        Some(location)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
