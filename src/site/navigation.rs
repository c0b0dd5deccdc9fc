//! Breadcrumb-keyed navigation hierarchy
//!
//! Every converted document is filed under its breadcrumb trail. A node is a
//! page (it has a location and no children), a group (children, no
//! location), or a group with a landing page (both).
//!
//! Entries are never removed. Locations whose conversion failed are marked
//! instead, and lookups and the manifest skip them.

use indexmap::IndexMap;
use std::collections::HashSet;

/// Whether a document is an ordinary page or the landing page of its group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Page,
    Index,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavNode {
    /// The page itself, or the landing page when the node has children
    pub location: Option<String>,
    pub children: IndexMap<String, NavNode>,
}

impl NavNode {
    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Conversion status of a group's landing page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing<'a> {
    /// The group has no landing page yet
    Missing,
    /// Filed but not written yet
    Pending(&'a str),
    Written(&'a str),
    Failed,
}

/// Navigation tree for one run, in insertion order
#[derive(Debug, Clone, Default)]
pub struct NavigationTree {
    root: NavNode,
    written: HashSet<String>,
    failed: HashSet<String>,
}

impl NavigationTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> &NavNode {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Files `location` under `breadcrumbs`, creating intermediate groups
    ///
    /// A page whose leaf key already holds a different page is filed under
    /// `"<key> (2)"`, `"<key> (3)"`, and so on. A landing page only sets the
    /// group's location if it has none yet.
    ///
    /// # Returns
    ///
    /// The key the entry ended up under, or `None` for an empty trail.
    pub fn insert(
        &mut self,
        breadcrumbs: &[String],
        location: &str,
        kind: EntryKind,
    ) -> Option<String> {
        let (leaf, parents) = breadcrumbs.split_last()?;

        let mut node = &mut self.root;
        for crumb in parents {
            node = node.children.entry(crumb.clone()).or_default();
        }

        if kind == EntryKind::Index {
            let group = node.children.entry(leaf.clone()).or_default();
            if group.location.is_none() {
                group.location = Some(location.to_string());
            }
            return Some(leaf.clone());
        }

        let mut key = leaf.clone();
        let mut n = 1;
        loop {
            match node.children.get_mut(&key) {
                None => {
                    node.children.insert(
                        key.clone(),
                        NavNode {
                            location: Some(location.to_string()),
                            children: IndexMap::new(),
                        },
                    );
                    return Some(key);
                }
                Some(existing) => match existing.location.as_deref() {
                    None => {
                        existing.location = Some(location.to_string());
                        return Some(key);
                    }
                    Some(current) if current == location => return Some(key),
                    Some(_) => {
                        n += 1;
                        key = format!("{} ({})", leaf, n);
                    }
                },
            }
        }
    }

    /// Records that the output at `location` exists
    pub fn mark_written(&mut self, location: &str) {
        if !self.failed.contains(location) {
            self.written.insert(location.to_string());
        }
    }

    /// Records that `location` will never be written
    pub fn mark_failed(&mut self, location: &str) {
        self.written.remove(location);
        self.failed.insert(location.to_string());
    }

    pub fn is_failed(&self, location: &str) -> bool {
        self.failed.contains(location)
    }

    /// Location of the landing page for the group at `breadcrumbs`
    ///
    /// A landing page that failed to convert is reported as absent.
    pub fn landing(&self, breadcrumbs: &[String]) -> Option<&str> {
        self.filed_landing(breadcrumbs)
            .filter(|location| !self.is_failed(location))
    }

    /// Landing page of the group at `breadcrumbs` and its conversion status
    pub fn landing_state(&self, breadcrumbs: &[String]) -> Landing<'_> {
        match self.filed_landing(breadcrumbs) {
            None => Landing::Missing,
            Some(location) if self.failed.contains(location) => Landing::Failed,
            Some(location) if self.written.contains(location) => Landing::Written(location),
            Some(location) => Landing::Pending(location),
        }
    }

    fn filed_landing(&self, breadcrumbs: &[String]) -> Option<&str> {
        let mut node = &self.root;
        for crumb in breadcrumbs {
            node = node.children.get(crumb)?;
        }
        node.location.as_deref()
    }
}
