//! Per-call traversal state

use crate::types::EntityKey;
use std::collections::HashSet;

/// Entities already entered during one resolver call
///
/// Owned by the top-level call and shared by every branch of the walk.
/// Entries are never removed, so sibling branches meeting at a common
/// ancestor visit it only once.
#[derive(Debug, Clone, Default)]
pub(crate) struct VisitedSet {
    keys: HashSet<EntityKey>,
}

impl VisitedSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record a visit; false if the entity was already visited
    pub(crate) fn insert(&mut self, key: EntityKey) -> bool {
        self.keys.insert(key)
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, key: &EntityKey) -> bool {
        self.keys.contains(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }
}

/// Entities from the queried entity down to the one being visited
#[derive(Debug, Clone, Default)]
pub(crate) struct Path {
    keys: Vec<EntityKey>,
}

impl Path {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, key: EntityKey) {
        self.keys.push(key);
    }

    pub(crate) fn pop(&mut self) {
        self.keys.pop();
    }

    pub(crate) fn snapshot(&self) -> Vec<EntityKey> {
        self.keys.clone()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }
}
