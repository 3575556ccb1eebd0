//! Snapshot of a resource set.

use crate::resource::Resource;
use std::collections::BTreeMap;

/// A full snapshot of the resources in a repository, keyed by URI.
///
/// Iteration is always in ascending URI order, independent of the order
/// in which resources were added. Encoders rely on this for deterministic
/// output.
///
/// Two inventories are equal when they hold the same URIs and every pair
/// of resources agrees on all fields (see [`Resource::same_fields`]).
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    resources: BTreeMap<String, Resource>,
}

impl Inventory {
    /// Creates an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource, replacing any resource with the same URI.
    ///
    /// Returns the replaced resource, if any.
    pub fn add(&mut self, resource: Resource) -> Option<Resource> {
        self.resources.insert(resource.uri().to_string(), resource)
    }

    /// Removes the resource with the given URI.
    pub fn remove(&mut self, uri: &str) -> Option<Resource> {
        self.resources.remove(uri)
    }

    /// Returns the resource with the given URI.
    pub fn get(&self, uri: &str) -> Option<&Resource> {
        self.resources.get(uri)
    }

    /// Returns true if a resource with the given URI exists.
    pub fn contains(&self, uri: &str) -> bool {
        self.resources.contains_key(uri)
    }

    /// Returns the number of resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns true if the inventory has no resources.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Iterates resources in ascending URI order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Resource> + Clone + '_ {
        self.resources.values()
    }

    /// Iterates URIs in ascending order.
    pub fn uris(&self) -> impl Iterator<Item = &str> + '_ {
        self.resources.keys().map(String::as_str)
    }

    /// Merges another inventory into this one.
    ///
    /// Entries of `other` overwrite entries with the same URI.
    pub fn merge(&mut self, other: Inventory) {
        self.resources.extend(other.resources);
    }

    /// Splits the sorted resource list into consecutive chunks.
    ///
    /// Every chunk except possibly the last holds exactly `size` resources.
    /// A `size` of zero is treated as one.
    pub fn chunks(&self, size: usize) -> Vec<Vec<&Resource>> {
        let size = size.max(1);
        let all: Vec<&Resource> = self.resources.values().collect();
        all.chunks(size).map(<[&Resource]>::to_vec).collect()
    }
}

impl PartialEq for Inventory {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| a.same_fields(b))
    }
}

impl Eq for Inventory {}

impl Extend<Resource> for Inventory {
    fn extend<T: IntoIterator<Item = Resource>>(&mut self, iter: T) {
        for resource in iter {
            self.add(resource);
        }
    }
}

impl FromIterator<Resource> for Inventory {
    fn from_iter<T: IntoIterator<Item = Resource>>(iter: T) -> Self {
        let mut inventory = Inventory::new();
        inventory.extend(iter);
        inventory
    }
}

impl<'a> IntoIterator for &'a Inventory {
    type Item = &'a Resource;
    type IntoIter = std::collections::btree_map::Values<'a, String, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.values()
    }
}

impl IntoIterator for Inventory {
    type Item = Resource;
    type IntoIter = std::collections::btree_map::IntoValues<String, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.into_values()
    }
}
