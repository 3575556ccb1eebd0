//! Lock-guarded resource store that records its own changes.

use crate::change::ChangeEvent;
use crate::change_memory::ChangeMemory;
use crate::error::{CoreError, CoreResult};
use crate::inventory::Inventory;
use crate::resource::Resource;
use crate::types::ChangeKind;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

/// The current resource set of a source, plus its change memory.
///
/// Every successful `create`, `update` or `delete` appends exactly one
/// event to the change memory while the store's write lock is held, so
/// the order of events matches the order of mutations. Listeners are
/// notified after the lock is released.
///
/// Readers never touch live state: [`Repository::snapshot`] hands out an
/// immutable `Arc<Inventory>`. A mutation while snapshots are outstanding
/// copies the inventory first.
pub struct Repository {
    state: RwLock<Arc<Inventory>>,
    changes: Arc<ChangeMemory>,
}

impl Repository {
    /// Creates an empty repository with a fresh change memory.
    pub fn new() -> Self {
        Self::with_change_memory(Arc::new(ChangeMemory::new()))
    }

    /// Creates an empty repository that records into `changes`.
    pub fn with_change_memory(changes: Arc<ChangeMemory>) -> Self {
        Self {
            state: RwLock::new(Arc::new(Inventory::new())),
            changes,
        }
    }

    /// Creates a repository seeded with `inventory`.
    ///
    /// Seeding does not record change events.
    pub fn from_inventory(inventory: Inventory) -> Self {
        Self {
            state: RwLock::new(Arc::new(inventory)),
            changes: Arc::new(ChangeMemory::new()),
        }
    }

    /// Returns the change memory.
    pub fn change_memory(&self) -> &Arc<ChangeMemory> {
        &self.changes
    }

    /// Returns an immutable snapshot of the current resources.
    pub fn snapshot(&self) -> Arc<Inventory> {
        Arc::clone(&self.state.read())
    }

    /// Returns the resource with the given URI.
    pub fn get(&self, uri: &str) -> Option<Resource> {
        self.state.read().get(uri).cloned()
    }

    /// Returns the number of resources.
    pub fn len(&self) -> usize {
        self.state.read().len()
    }

    /// Returns true if the repository holds no resources.
    pub fn is_empty(&self) -> bool {
        self.state.read().is_empty()
    }

    /// Adds a new resource and records a create event.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ResourceExists`] if the URI is already present.
    pub fn create(&self, resource: Resource) -> CoreResult<Arc<ChangeEvent>> {
        self.mutate(ChangeKind::Create, resource, Utc::now())
    }

    /// Replaces an existing resource and records an update event.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ResourceNotFound`] if the URI is not present.
    pub fn update(&self, resource: Resource) -> CoreResult<Arc<ChangeEvent>> {
        self.mutate(ChangeKind::Update, resource, Utc::now())
    }

    /// Removes a resource and records a delete event.
    ///
    /// The recorded resource carries the deletion time as its `lastmod`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ResourceNotFound`] if the URI is not present.
    pub fn delete(&self, uri: &str) -> CoreResult<Arc<ChangeEvent>> {
        self.delete_at(uri, Utc::now())
    }

    /// Removes a resource, stamping it with an explicit deletion time.
    pub fn delete_at(&self, uri: &str, at: DateTime<Utc>) -> CoreResult<Arc<ChangeEvent>> {
        let resource = self
            .get(uri)
            .ok_or_else(|| CoreError::resource_not_found(uri))?;
        self.mutate(ChangeKind::Delete, resource, at)
    }

    /// Applies a mutation of the given kind.
    ///
    /// This is the single entry point the other mutators go through.
    pub fn apply(&self, kind: ChangeKind, resource: Resource) -> CoreResult<Arc<ChangeEvent>> {
        self.mutate(kind, resource, Utc::now())
    }

    fn mutate(
        &self,
        kind: ChangeKind,
        resource: Resource,
        at: DateTime<Utc>,
    ) -> CoreResult<Arc<ChangeEvent>> {
        let event = {
            let mut state = self.state.write();
            let exists = state.contains(resource.uri());
            let recorded = match kind {
                ChangeKind::Create if exists => {
                    return Err(CoreError::resource_exists(resource.uri()))
                }
                ChangeKind::Update | ChangeKind::Delete if !exists => {
                    return Err(CoreError::resource_not_found(resource.uri()))
                }
                ChangeKind::Create | ChangeKind::Update => resource,
                ChangeKind::Delete => state
                    .get(resource.uri())
                    .cloned()
                    .unwrap_or(resource)
                    .deleted_at(at),
            };
            // Recording first leaves the state untouched if ids are exhausted
            let event = self.changes.record(kind, recorded.clone(), at)?;
            let inventory = Arc::make_mut(&mut *state);
            match kind {
                ChangeKind::Create | ChangeKind::Update => {
                    inventory.add(recorded);
                }
                ChangeKind::Delete => {
                    inventory.remove(recorded.uri());
                }
            }
            event
        };
        self.changes.notify(&event);
        Ok(event)
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}
