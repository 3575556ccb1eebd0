//! # Resync Core
//!
//! Data model for the ResourceSync protocol.
//!
//! This crate provides:
//! - [`Resource`] and [`Inventory`] for full snapshots of a resource set
//! - [`ChangeEvent`] and [`ChangeMemory`] for the ordered change log
//! - [`Repository`], a lock-guarded store that records its own changes
//! - [`UriMapper`] for mapping local paths into URI space
//!
//! This is a pure model crate with no I/O operations. Encoding to the
//! sitemap wire format lives in `resync_codec`.
//!
//! ## Key Invariants
//!
//! - No two resources in an inventory share a URI
//! - Inventories iterate in ascending URI order
//! - Sequence ids are strictly increasing without gaps
//! - Appended events are never altered or removed

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod change;
mod change_memory;
mod config;
mod error;
mod inventory;
mod mapper;
mod repository;
mod resource;
mod types;

pub use change::ChangeEvent;
pub use change_memory::{ChangeListener, ChangeMemory, ChangeWindow};
pub use config::{ChangeFeedConfig, FeedLinks};
pub use error::{CoreError, CoreResult};
pub use inventory::Inventory;
pub use mapper::UriMapper;
pub use repository::Repository;
pub use resource::Resource;
pub use types::{ChangeKind, SequenceId, UnknownChangeKind};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
