//! # Resync Codec
//!
//! XML wire format for ResourceSync inventories and change sets.
//!
//! Three document shapes share the sitemaps.org vocabulary plus the
//! `rs` extension namespace:
//!
//! - `urlset`: a leaf inventory, one `url` per resource in URI order
//! - `sitemapindex`: references to the children of a split inventory
//! - change set: a `urlset` whose records also carry change metadata
//!
//! ## Usage
//!
//! ```
//! use resync_codec::{decode_inventory, encode_inventory, EncodedInventory, SitemapConfig};
//! use resync_core::{Inventory, Resource};
//!
//! let mut inventory = Inventory::new();
//! inventory.add(Resource::new("http://example.org/a").unwrap().with_size(20));
//!
//! let encoded = encode_inventory(&inventory, &SitemapConfig::default(), "sitemap.xml").unwrap();
//! let EncodedInventory::Single(bytes) = encoded else { unreachable!() };
//!
//! let decoded = decode_inventory(&bytes).unwrap();
//! assert_eq!(decoded.get("http://example.org/a").unwrap().size(), Some(20));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod changeset;
mod config;
mod datetime;
mod decoder;
mod encoder;
mod error;
pub mod fs;
mod index;
mod xml;

pub use changeset::{decode_change_set, encode_change_set, encode_change_window, ChangeSet};
pub use config::{SitemapConfig, DEFAULT_MAX_ENTRIES};
pub use datetime::{format_datetime, parse_datetime};
pub use decoder::{decode_into, decode_inventory, parse_document, SitemapDocument};
pub use encoder::{
    child_name, encode_index, encode_inventory, encode_inventory_at, encode_urlset,
    ChildDocument, EncodedInventory,
};
pub use error::{CodecError, CodecResult};
pub use index::{IndexEntry, SitemapIndex};

/// Sitemap namespace.
pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// ResourceSync extension namespace, bound to the `rs` prefix.
pub const RS_NS: &str = "http://resourcesync.org/change/0.1";
