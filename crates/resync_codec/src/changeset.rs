//! Change set documents: one window of a change memory.
//!
//! A change set is a `urlset` carrying `rs:this` and `rs:next` links ahead
//! of its records. Each record is a regular `url` entry plus
//! `rs:changetype`, `rs:changeid` and `rs:changetime`, in sequence order.

use crate::datetime::format_datetime;
use crate::decoder::{datetime_field, index_entries, scan, Root};
use crate::encoder::write_url;
use crate::error::{CodecError, CodecResult};
use crate::xml::DocumentWriter;
use crate::{RS_NS, SITEMAP_NS};
use resync_core::{ChangeEvent, ChangeFeedConfig, ChangeKind, ChangeWindow, SequenceId};

/// A decoded change set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    /// URI of this window, if the document names it.
    pub this: Option<String>,
    /// URI of the following window, if the document names it.
    pub next: Option<String>,
    /// Changes in document order.
    pub changes: Vec<ChangeEvent>,
}

/// Encodes events as a change set document.
pub fn encode_change_set<'a, I>(
    events: I,
    this: &str,
    next: &str,
    pretty: bool,
) -> CodecResult<Vec<u8>>
where
    I: IntoIterator<Item = &'a ChangeEvent>,
{
    let mut doc = DocumentWriter::new(pretty)?;
    doc.start("urlset", &[("xmlns", SITEMAP_NS), ("xmlns:rs", RS_NS)])?;
    doc.text_element("rs:this", this)?;
    doc.text_element("rs:next", next)?;
    for event in events {
        write_url(&mut doc, event.resource(), |doc| {
            doc.text_element("rs:changetype", event.kind().as_str())?;
            doc.text_element("rs:changeid", &event.sequence().to_string())?;
            doc.text_element("rs:changetime", &format_datetime(event.timestamp()))
        })?;
    }
    doc.end("urlset")?;
    Ok(doc.finish())
}

/// Encodes a change memory window with links built from `feed`.
pub fn encode_change_window(
    window: &ChangeWindow,
    feed: &ChangeFeedConfig,
    pretty: bool,
) -> CodecResult<Vec<u8>> {
    let links = feed.links(window);
    encode_change_set(window.iter(), &links.this, &links.next, pretty)
}

/// Decodes a change set document.
///
/// # Errors
///
/// Returns [`CodecError::MalformedDocument`] if a record lacks `loc`,
/// `rs:changetype`, `rs:changeid` or `rs:changetime`, or carries an
/// unparsable value. Returns [`CodecError::UnexpectedIndex`] for a
/// `sitemapindex`.
pub fn decode_change_set(bytes: &[u8]) -> CodecResult<ChangeSet> {
    let scanned = scan(bytes)?;
    if scanned.root == Root::Index {
        return Err(CodecError::UnexpectedIndex(index_entries(scanned.records)?));
    }

    let mut changes = Vec::with_capacity(scanned.records.len());
    for (n, mut record) in scanned.records.into_iter().enumerate() {
        let kind = required(n, "rs:changetype", record.change_type.take())?;
        let kind = kind
            .parse::<ChangeKind>()
            .map_err(|e| CodecError::malformed(format!("change {n}: {e}")))?;
        let id = required(n, "rs:changeid", record.change_id.take())?;
        let id = id
            .parse::<SequenceId>()
            .map_err(|_| CodecError::malformed(format!("change {n}: bad rs:changeid {id:?}")))?;
        let time = required(n, "rs:changetime", record.change_time.take())?;
        let time = datetime_field(n, "rs:changetime", &time)?;
        let resource = record.into_resource(n)?;
        changes.push(ChangeEvent::from_parts(id, kind, resource, time));
    }

    Ok(ChangeSet {
        this: scanned.this,
        next: scanned.next,
        changes,
    })
}

fn required(n: usize, name: &str, value: Option<String>) -> CodecResult<String> {
    value.ok_or_else(|| CodecError::malformed(format!("change {n} has no {name}")))
}
