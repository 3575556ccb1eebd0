//! Namespace-aware sitemap decoder.
//!
//! Decoding is a small state machine:
//!
//! ```text
//! START --root--> { URLSET, SITEMAPINDEX } --eof--> DONE
//! ```
//!
//! Only elements in the sitemap and ResourceSync namespaces are recognised;
//! anything else is skipped. A document is scanned in full before any
//! resource is handed to the caller, so a failed decode never leaves a
//! target inventory half-populated.

use crate::datetime::parse_datetime;
use crate::error::{CodecError, CodecResult};
use crate::index::{IndexEntry, SitemapIndex};
use crate::xml::Tag;
use chrono::{DateTime, Utc};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::NsReader;
use resync_core::{Inventory, Resource};
use tracing::debug;

/// A decoded sitemap, tagged by root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// A leaf `urlset` document.
    Urlset(Inventory),
    /// A `sitemapindex` referencing child documents.
    Index(SitemapIndex),
}

/// Decodes a document, distinguishing leaf documents from indexes.
///
/// # Errors
///
/// Returns [`CodecError::MalformedDocument`] for invalid XML, an unknown
/// root element, a record without `loc`, or an unparsable field value.
pub fn parse_document(bytes: &[u8]) -> CodecResult<SitemapDocument> {
    let scanned = scan(bytes)?;
    match scanned.root {
        Root::Urlset => leaf_resources(scanned.records)
            .map(|resources| SitemapDocument::Urlset(resources.into_iter().collect())),
        Root::Index => index_entries(scanned.records).map(SitemapDocument::Index),
    }
}

/// Decodes a leaf document into a fresh inventory.
///
/// # Errors
///
/// Returns [`CodecError::UnexpectedIndex`] if the document is an index.
pub fn decode_inventory(bytes: &[u8]) -> CodecResult<Inventory> {
    let mut inventory = Inventory::new();
    decode_into(bytes, &mut inventory)?;
    Ok(inventory)
}

/// Decodes a leaf document into an existing inventory.
///
/// Entries overwrite resources with the same URI. Returns the number of
/// entries read from the document, counting repeated URIs each time. On
/// error `inventory` is unchanged.
///
/// # Errors
///
/// Returns [`CodecError::UnexpectedIndex`] if the document is an index.
pub fn decode_into(bytes: &[u8], inventory: &mut Inventory) -> CodecResult<usize> {
    let scanned = scan(bytes)?;
    match scanned.root {
        Root::Urlset => {
            let resources = leaf_resources(scanned.records)?;
            let added = resources.len();
            inventory.extend(resources);
            debug!(added, total = inventory.len(), "decoded sitemap");
            Ok(added)
        }
        Root::Index => Err(CodecError::UnexpectedIndex(index_entries(scanned.records)?)),
    }
}

fn leaf_resources(records: Vec<Record>) -> CodecResult<Vec<Resource>> {
    records
        .into_iter()
        .enumerate()
        .map(|(n, record)| record.into_resource(n))
        .collect()
}

pub(crate) fn index_entries(records: Vec<Record>) -> CodecResult<SitemapIndex> {
    records
        .into_iter()
        .enumerate()
        .map(|(n, record)| record.into_index_entry(n))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Root {
    Urlset,
    Index,
}

/// Raw text of the fields of one `url` or `sitemap` record.
#[derive(Debug, Default)]
pub(crate) struct Record {
    pub(crate) loc: Option<String>,
    pub(crate) lastmod: Option<String>,
    pub(crate) size: Option<String>,
    pub(crate) md5: Option<String>,
    pub(crate) change_type: Option<String>,
    pub(crate) change_id: Option<String>,
    pub(crate) change_time: Option<String>,
}

impl Record {
    fn field_mut(&mut self, tag: Tag) -> Option<&mut Option<String>> {
        match tag {
            Tag::Loc => Some(&mut self.loc),
            Tag::Lastmod => Some(&mut self.lastmod),
            Tag::Size => Some(&mut self.size),
            Tag::Md5 => Some(&mut self.md5),
            Tag::ChangeType => Some(&mut self.change_type),
            Tag::ChangeId => Some(&mut self.change_id),
            Tag::ChangeTime => Some(&mut self.change_time),
            _ => None,
        }
    }

    pub(crate) fn into_resource(self, n: usize) -> CodecResult<Resource> {
        let loc = self
            .loc
            .ok_or_else(|| CodecError::malformed(format!("url entry {n} has no loc")))?;
        let mut resource = Resource::new(loc)
            .map_err(|e| CodecError::malformed(format!("url entry {n}: {e}")))?;
        if let Some(lastmod) = self.lastmod {
            resource = resource.with_lastmod(datetime_field(n, "lastmod", &lastmod)?);
        }
        if let Some(size) = self.size {
            let size = size.parse::<u64>().map_err(|_| {
                CodecError::malformed(format!("url entry {n}: bad rs:size {size:?}"))
            })?;
            resource = resource.with_size(size);
        }
        if let Some(md5) = self.md5 {
            resource = resource.with_md5(md5);
        }
        Ok(resource)
    }

    fn into_index_entry(self, n: usize) -> CodecResult<IndexEntry> {
        let loc = self
            .loc
            .ok_or_else(|| CodecError::malformed(format!("sitemap entry {n} has no loc")))?;
        let lastmod = self
            .lastmod
            .ok_or_else(|| CodecError::malformed(format!("sitemap entry {n} has no lastmod")))?;
        Ok(IndexEntry {
            loc,
            lastmod: datetime_field(n, "lastmod", &lastmod)?,
        })
    }
}

pub(crate) fn datetime_field(n: usize, name: &str, value: &str) -> CodecResult<DateTime<Utc>> {
    parse_datetime(value)
        .ok_or_else(|| CodecError::malformed(format!("entry {n}: bad {name} {value:?}")))
}

/// Everything the scanner pulled out of a document.
#[derive(Debug)]
pub(crate) struct Scanned {
    pub(crate) root: Root,
    pub(crate) records: Vec<Record>,
    pub(crate) this: Option<String>,
    pub(crate) next: Option<String>,
}

/// Where a text field is being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Field(Tag),
    Link(Tag),
}

/// Scanner state. `stack` holds the resolved tag of every open element.
#[derive(Default)]
struct Scanner {
    root: Option<Root>,
    stack: Vec<Option<Tag>>,
    records: Vec<Record>,
    current: Option<Record>,
    target: Option<Target>,
    text: String,
    this: Option<String>,
    next: Option<String>,
}

impl Scanner {
    fn open(&mut self, tag: Option<Tag>) -> CodecResult<()> {
        match self.stack.len() {
            0 => {
                if self.root.is_some() {
                    return Err(CodecError::malformed("multiple root elements"));
                }
                self.root = Some(match tag {
                    Some(Tag::Urlset) => Root::Urlset,
                    Some(Tag::SitemapIndex) => Root::Index,
                    _ => return Err(CodecError::malformed("XML is not sitemap or sitemapindex")),
                });
            }
            1 => match (self.root, tag) {
                (Some(Root::Urlset), Some(Tag::Url)) | (Some(Root::Index), Some(Tag::Sitemap)) => {
                    self.current = Some(Record::default());
                }
                (Some(Root::Urlset), Some(t @ (Tag::This | Tag::Next))) => {
                    self.collect(Target::Link(t));
                }
                _ => {}
            },
            2 if self.current.is_some() => {
                if let Some(t) = tag {
                    self.collect(Target::Field(t));
                }
            }
            _ => {}
        }
        self.stack.push(tag);
        Ok(())
    }

    fn collect(&mut self, target: Target) {
        self.target = Some(target);
        self.text.clear();
    }

    fn close(&mut self) {
        self.stack.pop();
        match (self.stack.len(), self.target) {
            (2, Some(Target::Field(tag))) => {
                let value = self.text.trim().to_string();
                if let Some(slot) = self.current.as_mut().and_then(|r| r.field_mut(tag)) {
                    // First occurrence wins
                    slot.get_or_insert(value);
                }
                self.target = None;
            }
            (1, Some(Target::Link(tag))) => {
                let value = self.text.trim().to_string();
                let slot = if tag == Tag::This {
                    &mut self.this
                } else {
                    &mut self.next
                };
                slot.get_or_insert(value);
                self.target = None;
            }
            (1, _) => {
                if let Some(record) = self.current.take() {
                    self.records.push(record);
                }
            }
            _ => {}
        }
    }

    fn finish(self) -> CodecResult<Scanned> {
        if !self.stack.is_empty() {
            return Err(CodecError::malformed("unexpected end of document"));
        }
        let root = self
            .root
            .ok_or_else(|| CodecError::malformed("document has no root element"))?;
        Ok(Scanned {
            root,
            records: self.records,
            this: self.this,
            next: self.next,
        })
    }
}

/// Scans a document into raw records.
pub(crate) fn scan(bytes: &[u8]) -> CodecResult<Scanned> {
    let mut reader = NsReader::from_reader(bytes);
    let mut scanner = Scanner::default();

    loop {
        let (ns, event) = reader
            .read_resolved_event()
            .map_err(|e| CodecError::malformed(e.to_string()))?;
        let collecting = scanner.target.is_some();
        match event {
            Event::Start(e) => {
                scanner.open(Tag::resolve(&ns, e.local_name().as_ref()))?;
            }
            Event::Empty(e) => {
                scanner.open(Tag::resolve(&ns, e.local_name().as_ref()))?;
                scanner.close();
            }
            Event::End(_) => scanner.close(),
            Event::Text(e) if collecting => scanner.text.push_str(utf8(&e)?),
            Event::CData(e) if collecting => scanner.text.push_str(utf8(&e)?),
            Event::GeneralRef(e) if collecting => {
                resolve_reference(utf8(&e)?, &mut scanner.text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }
    scanner.finish()
}

fn utf8(bytes: &[u8]) -> CodecResult<&str> {
    std::str::from_utf8(bytes).map_err(|e| CodecError::malformed(e.to_string()))
}

/// Appends the expansion of `&name;` to `text`.
fn resolve_reference(name: &str, text: &mut String) -> CodecResult<()> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => num.parse::<u32>().ok(),
        };
        if let Some(c) = code.and_then(char::from_u32) {
            text.push(c);
            return Ok(());
        }
    } else if let Some(expansion) = resolve_predefined_entity(name) {
        text.push_str(expansion);
        return Ok(());
    }
    Err(CodecError::malformed(format!("unknown entity &{name};")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

    fn urlset(body: &str) -> Vec<u8> {
        format!(
            r#"{HEADER}<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" xmlns:rs="http://resourcesync.org/change/0.1">{body}</urlset>"#
        )
        .into_bytes()
    }

    #[test]
    fn decodes_leaf_document() {
        let bytes = urlset(
            "<url><loc>http://e.com/a</loc><lastmod>2012-03-14T21:46:04Z</lastmod>\
             <rs:size>12</rs:size><rs:md5>aabbccdd</rs:md5></url>\
             <url><loc>http://e.com/b</loc></url>",
        );
        let inventory = decode_inventory(&bytes).unwrap();

        assert_eq!(inventory.len(), 2);
        let a = inventory.get("http://e.com/a").unwrap();
        assert_eq!(a.size(), Some(12));
        assert_eq!(a.md5(), Some("aabbccdd"));
        assert_eq!(
            a.lastmod().map(crate::format_datetime).as_deref(),
            Some("2012-03-14T21:46:04Z")
        );
        let b = inventory.get("http://e.com/b").unwrap();
        assert_eq!(b.size(), None);
        assert_eq!(b.lastmod(), None);
    }

    #[test]
    fn ignores_foreign_elements_and_whitespace() {
        let bytes = format!(
            r#"{HEADER}
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"
        xmlns:rs="http://resourcesync.org/change/0.1"
        xmlns:x="http://example.org/x">
  <x:generator>test</x:generator>
  <url>
    <loc>
      http://e.com/a
    </loc>
    <x:size>not a number</x:size>
    <rs:unknown>whatever</rs:unknown>
    <rs:size>7</rs:size>
  </url>
</urlset>"#
        );
        let inventory = decode_inventory(bytes.as_bytes()).unwrap();

        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory.get("http://e.com/a").unwrap().size(), Some(7));
    }

    #[test]
    fn prefixed_sitemap_namespace_is_recognised() {
        let bytes = format!(
            r#"{HEADER}<sm:urlset xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9"><sm:url><sm:loc>http://e.com/a</sm:loc></sm:url></sm:urlset>"#
        );
        assert_eq!(decode_inventory(bytes.as_bytes()).unwrap().len(), 1);
    }

    #[test]
    fn unqualified_urlset_is_not_a_sitemap() {
        let bytes = format!("{HEADER}<urlset><url><loc>http://e.com/a</loc></url></urlset>");
        let err = decode_inventory(bytes.as_bytes()).unwrap_err();
        assert!(matches!(err, CodecError::MalformedDocument { .. }));
    }

    #[test]
    fn entities_are_expanded() {
        let bytes = urlset("<url><loc>http://e.com/?a=1&amp;b=&#50;&#x33;</loc></url>");
        let inventory = decode_inventory(&bytes).unwrap();
        assert!(inventory.contains("http://e.com/?a=1&b=23"));
    }

    #[test]
    fn missing_loc_is_malformed() {
        let bytes = urlset(
            "<url><loc>http://e.com/a</loc></url><url><rs:size>3</rs:size></url>",
        );
        let mut inventory = Inventory::new();
        let err = decode_into(&bytes, &mut inventory).unwrap_err();

        assert!(matches!(err, CodecError::MalformedDocument { .. }));
        assert!(err.to_string().contains("no loc"));
        assert!(inventory.is_empty());
    }

    #[test]
    fn empty_url_element_is_malformed() {
        let bytes = urlset("<url/>");
        assert!(matches!(
            decode_inventory(&bytes),
            Err(CodecError::MalformedDocument { .. })
        ));
    }

    #[test]
    fn bad_size_is_malformed() {
        for size in ["abc", "-1", "1.5", ""] {
            let bytes = urlset(&format!(
                "<url><loc>http://e.com/a</loc><rs:size>{size}</rs:size></url>"
            ));
            assert!(
                matches!(
                    decode_inventory(&bytes),
                    Err(CodecError::MalformedDocument { .. })
                ),
                "size {size:?} should be rejected"
            );
        }
    }

    #[test]
    fn bad_lastmod_is_malformed() {
        let bytes = urlset("<url><loc>http://e.com/a</loc><lastmod>soon</lastmod></url>");
        assert!(matches!(
            decode_inventory(&bytes),
            Err(CodecError::MalformedDocument { .. })
        ));
    }

    #[test]
    fn invalid_xml_is_malformed() {
        for doc in [
            "",
            "not xml at all",
            "<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\"><url>",
            "<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\"></url>",
        ] {
            assert!(
                matches!(
                    decode_inventory(doc.as_bytes()),
                    Err(CodecError::MalformedDocument { .. })
                ),
                "{doc:?} should be rejected"
            );
        }
    }

    #[test]
    fn index_is_reported_and_target_untouched() {
        let bytes = format!(
            r#"{HEADER}<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><sitemap><loc>http://e.com/sitemap00000.xml</loc><lastmod>2012-03-14T21:46:04Z</lastmod></sitemap><sitemap><loc>http://e.com/sitemap00001.xml</loc><lastmod>2012-03-14T21:46:05Z</lastmod></sitemap></sitemapindex>"#
        );
        let existing = Resource::new("http://e.com/existing").unwrap();
        let mut inventory: Inventory = std::iter::once(existing).collect();

        let err = decode_into(bytes.as_bytes(), &mut inventory).unwrap_err();
        let CodecError::UnexpectedIndex(index) = err else {
            panic!("expected UnexpectedIndex, got {err:?}");
        };
        assert_eq!(
            index.locs().collect::<Vec<_>>(),
            vec![
                "http://e.com/sitemap00000.xml",
                "http://e.com/sitemap00001.xml"
            ]
        );
        assert_eq!(inventory.len(), 1);
    }

    #[test]
    fn parse_document_tags_index() {
        let bytes = format!(
            r#"{HEADER}<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><sitemap><loc>http://e.com/s0.xml</loc><lastmod>2012-03-14</lastmod></sitemap></sitemapindex>"#
        );
        match parse_document(bytes.as_bytes()).unwrap() {
            SitemapDocument::Index(index) => assert_eq!(index.len(), 1),
            other => panic!("expected index, got {other:?}"),
        }
    }

    #[test]
    fn index_entry_without_lastmod_is_malformed() {
        let bytes = format!(
            r#"{HEADER}<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><sitemap><loc>http://e.com/s0.xml</loc></sitemap></sitemapindex>"#
        );
        assert!(matches!(
            parse_document(bytes.as_bytes()),
            Err(CodecError::MalformedDocument { .. })
        ));
    }

    #[test]
    fn decode_into_merges_and_counts() {
        let first = urlset(
            "<url><loc>http://e.com/a</loc><rs:size>1</rs:size></url>\
             <url><loc>http://e.com/b</loc></url>",
        );
        let second = urlset(
            "<url><loc>http://e.com/a</loc><rs:size>2</rs:size></url>\
             <url><loc>http://e.com/c</loc></url>",
        );
        let mut inventory = Inventory::new();

        assert_eq!(decode_into(&first, &mut inventory).unwrap(), 2);
        assert_eq!(decode_into(&second, &mut inventory).unwrap(), 2);
        assert_eq!(inventory.len(), 3);
        assert_eq!(inventory.get("http://e.com/a").unwrap().size(), Some(2));
    }

    #[test]
    fn duplicate_entries_last_wins() {
        let bytes = urlset(
            "<url><loc>http://e.com/a</loc><rs:size>1</rs:size></url>\
             <url><loc>http://e.com/a</loc><rs:size>2</rs:size></url>",
        );
        let mut inventory = Inventory::new();
        assert_eq!(decode_into(&bytes, &mut inventory).unwrap(), 2);
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory.get("http://e.com/a").unwrap().size(), Some(2));
    }
}
