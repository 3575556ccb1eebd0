//! Low-level XML plumbing shared by the encoders and the decoder.

use crate::error::{CodecError, CodecResult};
use crate::{RS_NS, SITEMAP_NS};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::Writer;
use std::io::{Cursor, Write};

/// Elements the codec understands, after namespace resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tag {
    Urlset,
    SitemapIndex,
    Url,
    Sitemap,
    Loc,
    Lastmod,
    Size,
    Md5,
    ChangeType,
    ChangeId,
    ChangeTime,
    This,
    Next,
}

impl Tag {
    /// Resolves a namespaced element name. Anything outside the two
    /// protocol namespaces, or unknown within them, yields `None`.
    pub(crate) fn resolve(ns: &ResolveResult<'_>, local: &[u8]) -> Option<Self> {
        let ResolveResult::Bound(Namespace(ns)) = ns else {
            return None;
        };
        if *ns == SITEMAP_NS.as_bytes() {
            match local {
                b"urlset" => Some(Self::Urlset),
                b"sitemapindex" => Some(Self::SitemapIndex),
                b"url" => Some(Self::Url),
                b"sitemap" => Some(Self::Sitemap),
                b"loc" => Some(Self::Loc),
                b"lastmod" => Some(Self::Lastmod),
                _ => None,
            }
        } else if *ns == RS_NS.as_bytes() {
            match local {
                b"size" => Some(Self::Size),
                b"md5" => Some(Self::Md5),
                b"changetype" => Some(Self::ChangeType),
                b"changeid" => Some(Self::ChangeId),
                b"changetime" => Some(Self::ChangeTime),
                b"this" => Some(Self::This),
                b"next" => Some(Self::Next),
                _ => None,
            }
        } else {
            None
        }
    }
}

/// Thin wrapper over a quick-xml writer that maps errors into the codec's
/// error type.
pub(crate) struct DocumentWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl DocumentWriter {
    /// Starts a document and writes the XML declaration.
    pub(crate) fn new(pretty: bool) -> CodecResult<Self> {
        let cursor = Cursor::new(Vec::with_capacity(4096));
        let mut writer = if pretty {
            Writer::new_with_indent(cursor, b' ', 2)
        } else {
            Writer::new(cursor)
        };
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(encoding_failed)?;
        // The indenting writer breaks the line itself
        if !pretty {
            writer.get_mut().write_all(b"\n")?;
        }
        Ok(Self { writer })
    }

    pub(crate) fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> CodecResult<()> {
        let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.writer
            .write_event(Event::Start(start))
            .map_err(encoding_failed)
    }

    pub(crate) fn end(&mut self, name: &str) -> CodecResult<()> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(encoding_failed)
    }

    /// Writes `<name>value</name>`, escaping the value.
    pub(crate) fn text_element(&mut self, name: &str, value: &str) -> CodecResult<()> {
        self.start(name, &[])?;
        self.writer
            .write_event(Event::Text(BytesText::new(value)))
            .map_err(encoding_failed)?;
        self.end(name)
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.writer.into_inner().into_inner()
    }
}

fn encoding_failed(err: impl std::fmt::Display) -> CodecError {
    CodecError::encoding_failed(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_only_protocol_namespaces() {
        let base = ResolveResult::Bound(Namespace(SITEMAP_NS.as_bytes()));
        let rs = ResolveResult::Bound(Namespace(RS_NS.as_bytes()));
        let other = ResolveResult::Bound(Namespace(b"http://example.org/other"));

        assert_eq!(Tag::resolve(&base, b"loc"), Some(Tag::Loc));
        assert_eq!(Tag::resolve(&rs, b"size"), Some(Tag::Size));
        assert_eq!(Tag::resolve(&rs, b"loc"), None);
        assert_eq!(Tag::resolve(&other, b"loc"), None);
        assert_eq!(Tag::resolve(&ResolveResult::Unbound, b"loc"), None);
    }

    #[test]
    fn escapes_text() {
        let mut writer = DocumentWriter::new(false).unwrap();
        writer.text_element("loc", "http://example.org/?a=1&b=<2>").unwrap();
        let xml = String::from_utf8(writer.finish()).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(xml.ends_with("<loc>http://example.org/?a=1&amp;b=&lt;2&gt;</loc>"));
    }
}
