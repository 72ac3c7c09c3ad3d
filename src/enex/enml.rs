//! ENML content parsing.
//!
//! The `<content>` blob of an ENEX note is its own XML document (DOCTYPE
//! `en-note`). This module parses it into the [`Element`] tree the Org
//! renderer walks.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};
use crate::note::Element;

use super::resolve_entity;

/// Normalize an ENML blob before parsing.
///
/// Exports routinely contain `&nbsp;` (undeclared outside the ENML DTD) and
/// literal no-break spaces; both become plain spaces.
pub fn clean(content: &str) -> Cow<'_, str> {
    if !content.contains("&nbsp;") && !content.contains('\u{00A0}') {
        return Cow::Borrowed(content);
    }
    Cow::Owned(content.replace("&nbsp;", " ").replace('\u{00A0}', " "))
}

/// Parse an ENML blob into its root element (normally `<en-note>`).
///
/// Text placement is positional: a fragment before a node's first child
/// lands in `text`, a fragment after a child's end tag in that child's
/// `tail`. Whitespace is kept as-is; the renderer decides what newlines
/// mean.
pub fn parse_enml(content: &str) -> Result<Element> {
    let cleaned = clean(content);
    let mut reader = Reader::from_str(&cleaned);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(element_from(&e)?),
            Ok(Event::Empty(e)) => {
                let elt = element_from(&e)?;
                attach(&mut stack, &mut root, elt)?;
            }
            Ok(Event::End(_)) => {
                let elt = stack
                    .pop()
                    .ok_or_else(|| Error::InvalidEnex("unmatched end tag in ENML".to_string()))?;
                attach(&mut stack, &mut root, elt)?;
            }
            Ok(Event::Text(e)) => {
                append_text(&mut stack, &String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::CData(e)) => {
                append_text(&mut stack, &String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::GeneralRef(e)) => {
                if let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref())) {
                    append_text(&mut stack, &resolved);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::InvalidEnex("unterminated element in ENML".to_string()));
    }
    root.ok_or_else(|| Error::InvalidEnex("note content has no root element".to_string()))
}

fn element_from(e: &BytesStart) -> Result<Element> {
    let mut elt = Element::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = String::from_utf8(attr.value.to_vec())?;
        elt.attrs.insert(key, unescape_attr(&value));
    }
    Ok(elt)
}

/// Decode entity references inside an attribute value. Unknown references
/// are kept verbatim.
fn unescape_attr(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        match rest[1..].find(';') {
            Some(end) => {
                let entity = &rest[1..end + 1];
                match resolve_entity(entity) {
                    Some(resolved) => out.push_str(&resolved),
                    None => out.push_str(&rest[..end + 2]),
                }
                rest = &rest[end + 2..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Hand a completed element to its parent, or make it the root.
fn attach(stack: &mut [Element], root: &mut Option<Element>, elt: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(elt);
    } else if root.is_none() {
        *root = Some(elt);
    } else {
        return Err(Error::InvalidEnex(
            "multiple root elements in ENML".to_string(),
        ));
    }
    Ok(())
}

/// Append character data at the current position: before any child it is
/// the open element's text, after a child it is that child's tail.
fn append_text(stack: &mut [Element], s: &str) {
    let Some(parent) = stack.last_mut() else {
        // Whitespace between the XML declaration and the root element.
        return;
    };
    let slot = match parent.children.last_mut() {
        Some(last_child) => &mut last_child.tail,
        None => &mut parent.text,
    };
    match slot {
        Some(existing) => existing.push_str(s),
        None => *slot = Some(s.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE en-note SYSTEM "http://xml.evernote.com/pub/enml2.dtd">"#;

    fn parse(body: &str) -> Element {
        parse_enml(&format!("{HEADER}{body}")).unwrap()
    }

    #[test]
    fn test_root_element() {
        let root = parse("<en-note></en-note>");
        assert_eq!(root.tag, "en-note");
        assert!(root.children.is_empty());
        assert!(root.text.is_none());
    }

    #[test]
    fn test_text_and_tail() {
        let root = parse("<en-note>before<b>bold</b>after</en-note>");
        assert_eq!(root.text.as_deref(), Some("before"));
        assert_eq!(root.children.len(), 1);
        let b = &root.children[0];
        assert_eq!(b.tag, "b");
        assert_eq!(b.text.as_deref(), Some("bold"));
        assert_eq!(b.tail.as_deref(), Some("after"));
    }

    #[test]
    fn test_empty_element_and_attrs() {
        let root = parse(r#"<en-note><en-media hash="abc" type="image/png"/></en-note>"#);
        let media = &root.children[0];
        assert_eq!(media.tag, "en-media");
        assert_eq!(media.attr("hash"), Some("abc"));
        assert_eq!(media.attr("type"), Some("image/png"));
    }

    #[test]
    fn test_nested_structure() {
        let root = parse("<en-note><ul><li>one</li><li>two</li></ul></en-note>");
        let ul = &root.children[0];
        assert_eq!(ul.tag, "ul");
        assert_eq!(ul.children.len(), 2);
        assert_eq!(ul.children[1].text.as_deref(), Some("two"));
    }

    #[test]
    fn test_nbsp_cleaned() {
        let root = parse("<en-note>a&nbsp;b\u{00A0}c</en-note>");
        assert_eq!(root.text.as_deref(), Some("a b c"));
    }

    #[test]
    fn test_standard_entities_resolved() {
        let root = parse("<en-note>a &amp; b &lt;c&gt;</en-note>");
        assert_eq!(root.text.as_deref(), Some("a & b <c>"));
    }

    #[test]
    fn test_numeric_entities_resolved() {
        let root = parse("<en-note>&#65;&#x42;</en-note>");
        assert_eq!(root.text.as_deref(), Some("AB"));
    }

    #[test]
    fn test_attr_entities_unescaped() {
        let root = parse(r#"<en-note><a href="http://e.com/?a=1&amp;b=2">x</a></en-note>"#);
        assert_eq!(
            root.children[0].attr("href"),
            Some("http://e.com/?a=1&b=2")
        );
    }

    #[test]
    fn test_unknown_attr_entity_kept() {
        assert_eq!(unescape_attr("a&bogus;b"), "a&bogus;b");
        assert_eq!(unescape_attr("trailing&"), "trailing&");
    }

    #[test]
    fn test_unterminated_is_error() {
        let err = parse_enml(&format!("{HEADER}<en-note><div>")).unwrap_err();
        assert!(matches!(err, Error::InvalidEnex(_) | Error::Xml(_)));
    }

    #[test]
    fn test_empty_content_is_error() {
        assert!(matches!(
            parse_enml("").unwrap_err(),
            Error::InvalidEnex(_)
        ));
    }
}
