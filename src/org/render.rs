//! ENML tree → token stream rendering.
//!
//! This module provides pure rendering logic that walks the parsed note
//! tree and linearizes it into a flat stream of literal fragments and
//! structural markers. No I/O is performed here and nothing is indented
//! yet - list depth and numbering depend on enclosing scope that is only
//! fully known once the whole stream exists, so [`super::resolve`] turns
//! the stream into final text in a second pass.

use crate::error::{Error, Result};
use crate::note::{Element, ResourceTable};

/// One item of the render stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Literal text, emitted verbatim (modulo indentation expansion).
    Text(String),
    /// Structural marker resolved by the post-processor.
    Marker(Marker),
}

/// Structural markers carried inline in the render stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// One level deeper: subsequent newlines gain two spaces of indent.
    Indent,
    /// Back out one level.
    Dedent,
    /// Entering a table row: newline expansion is suppressed until RowEnd.
    RowStart,
    RowEnd,
    /// A list bullet; resolves to `\n- ` or `\n<n>. ` from the list stack.
    ListItem,
    BeginOrdered,
    EndOrdered,
    BeginUnordered,
    EndUnordered,
}

/// Read-only per-note state passed into rendering.
pub struct RenderContext<'a> {
    resources: &'a ResourceTable,
    attachment_dir: &'a str,
}

impl<'a> RenderContext<'a> {
    pub fn new(resources: &'a ResourceTable, attachment_dir: &'a str) -> Self {
        Self {
            resources,
            attachment_dir,
        }
    }
}

/// Per-tag wrap behavior: what to emit before and after a node's children.
///
/// A closed enum rather than a name-keyed handler map, so dispatch is a
/// static match and unknown tags fall through to `Passthrough` (children
/// still visited, no markup of their own).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handler {
    Italic,
    Bold,
    Underline,
    ListItem,
    Todo,
    Link,
    Table,
    TableRow,
    TableCell,
    Block,
    Rule,
    UnorderedList,
    OrderedList,
    LineBreak,
    Media,
    Passthrough,
}

impl Handler {
    fn for_tag(tag: &str) -> Handler {
        match tag {
            "i" => Handler::Italic,
            "b" | "strong" => Handler::Bold,
            "u" => Handler::Underline,
            "li" => Handler::ListItem,
            "en-todo" => Handler::Todo,
            "a" => Handler::Link,
            "table" => Handler::Table,
            "tr" => Handler::TableRow,
            "td" | "th" => Handler::TableCell,
            "div" => Handler::Block,
            "hr" => Handler::Rule,
            "ul" => Handler::UnorderedList,
            "ol" => Handler::OrderedList,
            "br" => Handler::LineBreak,
            "en-media" => Handler::Media,
            _ => Handler::Passthrough,
        }
    }

    fn before(self, out: &mut Vec<Token>, elt: &Element, ctx: &RenderContext) -> Result<()> {
        match self {
            Handler::Italic => push_literal(out, "/"),
            Handler::Bold => push_literal(out, "*"),
            Handler::Underline => push_literal(out, "_"),
            Handler::ListItem => {
                out.push(Token::Marker(Marker::ListItem));
                out.push(Token::Marker(Marker::Indent));
            }
            Handler::Todo => push_literal(out, "[ ] "),
            Handler::Link => {
                let href = elt.attr("href").unwrap_or("");
                push_literal(out, &format!("[[{href}]["));
            }
            Handler::Table => push_literal(out, "\n|-"),
            Handler::TableRow => {
                push_literal(out, "\n");
                out.push(Token::Marker(Marker::RowStart));
            }
            Handler::TableCell => push_literal(out, "| "),
            Handler::Block => {
                // Only open a new line when the stream doesn't already end
                // on one. Markers resolve to text that brings its own
                // newline (or none), so only a literal fragment counts.
                if ends_mid_line(out) {
                    push_literal(out, "\n");
                }
            }
            Handler::Rule => push_literal(out, "\n----------\n"),
            Handler::UnorderedList => out.push(Token::Marker(Marker::BeginUnordered)),
            Handler::OrderedList => out.push(Token::Marker(Marker::BeginOrdered)),
            Handler::LineBreak => push_literal(out, "\n"),
            Handler::Media => {
                let hash = elt.attr("hash").ok_or_else(|| {
                    Error::MissingResource("en-media without hash attribute".to_string())
                })?;
                let resource = ctx
                    .resources
                    .get(hash)
                    .ok_or_else(|| Error::MissingResource(hash.to_string()))?;
                push_literal(
                    out,
                    &format!(
                        "[[file:{}/{}][{}]]",
                        ctx.attachment_dir, resource.filename, resource.filename
                    ),
                );
            }
            Handler::Passthrough => {}
        }
        Ok(())
    }

    fn after(self, out: &mut Vec<Token>) {
        match self {
            Handler::Italic => push_literal(out, "/"),
            Handler::Bold => push_literal(out, "*"),
            Handler::Underline => push_literal(out, "_"),
            Handler::ListItem => out.push(Token::Marker(Marker::Dedent)),
            Handler::Link => push_literal(out, "]]"),
            Handler::Table => push_literal(out, "\n|-"),
            Handler::TableRow => out.push(Token::Marker(Marker::RowEnd)),
            Handler::Block => push_literal(out, "\n"),
            Handler::UnorderedList => out.push(Token::Marker(Marker::EndUnordered)),
            Handler::OrderedList => out.push(Token::Marker(Marker::EndOrdered)),
            Handler::Todo
            | Handler::TableCell
            | Handler::Rule
            | Handler::LineBreak
            | Handler::Media
            | Handler::Passthrough => {}
        }
    }

    /// A horizontal rule stands for itself; its content is not descended
    /// into. Everything else wraps its children.
    fn descends(self) -> bool {
        !matches!(self, Handler::Rule)
    }
}

/// Render a note tree into a token stream.
///
/// Pre-order descent: a node's own leading text, then each wrapped child
/// followed by that child's tail. The input tree is not mutated.
pub fn render(root: &Element, ctx: &RenderContext) -> Result<Vec<Token>> {
    let mut out = Vec::new();
    walk(root, ctx, &mut out)?;
    Ok(out)
}

fn walk(elt: &Element, ctx: &RenderContext, out: &mut Vec<Token>) -> Result<()> {
    let handler = Handler::for_tag(&elt.tag);
    handler.before(out, elt, ctx)?;
    if handler.descends() {
        if let Some(text) = &elt.text {
            push_fragment(out, text);
        }
        for child in &elt.children {
            // <div><br/></div> collapses to the single newline the div
            // emits; the break's tail still belongs to the stream.
            if !(handler == Handler::Block && child.tag == "br") {
                walk(child, ctx, out)?;
            }
            if let Some(tail) = &child.tail {
                push_fragment(out, tail);
            }
        }
    }
    handler.after(out);
    Ok(())
}

/// Append handler-produced markup. Newlines here are intentional and kept.
fn push_literal(out: &mut Vec<Token>, s: &str) {
    out.push(Token::Text(s.to_string()));
}

/// Append source text. Embedded newlines are stripped: only markers and
/// handler markup control line breaks in the output.
fn push_fragment(out: &mut Vec<Token>, text: &str) {
    let stripped: String = text.chars().filter(|&c| c != '\n').collect();
    if !stripped.is_empty() {
        out.push(Token::Text(stripped));
    }
}

fn ends_mid_line(out: &[Token]) -> bool {
    match out.last() {
        Some(Token::Text(s)) => !s.is_empty() && !s.ends_with('\n'),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::Resource;

    fn ctx_empty() -> (ResourceTable, String) {
        (ResourceTable::new(), "data/ab/cdef".to_string())
    }

    fn text_elt(tag: &str, text: &str) -> Element {
        Element {
            text: Some(text.to_string()),
            ..Element::new(tag)
        }
    }

    fn render_flat(root: &Element) -> Vec<Token> {
        let (resources, dir) = ctx_empty();
        render(root, &RenderContext::new(&resources, &dir)).unwrap()
    }

    #[test]
    fn test_bold_wraps_text() {
        let tokens = render_flat(&text_elt("b", "loud"));
        assert_eq!(
            tokens,
            vec![
                Token::Text("*".into()),
                Token::Text("loud".into()),
                Token::Text("*".into()),
            ]
        );
    }

    #[test]
    fn test_unknown_tag_is_transparent() {
        let mut root = Element::new("span");
        root.text = Some("plain".to_string());
        root.children.push(text_elt("i", "slanted"));
        let tokens = render_flat(&root);
        assert_eq!(
            tokens,
            vec![
                Token::Text("plain".into()),
                Token::Text("/".into()),
                Token::Text("slanted".into()),
                Token::Text("/".into()),
            ]
        );
    }

    #[test]
    fn test_list_item_emits_markers() {
        let mut ul = Element::new("ul");
        ul.children.push(text_elt("li", "one"));
        let tokens = render_flat(&ul);
        assert_eq!(
            tokens,
            vec![
                Token::Marker(Marker::BeginUnordered),
                Token::Marker(Marker::ListItem),
                Token::Marker(Marker::Indent),
                Token::Text("one".into()),
                Token::Marker(Marker::Dedent),
                Token::Marker(Marker::EndUnordered),
            ]
        );
    }

    #[test]
    fn test_newlines_stripped_from_source_text() {
        let tokens = render_flat(&text_elt("span", "a\nb\nc"));
        assert_eq!(tokens, vec![Token::Text("abc".into())]);
    }

    #[test]
    fn test_tail_text_follows_child() {
        let mut root = Element::new("span");
        let mut child = text_elt("b", "bold");
        child.tail = Some(" after".to_string());
        root.children.push(child);
        let tokens = render_flat(&root);
        assert_eq!(
            tokens,
            vec![
                Token::Text("*".into()),
                Token::Text("bold".into()),
                Token::Text("*".into()),
                Token::Text(" after".into()),
            ]
        );
    }

    #[test]
    fn test_div_br_collapse() {
        let mut div = Element::new("div");
        div.children.push(Element::new("br"));
        let tokens = render_flat(&div);
        // No leading newline (stream is empty), the br is suppressed, and
        // the div's own closing newline remains.
        assert_eq!(tokens, vec![Token::Text("\n".into())]);
    }

    #[test]
    fn test_br_tail_survives_collapse() {
        let mut div = Element::new("div");
        let mut br = Element::new("br");
        br.tail = Some("after".to_string());
        div.children.push(br);
        let tokens = render_flat(&div);
        assert_eq!(
            tokens,
            vec![Token::Text("after".into()), Token::Text("\n".into())]
        );
    }

    #[test]
    fn test_br_outside_div_kept() {
        let mut span = Element::new("span");
        span.text = Some("a".to_string());
        span.children.push(Element::new("br"));
        let tokens = render_flat(&span);
        assert_eq!(
            tokens,
            vec![Token::Text("a".into()), Token::Text("\n".into())]
        );
    }

    #[test]
    fn test_div_opens_line_only_mid_line() {
        let mut root = Element::new("en-note");
        root.text = Some("intro".to_string());
        root.children.push(text_elt("div", "para"));
        let tokens = render_flat(&root);
        assert_eq!(
            tokens,
            vec![
                Token::Text("intro".into()),
                Token::Text("\n".into()),
                Token::Text("para".into()),
                Token::Text("\n".into()),
            ]
        );
    }

    #[test]
    fn test_link_with_href() {
        let mut a = text_elt("a", "click");
        a.attrs
            .insert("href".to_string(), "http://example.com".to_string());
        let tokens = render_flat(&a);
        assert_eq!(
            tokens,
            vec![
                Token::Text("[[http://example.com][".into()),
                Token::Text("click".into()),
                Token::Text("]]".into()),
            ]
        );
    }

    #[test]
    fn test_link_without_href() {
        let tokens = render_flat(&text_elt("a", "bare"));
        assert_eq!(
            tokens,
            vec![
                Token::Text("[[][".into()),
                Token::Text("bare".into()),
                Token::Text("]]".into()),
            ]
        );
    }

    #[test]
    fn test_rule_does_not_descend() {
        let mut hr = Element::new("hr");
        hr.text = Some("ignored".to_string());
        hr.children.push(text_elt("b", "also ignored"));
        let tokens = render_flat(&hr);
        assert_eq!(tokens, vec![Token::Text("\n----------\n".into())]);
    }

    #[test]
    fn test_media_resolves_filename() {
        let mut resources = ResourceTable::new();
        resources.insert(Resource {
            hash: "cafe01".to_string(),
            data: vec![1, 2, 3],
            mime: "image/png".to_string(),
            filename: "photo.png".to_string(),
        });
        let mut media = Element::new("en-media");
        media.attrs.insert("hash".to_string(), "cafe01".to_string());
        let ctx = RenderContext::new(&resources, "data/ab/cdef");
        let tokens = render(&media, &ctx).unwrap();
        assert_eq!(
            tokens,
            vec![Token::Text(
                "[[file:data/ab/cdef/photo.png][photo.png]]".into()
            )]
        );
    }

    #[test]
    fn test_media_unknown_hash_errors() {
        let (resources, dir) = ctx_empty();
        let mut media = Element::new("en-media");
        media.attrs.insert("hash".to_string(), "f00d".to_string());
        let err = render(&media, &RenderContext::new(&resources, &dir)).unwrap_err();
        assert!(matches!(err, Error::MissingResource(h) if h == "f00d"));
    }

    #[test]
    fn test_media_without_hash_errors() {
        let (resources, dir) = ctx_empty();
        let media = Element::new("en-media");
        let err = render(&media, &RenderContext::new(&resources, &dir)).unwrap_err();
        assert!(matches!(err, Error::MissingResource(_)));
    }
}
