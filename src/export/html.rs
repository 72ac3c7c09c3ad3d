//! ENML → XHTML conversion for web-clipped notes.
//!
//! Notes captured from the web keep their original look better as archived
//! HTML than as Org markup, so their ENML tree is rewritten to plain XHTML
//! with attachments inlined as data URIs. Returns the hashes of the
//! resources that were inlined, so the caller can skip writing those out as
//! separate attachment files.

use std::collections::HashSet;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::{Error, Result};
use crate::note::{Element, ResourceTable};

/// Serialize a note tree as XHTML, inlining referenced resources.
pub fn enml_to_xhtml(root: &Element, resources: &ResourceTable) -> Result<(HashSet<String>, String)> {
    let mut used = HashSet::new();
    let mut out = String::new();
    write_element(&mut out, root, resources, &mut used)?;
    Ok((used, out))
}

fn write_element(
    out: &mut String,
    elt: &Element,
    resources: &ResourceTable,
    used: &mut HashSet<String>,
) -> Result<()> {
    let mut tag = elt.tag.as_str();
    let mut attrs: Vec<(&str, String)> = elt
        .attrs
        .iter()
        .map(|(k, v)| (k.as_str(), v.clone()))
        .collect();
    let mut text_override: Option<&str> = None;

    match elt.tag.as_str() {
        "en-note" => tag = "body",
        "en-crypt" | "en-todo" => tag = "div",
        "en-media" => {
            let hash = elt.attr("hash").ok_or_else(|| {
                Error::MissingResource("en-media without hash attribute".to_string())
            })?;
            let resource = resources
                .get(hash)
                .ok_or_else(|| Error::MissingResource(hash.to_string()))?;
            used.insert(hash.to_string());

            let mime = elt.attr("type").unwrap_or(&resource.mime);
            let data_uri = format!("data:{mime};base64,{}", BASE64.encode(&resource.data));
            if mime.starts_with("image/") {
                tag = "img";
                attrs.push(("src", data_uri));
            } else {
                tag = "a";
                attrs.push(("href", data_uri));
                text_override = Some(&resource.filename);
            }
        }
        _ => {}
    }

    // HashMap iteration order is arbitrary; sort so output is stable.
    attrs.sort_by(|a, b| a.0.cmp(b.0));

    out.push('<');
    out.push_str(tag);
    for (key, value) in &attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape_xml(value));
        out.push('"');
    }

    let text = text_override.or(elt.text.as_deref());
    if text.is_none() && elt.children.is_empty() {
        out.push_str("/>");
        return Ok(());
    }

    out.push('>');
    if let Some(text) = text {
        out.push_str(&escape_xml(text));
    }
    for child in &elt.children {
        write_element(out, child, resources, used)?;
        if let Some(tail) = &child.tail {
            out.push_str(&escape_xml(tail));
        }
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
    Ok(())
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
