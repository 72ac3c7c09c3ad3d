//! ENEX archive reading: container records, ENML parsing, and attachment
//! decoding.
//!
//! - [`reader`]: lazy `<note>` record iteration over the container XML
//! - [`enml`]: `<content>` blob → [`Element`](crate::note::Element) tree
//! - [`parse_note`]: record → fully decoded [`Note`]

pub mod enml;
pub mod reader;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use md5::{Digest, Md5};
use uuid::Uuid;

use crate::error::Result;
use crate::note::{Note, Resource, ResourceTable};

pub use enml::parse_enml;
pub use reader::{Notes, RawAttachment, RawNote, notes};

/// MIME type assumed for resources whose `<mime>` element is absent.
const FALLBACK_MIME: &str = "application/octet-stream";

/// Turn a raw container record into a fully decoded note.
///
/// Parses the ENML body, decodes attachments into a [`ResourceTable`], and
/// assigns the note its identifier and attachment directory
/// (`data/<id[..2]>/<id[2..]>`, the layout org-attach expects).
pub fn parse_note(raw: RawNote) -> Result<Note> {
    let content = parse_enml(&raw.content)?;
    let resources = decode_attachments(&raw.attachments)?;
    let id = Uuid::new_v4().to_string();
    let attachment_dir = format!("data/{}/{}", &id[..2], &id[2..]);
    Ok(Note {
        title: raw.title,
        tags: raw.tags,
        content,
        resources,
        source_url: raw.source_url,
        id,
        attachment_dir,
    })
}

/// Decode a note's attachments into an insertion-ordered resource table.
///
/// Payloads are base64 (line wrapping tolerated); the content hash is the
/// hex MD5 of the decoded bytes, which is also what `<en-media hash="…">`
/// references. Filenames fall back to `<hash>.<mime subtype>` and are
/// deduplicated by the table.
pub fn decode_attachments(attachments: &[RawAttachment]) -> Result<ResourceTable> {
    let mut table = ResourceTable::new();
    for attachment in attachments {
        let compact: Vec<u8> = attachment
            .data
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        let data = BASE64.decode(&compact)?;
        let hash = hex::encode(Md5::digest(&data));
        let mime = attachment.mime.as_deref().unwrap_or(FALLBACK_MIME);
        let filename = match &attachment.filename {
            Some(name) => name.clone(),
            None => format!("{hash}.{}", mime_subtype(mime)),
        };
        table.insert(Resource {
            hash,
            data,
            mime: mime.to_string(),
            filename,
        });
    }
    Ok(table)
}

fn mime_subtype(mime: &str) -> &str {
    match mime.split_once('/') {
        Some((_, subtype)) if !subtype.is_empty() => subtype,
        _ => "octet-stream",
    }
}

/// Extract local name from a namespaced XML name (e.g. `en:note` -> `note`).
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

/// Resolve XML entity references.
pub(crate) fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    if let Some(hex_digits) = entity.strip_prefix("#x") {
        if let Ok(code) = u32::from_str_radix(hex_digits, 16)
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
    } else if let Some(dec) = entity.strip_prefix('#')
        && let Ok(code) = dec.parse::<u32>()
        && let Some(c) = char::from_u32(code)
    {
        return Some(c.to_string());
    }

    None
}
