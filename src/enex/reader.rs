//! Streaming ENEX container reading.
//!
//! An `.enex` export is a flat XML document of `<note>` records. [`notes`]
//! returns a lazy iterator over those records; each call re-opens the file,
//! so the sequence is restartable. Record fields are captured raw here -
//! ENML parsing and attachment decoding happen later, per note.

use std::io::Cursor;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{Error, Result};
use crate::util::{decode_text, strip_bom};

use super::{local_name, resolve_entity};

/// One `<note>` record, fields still in wire form.
#[derive(Debug, Clone)]
pub struct RawNote {
    pub title: String,
    pub tags: Vec<String>,
    /// The ENML body, exactly as embedded in the `<content>` CDATA.
    pub content: String,
    pub attachments: Vec<RawAttachment>,
    pub source_url: Option<String>,
}

/// One `<resource>` record: base64 payload text plus metadata.
#[derive(Debug, Clone)]
pub struct RawAttachment {
    /// Base64 payload, possibly wrapped across lines.
    pub data: String,
    pub mime: Option<String>,
    pub filename: Option<String>,
}

/// Open an ENEX file and iterate its note records lazily.
///
/// The file is decoded up front (UTF-8, falling back to Windows-1252 for
/// legacy exports) and parsed incrementally as the iterator advances.
pub fn notes<P: AsRef<Path>>(path: P) -> Result<Notes> {
    let bytes = std::fs::read(path)?;
    let content = decode_text(strip_bom(&bytes)).into_owned();
    Ok(Notes {
        reader: Reader::from_reader(Cursor::new(content.into_bytes())),
    })
}

/// Lazy iterator over the `<note>` records of one archive.
#[derive(Debug)]
pub struct Notes {
    reader: Reader<Cursor<Vec<u8>>>,
}

impl Iterator for Notes {
    type Item = Result<RawNote>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match self.reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) if local_name(e.name().as_ref()) == b"note" => {
                    return Some(self.read_note());
                }
                Ok(Event::Eof) => return None,
                Err(e) => return Some(Err(Error::Xml(e))),
                _ => {}
            }
        }
    }
}

impl Notes {
    fn read_note(&mut self) -> Result<RawNote> {
        let mut buf = Vec::new();
        let mut title: Option<String> = None;
        let mut tags: Vec<String> = Vec::new();
        let mut content: Option<String> = None;
        let mut attachments: Vec<RawAttachment> = Vec::new();
        let mut source_url: Option<String> = None;

        loop {
            buf.clear();
            match self.reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => match local_name(e.name().as_ref()) {
                    b"title" => title = Some(self.read_text(b"title")?),
                    b"tag" => {
                        let tag = self.read_text(b"tag")?;
                        if !tag.is_empty() {
                            tags.push(tag);
                        }
                    }
                    b"content" => content = Some(self.read_text(b"content")?),
                    b"resource" => attachments.push(self.read_resource()?),
                    b"source-url" => {
                        let url = self.read_text(b"source-url")?;
                        if !url.is_empty() {
                            source_url = Some(url);
                        }
                    }
                    _ => {}
                },
                Event::End(ref e) if local_name(e.name().as_ref()) == b"note" => break,
                Event::Eof => {
                    return Err(Error::InvalidEnex("unterminated <note> record".to_string()));
                }
                _ => {}
            }
        }

        Ok(RawNote {
            title: title.ok_or_else(|| Error::MissingElement("title".to_string()))?,
            tags,
            content: content.ok_or_else(|| Error::MissingElement("content".to_string()))?,
            attachments,
            source_url,
        })
    }

    fn read_resource(&mut self) -> Result<RawAttachment> {
        let mut buf = Vec::new();
        let mut data = String::new();
        let mut mime: Option<String> = None;
        let mut filename: Option<String> = None;

        loop {
            buf.clear();
            match self.reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => match local_name(e.name().as_ref()) {
                    b"data" => data = self.read_text(b"data")?,
                    b"mime" => {
                        let m = self.read_text(b"mime")?;
                        if !m.is_empty() {
                            mime = Some(m);
                        }
                    }
                    b"file-name" => {
                        let f = self.read_text(b"file-name")?;
                        if !f.is_empty() {
                            filename = Some(f);
                        }
                    }
                    _ => {}
                },
                Event::End(ref e) if local_name(e.name().as_ref()) == b"resource" => break,
                Event::Eof => {
                    return Err(Error::InvalidEnex(
                        "unterminated <resource> record".to_string(),
                    ));
                }
                _ => {}
            }
        }

        Ok(RawAttachment {
            data,
            mime,
            filename,
        })
    }

    /// Accumulate character data until the named end tag.
    fn read_text(&mut self, end: &[u8]) -> Result<String> {
        let mut buf = Vec::new();
        let mut out = String::new();
        loop {
            buf.clear();
            match self.reader.read_event_into(&mut buf)? {
                Event::Text(ref e) => out.push_str(&String::from_utf8_lossy(e.as_ref())),
                Event::CData(ref e) => out.push_str(&String::from_utf8_lossy(e.as_ref())),
                Event::GeneralRef(ref e) => {
                    if let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref())) {
                        out.push_str(&resolved);
                    }
                }
                Event::End(ref e) if local_name(e.name().as_ref()) == end => break,
                Event::Eof => {
                    return Err(Error::InvalidEnex(format!(
                        "unterminated <{}> element",
                        String::from_utf8_lossy(end)
                    )));
                }
                _ => {}
            }
        }
        Ok(out)
    }
}
