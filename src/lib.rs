//! # enorg
//!
//! A fast, lightweight library for converting Evernote exports (ENEX) to
//! Org-mode.
//!
//! ## Features
//!
//! - Streams `<note>` records out of `.enex` archives
//! - Renders ENML rich text to Org markup (lists, tables, emphasis, links)
//! - Extracts binary attachments into org-attach directory layout
//! - Archives web-clipped notes as standalone HTML
//!
//! ## Quick Start
//!
//! ```no_run
//! // Convert a whole archive
//! let summary = enorg::convert("notes.enex", "out").unwrap();
//! println!("{} notes, {} attachments", summary.notes, summary.attachments);
//! ```
//!
//! ## Working with notes
//!
//! The pipeline stages are exposed individually for callers that want
//! finer control than [`convert`]:
//!
//! ```no_run
//! use enorg::org::{RenderContext, render, resolve, format_note};
//!
//! for raw in enorg::notes("notes.enex")? {
//!     let note = enorg::parse_note(raw?)?;
//!     let ctx = RenderContext::new(&note.resources, &note.attachment_dir);
//!     let body = resolve(&render(&note.content, &ctx)?)?;
//!     print!("{}", format_note(&note, &body));
//! }
//! # Ok::<(), enorg::Error>(())
//! ```

pub mod enex;
pub mod error;
pub mod export;
pub mod note;
pub mod org;
pub(crate) mod util;

pub use enex::{Notes, RawAttachment, RawNote, notes, parse_note};
pub use error::{Error, Result};
pub use export::{Summary, convert};
pub use note::{Element, Note, Resource, ResourceTable};
