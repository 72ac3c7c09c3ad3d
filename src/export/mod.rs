//! Conversion driver and filesystem sink.
//!
//! The org modules are pure string producers; this layer owns all I/O:
//! iterating the archive, extracting attachments under
//! `data/<id[..2]>/<id[2..]>`, and appending entries to the `.org` file.

pub mod html;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::enex;
use crate::error::{Error, Result};
use crate::note::Note;
use crate::org::{RenderContext, format_note, heading_line, property_drawer, render, resolve};

pub use html::enml_to_xhtml;

/// Counts reported after a conversion run.
#[derive(Debug, Clone, Copy, Default)]
pub struct Summary {
    pub notes: usize,
    pub attachments: usize,
}

/// Convert an ENEX archive into `<output_dir>/<input stem>.org` plus
/// extracted attachments.
///
/// The output directory must not exist yet; it is created, and all writes
/// happen beneath it. Any note that fails to parse or render aborts the
/// run - a partial `.org` file is possible on error, but never a silently
/// truncated one.
///
/// # Example
///
/// ```no_run
/// let summary = enorg::convert("notes.enex", "out")?;
/// println!("{} notes converted", summary.notes);
/// # Ok::<(), enorg::Error>(())
/// ```
pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output_dir: Q) -> Result<Summary> {
    let input = input.as_ref();
    let output_dir = output_dir.as_ref();

    if output_dir.exists() {
        return Err(Error::OutputDirExists(output_dir.to_path_buf()));
    }
    fs::create_dir_all(output_dir)?;

    let mut org_file = File::create(output_dir.join(org_file_name(input)))?;
    let mut summary = Summary::default();

    for raw in enex::notes(input)? {
        let note = enex::parse_note(raw?)?;
        let entry = if note.source_url.is_some() {
            export_clipped(&note, output_dir, &mut summary)?
        } else {
            export_rendered(&note, output_dir, &mut summary)?
        };
        org_file.write_all(entry.as_bytes())?;
        summary.notes += 1;
    }

    org_file.flush()?;
    Ok(summary)
}

/// Regular note: render the ENML body to Org, write attachments verbatim.
fn export_rendered(note: &Note, output_dir: &Path, summary: &mut Summary) -> Result<String> {
    let ctx = RenderContext::new(&note.resources, &note.attachment_dir);
    let tokens = render(&note.content, &ctx)?;
    let body = resolve(&tokens)?;

    if !note.resources.is_empty() {
        let dir = output_dir.join(&note.attachment_dir);
        fs::create_dir_all(&dir)?;
        for resource in note.resources.iter() {
            fs::write(dir.join(&resource.filename), &resource.data)?;
            summary.attachments += 1;
        }
    }

    Ok(format_note(note, &body))
}

/// Web-clipped note: archive the body as `original.html` and point the Org
/// entry at it, alongside whatever attachments weren't inlined.
fn export_clipped(note: &Note, output_dir: &Path, summary: &mut Summary) -> Result<String> {
    let (used, html) = enml_to_xhtml(&note.content, &note.resources)?;

    let dir = output_dir.join(&note.attachment_dir);
    fs::create_dir_all(&dir)?;
    fs::write(dir.join("original.html"), html.as_bytes())?;
    summary.attachments += 1;

    let mut filenames = vec!["original.html".to_string()];
    for resource in note.resources.iter() {
        if used.contains(&resource.hash) {
            continue;
        }
        fs::write(dir.join(&resource.filename), &resource.data)?;
        filenames.push(resource.filename.clone());
        summary.attachments += 1;
    }

    let mut tags = note.tags.clone();
    tags.push("ATTACH".to_string());
    let names: Vec<&str> = filenames.iter().map(String::as_str).collect();

    let mut entry = heading_line(&note.title, &tags);
    entry.push_str(&property_drawer(&names, &note.id));
    entry.push_str(&format!(
        "See [[file:{}/original.html][original.html]] in attachments. [[{}][Source URL]]\n",
        note.attachment_dir,
        note.source_url.as_deref().unwrap_or_default()
    ));
    Ok(entry)
}

/// Output filename: the input's name with a final `.enex` swapped for
/// `.org` (other extensions are kept, mirroring how exports are named).
fn org_file_name(input: &Path) -> String {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "notes".to_string());
    let stem = name.strip_suffix(".enex").unwrap_or(&name);
    format!("{stem}.org")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_org_file_name() {
        assert_eq!(org_file_name(Path::new("a/b/notes.enex")), "notes.org");
        assert_eq!(org_file_name(Path::new("export.xml")), "export.xml.org");
        assert_eq!(org_file_name(Path::new("plain")), "plain.org");
    }
}
