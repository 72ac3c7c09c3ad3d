//! Org entry assembly: heading line, property drawer, body.

use crate::note::Note;

/// Column the tag block is aligned to on heading lines.
const TAG_COLUMN: usize = 75;

/// Build the `* Title …:tag1:tag2:` heading line, newline-terminated.
///
/// With tags, the title is right-padded so title plus tag block reach
/// [`TAG_COLUMN`], but never with fewer than one space. Widths are counted
/// in characters, matching how Org aligns the tag column.
pub fn heading_line(title: &str, tags: &[String]) -> String {
    if tags.is_empty() {
        return format!("* {title}\n");
    }
    let tag_block = format!(":{}:", tags.join(":"));
    let width = title.chars().count() + tag_block.chars().count();
    let padding = TAG_COLUMN.saturating_sub(width).max(1);
    format!("* {title}{}{tag_block}\n", " ".repeat(padding))
}

/// Build the `:PROPERTIES:` drawer listing attachments and the note id.
pub fn property_drawer(filenames: &[&str], id: &str) -> String {
    format!(
        ":PROPERTIES:\n:Attachments: {}\n:ID:       {}\n:END:\n",
        filenames.join(" "),
        id
    )
}

/// Assemble a complete Org entry for a note whose body has been rendered.
///
/// Notes with resources gain the `ATTACH` tag and a property drawer naming
/// the extracted files in table order.
pub fn format_note(note: &Note, body: &str) -> String {
    let mut tags = note.tags.clone();
    if !note.resources.is_empty() {
        tags.push("ATTACH".to_string());
    }

    let mut out = heading_line(&note.title, &tags);

    if !note.resources.is_empty() {
        let filenames: Vec<&str> = note.resources.iter().map(|r| r.filename.as_str()).collect();
        out.push_str(&property_drawer(&filenames, &note.id));
    }

    out.push_str(body);
    out.push('\n');
    out
}
