use std::collections::HashMap;

/// Intermediate representation of a note.
/// Format-agnostic structure that the ENEX reader produces and the Org
/// renderer and HTML exporter consume.
#[derive(Debug, Clone)]
pub struct Note {
    pub title: String,
    pub tags: Vec<String>,
    /// Parsed ENML body (the `<en-note>` element).
    pub content: Element,
    pub resources: ResourceTable,
    pub source_url: Option<String>,
    /// Generated identifier, also written as the `:ID:` property.
    pub id: String,
    /// Attachment directory relative to the output root, forward-slash
    /// separated (used verbatim inside Org `file:` links).
    pub attachment_dir: String,
}

/// A node in the parsed ENML document tree.
///
/// Text placement follows the tree shape the renderer walks: `text` is the
/// fragment before the first child, `tail` the fragment between this node's
/// end tag and the next sibling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: HashMap<String, String>,
    pub text: Option<String>,
    pub tail: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Get an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// A decoded binary attachment.
#[derive(Debug, Clone)]
pub struct Resource {
    /// Hex MD5 of `data`; the key `<en-media hash="…">` references.
    pub hash: String,
    pub data: Vec<u8>,
    pub mime: String,
    /// Display filename, unique within the owning note.
    pub filename: String,
}

/// Insertion-ordered resource collection with hash lookup.
///
/// Iteration order is first-seen document order, which drives both filename
/// collision resolution and the `:Attachments:` property listing.
#[derive(Debug, Clone, Default)]
pub struct ResourceTable {
    entries: Vec<Resource>,
    by_hash: HashMap<String, usize>,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resource, uniquifying its filename against earlier entries.
    ///
    /// A resource whose hash is already present is dropped (same bytes,
    /// already decoded). Colliding filenames get `_<n>` appended before the
    /// extension: `img.png`, `img_1.png`, `img_2.png`, …
    pub fn insert(&mut self, mut resource: Resource) {
        if self.by_hash.contains_key(&resource.hash) {
            return;
        }
        resource.filename = self.unique_filename(&resource.filename);
        self.by_hash
            .insert(resource.hash.clone(), self.entries.len());
        self.entries.push(resource);
    }

    /// Look up a resource by content hash.
    pub fn get(&self, hash: &str) -> Option<&Resource> {
        self.by_hash.get(hash).map(|&i| &self.entries[i])
    }

    /// Iterate resources in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn unique_filename(&self, want: &str) -> String {
        if !self.filename_taken(want) {
            return want.to_string();
        }
        let (stem, ext) = split_extension(want);
        let mut n = 1;
        loop {
            let candidate = format!("{stem}_{n}{ext}");
            if !self.filename_taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn filename_taken(&self, name: &str) -> bool {
        self.entries.iter().any(|r| r.filename == name)
    }
}

/// Split `img.png` into (`img`, `.png`). Names without an extension (or
/// dotfiles like `.profile`) split as (whole, "").
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) if i > 0 => name.split_at(i),
        _ => (name, ""),
    }
}
