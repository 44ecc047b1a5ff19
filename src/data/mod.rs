//! # CIF Data Model
//!
//! A format-agnostic, read-only tree of parsed CIF content:
//!
//! ```text
//! CifFile
//! └── CifBlock* (data_NAME)
//!     ├── CifFrame (top-level categories)
//!     │   └── CifCategory* (_name.*)
//!     │       └── CifField* (one column, row_count values)
//!     └── CifFrame* (save_NAME frames)
//! ```
//!
//! Field values are spans into the source text, so a [`CifFile`] borrows the
//! buffer it was parsed from. Category and field order is the order in which
//! they first appeared in the input.

use indexmap::IndexMap;

mod field;


pub use field::{CifField, FieldIter, ValuePresence};

/// Errors raised when assembling the data model by hand.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// A field's length disagrees with the other fields of its category
    #[error("Field '{field}' of category '{category}' has {found} rows, expected {expected}")]
    RowCountMismatch {
        /// Category name
        category: String,
        /// Offending field name
        field: String,
        /// Row count of the first field
        expected: usize,
        /// Row count of the offending field
        found: usize,
    },
}

/// A named table of equally long fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CifCategory<'a> {
    name: String,
    row_count: usize,
    fields: IndexMap<String, CifField<'a>>,
}

impl<'a> CifCategory<'a> {
    /// Build a category without checking field lengths.
    pub(crate) fn new(
        name: impl Into<String>,
        row_count: usize,
        fields: IndexMap<String, CifField<'a>>,
    ) -> Self {
        Self {
            name: name.into(),
            row_count,
            fields,
        }
    }

    /// Build a category from fields in the given order.
    ///
    /// Every field must have the same number of rows. A category without
    /// fields has zero rows.
    pub fn of_fields<I, S>(name: impl Into<String>, fields: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = (S, CifField<'a>)>,
        S: Into<String>,
    {
        let name = name.into();
        let fields: IndexMap<String, CifField<'a>> =
            fields.into_iter().map(|(k, v)| (k.into(), v)).collect();

        let row_count = fields.values().next().map_or(0, CifField::row_count);
        if let Some((field, value)) = fields.iter().find(|(_, f)| f.row_count() != row_count) {
            return Err(DataError::RowCountMismatch {
                category: name,
                field: field.clone(),
                expected: row_count,
                found: value.row_count(),
            });
        }
        Ok(Self::new(name, row_count, fields))
    }

    /// Category name without the leading underscore.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows; every field has exactly this many values.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Field names in first-seen order.
    pub fn field_names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.fields.keys().map(String::as_str)
    }

    /// Look up a field by name (case-sensitive).
    pub fn field(&self, name: &str) -> Option<&CifField<'a>> {
        self.fields.get(name)
    }

    /// Iterate over `(name, field)` pairs in first-seen order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = (&str, &CifField<'a>)> + '_ {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// An ordered collection of categories under a header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CifFrame<'a> {
    header: String,
    categories: IndexMap<String, CifCategory<'a>>,
}

impl<'a> CifFrame<'a> {
    /// Create an empty frame.
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            categories: IndexMap::new(),
        }
    }

    /// Add a category, keyed by its name.
    ///
    /// A repeated name replaces the earlier category but keeps its position.
    pub fn push_category(&mut self, category: CifCategory<'a>) {
        if let Some(previous) = self.categories.insert(category.name.clone(), category) {
            log::warn!(
                "Category '{}' redefined in frame '{}'",
                previous.name,
                self.header
            );
        }
    }

    /// Block or save-frame name; empty for the implicit top frame.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Returns `true` if no category was added.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Number of categories.
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Category names in first-seen order.
    pub fn category_names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.categories.keys().map(String::as_str)
    }

    /// Look up a category by name, without the leading underscore.
    pub fn category(&self, name: &str) -> Option<&CifCategory<'a>> {
        self.categories.get(name)
    }

    /// Iterate over categories in first-seen order.
    pub fn categories(&self) -> impl ExactSizeIterator<Item = &CifCategory<'a>> + '_ {
        self.categories.values()
    }
}

/// A `data_` block: top-level categories plus its save frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CifBlock<'a> {
    frame: CifFrame<'a>,
    save_frames: Vec<CifFrame<'a>>,
}

impl<'a> CifBlock<'a> {
    /// Seal a block from its top-level frame and save frames.
    pub fn new(frame: CifFrame<'a>, save_frames: Vec<CifFrame<'a>>) -> Self {
        Self { frame, save_frames }
    }

    /// Block name (the text after `data_`).
    pub fn header(&self) -> &str {
        self.frame.header()
    }

    /// The top-level categories of this block.
    pub fn frame(&self) -> &CifFrame<'a> {
        &self.frame
    }

    /// Category names in first-seen order.
    pub fn category_names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.frame.category_names()
    }

    /// Look up a top-level category by name.
    pub fn category(&self, name: &str) -> Option<&CifCategory<'a>> {
        self.frame.category(name)
    }

    /// Iterate over top-level categories in first-seen order.
    pub fn categories(&self) -> impl ExactSizeIterator<Item = &CifCategory<'a>> + '_ {
        self.frame.categories()
    }

    /// Save frames in input order.
    pub fn save_frames(&self) -> &[CifFrame<'a>] {
        &self.save_frames
    }

    /// Look up a save frame by header.
    pub fn save_frame(&self, header: &str) -> Option<&CifFrame<'a>> {
        self.save_frames.iter().find(|f| f.header() == header)
    }
}

/// A parsed CIF document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CifFile<'a> {
    blocks: Vec<CifBlock<'a>>,
}

impl<'a> CifFile<'a> {
    /// Create a document from sealed blocks.
    pub fn new(blocks: Vec<CifBlock<'a>>) -> Self {
        Self { blocks }
    }

    /// Blocks in input order.
    pub fn blocks(&self) -> &[CifBlock<'a>] {
        &self.blocks
    }

    /// Look up a block by header (case-sensitive).
    pub fn block(&self, header: &str) -> Option<&CifBlock<'a>> {
        self.blocks.iter().find(|b| b.header() == header)
    }

    /// Returns `true` if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
