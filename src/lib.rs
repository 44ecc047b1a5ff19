//! # ciftext - CIF/mmCIF Text Parsing
//!
//! `ciftext` reads the textual Crystallographic Information File format (CIF
//! 1.1 and the macromolecular mmCIF dialect) into a uniform data model:
//! a [`CifFile`] holds [`CifBlock`]s, each with categories and optional save
//! frames, and every category is a table of equally long [`CifField`] columns.
//!
//! ## Key Features
//!
//! - **Zero-copy**: values are byte spans into the caller's buffer and are
//!   only decoded when accessed.
//! - **Uniform model**: single-row `_name.field value` runs and `loop_`
//!   tables produce the same column representation.
//! - **Cooperative**: long loops are read in chunks with progress reports
//!   and cancellation at every chunk boundary.
//! - **Line-numbered errors**: the first structural error aborts the parse
//!   and reports where it happened.
//!
//! ## Quick Start
//!
//! ```rust
//! let text = "data_1ABC\n_cell.length_a 50.0\nloop_\n_atom_site.id\n_atom_site.type_symbol\n1 N\n2 C\n";
//! let file = ciftext::parse(text)?;
//!
//! let block = file.block("1ABC").unwrap();
//! let atoms = block.category("atom_site").unwrap();
//! assert_eq!(atoms.row_count(), 2);
//! assert_eq!(atoms.field("type_symbol").unwrap().str(1), "C");
//! assert_eq!(block.category("cell").unwrap().field("length_a").unwrap().float(0), Some(50.0));
//! # Ok::<(), ciftext::ReaderError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`text`]: tokenizer, category readers, block assembly and the writer
//! - [`data`]: the block/frame/category/field data model
//! - [`task`]: chunked execution, progress and cancellation
//! - [`config`]: chunking and progress settings
//! - [`pdb`]: PDB fixed-column records to an mmCIF `atom_site` frame
//! - [`summary`]: serializable overview of a parsed file
//! - [`io`]: loading text from disk, optionally gzip-compressed

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod data;
pub mod io;
pub mod pdb;
pub mod summary;
pub mod task;
pub mod text;

pub use config::ParserConfig;
pub use data::{CifBlock, CifCategory, CifField, CifFile, CifFrame, ValuePresence};
pub use text::{parse, parse_with, CifParseError, ReaderError, ReaderResult};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::config::ParserConfig;
    pub use crate::data::{
        CifBlock, CifCategory, CifField, CifFile, CifFrame, DataError, ValuePresence,
    };
    pub use crate::io::{read_text, LoadError};
    pub use crate::pdb::pdb_to_mmcif;
    pub use crate::summary::FileSummary;
    pub use crate::task::{CancellationToken, Progress, RuntimeContext};
    pub use crate::text::{
        parse, parse_with, write_file, CifParseError, CifWriter, ReaderError, ReaderResult,
    };
}
