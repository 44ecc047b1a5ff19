//! # CIF Text Format
//!
//! Reading and writing the textual CIF/mmCIF syntax.
//!
//! - [`tokenizer`]: zero-copy character-level scanner
//! - [`tokens`]: span buffers over the shared source text
//! - [`parser`]: category readers and block/save-frame assembly
//! - [`writer`]: serialization of the data model back to CIF text
//!
//! ```text
//! data_1ABC                       <- block header
//! _cell.length_a 50.0             <- single-row category
//! _cell.length_b 60.0
//! loop_                           <- multi-row category
//! _atom_site.id
//! _atom_site.type_symbol
//! 1 N
//! 2 C
//! save_frame                      <- save frame (dictionaries)
//! _item.name '_cell.length_a'
//! save_
//! ```

pub mod parser;
pub mod tokenizer;
pub mod tokens;
pub mod writer;

pub use parser::{parse, parse_with, CifParseError, ReaderError, ReaderResult};
pub use tokenizer::{Token, TokenType, TokenizerState};
pub use tokens::TokenBuilder;
pub use writer::{write_file, CifWriter};
