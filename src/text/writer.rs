//! CIF text writer.
//!
//! Serializes the data model back to CIF text that parses into the same
//! blocks, categories, fields and values. Layout and quoting are normalized:
//! single-row categories become aligned `_name.field value` pairs, everything
//! else a `loop_`, and every value gets the least intrusive quoting that
//! survives a round trip.

use std::fmt::{self, Write};

use crate::data::{CifBlock, CifCategory, CifField, CifFile, CifFrame};

/// How a value is spelled in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoded<'v> {
    Bare(&'v str),
    Quoted(char, &'v str),
    TextField(&'v str),
}

fn looks_like_keyword(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() >= 5
        && bytes[4] == b'_'
        && [b"data", b"save", b"loop"]
            .iter()
            .any(|k| bytes[..4].eq_ignore_ascii_case(&k[..]))
}

fn needs_quotes(value: &str, escaped: bool) -> bool {
    match value.as_bytes().first() {
        None => true,
        Some(b'_' | b'#' | b'$' | b'\'' | b'"' | b'[' | b']' | b';') => true,
        Some(_) => {
            (escaped && (value == "." || value == "?"))
                || value.contains([' ', '\t'])
                || looks_like_keyword(value)
        }
    }
}

/// A quote only closes a value when followed by whitespace.
fn can_quote(value: &str, quote: u8) -> bool {
    !value
        .as_bytes()
        .windows(2)
        .any(|w| w[0] == quote && matches!(w[1], b' ' | b'\t'))
}

fn encode(value: &str, escaped: bool) -> Encoded<'_> {
    if value.contains(['\n', '\r']) {
        Encoded::TextField(value)
    } else if !needs_quotes(value, escaped) {
        Encoded::Bare(value)
    } else if can_quote(value, b'\'') {
        Encoded::Quoted('\'', value)
    } else if can_quote(value, b'"') {
        Encoded::Quoted('"', value)
    } else {
        Encoded::TextField(value)
    }
}

fn data_name(category: &str, field: &str) -> String {
    if field.is_empty() {
        format!("_{category}")
    } else {
        format!("_{category}.{field}")
    }
}

/// Streaming CIF writer over any [`fmt::Write`] sink.
pub struct CifWriter<W: Write> {
    out: W,
    /// Whether the current output line already has content.
    line_open: bool,
}

impl<W: Write> CifWriter<W> {
    /// Create a writer appending to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            line_open: false,
        }
    }

    /// Return the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write every block of `file`.
    pub fn write_file(&mut self, file: &CifFile<'_>) -> fmt::Result {
        for block in file.blocks() {
            self.write_block(block)?;
        }
        Ok(())
    }

    /// Write a `data_` block with its save frames.
    pub fn write_block(&mut self, block: &CifBlock<'_>) -> fmt::Result {
        writeln!(self.out, "data_{}", block.header())?;
        self.write_categories(block.frame())?;
        for frame in block.save_frames() {
            writeln!(self.out, "save_{}", frame.header())?;
            self.write_categories(frame)?;
            writeln!(self.out, "save_")?;
        }
        Ok(())
    }

    fn write_categories(&mut self, frame: &CifFrame<'_>) -> fmt::Result {
        for category in frame.categories().filter(|c| c.row_count() > 0) {
            writeln!(self.out, "#")?;
            self.write_category(category)?;
        }
        Ok(())
    }

    /// Write one category, as name/value pairs if it has exactly one row.
    ///
    /// Categories without rows are skipped: a `loop_` with no values would
    /// take the data names that follow it as additional columns.
    pub fn write_category(&mut self, category: &CifCategory<'_>) -> fmt::Result {
        if category.row_count() == 0 {
            return Ok(());
        }
        if category.row_count() == 1 {
            self.write_single(category)
        } else {
            self.write_loop(category)
        }
    }

    fn write_single(&mut self, category: &CifCategory<'_>) -> fmt::Result {
        let names: Vec<String> = category
            .field_names()
            .map(|f| data_name(category.name(), f))
            .collect();
        let width = names.iter().map(String::len).max().unwrap_or(0);

        for (name, (_, field)) in names.iter().zip(category.fields()) {
            match encode(field.str(0), field.is_escaped(0)) {
                Encoded::TextField(text) => {
                    writeln!(self.out, "{name}")?;
                    self.write_text_field(text)?;
                }
                other => {
                    write!(self.out, "{name:<width$} ")?;
                    self.write_inline(other)?;
                    writeln!(self.out)?;
                }
            }
        }
        Ok(())
    }

    fn write_loop(&mut self, category: &CifCategory<'_>) -> fmt::Result {
        writeln!(self.out, "loop_")?;
        for field in category.field_names() {
            writeln!(self.out, "{}", data_name(category.name(), field))?;
        }

        let fields: Vec<&CifField<'_>> = category.fields().map(|(_, f)| f).collect();
        for row in 0..category.row_count() {
            for field in &fields {
                match encode(field.str(row), field.is_escaped(row)) {
                    Encoded::TextField(text) => {
                        if self.line_open {
                            writeln!(self.out)?;
                        }
                        self.write_text_field(text)?;
                    }
                    other => {
                        if self.line_open {
                            self.out.write_char(' ')?;
                        }
                        self.write_inline(other)?;
                        self.line_open = true;
                    }
                }
            }
            if self.line_open {
                writeln!(self.out)?;
                self.line_open = false;
            }
        }
        Ok(())
    }

    fn write_inline(&mut self, value: Encoded<'_>) -> fmt::Result {
        match value {
            Encoded::Bare(v) => self.out.write_str(v),
            Encoded::Quoted(q, v) => write!(self.out, "{q}{v}{q}"),
            Encoded::TextField(v) => self.write_text_field(v),
        }
    }

    /// `;` must start a line; the closing `;` goes on its own line.
    fn write_text_field(&mut self, text: &str) -> fmt::Result {
        writeln!(self.out, ";{text}")?;
        writeln!(self.out, ";")?;
        self.line_open = false;
        Ok(())
    }
}

/// Serialize `file` to a CIF string.
pub fn write_file(file: &CifFile<'_>) -> String {
    let mut writer = CifWriter::new(String::new());
    // Writing into a String cannot fail.
    let _ = writer.write_file(file);
    writer.into_inner()
}
