//! Structural overview of a parsed file.
//!
//! A [`FileSummary`] lists blocks, save frames and categories with their row
//! and field counts. It owns all of its data, so it outlives the source text,
//! and serializes with `serde` for `ciftext info --json`.

use std::fmt;

use serde::Serialize;

#[cfg(feature = "colorized_output")]
use console::style;

use crate::data::{CifBlock, CifCategory, CifFile, CifFrame};

/// Shape of one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    /// Category name without the leading underscore
    pub name: String,
    /// Number of rows
    pub rows: usize,
    /// Field names in first-seen order
    pub fields: Vec<String>,
}

/// Categories of one save frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameSummary {
    /// Save frame header
    pub header: String,
    /// Categories in first-seen order
    pub categories: Vec<CategorySummary>,
}

/// Categories and save frames of one data block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSummary {
    /// Block header
    pub header: String,
    /// Categories in first-seen order
    pub categories: Vec<CategorySummary>,
    /// Save frames in file order
    pub save_frames: Vec<FrameSummary>,
}

/// Structure of a whole file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    /// Blocks in file order
    pub blocks: Vec<BlockSummary>,
}

impl From<&CifCategory<'_>> for CategorySummary {
    fn from(category: &CifCategory<'_>) -> Self {
        Self {
            name: category.name().to_string(),
            rows: category.row_count(),
            fields: category.field_names().map(str::to_string).collect(),
        }
    }
}

impl From<&CifFrame<'_>> for FrameSummary {
    fn from(frame: &CifFrame<'_>) -> Self {
        Self {
            header: frame.header().to_string(),
            categories: frame.categories().map(CategorySummary::from).collect(),
        }
    }
}

impl From<&CifBlock<'_>> for BlockSummary {
    fn from(block: &CifBlock<'_>) -> Self {
        Self {
            header: block.header().to_string(),
            categories: block.categories().map(CategorySummary::from).collect(),
            save_frames: block.save_frames().iter().map(FrameSummary::from).collect(),
        }
    }
}

impl From<&CifFile<'_>> for FileSummary {
    fn from(file: &CifFile<'_>) -> Self {
        Self {
            blocks: file.blocks().iter().map(BlockSummary::from).collect(),
        }
    }
}

impl FileSummary {
    /// Number of categories across all blocks and save frames
    pub fn category_count(&self) -> usize {
        self.blocks
            .iter()
            .map(|b| {
                b.categories.len()
                    + b.save_frames.iter().map(|f| f.categories.len()).sum::<usize>()
            })
            .sum()
    }

    /// Number of rows across all categories
    pub fn row_count(&self) -> usize {
        let rows = |categories: &[CategorySummary]| categories.iter().map(|c| c.rows).sum::<usize>();
        self.blocks
            .iter()
            .map(|b| rows(&b.categories) + b.save_frames.iter().map(|f| rows(&f.categories)).sum::<usize>())
            .sum()
    }

    /// Format the summary with colors (requires console feature)
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            let mut output = String::new();
            for block in &self.blocks {
                output.push_str(&format!("{} {}\n", style("data_").cyan(), style(&block.header).bold()));
                push_categories_colored(&mut output, &block.categories, "  ");
                for frame in &block.save_frames {
                    output.push_str(&format!("  {} {}\n", style("save_").magenta(), style(&frame.header).bold()));
                    push_categories_colored(&mut output, &frame.categories, "    ");
                }
            }
            output.push_str(&format!(
                "\n{}: {} blocks, {} categories, {} rows\n",
                style("Total").bold(),
                self.blocks.len(),
                self.category_count(),
                self.row_count()
            ));
            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            format!("{}", self)
        }
    }
}

#[cfg(feature = "colorized_output")]
fn push_categories_colored(output: &mut String, categories: &[CategorySummary], indent: &str) {
    for c in categories {
        output.push_str(&format!(
            "{indent}{:<32} {:>8} rows {:>4} fields\n",
            style(&c.name).green(),
            c.rows,
            c.fields.len()
        ));
    }
}

fn write_categories(f: &mut fmt::Formatter<'_>, categories: &[CategorySummary], indent: &str) -> fmt::Result {
    for c in categories {
        writeln!(
            f,
            "{indent}{:<32} {:>8} rows {:>4} fields",
            c.name,
            c.rows,
            c.fields.len()
        )?;
    }
    Ok(())
}

impl fmt::Display for FileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in &self.blocks {
            writeln!(f, "data_{}", block.header)?;
            write_categories(f, &block.categories, "  ")?;
            for frame in &block.save_frames {
                writeln!(f, "  save_{}", frame.header)?;
                write_categories(f, &frame.categories, "    ")?;
            }
        }
        writeln!(f)?;
        writeln!(
            f,
            "Total: {} blocks, {} categories, {} rows",
            self.blocks.len(),
            self.category_count(),
            self.row_count()
        )
    }
}
