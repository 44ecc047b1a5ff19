use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;

use ciftext::data::{CifCategory, CifFile, CifFrame};
use ciftext::io::read_text;
use ciftext::text::write_file;
use ciftext::ParserConfig;

/// Parse, write and re-parse a CIF file
pub fn run(file: PathBuf, output: Option<PathBuf>, parser: ParserConfig) -> Result<()> {
    let text = read_text(&file)?;

    let mut ctx = super::progress_context(parser.clone(), &file);
    let first = ciftext::parse_with(&text, &mut ctx)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    let encoded = write_file(&first);
    debug!("Re-encoded {} bytes as {} bytes", text.len(), encoded.len());
    if let Some(path) = &output {
        std::fs::write(path, &encoded)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote {}", path.display());
    }

    let mut ctx = super::progress_context(parser, &file);
    let second = ciftext::parse_with(&encoded, &mut ctx).context("Re-encoded text does not parse")?;

    match first_difference(&first, &second) {
        None => {
            println!("{}: round trip OK", file.display());
            Ok(())
        }
        Some(difference) => anyhow::bail!("{}: round trip changed {}", file.display(), difference),
    }
}

fn first_difference(a: &CifFile<'_>, b: &CifFile<'_>) -> Option<String> {
    if a.blocks().len() != b.blocks().len() {
        return Some(format!(
            "block count ({} vs {})",
            a.blocks().len(),
            b.blocks().len()
        ));
    }
    for (x, y) in a.blocks().iter().zip(b.blocks()) {
        if let Some(d) = frame_difference(x.frame(), y.frame()) {
            return Some(d);
        }
        if x.save_frames().len() != y.save_frames().len() {
            return Some(format!("save frame count of block '{}'", x.header()));
        }
        for (fx, fy) in x.save_frames().iter().zip(y.save_frames()) {
            if let Some(d) = frame_difference(fx, fy) {
                return Some(d);
            }
        }
    }
    None
}

fn frame_difference<'f>(a: &'f CifFrame<'f>, b: &'f CifFrame<'f>) -> Option<String> {
    if a.header() != b.header() {
        return Some(format!("header '{}' to '{}'", a.header(), b.header()));
    }
    if !written(a).map(CifCategory::name).eq(written(b).map(CifCategory::name)) {
        return Some(format!("category order of '{}'", a.header()));
    }
    written(a)
        .zip(written(b))
        .find_map(|(x, y)| category_difference(x, y))
}

/// Categories without rows are not written.
fn written<'f>(frame: &'f CifFrame<'f>) -> impl Iterator<Item = &'f CifCategory<'f>> {
    frame.categories().filter(|c| c.row_count() > 0)
}

fn category_difference(a: &CifCategory<'_>, b: &CifCategory<'_>) -> Option<String> {
    if a.row_count() != b.row_count() || !a.field_names().eq(b.field_names()) {
        return Some(format!("shape of category '{}'", a.name()));
    }
    for ((name, x), (_, y)) in a.fields().zip(b.fields()) {
        for row in 0..a.row_count() {
            if x.str(row) != y.str(row) || x.value_presence(row) != y.value_presence(row) {
                return Some(format!("value {}.{}[{}]", a.name(), name, row));
            }
        }
    }
    None
}
