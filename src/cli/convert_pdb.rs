use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use ciftext::data::{CifBlock, CifFile};
use ciftext::io::read_text;
use ciftext::pdb::pdb_to_mmcif;
use ciftext::text::write_file;

/// Convert a PDB file to mmCIF text
pub fn run(input: PathBuf, output: Option<PathBuf>) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let output = output.unwrap_or_else(|| {
        let name = input.file_name().unwrap_or_default().to_string_lossy();
        let stem = name.trim_end_matches(".gz");
        let stem = stem.trim_end_matches(".pdb").trim_end_matches(".ent");
        input.with_file_name(format!("{}.cif", stem))
    });

    info!("Input:  {}", input.display());
    info!("Output: {}", output.display());

    let text = read_text(&input)?;
    let frame = pdb_to_mmcif(&text);
    let atoms = frame.category("atom_site").map_or(0, |c| c.row_count());
    let file = CifFile::new(vec![CifBlock::new(frame, Vec::new())]);

    std::fs::write(&output, write_file(&file))
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!("Wrote {} atoms", atoms);
    Ok(())
}
