use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use ciftext::io::read_text;
use ciftext::summary::FileSummary;
use ciftext::ParserConfig;

/// Display the structure of a CIF file
pub fn run(file: PathBuf, json: bool, parser: ParserConfig) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let text = read_text(&file)?;
    info!("Read {} ({} bytes)", file.display(), text.len());

    let mut ctx = super::progress_context(parser, &file);
    let parsed = ciftext::parse_with(&text, &mut ctx)
        .with_context(|| format!("Failed to parse {}", file.display()))?;
    let summary = FileSummary::from(&parsed);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    #[cfg(feature = "colorized_output")]
    {
        print!("{}", summary.format_colored());
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        print!("{}", summary);
    }

    Ok(())
}
