use anyhow::Result;
use log::info;
use std::path::PathBuf;
use std::time::Instant;

use ciftext::io::read_text;
use ciftext::ParserConfig;

#[cfg(feature = "colorized_output")]
use console::style;

/// Parse a CIF file and report success or the first error
pub fn run(file: PathBuf, parser: ParserConfig) -> Result<()> {
    let text = match read_text(&file) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Load error: {}", e);
            std::process::exit(1);
        }
    };

    let started = Instant::now();
    let mut ctx = super::progress_context(parser, &file);
    let outcome = ciftext::parse_with(&text, &mut ctx);
    info!("Parsed in {:.2?}", started.elapsed());

    match outcome {
        Ok(parsed) => {
            let categories: usize = parsed.blocks().iter().map(|b| b.frame().category_count()).sum();
            let message = format!(
                "{}: OK ({} blocks, {} categories)",
                file.display(),
                parsed.blocks().len(),
                categories
            );

            #[cfg(feature = "colorized_output")]
            {
                println!("{}", style(message).green());
            }

            #[cfg(not(feature = "colorized_output"))]
            {
                println!("{}", message);
            }

            Ok(())
        }
        Err(e) => {
            let message = format!("{}:{}: {}", file.display(), e.line(), e);

            #[cfg(feature = "colorized_output")]
            {
                eprintln!("{}", style(message).red().bold());
            }

            #[cfg(not(feature = "colorized_output"))]
            {
                eprintln!("{}", message);
            }

            std::process::exit(1);
        }
    }
}
