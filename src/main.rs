//! # ciftext
//!
//! A command-line tool for inspecting and converting CIF/mmCIF text files.
//!
//! ## Usage
//!
//! ```bash
//! # List blocks and categories
//! ciftext info 1abc.cif.gz
//!
//! # Report the first syntax error
//! ciftext check broken.cif
//!
//! # Convert PDB coordinates to mmCIF
//! ciftext convert-pdb 1abc.pdb 1abc.cif
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
