use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use std::path::{Path, PathBuf};

use ciftext::task::RuntimeContext;
use ciftext::ParserConfig;

mod check;
mod config;
mod convert_pdb;
mod info;
mod roundtrip;

/// ciftext - CIF/mmCIF text inspection and conversion
#[derive(Parser)]
#[command(name = "ciftext")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Parser profile (default, responsive, throughput)
    #[arg(short = 'p', long, default_value = "default", value_enum, global = true)]
    profile: ProfileArg,

    /// Load parser settings from a TOML config file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    // === Advanced tuning flags (hidden from --help) ===
    /// Loop values read between progress/cancellation checks
    #[arg(long, hide = true, global = true)]
    chunk_size: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

/// Parser profile trading progress granularity for throughput.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ProfileArg {
    /// Balanced defaults
    #[default]
    Default,
    /// Small chunks, frequent progress reports
    Responsive,
    /// Large chunks, rare progress reports
    Throughput,
}

impl From<ProfileArg> for ParserConfig {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Default => ParserConfig::default(),
            ProfileArg::Responsive => ParserConfig::responsive(),
            ProfileArg::Throughput => ParserConfig::throughput(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List blocks, save frames and categories of a CIF file
    Info {
        /// Input CIF file path (may be gzip-compressed)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a CIF file and report the first error, if any
    Check {
        /// Input CIF file path (may be gzip-compressed)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Convert PDB coordinates to mmCIF text
    ConvertPdb {
        /// Input PDB file path (may be gzip-compressed)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output mmCIF file path (defaults to INPUT with a .cif extension)
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Parse, write and re-parse a CIF file, comparing the two parses
    Roundtrip {
        /// Input CIF file path (may be gzip-compressed)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Also write the re-encoded text to this path
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }

    /// Profile defaults, then config file values, then CLI flags.
    fn parser_config(&self) -> Result<ParserConfig> {
        let mut parser = ParserConfig::from(self.profile);
        if let Some(path) = &self.config {
            parser = config::Config::from_file(path)?.parser.apply(parser);
        }
        if let Some(chunk_size) = self.chunk_size {
            parser = parser.with_chunk_size(chunk_size);
        }
        Ok(parser)
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

/// A context that logs parse progress of `path` at info level.
fn progress_context(config: ParserConfig, path: &Path) -> RuntimeContext<'_> {
    RuntimeContext::new(config).with_observer(move |p| {
        info!(
            "{}: {} {:.1}% ({}/{} bytes)",
            path.display(),
            p.message,
            100.0 * p.fraction(),
            p.current,
            p.max
        );
    })
}

pub fn dispatch(cli: Cli) -> Result<()> {
    let parser = cli.parser_config()?;
    match cli.command {
        Commands::Info { file, json } => info::run(file, json, parser),
        Commands::Check { file } => check::run(file, parser),
        Commands::ConvertPdb { input, output } => convert_pdb::run(input, output),
        Commands::Roundtrip { file, output } => roundtrip::run(file, output, parser),
    }
}
