use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "paq")]
#[command(version)]
#[command(about = "Pack or unpack files and/or directories", long_about = None)]
#[command(after_help = "Examples:\n  \
  paq pack notes.txt images/ -o notes.pq   pack a file and a directory's files\n  \
  paq scan notes.pq                        list entries with sizes and offsets\n  \
  paq unpack notes.pq -o restored          extract into ./restored")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Quiet mode, no progress messages
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a package
    Pack {
        /// Files and directories to pack
        #[arg(value_name = "PATH")]
        paths: Vec<PathBuf>,

        /// Package file name; a number is appended if it already exists
        #[arg(short = 'o', long, value_name = "FILE", default_value = "package.pq")]
        output: PathBuf,
    },

    /// Extract a package
    Unpack {
        /// Package to extract
        #[arg(value_name = "PACKAGE")]
        package: PathBuf,

        /// Directory to extract into
        #[arg(short = 'o', long, value_name = "DIR", default_value = ".")]
        output: PathBuf,

        /// Skip malformed metadata records instead of failing
        #[arg(long)]
        lenient: bool,
    },

    /// Analyze packages and print their metadata
    Scan {
        /// Packages to scan
        #[arg(value_name = "PACKAGE", required = true)]
        packages: Vec<PathBuf>,

        /// Skip malformed metadata records instead of failing
        #[arg(long)]
        lenient: bool,
    },
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Default log filter for the requested verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
