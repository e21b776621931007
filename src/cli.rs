use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "pf-jar")]
#[command(about = "Find PingFederate plugin classes and write their PF-INF descriptor files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    Scan {
        /// Directories of compiled classes (or single .class files)
        #[arg(value_name = "CLASSPATH")]
        classpath: Vec<PathBuf>,

        /// Root that receives PF-INF; defaults to the first classpath element
        #[arg(short = 'o', long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[arg(long, value_name = "FILE")]
        types: Option<PathBuf>,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Exit non-zero if anything could not be read, parsed or written
        #[arg(long)]
        strict: bool,
    },
    Types {
        #[arg(long, value_name = "FILE")]
        types: Option<PathBuf>,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
