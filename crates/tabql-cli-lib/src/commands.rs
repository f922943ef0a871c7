//! The CLI surface: argument parsing via `clap` derive. These types
//! exist only to parse argv; [`crate::flags_from_cli`] translates them
//! into the core's [`tabql_core::Flags`] so the engine never depends on
//! `clap`.

use clap::{Parser, ValueEnum};
use strum_macros::Display;

#[derive(Debug, Parser)]
#[command(name = "tabql", about = "Run a tabql script against delimited/semi-structured files")]
pub struct Cli {
    /// Script file to execute. Omit to read the script from stdin.
    pub source: Option<String>,

    #[arg(short, long, default_value_t)]
    pub format: OutputFormat,

    #[arg(short, long, default_value_t = ',')]
    pub delimiter: char,

    #[arg(long)]
    pub write_delimiter: Option<char>,

    #[arg(long, default_value_t)]
    pub write_encoding: CliEncoding,

    #[arg(long, default_value_t)]
    pub line_break: CliLineBreak,

    #[arg(long)]
    pub without_header: bool,

    #[arg(long)]
    pub enclose_all: bool,

    #[arg(long, default_value_t)]
    pub json_escape: CliJsonEscape,

    #[arg(long)]
    pub pretty_print: bool,

    #[arg(long)]
    pub color: bool,

    #[arg(short = 'o', long)]
    pub out_file: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum, Display, Default)]
#[strum(serialize_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Csv,
    Tsv,
    Fixed,
    Json,
    Ltsv,
    Gfm,
    Org,
    Text,
}

#[derive(Debug, Clone, Copy, ValueEnum, Display, Default)]
#[strum(serialize_all = "kebab-case")]
pub enum CliEncoding {
    #[default]
    Utf8,
    Utf8Bom,
    Sjis,
}

#[derive(Debug, Clone, Copy, ValueEnum, Display, Default)]
#[strum(serialize_all = "kebab-case")]
pub enum CliLineBreak {
    #[default]
    Lf,
    CrLf,
    Cr,
}

#[derive(Debug, Clone, Copy, ValueEnum, Display, Default)]
#[strum(serialize_all = "kebab-case")]
pub enum CliJsonEscape {
    #[default]
    Backslash,
    HexDigits,
    AllWithHexDigits,
}
