use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    config::{DEFAULT_PATTERN, DEFAULT_SAMPLE_ROWS},
    grouping::DEFAULT_SIMILARITY_THRESHOLD,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Group CSV files by field structure similarity", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory for CSV files, group them, and print a summary
    Scan(ScanArgs),
    /// Print the summary of a saved grouping
    Summary(SummaryArgs),
    /// List the files belonging to one group of a saved grouping
    Files(FilesArgs),
    /// Stream every row of a group as JSON lines
    Rows(RowsArgs),
    /// Re-partition the files of a saved grouping at a new threshold
    Regroup(RegroupArgs),
    /// Compare the field sets of two CSV files
    Compare(CompareArgs),
    /// Run an external command with the file paths of a group appended
    Exec(ExecArgs),
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to search for CSV files
    #[arg(short = 'd', long = "dir")]
    pub directory: PathBuf,
    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,
    /// Glob pattern matched against file names
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,
    /// Number of data rows sampled per file for type inference
    #[arg(long, default_value_t = DEFAULT_SAMPLE_ROWS)]
    pub sample_rows: usize,
    /// Minimum Jaccard similarity to the group seed (0.0 to 1.0)
    #[arg(short, long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
    pub threshold: f64,
    /// Group only files whose field sets are identical (threshold 1.0)
    #[arg(long, conflicts_with = "threshold")]
    pub exact: bool,
    /// Save the resulting grouping (.json, or .yaml/.yml)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Force a delimiter instead of sniffing it per file (',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<char>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// Saved grouping document
    #[arg(short = 'g', long = "groupings")]
    pub groupings: PathBuf,
}

#[derive(Debug, Args)]
pub struct FilesArgs {
    /// Saved grouping document
    #[arg(short = 'g', long = "groupings")]
    pub groupings: PathBuf,
    /// Group name, e.g. group_1
    #[arg(long)]
    pub group: String,
}

#[derive(Debug, Args)]
pub struct RowsArgs {
    /// Saved grouping document
    #[arg(short = 'g', long = "groupings")]
    pub groupings: PathBuf,
    /// Group name, e.g. group_1
    #[arg(long)]
    pub group: String,
    /// Stop after emitting this many rows
    #[arg(long)]
    pub limit: Option<usize>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct RegroupArgs {
    /// Saved grouping document
    #[arg(short = 'g', long = "groupings")]
    pub groupings: PathBuf,
    /// Minimum Jaccard similarity to the group seed (0.0 to 1.0)
    #[arg(short, long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
    pub threshold: f64,
    /// Group only files whose field sets are identical (threshold 1.0)
    #[arg(long, conflicts_with = "threshold")]
    pub exact: bool,
    /// Save the new grouping (.json, or .yaml/.yml)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// First CSV file
    #[arg(short = 'a', long = "left")]
    pub left: PathBuf,
    /// Second CSV file
    #[arg(short = 'b', long = "right")]
    pub right: PathBuf,
    /// Force a delimiter instead of sniffing it per file (',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<char>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ExecArgs {
    /// Saved grouping document
    #[arg(short = 'g', long = "groupings")]
    pub groupings: PathBuf,
    /// Group name, e.g. group_1
    #[arg(long)]
    pub group: String,
    /// Program and leading arguments, given after `--`
    #[arg(last = true, required = true)]
    pub command: Vec<String>,
}

pub fn parse_delimiter(value: &str) -> Result<char, String> {
    match value {
        "tab" | "\t" | "\\t" => Ok('\t'),
        "comma" | "," => Ok(','),
        "|" | "pipe" => Ok('|'),
        ";" | "semicolon" => Ok(';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_delimiter_accepts_names_and_symbols() {
        assert_eq!(parse_delimiter("tab"), Ok('\t'));
        assert_eq!(parse_delimiter("semicolon"), Ok(';'));
        assert_eq!(parse_delimiter("pipe"), Ok('|'));
        assert_eq!(parse_delimiter(":"), Ok(':'));
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("§").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
