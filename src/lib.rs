pub mod catalog;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
mod exec;
pub mod field_type;
pub mod group_rows;
pub mod grouping;
pub mod io_utils;
pub mod persistence;
mod rows_cmd;
pub mod schema;

pub use catalog::Catalog;
pub use config::GrouperConfig;
pub use error::GrouperError;
pub use field_type::FieldType;
pub use grouping::Group;
pub use schema::FileSchema;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;
use log::{LevelFilter, debug, info};

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_grouper", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Scan(args) => handle_scan(&args),
        Commands::Summary(args) => handle_summary(&args),
        Commands::Files(args) => handle_files(&args),
        Commands::Rows(args) => rows_cmd::execute(&args),
        Commands::Regroup(args) => handle_regroup(&args),
        Commands::Compare(args) => handle_compare(&args),
        Commands::Exec(args) => exec::execute(&args),
    }
}

fn handle_scan(args: &cli::ScanArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let config = GrouperConfig::default()
        .with_sample_rows(args.sample_rows)
        .with_encoding(encoding)
        .with_delimiter(args.delimiter);
    match args.delimiter {
        Some(delimiter) => info!(
            "Scanning {:?} for '{}' with delimiter '{}'",
            args.directory,
            args.pattern,
            printable_delimiter(delimiter)
        ),
        None => info!("Scanning {:?} for '{}'", args.directory, args.pattern),
    }

    let mut catalog = Catalog::new(config);
    catalog
        .scan_directory(&args.directory, args.recursive, &args.pattern)
        .with_context(|| format!("Scanning {:?}", args.directory))?;
    regroup(&mut catalog, args.threshold, args.exact)?;
    print!("{}", catalog.summary());

    if let Some(output) = &args.output {
        catalog
            .save_groupings(output)
            .with_context(|| format!("Writing groupings to {output:?}"))?;
    }
    Ok(())
}

fn handle_summary(args: &cli::SummaryArgs) -> Result<()> {
    let catalog = load_catalog(&args.groupings, GrouperConfig::default())?;
    print!("{}", catalog.summary());
    Ok(())
}

fn handle_files(args: &cli::FilesArgs) -> Result<()> {
    let catalog = load_catalog(&args.groupings, GrouperConfig::default())?;
    let group = catalog
        .group(&args.group)
        .ok_or_else(|| GrouperError::UnknownGroup(args.group.clone()))?;
    for path in group.file_paths() {
        println!("{path}");
    }
    Ok(())
}

fn handle_regroup(args: &cli::RegroupArgs) -> Result<()> {
    let mut catalog = load_catalog(&args.groupings, GrouperConfig::default())?;
    regroup(&mut catalog, args.threshold, args.exact)?;
    print!("{}", catalog.summary());
    if let Some(output) = &args.output {
        catalog
            .save_groupings(output)
            .with_context(|| format!("Writing groupings to {output:?}"))?;
    }
    Ok(())
}

fn handle_compare(args: &cli::CompareArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let config = GrouperConfig::default()
        .with_encoding(encoding)
        .with_delimiter(args.delimiter);
    let left = discovery::read_file_schema(&args.left, &config)
        .with_context(|| format!("Reading {:?}", args.left))?;
    let right = discovery::read_file_schema(&args.right, &config)
        .with_context(|| format!("Reading {:?}", args.right))?;

    let left_fields = left.field_set();
    let right_fields = right.field_set();
    let shared = left_fields.intersection(&right_fields).collect_vec();
    let only_left = left_fields.difference(&right_fields).collect_vec();
    let only_right = right_fields.difference(&left_fields).collect_vec();

    println!("Similarity: {:.3}", left.similarity(&right));
    println!("Shared fields ({}): {}", shared.len(), shared.iter().join(", "));
    println!(
        "Only in {} ({}): {}",
        left.path,
        only_left.len(),
        only_left.iter().join(", ")
    );
    println!(
        "Only in {} ({}): {}",
        right.path,
        only_right.len(),
        only_right.iter().join(", ")
    );
    Ok(())
}

fn regroup(catalog: &mut Catalog, threshold: f64, exact: bool) -> Result<()> {
    let threshold = if exact {
        grouping::EXACT_MATCH_THRESHOLD
    } else {
        threshold
    };
    debug!("Grouping with threshold {threshold}");
    catalog
        .group_by_similarity(threshold)
        .context("Grouping files")?;
    Ok(())
}

pub(crate) fn load_catalog(path: &std::path::Path, config: GrouperConfig) -> Result<Catalog> {
    let mut catalog = Catalog::new(config);
    catalog
        .load_groupings(path)
        .with_context(|| format!("Loading groupings from {path:?}"))?;
    Ok(catalog)
}

pub(crate) fn printable_delimiter(delimiter: char) -> String {
    match delimiter {
        ',' => ",".to_string(),
        '\t' => "\\t".to_string(),
        '\n' => "\\n".to_string(),
        other => other.to_string(),
    }
}
