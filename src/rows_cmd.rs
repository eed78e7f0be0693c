use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{cli::RowsArgs, config::GrouperConfig, group_rows::RowMap, io_utils};

#[derive(Serialize)]
struct RowLine<'a> {
    file: &'a str,
    row: &'a RowMap,
}

/// Writes one JSON object per data row of the group to stdout.
pub fn execute(args: &RowsArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let catalog = crate::load_catalog(
        &args.groupings,
        GrouperConfig::default().with_encoding(encoding),
    )?;
    let rows = catalog.iter_group_rows(&args.group)?;

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    let mut emitted = 0usize;
    for item in rows.take(args.limit.unwrap_or(usize::MAX)) {
        let (file, row) = item.with_context(|| format!("Reading rows of group '{}'", args.group))?;
        serde_json::to_writer(&mut writer, &RowLine { file: &file, row: &row })
            .context("Serializing row")?;
        writer.write_all(b"\n").context("Writing row")?;
        emitted += 1;
    }
    writer.flush().context("Flushing output")?;
    info!("Emitted {emitted} row(s) from group '{}'", args.group);
    Ok(())
}
