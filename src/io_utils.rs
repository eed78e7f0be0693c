//! Reader construction, encoding resolution and byte decoding.
//!
//! Every CSV read in csv-grouper, bounded sample reads during discovery and
//! full streaming reads of a group's rows, goes through [`open_csv_reader`] so
//! both see the same dialect: no implicit header handling, double-quote
//! escaping, and ragged rows tolerated.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use encoding_rs::{Encoding, UTF_8};

use crate::error::{GrouperError, Result};

pub fn resolve_encoding(label: Option<&str>) -> anyhow::Result<&'static Encoding> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow::anyhow!("Unknown encoding '{value}'")),
        None => Ok(UTF_8),
    }
}

pub fn delimiter_byte(delimiter: char) -> Result<u8> {
    if delimiter.is_ascii() {
        Ok(delimiter as u8)
    } else {
        Err(GrouperError::InvalidDelimiter(delimiter))
    }
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(reader)
}

pub fn open_csv_file(path: &Path, delimiter: char) -> Result<csv::Reader<BufReader<File>>> {
    let delimiter = delimiter_byte(delimiter)?;
    let file = File::open(path).map_err(|err| GrouperError::io(path, err))?;
    Ok(open_csv_reader(BufReader::new(file), delimiter))
}

/// Reads at most `limit` bytes from the start of a file.
pub fn read_prefix(path: &Path, limit: usize) -> Result<Vec<u8>> {
    let file = File::open(path).map_err(|err| GrouperError::io(path, err))?;
    let mut buffer = Vec::with_capacity(limit);
    file.take(limit as u64)
        .read_to_end(&mut buffer)
        .map_err(|err| GrouperError::io(path, err))?;
    Ok(buffer)
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(GrouperError::Decode(encoding.name()))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}
