//! Lazy iteration over every data row of every file in a group.
//!
//! At most one file is open at a time. The reader for a file is dropped as soon
//! as its last row is yielded, when a read fails, or when the iterator itself
//! is dropped part-way through.

use std::{fs::File, io::BufReader, path::Path, sync::Arc, vec};

use encoding_rs::Encoding;
use indexmap::IndexMap;
use log::debug;

use crate::{error::Result, io_utils, schema::FileSchema};

/// One data row keyed by the header row of the file it came from.
pub type RowMap = IndexMap<String, String>;

pub struct GroupRows {
    pending: vec::IntoIter<Arc<FileSchema>>,
    current: Option<OpenFile>,
    encoding: &'static Encoding,
    failed: bool,
}

struct OpenFile {
    path: String,
    headers: Vec<String>,
    reader: csv::Reader<BufReader<File>>,
    record: csv::ByteRecord,
}

impl OpenFile {
    fn open(schema: &FileSchema, encoding: &'static Encoding) -> Result<Self> {
        let mut reader = io_utils::open_csv_file(Path::new(&schema.path), schema.delimiter)?;
        let mut record = csv::ByteRecord::new();
        let headers = if reader.read_byte_record(&mut record)? {
            io_utils::decode_record(&record, encoding)?
        } else {
            Vec::new()
        };
        debug!("Streaming rows from {}", schema.path);
        Ok(Self {
            path: schema.path.clone(),
            headers,
            reader,
            record,
        })
    }

    fn next_row(&mut self, encoding: &'static Encoding) -> Result<Option<RowMap>> {
        if !self.reader.read_byte_record(&mut self.record)? {
            return Ok(None);
        }
        let values = io_utils::decode_record(&self.record, encoding)?;
        Ok(Some(self.headers.iter().cloned().zip(values).collect()))
    }
}

impl GroupRows {
    pub(crate) fn new(files: Vec<Arc<FileSchema>>, encoding: &'static Encoding) -> Self {
        Self {
            pending: files.into_iter(),
            current: None,
            encoding,
            failed: false,
        }
    }
}

impl Iterator for GroupRows {
    type Item = Result<(String, RowMap)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let file = match self.current.as_mut() {
                Some(file) => file,
                None => {
                    let schema = self.pending.next()?;
                    match OpenFile::open(&schema, self.encoding) {
                        Ok(file) => self.current.insert(file),
                        Err(err) => {
                            self.failed = true;
                            return Some(Err(err));
                        }
                    }
                }
            };
            match file.next_row(self.encoding) {
                Ok(Some(row)) => return Some(Ok((file.path.clone(), row))),
                Ok(None) => self.current = None,
                Err(err) => {
                    self.failed = true;
                    self.current = None;
                    return Some(Err(err));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GrouperError;
    use encoding_rs::UTF_8;
    use std::fs;
    use tempfile::tempdir;

    fn write(
        dir: &std::path::Path,
        name: &str,
        contents: &str,
        delimiter: char,
    ) -> Arc<FileSchema> {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        let mut schema = FileSchema::new(path.to_string_lossy(), Vec::new());
        schema.delimiter = delimiter;
        Arc::new(schema)
    }

    #[test]
    fn yields_rows_in_file_then_row_order() {
        let dir = tempdir().expect("temp dir");
        let first = write(dir.path(), "first.csv", "a,b\n1,2\n3,4\n", ',');
        let second = write(dir.path(), "second.csv", "b;a\n5;6\n", ';');
        let rows: Vec<_> = GroupRows::new(vec![first.clone(), second.clone()], UTF_8)
            .collect::<Result<_>>()
            .expect("rows");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].0, first.path);
        assert_eq!(rows[0].1["a"], "1");
        assert_eq!(rows[1].1["b"], "4");
        assert_eq!(rows[2].0, second.path);
        assert_eq!(rows[2].1["a"], "6");
        let keys: Vec<&str> = rows[2].1.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn short_rows_omit_missing_fields_and_blank_lines_are_skipped() {
        let dir = tempdir().expect("temp dir");
        let file = write(dir.path(), "ragged.csv", "a,b,c\n1,2\n\n4,5,6,7\n", ',');
        let rows: Vec<_> = GroupRows::new(vec![file], UTF_8)
            .collect::<Result<_>>()
            .expect("rows");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].1.len(), 2);
        assert!(!rows[0].1.contains_key("c"));
        assert_eq!(rows[1].1.len(), 3);
        assert_eq!(rows[1].1["c"], "6");
    }

    #[test]
    fn each_call_restarts_from_the_beginning() {
        let dir = tempdir().expect("temp dir");
        let file = write(dir.path(), "data.csv", "a\nx\ny\n", ',');
        let mut partial = GroupRows::new(vec![file.clone()], UTF_8);
        assert!(partial.next().is_some());
        drop(partial);
        let count = GroupRows::new(vec![file], UTF_8).count();
        assert_eq!(count, 2);
    }

    #[test]
    fn missing_file_yields_one_error_then_stops() {
        let dir = tempdir().expect("temp dir");
        let present = write(dir.path(), "present.csv", "a\n1\n", ',');
        let missing = Arc::new(FileSchema::new(
            dir.path().join("gone.csv").to_string_lossy(),
            vec!["a".into()],
        ));
        let mut rows = GroupRows::new(vec![missing, present], UTF_8);
        assert!(matches!(rows.next(), Some(Err(GrouperError::Io { .. }))));
        assert!(rows.next().is_none());
    }
}
