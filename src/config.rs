use encoding_rs::{Encoding, UTF_8};

pub const DEFAULT_SAMPLE_ROWS: usize = 5;
pub const DEFAULT_PATTERN: &str = "*.csv";

/// Settings that shape how files are read into schemas.
#[derive(Debug, Clone, Copy)]
pub struct GrouperConfig {
    /// Data rows kept per file for type inference.
    pub sample_rows: usize,
    pub encoding: &'static Encoding,
    /// Forces a delimiter instead of sniffing one per file.
    pub delimiter: Option<char>,
}

impl Default for GrouperConfig {
    fn default() -> Self {
        Self {
            sample_rows: DEFAULT_SAMPLE_ROWS,
            encoding: UTF_8,
            delimiter: None,
        }
    }
}

impl GrouperConfig {
    pub fn with_sample_rows(mut self, sample_rows: usize) -> Self {
        self.sample_rows = sample_rows;
        self
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_delimiter(mut self, delimiter: Option<char>) -> Self {
        self.delimiter = delimiter;
        self
    }
}
