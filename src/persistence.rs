//! Saving and reloading a grouping run.
//!
//! The document is a map of group name to group (each carrying its full file
//! records) plus the sampling depth used to build them. JSON is written
//! pretty-printed; paths ending in `.yaml`/`.yml` use the same shape in YAML.
//! Group order in the document is creation order and survives a reload.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
    sync::Arc,
};

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    config::DEFAULT_SAMPLE_ROWS,
    error::{GrouperError, Result},
    grouping::Group,
    schema::FileSchema,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                DocumentFormat::Yaml
            }
            _ => DocumentFormat::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupingDocument {
    #[serde(default)]
    pub groups: IndexMap<String, Group>,
    #[serde(default = "GroupingDocument::default_sample_rows", alias = "sampleRows")]
    pub sample_rows: usize,
}

impl GroupingDocument {
    pub fn new<'a, I>(groups: I, sample_rows: usize) -> Self
    where
        I: IntoIterator<Item = &'a Group>,
    {
        let groups = groups
            .into_iter()
            .map(|group| (group.name.clone(), group.clone()))
            .collect();
        Self {
            groups,
            sample_rows,
        }
    }

    pub const fn default_sample_rows() -> usize {
        DEFAULT_SAMPLE_ROWS
    }

    pub fn to_text(&self, format: DocumentFormat) -> Result<String> {
        match format {
            DocumentFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|err| GrouperError::Encode(err.to_string())),
            DocumentFormat::Yaml => {
                serde_yaml::to_string(self).map_err(|err| GrouperError::Encode(err.to_string()))
            }
        }
    }

    pub fn from_text(text: &str, format: DocumentFormat) -> Result<Self> {
        let document: GroupingDocument = match format {
            DocumentFormat::Json => serde_json::from_str(text)
                .map_err(|err| GrouperError::MalformedDocument(err.to_string()))?,
            DocumentFormat::Yaml => serde_yaml::from_str(text)
                .map_err(|err| GrouperError::MalformedDocument(err.to_string()))?,
        };
        document.validate()?;
        Ok(document)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|err| GrouperError::io(path, err))?;
        let mut writer = BufWriter::new(file);
        match DocumentFormat::from_path(path) {
            DocumentFormat::Json => {
                serde_json::to_writer_pretty(&mut writer, self)
                    .map_err(|err| GrouperError::Encode(err.to_string()))?;
                writer
                    .write_all(b"\n")
                    .map_err(|err| GrouperError::io(path, err))?;
            }
            DocumentFormat::Yaml => serde_yaml::to_writer(&mut writer, self)
                .map_err(|err| GrouperError::Encode(err.to_string()))?,
        }
        writer.flush().map_err(|err| GrouperError::io(path, err))?;
        debug!("Wrote {} group(s) to {path:?}", self.groups.len());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|err| GrouperError::io(path, err))?;
        let reader = BufReader::new(file);
        let document: GroupingDocument = match DocumentFormat::from_path(path) {
            DocumentFormat::Json => serde_json::from_reader(reader)
                .map_err(|err| GrouperError::MalformedDocument(format!("{path:?}: {err}")))?,
            DocumentFormat::Yaml => serde_yaml::from_reader(reader)
                .map_err(|err| GrouperError::MalformedDocument(format!("{path:?}: {err}")))?,
        };
        document.validate()?;
        Ok(document)
    }

    /// Every file of every group keyed by path. A path listed by more than one
    /// group keeps its first position and the last record seen.
    pub fn file_registry(&self) -> IndexMap<String, Arc<FileSchema>> {
        let mut files = IndexMap::new();
        for file in self.groups.values().flat_map(|group| group.files.iter()) {
            files.insert(file.path.clone(), Arc::clone(file));
        }
        files
    }

    fn validate(&self) -> Result<()> {
        for (key, group) in &self.groups {
            if key != &group.name {
                return Err(GrouperError::MalformedDocument(format!(
                    "group key '{key}' does not match its name '{}'",
                    group.name
                )));
            }
            if !(0.0..=1.0).contains(&group.similarity_threshold) {
                return Err(GrouperError::MalformedDocument(format!(
                    "group '{key}' has threshold {} outside 0.0..=1.0",
                    group.similarity_threshold
                )));
            }
        }
        Ok(())
    }
}
