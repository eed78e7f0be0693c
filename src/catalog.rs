//! The catalog: file registry, active grouping and per-group processors.
//!
//! A [`Catalog`] owns every discovered [`FileSchema`] (keyed by path) and the
//! groups produced by the most recent grouping run or load. Groups built from a
//! live scan share the registry's `Arc`s; groups built from a saved document
//! carry their own reconstructed records.

use std::{collections::HashMap, fmt::Write as _, path::Path, sync::Arc};

use indexmap::IndexMap;
use itertools::Itertools;
use log::{info, warn};

use crate::{
    config::GrouperConfig,
    discovery,
    error::{GrouperError, Result},
    group_rows::GroupRows,
    grouping::{self, EXACT_MATCH_THRESHOLD, Group},
    persistence::GroupingDocument,
    schema::{self, FileSchema},
};

const HEADER_PREVIEW_LIMIT: usize = 5;

/// Callback run against the file paths of one group.
pub type Processor = Box<dyn Fn(&[String]) -> anyhow::Result<()>>;

pub struct Catalog {
    config: GrouperConfig,
    files: IndexMap<String, Arc<FileSchema>>,
    groups: IndexMap<String, Group>,
    processors: HashMap<String, Processor>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(GrouperConfig::default())
    }
}

impl Catalog {
    pub fn new(config: GrouperConfig) -> Self {
        Self {
            config,
            files: IndexMap::new(),
            groups: IndexMap::new(),
            processors: HashMap::new(),
        }
    }

    pub fn config(&self) -> &GrouperConfig {
        &self.config
    }

    pub fn sample_rows(&self) -> usize {
        self.config.sample_rows
    }

    /// Reads every matching file under `directory` into the registry.
    ///
    /// Files that cannot be read (no header row, bad encoding, I/O failure) are
    /// logged and skipped. Returns the schemas read by this call, in discovery
    /// order.
    pub fn scan_directory(
        &mut self,
        directory: &Path,
        recursive: bool,
        pattern: &str,
    ) -> Result<Vec<Arc<FileSchema>>> {
        let paths = discovery::discover_files(directory, recursive, pattern)?;
        let mut discovered = Vec::with_capacity(paths.len());
        for path in paths {
            match discovery::read_file_schema(&path, &self.config) {
                Ok(schema) => discovered.push(self.register_file(schema)),
                Err(err) => warn!("Could not parse {path:?}: {err}"),
            }
        }
        info!(
            "Discovered {} CSV file(s) under {directory:?}",
            discovered.len()
        );
        Ok(discovered)
    }

    /// Adds a schema to the registry, replacing any entry with the same path.
    pub fn register_file(&mut self, schema: FileSchema) -> Arc<FileSchema> {
        let schema = Arc::new(schema);
        self.files.insert(schema.path.clone(), Arc::clone(&schema));
        schema
    }

    pub fn files(&self) -> impl Iterator<Item = &Arc<FileSchema>> {
        self.files.values()
    }

    pub fn file(&self, path: &str) -> Option<&Arc<FileSchema>> {
        self.files.get(path)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn compute_similarity(&self, a: &FileSchema, b: &FileSchema) -> f64 {
        schema::similarity(a, b)
    }

    /// Partitions the registry at `threshold` and installs the result as the
    /// active grouping, discarding the previous one. An invalid threshold
    /// leaves the current grouping untouched.
    pub fn group_by_similarity(&mut self, threshold: f64) -> Result<&IndexMap<String, Group>> {
        let groups = grouping::partition(self.files.values().cloned(), threshold)?;
        self.groups = groups
            .into_iter()
            .map(|group| (group.name.clone(), group))
            .collect();
        info!(
            "Grouped {} file(s) into {} group(s) at threshold {threshold}",
            self.files.len(),
            self.groups.len()
        );
        Ok(&self.groups)
    }

    pub fn group_by_exact_match(&mut self) -> Result<&IndexMap<String, Group>> {
        self.group_by_similarity(EXACT_MATCH_THRESHOLD)
    }

    pub fn groups(&self) -> &IndexMap<String, Group> {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    /// File paths of a group; an unknown group has none.
    pub fn files_in_group(&self, name: &str) -> Vec<String> {
        self.group(name).map(Group::file_paths).unwrap_or_default()
    }

    fn require_group(&self, name: &str) -> Result<&Group> {
        self.group(name)
            .ok_or_else(|| GrouperError::UnknownGroup(name.to_string()))
    }

    pub fn register_processor<F>(&mut self, group_name: &str, processor: F)
    where
        F: Fn(&[String]) -> anyhow::Result<()> + 'static,
    {
        self.processors
            .insert(group_name.to_string(), Box::new(processor));
    }

    pub fn process_group(&self, group_name: &str) -> Result<()> {
        let group = self.require_group(group_name)?;
        let processor = self
            .processors
            .get(group_name)
            .ok_or_else(|| GrouperError::MissingProcessor(group_name.to_string()))?;
        processor(&group.file_paths()).map_err(|source| GrouperError::ProcessorFailed {
            group: group_name.to_string(),
            source,
        })
    }

    /// Streams `(path, row)` pairs for every file of a group. Fails before
    /// opening anything when the group does not exist.
    pub fn iter_group_rows(&self, group_name: &str) -> Result<GroupRows> {
        let group = self.require_group(group_name)?;
        Ok(GroupRows::new(group.files.clone(), self.config.encoding))
    }

    pub fn to_document(&self) -> GroupingDocument {
        GroupingDocument::new(self.groups.values(), self.config.sample_rows)
    }

    pub fn save_groupings(&self, path: &Path) -> Result<()> {
        self.to_document().save(path)?;
        info!("Saved {} group(s) to {path:?}", self.groups.len());
        Ok(())
    }

    pub fn load_groupings(&mut self, path: &Path) -> Result<&IndexMap<String, Group>> {
        let document = GroupingDocument::load(path)?;
        self.install_document(document);
        info!(
            "Loaded {} group(s) covering {} file(s) from {path:?}",
            self.groups.len(),
            self.files.len()
        );
        Ok(&self.groups)
    }

    /// Replaces the active grouping and rebuilds the file registry from it.
    pub fn install_document(&mut self, document: GroupingDocument) {
        self.files = document.file_registry();
        self.config.sample_rows = document.sample_rows;
        self.groups = document.groups;
    }

    pub fn group_summary(&self, name: &str) -> Result<String> {
        let group = self.require_group(name)?;
        let mut out = String::new();
        let _ = writeln!(out, "Group: {}", group.name);
        let _ = writeln!(out, "  Files: {}", group.files.len());
        let _ = writeln!(
            out,
            "  Similarity threshold: {:.0}%",
            group.similarity_threshold * 100.0
        );
        let preview = group
            .canonical_headers
            .iter()
            .take(HEADER_PREVIEW_LIMIT)
            .join(", ");
        let _ = writeln!(out, "  Headers: {preview}");
        if group.canonical_headers.len() > HEADER_PREVIEW_LIMIT {
            let _ = writeln!(
                out,
                "    ... and {} more",
                group.canonical_headers.len() - HEADER_PREVIEW_LIMIT
            );
        }
        Ok(out)
    }

    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "CSV Grouper Summary");
        let _ = writeln!(out, "==================");
        let _ = writeln!(out, "Total files: {}", self.files.len());
        let _ = writeln!(out, "Total groups: {}", self.groups.len());
        let _ = writeln!(out);
        for name in self.groups.keys() {
            if let Ok(block) = self.group_summary(name) {
                out.push_str(&block);
                out.push('\n');
            }
        }
        out
    }
}
