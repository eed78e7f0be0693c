//! Greedy, seed-based partitioning of file schemas.
//!
//! Each round removes the first ungrouped schema as the seed, then sweeps the
//! rest of the working list once and claims every candidate whose similarity
//! to the seed meets the threshold. Membership is decided against the seed
//! only, so two non-seed members of a group may be less similar to each other
//! than the threshold.

use std::{
    collections::{BTreeSet, VecDeque},
    sync::Arc,
};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{GrouperError, Result},
    schema::{FileSchema, jaccard},
};

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;
pub const EXACT_MATCH_THRESHOLD: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    #[serde(alias = "canonicalHeaders")]
    pub canonical_headers: Vec<String>,
    #[serde(default)]
    pub files: Vec<Arc<FileSchema>>,
    #[serde(default = "Group::default_threshold", alias = "similarityThreshold")]
    pub similarity_threshold: f64,
}

impl Group {
    fn seeded(name: String, seed: Arc<FileSchema>, threshold: f64) -> Self {
        Self {
            name,
            canonical_headers: seed.headers.clone(),
            files: vec![seed],
            similarity_threshold: threshold,
        }
    }

    pub const fn default_threshold() -> f64 {
        EXACT_MATCH_THRESHOLD
    }

    pub fn file_paths(&self) -> Vec<String> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

pub fn group_name(ordinal: usize) -> String {
    format!("group_{ordinal}")
}

pub fn validate_threshold(threshold: f64) -> Result<()> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(GrouperError::InvalidThreshold(threshold))
    }
}

/// Partitions `schemas` into groups named `group_1`, `group_2`, ... in
/// creation order. Input order decides seeds and member order.
pub fn partition<I>(schemas: I, threshold: f64) -> Result<Vec<Group>>
where
    I: IntoIterator<Item = Arc<FileSchema>>,
{
    validate_threshold(threshold)?;

    let mut ungrouped: VecDeque<(Arc<FileSchema>, BTreeSet<String>)> = schemas
        .into_iter()
        .map(|schema| {
            let fields = schema.field_set();
            (schema, fields)
        })
        .collect();
    let mut groups = Vec::new();

    while let Some((seed, seed_fields)) = ungrouped.pop_front() {
        let mut group = Group::seeded(group_name(groups.len() + 1), seed, threshold);
        let mut remaining = VecDeque::with_capacity(ungrouped.len());
        for (candidate, fields) in ungrouped.drain(..) {
            let score = jaccard(&seed_fields, &fields);
            if score >= threshold {
                debug!(
                    "{} joins {} (similarity {score:.3})",
                    candidate.path, group.name
                );
                group.files.push(candidate);
            } else {
                remaining.push_back((candidate, fields));
            }
        }
        ungrouped = remaining;
        groups.push(group);
    }

    Ok(groups)
}

pub fn exact_match<I>(schemas: I) -> Result<Vec<Group>>
where
    I: IntoIterator<Item = Arc<FileSchema>>,
{
    partition(schemas, EXACT_MATCH_THRESHOLD)
}
