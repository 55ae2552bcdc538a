//! Dual-format persistence for the policy table.
//!
//! Two representations are written side by side: a bincode snapshot that is
//! authoritative for loading, and a flattened tabular export (plus a JSON
//! metadata document with the learning parameters) meant for offline review
//! and diffing. `load` prefers the snapshot and falls back to the tabular
//! form, so a corrupt binary never strands a trained policy; when both are
//! unreadable the caller gets an empty table and a [`LoadSource::Empty`]
//! report instead of an error.
//!
//! Each file is written to a `.tmp` sibling and renamed into place, so a
//! crash mid-save leaves every file individually self-consistent even if
//! one format is stale relative to the other.

use crate::error::{QTableError, Result};
use crate::{iso8601_now, warn_recoverable, LearningParams, QTable, ValueEstimate};
use heimakt_core::StateKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Snapshot layout version; bump on incompatible changes.
const SNAPSHOT_VERSION: u32 = 1;

/// Header of the tabular export. One row per learned (state, action) pair.
const TABULAR_HEADER: &str = "state,action,q_value,action_count,state_visits,last_updated";

/// Where the three persisted files live.
#[derive(Debug, Clone)]
pub struct PolicyPaths {
    /// Authoritative bincode snapshot.
    pub snapshot: PathBuf,
    /// Flattened tabular export, for inspection and fallback recovery.
    pub tabular: PathBuf,
    /// Learning-parameter metadata companion of the tabular export.
    pub metadata: PathBuf,
}

impl PolicyPaths {
    /// Conventional file names inside a model directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            snapshot: dir.join("policy.bin"),
            tabular: dir.join("policy.csv"),
            metadata: dir.join("policy.meta.json"),
        }
    }
}

/// Which persisted form a table was reconstructed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// The bincode snapshot decoded cleanly.
    Authoritative,
    /// The snapshot was missing or unreadable; rebuilt from the tabular form.
    Tabular,
    /// Neither form was usable; starting from an empty table.
    Empty,
}

#[derive(Serialize, Deserialize)]
struct PolicySnapshot {
    version: u32,
    params: LearningParams,
    table: BTreeMap<String, BTreeMap<String, ValueEstimate>>,
    visits: BTreeMap<String, u64>,
}

#[derive(Serialize, Deserialize)]
struct PolicyMetadata {
    params: LearningParams,
    total_states: usize,
    total_pairs: usize,
    exported_at: String,
}

impl QTable {
    /// Persist both forms, authoritative snapshot first.
    ///
    /// A write failure is returned to the caller; the in-memory table is
    /// untouched and remains usable.
    pub fn save(&self, paths: &PolicyPaths) -> Result<()> {
        let snapshot = PolicySnapshot {
            version: SNAPSHOT_VERSION,
            params: self.params().clone(),
            table: self
                .table()
                .iter()
                .map(|(s, actions)| (s.as_str().to_string(), actions.clone()))
                .collect(),
            visits: self
                .visit_map()
                .iter()
                .map(|(s, v)| (s.as_str().to_string(), *v))
                .collect(),
        };
        write_atomic(&paths.snapshot, &bincode::serialize(&snapshot)?)?;

        write_atomic(&paths.tabular, self.render_tabular().as_bytes())?;

        let metadata = PolicyMetadata {
            params: self.params().clone(),
            total_states: self.state_count(),
            total_pairs: self.pair_count(),
            exported_at: iso8601_now(),
        };
        write_atomic(&paths.metadata, &serde_json::to_vec_pretty(&metadata)?)?;

        Ok(())
    }

    /// Reconstruct a table, preferring the authoritative snapshot.
    ///
    /// Decode failures never escape this function: they are warned through
    /// the telemetry hook and degrade to the tabular fallback, then to an
    /// empty table with the supplied `defaults`.
    pub fn load(paths: &PolicyPaths, defaults: LearningParams) -> (Self, LoadSource) {
        match load_snapshot(&paths.snapshot) {
            Ok(Some(table)) => return (table, LoadSource::Authoritative),
            Ok(None) => {}
            Err(err) => {
                warn_recoverable(&format!(
                    "snapshot {} unreadable ({err}), falling back to tabular form",
                    paths.snapshot.display()
                ));
            }
        }

        match load_tabular(paths, &defaults) {
            Ok(Some(table)) => (table, LoadSource::Tabular),
            Ok(None) => (QTable::new(defaults), LoadSource::Empty),
            Err(err) => {
                warn_recoverable(&format!(
                    "tabular form {} unreadable ({err}), starting with an empty policy",
                    paths.tabular.display()
                ));
                (QTable::new(defaults), LoadSource::Empty)
            }
        }
    }

    fn render_tabular(&self) -> String {
        let mut out = String::from(TABULAR_HEADER);
        out.push('\n');
        for (state, actions) in self.table() {
            let visits = self.visits(state);
            for (action, estimate) in actions {
                out.push_str(&format!(
                    "{},{},{},{},{},{}\n",
                    state, action, estimate.q, estimate.count, visits, estimate.last_updated
                ));
            }
        }
        out
    }
}

fn load_snapshot(path: &Path) -> Result<Option<QTable>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(path)?;
    let snapshot: PolicySnapshot = bincode::deserialize(&bytes)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(QTableError::UnsupportedVersion(snapshot.version));
    }

    let table = snapshot
        .table
        .into_iter()
        .map(|(s, actions)| (StateKey::from_raw(s), actions))
        .collect();
    let visits = snapshot
        .visits
        .into_iter()
        .map(|(s, v)| (StateKey::from_raw(s), v))
        .collect();
    Ok(Some(QTable::from_parts(snapshot.params, table, visits)))
}

fn load_tabular(paths: &PolicyPaths, defaults: &LearningParams) -> Result<Option<QTable>> {
    if !paths.tabular.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&paths.tabular)?;
    let mut lines = content.lines();

    match lines.next() {
        Some(header) if header == TABULAR_HEADER => {}
        Some(other) => {
            return Err(QTableError::Tabular(format!(
                "unexpected header: {other:?}"
            )))
        }
        None => return Err(QTableError::Tabular("empty file".to_string())),
    }

    let mut table: BTreeMap<StateKey, BTreeMap<String, ValueEstimate>> = BTreeMap::new();
    let mut visits: BTreeMap<StateKey, u64> = BTreeMap::new();

    for (lineno, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 6 {
            return Err(QTableError::Tabular(format!(
                "row {}: expected 6 fields, got {}",
                lineno + 2,
                fields.len()
            )));
        }
        let q: f32 = fields[2]
            .parse()
            .map_err(|_| QTableError::Tabular(format!("row {}: bad q_value", lineno + 2)))?;
        let count: u64 = fields[3]
            .parse()
            .map_err(|_| QTableError::Tabular(format!("row {}: bad action_count", lineno + 2)))?;
        let state_visits: u64 = fields[4]
            .parse()
            .map_err(|_| QTableError::Tabular(format!("row {}: bad state_visits", lineno + 2)))?;

        let state = StateKey::from_raw(fields[0]);
        table.entry(state.clone()).or_default().insert(
            fields[1].to_string(),
            ValueEstimate {
                q,
                count,
                last_updated: fields[5].to_string(),
            },
        );
        let entry = visits.entry(state).or_insert(0);
        *entry = (*entry).max(state_visits);
    }

    // The metadata companion restores the learning parameters (epsilon in
    // particular); without it the supplied defaults stand.
    let params = match load_metadata(&paths.metadata) {
        Ok(Some(metadata)) => metadata.params,
        Ok(None) => defaults.clone(),
        Err(err) => {
            warn_recoverable(&format!(
                "metadata {} unreadable ({err}), keeping default parameters",
                paths.metadata.display()
            ));
            defaults.clone()
        }
    };

    Ok(Some(QTable::from_parts(params, table, visits)))
}

fn load_metadata(path: &Path) -> Result<Option<PolicyMetadata>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

/// Write to a `.tmp` sibling, then rename into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = tmp_sibling(path);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}
