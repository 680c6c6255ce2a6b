/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Persisted generation records.
//!
//! For every artifact that was generated successfully the ledger keeps the
//! mode it was generated under and the fingerprints of the generator
//! executable and of the source file at that moment.  On the next run an
//! artifact is fresh only if its file still exists and all three match.
//! Several modes share output paths (`native-only` / `native-web-view`,
//! `rpc` / `rpc-async`), so the mode is part of the record.
//!
//! ```yaml
//! artifacts:
//!   foo/bar_types.h:
//!     mode: native-only
//!     generator: 3f1a…
//!     source: 9c0e…
//! ```

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::CodegenError;

/// Fingerprints recorded for one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Mode name; records written without one never match.
    #[serde(default)]
    pub mode: String,
    pub generator: String,
    pub source: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    artifacts: BTreeMap<PathBuf, GenerationRecord>,
}

#[derive(Debug)]
pub struct FreshnessLedger {
    path: PathBuf,
    records: BTreeMap<PathBuf, GenerationRecord>,
}

impl FreshnessLedger {
    /// An empty ledger that will be saved to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: BTreeMap::new(),
        }
    }

    /// Read the ledger at `path`; a missing file is an empty ledger.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, CodegenError> {
        let path = path.into();
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(ledger = %path.display(), "No freshness ledger yet");
                return Ok(Self::empty(path));
            }
            Err(e) => return Err(CodegenError::io(&path, e)),
        };

        let file: LedgerFile = if content.trim().is_empty() {
            LedgerFile::default()
        } else {
            serde_yaml::from_str(&content).map_err(|source| CodegenError::Ledger {
                path: path.clone(),
                source,
            })?
        };
        debug!(
            ledger = %path.display(),
            records = file.artifacts.len(),
            "Freshness ledger loaded"
        );
        Ok(Self {
            path,
            records: file.artifacts,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, artifact: &Path) -> Option<&GenerationRecord> {
        self.records.get(artifact)
    }

    pub fn record(&mut self, artifact: &Path, record: GenerationRecord) {
        self.records.insert(artifact.to_path_buf(), record);
    }

    pub fn forget(&mut self, artifact: &Path) {
        self.records.remove(artifact);
    }

    /// `true` if `artifact` exists on disk and was generated under exactly
    /// `current` mode, generator and source.
    pub fn is_fresh(&self, artifact: &Path, current: &GenerationRecord) -> bool {
        artifact.is_file() && self.records.get(artifact) == Some(current)
    }

    /// Write the ledger through a temporary file renamed into place.
    pub fn save(&self) -> Result<(), CodegenError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| CodegenError::io(dir, e))?;

        let file = LedgerFile {
            artifacts: self.records.clone(),
        };
        let yaml = serde_yaml::to_string(&file).map_err(|source| CodegenError::Ledger {
            path: self.path.clone(),
            source,
        })?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| CodegenError::io(dir, e))?;
        tmp.write_all(yaml.as_bytes())
            .map_err(|e| CodegenError::io(&self.path, e))?;
        tmp.persist(&self.path)
            .map_err(|e| CodegenError::io(&self.path, e.error))?;

        info!(
            ledger = %self.path.display(),
            records = self.records.len(),
            "Freshness ledger saved"
        );
        Ok(())
    }
}
