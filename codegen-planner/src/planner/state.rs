/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Per-artifact lifecycle.
//!
//! ```text
//! Unplanned ─► Planned ─┬─► Fresh ──┐
//!                       └─► Stale ◄─┤
//!                             │     │ (forced)
//!                             ▼     ▼
//!                          Generating ─┬─► Generated
//!                                      └─► Failed
//! ```
//!
//! `Fresh` and `Generated` fall back to `Stale` when the generator or source
//! changes.  `Failed` is left only through [`StateTable::request_rebuild`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::CodegenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArtifactState {
    #[default]
    Unplanned,
    Planned,
    Stale,
    Fresh,
    Generating,
    Generated,
    Failed,
}

impl ArtifactState {
    /// Whether `self → next` is an edge of the lifecycle graph.
    pub fn can_transition_to(self, next: ArtifactState) -> bool {
        use ArtifactState::*;
        matches!(
            (self, next),
            (Unplanned, Planned)
                | (Planned, Stale)
                | (Planned, Fresh)
                | (Fresh, Stale)
                | (Fresh, Generating)
                | (Stale, Stale)
                | (Stale, Generating)
                | (Generating, Generated)
                | (Generating, Failed)
                | (Generated, Stale)
                | (Generated, Fresh)
        )
    }

    /// Whether a change of generator or source can invalidate this state.
    fn is_invalidatable(self) -> bool {
        matches!(
            self,
            ArtifactState::Planned | ArtifactState::Fresh | ArtifactState::Generated
        )
    }
}

impl fmt::Display for ArtifactState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArtifactState::Unplanned => "unplanned",
            ArtifactState::Planned => "planned",
            ArtifactState::Stale => "stale",
            ArtifactState::Fresh => "fresh",
            ArtifactState::Generating => "generating",
            ArtifactState::Generated => "generated",
            ArtifactState::Failed => "failed",
        };
        f.pad(s)
    }
}

/// Current state of every artifact seen in this run.
#[derive(Debug, Default)]
pub struct StateTable {
    states: BTreeMap<PathBuf, ArtifactState>,
}

impl StateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// State of `path`; artifacts never seen are `Unplanned`.
    pub fn get(&self, path: &Path) -> ArtifactState {
        self.states.get(path).copied().unwrap_or_default()
    }

    /// Move `path` to `to`.
    ///
    /// # Errors
    /// [`CodegenError::InvalidTransition`] if the lifecycle has no such edge.
    pub fn advance(&mut self, path: &Path, to: ArtifactState) -> Result<(), CodegenError> {
        let from = self.get(path);
        if !from.can_transition_to(to) {
            return Err(CodegenError::InvalidTransition {
                path: path.to_path_buf(),
                from,
                to,
            });
        }
        debug!(artifact = %path.display(), %from, %to, "Artifact state change");
        self.states.insert(path.to_path_buf(), to);
        Ok(())
    }

    /// Move `Planned`, `Fresh` or `Generated` artifacts to `Stale`.
    ///
    /// Returns `true` if the state changed.  Other states are left alone.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        let current = self.get(path);
        if current.is_invalidatable() {
            debug!(artifact = %path.display(), from = %current, "Artifact invalidated");
            self.states.insert(path.to_path_buf(), ArtifactState::Stale);
            true
        } else {
            false
        }
    }

    /// Explicit rebuild request: put a `Failed` artifact back to `Planned`.
    ///
    /// Artifacts in any other state are unaffected.
    pub fn request_rebuild(&mut self, path: &Path) {
        if self.get(path) == ArtifactState::Failed {
            self.states.insert(path.to_path_buf(), ArtifactState::Planned);
        }
    }
}
