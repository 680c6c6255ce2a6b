/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for code-generation planning and execution.
//!
//! Two layers model the two ways a generation step can go wrong:
//!
//! * [`ExitReason`] — how an external process finished when it did not
//!   succeed (exit code or terminating signal).
//! * [`CodegenError`] — top-level failure returned from planning, invoking,
//!   post-processing or recording a generation step.
//!
//! | Variant | Scope |
//! |---|---|
//! | `InvalidPath` | aborts planning for one source unit |
//! | `ToolMissing` | aborts one generation step before any process is spawned |
//! | `GenerationFailed` | stops the whole build run |
//! | `PredictionMismatch` | stops the whole build run |
//! | `InvalidTransition` | programming error in the caller's state handling |
//! | `Io` / `Ledger` | local filesystem failures |
//!
//! Nothing here is retried: code generation is deterministic, so a failure
//! without an input change would fail again.

use std::path::PathBuf;

use thiserror::Error;

use crate::planner::state::ArtifactState;

// ── Process exit ──────────────────────────────────────────────────────────────

/// How a failed child process finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The process returned a nonzero exit code.
    Code(i32),
    /// The process was terminated by a signal (Unix only).
    Signal(i32),
    /// Neither code nor signal was reported.
    Unknown,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitReason::Code(code) => write!(f, "program returned {}", code),
            ExitReason::Signal(sig) => write!(f, "terminated by signal: {}", sig),
            ExitReason::Unknown => write!(f, "terminated without an exit status"),
        }
    }
}

// ── Top-level errors ──────────────────────────────────────────────────────────

/// Error type for every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// The source path has no extension to strip.
    #[error("invalid source path '{}': no file extension", path.display())]
    InvalidPath { path: PathBuf },

    /// A required external utility is not present on the host.
    #[error("{tool} not detected on system")]
    ToolMissing { tool: String },

    /// The external generator could not be started or exited unsuccessfully.
    #[error("{generator} code generation failed for '{}': {reason}", source_path.display())]
    GenerationFailed {
        generator: String,
        source_path: PathBuf,
        reason: ExitReason,
    },

    /// The generator succeeded but did not write every predicted artifact.
    #[error("{generator} did not produce {} predicted artifact(s): {missing:?}", missing.len())]
    PredictionMismatch {
        generator: String,
        missing: Vec<PathBuf>,
    },

    /// An artifact was asked to move between two states that are not linked.
    #[error("artifact '{}' cannot move from {from} to {to}", path.display())]
    InvalidTransition {
        path: PathBuf,
        from: ArtifactState,
        to: ArtifactState,
    },

    /// A filesystem operation on `path` failed.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The freshness ledger could not be parsed or serialised.
    #[error("freshness ledger '{}' is unreadable: {source}", path.display())]
    Ledger {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl CodegenError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CodegenError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_reason_messages_match_test_log_wording() {
        assert_eq!(ExitReason::Code(2).to_string(), "program returned 2");
        assert_eq!(ExitReason::Signal(9).to_string(), "terminated by signal: 9");
    }

    #[test]
    fn generation_failed_names_generator_and_source() {
        let err = CodegenError::GenerationFailed {
            generator: "sandesh".into(),
            source_path: PathBuf::from("foo/bar.sandesh"),
            reason: ExitReason::Code(2),
        };
        let msg = err.to_string();
        assert!(msg.contains("sandesh"));
        assert!(msg.contains("foo/bar.sandesh"));
        assert!(msg.contains("program returned 2"));
    }

    #[test]
    fn tool_missing_message() {
        let err = CodegenError::ToolMissing { tool: "xxd".into() };
        assert_eq!(err.to_string(), "xxd not detected on system");
    }
}
