/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! One code-generation step, end to end.
//!
//! ```text
//! plan ─► refresh (fresh / stale) ─► pre-flight ─► invoke ─► reconcile ─► finalize ─► record
//!                                        │            │          │            │
//!                                        └────────────┴──────────┴────────────┴─► Failed
//! ```
//!
//! The caller is responsible for never running two steps for the same
//! source unit at once; post-processing edits files in place.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::BuildContext;
use crate::error::CodegenError;
use crate::invoker::{fingerprint_file, GeneratorHandle, GeneratorInvoker};
use crate::mode::GenerationMode;
use crate::planner::ledger::{FreshnessLedger, GenerationRecord};
use crate::planner::state::{ArtifactState, StateTable};
use crate::planner::{ArtifactSpec, Plan, SourceUnit, TargetPlanner};
use crate::postprocess::PostProcessor;

/// Result of [`CodegenPipeline::generate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every artifact was already fresh; nothing ran.
    UpToDate,
    /// The generator ran and every artifact is now generated.
    Generated,
}

pub struct CodegenPipeline {
    planner: TargetPlanner,
    invoker: GeneratorInvoker,
    post: PostProcessor,
    ledger: FreshnessLedger,
    states: StateTable,
}

impl CodegenPipeline {
    /// Build every component from `ctx` and load the freshness ledger.
    pub fn new(ctx: Arc<BuildContext>) -> Result<Self, CodegenError> {
        let planner = TargetPlanner::new(Arc::clone(&ctx));
        Self::with_planner(ctx, planner)
    }

    /// Same as [`new`](Self::new) with a caller-supplied planner.
    pub fn with_planner(ctx: Arc<BuildContext>, planner: TargetPlanner) -> Result<Self, CodegenError> {
        let ledger = FreshnessLedger::load(ctx.state_file_path())?;
        Ok(Self {
            planner,
            invoker: GeneratorInvoker::new(Arc::clone(&ctx)),
            post: PostProcessor::new(ctx),
            ledger,
            states: StateTable::new(),
        })
    }

    /// Plan `source` under `mode` and register the generator dependency.
    pub fn plan(
        &mut self,
        source: &Path,
        mode: GenerationMode,
        prefix: &str,
    ) -> Result<Plan, CodegenError> {
        let unit = SourceUnit::new(source)?;
        let plan = self.planner.plan_with_prefix(&unit, mode, prefix)?;
        self.planner
            .register_dependency(&plan.artifacts, &plan.generator);
        self.ensure_planned(&plan)?;
        Ok(plan)
    }

    pub fn state(&self, artifact: &Path) -> ArtifactState {
        self.states.get(artifact)
    }

    /// Current state of every artifact in `plan`, in plan order.
    pub fn status<'p>(&self, plan: &'p Plan) -> Vec<(&'p ArtifactSpec, ArtifactState)> {
        plan.artifacts
            .iter()
            .map(|a| (a, self.states.get(&a.path)))
            .collect()
    }

    /// Re-evaluate freshness against the ledger and the current
    /// fingerprints of generator and source.
    ///
    /// Artifacts that are failed or mid-generation keep their state.
    pub fn refresh(&mut self, plan: &Plan) -> Result<(), CodegenError> {
        self.ensure_planned(plan)?;
        let current = current_record(plan);
        if current.is_none() {
            debug!(
                generator = %plan.generator,
                "Generator or source not readable; treating all artifacts as stale"
            );
        }

        for a in &plan.artifacts {
            let fresh = current
                .as_ref()
                .is_some_and(|r| self.ledger.is_fresh(&a.path, r));
            let target = if fresh {
                ArtifactState::Fresh
            } else {
                ArtifactState::Stale
            };
            let state = self.states.get(&a.path);
            if state != target && state.can_transition_to(target) {
                self.states.advance(&a.path, target)?;
            }
        }
        Ok(())
    }

    /// The generator behind `handle` was rebuilt.
    ///
    /// Returns every artifact that went stale as a result.
    pub fn generator_changed(&mut self, handle: &GeneratorHandle) -> Vec<PathBuf> {
        self.planner
            .dependency_graph()
            .generator_changed(handle, &mut self.states)
    }

    /// Explicit rebuild request: failed artifacts of `plan` become planned.
    pub fn request_rebuild(&mut self, plan: &Plan) {
        for a in &plan.artifacts {
            self.states.request_rebuild(&a.path);
        }
    }

    /// Run the generation step for `plan` if any artifact is stale, or
    /// unconditionally when `force` is set.
    ///
    /// `force` also counts as an explicit rebuild request for artifacts that
    /// failed earlier in this run.
    ///
    /// # Errors
    /// * [`CodegenError::InvalidTransition`] if an artifact already failed
    ///   and no rebuild was requested.
    /// * [`CodegenError::ToolMissing`] from pre-flight; nothing was spawned.
    /// * [`CodegenError::GenerationFailed`] / [`CodegenError::PredictionMismatch`]
    ///   / [`CodegenError::Io`] from the step itself; every artifact of the
    ///   plan is then `Failed` and its ledger record dropped.
    pub fn generate(&mut self, plan: &Plan, force: bool) -> Result<Outcome, CodegenError> {
        if force {
            self.request_rebuild(plan);
        }
        self.refresh(plan)?;

        for a in &plan.artifacts {
            let state = self.states.get(&a.path);
            if !state.can_transition_to(ArtifactState::Generating) {
                return Err(CodegenError::InvalidTransition {
                    path: a.path.clone(),
                    from: state,
                    to: ArtifactState::Generating,
                });
            }
        }

        let all_fresh = plan
            .artifacts
            .iter()
            .all(|a| self.states.get(&a.path) == ArtifactState::Fresh);
        if all_fresh && !force {
            info!(source = %plan.unit.path().display(), mode = %plan.mode, "Up to date");
            return Ok(Outcome::UpToDate);
        }

        // Checked before anything is spawned or any state moves.
        self.post.preflight(plan.mode)?;

        for a in &plan.artifacts {
            self.states.advance(&a.path, ArtifactState::Generating)?;
        }

        match self.run_step(plan) {
            Ok(()) => {
                let record = current_record(plan);
                for a in &plan.artifacts {
                    self.states.advance(&a.path, ArtifactState::Generated)?;
                    match &record {
                        Some(r) => self.ledger.record(&a.path, r.clone()),
                        None => self.ledger.forget(&a.path),
                    }
                }
                self.ledger.save()?;
                info!(
                    source = %plan.unit.path().display(),
                    mode = %plan.mode,
                    artifact_count = plan.artifacts.len(),
                    "Generation complete"
                );
                Ok(Outcome::Generated)
            }
            Err(e) => {
                error!(
                    source = %plan.unit.path().display(),
                    mode = %plan.mode,
                    "Generation step failed: {}",
                    e
                );
                for a in &plan.artifacts {
                    self.states.advance(&a.path, ArtifactState::Failed)?;
                    self.ledger.forget(&a.path);
                }
                if let Err(save_err) = self.ledger.save() {
                    warn!("Could not update freshness ledger: {}", save_err);
                }
                Err(e)
            }
        }
    }

    fn ensure_planned(&mut self, plan: &Plan) -> Result<(), CodegenError> {
        for a in &plan.artifacts {
            if self.states.get(&a.path) == ArtifactState::Unplanned {
                self.states.advance(&a.path, ArtifactState::Planned)?;
            }
        }
        Ok(())
    }

    fn run_step(&self, plan: &Plan) -> Result<(), CodegenError> {
        create_parent_dirs(plan)?;
        self.invoker
            .invoke(&plan.generator, plan.mode, plan.unit.path(), &plan.out_dir)?;
        reconcile(plan)?;
        self.post
            .finalize(plan.mode, &plan.out_dir, &plan.unit.name())
    }
}

/// Mode of `plan` plus the fingerprints of its generator and source as
/// they are now.
fn current_record(plan: &Plan) -> Option<GenerationRecord> {
    let generator = plan.generator.fingerprint().ok()?;
    let source = fingerprint_file(plan.unit.path()).ok()?;
    Some(GenerationRecord {
        mode: plan.mode.name().to_string(),
        generator,
        source,
    })
}

fn create_parent_dirs(plan: &Plan) -> Result<(), CodegenError> {
    let dirs: BTreeSet<&Path> = plan
        .artifacts
        .iter()
        .filter_map(|a| a.path.parent())
        .chain(std::iter::once(plan.out_dir.as_path()))
        .filter(|d| !d.as_os_str().is_empty())
        .collect();
    for d in dirs {
        std::fs::create_dir_all(d).map_err(|e| CodegenError::io(d, e))?;
    }
    Ok(())
}

/// Every predicted artifact must exist after the generator ran.
///
/// Files the generator wrote beyond the prediction are only logged: the
/// output directory is shared with other steps.
fn reconcile(plan: &Plan) -> Result<(), CodegenError> {
    let missing: Vec<PathBuf> = plan
        .artifacts
        .iter()
        .filter(|a| !a.path.is_file())
        .map(|a| a.path.clone())
        .collect();
    if !missing.is_empty() {
        return Err(CodegenError::PredictionMismatch {
            generator: plan.generator.family.tag().to_string(),
            missing,
        });
    }

    let predicted: BTreeSet<&Path> = plan.artifacts.iter().map(|a| a.path.as_path()).collect();
    let dir = if plan.out_dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        plan.out_dir.as_path()
    };
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = plan.out_dir.join(entry.file_name());
            if path.is_file() && !predicted.contains(path.as_path()) {
                debug!(file = %path.display(), "Unpredicted file in output directory");
            }
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
