/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Target planning for code-generation steps.
//!
//! [`TargetPlanner`] predicts, for one [`SourceUnit`] and one
//! [`GenerationMode`], every file the external generator will write, and
//! records that each of them depends on the generator executable.  The
//! prediction has to match the generator exactly; see
//! [`pipeline`](crate::pipeline) for the post-run check.
//!
//! # Placement
//!
//! | Layout | Artifact path |
//! |---|---|
//! | side by side | `<root>/<prefix><dir>/<stem><suffix>` |
//! | fixed subdirectory | `<root>/<prefix>/<sub>/<stem><suffix>` (source directories dropped, the generator does the same) |
//! | python package | `<root>/<prefix>gen_py/<module>/<file>` and `<module>.html` |
//!
//! Side-by-side paths are joined onto the root, so an absolute source path
//! keeps its outputs next to the source and the root does not apply.
//!
//! RPC plans additionally list `<Service>.cpp` for every declared service,
//! then `<Service>.h` for every declared service.

pub mod ledger;
pub mod state;

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::BuildContext;
use crate::error::CodegenError;
use crate::invoker::GeneratorHandle;
use crate::mode::{GenerationMode, Layout};
use crate::naming;
use crate::services::{PatternServiceExtractor, ServiceNameExtractor};

use state::StateTable;

// ── SourceUnit ────────────────────────────────────────────────────────────────

/// One interface-definition input file.  Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceUnit {
    path: PathBuf,
    basename: PathBuf,
}

impl SourceUnit {
    /// # Errors
    /// [`CodegenError::InvalidPath`] if `path` has no extension.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, CodegenError> {
        let path = path.into();
        let basename = naming::basename(&path)?;
        Ok(Self { path, basename })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path with the final extension stripped.
    pub fn basename(&self) -> &Path {
        &self.basename
    }

    /// File name without directories or extension (`foo/bar.sandesh` → `bar`).
    pub fn name(&self) -> String {
        naming::module_dir(&self.basename)
            .to_string_lossy()
            .into_owned()
    }

    /// The source's file name alone, directories dropped.
    fn file_name(&self) -> &Path {
        self.path
            .file_name()
            .map(Path::new)
            .unwrap_or(self.path.as_path())
    }
}

// ── ArtifactSpec / Plan ───────────────────────────────────────────────────────

/// One predicted output file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactSpec {
    pub path: PathBuf,
    pub mode: GenerationMode,
    pub source: PathBuf,
}

/// The complete prediction for one source unit and mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub unit: SourceUnit,
    pub mode: GenerationMode,
    pub generator: GeneratorHandle,
    /// Directory handed to the generator.
    pub out_dir: PathBuf,
    /// Ordered; follows the mode's suffix list.
    pub artifacts: Vec<ArtifactSpec>,
}

impl Plan {
    pub fn paths(&self) -> Vec<PathBuf> {
        self.artifacts.iter().map(|a| a.path.clone()).collect()
    }
}

// ── DependencyGraph ───────────────────────────────────────────────────────────

/// Artifact → generator edges.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    dependents: BTreeMap<GeneratorHandle, BTreeSet<PathBuf>>,
    generator_of: BTreeMap<PathBuf, GeneratorHandle>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that every artifact depends on `handle`.
    pub fn register(&mut self, artifacts: &[ArtifactSpec], handle: &GeneratorHandle) {
        let entry = self.dependents.entry(handle.clone()).or_default();
        for a in artifacts {
            entry.insert(a.path.clone());
            self.generator_of.insert(a.path.clone(), handle.clone());
        }
    }

    /// Artifacts that depend on `handle`, sorted.
    pub fn dependents(&self, handle: &GeneratorHandle) -> Vec<&Path> {
        self.dependents
            .get(handle)
            .map(|set| set.iter().map(PathBuf::as_path).collect())
            .unwrap_or_default()
    }

    pub fn generator_of(&self, artifact: &Path) -> Option<&GeneratorHandle> {
        self.generator_of.get(artifact)
    }

    /// The generator behind `handle` was rebuilt: every dependent artifact
    /// that was planned, fresh or generated becomes stale.
    ///
    /// Returns the artifacts whose state changed.
    pub fn generator_changed(
        &self,
        handle: &GeneratorHandle,
        states: &mut StateTable,
    ) -> Vec<PathBuf> {
        let changed: Vec<PathBuf> = self
            .dependents(handle)
            .into_iter()
            .filter(|p| states.invalidate(p))
            .map(Path::to_path_buf)
            .collect();
        info!(
            generator = %handle,
            invalidated = changed.len(),
            "Generator changed; dependents invalidated"
        );
        changed
    }
}

// ── TargetPlanner ─────────────────────────────────────────────────────────────

/// Predicts generator outputs and records their dependency on the generator.
pub struct TargetPlanner {
    ctx: Arc<BuildContext>,
    extractor: Box<dyn ServiceNameExtractor>,
    graph: DependencyGraph,
}

impl TargetPlanner {
    /// Planner using the fixed-pattern service scanner.
    pub fn new(ctx: Arc<BuildContext>) -> Self {
        Self::with_extractor(ctx, Box::new(PatternServiceExtractor::new()))
    }

    pub fn with_extractor(ctx: Arc<BuildContext>, extractor: Box<dyn ServiceNameExtractor>) -> Self {
        Self {
            ctx,
            extractor,
            graph: DependencyGraph::new(),
        }
    }

    /// Predict every artifact of `unit` under `mode`.
    pub fn plan(&self, unit: &SourceUnit, mode: GenerationMode) -> Result<Plan, CodegenError> {
        self.plan_with_prefix(unit, mode, "")
    }

    /// Like [`plan`](Self::plan), with `prefix` prepended to every derived
    /// name.
    ///
    /// For fixed-subdirectory layouts the prefix names the directory that
    /// holds the subdirectory: `p` and `p/` both give `<root>/p/gen-c/…`.
    ///
    /// # Errors
    /// * [`CodegenError::InvalidPath`] if names cannot be derived.
    /// * [`CodegenError::Io`] if an RPC source cannot be read.
    pub fn plan_with_prefix(
        &self,
        unit: &SourceUnit,
        mode: GenerationMode,
        prefix: &str,
    ) -> Result<Plan, CodegenError> {
        let spec = mode.spec();
        let root = &self.ctx.output_root;

        let (out_dir, mut paths) = match spec.layout {
            Layout::Beside => {
                if unit.path().is_absolute() && !root.as_os_str().is_empty() {
                    debug!(
                        source = %unit.path().display(),
                        "Absolute source path; outputs go beside it, not under the output root"
                    );
                }
                let paths: Vec<PathBuf> = naming::derive_targets(unit.path(), spec.suffixes, prefix)?
                    .into_iter()
                    .map(|p| root.join(p))
                    .collect();
                let out_dir = paths
                    .first()
                    .and_then(|p| p.parent())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.clone());
                (out_dir, paths)
            }
            Layout::Under(sub) => {
                // The generator only takes the directory that holds `sub`, so
                // a prefix here can only ever name a directory.
                let out_dir = match prefix.trim_end_matches('/') {
                    "" => root.clone(),
                    dir => root.join(dir),
                };
                let paths: Vec<PathBuf> =
                    naming::derive_targets(unit.file_name(), spec.suffixes, sub)?
                        .into_iter()
                        .map(|p| out_dir.join(p))
                        .collect();
                (out_dir, paths)
            }
            Layout::PyPackage => {
                let module = naming::module_dir(unit.basename());
                let package = root.join(format!("{}gen_py", prefix)).join(&module);
                let mut paths: Vec<PathBuf> =
                    spec.suffixes.iter().map(|f| package.join(f)).collect();
                let mut html = OsString::from(&module);
                html.push(".html");
                paths.push(package.join(html));
                (package, paths)
            }
        };

        if spec.per_service_outputs {
            let services = self.extractor.extract_from_file(unit.path())?;
            let dir = match spec.layout {
                Layout::Under(sub) => out_dir.join(sub),
                _ => out_dir.clone(),
            };
            debug!(source = %unit.path().display(), ?services, "Declared services");
            paths.extend(services.iter().map(|s| dir.join(format!("{}.cpp", s))));
            paths.extend(services.iter().map(|s| dir.join(format!("{}.h", s))));
        }

        let artifacts: Vec<ArtifactSpec> = paths
            .into_iter()
            .map(|path| ArtifactSpec {
                path,
                mode,
                source: unit.path().to_path_buf(),
            })
            .collect();

        info!(
            source = %unit.path().display(),
            mode = %mode,
            artifact_count = artifacts.len(),
            "Planned generation targets"
        );

        Ok(Plan {
            unit: unit.clone(),
            mode,
            generator: GeneratorHandle::resolve(&self.ctx, mode.family()),
            out_dir,
            artifacts,
        })
    }

    /// Declare every artifact dependent on `handle`.
    pub fn register_dependency(&mut self, artifacts: &[ArtifactSpec], handle: &GeneratorHandle) {
        self.graph.register(artifacts, handle);
        debug!(generator = %handle, artifact_count = artifacts.len(), "Dependencies registered");
    }

    pub fn dependency_graph(&self) -> &DependencyGraph {
        &self.graph
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
