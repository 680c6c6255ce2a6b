//! Build context loading.
//!
//! A [`BuildContext`] is the one value object every component is constructed
//! from.  It is built once (defaults, then an optional YAML file, then CLI
//! overrides) and passed down explicitly.
//!
//! The expected YAML structure is (every key optional):
//! ```yaml
//! output_root: build/debug
//! top_bin: build/bin
//! include_root: src/
//! dump_tool: xxd
//! generators:
//!   sandesh: sandesh
//!   thrift: thrift
//!   schema: tools/generateds/generateDS.py
//! state_file: build/debug/.codegen-state.yaml
//! search_path: [/usr/bin, /usr/local/bin]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::mode::GeneratorFamily;

/// Default state-file name, placed under the output root.
pub const DEFAULT_STATE_FILE: &str = ".codegen-state.yaml";

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct BuildContextFile {
    output_root: Option<PathBuf>,
    top_bin: Option<PathBuf>,
    include_root: Option<String>,
    dump_tool: Option<String>,
    #[serde(default)]
    generators: GeneratorsEntry,
    state_file: Option<PathBuf>,
    search_path: Option<Vec<PathBuf>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct GeneratorsEntry {
    sandesh: Option<PathBuf>,
    thrift: Option<PathBuf>,
    schema: Option<PathBuf>,
}

// ── BuildContext ──────────────────────────────────────────────────────────────

/// Paths and tool names shared by planning, invocation and post-processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    /// Build variant directory; planned artifacts are placed under it.
    /// Side-by-side outputs of an absolute source path stay next to the
    /// source instead.
    pub output_root: PathBuf,
    /// Directory holding built generator executables.
    pub top_bin: PathBuf,
    /// Passed to the IDL compiler as `-I`.
    pub include_root: String,
    /// Byte-dump utility used to embed the web-view page.
    pub dump_tool: String,
    /// IDL compiler, relative to `top_bin` unless absolute.
    pub sandesh_binary: PathBuf,
    /// RPC compiler, relative to `top_bin` unless absolute.
    pub thrift_binary: PathBuf,
    /// Schema generator script, relative to the working directory.
    pub schema_generator: PathBuf,
    /// Explicit state-file location; `None` means `<output_root>/.codegen-state.yaml`.
    pub state_file: Option<PathBuf>,
    /// Directories probed for external tools.
    pub search_path: Vec<PathBuf>,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self {
            output_root: PathBuf::new(),
            top_bin: PathBuf::from("build/bin"),
            include_root: String::from("src/"),
            dump_tool: String::from("xxd"),
            sandesh_binary: PathBuf::from("sandesh"),
            thrift_binary: PathBuf::from("thrift"),
            schema_generator: PathBuf::from("tools/generateds/generateDS.py"),
            state_file: None,
            search_path: env_search_path(),
        }
    }
}

impl BuildContext {
    /// Defaults overlaid with the values present in the YAML file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, is not valid YAML, or
    /// contains unknown keys.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading build context from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open build context file: {}", path.display()))?;

        Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))
    }

    /// Same as [`load_from_file`](Self::load_from_file) for in-memory YAML.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // An empty document deserialises as unit, not as an empty mapping.
        let file: BuildContextFile = if content.trim().is_empty() {
            BuildContextFile::default()
        } else {
            serde_yaml::from_str(content)?
        };

        let defaults = Self::default();
        let ctx = Self {
            output_root: file.output_root.unwrap_or(defaults.output_root),
            top_bin: file.top_bin.unwrap_or(defaults.top_bin),
            include_root: file.include_root.unwrap_or(defaults.include_root),
            dump_tool: file.dump_tool.unwrap_or(defaults.dump_tool),
            sandesh_binary: file.generators.sandesh.unwrap_or(defaults.sandesh_binary),
            thrift_binary: file.generators.thrift.unwrap_or(defaults.thrift_binary),
            schema_generator: file.generators.schema.unwrap_or(defaults.schema_generator),
            state_file: file.state_file,
            search_path: file.search_path.unwrap_or(defaults.search_path),
        };

        debug!(
            output_root = %ctx.output_root.display(),
            top_bin = %ctx.top_bin.display(),
            include_root = %ctx.include_root,
            dump_tool = %ctx.dump_tool,
            "Build context resolved"
        );
        Ok(ctx)
    }

    /// Location of the generator executable for `family`.
    ///
    /// Compiled generators live under `top_bin`; the schema generator is a
    /// checked-in script addressed from the working directory.
    pub fn generator_path(&self, family: GeneratorFamily) -> PathBuf {
        match family {
            GeneratorFamily::Sandesh => self.top_bin.join(&self.sandesh_binary),
            GeneratorFamily::Thrift => self.top_bin.join(&self.thrift_binary),
            GeneratorFamily::Schema => self.schema_generator.clone(),
        }
    }

    /// Where the freshness ledger is stored.
    pub fn state_file_path(&self) -> PathBuf {
        self.state_file
            .clone()
            .unwrap_or_else(|| self.output_root.join(DEFAULT_STATE_FILE))
    }
}

/// `$PATH` split into directories, empty if unset.
fn env_search_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|p| std::env::split_paths(&p).collect())
        .unwrap_or_default()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
