/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! External generator invocation.
//!
//! [`GeneratorInvoker`] turns a [`CommandTemplate`] into concrete argument
//! lists and runs them as child processes, one at a time, waiting for each
//! to exit.  The generator writes its files as a side effect; which files
//! those are is predicted by the planner, not controlled here.
//!
//! ```text
//! sandesh --gen cpp [--gen html] -I <inc> -out <dir>/ <src>
//! thrift  --gen cpp[:async] -o <dir> <src>
//! ```

pub mod probe;

pub use probe::detect_tool;

use std::ffi::OsString;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::{debug, error, info};

use crate::config::BuildContext;
use crate::error::{CodegenError, ExitReason};
use crate::mode::{CommandTemplate, GenerationMode, GeneratorFamily};

// ── GeneratorHandle ───────────────────────────────────────────────────────────

/// Reference to a pre-built generator executable.
///
/// Not owned by this crate: it must exist and be up to date before any
/// artifact depending on it is generated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeneratorHandle {
    pub family: GeneratorFamily,
    pub path: PathBuf,
}

impl GeneratorHandle {
    /// Handle for `family`, resolved against the build context.
    pub fn resolve(ctx: &BuildContext, family: GeneratorFamily) -> Self {
        Self {
            family,
            path: ctx.generator_path(family),
        }
    }

    /// SHA-256 of the executable's bytes, hex encoded.
    ///
    /// Two builds of the generator that differ in any byte yield different
    /// fingerprints, which is what invalidates previously generated code.
    pub fn fingerprint(&self) -> Result<String, CodegenError> {
        fingerprint_file(&self.path)
    }
}

impl fmt::Display for GeneratorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.family.tag(), self.path.display())
    }
}

/// SHA-256 of a file's contents, hex encoded.
pub fn fingerprint_file(path: &Path) -> Result<String, CodegenError> {
    let mut file = std::fs::File::open(path).map_err(|e| CodegenError::io(path, e))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf).map_err(|e| CodegenError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

// ── GeneratorCommand ──────────────────────────────────────────────────────────

/// One fully-built command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl GeneratorCommand {
    fn new(program: &Path) -> Self {
        Self {
            program: program.to_path_buf(),
            args: Vec::new(),
        }
    }

    fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl fmt::Display for GeneratorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for a in &self.args {
            write!(f, " {}", a.to_string_lossy())?;
        }
        Ok(())
    }
}

/// `dir` with a trailing separator, as the IDL compiler expects for `-out`.
fn dir_arg(dir: &Path) -> OsString {
    let mut s = if dir.as_os_str().is_empty() {
        OsString::from(".")
    } else {
        dir.as_os_str().to_os_string()
    };
    if !s.to_string_lossy().ends_with('/') {
        s.push("/");
    }
    s
}

// ── GeneratorInvoker ──────────────────────────────────────────────────────────

/// Runs a mode's generator commands.
pub struct GeneratorInvoker {
    ctx: Arc<BuildContext>,
}

impl GeneratorInvoker {
    pub fn new(ctx: Arc<BuildContext>) -> Self {
        Self { ctx }
    }

    /// Command lines for one generation step, in execution order.
    ///
    /// `out_dir` is the directory the planner assigned to the step:
    /// the basename's parent for side-by-side outputs, the root that holds
    /// `gen-c/` / `gen-cpp/`, or the `gen_py/<module>` package directory.
    pub fn commands(
        &self,
        executable: &Path,
        mode: GenerationMode,
        source: &Path,
        out_dir: &Path,
    ) -> Vec<GeneratorCommand> {
        let include = self.ctx.include_root.as_str();
        match mode.spec().command {
            CommandTemplate::SandeshCpp { html } => {
                let mut cmd = GeneratorCommand::new(executable).arg("--gen").arg("cpp");
                if html {
                    cmd = cmd.arg("--gen").arg("html");
                }
                vec![cmd
                    .arg("-I")
                    .arg(include)
                    .arg("-out")
                    .arg(dir_arg(out_dir))
                    .arg(source)]
            }
            CommandTemplate::SandeshC => vec![GeneratorCommand::new(executable)
                .arg("--gen")
                .arg("c")
                .arg("-o")
                .arg(non_empty(out_dir))
                .arg(source)],
            CommandTemplate::SandeshPy => {
                let package_root = out_dir.parent().unwrap_or(out_dir);
                vec![
                    GeneratorCommand::new(executable)
                        .arg("--gen")
                        .arg("py:new_style")
                        .arg("-I")
                        .arg(include)
                        .arg("-out")
                        .arg(dir_arg(package_root))
                        .arg(source),
                    GeneratorCommand::new(executable)
                        .arg("--gen")
                        .arg("html")
                        .arg("-I")
                        .arg(include)
                        .arg("-out")
                        .arg(dir_arg(out_dir))
                        .arg(source),
                ]
            }
            CommandTemplate::Thrift { asynchronous } => {
                let lang = if asynchronous { "cpp:async" } else { "cpp" };
                vec![GeneratorCommand::new(executable)
                    .arg("--gen")
                    .arg(lang)
                    .arg("-o")
                    .arg(non_empty(out_dir))
                    .arg(source)]
            }
            CommandTemplate::Schema { backend } => {
                let stem = source.file_stem().unwrap_or(source.as_os_str());
                vec![GeneratorCommand::new(executable)
                    .arg("-f")
                    .arg("-g")
                    .arg(backend)
                    .arg("-o")
                    .arg(out_dir.join(stem))
                    .arg(source)]
            }
        }
    }

    /// Run every command for `mode`, stopping at the first failure.
    ///
    /// # Errors
    /// * [`CodegenError::ToolMissing`] if the executable cannot be started
    ///   because it does not exist.
    /// * [`CodegenError::GenerationFailed`] on a nonzero exit or a signal.
    pub fn invoke(
        &self,
        handle: &GeneratorHandle,
        mode: GenerationMode,
        source: &Path,
        out_dir: &Path,
    ) -> Result<(), CodegenError> {
        for cmd in self.commands(&handle.path, mode, source, out_dir) {
            info!(generator = handle.family.tag(), command = %cmd, "Running code generator");
            let status = run(&cmd)?;
            if !status.success() {
                let reason = exit_reason(status);
                error!(
                    generator = handle.family.tag(),
                    source = %source.display(),
                    %reason,
                    "Code generation failed"
                );
                return Err(CodegenError::GenerationFailed {
                    generator: handle.family.tag().to_string(),
                    source_path: source.to_path_buf(),
                    reason,
                });
            }
            debug!(generator = handle.family.tag(), "Generator exited cleanly");
        }
        Ok(())
    }
}

fn non_empty(dir: &Path) -> &Path {
    if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    }
}

/// `errno` for an executable that is still open for writing somewhere.
const ETXTBSY: i32 = 26;
const BUSY_ATTEMPTS: u32 = 5;

/// Run `spawn`, retrying with a short back-off while the executable is busy.
///
/// A generator that was just rebuilt can still be held open for writing by
/// a process forked in the meantime; exec then fails with `ETXTBSY` until
/// that process execs or exits.
pub(crate) fn retry_busy<T>(
    program: &Path,
    mut spawn: impl FnMut() -> std::io::Result<T>,
) -> std::io::Result<T> {
    let mut attempt = 1;
    loop {
        match spawn() {
            Err(e) if e.raw_os_error() == Some(ETXTBSY) && attempt < BUSY_ATTEMPTS => {
                debug!(program = %program.display(), attempt, "Executable busy; retrying");
                std::thread::sleep(Duration::from_millis(20 * u64::from(attempt)));
                attempt += 1;
            }
            other => return other,
        }
    }
}

/// Spawn `cmd` and block until it exits.
pub fn run(cmd: &GeneratorCommand) -> Result<ExitStatus, CodegenError> {
    retry_busy(&cmd.program, || {
        Command::new(&cmd.program).args(&cmd.args).status()
    })
    .map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CodegenError::ToolMissing {
            tool: cmd.program.display().to_string(),
        },
        _ => CodegenError::io(&cmd.program, e),
    })
}

/// Classify a non-successful exit status.
pub fn exit_reason(status: ExitStatus) -> ExitReason {
    if let Some(code) = status.code() {
        return ExitReason::Code(code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return ExitReason::Signal(sig);
        }
    }
    ExitReason::Unknown
}

// ── Tests ─────────────────────────────────────────────────────────────────────
