/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Touch-ups applied to generator output after a successful run.
//!
//! Both post steps edit `<name>_html.cpp`:
//!
//! * [`PostStep::AppendMarker`] appends `int <name>_marker = 0;` so link steps
//!   see the same symbol whether or not the web view was generated.
//! * [`PostStep::EmbedWebView`] appends
//!
//!   ```text
//!   namespace {
//!   <dump-tool -i <name>.xml>
//!   }
//!   <contents of <name>_html_template.cpp>
//!   ```
//!
//! Every edit is staged in a temporary file next to the target and renamed
//! over it only once complete, so an interrupted step never leaves a
//! half-written artifact behind.  The temporary file is removed on every
//! early return.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::BuildContext;
use crate::error::CodegenError;
use crate::invoker::{detect_tool, exit_reason, retry_busy};
use crate::mode::{GenerationMode, PostStep};

pub struct PostProcessor {
    ctx: Arc<BuildContext>,
}

impl PostProcessor {
    pub fn new(ctx: Arc<BuildContext>) -> Self {
        Self { ctx }
    }

    /// Check that every external utility `mode` will need is present.
    ///
    /// Called before the generator runs so a missing tool aborts the step
    /// without spawning anything.
    pub fn preflight(&self, mode: GenerationMode) -> Result<(), CodegenError> {
        if mode.spec().needs_dump_tool() {
            self.dump_tool()?;
        }
        Ok(())
    }

    /// Apply the post steps of `mode` to outputs named after `name` in
    /// `out_dir`.  Modes without post steps are a no-op.
    pub fn finalize(
        &self,
        mode: GenerationMode,
        out_dir: &Path,
        name: &str,
    ) -> Result<(), CodegenError> {
        for step in mode.spec().post_steps {
            match step {
                PostStep::AppendMarker => self.append_marker(out_dir, name)?,
                PostStep::EmbedWebView => self.embed_web_view(out_dir, name)?,
            }
        }
        Ok(())
    }

    fn append_marker(&self, out_dir: &Path, name: &str) -> Result<(), CodegenError> {
        let target = html_source(out_dir, name);
        debug!(artifact = %target.display(), "Appending marker symbol");
        append_atomically(&target, format!("int {}_marker = 0;\n", name).as_bytes())
    }

    fn embed_web_view(&self, out_dir: &Path, name: &str) -> Result<(), CodegenError> {
        let tool = self.dump_tool()?;
        let dir = if out_dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            out_dir
        };
        let page = format!("{}.xml", name);

        // Run from the output directory so the array is named after the
        // bare file name rather than its path.
        let output = retry_busy(&tool, || {
            Command::new(&tool)
                .arg("-i")
                .arg(&page)
                .current_dir(dir)
                .output()
        })
        .map_err(|e| CodegenError::io(&tool, e))?;
        if !output.status.success() {
            return Err(CodegenError::GenerationFailed {
                generator: self.ctx.dump_tool.clone(),
                source_path: dir.join(&page),
                reason: exit_reason(output.status),
            });
        }

        let template_path = out_dir.join(format!("{}_html_template.cpp", name));
        let template =
            std::fs::read(&template_path).map_err(|e| CodegenError::io(&template_path, e))?;

        let mut extra = Vec::with_capacity(output.stdout.len() + template.len() + 16);
        extra.extend_from_slice(b"namespace {\n");
        extra.extend_from_slice(&output.stdout);
        extra.extend_from_slice(b"}\n");
        extra.extend_from_slice(&template);

        let target = html_source(out_dir, name);
        info!(artifact = %target.display(), page = %page, "Embedding web view");
        append_atomically(&target, &extra)
    }

    fn dump_tool(&self) -> Result<PathBuf, CodegenError> {
        detect_tool(&self.ctx.dump_tool, &self.ctx.search_path).ok_or_else(|| {
            CodegenError::ToolMissing {
                tool: self.ctx.dump_tool.clone(),
            }
        })
    }
}

fn html_source(out_dir: &Path, name: &str) -> PathBuf {
    out_dir.join(format!("{}_html.cpp", name))
}

/// Replace `path` with its current contents followed by `extra`.
///
/// The new contents are written to a sibling temporary file which is then
/// renamed over `path`; `path` is never observed half-written.
pub fn append_atomically(path: &Path, extra: &[u8]) -> Result<(), CodegenError> {
    let existing = std::fs::read(path).map_err(|e| CodegenError::io(path, e))?;
    let permissions = std::fs::metadata(path)
        .map_err(|e| CodegenError::io(path, e))?
        .permissions();

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| CodegenError::io(dir, e))?;
    let staged = tmp.path().to_path_buf();
    tmp.write_all(&existing)
        .map_err(|e| CodegenError::io(&staged, e))?;
    tmp.write_all(extra)
        .map_err(|e| CodegenError::io(&staged, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| CodegenError::io(&staged, e))?;
    std::fs::set_permissions(&staged, permissions).map_err(|e| CodegenError::io(&staged, e))?;

    tmp.persist(path)
        .map_err(|e| CodegenError::io(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor(ctx: BuildContext) -> PostProcessor {
        PostProcessor::new(Arc::new(ctx))
    }

    fn ctx_without_tools() -> BuildContext {
        BuildContext {
            search_path: Vec::new(),
            ..BuildContext::default()
        }
    }

    #[test]
    fn native_only_appends_marker_line() {
        let dir = tempfile::tempdir().unwrap();
        let html = dir.path().join("bar_html.cpp");
        std::fs::write(&html, "// generated\n").unwrap();

        processor(ctx_without_tools())
            .finalize(GenerationMode::NativeOnly, dir.path(), "bar")
            .unwrap();

        let contents = std::fs::read_to_string(&html).unwrap();
        assert_eq!(contents, "// generated\nint bar_marker = 0;\n");
    }

    #[test]
    fn append_leaves_no_temporary_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("x_html.cpp"), "").unwrap();
        processor(ctx_without_tools())
            .finalize(GenerationMode::NativeOnly, dir.path(), "x")
            .unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn missing_target_is_io_error_and_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let err = processor(ctx_without_tools())
            .finalize(GenerationMode::NativeOnly, dir.path(), "absent")
            .unwrap_err();
        assert!(matches!(err, CodegenError::Io { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn other_modes_are_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let html = dir.path().join("k_html.cpp");
        std::fs::write(&html, "orig").unwrap();
        for mode in [
            GenerationMode::CBinding,
            GenerationMode::PyBinding,
            GenerationMode::Rpc {
                asynchronous: false,
            },
            GenerationMode::SchemaTypes,
        ] {
            processor(ctx_without_tools())
                .finalize(mode, dir.path(), "k")
                .unwrap();
        }
        assert_eq!(std::fs::read_to_string(&html).unwrap(), "orig");
    }

    #[test]
    fn web_view_preflight_reports_missing_dump_tool() {
        let err = processor(ctx_without_tools())
            .preflight(GenerationMode::NativeWebView)
            .unwrap_err();
        assert!(matches!(err, CodegenError::ToolMissing { ref tool } if tool == "xxd"));
        // Other modes need nothing.
        processor(ctx_without_tools())
            .preflight(GenerationMode::NativeOnly)
            .unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn web_view_embeds_dump_and_template() {
        use crate::testutil::write_script;

        let tools = tempfile::tempdir().unwrap();
        // Stand-in dump tool: echoes its arguments as a C array.
        write_script(
            tools.path(),
            "fakedump",
            r#"echo "unsigned char page[] = { /* $1 $2 */ };""#,
        );
        let ctx = BuildContext {
            dump_tool: "fakedump".into(),
            search_path: vec![tools.path().to_path_buf()],
            ..BuildContext::default()
        };

        let out = tempfile::tempdir().unwrap();
        std::fs::write(out.path().join("bar_html.cpp"), "// html\n").unwrap();
        std::fs::write(out.path().join("bar.xml"), "<page/>").unwrap();
        std::fs::write(out.path().join("bar_html_template.cpp"), "void render();\n").unwrap();

        processor(ctx)
            .finalize(GenerationMode::NativeWebView, out.path(), "bar")
            .unwrap();

        let contents = std::fs::read_to_string(out.path().join("bar_html.cpp")).unwrap();
        assert_eq!(
            contents,
            "// html\nnamespace {\nunsigned char page[] = { /* -i bar.xml */ };\n}\nvoid render();\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn failing_dump_tool_leaves_target_untouched() {
        use crate::testutil::write_script;

        let tools = tempfile::tempdir().unwrap();
        write_script(tools.path(), "baddump", "exit 3");
        let ctx = BuildContext {
            dump_tool: "baddump".into(),
            search_path: vec![tools.path().to_path_buf()],
            ..BuildContext::default()
        };

        let out = tempfile::tempdir().unwrap();
        std::fs::write(out.path().join("bar_html.cpp"), "// html\n").unwrap();

        let err = processor(ctx)
            .finalize(GenerationMode::NativeWebView, out.path(), "bar")
            .unwrap_err();
        assert!(matches!(err, CodegenError::GenerationFailed { .. }));
        assert_eq!(
            std::fs::read_to_string(out.path().join("bar_html.cpp")).unwrap(),
            "// html\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn append_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("p_html.cpp");
        std::fs::write(&f, "").unwrap();
        std::fs::set_permissions(&f, std::fs::Permissions::from_mode(0o644)).unwrap();
        append_atomically(&f, b"x").unwrap();
        let mode = std::fs::metadata(&f).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }
}
