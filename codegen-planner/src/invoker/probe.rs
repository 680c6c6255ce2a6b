/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Host capability probe for external utilities.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Locate `tool` on `search_path`.
///
/// A name containing a path separator is checked as-is instead of being
/// searched.  Returns the first executable regular file found.
pub fn detect_tool(tool: &str, search_path: &[PathBuf]) -> Option<PathBuf> {
    let found = if tool.contains(std::path::MAIN_SEPARATOR) {
        let p = PathBuf::from(tool);
        is_executable(&p).then_some(p)
    } else {
        search_path
            .iter()
            .map(|dir| dir.join(tool))
            .find(|candidate| is_executable(candidate))
    };
    debug!(tool, found = ?found, "Tool probe");
    found
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_search_path_finds_nothing() {
        assert_eq!(detect_tool("xxd", &[]), None);
    }

    #[cfg(unix)]
    #[test]
    fn finds_first_executable_in_order() {
        use crate::testutil::write_script;

        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        // Present but not executable in `a`: must be skipped.
        std::fs::write(a.path().join("dump"), "").unwrap();
        let in_b = write_script(b.path(), "dump", "exit 0");

        let found = detect_tool("dump", &[a.path().to_path_buf(), b.path().to_path_buf()]);
        assert_eq!(found, Some(in_b));
    }

    #[cfg(unix)]
    #[test]
    fn explicit_path_is_checked_directly() {
        use crate::testutil::write_script;

        let dir = tempfile::tempdir().unwrap();
        let tool = write_script(dir.path(), "dump", "exit 0");
        let name = tool.to_str().unwrap();
        assert_eq!(detect_tool(name, &[]), Some(tool.clone()));
        assert_eq!(detect_tool("/nonexistent/dump", &[]), None);
    }

    #[test]
    fn directories_are_not_tools() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("xxd")).unwrap();
        assert_eq!(detect_tool("xxd", &[dir.path().to_path_buf()]), None);
    }
}
