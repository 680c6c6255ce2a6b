/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Output-name derivation for code generators.
//!
//! Every generator in this crate names its outputs after the input file:
//! strip the final extension to get a *basename*, then glue a fixed prefix in
//! front and a fixed suffix behind.
//!
//! ```text
//! foo/bar.sandesh  ──strip──►  foo/bar  ──"" + · + "_types.h"──►  foo/bar_types.h
//! ```
//!
//! All functions here are pure: no I/O, output order equals suffix order.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::error::CodegenError;

/// Strip exactly the final extension from `source`.
///
/// `a.b.xsd` → `a.b`; `foo/bar.sandesh` → `foo/bar`.
///
/// # Errors
/// [`CodegenError::InvalidPath`] if the file name has no extension (or an
/// empty one, as in `foo.`).
pub fn basename(source: &Path) -> Result<PathBuf, CodegenError> {
    match source.extension() {
        Some(ext) if !ext.is_empty() => Ok(source.with_extension("")),
        _ => Err(CodegenError::InvalidPath {
            path: source.to_path_buf(),
        }),
    }
}

/// Derive `output_prefix + basename(source) + suffix` for every suffix, in
/// suffix order.
pub fn derive_targets<S: AsRef<OsStr>>(
    source: &Path,
    suffixes: &[S],
    output_prefix: &str,
) -> Result<Vec<PathBuf>, CodegenError> {
    let base = basename(source)?;
    Ok(suffixes
        .iter()
        .map(|suffix| join_name(output_prefix, base.as_os_str(), suffix.as_ref()))
        .collect())
}

/// Last path component of a basename, used as a package directory name.
///
/// `foo/bar` → `bar`; `bar` → `bar`.
pub fn module_dir(base: &Path) -> OsString {
    base.file_name()
        .map(OsStr::to_os_string)
        .unwrap_or_else(|| base.as_os_str().to_os_string())
}

fn join_name(prefix: &str, base: &OsStr, suffix: &OsStr) -> PathBuf {
    let mut name = OsString::from(prefix);
    name.push(base);
    name.push(suffix);
    PathBuf::from(name)
}

// ── Classification ────────────────────────────────────────────────────────────

/// Keep only the paths whose extension is exactly `ext`, preserving order.
pub fn with_extension<'a>(paths: &'a [PathBuf], ext: &str) -> Vec<&'a Path> {
    paths
        .iter()
        .filter(|p| p.extension().is_some_and(|e| e == ext))
        .map(PathBuf::as_path)
        .collect()
}

/// C++ translation units (`.cpp`).
pub fn cpp_sources(paths: &[PathBuf]) -> Vec<&Path> {
    with_extension(paths, "cpp")
}

/// C translation units (`.c`).
pub fn c_sources(paths: &[PathBuf]) -> Vec<&Path> {
    with_extension(paths, "c")
}

/// Headers (`.h`).
pub fn headers(paths: &[PathBuf]) -> Vec<&Path> {
    with_extension(paths, "h")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CPP_SUFFIXES: [&str; 5] = [
        "_types.h",
        "_types.cpp",
        "_constants.h",
        "_constants.cpp",
        "_html.cpp",
    ];

    #[test]
    fn basename_strips_only_the_final_extension() {
        assert_eq!(basename(Path::new("a.b.xsd")).unwrap(), Path::new("a.b"));
        assert_eq!(
            basename(Path::new("foo/bar.sandesh")).unwrap(),
            Path::new("foo/bar")
        );
    }

    #[test]
    fn basename_ignores_dots_in_directories() {
        assert!(matches!(
            basename(Path::new("dir.d/file")),
            Err(CodegenError::InvalidPath { .. })
        ));
        assert_eq!(
            basename(Path::new("dir.d/file.thrift")).unwrap(),
            Path::new("dir.d/file")
        );
    }

    #[test]
    fn missing_or_empty_extension_is_invalid() {
        for p in ["noext", "foo.", ".hidden"] {
            let err = basename(Path::new(p)).unwrap_err();
            assert!(
                matches!(err, CodegenError::InvalidPath { .. }),
                "{p} should be rejected"
            );
        }
    }

    #[test]
    fn derive_targets_follows_suffix_order() {
        let targets = derive_targets(Path::new("foo/bar.sandesh"), &CPP_SUFFIXES, "").unwrap();
        let expected: Vec<PathBuf> = [
            "foo/bar_types.h",
            "foo/bar_types.cpp",
            "foo/bar_constants.h",
            "foo/bar_constants.cpp",
            "foo/bar_html.cpp",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        assert_eq!(targets, expected);
    }

    #[test]
    fn derive_targets_applies_prefix() {
        let targets =
            derive_targets(Path::new("vr/vr.sandesh"), &["_types.h", "_types.c"], "gen-c/").unwrap();
        assert_eq!(
            targets,
            vec![
                PathBuf::from("gen-c/vr/vr_types.h"),
                PathBuf::from("gen-c/vr/vr_types.c")
            ]
        );
    }

    #[test]
    fn derive_targets_is_idempotent() {
        let first = derive_targets(Path::new("x/y.z.thrift"), &CPP_SUFFIXES, "p/").unwrap();
        for _ in 0..20 {
            let again = derive_targets(Path::new("x/y.z.thrift"), &CPP_SUFFIXES, "p/").unwrap();
            assert_eq!(again, first);
        }
        assert_eq!(first[0], PathBuf::from("p/x/y.z_types.h"));
    }

    #[test]
    fn module_dir_is_last_component() {
        assert_eq!(module_dir(Path::new("a/b/vns")), OsString::from("vns"));
        assert_eq!(module_dir(Path::new("vns")), OsString::from("vns"));
    }

    #[test]
    fn classification_preserves_order() {
        let paths: Vec<PathBuf> = [
            "a_types.h",
            "a_types.cpp",
            "a_types.c",
            "a_constants.h",
            "a_html.cpp",
            "a.cc",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        assert_eq!(
            cpp_sources(&paths),
            vec![Path::new("a_types.cpp"), Path::new("a_html.cpp")]
        );
        assert_eq!(c_sources(&paths), vec![Path::new("a_types.c")]);
        assert_eq!(
            headers(&paths),
            vec![Path::new("a_types.h"), Path::new("a_constants.h")]
        );
    }
}
