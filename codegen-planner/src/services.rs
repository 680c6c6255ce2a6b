/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Service declaration discovery for RPC interface files.
//!
//! The RPC compiler writes one `<Service>.cpp` / `<Service>.h` pair per
//! declared service, so predicting its outputs requires reading the source.
//! [`ServiceNameExtractor`] is the seam; [`PatternServiceExtractor`] scans
//! for `service <name> {` and is the only implementation today.

use std::path::Path;

use regex::Regex;

use crate::error::CodegenError;

/// Finds declared service names in an interface source file.
pub trait ServiceNameExtractor: Send + Sync {
    /// Service names in declaration order.
    fn extract(&self, contents: &str) -> Vec<String>;

    /// Read `path` and extract from its contents.
    fn extract_from_file(&self, path: &Path) -> Result<Vec<String>, CodegenError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| CodegenError::io(path, e))?;
        Ok(self.extract(&contents))
    }
}

/// Fixed-pattern scanner: `service` keyword, a name, then an opening brace.
#[derive(Debug, Clone)]
pub struct PatternServiceExtractor {
    pattern: Regex,
}

impl PatternServiceExtractor {
    pub fn new() -> Self {
        let pattern = Regex::new(r"(?m)service\s+(\S+)\s*\{").expect("valid regex");
        Self { pattern }
    }
}

impl Default for PatternServiceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceNameExtractor for PatternServiceExtractor {
    fn extract(&self, contents: &str) -> Vec<String> {
        self.pattern
            .captures_iter(contents)
            .map(|c| c[1].to_string())
            .collect()
    }
}
