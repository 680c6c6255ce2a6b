/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Codegen planner – predicts and runs IDL / RPC code-generator steps
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── naming/       – output names from a source path and suffix list
//! ├── services/     – declared-service discovery for RPC sources
//! ├── mode/         – generation modes and their table entries
//! ├── config/       – BuildContext (YAML + defaults)
//! ├── invoker/      – generator handles, command lines, tool probe
//! ├── postprocess/  – marker / web-view touch-ups, atomic appends
//! ├── planner/      – target planning, dependency graph, state, ledger
//! ├── pipeline/     – one generation step end to end
//! └── error/        – CodegenError
//! ```

pub mod config;
pub mod error;
pub mod invoker;
pub mod mode;
pub mod naming;
pub mod pipeline;
pub mod planner;
pub mod postprocess;
pub mod services;

#[cfg(test)]
pub(crate) mod testutil;
