/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{error, info};

use codegen_planner::config::BuildContext;
use codegen_planner::mode::GenerationMode;
use codegen_planner::naming;
use codegen_planner::pipeline::{CodegenPipeline, Outcome};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Predicts and runs IDL / RPC code-generator steps.
///
/// Example:
///   codegen-planner --output-root build/debug/vnsw plan -m native-only vr.sandesh
///   codegen-planner -c codegen.yaml generate -m rpc-async src/rpc/calc.thrift
#[derive(Debug, Parser)]
#[command(
    name = "codegen-planner",
    about = "Code-generation target planner",
    long_about = None,
)]
struct Cli {
    /// YAML build context file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Build variant directory that receives generated files.
    #[arg(long = "output-root")]
    output_root: Option<PathBuf>,

    /// Directory holding the built generator executables.
    #[arg(long = "top-bin")]
    top_bin: Option<PathBuf>,

    /// Include root passed to the IDL compiler.
    #[arg(long = "include-root")]
    include_root: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct Target {
    /// native-only, native-web-view, c-binding, py-binding, rpc, rpc-async,
    /// schema-backend or schema-types.
    #[arg(short = 'm', long = "mode")]
    mode: GenerationMode,

    /// Extra prefix placed in front of every derived name.
    #[arg(long = "prefix", default_value = "")]
    prefix: String,

    /// Interface-definition source file.
    source: PathBuf,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the predicted artifact paths, one per line.
    Plan {
        #[command(flatten)]
        target: Target,

        /// Only print artifacts of this kind.
        #[arg(long = "kind", value_enum)]
        kind: Option<Kind>,
    },
    /// Print each predicted artifact with its freshness.
    Status {
        #[command(flatten)]
        target: Target,
    },
    /// Run the generator if any artifact is stale.
    Generate {
        #[command(flatten)]
        target: Target,

        /// Regenerate even if everything is fresh.
        #[arg(long = "force", default_value_t = false)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Cpp,
    C,
    Header,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    // Logs go to stderr; stdout carries the artifact listing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let ctx = Arc::new(build_context(&cli)?);
    info!(
        output_root = %ctx.output_root.display(),
        top_bin = %ctx.top_bin.display(),
        include_root = %ctx.include_root,
        "Configuration"
    );

    let mut pipeline = CodegenPipeline::new(Arc::clone(&ctx))
        .context("Failed to initialise code generation pipeline")?;

    match cli.command {
        Command::Plan { target, kind } => {
            let plan = pipeline.plan(&target.source, target.mode, &target.prefix)?;
            let paths = plan.paths();
            let selected = match kind {
                None => paths.iter().map(PathBuf::as_path).collect(),
                Some(Kind::Cpp) => naming::cpp_sources(&paths),
                Some(Kind::C) => naming::c_sources(&paths),
                Some(Kind::Header) => naming::headers(&paths),
            };
            for p in selected {
                println!("{}", p.display());
            }
        }
        Command::Status { target } => {
            let plan = pipeline.plan(&target.source, target.mode, &target.prefix)?;
            pipeline.refresh(&plan)?;
            for (artifact, state) in pipeline.status(&plan) {
                println!("{:<10} {}", state, artifact.path.display());
            }
        }
        Command::Generate { target, force } => {
            let plan = pipeline.plan(&target.source, target.mode, &target.prefix)?;
            let outcome = pipeline
                .generate(&plan, force)
                .with_context(|| format!("Generation failed for {}", target.source.display()))?;
            match outcome {
                Outcome::UpToDate => info!("{} is up to date", target.source.display()),
                Outcome::Generated => {
                    info!("Generated {} artifact(s)", plan.artifacts.len())
                }
            }
        }
    }
    Ok(())
}

/// Defaults, then the optional YAML file, then command-line overrides.
fn build_context(cli: &Cli) -> Result<BuildContext> {
    let mut ctx = match &cli.config {
        Some(path) => BuildContext::load_from_file(path)?,
        None => BuildContext::default(),
    };
    if let Some(root) = &cli.output_root {
        ctx.output_root = root.clone();
    }
    if let Some(bin) = &cli.top_bin {
        ctx.top_bin = bin.clone();
    }
    if let Some(inc) = &cli.include_root {
        ctx.include_root = inc.clone();
    }
    Ok(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config_defaults() {
        let cli = Cli::parse_from([
            "codegen-planner",
            "--output-root",
            "build/debug",
            "--include-root",
            "idl/",
            "plan",
            "-m",
            "rpc-async",
            "svc.thrift",
        ]);
        let ctx = build_context(&cli).unwrap();
        assert_eq!(ctx.output_root, PathBuf::from("build/debug"));
        assert_eq!(ctx.include_root, "idl/");
        assert_eq!(ctx.top_bin, PathBuf::from("build/bin"));
        match cli.command {
            Command::Plan { target, kind } => {
                assert_eq!(target.mode, GenerationMode::Rpc { asynchronous: true });
                assert!(kind.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_mode_is_rejected_by_parser() {
        let result = Cli::try_parse_from(["codegen-planner", "plan", "-m", "java", "a.sandesh"]);
        assert!(result.is_err());
    }
}
