//! policy_edit - scripted driver for the policy editor
//!
//! Replays YAML scripts of editor actions (select a placeholder, insert an
//! operator, pick an attribute, confirm) against an editing session and
//! checks the resulting tree and policy string.
//!
//! # Usage
//!
//! ```bash
//! # Run a single script
//! policy_edit run scripts/conjunction.yaml
//!
//! # Run every script in a directory, showing tree previews
//! policy_edit run -v scripts/
//!
//! # Check scripts without running them
//! policy_edit validate scripts/
//!
//! # List the attribute universe
//! policy_edit attributes --attributes attrs.txt --pool-size 10
//!
//! # Dump the tree a script builds as JSON
//! policy_edit tree scripts/nested.yaml
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use abe_policy::AttributeUniverse;
use abe_policy::locate::placeholder_paths;
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{Level, info, instrument};

mod assertions;
mod errors;
mod runner;
mod script;
mod settings;
mod style;
mod tracing_init;

use runner::{replay, run_script};
use script::EditorScript;
use settings::EditorSettings;

#[derive(Parser, Debug)]
#[command(name = "policy_edit")]
#[command(version, about = "Build access-policy trees from scripted editor actions")]
#[command(
    long_about = "Replays scripted placeholder selections, operator and attribute choices against an editing session and validates the resulting policy."
)]
struct Cli {
    /// Verbose output: tree previews per step and debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Comma-separated attribute names overlaid on the numbered pool
    #[arg(long, global = true, value_name = "FILE")]
    attributes: Option<PathBuf>,

    /// Size of the numbered attribute pool
    #[arg(long, global = true, value_name = "N")]
    pool_size: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one or more editor scripts
    Run {
        /// Path to a script (.yaml) or directory of scripts
        path: PathBuf,
    },

    /// Validate editor scripts without running them
    Validate {
        /// Path to a script (.yaml) or directory of scripts
        path: PathBuf,
    },

    /// List the attribute universe, one name per line
    Attributes,

    /// Replay a script and print the resulting tree as JSON
    Tree {
        /// Path to a script (.yaml)
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match EditorSettings::load() {
        Ok(s) => s.with_overrides(cli.attributes.clone(), cli.pool_size),
        Err(e) => {
            errors::display_error(&e, cli.verbose);
            return ExitCode::FAILURE;
        }
    };
    tracing_init::init_tracing(&settings, cli.verbose);

    let result = settings.universe().and_then(|universe| match cli.command {
        Commands::Run { ref path } => cmd_run(path, &universe, cli.verbose),
        Commands::Validate { ref path } => cmd_validate(path),
        Commands::Attributes => cmd_attributes(&universe),
        Commands::Tree { ref path } => cmd_tree(path, &universe),
    });

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            errors::display_error(&e, cli.verbose);
            ExitCode::FAILURE
        }
    }
}

/// Run scripts and return whether all passed.
#[instrument(level = Level::TRACE, skip(universe))]
fn cmd_run(path: &Path, universe: &AttributeUniverse, verbose: bool) -> Result<bool> {
    let scripts = collect_scripts(path)?;
    if scripts.is_empty() {
        bail!("no editor scripts found at {}", path.display());
    }

    eprintln!("found {} script(s)\n", scripts.len());

    let mut total_passed = 0;
    let mut total_failed = 0;
    let mut total_steps = 0;

    for script_path in &scripts {
        let script = EditorScript::from_file(script_path)
            .with_context(|| format!("failed to parse {}", script_path.display()))?;

        eprintln!("--- {} ({}) ---", script.meta.name, script_path.display());

        let report = run_script(&script, universe)?;
        for (i, step) in report.steps.iter().enumerate() {
            total_steps += 1;
            let step_label = format!("  [{}] {}", i + 1, step.label);

            if step.assertion.passed {
                total_passed += 1;
                eprintln!("{}  {}", step_label, style::err_green("PASS"));
            } else {
                total_failed += 1;
                eprintln!("{}  {}", step_label, style::err_red("FAIL"));
                for failure in &step.assertion.failures {
                    eprintln!("    - {}", failure);
                }
            }

            if verbose {
                eprintln!("    {}", style::err_dim(&format!("tree: {}", step.preview)));
                if let Some(ref policy) = step.outcome.policy {
                    eprintln!("    {}", style::err_dim(&format!("policy: {policy}")));
                }
                if let Some(ref e) = step.outcome.error {
                    eprintln!("    {}", style::err_dim(&format!("error: {e:#}")));
                }
            }
        }

        if report.passed() {
            eprintln!("  result: {}\n", style::err_green("PASS"));
        } else {
            eprintln!(
                "  result: {} ({} step(s))\n",
                style::err_red("FAIL"),
                report.failed_count()
            );
        }
    }

    info!(total_steps, total_passed, total_failed, "scripts finished");

    eprintln!("========================================");
    eprintln!(
        "total: {} steps, {} passed, {} failed",
        total_steps, total_passed, total_failed
    );

    let all_passed = total_failed == 0;
    if all_passed {
        eprintln!("result: {}", style::err_green("ALL PASSED"));
    } else {
        eprintln!("result: {}", style::err_red("SOME FAILED"));
    }

    Ok(all_passed)
}

/// Validate scripts without running them.
fn cmd_validate(path: &Path) -> Result<bool> {
    let scripts = collect_scripts(path)?;
    if scripts.is_empty() {
        bail!("no editor scripts found at {}", path.display());
    }

    let mut all_valid = true;

    for script_path in &scripts {
        match EditorScript::from_file(script_path) {
            Ok(script) => {
                let problems = script.validate();
                if problems.is_empty() {
                    eprintln!(
                        "VALID: {} ({} steps) - {}",
                        script.meta.name,
                        script.steps.len(),
                        script_path.display()
                    );
                } else {
                    all_valid = false;
                    eprintln!(
                        "INVALID: {} - {}",
                        script.meta.name,
                        script_path.display()
                    );
                    for p in &problems {
                        eprintln!("  WARNING: {}", p);
                    }
                }
            }
            Err(e) => {
                all_valid = false;
                eprintln!("INVALID: {} - {:#}", script_path.display(), e);
            }
        }
    }

    Ok(all_valid)
}

fn cmd_attributes(universe: &AttributeUniverse) -> Result<bool> {
    for name in universe.names() {
        println!("{name}");
    }
    Ok(true)
}

/// Replay a script and print the final tree. Succeeds only if the tree is complete.
fn cmd_tree(path: &Path, universe: &AttributeUniverse) -> Result<bool> {
    let script = EditorScript::from_file(path)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let session = replay(&script, universe)?;
    let json = serde_json::to_string_pretty(session.tree().as_ref())
        .context("failed to serialize policy tree")?;
    println!("{json}");

    let open = placeholder_paths(session.tree());
    for (path, id) in &open {
        eprintln!("open placeholder: {path} ({id})");
    }
    Ok(open.is_empty())
}

/// Collect script paths from a file or directory.
fn collect_scripts(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    if path.is_dir() {
        let mut scripts = Vec::new();
        for entry in std::fs::read_dir(path)
            .with_context(|| format!("failed to read directory {}", path.display()))?
        {
            let p = entry?.path();
            if p.extension().is_some_and(|ext| ext == "yaml" || ext == "yml") {
                scripts.push(p);
            }
        }
        scripts.sort();
        return Ok(scripts);
    }

    bail!("{} is neither a file nor a directory", path.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_scripts_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.yaml", "a.yml", "notes.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        let scripts = collect_scripts(dir.path()).unwrap();
        let names: Vec<_> = scripts
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.yml", "b.yaml"]);
    }

    #[test]
    fn collect_scripts_rejects_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_scripts(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "policy_edit",
            "run",
            "scripts",
            "-v",
            "--pool-size",
            "7",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.pool_size, Some(7));
        assert!(matches!(cli.command, Commands::Run { .. }));
    }

    #[test]
    fn bundled_scripts_validate() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("scripts");
        assert!(cmd_validate(&dir).unwrap());
    }
}
