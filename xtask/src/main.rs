//! Development automation tasks for the Pitwall workspace.
//!
//! Run with: `cargo xtask <command>`
//!
//! Output is meant for a developer terminal, so it goes through `println!`.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};
use std::{env, fs};

use anyhow::{bail, Context};

mod features;

type Task = fn() -> anyhow::Result<()>;

/// Every task the driver knows, in the order `help` lists them.
const TASKS: &[(&str, &str, Task)] = &[
    ("ci", "fmt, clippy, feature matrix and tests in one go", run_ci),
    ("fmt", "check formatting of every crate", run_fmt),
    ("clippy", "lint all targets with every feature on", run_clippy),
    ("test", "run the whole workspace test suite", run_test),
    ("mock-smoke", "run only the pitwall-infra suites backed by wiremock", run_mock_smoke),
    ("test-features", "cargo check each crate/feature combination", features::test_feature_matrix),
    ("codegen", "export payload types to TypeScript for the dashboards", run_codegen),
];

/// Integration suites that drive the client against a mock backend.
const MOCK_SUITES: &[&str] = &[
    "csrf_recovery_integration",
    "auth_redirect_integration",
    "cancellation_integration",
    "service_integration",
];

fn main() -> ExitCode {
    let Some(name) = env::args().nth(1).filter(|name| name != "help") else {
        print_help();
        return ExitCode::SUCCESS;
    };

    let Some((_, _, task)) = TASKS.iter().find(|(task, _, _)| *task == name) else {
        eprintln!("unknown task `{name}`\n");
        print_help();
        return ExitCode::FAILURE;
    };

    match task() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("xtask {name}: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!("usage: cargo xtask <task>\n");
    for (name, summary, _) in TASKS {
        println!("  {name:<14} {summary}");
    }
}

/// Run `cargo` with `args`, failing with `what` when it exits non-zero.
fn cargo(args: &[&str], what: &str) -> anyhow::Result<()> {
    let status = Command::new("cargo")
        .args(args)
        .status()
        .with_context(|| format!("could not spawn cargo {}", args.join(" ")))?;

    if !status.success() {
        bail!("{what} failed ({status})");
    }
    Ok(())
}

fn run_ci() -> anyhow::Result<()> {
    let steps: [(&str, Task); 4] = [
        ("format", run_fmt),
        ("clippy", run_clippy),
        ("feature matrix", features::test_feature_matrix),
        ("tests", run_test),
    ];

    for (index, (label, step)) in steps.iter().enumerate() {
        println!("==> [{}/{}] {label}", index + 1, steps.len());
        step()?;
    }

    println!("\nci green");
    Ok(())
}

fn run_fmt() -> anyhow::Result<()> {
    cargo(&["fmt", "--all", "--", "--check"], "format check (fix with `cargo fmt --all`)")
}

fn run_clippy() -> anyhow::Result<()> {
    cargo(&["clippy", "--workspace", "--all-targets", "--all-features"], "clippy")
}

fn run_test() -> anyhow::Result<()> {
    cargo(&["test", "--workspace", "--all-features"], "workspace tests")
}

fn run_mock_smoke() -> anyhow::Result<()> {
    for suite in MOCK_SUITES {
        println!("==> pitwall-infra --test {suite}");
        cargo(&["test", "-p", "pitwall-infra", "--test", suite], suite)?;
    }

    println!("\n{} mock-backend suites passed", MOCK_SUITES.len());
    Ok(())
}

/// Export the ts-rs bindings of `pitwall-domain` into the dashboard tree.
///
/// The destination defaults to `dashboard/src/types/generated` and can be
/// moved with `PITWALL_TYPES_DIR`.
fn run_codegen() -> anyhow::Result<()> {
    // ts-rs writes the bindings as a side effect of the domain unit tests
    cargo(&["test", "-p", "pitwall-domain", "--features", "ts-gen", "--lib"], "ts-gen export")?;

    let bindings = PathBuf::from("crates/domain/bindings");
    if !bindings.is_dir() {
        bail!("no bindings at {}", bindings.display());
    }

    let target = env::var_os("PITWALL_TYPES_DIR")
        .map_or_else(|| PathBuf::from("dashboard/src/types/generated"), PathBuf::from);
    fs::create_dir_all(&target)
        .with_context(|| format!("could not create {}", target.display()))?;

    let mut modules = Vec::new();
    for path in payload_files(&bindings)? {
        let Some(file_name) = path.file_name() else { continue };
        fs::copy(&path, target.join(file_name))
            .with_context(|| format!("could not copy {}", path.display()))?;
        if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
            modules.push(stem.to_owned());
        }
    }
    modules.sort();

    let mut index = String::from("// Generated by `cargo xtask codegen`. Do not edit.\n\n");
    for module in &modules {
        let _ = writeln!(index, "export type {{ {module} }} from './{module}';");
    }
    let index_path = target.join("index.ts");
    fs::write(&index_path, index)
        .with_context(|| format!("could not write {}", index_path.display()))?;

    println!("exported {} payload types to {}", modules.len(), target.display());
    Ok(())
}

/// `.ts` files in `dir`, skipping the index and test files.
fn payload_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("could not read {}", dir.display()))?;

    Ok(entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "ts"))
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name != "index.ts" && !name.ends_with(".test.ts"))
        })
        .collect())
}
