use std::process::Command;

use anyhow::{Context, Result};

const FEATURE_COMBINATIONS: &[(&str, &[&str])] = &[
    ("pitwall-domain", &[]),
    ("pitwall-domain", &["ts-gen"]),
    ("pitwall-common", &[]),
    ("pitwall-common", &["observability"]),
    ("pitwall-infra", &[]),
    ("pitwall-infra", &["ts-gen"]),
];

/// Check that every supported crate/feature combination compiles.
pub fn test_feature_matrix() -> Result<()> {
    println!("Testing {} feature combinations...", FEATURE_COMBINATIONS.len());

    for (index, (package, features)) in FEATURE_COMBINATIONS.iter().enumerate() {
        let joined = features.join(",");
        let feature_arg = (!features.is_empty()).then_some(joined);
        let display_label = format!(
            "{package}{}",
            feature_arg.as_ref().map(|arg| format!(" [{arg}]")).unwrap_or_default()
        );

        println!(
            "\n[{}/{}] cargo check -p {package} --no-default-features{}",
            index + 1,
            FEATURE_COMBINATIONS.len(),
            feature_arg.as_ref().map(|arg| format!(" --features {arg}")).unwrap_or_default()
        );

        let mut command = Command::new("cargo");
        command.args(["check", "-p", package, "--no-default-features"]);

        if let Some(feature_list) = feature_arg.as_ref() {
            command.arg("--features").arg(feature_list.as_str());
        }

        let status = command
            .status()
            .with_context(|| format!("Failed to run cargo check for '{display_label}'"))?;

        if !status.success() {
            anyhow::bail!("Feature combination '{display_label}' failed to compile");
        }

        println!("✅ {display_label} compiled successfully");
    }

    println!("\n✅ All {} feature combinations compile successfully!", FEATURE_COMBINATIONS.len());

    Ok(())
}
