//! Sets `VAULTGUARD_VERSION` for `vaultguard --version`.
//!
//! Tagged checkouts report the tag, untagged ones report the package
//! version with the commit appended, and builds outside git report the
//! package version alone.

use std::path::Path;
use std::process::Command;

fn main() {
    let workspace = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    let head = workspace.join(".git").join("HEAD");
    if head.exists() {
        println!("cargo:rerun-if-changed={}", head.display());
    }

    let package = env!("CARGO_PKG_VERSION");
    let version = match describe(&workspace) {
        Some(tag) if is_release_tag(&tag) => tag[1..].to_string(),
        Some(commit) => format!("{package}+{commit}"),
        None => package.to_string(),
    };
    println!("cargo:rustc-env=VAULTGUARD_VERSION={version}");
}

fn is_release_tag(described: &str) -> bool {
    described.starts_with('v') && described[1..].starts_with(|c: char| c.is_ascii_digit())
}

fn describe(workspace: &Path) -> Option<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(workspace)
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    let described = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (output.status.success() && !described.is_empty()).then_some(described)
}
