use std::path::Path;
use std::process::Command;

const SHA_ENV: &str = "SPENDLENS_BUILD_SHA";

/// `git describe` of the workspace checkout, marked `-dirty` when the tree
/// has local edits.
fn describe(repo_root: &Path) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(repo_root)
        .args(["describe", "--always", "--dirty", "--abbrev=8"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let text = String::from_utf8(out.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn main() {
    println!("cargo:rerun-if-env-changed={SHA_ENV}");

    // release tarballs have no .git; packagers pass the revision in
    let sha = std::env::var(SHA_ENV).ok().filter(|s| !s.trim().is_empty()).or_else(|| {
        let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").ok()?;
        let repo_root = Path::new(&manifest_dir).join("..");
        let head = repo_root.join(".git").join("HEAD");
        if head.exists() {
            println!("cargo:rerun-if-changed={}", head.display());
        }
        describe(&repo_root)
    });

    println!("cargo:rustc-env={SHA_ENV}={}", sha.as_deref().unwrap_or("unknown"));
}
