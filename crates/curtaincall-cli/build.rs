use chrono::Utc;
use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn main() {
    // Short hash, suffixed with "-modified" when tracked files have changed
    let describe = git(&["describe", "--always", "--dirty=-modified"]).unwrap_or_else(|| "unknown".into());

    let build_hash = if describe.ends_with("-modified") {
        format!("{describe}-{}", Utc::now().format("%Y%m%d-%H%M%S"))
    } else {
        describe
    };

    println!("cargo:rustc-env=BUILD_HASH={build_hash}");

    // .git lives at the workspace root, two levels up
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/index");
}
