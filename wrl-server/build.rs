//! Build script for wrl-server
//!
//! Exposes build identification to the binary and the health endpoint as
//! compile-time environment variables: `GIT_HASH`, `BUILD_TIMESTAMP` and
//! `BUILD_PROFILE`.

use std::process::Command;

fn git_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    (!hash.is_empty()).then(|| hash.to_string())
}

fn main() {
    let values = [
        ("GIT_HASH", git_hash().unwrap_or_else(|| "unknown".to_string())),
        (
            "BUILD_TIMESTAMP",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        ),
        (
            "BUILD_PROFILE",
            std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string()),
        ),
    ];

    for (name, value) in values {
        println!("cargo:rustc-env={}={}", name, value);
    }

    // Without rerun-if-changed Cargo reruns this on every build, keeping the
    // hash and timestamp current
}
