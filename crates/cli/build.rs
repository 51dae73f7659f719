//! Build script for the finsheet CLI
//!
//! Stamps the binary with build time and commit for `finsheet --version`.

fn rustc_env(key: &str, value: &str) {
    println!("cargo:rustc-env={}={}", key, value);
}

fn main() {
    built::write_built_file().expect("Failed to acquire build-time information");

    println!("cargo:rerun-if-env-changed=GIT_COMMIT_HASH");
    let commit = std::env::var("GIT_COMMIT_HASH").unwrap_or_else(|_| "unknown".to_string());
    rustc_env("FINSHEET_COMMIT", &commit);
    rustc_env("FINSHEET_BUILT_AT", &chrono::Utc::now().to_rfc3339());
}
