//! Build script for storefront crate.
//!
//! Hashes static assets so templates can reference them as
//! `/static/css/main.css?v={hash}` and browsers refetch after a change.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    hash_asset("static/css/main.css", "CSS_HASH");
    hash_asset("static/js/checkout.js", "JS_HASH");
}

/// Set `env_var` to the first 8 hex chars of the file's SHA-256.
///
/// A missing file yields an empty hash and a warning.
fn hash_asset(relative: &str, env_var: &str) {
    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        println!("cargo:rustc-env={env_var}=");
        return;
    };
    let path = Path::new(&manifest_dir).join(relative);
    println!("cargo:rerun-if-changed={}", path.display());

    let content = match fs::read(&path) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read {relative}: {e}");
            println!("cargo:rustc-env={env_var}=");
            return;
        }
    };

    let hash = format!("{:x}", Sha256::digest(&content));
    let short_hash = hash.get(..8).unwrap_or(&hash);
    println!("cargo:rustc-env={env_var}={short_hash}");
}
