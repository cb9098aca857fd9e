//! Build script for admin crate.
//!
//! Exposes the stylesheet hash as `CSS_HASH` for cache busting.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

const STYLESHEET: &str = "static/css/admin.css";

fn main() {
    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        println!("cargo:rustc-env=CSS_HASH=");
        return;
    };
    let path = Path::new(&manifest_dir).join(STYLESHEET);
    println!("cargo:rerun-if-changed={}", path.display());

    match fs::read(&path) {
        Ok(content) => {
            let hash = format!("{:x}", Sha256::digest(&content));
            let short_hash = hash.get(..8).unwrap_or(&hash);
            println!("cargo:rustc-env=CSS_HASH={short_hash}");
        }
        Err(e) => {
            println!("cargo:warning=Could not read {STYLESHEET}: {e}");
            println!("cargo:rustc-env=CSS_HASH=");
        }
    }
}
