//! Build script for storefront crate.
//!
//! Generates a content-based hash for the stylesheet so templates can emit a
//! cache-busting version query parameter.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    hash_css();
}

/// Hash `static/css/main.css` and expose the first 12 hex chars as the
/// `CSS_HASH` environment variable for use with `env!("CSS_HASH")`.
fn hash_css() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let css_path = Path::new(&manifest_dir).join("static/css/main.css");

    // Tell Cargo to rerun if main.css changes
    println!("cargo:rerun-if-changed={}", css_path.display());

    let hash = match fs::read(&css_path) {
        Ok(content) => {
            let digest = Sha256::digest(&content);
            let hex = format!("{digest:x}");
            hex.chars().take(12).collect::<String>()
        }
        // Missing stylesheet is not fatal; fall back to a fixed tag so the
        // binary still builds (dev environments without assets).
        Err(_) => "dev".to_string(),
    };

    println!("cargo:rustc-env=CSS_HASH={hash}");
}
