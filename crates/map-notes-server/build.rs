//! Build script for map-notes-server
//!
//! rust-embed needs the dist/ folder to exist at compile time. The client is
//! built separately via `trunk build` before building the server; when it has
//! not been built yet a placeholder page is embedded instead.

use std::env;
use std::path::Path;

fn main() {
    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        return;
    };
    let dist_dir = Path::new(&manifest_dir).join("../../dist");

    println!("cargo:rerun-if-changed={}", dist_dir.display());

    if !dist_dir.exists() {
        println!("cargo:warning=dist/ directory not found, embedding a placeholder page");
        println!("cargo:warning=Run `trunk build --release` first to embed the client");
        std::fs::create_dir_all(&dist_dir).ok();
        std::fs::write(
            dist_dir.join("index.html"),
            "<!doctype html><title>map-notes</title><p>Client not built.</p>",
        )
        .ok();
    }
}
