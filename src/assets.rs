//! Shared front-end assets.
//!
//! The stylesheet and script every page links to are compiled into the
//! binary and written on each build:
//!
//! ```text
//! <output_dir>/shared/
//! ├── css/style.css    # Layout, light/dark theme variables
//! └── js/scripts.js    # Theme toggle, manifest-driven nav, mobile menu
//! ```

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

const STYLE_CSS: &str = include_str!("../static/style.css");
const SCRIPTS_JS: &str = include_str!("../static/scripts.js");

/// Write the shared assets under `output_dir`, returning the written paths.
pub async fn write_static_assets(output_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (relative, content) in [
        ("shared/css/style.css", STYLE_CSS),
        ("shared/js/scripts.js", SCRIPTS_JS),
    ] {
        let path = output_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, content).await?;
        written.push(path);
    }
    Ok(written)
}
