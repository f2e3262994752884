//! Tool list input and the navigation manifest.
//!
//! The published manifest `tools/tools_list.json` doubles as the input tool
//! list: once a site exists, editing the manifest (or regenerating it from
//! the output directories with `regen-list`) is how tools are added and
//! removed. A fresh project starts from a plain `tools.txt`:
//!
//! ```text
//! Word Counter
//! Timer
//! JSON Formatter
//! ```
//!
//! Slugs are always recomputed from names, whatever the input says. Names
//! whose slug would be empty are skipped with a warning.
//!
//! All file access is async (`tokio::fs`), like the rest of the build path.

use crate::naming::{display_name_from_slug, slugify};
use crate::types::{NavigationManifest, Tool};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid tool manifest {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("no tool list: neither {manifest} nor {list} exists")]
    NoToolList { manifest: PathBuf, list: PathBuf },
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_file())
}

/// Load the tool list: the manifest if it exists, else the plain list.
pub async fn load_tools(
    manifest_path: &Path,
    list_path: &Path,
) -> Result<Vec<Tool>, ManifestError> {
    let names: Vec<String> = if is_file(manifest_path).await {
        debug!("reading tools from {}", manifest_path.display());
        let content = fs::read_to_string(manifest_path).await?;
        let manifest: NavigationManifest =
            serde_json::from_str(&content).map_err(|source| ManifestError::Json {
                path: manifest_path.to_path_buf(),
                source,
            })?;
        manifest.tools.into_iter().map(|entry| entry.name).collect()
    } else if is_file(list_path).await {
        debug!("reading tools from {}", list_path.display());
        fs::read_to_string(list_path)
            .await?
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect()
    } else {
        return Err(ManifestError::NoToolList {
            manifest: manifest_path.to_path_buf(),
            list: list_path.to_path_buf(),
        });
    };

    Ok(tools_from_names(names))
}

fn tools_from_names(names: Vec<String>) -> Vec<Tool> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|name| Tool::new(name.trim()))
        .filter(|tool| {
            if tool.slug.is_empty() {
                warn!("skipping tool {:?}: name has no letters or digits", tool.name);
                return false;
            }
            if !seen.insert(tool.slug.clone()) {
                warn!(
                    "duplicate tool slug {:?} ({}); pages will overwrite each other",
                    tool.slug, tool.name
                );
            }
            true
        })
        .collect()
}

/// Overwrite the manifest with `tools`, in order.
pub async fn write_manifest(path: &Path, tools: &[Tool]) -> Result<(), ManifestError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(&NavigationManifest::from_tools(tools)).map_err(
        |source| ManifestError::Json {
            path: path.to_path_buf(),
            source,
        },
    )?;
    fs::write(path, json).await?;
    Ok(())
}

/// Rebuild the tool list from the sub-directories of the tools output
/// directory, sorted by slug. Directories that are not slugs (hidden
/// directories, say) are ignored.
pub async fn scan_tool_dirs(tools_dir: &Path) -> Result<Vec<Tool>, ManifestError> {
    let mut entries = match fs::read_dir(tools_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut slugs = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }
        let dir_name = entry.file_name().to_string_lossy().into_owned();
        if slugify(&dir_name) != dir_name || dir_name.is_empty() {
            debug!("ignoring non-tool directory {dir_name:?}");
            continue;
        }
        slugs.push(dir_name);
    }
    slugs.sort();
    Ok(slugs
        .iter()
        .map(|slug| Tool::new(display_name_from_slug(slug)))
        .collect())
}
