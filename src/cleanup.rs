use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Delete geometry-view files (`*.<extension>`) left in a case directory.
///
/// Only regular files directly inside `case_dir` are considered; everything
/// else is left in place. Returns the deleted paths in name order.
pub fn clean_visualization_artifacts(case_dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let suffix = format!(".{}", extension.trim_start_matches('.'));
    let entries =
        fs::read_dir(case_dir).with_context(|| format!("read case dir {}", case_dir.display()))?;

    let mut targets = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read entry in {}", case_dir.display()))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("stat {}", entry.path().display()))?;
        if !file_type.is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(&suffix) {
            targets.push(entry.path());
        }
    }
    targets.sort();

    for path in &targets {
        fs::remove_file(path).with_context(|| format!("delete {}", path.display()))?;
        tracing::info!("deleted {}", path.display());
    }
    Ok(targets)
}
