use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use walkdir::WalkDir;

use crate::config::Config;

/// Expands the given paths into the GraphQL files to parse, in a stable order.
///
/// Files given explicitly are always kept. Directories are walked recursively, sorted by
/// file name, keeping the files with one of the configured extensions.
pub(crate) fn collect(paths: &[PathBuf], config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }

        if !path.is_dir() {
            bail!("{} is neither a file nor a directory", path.display());
        }

        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .follow_links(config.follow_links)
        {
            let entry = entry.with_context(|| format!("error walking {}", path.display()))?;

            if entry.file_type().is_file() && has_extension(entry.path(), &config.extensions) {
                files.push(entry.into_path());
            }
        }
    }

    Ok(files)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extensions.iter().any(|candidate| candidate == extension))
}
