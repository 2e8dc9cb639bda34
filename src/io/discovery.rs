//! Transcript file discovery.
//!
//! Centralizes input discovery so the pipeline only processes transcript
//! files of the configured extension, respecting exclude globs and the file
//! size cap. Results are sorted so downstream document order is stable.

use std::fs;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::core::config::IoConfig;
use crate::core::errors::{Result, SkaldError};

/// Discover transcript files under `root` per the io configuration.
pub fn discover_transcripts(root: &Path, config: &IoConfig) -> Result<Vec<PathBuf>> {
    let exclude_glob = compile_globset(&config.exclude_patterns)?;
    let extension = config.input_extension.trim_start_matches('.').to_ascii_lowercase();

    let mut collected = Vec::new();

    if root.is_file() {
        if should_keep(root, root.parent().unwrap_or(root), &extension, exclude_glob.as_ref(), config.max_file_size_bytes) {
            collected.push(root.to_path_buf());
        }
        return Ok(collected);
    }

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Failed to walk directory: {err}");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if should_keep(path, root, &extension, exclude_glob.as_ref(), config.max_file_size_bytes) {
            collected.push(path.to_path_buf());
        }
    }

    collected.sort();
    info!("Transcript discovery completed: {} files selected", collected.len());
    Ok(collected)
}

fn compile_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    let mut builder = GlobSetBuilder::new();
    let mut added = false;

    for pattern in patterns {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            continue;
        }

        let glob = GlobBuilder::new(pattern)
            .literal_separator(false)
            .build()
            .map_err(|err| {
                SkaldError::config(format!("Invalid glob pattern '{pattern}': {err}"))
            })?;
        builder.add(glob);
        added = true;
    }

    if added {
        builder
            .build()
            .map(Some)
            .map_err(|err| SkaldError::config(format!("Failed to build glob set: {err}")))
    } else {
        Ok(None)
    }
}

fn should_keep(
    path: &Path,
    base: &Path,
    extension: &str,
    exclude_glob: Option<&GlobSet>,
    max_file_size_bytes: u64,
) -> bool {
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => ext.to_ascii_lowercase(),
        None => return false,
    };
    if ext != extension {
        return false;
    }

    // 0 means unlimited
    if max_file_size_bytes > 0 {
        if let Ok(metadata) = fs::metadata(path) {
            if metadata.len() > max_file_size_bytes {
                warn!("Skipping oversized file: {}", path.display());
                return false;
            }
        }
    }

    let relative = path.strip_prefix(base).unwrap_or(path);
    if let Some(exclude) = exclude_glob {
        if exclude.is_match(relative) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn discovers_only_matching_extension_sorted() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "b.stm", "line");
        write_file(dir.path(), "a.stm", "line");
        write_file(dir.path(), "notes.txt", "line");

        let config = IoConfig::default();
        let found = discover_transcripts(dir.path(), &config).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.stm", "b.stm"]);
    }

    #[test]
    fn exclude_patterns_filter_files() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "keep.stm", "line");
        write_file(dir.path(), "drafts/skip.stm", "line");

        let mut config = IoConfig::default();
        config.exclude_patterns = vec!["drafts/**".to_string()];
        let found = discover_transcripts(dir.path(), &config).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("keep.stm"));
    }

    #[test]
    fn size_cap_skips_large_files() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "big.stm", &"x".repeat(64));
        write_file(dir.path(), "small.stm", "x");

        let mut config = IoConfig::default();
        config.max_file_size_bytes = 16;
        let found = discover_transcripts(dir.path(), &config).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("small.stm"));
    }

    #[test]
    fn single_file_root_is_accepted() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "talk.stm", "line");
        let config = IoConfig::default();
        let found = discover_transcripts(&path, &config).unwrap();
        assert_eq!(found, vec![path]);
    }

    #[test]
    fn invalid_glob_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let mut config = IoConfig::default();
        config.exclude_patterns = vec!["[invalid".to_string()];
        let result = discover_transcripts(dir.path(), &config);
        assert!(matches!(result, Err(SkaldError::Config { .. })));
    }
}
