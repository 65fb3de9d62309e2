//! Patch applicator: reads target files, runs the structure-preserving
//! engine, and writes results back atomically. This is the disk-facing
//! collaborator around the pure engine; the engine itself never touches
//! the filesystem.

use crate::config::schema::{FileDefinition, PatchConfig};
use crate::edit::{atomic_write, EditError};
use crate::patch::PatchError;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Result of applying one file definition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "PatchResult should be checked for patched/unchanged"]
pub enum PatchResult {
    /// The file was patched (or would be, under dry-run)
    Patched { file: PathBuf },
    /// All rules were inert; the file is byte-identical and untouched
    Unchanged { file: PathBuf },
}

impl fmt::Display for PatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchResult::Patched { file } => write!(f, "patched {}", file.display()),
            PatchResult::Unchanged { file } => write!(f, "unchanged {}", file.display()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Patch { path: PathBuf, source: PatchError },

    #[error("target path escapes the root directory: {0}")]
    OutsideRoot(PathBuf),

    #[error("edit error: {0}")]
    Edit(#[from] EditError),
}

/// Apply every file definition in `config` against targets under `root`.
///
/// Returns one `(path, result)` pair per definition; a failure on one
/// file does not stop the others.
pub fn apply_files(
    config: &PatchConfig,
    root: &Path,
    dry_run: bool,
) -> Vec<(String, Result<PatchResult, ApplicationError>)> {
    config
        .files
        .iter()
        .map(|file| (file.path.clone(), apply_file(file, root, dry_run)))
        .collect()
}

/// Check what `apply_files` would do without writing anything.
pub fn check_files(
    config: &PatchConfig,
    root: &Path,
) -> Vec<(String, Result<PatchResult, ApplicationError>)> {
    apply_files(config, root, true)
}

/// Read the target of `definition` and run the engine against it,
/// returning `(original, patched)` without writing. Used for diffs.
pub fn preview(
    definition: &FileDefinition,
    root: &Path,
) -> Result<(Vec<u8>, Vec<u8>), ApplicationError> {
    let target = resolve_target(root, &definition.path)?;
    let original = read_target(&target)?;
    let patched = run_engine(definition, &target, &original)?;
    Ok((original, patched))
}

fn apply_file(
    definition: &FileDefinition,
    root: &Path,
    dry_run: bool,
) -> Result<PatchResult, ApplicationError> {
    let target = resolve_target(root, &definition.path)?;
    let original = read_target(&target)?;
    let patched = run_engine(definition, &target, &original)?;

    if patched == original {
        return Ok(PatchResult::Unchanged { file: target });
    }
    if !dry_run {
        atomic_write(&target, &patched)?;
    }
    Ok(PatchResult::Patched { file: target })
}

fn read_target(target: &Path) -> Result<Vec<u8>, ApplicationError> {
    fs::read(target).map_err(|source| ApplicationError::Io {
        path: target.to_path_buf(),
        source,
    })
}

fn run_engine(
    definition: &FileDefinition,
    target: &Path,
    original: &[u8],
) -> Result<Vec<u8>, ApplicationError> {
    let file = definition
        .to_configuration_file()
        .map_err(|source| ApplicationError::Patch {
            path: target.to_path_buf(),
            source,
        })?;
    file.update_preserving_structure(original)
        .map_err(|source| ApplicationError::Patch {
            path: target.to_path_buf(),
            source,
        })
}

/// Join `relative` onto `root`, rejecting absolute paths and any `..`
/// traversal that would climb out of the root.
fn resolve_target(root: &Path, relative: &str) -> Result<PathBuf, ApplicationError> {
    let relative = Path::new(relative);
    if relative.is_absolute() {
        return Err(ApplicationError::OutsideRoot(relative.to_path_buf()));
    }

    let mut depth: i32 = 0;
    for component in relative.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return Err(ApplicationError::OutsideRoot(relative.to_path_buf()));
                }
            }
            _ => return Err(ApplicationError::OutsideRoot(relative.to_path_buf())),
        }
    }

    Ok(root.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_rejects_absolute_paths() {
        let result = resolve_target(Path::new("/srv"), "/etc/passwd");
        assert!(matches!(result, Err(ApplicationError::OutsideRoot(_))));
    }

    #[test]
    fn test_resolve_rejects_escaping_traversal() {
        let result = resolve_target(Path::new("/srv"), "../outside.json");
        assert!(matches!(result, Err(ApplicationError::OutsideRoot(_))));

        let result = resolve_target(Path::new("/srv"), "a/../../outside.json");
        assert!(matches!(result, Err(ApplicationError::OutsideRoot(_))));
    }

    #[test]
    fn test_resolve_allows_internal_traversal() {
        let target = resolve_target(Path::new("/srv"), "configs/../server.json").unwrap();
        assert_eq!(target, Path::new("/srv/configs/../server.json"));
    }
}
