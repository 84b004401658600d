use std::{
    cmp::Reverse,
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    time::SystemTime,
};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// File name the full directory sweep never removes.
pub const PRESERVED_FILE: &str = ".gitignore";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed_files: Vec<PathBuf>,
    pub removed_dirs: Vec<PathBuf>,
    pub preserved: Vec<PathBuf>,
}

impl CleanupReport {
    pub fn removed(&self) -> usize {
        self.removed_files.len() + self.removed_dirs.len()
    }
}

/// Top-level entries of an output directory with their modification times.
pub(crate) type Snapshot = BTreeMap<PathBuf, Option<SystemTime>>;

/// Deletes everything below `dir` except files named [`PRESERVED_FILE`] and
/// the files listed in `keep`.
///
/// Subdirectories are removed once empty; a directory still holding a
/// preserved file stays. `dir` itself is never removed and symlinks are
/// deleted without being followed. Nothing else checks that `dir` only
/// holds converter output.
pub fn clear_directory(dir: &Path, keep: &[&Path]) -> Result<CleanupReport> {
    let mut report = CleanupReport::default();
    if !dir.exists() {
        tracing::debug!("{} does not exist, nothing to clear", dir.display());
        return Ok(report);
    }
    let keep: Vec<PathBuf> = keep
        .iter()
        .filter_map(|path| fs::canonicalize(path).ok())
        .collect();

    tracing::info!("Clearing {}...", dir.display());
    for entry in WalkDir::new(dir).min_depth(1).contents_first(true) {
        let entry = entry.map_err(|err| Error::CleanupFailed {
            path: err.path().unwrap_or(dir).to_path_buf(),
            source: err.into(),
        })?;
        let path = entry.path();

        if entry.file_type().is_dir() {
            if is_empty_dir(path)? {
                remove_dir(path, &mut report)?;
            }
        } else if entry.file_name() == PRESERVED_FILE || is_kept(path, &keep) {
            report.preserved.push(path.to_path_buf());
        } else {
            remove_file(path, &mut report)?;
        }
    }

    tracing::info!(
        "Removed {} entries from {}, kept {}",
        report.removed(),
        dir.display(),
        report.preserved.len()
    );

    Ok(report)
}

/// Deletes exactly the given paths: files first, then directories that
/// ended up empty, deepest first. Paths that no longer exist are skipped.
pub fn remove_tracked(paths: &[PathBuf]) -> Result<CleanupReport> {
    let mut report = CleanupReport::default();
    let mut dirs = Vec::new();

    for path in paths {
        match fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => dirs.push(path),
            Ok(_) => remove_file(path, &mut report)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("{} already gone", path.display());
            }
            Err(source) => {
                return Err(Error::CleanupFailed {
                    path: path.clone(),
                    source,
                })
            }
        }
    }

    dirs.sort_by_key(|dir| Reverse(dir.components().count()));
    for dir in dirs {
        if is_empty_dir(dir)? {
            remove_dir(dir, &mut report)?;
        } else {
            report.preserved.push(dir.clone());
        }
    }

    Ok(report)
}

/// `pdftohtml` only writes next to its output file, so subdirectories are
/// listed but never descended into.
pub(crate) fn snapshot(dir: &Path) -> io::Result<Snapshot> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .map(|entry| -> io::Result<(PathBuf, Option<SystemTime>)> {
            let entry = entry?;
            let modified = entry.metadata().ok().and_then(|meta| meta.modified().ok());
            Ok((entry.into_path(), modified))
        })
        .collect()
}

/// Entries that are new in `after` or were rewritten since `before`.
pub(crate) fn changed(before: &Snapshot, after: &Snapshot) -> Vec<PathBuf> {
    after
        .iter()
        .filter(|(path, modified)| match before.get(*path) {
            Some(previous) => previous != *modified,
            None => true,
        })
        .map(|(path, _)| path.clone())
        .collect()
}

fn is_kept(path: &Path, keep: &[PathBuf]) -> bool {
    !keep.is_empty()
        && fs::canonicalize(path)
            .map(|path| keep.contains(&path))
            .unwrap_or(false)
}

fn is_empty_dir(path: &Path) -> Result<bool> {
    let mut entries = fs::read_dir(path).map_err(|source| Error::CleanupFailed {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(entries.next().is_none())
}

fn remove_file(path: &Path, report: &mut CleanupReport) -> Result<()> {
    fs::remove_file(path).map_err(|source| Error::CleanupFailed {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Removed {}", path.display());
    report.removed_files.push(path.to_path_buf());

    Ok(())
}

fn remove_dir(path: &Path, report: &mut CleanupReport) -> Result<()> {
    fs::remove_dir(path).map_err(|source| Error::CleanupFailed {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Removed directory {}", path.display());
    report.removed_dirs.push(path.to_path_buf());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_gitignore() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.png"), b"png").unwrap();
        fs::write(dir.path().join("a.html"), b"<html>").unwrap();
        fs::write(dir.path().join(".gitignore"), b"*\n").unwrap();

        let report = clear_directory(dir.path(), &[]).unwrap();

        assert_eq!(report.removed_files.len(), 2);
        assert_eq!(report.preserved, vec![dir.path().join(".gitignore")]);
        assert!(!dir.path().join("a.png").exists());
        assert!(!dir.path().join("a.html").exists());
        assert!(dir.path().join(".gitignore").exists());
    }

    #[test]
    fn removes_nested_directories_once_empty() {
        let dir = tempfile::tempdir().unwrap();
        let pages = dir.path().join("pages/images");
        fs::create_dir_all(&pages).unwrap();
        fs::write(pages.join("p1.png"), b"png").unwrap();
        let kept = dir.path().join("kept");
        fs::create_dir(&kept).unwrap();
        fs::write(kept.join(".gitignore"), b"").unwrap();
        fs::write(kept.join("p2.html"), b"").unwrap();

        let report = clear_directory(dir.path(), &[]).unwrap();

        assert!(!dir.path().join("pages").exists());
        assert_eq!(report.removed_dirs.len(), 2);
        assert!(kept.join(".gitignore").exists());
        assert!(!kept.join("p2.html").exists());
        assert!(dir.path().exists());
    }

    #[test]
    fn missing_directory_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let report = clear_directory(&dir.path().join("nope"), &[]).unwrap();

        assert_eq!(report, CleanupReport::default());
    }

    #[test]
    fn tracked_removal_leaves_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("images");
        fs::create_dir(&images).unwrap();
        fs::write(images.join("img-1.png"), b"").unwrap();
        fs::write(dir.path().join("report.html"), b"").unwrap();
        fs::write(dir.path().join("report.pdf"), b"%PDF").unwrap();

        let report = remove_tracked(&[
            images.clone(),
            images.join("img-1.png"),
            dir.path().join("report.html"),
            dir.path().join("already-gone.png"),
        ])
        .unwrap();

        assert_eq!(report.removed_files.len(), 2);
        assert_eq!(report.removed_dirs, vec![images.clone()]);
        assert!(dir.path().join("report.pdf").exists());
    }

    #[test]
    fn keeps_listed_files() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("report.pdf");
        fs::write(&pdf, b"%PDF").unwrap();
        fs::write(dir.path().join("report.html"), b"").unwrap();

        let report = clear_directory(dir.path(), &[pdf.as_path()]).unwrap();

        assert!(pdf.exists());
        assert_eq!(report.removed_files, vec![dir.path().join("report.html")]);
        assert_eq!(report.preserved, vec![pdf]);
    }

    #[test]
    fn snapshot_stays_at_top_level() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("archive/2024");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("old.html"), b"").unwrap();
        fs::write(dir.path().join("report.html"), b"").unwrap();

        let snapshot = snapshot(dir.path()).unwrap();
        let paths: Vec<_> = snapshot.keys().cloned().collect();

        assert_eq!(
            paths,
            vec![dir.path().join("archive"), dir.path().join("report.html")]
        );
    }

    #[test]
    fn changed_includes_rewritten_entries() {
        let old = SystemTime::UNIX_EPOCH;
        let new = old + std::time::Duration::from_secs(60);
        let before = Snapshot::from([
            (PathBuf::from("out/a.png"), Some(old)),
            (PathBuf::from("out/notes.txt"), Some(old)),
        ]);
        let after = Snapshot::from([
            (PathBuf::from("out/a.png"), Some(new)),
            (PathBuf::from("out/a.html"), Some(new)),
            (PathBuf::from("out/notes.txt"), Some(old)),
        ]);

        assert_eq!(
            changed(&before, &after),
            vec![PathBuf::from("out/a.html"), PathBuf::from("out/a.png")]
        );
    }
}
