//! File operations that fall back to the alternate path representation.
//!
//! Every operation tries the caller's path verbatim first. Only when that
//! fails with a permission or existence error does it try the single
//! alternate representation (UNC for a drive path, drive for a UNC path),
//! and only when the converter actually produced a different path. There is
//! never a second transformation.

use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use globset::Glob;
use walkdir::WalkDir;

use crate::classify::is_unc_path;
use crate::convert::backslashed;
use crate::{PathContext, UncPathError};

fn falls_back(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::PermissionDenied | ErrorKind::NotFound)
}

// One read for files, one listing for directories. Reading 0 bytes of an
// empty file still counts as readable.
fn probe_once(path: &Path) -> bool {
    if path.is_file() {
        let mut byte = [0u8; 1];
        return File::open(path)
            .and_then(|mut f| f.read(&mut byte))
            .is_ok();
    }
    if path.is_dir() {
        return fs::read_dir(path).is_ok();
    }
    false
}

// File name of the last separator-delimited segment, independent of the
// host's separator so UNC strings resolve the same everywhere.
fn leaf_name(path: &Path) -> Option<String> {
    backslashed(path)
        .rsplit('\\')
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

impl PathContext {
    /// The one allowed fallback representation of a path: its converted form
    /// in the opposite style, or `None` when conversion is a no-op.
    pub fn alternate_path(&self, path: &Path) -> Option<PathBuf> {
        let alternate = if is_unc_path(path) {
            self.converter().to_local(path)
        } else {
            self.converter().to_unc(path)
        };
        (alternate.as_path() != path).then_some(alternate)
    }

    /// Opens a file, retrying once under the alternate representation when
    /// the verbatim open is refused. The verbatim error propagates if the
    /// retry is impossible or also fails.
    pub fn safe_open(&self, path: &Path, options: &OpenOptions) -> Result<File, UncPathError> {
        match options.open(path) {
            Ok(file) => Ok(file),
            Err(e) if falls_back(e.kind()) => {
                if let Some(alternate) = self.alternate_path(path) {
                    tracing::debug!(
                        "retrying open of '{}' as '{}'",
                        path.display(),
                        alternate.display()
                    );
                    if let Ok(file) = options.open(&alternate) {
                        return Ok(file);
                    }
                }
                Err(UncPathError::open(path, e))
            }
            Err(e) => Err(UncPathError::open(path, e)),
        }
    }

    /// Existence check; with `check_both` the alternate representation is
    /// consulted when the verbatim path is absent.
    pub fn exists(&self, path: &Path, check_both: bool) -> bool {
        if path.exists() {
            return true;
        }
        check_both && self.alternate_path(path).is_some_and(|alt| alt.exists())
    }

    /// Accessibility check: files must support a one-byte read, directories
    /// a listing. Same single-alternate policy as [`exists`](Self::exists).
    pub fn is_accessible(&self, path: &Path, check_both: bool) -> bool {
        if probe_once(path) {
            return true;
        }
        check_both && self.alternate_path(path).is_some_and(|alt| probe_once(&alt))
    }

    /// Returns whichever of the verbatim path and its alternate first
    /// reports accessible, or `None` when neither does.
    pub fn find_accessible_path(&self, path: &Path) -> Option<PathBuf> {
        if probe_once(path) {
            return Some(path.to_path_buf());
        }
        self.alternate_path(path).filter(|alt| probe_once(alt))
    }

    /// Copies a file, trying alternate `(src, dst)` combinations when the
    /// verbatim copy is refused: alternate source, alternate destination,
    /// then both alternated when the two sides have opposite shapes. Returns
    /// the destination path actually written; the verbatim error propagates
    /// when every variant fails.
    pub fn safe_copy(&self, src: &Path, dst: &Path) -> Result<PathBuf, UncPathError> {
        match fs::copy(src, dst) {
            Ok(_) => Ok(dst.to_path_buf()),
            Err(e) if falls_back(e.kind()) => {
                let alt_src = self.alternate_path(src);
                let alt_dst = self.alternate_path(dst);

                let mut variants: Vec<(PathBuf, PathBuf)> = Vec::new();
                if let Some(s) = &alt_src {
                    variants.push((s.clone(), dst.to_path_buf()));
                }
                if let Some(d) = &alt_dst {
                    variants.push((src.to_path_buf(), d.clone()));
                }
                if let (Some(s), Some(d)) = (alt_src, alt_dst)
                    && is_unc_path(src) != is_unc_path(dst)
                {
                    variants.push((s, d));
                }

                for (s, d) in variants {
                    tracing::debug!(
                        "retrying copy with converted paths: '{}' -> '{}'",
                        s.display(),
                        d.display()
                    );
                    if fs::copy(&s, &d).is_ok() {
                        return Ok(d);
                    }
                }
                Err(UncPathError::copy(src, dst, e))
            }
            Err(e) => Err(UncPathError::copy(src, dst, e)),
        }
    }

    /// Converts each path toward the requested representation. Always one
    /// entry per input; an inconvertible path maps to itself.
    pub fn batch_convert(&self, paths: &[PathBuf], to_unc: bool) -> HashMap<PathBuf, PathBuf> {
        paths
            .iter()
            .map(|path| {
                let converted = if to_unc {
                    self.converter().to_unc(path)
                } else {
                    self.converter().to_local(path)
                };
                (path.clone(), converted)
            })
            .collect()
    }

    /// Copies several files into `dst_dir`, creating it first (the creation
    /// itself falls back to the alternate representation). Each file gets
    /// `max_retries + 1` attempts through [`safe_copy`](Self::safe_copy).
    ///
    /// The result always has one entry per source: the destination actually
    /// written, or `None` on failure. When the directory cannot be created
    /// even via its alternate, every entry is `None`.
    pub fn batch_copy(
        &self,
        src_paths: &[PathBuf],
        dst_dir: &Path,
        max_retries: u32,
    ) -> HashMap<PathBuf, Option<PathBuf>> {
        let resolved_dir = match fs::create_dir_all(dst_dir) {
            Ok(()) => dst_dir.to_path_buf(),
            Err(e) => {
                tracing::warn!("failed to create '{}': {e}", dst_dir.display());
                match self.alternate_path(dst_dir) {
                    Some(alt) if fs::create_dir_all(&alt).is_ok() => {
                        tracing::debug!("created destination via alternate '{}'", alt.display());
                        alt
                    }
                    _ => {
                        tracing::warn!(
                            "destination '{}' unavailable under either representation",
                            dst_dir.display()
                        );
                        return src_paths.iter().map(|s| (s.clone(), None)).collect();
                    }
                }
            }
        };

        let mut results = HashMap::new();
        for src in src_paths {
            let Some(name) = leaf_name(src) else {
                tracing::warn!("source '{}' has no file name", src.display());
                results.insert(src.clone(), None);
                continue;
            };
            let dst = resolved_dir.join(name);

            let mut written = None;
            for attempt in 0..=max_retries {
                match self.safe_copy(src, &dst) {
                    Ok(dest) => {
                        written = Some(dest);
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(attempt, "copy of '{}' failed: {e}", src.display());
                    }
                }
            }
            if written.is_none() {
                tracing::warn!(
                    "giving up on '{}' after {} attempts",
                    src.display(),
                    max_retries + 1
                );
            }
            results.insert(src.clone(), written);
        }
        results
    }

    /// Runs `callback` over the files in `dir` whose names match `pattern`.
    ///
    /// The directory is resolved with the same existence fallback as
    /// [`exists`](Self::exists); an unresolvable directory (or an invalid
    /// pattern) yields an empty map. A callback error is recorded as `None`
    /// for that file and never aborts the scan.
    pub fn process_files<T, E, F>(
        &self,
        dir: &Path,
        pattern: &str,
        recursive: bool,
        mut callback: F,
    ) -> HashMap<PathBuf, Option<T>>
    where
        F: FnMut(&Path) -> Result<T, E>,
        E: fmt::Display,
    {
        let resolved = if dir.exists() {
            dir.to_path_buf()
        } else if let Some(alt) = self.alternate_path(dir).filter(|alt| alt.exists()) {
            tracing::debug!("scanning '{}' via alternate '{}'", dir.display(), alt.display());
            alt
        } else {
            tracing::warn!("directory not found: '{}'", dir.display());
            return HashMap::new();
        };

        let matcher = match Glob::new(pattern) {
            Ok(glob) => glob.compile_matcher(),
            Err(e) => {
                tracing::warn!("invalid file pattern '{pattern}': {e}");
                return HashMap::new();
            }
        };

        let mut walker = WalkDir::new(&resolved);
        if !recursive {
            walker = walker.max_depth(1);
        }

        let mut results = HashMap::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("skipping unreadable entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !matcher.is_match(entry.file_name()) {
                continue;
            }
            let path = entry.into_path();
            match callback(&path) {
                Ok(value) => {
                    results.insert(path, Some(value));
                }
                Err(e) => {
                    tracing::warn!("processing '{}' failed: {e}", path.display());
                    results.insert(path, None);
                }
            }
        }
        results
    }

    /// Replaces `old` with `new` in a text file, opening it through
    /// [`safe_open`](Self::safe_open) in both directions. Returns whether
    /// the file was modified.
    pub fn replace_in_file(
        &self,
        path: &Path,
        old: &str,
        new: &str,
    ) -> Result<bool, UncPathError> {
        use std::io::Write;

        let mut content = String::new();
        self.safe_open(path, OpenOptions::new().read(true))?
            .read_to_string(&mut content)
            .map_err(|e| UncPathError::open(path, e))?;

        if !content.contains(old) {
            tracing::debug!("text not found in '{}'", path.display());
            return Ok(false);
        }

        let updated = content.replace(old, new);
        self.safe_open(path, OpenOptions::new().write(true).truncate(true))?
            .write_all(updated.as_bytes())
            .map_err(|e| UncPathError::open(path, e))?;
        Ok(true)
    }

    /// [`replace_in_file`](Self::replace_in_file) over every matching file
    /// in a directory. One entry per processed file; a per-file failure is
    /// recorded as `None`.
    pub fn batch_replace_in_files(
        &self,
        dir: &Path,
        old: &str,
        new: &str,
        pattern: &str,
        recursive: bool,
    ) -> HashMap<PathBuf, Option<bool>> {
        self.process_files(dir, pattern, recursive, |path| {
            self.replace_in_file(path, old, new)
        })
    }
}
