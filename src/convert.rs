use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::platform::PlatformPathServices;

/// One direction-agnostic mapping between a UNC share prefix and the local
/// name it is connected to. Display case is preserved; lookup happens on
/// case-folded keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub unc_prefix: String,
    pub drive: String,
}

/// Bidirectional table between UNC share prefixes and mapped drive letters.
///
/// The table is a snapshot: [`refresh`] rebuilds it wholesale from the
/// platform's current drive↔UNC associations and never partially mutates it.
/// Conversions are pure string rewrites against the snapshot; a path that
/// cannot be converted comes back unchanged, which is the "no mapping
/// available" signal callers compare for.
///
/// [`refresh`]: UncConverter::refresh
pub struct UncConverter {
    platform: Arc<dyn PlatformPathServices>,
    // lowercased, backslash-normalized UNC prefix -> entry
    forward: HashMap<String, MappingEntry>,
    // canonical drive name (`Z:`) -> entry
    reverse: HashMap<String, MappingEntry>,
}

impl UncConverter {
    /// Creates a converter and loads the initial mapping snapshot.
    ///
    /// A failed enumeration degrades to an empty table.
    pub fn new(platform: Arc<dyn PlatformPathServices>) -> Self {
        let mut converter = Self {
            platform,
            forward: HashMap::new(),
            reverse: HashMap::new(),
        };
        converter.refresh();
        converter
    }

    /// Rebuilds both lookup directions from the platform's current
    /// associations and returns the new UNC-to-drive snapshot.
    ///
    /// The swap is all-or-nothing: when enumeration fails the previous
    /// snapshot is kept and an empty map is returned. Duplicate prefixes or
    /// drives are resolved last-write-wins.
    pub fn refresh(&mut self) -> HashMap<String, String> {
        let current = match self.platform.drive_mappings() {
            Ok(current) => current,
            Err(e) => {
                tracing::warn!("drive mapping enumeration failed, keeping previous snapshot: {e}");
                return HashMap::new();
            }
        };

        let mut forward = HashMap::new();
        let mut reverse = HashMap::new();
        for mapping in current {
            let entry = MappingEntry {
                unc_prefix: mapping.remote.trim_end_matches(['\\', '/']).to_string(),
                drive: canonical_drive(&mapping.local),
            };
            let key = entry.unc_prefix.replace('/', "\\").to_ascii_lowercase();
            forward.insert(key, entry.clone());
            reverse.insert(entry.drive.clone(), entry);
        }
        tracing::debug!(mappings = forward.len(), "refreshed drive mappings");

        self.forward = forward;
        self.reverse = reverse;
        self.mappings()
    }

    /// Rewrites a UNC path to its mapped drive-letter form.
    ///
    /// Drive-letter paths and non-UNC paths are returned unchanged, as is a
    /// UNC path with no matching prefix. Among several matching prefixes the
    /// longest one wins, so a share-level mapping cannot shadow a more
    /// specific one.
    pub fn to_local(&self, path: &Path) -> PathBuf {
        let norm = backslashed(path);
        if drive_prefix(&norm).is_some() || !norm.starts_with(r"\\") {
            return path.to_path_buf();
        }

        let folded = norm.to_ascii_lowercase();
        let mut keys: Vec<&String> = self.forward.keys().collect();
        keys.sort_unstable_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        for key in keys {
            if !folded.starts_with(key.as_str()) {
                continue;
            }
            let entry = &self.forward[key];
            let remainder = norm[key.len()..].trim_start_matches('\\');
            let converted = join_onto(&entry.drive, remainder);
            tracing::debug!("converted UNC path '{norm}' to local path '{converted}'");
            return PathBuf::from(converted);
        }

        tracing::debug!("no drive mapping found for UNC path '{norm}'");
        path.to_path_buf()
    }

    /// Rewrites a drive-letter path to its mapped UNC form.
    ///
    /// UNC paths, paths without a drive letter and unmapped drives are
    /// returned unchanged. A bare drive (`Z:`) converts to the bare share
    /// root.
    pub fn to_unc(&self, path: &Path) -> PathBuf {
        let norm = backslashed(path);
        if norm.starts_with(r"\\") {
            return path.to_path_buf();
        }
        let Some(drive) = drive_prefix(&norm) else {
            return path.to_path_buf();
        };
        let Some(entry) = self.reverse.get(&drive) else {
            tracing::debug!("no UNC mapping found for local path '{norm}'");
            return path.to_path_buf();
        };

        let remainder = norm[drive.len()..].trim_start_matches('\\');
        let converted = join_onto(&entry.unc_prefix, remainder);
        tracing::debug!("converted local path '{norm}' to UNC path '{converted}'");
        PathBuf::from(converted)
    }

    /// Converts toward the representation the caller prefers.
    pub fn normalize(&self, path: &Path, prefer_unc: bool) -> PathBuf {
        if prefer_unc {
            self.to_unc(path)
        } else {
            self.to_local(path)
        }
    }

    /// Snapshot of the current UNC-prefix-to-drive mappings, display case.
    pub fn mappings(&self) -> HashMap<String, String> {
        self.forward
            .values()
            .map(|e| (e.unc_prefix.clone(), e.drive.clone()))
            .collect()
    }

    /// Snapshot of the current drive-to-UNC-prefix mappings, display case.
    pub fn reverse_mappings(&self) -> HashMap<String, String> {
        self.reverse
            .iter()
            .map(|(drive, e)| (drive.clone(), e.unc_prefix.clone()))
            .collect()
    }
}

/// Splits a UNC path into `(server, share, rest)`.
///
/// Structural parse only, no mapping lookup. Both slash styles are accepted;
/// `None` means the path is not UNC-shaped or misses a server or share
/// component. A bare share root parses with an empty `rest`.
pub fn parse_unc(path: &Path) -> Option<(String, String, String)> {
    let norm = backslashed(path);
    let body = norm.strip_prefix(r"\\")?;
    let mut parts = body.splitn(3, '\\');
    let server = parts.next().filter(|s| !s.is_empty())?;
    let share = parts.next().filter(|s| !s.is_empty())?;
    let rest = parts.next().unwrap_or("");
    Some((server.to_string(), share.to_string(), rest.to_string()))
}

/// Joins UNC components back into a canonical path. Inverse of
/// [`parse_unc`]; leading separators on `rest` are stripped first.
pub fn join_unc(server: &str, share: &str, rest: &str) -> String {
    let base = format!(r"\\{server}\{share}");
    let rest = rest.trim_start_matches(['\\', '/']);
    if rest.is_empty() {
        base
    } else {
        format!("{base}\\{rest}")
    }
}

pub(crate) fn backslashed(path: &Path) -> String {
    path.to_string_lossy().replace('/', "\\")
}

/// Leading drive designator (`X:`), upper-cased, if the string carries one.
pub(crate) fn drive_prefix(s: &str) -> Option<String> {
    let mut chars = s.chars();
    let letter = chars.next()?;
    (letter.is_ascii_alphabetic() && chars.next() == Some(':'))
        .then(|| format!("{}:", letter.to_ascii_uppercase()))
}

// Drive letters are folded to upper case; other targets (seen only with
// injected platforms) are kept verbatim apart from trailing separators.
fn canonical_drive(local: &str) -> String {
    let trimmed = local.trim_end_matches(['\\', '/']);
    match drive_prefix(trimmed) {
        Some(drive) if trimmed.len() == 2 => drive,
        _ => trimmed.to_string(),
    }
}

// Joins a path remainder onto a mapping target, following the target's own
// separator style.
fn join_onto(target: &str, remainder: &str) -> String {
    if remainder.is_empty() {
        return target.to_string();
    }
    if target.contains('/') {
        format!("{target}/{}", remainder.replace('\\', "/"))
    } else {
        format!("{target}\\{remainder}")
    }
}
