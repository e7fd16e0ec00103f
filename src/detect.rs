use std::fmt;
use std::path::Path;

use crate::classify::drive_letter;
use crate::convert::{backslashed, parse_unc};
use crate::{PathContext, PathType};

/// Longest path Windows accepts without the verbatim escape prefix.
const MAX_UNPREFIXED_PATH: usize = 260;
const LONG_PATH_PREFIX: &str = r"\\?\";

/// A risk flagged for a path. Generated on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathIssue {
    /// Path length exceeds the unprefixed ceiling and the path does not
    /// carry the `\\?\` escape prefix.
    TooLong { length: usize },
    /// UNC-shaped path missing its server or share component.
    MalformedUnc,
    /// UNC server not recognized as trusted by the zone oracle.
    UntrustedServer { server: String },
    /// Network drive whose UNC target cannot be resolved.
    DanglingNetworkMapping { drive: String },
    /// Substituted drive whose target cannot be resolved.
    DanglingSubstTarget { drive: String },
    /// Substituted drive whose target resolves but does not exist.
    NonexistentSubstTarget { drive: String, target: String },
}

impl fmt::Display for PathIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathIssue::TooLong { length } => write!(
                f,
                "path exceeds the {MAX_UNPREFIXED_PATH} character limit ({length} characters)"
            ),
            PathIssue::MalformedUnc => {
                write!(f, "invalid UNC path: missing server or share name")
            }
            PathIssue::UntrustedServer { server } => {
                write!(f, "UNC server '{server}' is not in a trusted security zone")
            }
            PathIssue::DanglingNetworkMapping { drive } => {
                write!(f, "network drive {drive} has no detectable UNC target")
            }
            PathIssue::DanglingSubstTarget { drive } => {
                write!(f, "substituted drive {drive} has no detectable target")
            }
            PathIssue::NonexistentSubstTarget { drive, target } => {
                write!(f, "substituted drive {drive} points to non-existent target: {target}")
            }
        }
    }
}

impl PathContext {
    /// Flags potential problems with a path. Pure composition over the
    /// classifier, the mapping table and the zone oracle; returns an empty
    /// list when nothing is wrong.
    pub fn detect_issues(&self, path: &Path) -> Vec<PathIssue> {
        let norm = backslashed(path);
        let mut issues = Vec::new();

        let length = norm.chars().count();
        if length > MAX_UNPREFIXED_PATH && !norm.starts_with(LONG_PATH_PREFIX) {
            issues.push(PathIssue::TooLong { length });
        }

        match self.path_type(path) {
            PathType::Unc => match parse_unc(path) {
                Some((server, _, _)) => {
                    if !self.zones().is_trusted_server(&server) {
                        issues.push(PathIssue::UntrustedServer { server });
                    }
                }
                None => issues.push(PathIssue::MalformedUnc),
            },
            PathType::Network => {
                if let Some(drive) = drive_designator(&norm)
                    && self.network_target(&drive).is_none()
                {
                    issues.push(PathIssue::DanglingNetworkMapping { drive });
                }
            }
            PathType::Subst => {
                if let Some(drive) = drive_designator(&norm) {
                    match self.subst_target(&drive) {
                        None => issues.push(PathIssue::DanglingSubstTarget { drive }),
                        Some(target) if !Path::new(&target).exists() => {
                            issues.push(PathIssue::NonexistentSubstTarget { drive, target });
                        }
                        Some(_) => {}
                    }
                }
            }
            _ => {}
        }

        issues
    }

    /// UNC target of a network drive: the mapping table's reverse lookup
    /// first, then the platform's live connection query.
    pub fn network_target(&self, drive: &str) -> Option<String> {
        let letter = drive_letter(drive)?;
        let key = format!("{letter}:");
        if let Some(target) = self.converter().reverse_mappings().get(&key) {
            return Some(target.clone());
        }
        self.platform().connection_target(letter)
    }

    /// Filesystem target of a substituted drive, if resolvable.
    pub fn subst_target(&self, drive: &str) -> Option<String> {
        self.platform().subst_target(drive_letter(drive)?)
    }
}

fn drive_designator(norm: &str) -> Option<String> {
    drive_letter(norm).map(|letter| format!("{letter}:"))
}
