//! Conversion and inspection of UNC network paths and drive-letter paths.
//!
//! The crate maps between `\\server\share` UNC paths and mapped drive
//! letters, classifies what kind of volume a path lives on, flags common
//! path risks, and offers file operations that retry once under the
//! alternate path representation when the verbatim one is refused.
//!
//! All OS access goes through the [`platform::PlatformPathServices`] and
//! [`platform::ZoneOracle`] capability traits. [`PathContext::native()`]
//! wires the real platform; tests and non-Windows callers can inject their
//! own.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

pub mod platform;

mod classify;
mod convert;
mod detect;
mod ops;

pub use classify::{PathClassifier, is_unc_path};
pub use convert::{MappingEntry, UncConverter, join_unc, parse_unc};
pub use detect::PathIssue;

use platform::{PlatformPathServices, ZoneOracle};

#[derive(Debug, Error)]
pub enum UncPathError {
    #[error("failed to open '{path}'")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to copy '{src}' to '{dst}'")]
    Copy {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid path '{0}'")]
    InvalidPath(String),
}

impl UncPathError {
    pub(crate) fn open(path: &Path, source: io::Error) -> Self {
        Self::Open {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn copy(src: &Path, dst: &Path, source: io::Error) -> Self {
        Self::Copy {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
            source,
        }
    }
}

/// What kind of volume a path lives on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PathType {
    /// UNC-shaped path (`\\server\share\...`).
    Unc,
    /// Drive letter connected to a network share.
    Network,
    /// Drive letter substituted for a local directory (`subst`).
    Subst,
    /// Local fixed drive.
    Local,
    Removable,
    CdRom,
    RamDisk,
    #[default]
    Unknown,
}

impl PathType {
    pub fn is_unc(&self) -> bool {
        matches!(self, PathType::Unc)
    }
    pub fn is_network(&self) -> bool {
        matches!(self, PathType::Network)
    }
    pub fn is_subst(&self) -> bool {
        matches!(self, PathType::Subst)
    }
    pub fn is_local(&self) -> bool {
        matches!(self, PathType::Local)
    }
    pub fn is_removable(&self) -> bool {
        matches!(self, PathType::Removable)
    }
    pub fn is_cdrom(&self) -> bool {
        matches!(self, PathType::CdRom)
    }
    pub fn is_ramdisk(&self) -> bool {
        matches!(self, PathType::RamDisk)
    }
}

impl std::fmt::Display for PathType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PathType::Unc => "unc",
            PathType::Network => "network",
            PathType::Subst => "subst",
            PathType::Local => "local",
            PathType::Removable => "removable",
            PathType::CdRom => "cdrom",
            PathType::RamDisk => "ramdisk",
            PathType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Caller-owned entry point bundling the converter, the classifier and the
/// platform collaborators.
///
/// Construct one per application (or per test) and pass it around; there is
/// no process-wide instance. Mapping refresh takes `&mut self` and swaps the
/// snapshot atomically; everything else is a shared-borrow operation.
pub struct PathContext {
    platform: Arc<dyn PlatformPathServices>,
    zones: Arc<dyn ZoneOracle>,
    converter: UncConverter,
    classifier: PathClassifier,
}

impl PathContext {
    /// Builds a context on explicit collaborators and loads the initial
    /// mapping snapshot.
    pub fn new(platform: Arc<dyn PlatformPathServices>, zones: Arc<dyn ZoneOracle>) -> Self {
        let converter = UncConverter::new(Arc::clone(&platform));
        let classifier = PathClassifier::new(Arc::clone(&platform));
        Self {
            platform,
            zones,
            converter,
            classifier,
        }
    }

    /// Builds a context on the platform services of the build target.
    pub fn native() -> Self {
        Self::new(platform::native(), platform::native_zone_oracle())
    }

    pub fn converter(&self) -> &UncConverter {
        &self.converter
    }

    pub fn classifier(&self) -> &PathClassifier {
        &self.classifier
    }

    /// Rebuilds the mapping snapshot from the platform. See
    /// [`UncConverter::refresh`] for the failure contract.
    ///
    /// Deliberately does not clear the classification cache; call
    /// [`clear_cache`](Self::clear_cache) as well if drives may have changed
    /// class.
    pub fn refresh_mappings(&mut self) -> HashMap<String, String> {
        self.converter.refresh()
    }

    pub fn mappings(&self) -> HashMap<String, String> {
        self.converter.mappings()
    }

    pub fn convert_to_local(&self, path: &Path) -> PathBuf {
        self.converter.to_local(path)
    }

    pub fn convert_to_unc(&self, path: &Path) -> PathBuf {
        self.converter.to_unc(path)
    }

    pub fn normalize(&self, path: &Path, prefer_unc: bool) -> PathBuf {
        self.converter.normalize(path, prefer_unc)
    }

    pub fn path_type(&self, path: &Path) -> PathType {
        self.classifier.path_type(path)
    }

    pub fn drive_type(&self, drive: &str) -> PathType {
        self.classifier.drive_type(drive)
    }

    pub fn clear_cache(&self) {
        self.classifier.clear_cache()
    }

    pub(crate) fn platform(&self) -> &dyn PlatformPathServices {
        self.platform.as_ref()
    }

    pub(crate) fn zones(&self) -> &dyn ZoneOracle {
        self.zones.as_ref()
    }
}
