use std::io;
use std::sync::Arc;

/// Raw device class of a drive letter, as reported by the operating system.
///
/// This is the unrefined answer of the platform query. [`PathType`] is
/// derived from it by the classifier, which folds substituted drives out of
/// [`DeviceClass::Fixed`] and [`DeviceClass::Unknown`].
///
/// [`PathType`]: crate::PathType
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Unknown,
    NoRoot,
    Removable,
    Fixed,
    Remote,
    CdRom,
    RamDisk,
}

/// One active drive↔UNC association known to the operating system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveMapping {
    /// Local name, usually a drive letter such as `Z:`.
    pub local: String,
    /// Remote name, usually a UNC share such as `\\server\share`.
    pub remote: String,
}

/// Capability interface over the OS facilities the crate consumes.
///
/// The converter and classifier never branch on platform identity; they only
/// talk to this trait. Production code uses [`native()`], tests inject a
/// scriptable double.
///
/// Implementations must degrade rather than fail: a broken or missing OS
/// facility is reported as an empty list, `None`, `false` or
/// [`DeviceClass::Unknown`]. Only [`drive_mappings`] surfaces an error, so a
/// refresh can distinguish "no mappings" from "enumeration unavailable".
///
/// [`drive_mappings`]: PlatformPathServices::drive_mappings
pub trait PlatformPathServices: Send + Sync {
    /// Enumerates all active drive↔UNC associations.
    fn drive_mappings(&self) -> io::Result<Vec<DriveMapping>>;

    /// Raw device class of a drive letter.
    fn device_class(&self, drive: char) -> DeviceClass;

    /// Whether the drive letter is a filesystem substitution (`subst`).
    fn is_subst_drive(&self, drive: char) -> bool;

    /// Target directory of a substituted drive, if resolvable.
    fn subst_target(&self, drive: char) -> Option<String>;

    /// Live UNC target of a connected network drive, if resolvable.
    ///
    /// Per-drive fallback used when the mapping table has no entry for the
    /// drive.
    fn connection_target(&self, drive: char) -> Option<String>;
}

/// Trust classification for UNC server names.
///
/// On Windows this is backed by the Internet Settings security-zone
/// registry; the crate only ever reads the answer.
pub trait ZoneOracle: Send + Sync {
    fn is_trusted_server(&self, server: &str) -> bool;
}

cfg_if::cfg_if! {
    if #[cfg(any(target_os = "windows", docsrs))] {
        mod windows;
        pub use windows::{WindowsPlatform, WindowsZoneOracle};

        /// Platform services for the build target.
        pub fn native() -> Arc<dyn PlatformPathServices> {
            Arc::new(WindowsPlatform)
        }

        /// Zone oracle for the build target.
        pub fn native_zone_oracle() -> Arc<dyn ZoneOracle> {
            Arc::new(WindowsZoneOracle)
        }
    } else {
        mod stub;
        pub use stub::StubPlatform;

        /// Platform services for the build target.
        pub fn native() -> Arc<dyn PlatformPathServices> {
            Arc::new(StubPlatform)
        }

        /// Zone oracle for the build target.
        pub fn native_zone_oracle() -> Arc<dyn ZoneOracle> {
            Arc::new(StubPlatform)
        }
    }
}

#[cfg(test)]
pub(crate) mod mock;
