use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::PathType;
use crate::convert::{backslashed, drive_prefix};
use crate::platform::{DeviceClass, PlatformPathServices};

/// Whether a path is UNC-shaped (starts with two separators after slash
/// normalization). Empty input is not UNC.
pub fn is_unc_path(path: &Path) -> bool {
    backslashed(path).starts_with(r"\\")
}

pub(crate) fn drive_letter(s: &str) -> Option<char> {
    drive_prefix(s).and_then(|d| d.chars().next())
}

/// Classifies paths and drive letters, memoizing the answers.
///
/// Classification is cached per upper-cased drive letter and per normalized
/// path string, the subst predicate separately per drive. Entries have no
/// TTL and survive mapping refreshes; a drive whose real state changes keeps
/// its cached classification until [`clear_cache`] is called. That staleness
/// is deliberate, documented behavior.
///
/// [`clear_cache`]: PathClassifier::clear_cache
pub struct PathClassifier {
    platform: Arc<dyn PlatformPathServices>,
    types: Mutex<HashMap<String, PathType>>,
    substs: Mutex<HashMap<char, bool>>,
}

impl PathClassifier {
    pub fn new(platform: Arc<dyn PlatformPathServices>) -> Self {
        Self {
            platform,
            types: Mutex::new(HashMap::new()),
            substs: Mutex::new(HashMap::new()),
        }
    }

    /// Path type of a drive letter (`"C:"` or any path rooted at one).
    ///
    /// A fixed device that turns out to be a filesystem substitution is
    /// reported as [`PathType::Subst`]; so is an unknown/no-root device with
    /// a subst registration, since a subst to a dangling target loses its
    /// device class.
    pub fn drive_type(&self, drive: &str) -> PathType {
        let Some(letter) = drive_letter(drive) else {
            return PathType::Unknown;
        };
        let key = format!("{letter}:");
        if let Some(cached) = self.types.lock().unwrap().get(&key) {
            return *cached;
        }

        let kind = match self.platform.device_class(letter) {
            DeviceClass::Fixed => {
                if self.is_subst(letter) {
                    PathType::Subst
                } else {
                    PathType::Local
                }
            }
            DeviceClass::Remote => PathType::Network,
            DeviceClass::Removable => PathType::Removable,
            DeviceClass::CdRom => PathType::CdRom,
            DeviceClass::RamDisk => PathType::RamDisk,
            DeviceClass::Unknown | DeviceClass::NoRoot => {
                if self.is_subst(letter) {
                    PathType::Subst
                } else {
                    PathType::Unknown
                }
            }
        };

        self.types.lock().unwrap().insert(key, kind);
        kind
    }

    /// Path type of an arbitrary path string.
    ///
    /// UNC-shaped paths classify as [`PathType::Unc`] without any platform
    /// query; drive-rooted paths delegate to [`drive_type`]; everything else
    /// (including relative paths) is [`PathType::Unknown`].
    ///
    /// [`drive_type`]: PathClassifier::drive_type
    pub fn path_type(&self, path: &Path) -> PathType {
        let norm = backslashed(path);
        if let Some(cached) = self.types.lock().unwrap().get(&norm) {
            return *cached;
        }

        let kind = if norm.starts_with(r"\\") {
            PathType::Unc
        } else if drive_letter(&norm).is_some() {
            self.drive_type(&norm)
        } else {
            PathType::Unknown
        };

        self.types.lock().unwrap().insert(norm, kind);
        kind
    }

    /// Drops every cached classification and subst answer. Only affects
    /// subsequent lookups.
    pub fn clear_cache(&self) {
        self.types.lock().unwrap().clear();
        self.substs.lock().unwrap().clear();
        tracing::debug!("cleared path classification cache");
    }

    fn is_subst(&self, letter: char) -> bool {
        if let Some(cached) = self.substs.lock().unwrap().get(&letter) {
            return *cached;
        }
        let subst = self.platform.is_subst_drive(letter);
        self.substs.lock().unwrap().insert(letter, subst);
        subst
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockPlatform;

    fn classifier(platform: MockPlatform) -> (Arc<MockPlatform>, PathClassifier) {
        let platform = Arc::new(platform);
        let classifier = PathClassifier::new(Arc::clone(&platform) as Arc<dyn PlatformPathServices>);
        (platform, classifier)
    }

    #[test]
    fn unc_shapes_are_recognized_in_both_slash_styles() {
        assert!(is_unc_path(Path::new(r"\\server\share")));
        assert!(is_unc_path(Path::new("//server/share")));
        assert!(!is_unc_path(Path::new(r"C:\x")));
        assert!(!is_unc_path(Path::new("")));
    }

    #[test]
    fn device_classes_map_to_path_types() {
        let platform = MockPlatform::new();
        platform.set_class('C', DeviceClass::Fixed);
        platform.set_class('D', DeviceClass::Remote);
        platform.set_class('E', DeviceClass::Removable);
        platform.set_class('F', DeviceClass::CdRom);
        platform.set_class('G', DeviceClass::RamDisk);
        let (_, classifier) = classifier(platform);

        assert_eq!(classifier.drive_type("C:"), PathType::Local);
        assert_eq!(classifier.drive_type("D:"), PathType::Network);
        assert_eq!(classifier.drive_type("E:"), PathType::Removable);
        assert_eq!(classifier.drive_type("F:"), PathType::CdRom);
        assert_eq!(classifier.drive_type("G:"), PathType::RamDisk);
        assert_eq!(classifier.drive_type("H:"), PathType::Unknown);
    }

    #[test]
    fn fixed_drive_with_subst_registration_classifies_as_subst() {
        let platform = MockPlatform::new();
        platform.set_class('S', DeviceClass::Fixed);
        platform.set_subst('S', Some(r"C:\projects"));
        let (_, classifier) = classifier(platform);

        assert_eq!(classifier.drive_type("S:"), PathType::Subst);
    }

    #[test]
    fn dangling_subst_without_device_class_still_classifies_as_subst() {
        let platform = MockPlatform::new();
        platform.set_class('T', DeviceClass::NoRoot);
        platform.set_subst('T', None);
        let (_, classifier) = classifier(platform);

        assert_eq!(classifier.drive_type("T:"), PathType::Subst);
    }

    #[test]
    fn path_type_covers_unc_drive_and_relative_inputs() {
        let platform = MockPlatform::new();
        platform.set_class('C', DeviceClass::Fixed);
        let (_, classifier) = classifier(platform);

        assert_eq!(classifier.path_type(Path::new(r"\\server\share\x")), PathType::Unc);
        assert_eq!(classifier.path_type(Path::new(r"C:\Windows")), PathType::Local);
        assert_eq!(classifier.path_type(Path::new("relative/file.txt")), PathType::Unknown);
        assert_eq!(classifier.path_type(Path::new("")), PathType::Unknown);
    }

    #[test]
    fn classification_is_stable_until_cache_clear() {
        let platform = MockPlatform::new();
        platform.set_class('D', DeviceClass::Remote);
        let (platform, classifier) = classifier(platform);

        assert_eq!(classifier.drive_type("D:"), PathType::Network);

        // The drive disconnects; the cached answer must survive.
        platform.set_class('D', DeviceClass::Unknown);
        assert_eq!(classifier.drive_type("D:"), PathType::Network);

        classifier.clear_cache();
        assert_eq!(classifier.drive_type("D:"), PathType::Unknown);
    }

    #[test]
    fn drive_letter_case_shares_one_cache_entry() {
        let platform = MockPlatform::new();
        platform.set_class('C', DeviceClass::Fixed);
        let (platform, classifier) = classifier(platform);

        assert_eq!(classifier.drive_type("c:"), PathType::Local);
        platform.set_class('C', DeviceClass::Remote);
        assert_eq!(classifier.drive_type("C:"), PathType::Local);
    }
}
