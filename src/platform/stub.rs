use std::io;

use super::{DeviceClass, DriveMapping, PlatformPathServices, ZoneOracle};

/// No-op platform for targets without drive letters or network shares.
///
/// Every query degrades to its negative answer, so the conversion and
/// classification logic stays usable (as identity/`Unknown`) off Windows.
pub struct StubPlatform;

impl PlatformPathServices for StubPlatform {
    fn drive_mappings(&self) -> io::Result<Vec<DriveMapping>> {
        Ok(Vec::new())
    }

    fn device_class(&self, _drive: char) -> DeviceClass {
        DeviceClass::Unknown
    }

    fn is_subst_drive(&self, _drive: char) -> bool {
        false
    }

    fn subst_target(&self, _drive: char) -> Option<String> {
        None
    }

    fn connection_target(&self, _drive: char) -> Option<String> {
        None
    }
}

impl ZoneOracle for StubPlatform {
    fn is_trusted_server(&self, _server: &str) -> bool {
        false
    }
}
