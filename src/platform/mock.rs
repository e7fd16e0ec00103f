//! Scriptable platform double for tests.

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::Mutex;

use super::{DeviceClass, DriveMapping, PlatformPathServices, ZoneOracle};

#[derive(Default)]
struct MockState {
    mappings: Vec<DriveMapping>,
    classes: HashMap<char, DeviceClass>,
    // key present = drive is substituted; `None` = target unresolvable
    substs: HashMap<char, Option<String>>,
    connections: HashMap<char, String>,
    trusted: HashSet<String>,
    fail_mappings: bool,
}

/// Test double whose answers can be reconfigured mid-test through a shared
/// handle, which is what the cache-staleness and refresh-failure tests need.
#[derive(Default)]
pub struct MockPlatform {
    state: Mutex<MockState>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map(&self, local: &str, remote: &str) {
        self.state.lock().unwrap().mappings.push(DriveMapping {
            local: local.to_string(),
            remote: remote.to_string(),
        });
    }

    pub fn clear_mappings(&self) {
        self.state.lock().unwrap().mappings.clear();
    }

    pub fn set_class(&self, drive: char, class: DeviceClass) {
        self.state
            .lock()
            .unwrap()
            .classes
            .insert(drive.to_ascii_uppercase(), class);
    }

    pub fn set_subst(&self, drive: char, target: Option<&str>) {
        self.state
            .lock()
            .unwrap()
            .substs
            .insert(drive.to_ascii_uppercase(), target.map(str::to_string));
    }

    pub fn set_connection(&self, drive: char, remote: &str) {
        self.state
            .lock()
            .unwrap()
            .connections
            .insert(drive.to_ascii_uppercase(), remote.to_string());
    }

    pub fn trust(&self, server: &str) {
        self.state.lock().unwrap().trusted.insert(server.to_string());
    }

    pub fn fail_mappings(&self, fail: bool) {
        self.state.lock().unwrap().fail_mappings = fail;
    }
}

impl PlatformPathServices for MockPlatform {
    fn drive_mappings(&self) -> io::Result<Vec<DriveMapping>> {
        let state = self.state.lock().unwrap();
        if state.fail_mappings {
            return Err(io::Error::other("mapping enumeration unavailable"));
        }
        Ok(state.mappings.clone())
    }

    fn device_class(&self, drive: char) -> DeviceClass {
        self.state
            .lock()
            .unwrap()
            .classes
            .get(&drive.to_ascii_uppercase())
            .copied()
            .unwrap_or(DeviceClass::Unknown)
    }

    fn is_subst_drive(&self, drive: char) -> bool {
        self.state
            .lock()
            .unwrap()
            .substs
            .contains_key(&drive.to_ascii_uppercase())
    }

    fn subst_target(&self, drive: char) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .substs
            .get(&drive.to_ascii_uppercase())
            .cloned()
            .flatten()
    }

    fn connection_target(&self, drive: char) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .connections
            .get(&drive.to_ascii_uppercase())
            .cloned()
    }
}

impl ZoneOracle for MockPlatform {
    fn is_trusted_server(&self, server: &str) -> bool {
        self.state.lock().unwrap().trusted.contains(server)
    }
}
