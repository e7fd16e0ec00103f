use std::io;

use windows::Win32::Foundation::ERROR_SUCCESS;
use windows::Win32::NetworkManagement::WNet::WNetGetConnectionW;
use windows::Win32::Storage::FileSystem::{GetDriveTypeW, GetLogicalDrives, QueryDosDeviceW};
use windows::Win32::System::Registry::{HKEY_CURRENT_USER, RRF_RT_REG_DWORD, RegGetValueW};
use windows::core::{PCWSTR, PWSTR};

use super::{DeviceClass, DriveMapping, PlatformPathServices, ZoneOracle};

/// Real Windows implementation of [`PlatformPathServices`].
pub struct WindowsPlatform;

/// Real Windows implementation of [`ZoneOracle`], backed by the
/// `Internet Settings\ZoneMap` registry hive of the current user.
pub struct WindowsZoneOracle;

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(Some(0)).collect()
}

fn from_wide(buf: &[u16]) -> String {
    let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..end])
}

impl PlatformPathServices for WindowsPlatform {
    fn drive_mappings(&self) -> io::Result<Vec<DriveMapping>> {
        let mask = unsafe { GetLogicalDrives() };
        if mask == 0 {
            return Err(io::Error::last_os_error());
        }

        let mut mappings = Vec::new();
        for i in 0..26u32 {
            if mask & (1 << i) == 0 {
                continue;
            }
            let letter = (b'A' + i as u8) as char;
            if self.device_class(letter) != DeviceClass::Remote {
                continue;
            }
            match self.connection_target(letter) {
                Some(remote) => mappings.push(DriveMapping {
                    local: format!("{letter}:"),
                    remote,
                }),
                None => {
                    tracing::debug!(drive = %letter, "remote drive has no resolvable UNC target");
                }
            }
        }
        Ok(mappings)
    }

    fn device_class(&self, drive: char) -> DeviceClass {
        let root = wide(&format!("{drive}:\\"));
        let class = unsafe { GetDriveTypeW(PCWSTR(root.as_ptr())) };
        match class {
            1 => DeviceClass::NoRoot,
            2 => DeviceClass::Removable,
            3 => DeviceClass::Fixed,
            4 => DeviceClass::Remote,
            5 => DeviceClass::CdRom,
            6 => DeviceClass::RamDisk,
            _ => DeviceClass::Unknown,
        }
    }

    fn is_subst_drive(&self, drive: char) -> bool {
        self.subst_target(drive).is_some()
    }

    fn subst_target(&self, drive: char) -> Option<String> {
        let device = wide(&format!("{drive}:"));
        let mut buf = vec![0u16; 1024];
        let stored = unsafe { QueryDosDeviceW(PCWSTR(device.as_ptr()), Some(&mut buf)) };
        if stored == 0 {
            tracing::warn!(drive = %drive, "QueryDosDeviceW failed: {}", io::Error::last_os_error());
            return None;
        }
        // Substituted drives resolve to `\??\<target>`; real volumes resolve
        // to a `\Device\...` object name.
        from_wide(&buf)
            .strip_prefix(r"\??\")
            .map(str::to_string)
    }

    fn connection_target(&self, drive: char) -> Option<String> {
        let local = wide(&format!("{drive}:"));
        let mut buf = [0u16; 1024];
        let mut len = buf.len() as u32;
        let status =
            unsafe { WNetGetConnectionW(PCWSTR(local.as_ptr()), PWSTR(buf.as_mut_ptr()), &mut len) };
        if status != 0 {
            tracing::debug!(drive = %drive, status, "WNetGetConnectionW returned no target");
            return None;
        }
        let remote = from_wide(&buf);
        (!remote.is_empty()).then_some(remote)
    }
}

impl WindowsZoneOracle {
    /// Reads a DWORD zone assignment under `ZoneMap\Domains\<server>`.
    fn zone_value(server: &str, value: &str) -> Option<u32> {
        let subkey = wide(&format!(
            r"Software\Microsoft\Windows\CurrentVersion\Internet Settings\ZoneMap\Domains\{server}"
        ));
        let value_name = wide(value);
        let mut data: u32 = 0;
        let mut size = std::mem::size_of::<u32>() as u32;
        let status = unsafe {
            RegGetValueW(
                HKEY_CURRENT_USER,
                PCWSTR(subkey.as_ptr()),
                PCWSTR(value_name.as_ptr()),
                RRF_RT_REG_DWORD,
                None,
                Some(&mut data as *mut u32 as *mut core::ffi::c_void),
                Some(&mut size),
            )
        };
        (status == ERROR_SUCCESS).then_some(data)
    }
}

impl ZoneOracle for WindowsZoneOracle {
    fn is_trusted_server(&self, server: &str) -> bool {
        // Zone 1 is Local Intranet. The wildcard scheme entry takes
        // precedence over the `file` scheme entry.
        match Self::zone_value(server, "*") {
            Some(zone) => zone == 1,
            None => Self::zone_value(server, "file") == Some(1),
        }
    }
}
