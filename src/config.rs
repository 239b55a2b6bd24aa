use std::path::PathBuf;

use crate::extension::ExtensionKind;

/// Configuration a process hosting a [`crate::Device`] supplies at construction time.
///
/// The core has no CLI or environment parsing of its own (the enclosing
/// process owns that); this struct is the seam such a process plugs values
/// into.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Path of the EEPROM backing file. Created if missing, zero-filled to
    /// at least [`crate::registers::EEPROM_SIZE`] bytes.
    pub eeprom_path: PathBuf,
    /// Extension reported as attached immediately after construction.
    pub default_extension: ExtensionKind,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            eeprom_path: PathBuf::from("eeprom.bin"),
            default_extension: ExtensionKind::Nunchuk,
        }
    }
}
