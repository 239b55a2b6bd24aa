//! The four 256-byte register banks and the EEPROM backing file.
//!
//! Plain structs with narrow, well-documented accessors, holding
//! device-managed state rather than something read once off real hardware.

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{Result, WiimoteEmuError};

/// Size of one register bank (speaker, extension, `MotionPlus`, IR camera).
pub const REGISTER_BANK_SIZE: usize = 256;

/// Virtual EEPROM addresses span `0x0000..=0x16FF`; the backing file carries
/// an extra `0x70`-byte header before virtual address 0.
pub const EEPROM_VIRTUAL_SIZE: u64 = 0x1700;
pub const EEPROM_FILE_OFFSET: u64 = 0x70;
pub const EEPROM_SIZE: u64 = EEPROM_VIRTUAL_SIZE + EEPROM_FILE_OFFSET;

/// Identifies a register bank by the upper byte of its 24-bit address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bank {
    /// `0xa2` — speaker.
    Speaker,
    /// `0xa4` — extension controller.
    Extension,
    /// `0xa6` — `MotionPlus` / extension identity while active.
    MotionPlus,
    /// `0xb0` — IR camera.
    IrCamera,
}

impl Bank {
    /// Selects a bank from the *upper* 8 bits of a 24-bit offset, ignoring
    /// the low bit, matching the real Wiimote's register addressing.
    #[must_use]
    pub fn from_offset(offset: u32) -> Option<Self> {
        match (offset >> 16) & 0xfe {
            0xa2 => Some(Self::Speaker),
            0xa4 => Some(Self::Extension),
            0xa6 => Some(Self::MotionPlus),
            0xb0 => Some(Self::IrCamera),
            _ => None,
        }
    }
}

/// The four device register pages, held as plain fields of
/// [`crate::Device`] rather than process globals — a process can host more
/// than one emulated Wiimote at a time.
#[derive(Debug, Clone)]
pub struct RegisterBanks {
    pub a2: [u8; REGISTER_BANK_SIZE],
    pub a4: [u8; REGISTER_BANK_SIZE],
    pub a6: [u8; REGISTER_BANK_SIZE],
    pub b0: [u8; REGISTER_BANK_SIZE],
}

impl Default for RegisterBanks {
    fn default() -> Self {
        Self {
            a2: [0; REGISTER_BANK_SIZE],
            a4: [0; REGISTER_BANK_SIZE],
            a6: [0; REGISTER_BANK_SIZE],
            b0: [0; REGISTER_BANK_SIZE],
        }
    }
}

impl RegisterBanks {
    #[must_use]
    pub fn bank(&self, bank: Bank) -> &[u8; REGISTER_BANK_SIZE] {
        match bank {
            Bank::Speaker => &self.a2,
            Bank::Extension => &self.a4,
            Bank::MotionPlus => &self.a6,
            Bank::IrCamera => &self.b0,
        }
    }

    pub fn bank_mut(&mut self, bank: Bank) -> &mut [u8; REGISTER_BANK_SIZE] {
        match bank {
            Bank::Speaker => &mut self.a2,
            Bank::Extension => &mut self.a4,
            Bank::MotionPlus => &mut self.a6,
            Bank::IrCamera => &mut self.b0,
        }
    }
}

/// A file-backed EEPROM image. Opened per access rather than held open, per
/// the single-threaded, no-suspension-point scheduling model this core
/// assumes.
#[derive(Debug, Clone)]
pub struct Eeprom {
    path: std::path::PathBuf,
}

impl Eeprom {
    /// Opens (creating and zero-filling if necessary) the EEPROM backing
    /// file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .map_err(|source| WiimoteEmuError::EepromOpen {
                path: path.clone(),
                source,
            })?;

        let len = file
            .metadata()
            .map_err(|source| WiimoteEmuError::EepromOpen {
                path: path.clone(),
                source,
            })?
            .len();
        if len < EEPROM_SIZE {
            file.set_len(EEPROM_SIZE)
                .map_err(|source| WiimoteEmuError::EepromOpen {
                    path: path.clone(),
                    source,
                })?;
        }

        Ok(Self { path })
    }

    /// Reads `size` bytes starting at virtual address `offset`. Returns
    /// `None` (logged) if the file can no longer be opened or read — this is
    /// the "EEPROM file missing or unreadable" error kind from the error
    /// handling design: no reply is produced, nothing panics.
    #[must_use]
    pub fn read(&self, offset: u32, size: usize) -> Option<Vec<u8>> {
        let mut file = match OpenOptions::new().read(true).open(&self.path) {
            Ok(file) => file,
            Err(err) => {
                log::warn!("eeprom read: unable to open {}: {err}", self.path.display());
                return None;
            }
        };
        if file
            .seek(SeekFrom::Start(u64::from(offset) + EEPROM_FILE_OFFSET))
            .is_err()
        {
            log::warn!("eeprom read: seek failed");
            return None;
        }
        let mut buffer = vec![0u8; size];
        if let Err(err) = file.read_exact(&mut buffer) {
            log::warn!("eeprom read: short read: {err}");
            return None;
        }
        Some(buffer)
    }

    /// Writes `data` starting at virtual address `offset`.
    #[must_use]
    pub fn write(&self, offset: u32, data: &[u8]) -> bool {
        let mut file = match OpenOptions::new().write(true).open(&self.path) {
            Ok(file) => file,
            Err(err) => {
                log::warn!("eeprom write: unable to open {}: {err}", self.path.display());
                return false;
            }
        };
        if file
            .seek(SeekFrom::Start(u64::from(offset) + EEPROM_FILE_OFFSET))
            .is_err()
        {
            log::warn!("eeprom write: seek failed");
            return false;
        }
        if let Err(err) = file.write_all(data) {
            log::warn!("eeprom write: short write: {err}");
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("wiimote-emu-test-registers-{name}-{}.bin", std::process::id()))
    }

    #[test]
    fn bank_selection_ignores_low_bit() {
        assert_eq!(Bank::from_offset(0xa3_0000), Some(Bank::Speaker));
        assert_eq!(Bank::from_offset(0xa4_00fa), Some(Bank::Extension));
        assert_eq!(Bank::from_offset(0xa6_00fe), Some(Bank::MotionPlus));
        assert_eq!(Bank::from_offset(0xb0_0000), Some(Bank::IrCamera));
        assert_eq!(Bank::from_offset(0x12_3456), None);
    }

    #[test]
    fn eeprom_round_trip() {
        let path = temp_path("round-trip");
        let eeprom = Eeprom::open(&path).unwrap();

        let data: Vec<u8> = (0..32).collect();
        assert!(eeprom.write(0x10, &data));
        let read_back = eeprom.read(0x10, data.len()).unwrap();
        assert_eq!(read_back, data);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn eeprom_created_with_minimum_size() {
        let path = temp_path("sizing");
        let _eeprom = Eeprom::open(&path).unwrap();
        let len = std::fs::metadata(&path).unwrap().len();
        assert!(len >= EEPROM_SIZE);
        std::fs::remove_file(&path).ok();
    }
}
