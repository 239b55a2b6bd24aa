use crate::config::DeviceConfig;
use crate::error::Result;
use crate::extension::{self, WmpState};
use crate::generator;
use crate::processor;
use crate::registers::{Eeprom, RegisterBanks};
use crate::state::{SystemState, UserState};

/// A software-emulated Wii remote.
///
/// Owns the register banks, EEPROM handle and response queue the real
/// device keeps; an embedding process drives it by feeding it inbound host
/// reports with [`Device::process`] and pulling outbound reports with
/// [`Device::generate`], mutating [`Device::usr_mut`] in between to reflect
/// whatever input it wants to emulate.
pub struct Device {
    sys: SystemState,
    usr: UserState,
    banks: RegisterBanks,
    eeprom: Eeprom,
}

impl Device {
    /// Builds a device with the given configuration, opening (and creating
    /// if necessary) its EEPROM backing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the EEPROM backing file cannot be opened.
    pub fn new(config: DeviceConfig) -> Result<Self> {
        let eeprom = Eeprom::open(&config.eeprom_path)?;
        let mut banks = RegisterBanks::default();

        let mut sys = SystemState::default();
        sys.extension = config.default_extension;
        sys.extension_connected = config.default_extension != crate::extension::ExtensionKind::None;
        sys.extension_report_type =
            extension::init_extension(&mut banks, sys.wmp_state, sys.extension, sys.extension_report_type);

        if sys.extension != crate::extension::ExtensionKind::None {
            processor::push_status(&mut sys);
        }

        Ok(Self {
            sys,
            usr: UserState::default(),
            banks,
            eeprom,
        })
    }

    /// Builds a device with the default configuration. Only fails if the
    /// default EEPROM backing file cannot be created in the current
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the EEPROM backing file cannot be opened.
    pub fn with_defaults() -> Result<Self> {
        Self::new(DeviceConfig::default())
    }

    /// Decodes and applies one inbound host report. `report` must start
    /// with the `0xa2` transport marker byte.
    pub fn process(&mut self, report: &[u8]) {
        processor::process(&mut self.sys, &mut self.banks, &self.eeprom, report);
    }

    /// Produces the next outbound report, if any is due this tick.
    #[must_use]
    pub fn generate(&mut self) -> Option<Vec<u8>> {
        generator::generate(&mut self.sys, &self.usr)
    }

    /// Read-only view of device-managed state.
    #[must_use]
    pub fn sys(&self) -> &SystemState {
        &self.sys
    }

    /// Read-only view of the externally supplied input state.
    #[must_use]
    pub fn usr(&self) -> &UserState {
        &self.usr
    }

    /// Mutable access to the externally supplied input state. Callers that
    /// change anything here should also set [`SystemState::report_changed`]
    /// via [`Device::mark_input_changed`] so a report gets sent even while
    /// continuous reporting is off.
    #[must_use]
    pub fn usr_mut(&mut self) -> &mut UserState {
        &mut self.usr
    }

    /// Marks that `usr` has changed, so the next [`Device::generate`] call
    /// emits a report even if continuous reporting is disabled.
    pub fn mark_input_changed(&mut self) {
        self.sys.report_changed = true;
    }

    /// Whether `MotionPlus` passthrough is currently active.
    #[must_use]
    pub fn motion_plus_active(&self) -> bool {
        self.sys.wmp_state == WmpState::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::ExtensionKind;

    fn temp_config(name: &str) -> DeviceConfig {
        DeviceConfig {
            eeprom_path: std::env::temp_dir()
                .join(format!("wiimote-emu-test-device-{name}-{}.bin", std::process::id())),
            default_extension: ExtensionKind::Nunchuk,
        }
    }

    #[test]
    fn construction_enqueues_initial_status_report() {
        let mut device = Device::new(temp_config("construct")).unwrap();
        let report = device.generate().unwrap();
        assert_eq!(report[1], 0x20);
    }

    #[test]
    fn status_request_round_trips() {
        let mut device = Device::new(temp_config("status")).unwrap();
        // Drain the construction-time status report first.
        device.generate();

        device.process(&[0xa2, 0x15]);
        let report = device.generate().unwrap();
        assert_eq!(report[1], 0x20);
    }

    #[test]
    fn generate_is_idle_without_continuous_reporting() {
        let mut device = Device::new(temp_config("idle")).unwrap();
        device.generate();
        assert!(device.generate().is_none());
    }
}
