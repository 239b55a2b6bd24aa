//! Software emulator core for the Nintendo Wii Remote HID peripheral.
//!
//! [`Device`] decodes inbound host output reports, keeps the register
//! banks/EEPROM/extension state a real Wiimote would expose, and produces
//! outbound input reports from whatever input state the embedding process
//! feeds it. It has no transport of its own — reading bytes from a
//! Bluetooth HID socket (or a test harness) and writing the generated bytes
//! back out is left to the caller.

mod config;
mod device;
mod error;
mod extension;
mod generator;
mod processor;
mod queue;
mod registers;
mod state;
mod trace;

pub mod prelude {
    pub use crate::config::DeviceConfig;
    pub use crate::device::Device;
    pub use crate::error::{Result, WiimoteEmuError};
    pub use crate::extension::{ExtensionKind, WmpState};
    pub use crate::registers::{Bank, EEPROM_VIRTUAL_SIZE, REGISTER_BANK_SIZE};
    pub use crate::state::{
        ButtonData, ClassicButtons, ClassicState, IrObject, MotionPlusState, NunchukState,
        SystemState, UserState,
    };
}

pub use prelude::*;
