//! The `sys`/`usr` state partition: everything the device itself manages
//! versus everything an input provider supplies from outside.
//!
//! Nothing the host writes (via the report processor) may reach `usr`
//! fields, and nothing the input provider writes may reach `sys` fields —
//! the two halves are kept as separate structs so that invariant is
//! enforced by the type system rather than by convention.

use bitflags::bitflags;

use crate::extension::{ExtensionKind, WmpState};
use crate::queue::ResponseQueue;

bitflags! {
    /// Core button bits, shared by every data-reporting mode and by the
    /// button sub-block of status/acknowledgement/memory-response reports.
    ///
    /// WiiBrew Documentation: https://www.wiibrew.org/wiki/Wiimote#Core_Buttons
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ButtonData: u16 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const DOWN = 1 << 2;
        const UP = 1 << 3;
        const PLUS = 1 << 4;

        const TWO = 1 << 8;
        const ONE = 1 << 9;
        const B = 1 << 10;
        const A = 1 << 11;
        const MINUS = 1 << 12;

        const HOME = 1 << 15;
    }
}

bitflags! {
    /// Classic Controller button bits (wire-level meaning is active-low;
    /// this bitmask represents the logical "pressed" state, inverted by the
    /// generator when packed onto the wire).
    ///
    /// WiiBrew Documentation: https://www.wiibrew.org/wiki/Wiimote/Extension_Controllers/Classic_Controller
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ClassicButtons: u16 {
        const RIGHT = 1 << 0;
        const DOWN = 1 << 1;
        const LEFT = 1 << 2;
        const UP = 1 << 3;
        const ZR = 1 << 4;
        const X = 1 << 5;
        const A = 1 << 6;
        const Y = 1 << 7;
        const B = 1 << 8;
        const ZL = 1 << 9;
        const R = 1 << 12;
        const PLUS = 1 << 13;
        const HOME = 1 << 14;
        const MINUS = 1 << 15;
        const L = 1 << 10;
    }
}

/// One IR camera blob slot. `None` formats as the sentinel "no object"
/// pattern (`0xff` fill) rather than as a set of magic byte values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrObject {
    /// 10-bit X position.
    pub x: u16,
    /// 10-bit Y position.
    pub y: u16,
    /// 4-bit blob size (only meaningful in the extended/`ir12` format).
    pub size: u8,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NunchukState {
    pub stick_x: u8,
    pub stick_y: u8,
    pub accel_x: u16,
    pub accel_y: u16,
    pub accel_z: u16,
    pub c_pressed: bool,
    pub z_pressed: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicState {
    pub left_stick_x: u8,
    pub left_stick_y: u8,
    pub right_stick_x: u8,
    pub right_stick_y: u8,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub buttons: ClassicButtons,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MotionPlusState {
    pub yaw: u16,
    pub roll: u16,
    pub pitch: u16,
    pub yaw_slow: bool,
    pub roll_slow: bool,
    pub pitch_slow: bool,
}

/// Externally supplied input: button presses, accelerometer samples, IR
/// blob positions, and extension data. Populated by the input provider
/// between calls to [`crate::Device::process`] / [`crate::Device::generate`].
#[derive(Debug, Clone, Copy)]
pub struct UserState {
    pub buttons: ButtonData,
    /// 10-bit accelerometer readings. The nominal (8-bit) reading occupies
    /// the top 8 bits; the bottom 2 bits are the sub-LSB precision that
    /// gets packed into the button bytes on the wire.
    pub accel_x: u16,
    pub accel_y: u16,
    pub accel_z: u16,
    pub ir: [Option<IrObject>; 4],
    pub nunchuk: NunchukState,
    pub classic: ClassicState,
    pub motion_plus: MotionPlusState,
}

impl Default for UserState {
    fn default() -> Self {
        Self {
            buttons: ButtonData::empty(),
            // Flat, resting tilt reading.
            accel_x: 0x80 << 2,
            accel_y: 0x80 << 2,
            accel_z: 0x97 << 2,
            ir: [None; 4],
            nunchuk: NunchukState {
                stick_x: 128,
                stick_y: 128,
                accel_x: 512,
                accel_y: 512,
                accel_z: 760,
                c_pressed: false,
                z_pressed: false,
            },
            classic: ClassicState {
                left_stick_x: 32,
                left_stick_y: 32,
                right_stick_x: 15,
                right_stick_y: 15,
                ..ClassicState::default()
            },
            motion_plus: MotionPlusState {
                yaw: 0x1F7F,
                roll: 0x1F7F,
                pitch: 0x1F7F,
                yaw_slow: true,
                roll_slow: true,
                pitch_slow: true,
            },
        }
    }
}

/// Device-managed state. Mutated by the report processor and by the
/// extension/`MotionPlus` state machine; read by the report generator.
#[derive(Debug, Clone)]
pub struct SystemState {
    pub rumble: bool,
    /// Player indicator LEDs 1-4.
    pub led: [bool; 4],
    pub reporting_mode: u8,
    pub reporting_continuous: bool,
    /// Set by the input provider when `usr` changes; cleared by the
    /// generator after a regular (non-queued) report is emitted.
    pub report_changed: bool,
    pub ircam_enabled: bool,
    pub speaker_enabled: bool,
    pub battery_level: u8,
    pub extension: ExtensionKind,
    pub extension_connected: bool,
    pub extension_encrypted: bool,
    pub extension_report_type: u8,
    pub wmp_state: WmpState,
    /// Probe counter used by the `MotionPlus`-active register redirect,
    /// scoped per device.
    pub tries: u8,
    /// Drives which half of an interleaved (`0x3e`/`0x3f`) report is next.
    pub interleave_toggle: bool,
    /// Drives `MotionPlus` passthrough alternation between own-data and
    /// relayed-extension-data frames.
    pub passthrough_toggle: bool,
    pub queue: ResponseQueue,
}

impl Default for SystemState {
    fn default() -> Self {
        Self {
            rumble: false,
            led: [false; 4],
            reporting_mode: 0x30,
            reporting_continuous: false,
            report_changed: false,
            ircam_enabled: false,
            speaker_enabled: false,
            battery_level: 0xff,
            extension: ExtensionKind::None,
            extension_connected: false,
            extension_encrypted: false,
            extension_report_type: 0,
            wmp_state: WmpState::Inactive,
            tries: 0,
            interleave_toggle: false,
            passthrough_toggle: false,
            queue: ResponseQueue::new(),
        }
    }
}
