use std::path::PathBuf;

/// Errors that can occur while constructing or driving a [`crate::Device`].
///
/// `process` and `generate` themselves never return this type: per the
/// emulated Wiimote's contract, a failed memory access produces an error
/// report on the wire, not a Rust-level error. This type is reserved for
/// failures that happen outside of that contract, such as the EEPROM
/// backing file not being creatable at all.
#[derive(Debug, thiserror::Error)]
pub enum WiimoteEmuError {
    #[error("failed to open eeprom backing file {}: {source}", path.display())]
    EepromOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, WiimoteEmuError>;
