//! Debug-trace formatting.
//!
//! Every inbound/outbound report, plus register writes and extension
//! transitions, goes through `log` so the embedding process decides whether
//! (and where) it ends up: a terminal, a file, or nowhere in a release
//! build.

pub(crate) fn trace_inbound(bytes: &[u8]) {
    if log::log_enabled!(log::Level::Trace) {
        log::trace!("wii -> core: {}", format_bytes(bytes));
    }
}

pub(crate) fn trace_outbound(bytes: &[u8]) {
    if log::log_enabled!(log::Level::Trace) {
        log::trace!("core -> wii: {}", format_bytes(bytes));
    }
}

pub(crate) fn trace_register_write(bank: u8, offset: u8, size: u8) {
    log::debug!("write register bank {bank:#04x} offset {offset:#04x} size {size}");
}

pub(crate) fn trace_extension_transition(from: &str, to: &str) {
    log::debug!("extension/motionplus transition: {from} -> {to}");
}

fn format_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
