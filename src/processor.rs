//! Decodes inbound (host -> device) HID output reports and applies their
//! effects to device-managed state.
//!
//! Every output report carries the rumble bit in byte 0 regardless of its
//! type, so that assignment happens once up front; the dispatch below only
//! has to deal with each report's type-specific payload.

use crate::extension::{self, WmpState};
use crate::registers::{Bank, Eeprom, RegisterBanks, EEPROM_VIRTUAL_SIZE};
use crate::state::SystemState;
use crate::trace;

/// Inbound transport marker byte.
const REPORT_MARKER_IN: u8 = 0xa2;

pub fn process(sys: &mut SystemState, banks: &mut RegisterBanks, eeprom: &Eeprom, report: &[u8]) {
    trace::trace_inbound(report);

    if report.len() < 2 || report[0] != REPORT_MARKER_IN {
        log::warn!("dropping malformed inbound report: {report:?}");
        return;
    }
    let report_type = report[1];
    let payload = &report[2..];

    sys.rumble = payload.first().copied().unwrap_or(0) & 0x01 != 0;

    match report_type {
        0x10 => {}
        0x11 => {
            let flags = payload.first().copied().unwrap_or(0);
            sys.led = [
                flags & 0x10 != 0,
                flags & 0x20 != 0,
                flags & 0x40 != 0,
                flags & 0x80 != 0,
            ];
            push_ack(sys, report_type, 0x00);
        }
        0x12 => {
            let flags = payload.first().copied().unwrap_or(0);
            sys.reporting_continuous = flags & 0x04 != 0;
            sys.reporting_mode = payload.get(1).copied().unwrap_or(0);
            push_ack(sys, report_type, 0x00);
        }
        0x13 | 0x1a => {
            sys.ircam_enabled = payload.first().copied().unwrap_or(0) & 0x04 != 0;
            push_ack(sys, report_type, 0x00);
        }
        0x14 => {
            sys.speaker_enabled = payload.first().copied().unwrap_or(0) & 0x04 != 0;
            push_ack(sys, report_type, 0x00);
        }
        0x19 => {
            sys.speaker_enabled = payload.first().copied().unwrap_or(0) & 0x04 == 0;
            push_ack(sys, report_type, 0x00);
        }
        0x15 => push_status(sys),
        0x16 => handle_write(sys, banks, eeprom, payload),
        0x17 => handle_read(sys, banks, eeprom, payload),
        0x18 => {}
        other => log::debug!("unhandled output report type {other:#04x}"),
    }
}

fn parse_offset_size(payload: &[u8]) -> Option<(bool, u32, u8)> {
    if payload.len() < 5 {
        return None;
    }
    let source_register = payload[0] & 0x04 != 0;
    let offset = u32::from_be_bytes([0, payload[1], payload[2], payload[3]]);
    Some((source_register, offset, payload[4]))
}

fn handle_write(sys: &mut SystemState, banks: &mut RegisterBanks, eeprom: &Eeprom, payload: &[u8]) {
    let Some((source_register, offset, size)) = parse_offset_size(payload) else {
        return;
    };
    let data = payload.get(5..).unwrap_or(&[]);
    let data = &data[..(size as usize).min(data.len())];

    if !source_register {
        write_eeprom(sys, eeprom, offset, size, data);
        return;
    }

    let Some(bank) = Bank::from_offset(offset) else {
        return;
    };
    let page_offset = (offset & 0xff) as usize;

    if bank == Bank::Extension {
        if sys.wmp_state == WmpState::Active {
            write_page(banks.bank_mut(Bank::MotionPlus), page_offset, data);
        } else {
            write_page(banks.bank_mut(Bank::Extension), page_offset, data);
        }

        if page_offset == 0xf0 && data.first() == Some(&0x55) && sys.wmp_state == WmpState::Active {
            trace::trace_extension_transition(sys.wmp_state.label(), "passthrough-deactivated");
            sys.wmp_state = WmpState::PassthroughDeactivated;
            sys.extension_report_type = extension::init_extension(banks, sys.wmp_state, sys.extension, sys.extension_report_type);
            push_ack(sys, 0x16, 0x00);
            sys.extension_connected = false;
            push_status(sys);
            sys.extension_connected = true;
            push_status(sys);
            return;
        }
        if page_offset == 0xfe && data.first() == Some(&0x00) && sys.wmp_state == WmpState::Active {
            trace::trace_extension_transition(sys.wmp_state.label(), "inactive");
            sys.wmp_state = WmpState::Inactive;
            sys.extension_report_type = extension::init_extension(banks, sys.wmp_state, sys.extension, sys.extension_report_type);
            push_ack(sys, 0x16, 0x00);
            sys.extension_connected = false;
            push_status(sys);
            sys.extension_connected = true;
            push_status(sys);
            return;
        }
        if page_offset == 0x4c {
            sys.extension_encrypted = true;
        }
        if page_offset == 0xf1 {
            let a6 = banks.bank_mut(Bank::MotionPlus);
            a6[0xf7] = 0x1a;
            a6[0x50..0x90].copy_from_slice(&extension::CALIBRATION_BLOCK_F1);
        }
    } else if bank == Bank::MotionPlus {
        write_page(banks.bank_mut(Bank::MotionPlus), page_offset, data);
        if page_offset == 0xfe && data.first().map(|b| (b >> 2) & 1 != 0).unwrap_or(false) {
            trace::trace_extension_transition(sys.wmp_state.label(), "active");
            sys.wmp_state = WmpState::Active;
            sys.extension_report_type = data[0] & 0x07;
            sys.extension_report_type = extension::init_extension(banks, sys.wmp_state, sys.extension, sys.extension_report_type);
            push_ack(sys, 0x16, 0x00);
            sys.extension_connected = false;
            push_status(sys);
            sys.extension_connected = true;
            push_status(sys);
            return;
        }
    } else {
        write_page(banks.bank_mut(bank), page_offset, data);
    }

    trace::trace_register_write(bank_byte(bank), page_offset as u8, size);
    push_ack(sys, 0x16, 0x00);
}

fn write_page(page: &mut [u8; 256], offset: usize, data: &[u8]) {
    let end = (offset + data.len()).min(page.len());
    if offset >= page.len() {
        return;
    }
    page[offset..end].copy_from_slice(&data[..end - offset]);
}

fn bank_byte(bank: Bank) -> u8 {
    match bank {
        Bank::Speaker => 0xa2,
        Bank::Extension => 0xa4,
        Bank::MotionPlus => 0xa6,
        Bank::IrCamera => 0xb0,
    }
}

fn write_eeprom(sys: &mut SystemState, eeprom: &Eeprom, offset: u32, size: u8, data: &[u8]) {
    if u64::from(offset) + u64::from(size) > EEPROM_VIRTUAL_SIZE - 1 {
        push_mem_error(sys, offset, 0x08);
        return;
    }
    if eeprom.write(offset, data) {
        push_ack(sys, 0x16, 0x00);
    }
}

fn handle_read(sys: &mut SystemState, banks: &mut RegisterBanks, eeprom: &Eeprom, payload: &[u8]) {
    if payload.len() < 6 {
        return;
    }
    let source_register = payload[0] & 0x04 != 0;
    let offset = u32::from_be_bytes([0, payload[1], payload[2], payload[3]]);
    let size = u16::from_be_bytes([payload[4], payload[5]]);

    if !source_register {
        read_eeprom(sys, eeprom, offset, size);
        return;
    }

    let Some(bank) = Bank::from_offset(offset) else {
        return;
    };
    let page_offset = (offset & 0xff) as usize;

    let buffer = if bank == Bank::Extension {
        if sys.wmp_state == WmpState::Active {
            if page_offset == 0xf6 || page_offset == 0xf7 {
                sys.tries += 1;
                if sys.tries == 5 {
                    banks.bank_mut(Bank::MotionPlus)[0xf7] = 0x0e;
                }
            }
            read_page(banks.bank(Bank::MotionPlus), page_offset, size as usize)
        } else {
            read_page(banks.bank(Bank::Extension), page_offset, size as usize)
        }
    } else if bank == Bank::MotionPlus {
        if sys.wmp_state == WmpState::Active {
            push_mem_error(sys, offset, 0x07);
            return;
        }
        read_page(banks.bank(Bank::MotionPlus), page_offset, size as usize)
    } else {
        read_page(banks.bank(bank), page_offset, size as usize)
    };

    push_mem_chunks(sys, offset, size, &buffer);
}

fn read_page(page: &[u8; 256], offset: usize, size: usize) -> Vec<u8> {
    if offset >= page.len() {
        return Vec::new();
    }
    let end = (offset + size).min(page.len());
    page[offset..end].to_vec()
}

fn read_eeprom(sys: &mut SystemState, eeprom: &Eeprom, offset: u32, size: u16) {
    if u64::from(offset) + u64::from(size) > EEPROM_VIRTUAL_SIZE - 1 {
        push_mem_error(sys, offset, 0x08);
        return;
    }
    let Some(buffer) = eeprom.read(offset, size as usize) else {
        return;
    };
    push_mem_chunks(sys, offset, size, &buffer);
}

/// Pushes `ceil(size / 16)` memory-response (`0x21`) reports, one per
/// 16-byte chunk, with no other report allowed to interleave between them.
fn push_mem_chunks(sys: &mut SystemState, offset: u32, size: u16, buffer: &[u8]) {
    if size == 0 {
        return;
    }
    let total_chunks = (usize::from(size) + 15) / 16;
    for i in 0..total_chunks {
        let chunk_offset = offset + (i * 16) as u32;
        let chunk_start = i * 16;
        let chunk_len = if i == total_chunks - 1 {
            ((size as usize - 1) % 16) + 1
        } else {
            16
        };
        let chunk = buffer.get(chunk_start..chunk_start + chunk_len).unwrap_or(&[]);
        push_mem_resp(sys, (chunk_len - 1) as u8, 0x00, chunk_offset, chunk);
    }
}

fn push_mem_error(sys: &mut SystemState, offset: u32, error: u8) {
    push_mem_resp(sys, 0x0f, error, offset, &[]);
}

fn push_mem_resp(sys: &mut SystemState, size_minus_one: u8, error: u8, offset: u32, data: &[u8]) {
    let mut report = [0u8; 23];
    report[0] = 0xa1;
    report[1] = 0x21;
    // report[2..4] (buttons) are stamped in by the generator.
    report[4] = (size_minus_one << 4) | (error & 0x0f);
    report[5] = ((offset >> 8) & 0xff) as u8;
    report[6] = (offset & 0xff) as u8;
    let len = data.len().min(16);
    report[7..7 + len].copy_from_slice(&data[..len]);
    sys.queue.push(&report);
}

fn push_ack(sys: &mut SystemState, report_type: u8, error: u8) {
    let report = [0xa1, 0x22, 0, 0, report_type, error];
    sys.queue.push(&report);
}

pub(crate) fn push_status(sys: &mut SystemState) {
    let mut flags = 0u8;
    if sys.extension_connected {
        flags |= 0x02;
    }
    if sys.speaker_enabled {
        flags |= 0x04;
    }
    if sys.ircam_enabled {
        flags |= 0x08;
    }
    if sys.led[0] {
        flags |= 0x10;
    }
    if sys.led[1] {
        flags |= 0x20;
    }
    if sys.led[2] {
        flags |= 0x40;
    }
    if sys.led[3] {
        flags |= 0x80;
    }
    let report = [0xa1, 0x20, 0, 0, flags, 0, 0, sys.battery_level, 0, 0];
    sys.queue.push(&report);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::Eeprom;

    fn temp_eeprom(name: &str) -> Eeprom {
        let path = std::env::temp_dir().join(format!(
            "wiimote-emu-test-processor-{name}-{}.bin",
            std::process::id()
        ));
        std::fs::remove_file(&path).ok();
        Eeprom::open(&path).unwrap()
    }

    #[test]
    fn rumble_bit_mirrors_every_output_report() {
        let mut sys = SystemState::default();
        let mut banks = RegisterBanks::default();
        let eeprom = temp_eeprom("rumble");

        process(&mut sys, &mut banks, &eeprom, &[0xa2, 0x10, 0x01]);
        assert!(sys.rumble);
        process(&mut sys, &mut banks, &eeprom, &[0xa2, 0x10, 0x00]);
        assert!(!sys.rumble);
    }

    #[test]
    fn led_report_sets_ack_and_flags() {
        let mut sys = SystemState::default();
        let mut banks = RegisterBanks::default();
        let eeprom = temp_eeprom("led");

        process(&mut sys, &mut banks, &eeprom, &[0xa2, 0x11, 0xf0]);
        assert_eq!(sys.led, [true, true, true, true]);
        let ack = sys.queue.pop().unwrap();
        assert_eq!(ack.bytes(), &[0xa1, 0x22, 0, 0, 0x11, 0x00]);
        assert!(sys.queue.is_empty());
    }

    #[test]
    fn status_request_enqueues_exactly_one_report() {
        let mut sys = SystemState::default();
        let mut banks = RegisterBanks::default();
        let eeprom = temp_eeprom("status");

        process(&mut sys, &mut banks, &eeprom, &[0xa2, 0x15]);
        assert!(sys.queue.pop().is_some());
        assert!(sys.queue.is_empty());
    }

    #[test]
    fn eeprom_write_out_of_range_yields_error_08() {
        let mut sys = SystemState::default();
        let mut banks = RegisterBanks::default();
        let eeprom = temp_eeprom("oor");

        let mut payload = vec![0xa2, 0x16, 0x00, 0xff, 0xff, 0xff, 0x10];
        payload.extend_from_slice(&[0u8; 16]);
        process(&mut sys, &mut banks, &eeprom, &payload);
        let resp = sys.queue.pop().unwrap();
        assert_eq!(resp.bytes()[1], 0x21);
        assert_eq!(resp.bytes()[4] & 0x0f, 0x08);
    }

    #[test]
    fn memory_read_chunks_ceil_division() {
        let mut sys = SystemState::default();
        let mut banks = RegisterBanks::default();
        let eeprom = temp_eeprom("chunks");

        // speaker bank (a2), 20 bytes -> 2 chunks (16 + 4).
        process(&mut sys, &mut banks, &eeprom, &[0xa2, 0x17, 0x04, 0xa2, 0x00, 0x00, 0x00, 0x14]);
        let first = sys.queue.pop().unwrap();
        assert_eq!(first.bytes()[4] >> 4, 15);
        let second = sys.queue.pop().unwrap();
        assert_eq!(second.bytes()[4] >> 4, 3);
        assert!(sys.queue.is_empty());
    }
}
