//! Inbound message decoding.
//!
//! Pads and side buttons arrive as note-on, top-row buttons as controller
//! changes. Device inquiry replies arrive as universal SysEx.

use std::fmt;

use crate::mapping::{position_for_controller, position_for_note, MappingMode, Position};

const NOTE_ON: u8 = 0x90;
const CONTROL_CHANGE: u8 = 0xB0;
const SYSEX_START: u8 = 0xF0;
const SYSEX_END: u8 = 0xF7;

/// Non-realtime universal SysEx ID.
const UNIVERSAL_NON_REALTIME: u8 = 0x7E;
/// General information sub-ID.
const GENERAL_INFORMATION: u8 = 0x06;
/// Novation's three-byte manufacturer ID.
pub const NOVATION_ID: [u8; 3] = [0x00, 0x20, 0x29];

/// Ask every device on the port to identify itself.
pub const DEVICE_INQUIRY_REQUEST: [u8; 6] = [
    SYSEX_START,
    UNIVERSAL_NON_REALTIME,
    0x7F,
    GENERAL_INFORMATION,
    0x01,
    SYSEX_END,
];

const PRESS_THRESHOLD: u8 = 64;

/// A button press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonEvent {
    pub position: Position,
    pub pressed: bool,
}

/// Device model reported by an inquiry reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceIdentification {
    LaunchpadS,
    LaunchpadMk2,
    LaunchpadPro,
    LaunchpadMini,
    UnknownNovationDevice,
    UnknownDevice,
}

impl DeviceIdentification {
    fn from_family(family: [u8; 2]) -> Self {
        match family {
            [0x20, 0x00] => Self::LaunchpadS,
            [0x36, 0x00] => Self::LaunchpadMini,
            [0x51, 0x00] => Self::LaunchpadPro,
            [0x69, 0x00] => Self::LaunchpadMk2,
            _ => Self::UnknownNovationDevice,
        }
    }
}

impl fmt::Display for DeviceIdentification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LaunchpadS => "Launchpad S",
            Self::LaunchpadMk2 => "Launchpad MK2",
            Self::LaunchpadPro => "Launchpad Pro",
            Self::LaunchpadMini => "Launchpad Mini",
            Self::UnknownNovationDevice => "unknown Novation device",
            Self::UnknownDevice => "unknown device",
        };
        f.write_str(name)
    }
}

/// A decoded inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Button(ButtonEvent),
    Device(DeviceIdentification),
}

/// Decode one complete message. Anything unrecognised yields `None`.
pub fn decode(message: &[u8], mode: MappingMode) -> Option<InputEvent> {
    let status = *message.first()?;
    if status == SYSEX_START {
        return decode_inquiry_reply(message).map(InputEvent::Device);
    }

    let (position, value) = match (status & 0xF0, message) {
        (NOTE_ON, [_, note, velocity, ..]) => (position_for_note(*note, mode)?, *velocity),
        (CONTROL_CHANGE, [_, controller, value, ..]) => {
            (position_for_controller(*controller)?, *value)
        }
        _ => return None,
    };

    Some(InputEvent::Button(ButtonEvent {
        position,
        pressed: value >= PRESS_THRESHOLD,
    }))
}

/// `F0 7E id 06 02 m0 m1 m2 f0 f1 ...`
fn decode_inquiry_reply(message: &[u8]) -> Option<DeviceIdentification> {
    if message.len() < 10
        || message[1] != UNIVERSAL_NON_REALTIME
        || message[3] != GENERAL_INFORMATION
    {
        return None;
    }

    let manufacturer = &message[5..8];
    if manufacturer != NOVATION_ID {
        return Some(DeviceIdentification::UnknownDevice);
    }
    Some(DeviceIdentification::from_family([message[8], message[9]]))
}

/// Whether a MIDI port name looks like the device, ignoring case.
pub fn device_name_matches(pattern: &str, port_name: &str) -> bool {
    port_name.to_lowercase().contains(&pattern.to_lowercase())
}
