//! LED colour byte encoding.
//!
//! Each LED has a red and a green element with four brightness levels. The
//! protocol packs both plus the buffer handling flags into a single byte:
//!
//! ```text
//! bit   6 5 4 3 2 1 0
//!       0 G G C K R R     C = clear other buffer, K = copy to both buffers
//! ```

use crate::buffer::BufferMode;

const LEVEL_MASK: u8 = 0x03;
const GREEN_SHIFT: u8 = 4;
const FLASH_FLAGS: u8 = 0x08;
const COPY_AND_CLEAR_FLAGS: u8 = 0x0C;

/// Encode brightness and flags into a protocol byte.
///
/// A flashing LED writes only the update buffer and clears the other one,
/// so it blinks once the device alternates buffers. Otherwise the byte is
/// written to both buffers in single-buffer mode and only to the update
/// buffer when double buffering.
pub fn encode(red: u8, green: u8, flash: bool, mode: BufferMode) -> u8 {
    let color = (red & LEVEL_MASK) | (green & LEVEL_MASK) << GREEN_SHIFT;
    let flags = if flash {
        FLASH_FLAGS
    } else {
        match mode {
            BufferMode::Double { .. } => 0x00,
            BufferMode::Single | BufferMode::Flashing => COPY_AND_CLEAR_FLAGS,
        }
    };
    color | flags
}

/// The byte that turns an LED off in the given mode.
pub fn off_value(mode: BufferMode) -> u8 {
    match mode {
        BufferMode::Single => COPY_AND_CLEAR_FLAGS,
        BufferMode::Double { .. } | BufferMode::Flashing => 0x00,
    }
}

/// A red/green LED setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LedColor {
    /// Red brightness (0-3)
    pub red: u8,
    /// Green brightness (0-3)
    pub green: u8,
    /// Blink while the device is flashing
    pub flash: bool,
}

impl LedColor {
    pub const OFF: LedColor = LedColor::new(0, 0);
    pub const RED: LedColor = LedColor::new(3, 0);
    pub const RED_DIM: LedColor = LedColor::new(1, 0);
    pub const GREEN: LedColor = LedColor::new(0, 3);
    pub const GREEN_DIM: LedColor = LedColor::new(0, 1);
    pub const AMBER: LedColor = LedColor::new(3, 3);
    pub const AMBER_DIM: LedColor = LedColor::new(1, 1);
    pub const YELLOW: LedColor = LedColor::new(2, 3);

    /// Brightness values are masked to 0-3.
    pub const fn new(red: u8, green: u8) -> Self {
        Self {
            red: red & LEVEL_MASK,
            green: green & LEVEL_MASK,
            flash: false,
        }
    }

    pub const fn flashing(self) -> Self {
        Self {
            flash: true,
            ..self
        }
    }

    pub fn to_byte(self, mode: BufferMode) -> u8 {
        encode(self.red, self.green, self.flash, mode)
    }
}
