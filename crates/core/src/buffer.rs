//! Double-buffer and flashing state machine.
//!
//! The device keeps two LED buffers. Every buffer change is expressed as one
//! `B0 00 bits` controller message; the controller here only tracks state
//! and computes `bits`, the session sends them.

/// Always-set marker bit of a buffer configuration byte.
const CONFIG_MARKER: u8 = 0x20;
/// Bit 0: buffer being displayed.
const DISPLAY_SHIFT: u8 = 0;
/// Bit 2: buffer being written.
const UPDATE_SHIFT: u8 = 2;
/// Bit 3: hardware auto-flip between the buffers.
const FLASH_BIT: u8 = 0x08;
/// Bit 4: copy the new display buffer into the new update buffer.
const COPY_BIT: u8 = 0x10;

/// Which LED buffer(s) the device is operating on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferMode {
    /// Both buffers unified; every write is shown immediately.
    #[default]
    Single,
    /// `display` is shown while writes land in `update`.
    Double { display: u8, update: u8 },
    /// The device alternates the displayed buffer by itself.
    Flashing,
}

fn config_bits(display: u8, update: u8, flash: bool, copy: bool) -> u8 {
    let mut bits = CONFIG_MARKER | (display & 1) << DISPLAY_SHIFT | (update & 1) << UPDATE_SHIFT;
    if flash {
        bits |= FLASH_BIT;
    }
    if copy {
        bits |= COPY_BIT;
    }
    bits
}

/// Tracks [`BufferMode`] and yields the configuration byte for each
/// transition. `None` means nothing must be sent.
#[derive(Debug, Clone, Default)]
pub struct BufferController {
    mode: BufferMode,
}

impl BufferController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> BufferMode {
        self.mode
    }

    pub fn is_double_buffered(&self) -> bool {
        matches!(self.mode, BufferMode::Double { .. })
    }

    pub fn is_flashing(&self) -> bool {
        self.mode == BufferMode::Flashing
    }

    /// Forget all state after a device reset.
    pub fn reset(&mut self) {
        self.mode = BufferMode::Single;
    }

    /// Show buffer 0 and write into buffer 1, copying the displayed
    /// contents across so the update buffer starts from what is visible.
    pub fn enable_double(&mut self) -> u8 {
        self.mode = BufferMode::Double {
            display: 0,
            update: 1,
        };
        config_bits(0, 1, false, true)
    }

    pub fn disable_double(&mut self) -> u8 {
        self.mode = BufferMode::Single;
        config_bits(0, 0, false, true)
    }

    /// Enabling always leaves double buffering. Disabling returns to
    /// `Single`, never to a previous double-buffer state.
    pub fn set_flashing(&mut self, enabled: bool) -> Option<u8> {
        if enabled {
            self.mode = BufferMode::Flashing;
            Some(config_bits(0, 0, true, false))
        } else if self.is_flashing() {
            self.mode = BufferMode::Single;
            Some(config_bits(0, 0, false, true))
        } else {
            None
        }
    }

    /// Swap the display and update buffers. Ignored unless double buffered.
    pub fn flip(&mut self, copy: bool) -> Option<u8> {
        match self.mode {
            BufferMode::Double { display, update } => {
                self.mode = BufferMode::Double {
                    display: update,
                    update: display,
                };
                Some(config_bits(update, display, false, copy))
            }
            _ => None,
        }
    }
}
