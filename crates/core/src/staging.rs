//! Offline ("rapid update") staging buffer.
//!
//! While enabled, LED writes are collected into 80 slots and uploaded in one
//! go with ten `92 b0..b7` rapid update commands.
//!
//! Slot order:
//! - 0..64: grid pads, `row * 8 + column`
//! - 64..72: side buttons, `64 + row`
//! - 72..80: top-row buttons, `72 + column`

use crate::mapping::Position;

pub const SLOT_COUNT: usize = 80;

/// Bytes carried by one rapid update command.
pub const RAPID_UPDATE_CHUNK: usize = 8;

/// Slot index of a position, `None` if it has no LED.
pub fn slot_for_position(position: Position) -> Option<usize> {
    let Position { column, row } = position;
    let slot = if position.is_grid() {
        row * 8 + column
    } else if position.is_side_column() {
        64 + row
    } else if position.is_top_row() {
        72 + column
    } else {
        return None;
    };
    Some(slot as usize)
}

/// Staged LED bytes. `None` slots resolve to the current off value.
#[derive(Debug, Clone, Default)]
pub struct OfflineStager {
    slots: Option<Box<[Option<u8>; SLOT_COUNT]>>,
}

impl OfflineStager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.slots.is_some()
    }

    /// Start staging. Existing staged contents are kept.
    pub fn enable(&mut self) {
        if self.slots.is_none() {
            self.slots = Some(Box::new([None; SLOT_COUNT]));
        }
    }

    pub fn disable(&mut self) {
        self.slots = None;
    }

    /// Store `byte` for `position`. Positions without a slot are dropped.
    pub fn stage(&mut self, position: Position, byte: u8) {
        let Some(slots) = self.slots.as_mut() else {
            return;
        };
        match slot_for_position(position) {
            Some(slot) => slots[slot] = Some(byte),
            None => log::debug!("no offline slot for {:?}, dropped", position),
        }
    }

    pub fn stage_all_off(&mut self, off: u8) {
        if let Some(slots) = self.slots.as_mut() {
            slots.fill(Some(off));
        }
    }

    /// Staged bytes in slot order with unset slots replaced by `off`.
    /// Slot contents are left in place.
    pub fn resolve(&self, off: u8) -> Option<[u8; SLOT_COUNT]> {
        let slots = self.slots.as_ref()?;
        Some(std::array::from_fn(|i| slots[i].unwrap_or(off)))
    }
}
