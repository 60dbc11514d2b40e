//! Grid coordinate mapping.
//!
//! Converts logical `(column, row)` positions to the note and controller
//! numbers the Launchpad understands, and back again.
//!
//! # Layout
//!
//! ```text
//!          col 0 .. 7              col 8
//! row -1:  CC 0x68 .. 0x6F         (none)
//! row 0:   grid pads               side round button
//!   ..
//! row 7:   grid pads               side round button
//! ```
//!
//! Under XY mapping the note is `row * 16 + column`. Under drum rack
//! mapping the grid is split into two 4-column halves counting upwards
//! from the bottom-left pad (note 36), with the side buttons on 100-107.

use serde::{Deserialize, Serialize};

/// Controller number of the leftmost top-row round button.
pub const TOP_ROW_CONTROLLER_BASE: u8 = 0x68;

/// Note addressing mode of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingMode {
    /// Linear `row * 16 + column` layout (the power-on default)
    #[default]
    Xy,
    /// Drum-machine friendly layout
    DrumRack,
}

impl MappingMode {
    /// Data byte of the `B0 00 xx` command that selects this mode.
    pub const fn command_value(self) -> u8 {
        match self {
            MappingMode::Xy => 0x01,
            MappingMode::DrumRack => 0x02,
        }
    }
}

/// A logical button/LED position.
///
/// Row -1 is the top row of round buttons, rows 0-7 are the pad rows.
/// Column 8 is the right-hand column of round buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub column: i32,
    pub row: i32,
}

impl Position {
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// One of the 64 square pads.
    pub fn is_grid(&self) -> bool {
        (0..8).contains(&self.column) && (0..8).contains(&self.row)
    }

    /// One of the 8 round buttons above the grid.
    pub fn is_top_row(&self) -> bool {
        self.row == -1 && (0..8).contains(&self.column)
    }

    /// One of the 8 round buttons right of the grid.
    pub fn is_side_column(&self) -> bool {
        self.column == 8 && (0..8).contains(&self.row)
    }
}

/// Drum rack note numbers indexed by `[row][column]`, column 8 being the
/// side buttons.
const DRUM_RACK_NOTES: [[u8; 9]; 8] = [
    [64, 65, 66, 67, 96, 97, 98, 99, 100],
    [60, 61, 62, 63, 92, 93, 94, 95, 101],
    [56, 57, 58, 59, 88, 89, 90, 91, 102],
    [52, 53, 54, 55, 84, 85, 86, 87, 103],
    [48, 49, 50, 51, 80, 81, 82, 83, 104],
    [44, 45, 46, 47, 76, 77, 78, 79, 105],
    [40, 41, 42, 43, 72, 73, 74, 75, 106],
    [36, 37, 38, 39, 68, 69, 70, 71, 107],
];

/// Inverse of [`DRUM_RACK_NOTES`]: `(column, row)` for every note.
const DRUM_RACK_POSITIONS: [Option<(u8, u8)>; 128] = invert_drum_rack();

const fn invert_drum_rack() -> [Option<(u8, u8)>; 128] {
    let mut positions = [None; 128];
    let mut row = 0;
    while row < DRUM_RACK_NOTES.len() {
        let mut column = 0;
        while column < DRUM_RACK_NOTES[row].len() {
            let note = DRUM_RACK_NOTES[row][column] as usize;
            positions[note] = Some((column as u8, row as u8));
            column += 1;
        }
        row += 1;
    }
    positions
}

/// Note number for a pad or side button.
///
/// Returns `None` when the position has no note in the given mode, or when
/// the XY formula leaves the 7-bit data range.
pub fn note_for_position(column: i32, row: i32, mode: MappingMode) -> Option<u8> {
    match mode {
        MappingMode::Xy => {
            let note = row.checked_mul(16)?.checked_add(column)?;
            u8::try_from(note).ok().filter(|n| *n <= 0x7F)
        }
        MappingMode::DrumRack => {
            let row = usize::try_from(row).ok()?;
            let column = usize::try_from(column).ok()?;
            DRUM_RACK_NOTES.get(row)?.get(column).copied()
        }
    }
}

/// Controller number for a top-row round button.
pub fn controller_for_top_column(column: i32) -> Option<u8> {
    if (0..8).contains(&column) {
        Some(TOP_ROW_CONTROLLER_BASE + column as u8)
    } else {
        None
    }
}

/// Position of an incoming note.
pub fn position_for_note(note: u8, mode: MappingMode) -> Option<Position> {
    match mode {
        MappingMode::Xy => Some(Position::new(
            (note & 0x0F) as i32,
            ((note >> 4) & 0x0F) as i32,
        )),
        MappingMode::DrumRack => {
            let (column, row) = (*DRUM_RACK_POSITIONS.get(note as usize)?)?;
            Some(Position::new(column as i32, row as i32))
        }
    }
}

/// Position of an incoming controller change; only the top row is valid.
pub fn position_for_controller(controller: u8) -> Option<Position> {
    if (TOP_ROW_CONTROLLER_BASE..TOP_ROW_CONTROLLER_BASE + 8).contains(&controller) {
        Some(Position::new((controller - TOP_ROW_CONTROLLER_BASE) as i32, -1))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xy_round_trip() {
        for row in 0..8 {
            for column in 0..8 {
                let note = note_for_position(column, row, MappingMode::Xy).unwrap();
                assert_eq!(
                    position_for_note(note, MappingMode::Xy),
                    Some(Position::new(column, row))
                );
            }
        }
    }

    #[test]
    fn test_drum_rack_round_trip() {
        for row in 0..8 {
            for column in 0..8 {
                let note = note_for_position(column, row, MappingMode::DrumRack).unwrap();
                assert_eq!(
                    position_for_note(note, MappingMode::DrumRack),
                    Some(Position::new(column, row))
                );
            }
        }
    }

    #[test]
    fn test_drum_rack_corners() {
        // Bottom-left pad is the lowest note, side buttons count down the column
        assert_eq!(note_for_position(0, 7, MappingMode::DrumRack), Some(36));
        assert_eq!(note_for_position(7, 0, MappingMode::DrumRack), Some(99));
        assert_eq!(note_for_position(8, 0, MappingMode::DrumRack), Some(100));
        assert_eq!(note_for_position(8, 7, MappingMode::DrumRack), Some(107));
    }

    #[test]
    fn test_drum_rack_unmapped_notes() {
        assert_eq!(position_for_note(0, MappingMode::DrumRack), None);
        assert_eq!(position_for_note(35, MappingMode::DrumRack), None);
        assert_eq!(position_for_note(108, MappingMode::DrumRack), None);
        assert_eq!(position_for_note(200, MappingMode::DrumRack), None);
    }

    #[test]
    fn test_xy_note_values() {
        assert_eq!(note_for_position(0, 0, MappingMode::Xy), Some(0x00));
        assert_eq!(note_for_position(3, 2, MappingMode::Xy), Some(0x23));
        assert_eq!(note_for_position(8, 7, MappingMode::Xy), Some(0x78));
        assert_eq!(position_for_note(0x40, MappingMode::Xy), Some(Position::new(0, 4)));
    }

    #[test]
    fn test_xy_out_of_range_rows() {
        assert_eq!(note_for_position(0, -1, MappingMode::Xy), None);
        assert_eq!(note_for_position(0, 8, MappingMode::Xy), None);
        assert_eq!(note_for_position(0, -1, MappingMode::DrumRack), None);
    }

    #[test]
    fn test_top_row_controllers() {
        assert_eq!(controller_for_top_column(0), Some(0x68));
        assert_eq!(controller_for_top_column(7), Some(0x6F));
        assert_eq!(controller_for_top_column(8), None);

        assert_eq!(position_for_controller(0x68), Some(Position::new(0, -1)));
        assert_eq!(position_for_controller(0x6F), Some(Position::new(7, -1)));
        assert_eq!(position_for_controller(0x67), None);
        assert_eq!(position_for_controller(0x70), None);
    }

    #[test]
    fn test_position_regions() {
        assert!(Position::new(0, 0).is_grid());
        assert!(Position::new(3, -1).is_top_row());
        assert!(Position::new(8, 4).is_side_column());
        assert!(!Position::new(8, -1).is_top_row());
        assert!(!Position::new(8, 4).is_grid());
    }
}
