//! Launchpad session.
//!
//! Owns the transport plus every piece of per-device state: mapping mode,
//! buffer mode, offline staging slots and the running-status cache.
//!
//! A session is not internally synchronised. When input polling and LED
//! writes run on different tasks, wrap the whole session in one mutex.

use crate::buffer::{BufferController, BufferMode};
use crate::error::{LaunchpadError, Result};
use crate::input::{decode, ButtonEvent, InputEvent, DEVICE_INQUIRY_REQUEST};
use crate::led::{off_value, LedColor};
use crate::mapping::{controller_for_top_column, note_for_position, MappingMode, Position};
use crate::settings::Settings;
use crate::staging::{OfflineStager, RAPID_UPDATE_CHUNK, SLOT_COUNT};
use crate::transport::{MessageTransport, MidiTransport};

const NOTE_ON: u8 = 0x90;
const CONTROL_CHANGE: u8 = 0xB0;
const RAPID_UPDATE: u8 = 0x92;

/// Controller carrying reset, mapping mode and buffer configuration.
const CONFIG_CONTROLLER: u8 = 0x00;
const RESET_VALUE: u8 = 0x00;
const DUTY_CYCLE_LOW: u8 = 0x1E;
const DUTY_CYCLE_HIGH: u8 = 0x1F;

/// Rightmost column; setters clamp columns into `0..=MAX_COLUMN`.
pub const MAX_COLUMN: i32 = 8;

/// A session with one Launchpad.
///
/// Dropping the session resets the device (default mapping, single
/// buffer, all LEDs off). Use [`close`](Launchpad::close) to observe a
/// failing reset instead of only logging it.
pub struct Launchpad<T: MidiTransport> {
    output: MessageTransport<T>,
    mapping_mode: MappingMode,
    buffers: BufferController,
    stager: OfflineStager,
    reset_on_drop: bool,
}

impl<T: MidiTransport> Launchpad<T> {
    /// Wrap a transport without sending anything.
    pub fn new(transport: T) -> Self {
        Self {
            output: MessageTransport::new(transport),
            mapping_mode: MappingMode::Xy,
            buffers: BufferController::new(),
            stager: OfflineStager::new(),
            reset_on_drop: true,
        }
    }

    /// Wrap a transport and reset the device.
    pub fn open(transport: T) -> Result<Self> {
        let mut launchpad = Self::new(transport);
        launchpad.reset()?;
        log::info!("Launchpad session opened");
        Ok(launchpad)
    }

    pub fn transport(&self) -> &T {
        self.output.get_ref()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        self.output.get_mut()
    }

    /// Apply mapping mode, duty cycle and staging from settings.
    pub fn apply_settings(&mut self, settings: &Settings) -> Result<()> {
        self.set_mapping_mode(settings.mapping_mode)?;
        if let Some((numerator, denominator)) = settings.duty_cycle {
            self.set_duty_cycle(numerator, denominator)?;
        }
        if settings.offline_updates {
            self.enable_offline_updates();
        } else {
            self.disable_offline_updates();
        }
        Ok(())
    }

    // === Device state ===

    /// Clear mapping and buffer state and turn every LED off.
    pub fn reset(&mut self) -> Result<()> {
        self.send_config(RESET_VALUE)?;
        self.mapping_mode = MappingMode::Xy;
        self.buffers.reset();
        Ok(())
    }

    /// Reset the device now and skip the reset on drop.
    pub fn close(mut self) -> Result<()> {
        self.reset_on_drop = false;
        self.reset()
    }

    pub fn set_mapping_mode(&mut self, mode: MappingMode) -> Result<()> {
        self.send_config(mode.command_value())?;
        self.mapping_mode = mode;
        Ok(())
    }

    pub fn mapping_mode(&self) -> MappingMode {
        self.mapping_mode
    }

    pub fn buffer_mode(&self) -> BufferMode {
        self.buffers.mode()
    }

    /// Set the LED duty cycle to `numerator / denominator`.
    pub fn set_duty_cycle(&mut self, numerator: u8, denominator: u8) -> Result<()> {
        if !(1..=16).contains(&numerator) || !(3..=18).contains(&denominator) {
            return Err(LaunchpadError::InvalidDutyCycle {
                numerator,
                denominator,
            });
        }

        let (controller, base) = if numerator < 9 {
            (DUTY_CYCLE_LOW, numerator - 1)
        } else {
            (DUTY_CYCLE_HIGH, numerator - 9)
        };
        self.output
            .send(CONTROL_CHANGE, &[controller, 16 * base + (denominator - 3)])
    }

    // === LEDs ===

    /// Set one LED to a raw protocol byte. The column is clamped to 0-8.
    pub fn set_led_raw(&mut self, column: i32, row: i32, value: u8) -> Result<()> {
        let position = Position::new(column.clamp(0, MAX_COLUMN), row);
        if self.stager.is_enabled() {
            self.stager.stage(position, value);
            return Ok(());
        }
        self.send_led(position, value)
    }

    pub fn set_led(&mut self, column: i32, row: i32, color: LedColor) -> Result<()> {
        let value = color.to_byte(self.buffers.mode());
        self.set_led_raw(column, row, value)
    }

    pub fn set_led_off(&mut self, column: i32, row: i32) -> Result<()> {
        self.set_led(column, row, LedColor::OFF)
    }

    /// Turn every LED off, staged if offline updates are enabled.
    pub fn all_off(&mut self) -> Result<()> {
        let off = off_value(self.buffers.mode());
        if self.stager.is_enabled() {
            self.stager.stage_all_off(off);
            return Ok(());
        }
        self.send_rapid_update(&[off; SLOT_COUNT])
    }

    fn send_led(&mut self, position: Position, value: u8) -> Result<()> {
        if position.row == -1 {
            match controller_for_top_column(position.column) {
                Some(controller) => self.output.send(CONTROL_CHANGE, &[controller, value]),
                None => {
                    log::debug!("no top-row LED at {:?}", position);
                    Ok(())
                }
            }
        } else {
            match note_for_position(position.column, position.row, self.mapping_mode) {
                Some(note) => self.output.send(NOTE_ON, &[note, value]),
                None => {
                    log::debug!("no {:?} note for {:?}", self.mapping_mode, position);
                    Ok(())
                }
            }
        }
    }

    // === Buffers ===

    pub fn enable_double_buffer(&mut self) -> Result<()> {
        let bits = self.buffers.enable_double();
        self.send_config(bits)
    }

    pub fn disable_double_buffer(&mut self) -> Result<()> {
        let bits = self.buffers.disable_double();
        self.send_config(bits)
    }

    pub fn is_double_buffered(&self) -> bool {
        self.buffers.is_double_buffered()
    }

    /// Show the update buffer. With `copy` the newly displayed contents are
    /// copied into the new update buffer. Does nothing unless double buffered.
    pub fn flip_buffers(&mut self, copy: bool) -> Result<()> {
        match self.buffers.flip(copy) {
            Some(bits) => self.send_config(bits),
            None => Ok(()),
        }
    }

    pub fn set_flashing(&mut self, enabled: bool) -> Result<()> {
        match self.buffers.set_flashing(enabled) {
            Some(bits) => self.send_config(bits),
            None => Ok(()),
        }
    }

    pub fn is_flashing(&self) -> bool {
        self.buffers.is_flashing()
    }

    fn send_config(&mut self, value: u8) -> Result<()> {
        self.output
            .send(CONTROL_CHANGE, &[CONFIG_CONTROLLER, value])
    }

    // === Offline updates ===

    pub fn enable_offline_updates(&mut self) {
        self.stager.enable();
    }

    /// Discard staged updates; later writes go straight to the device.
    pub fn disable_offline_updates(&mut self) {
        self.stager.disable();
    }

    pub fn offline_updates_enabled(&self) -> bool {
        self.stager.is_enabled()
    }

    /// Upload all staged LEDs. Staged values stay in place for the next flush.
    pub fn flush(&mut self) -> Result<()> {
        match self.stager.resolve(off_value(self.buffers.mode())) {
            Some(values) => self.send_rapid_update(&values),
            None => Ok(()),
        }
    }

    fn send_rapid_update(&mut self, values: &[u8; SLOT_COUNT]) -> Result<()> {
        // The device only rewinds its rapid update cursor on a different
        // command, so a second upload in a row starts with a mode command.
        if self.output.last_sent_command() == Some(RAPID_UPDATE) {
            self.send_config(self.mapping_mode.command_value())?;
        }
        for chunk in values.chunks(RAPID_UPDATE_CHUNK) {
            self.output.send(RAPID_UPDATE, chunk)?;
        }
        Ok(())
    }

    // === Input ===

    /// Ask the device to identify itself; the reply arrives as an input
    /// message decoding to [`InputEvent::Device`].
    pub fn request_device_inquiry(&mut self) -> Result<()> {
        self.output.send_sysex(&DEVICE_INQUIRY_REQUEST)
    }

    /// Decode one message under the current mapping mode.
    pub fn decode(&self, message: &[u8]) -> Option<InputEvent> {
        decode(message, self.mapping_mode)
    }

    /// Decoded events for every message received since the last poll.
    pub fn messages(&mut self) -> Result<impl Iterator<Item = InputEvent>> {
        let mode = self.mapping_mode;
        let messages = self.output.poll()?;
        Ok(messages.into_iter().filter_map(move |message| {
            let event = decode(&message, mode);
            if event.is_none() {
                log::trace!("ignored input {:02X?}", message);
            }
            event
        }))
    }

    /// Button events received since the last poll.
    pub fn button_events(&mut self) -> Result<impl Iterator<Item = ButtonEvent>> {
        Ok(self.messages()?.filter_map(|event| match event {
            InputEvent::Button(button) => Some(button),
            InputEvent::Device(_) => None,
        }))
    }
}

impl<T: MidiTransport> Drop for Launchpad<T> {
    fn drop(&mut self) {
        if self.reset_on_drop {
            if let Err(e) = self.reset() {
                log::warn!("Failed to reset Launchpad on shutdown: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::RecordingTransport;

    fn session() -> (Launchpad<RecordingTransport>, RecordingTransport) {
        let recording = RecordingTransport::new();
        (Launchpad::new(recording.clone()), recording)
    }

    #[test]
    fn test_open_resets_device() {
        let recording = RecordingTransport::new();
        let launchpad = Launchpad::open(recording.clone()).unwrap();
        assert_eq!(recording.take_written(), vec![vec![0xB0, 0x00, 0x00]]);
        assert_eq!(launchpad.mapping_mode(), MappingMode::Xy);
    }

    #[test]
    fn test_drop_resets_device() {
        let (mut launchpad, recording) = session();
        launchpad.set_led(0, 0, LedColor::RED).unwrap();
        drop(launchpad);
        assert_eq!(recording.written().last().unwrap(), &vec![0xB0, 0x00, 0x00]);
    }

    #[test]
    fn test_close_resets_once() {
        let (launchpad, recording) = session();
        launchpad.close().unwrap();
        assert_eq!(recording.written(), vec![vec![0xB0, 0x00, 0x00]]);
    }

    #[test]
    fn test_set_led_grid_and_top_row() {
        let (mut launchpad, recording) = session();

        launchpad.set_led(3, 2, LedColor::AMBER).unwrap();
        launchpad.set_led(2, -1, LedColor::GREEN).unwrap();

        assert_eq!(
            recording.take_written(),
            vec![vec![0x90, 0x23, 0x3F], vec![0xB0, 0x6A, 0x3C]]
        );
    }

    #[test]
    fn test_column_is_clamped() {
        let (mut launchpad, recording) = session();

        launchpad.set_led_raw(42, 1, 0x0F).unwrap();
        launchpad.set_led_raw(-3, 1, 0x0F).unwrap();

        assert_eq!(
            recording.take_written(),
            vec![vec![0x90, 0x18, 0x0F], vec![0x10, 0x0F]]
        );
    }

    #[test]
    fn test_unrepresentable_position_sends_nothing() {
        let (mut launchpad, recording) = session();

        launchpad.set_led_raw(8, -1, 0x0F).unwrap();
        launchpad.set_led_raw(0, 9, 0x0F).unwrap();

        assert!(recording.written().is_empty());
    }

    #[test]
    fn test_off_follows_buffer_mode() {
        let (mut launchpad, recording) = session();

        launchpad.set_led_off(0, 0).unwrap();
        launchpad.enable_double_buffer().unwrap();
        launchpad.set_led_off(0, 0).unwrap();

        assert_eq!(
            recording.take_written(),
            vec![
                vec![0x90, 0x00, 0x0C],
                vec![0xB0, 0x00, 0x34],
                vec![0x90, 0x00, 0x00],
            ]
        );
    }

    #[test]
    fn test_duty_cycle_encoding() {
        let (mut launchpad, recording) = session();

        launchpad.set_duty_cycle(1, 5).unwrap();
        launchpad.set_duty_cycle(9, 18).unwrap();

        assert_eq!(
            recording.take_written(),
            vec![vec![0xB0, 0x1E, 0x02], vec![0x1F, 0x0F]]
        );
    }

    #[test]
    fn test_invalid_duty_cycle() {
        let (mut launchpad, recording) = session();

        assert!(matches!(
            launchpad.set_duty_cycle(0, 5),
            Err(LaunchpadError::InvalidDutyCycle { .. })
        ));
        assert!(matches!(
            launchpad.set_duty_cycle(4, 19),
            Err(LaunchpadError::InvalidDutyCycle { .. })
        ));
        assert!(recording.written().is_empty());
    }

    #[test]
    fn test_flip_requires_double_buffer() {
        let (mut launchpad, recording) = session();

        launchpad.flip_buffers(true).unwrap();
        assert!(recording.written().is_empty());

        launchpad.enable_double_buffer().unwrap();
        launchpad.flip_buffers(false).unwrap();
        assert_eq!(
            recording.take_written(),
            vec![vec![0xB0, 0x00, 0x34], vec![0x00, 0x21]]
        );
    }

    #[test]
    fn test_mode_switches() {
        let (mut launchpad, _recording) = session();

        launchpad.enable_double_buffer().unwrap();
        launchpad.set_flashing(true).unwrap();
        assert!(launchpad.is_flashing());
        assert!(!launchpad.is_double_buffered());

        launchpad.enable_double_buffer().unwrap();
        assert!(launchpad.is_double_buffered());
        assert!(!launchpad.is_flashing());

        launchpad.set_mapping_mode(MappingMode::DrumRack).unwrap();
        launchpad.reset().unwrap();
        assert_eq!(launchpad.mapping_mode(), MappingMode::Xy);
        assert_eq!(launchpad.buffer_mode(), BufferMode::Single);
    }

    #[test]
    fn test_drum_rack_led() {
        let (mut launchpad, recording) = session();

        launchpad.set_mapping_mode(MappingMode::DrumRack).unwrap();
        launchpad.set_led_raw(0, 7, 0x3F).unwrap();
        launchpad.set_led_raw(8, 0, 0x3F).unwrap();

        assert_eq!(
            recording.take_written(),
            vec![
                vec![0xB0, 0x00, 0x02],
                vec![0x90, 36, 0x3F],
                vec![100, 0x3F],
            ]
        );
    }

    #[test]
    fn test_decode_follows_mapping_mode() {
        let (mut launchpad, _recording) = session();

        let press = [0x90, 36, 0x7F];
        assert_eq!(
            launchpad.decode(&press),
            Some(InputEvent::Button(ButtonEvent {
                position: Position::new(4, 2),
                pressed: true,
            }))
        );

        launchpad.set_mapping_mode(MappingMode::DrumRack).unwrap();
        assert_eq!(
            launchpad.decode(&press),
            Some(InputEvent::Button(ButtonEvent {
                position: Position::new(0, 7),
                pressed: true,
            }))
        );
    }

    #[test]
    fn test_apply_settings() {
        let (mut launchpad, recording) = session();
        let settings = Settings {
            mapping_mode: MappingMode::DrumRack,
            offline_updates: true,
            duty_cycle: Some((1, 5)),
            ..Settings::default()
        };

        launchpad.apply_settings(&settings).unwrap();

        assert_eq!(launchpad.mapping_mode(), MappingMode::DrumRack);
        assert!(launchpad.offline_updates_enabled());
        assert_eq!(
            recording.take_written(),
            vec![vec![0xB0, 0x00, 0x02], vec![0x1E, 0x02]]
        );
    }
}
