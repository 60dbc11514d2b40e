//! Protocol driver for Novation Launchpad grid controllers.
//!
//! Translates `(column, row)` positions and red/green LED settings into the
//! device's MIDI command grammar, and decodes button presses and device
//! inquiry replies coming back.
//!
//! # Architecture
//!
//! - [`mapping`]: position <-> note/controller numbers (XY and drum rack)
//! - [`led`]: LED byte encoding
//! - [`transport`]: the [`MidiTransport`] seam and running-status output
//! - [`buffer`]: double buffering and flashing state machine
//! - [`staging`]: offline slots uploaded with rapid update
//! - [`input`]: inbound message decoding
//!
//! [`Launchpad`] ties them into one session.

pub use buffer::{BufferController, BufferMode};
pub use config::{ConfigError, ConfigManager, ConfigSchema};
pub use error::{LaunchpadError, Result};
pub use input::{device_name_matches, ButtonEvent, DeviceIdentification, InputEvent};
pub use launchpad::Launchpad;
pub use led::LedColor;
pub use mapping::{MappingMode, Position};
pub use settings::Settings;
pub use transport::{MessageTransport, MidiTransport, RecordingTransport};

pub mod buffer;
mod config;
mod error;
pub mod input;
mod launchpad;
pub mod led;
pub mod mapping;
mod settings;
pub mod staging;
pub mod transport;
