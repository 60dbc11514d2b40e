use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised by a Launchpad session.
#[derive(Debug, Error)]
pub enum LaunchpadError {
    #[error("MIDI transport error: {0}")]
    Transport(String),

    #[error("MIDI transport not connected")]
    NotConnected,

    #[error("no MIDI port matching '{0}'")]
    PortNotFound(String),

    #[error("invalid duty cycle {numerator}/{denominator} (numerator 1-16, denominator 3-18)")]
    InvalidDutyCycle { numerator: u8, denominator: u8 },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, LaunchpadError>;
