use serde::{Deserialize, Serialize};

use crate::mapping::MappingMode;

/// Driver settings, persisted by [`ConfigManager`](crate::ConfigManager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Port discovery
    pub device_pattern: String,
    pub client_name: String,

    // Session defaults
    pub mapping_mode: MappingMode,
    pub offline_updates: bool,
    /// LED duty cycle as (numerator, denominator); device default if unset
    pub duty_cycle: Option<(u8, u8)>,

    // Input polling
    pub poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device_pattern: "Launchpad".to_string(),
            client_name: "launchpad_driver".to_string(),

            mapping_mode: MappingMode::Xy,
            offline_updates: false,
            duty_cycle: None,

            poll_interval_ms: 5,
        }
    }
}
