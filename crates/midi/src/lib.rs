//! MIDI port access for Launchpad sessions.
//!
//! - [`MidirTransport`]: a [`MidiTransport`](launchpad_core::MidiTransport)
//!   over a pair of `midir` connections
//! - [`list_ports`]: port names for diagnostics
//! - [`spawn_input_poller`]: background task draining button events from a
//!   shared session

mod poller;
mod ports;
mod transport;

pub use poller::{spawn_input_poller, SharedLaunchpad};
pub use ports::{list_ports, PortList};
pub use transport::MidirTransport;
