use launchpad_core::{LaunchpadError, MidiTransport, Result, Settings};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use tokio::sync::mpsc;

use crate::ports::find_port;

/// Launchpad transport over `midir` ports.
///
/// Incoming messages are queued by the input callback and handed out by
/// [`poll_incoming_messages`](MidiTransport::poll_incoming_messages).
pub struct MidirTransport {
    output: MidiOutputConnection,
    _input: MidiInputConnection<()>,
    incoming: mpsc::UnboundedReceiver<Vec<u8>>,
    port_name: String,
}

impl MidirTransport {
    /// Connect to the first input and output ports matching
    /// `settings.device_pattern`.
    pub fn connect(settings: &Settings) -> Result<Self> {
        let pattern = settings.device_pattern.as_str();

        let mut midi_in = MidiInput::new(&format!("{}_in", settings.client_name))
            .map_err(|e| LaunchpadError::Transport(e.to_string()))?;
        // Clock and active sensing never reach the session; SysEx does
        midi_in.ignore(Ignore::TimeAndActiveSense);

        let (in_port, in_name) = find_port(&midi_in, pattern)?;

        let (tx, incoming) = mpsc::unbounded_channel();
        let input = midi_in
            .connect(
                &in_port,
                "launchpad-input",
                move |_timestamp, message, _| {
                    // Receiver gone means the transport is being dropped
                    let _ = tx.send(message.to_vec());
                },
                (),
            )
            .map_err(|e| LaunchpadError::Transport(e.to_string()))?;

        let midi_out = MidiOutput::new(&format!("{}_out", settings.client_name))
            .map_err(|e| LaunchpadError::Transport(e.to_string()))?;
        let (out_port, out_name) = find_port(&midi_out, pattern)?;
        let output = midi_out
            .connect(&out_port, "launchpad-output")
            .map_err(|e| LaunchpadError::Transport(e.to_string()))?;

        log::info!("Launchpad MIDI connected (in: {}, out: {})", in_name, out_name);

        Ok(Self {
            output,
            _input: input,
            incoming,
            port_name: out_name,
        })
    }

    /// Name of the connected output port.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl MidiTransport for MidirTransport {
    fn write_command(&mut self, bytes: &[u8]) -> Result<()> {
        self.output
            .send(bytes)
            .map_err(|e| LaunchpadError::Transport(format!("Failed to send MIDI: {}", e)))
    }

    fn poll_incoming_messages(&mut self) -> Result<Vec<Vec<u8>>> {
        let mut messages = Vec::new();
        loop {
            match self.incoming.try_recv() {
                Ok(message) => messages.push(message),
                Err(mpsc::error::TryRecvError::Empty) => return Ok(messages),
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    return if messages.is_empty() {
                        Err(LaunchpadError::NotConnected)
                    } else {
                        Ok(messages)
                    };
                }
            }
        }
    }
}
