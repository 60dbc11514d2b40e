use launchpad_core::{device_name_matches, LaunchpadError, Result};
use midir::{MidiIO, MidiInput, MidiOutput};

/// Names of the MIDI ports currently visible.
#[derive(Debug, Clone, Default)]
pub struct PortList {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

impl PortList {
    /// Input and output names matching `pattern`.
    pub fn matching(&self, pattern: &str) -> PortList {
        let filter = |names: &[String]| -> Vec<String> {
            names
                .iter()
                .filter(|name| device_name_matches(pattern, name))
                .cloned()
                .collect()
        };
        PortList {
            inputs: filter(&self.inputs),
            outputs: filter(&self.outputs),
        }
    }
}

pub fn list_ports(client_name: &str) -> Result<PortList> {
    let midi_in =
        MidiInput::new(client_name).map_err(|e| LaunchpadError::Transport(e.to_string()))?;
    let midi_out =
        MidiOutput::new(client_name).map_err(|e| LaunchpadError::Transport(e.to_string()))?;

    Ok(PortList {
        inputs: port_names(&midi_in),
        outputs: port_names(&midi_out),
    })
}

fn port_names<T: MidiIO>(io: &T) -> Vec<String> {
    io.ports()
        .iter()
        .filter_map(|port| io.port_name(port).ok())
        .collect()
}

/// First port whose name matches `pattern`, with its name.
pub(crate) fn find_port<T: MidiIO>(io: &T, pattern: &str) -> Result<(T::Port, String)> {
    io.ports()
        .into_iter()
        .find_map(|port| {
            let name = io.port_name(&port).ok()?;
            device_name_matches(pattern, &name).then_some((port, name))
        })
        .ok_or_else(|| LaunchpadError::PortNotFound(pattern.to_string()))
}
