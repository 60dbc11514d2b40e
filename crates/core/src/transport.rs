//! Raw MIDI transport and running-status output.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;

/// Byte-level access to a device.
///
/// Implementations deliver one complete, status-prefixed message per entry
/// from [`poll_incoming_messages`](MidiTransport::poll_incoming_messages);
/// running-status expansion and realtime filtering happen there, not in the
/// session.
pub trait MidiTransport {
    /// Write one (possibly status-less) command to the device.
    fn write_command(&mut self, bytes: &[u8]) -> Result<()>;

    /// Return every message received since the previous call. Never blocks.
    fn poll_incoming_messages(&mut self) -> Result<Vec<Vec<u8>>>;
}

impl<T: MidiTransport + ?Sized> MidiTransport for Box<T> {
    fn write_command(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_command(bytes)
    }

    fn poll_incoming_messages(&mut self) -> Result<Vec<Vec<u8>>> {
        (**self).poll_incoming_messages()
    }
}

/// Wraps a transport and omits repeated status bytes.
///
/// Only the status sequences the session produces (repeated note-on,
/// controller and rapid update commands) are known to be safe with the
/// device's running-status handling.
pub struct MessageTransport<T> {
    transport: T,
    last_sent_command: Option<u8>,
}

impl<T: MidiTransport> MessageTransport<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            last_sent_command: None,
        }
    }

    /// Send `command` followed by `data`, dropping the status byte when it
    /// repeats the previous one.
    pub fn send(&mut self, command: u8, data: &[u8]) -> Result<()> {
        if self.last_sent_command == Some(command) {
            log::trace!("-> (running {:02X}) {:02X?}", command, data);
            return self.transport.write_command(data);
        }

        let mut message = Vec::with_capacity(data.len() + 1);
        message.push(command);
        message.extend_from_slice(data);
        log::trace!("-> {:02X?}", message);

        self.transport.write_command(&message)?;
        self.last_sent_command = Some(command);
        Ok(())
    }

    /// Send a complete SysEx message. SysEx cancels running status, so the
    /// next command always carries its status byte.
    pub fn send_sysex(&mut self, message: &[u8]) -> Result<()> {
        log::trace!("-> {:02X?}", message);
        self.last_sent_command = None;
        self.transport.write_command(message)
    }

    pub fn last_sent_command(&self) -> Option<u8> {
        self.last_sent_command
    }

    pub fn poll(&mut self) -> Result<Vec<Vec<u8>>> {
        self.transport.poll_incoming_messages()
    }

    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

#[derive(Default)]
struct Recording {
    written: Vec<Vec<u8>>,
    incoming: VecDeque<Vec<u8>>,
}

/// In-memory transport for tests and dry runs.
///
/// Clones share the same log, so a handle kept by the test still sees the
/// writes a session makes while it is dropped.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    inner: Arc<Mutex<Recording>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write so far, one entry per `write_command` call.
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.inner.lock().written.clone()
    }

    /// Drain the write log.
    pub fn take_written(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.inner.lock().written)
    }

    /// Queue a message to be returned by the next poll.
    pub fn push_incoming(&self, message: &[u8]) {
        self.inner.lock().incoming.push_back(message.to_vec());
    }
}

impl MidiTransport for RecordingTransport {
    fn write_command(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.lock().written.push(bytes.to_vec());
        Ok(())
    }

    fn poll_incoming_messages(&mut self) -> Result<Vec<Vec<u8>>> {
        Ok(self.inner.lock().incoming.drain(..).collect())
    }
}
