//! In-memory backend: replays scripted event batches and records output
//!
//! Used to drive the redirect loop without `/dev/input` or `/dev/uinput`.

use crate::bridge::{InputBackend, RawDevice, VirtualOutput};
use crate::error::DeviceError;
use crate::event::Event;
use crate::redirect::StopSignal;
use std::collections::VecDeque;
use std::io;
use std::path::Path;

/// Raw device that yields pre-recorded batches
pub struct MemoryRaw {
    name: String,
    batches: VecDeque<Vec<Event>>,
    pending: Option<Vec<Event>>,
    stop_when_drained: Option<StopSignal>,
}

impl MemoryRaw {
    pub fn new(name: &str, batches: Vec<Vec<Event>>) -> Self {
        Self {
            name: name.to_string(),
            batches: batches.into(),
            pending: None,
            stop_when_drained: None,
        }
    }

    /// Raise `stop` instead of failing once every batch has been read
    pub fn stop_when_drained(mut self, stop: StopSignal) -> Self {
        self.stop_when_drained = Some(stop);
        self
    }
}

impl RawDevice for MemoryRaw {
    fn name(&self) -> &str {
        &self.name
    }

    fn wait_readable(&mut self) -> Result<(), DeviceError> {
        if self.pending.is_some() {
            return Ok(());
        }
        if let Some(batch) = self.batches.pop_front() {
            self.pending = Some(batch);
            return Ok(());
        }
        match &self.stop_when_drained {
            Some(stop) => {
                stop.raise();
                Ok(())
            }
            // A real device would block forever; report it as gone instead
            None => Err(DeviceError::Read(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no more recorded events",
            ))),
        }
    }

    fn read_events(&mut self) -> Result<Vec<Event>, DeviceError> {
        Ok(self.pending.take().unwrap_or_default())
    }
}

/// Virtual device that records every event written to it
#[derive(Debug, Default)]
pub struct MemoryOutput {
    name: String,
    written: Vec<Event>,
    fail_after: Option<usize>,
}

impl MemoryOutput {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Fail every write after `count` successful ones
    pub fn fail_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Everything written so far, sync markers included
    pub fn written(&self) -> &[Event] {
        &self.written
    }

    /// Written events with the sync marker following each one removed
    pub fn forwarded(&self) -> Vec<Event> {
        self.written.chunks(2).map(|frame| frame[0]).collect()
    }
}

impl VirtualOutput for MemoryOutput {
    fn write_event(&mut self, event: Event) -> Result<(), DeviceError> {
        if let Some(limit) = self.fail_after {
            if self.written.len() / 2 >= limit {
                return Err(DeviceError::Write(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "virtual device closed",
                )));
            }
        }
        self.written.push(event);
        self.written.push(Event::syn_report());
        Ok(())
    }
}

/// Backend producing [`MemoryRaw`] and [`MemoryOutput`] handles
pub struct MemoryBackend {
    name: String,
    batches: Vec<Vec<Event>>,
    deny_uinput: bool,
}

impl MemoryBackend {
    pub fn new(name: &str, batches: Vec<Vec<Event>>) -> Self {
        Self {
            name: name.to_string(),
            batches,
            deny_uinput: false,
        }
    }

    /// Refuse virtual device creation as an unprivileged user would see it
    pub fn deny_uinput(mut self) -> Self {
        self.deny_uinput = true;
        self
    }
}

impl InputBackend for MemoryBackend {
    type Raw = MemoryRaw;
    type Virtual = MemoryOutput;

    fn open(&self, _path: &Path) -> Result<MemoryRaw, DeviceError> {
        Ok(MemoryRaw::new(&self.name, self.batches.clone()))
    }

    fn create_virtual(&self, _raw: &MemoryRaw, name: &str) -> Result<MemoryOutput, DeviceError> {
        if self.deny_uinput {
            return Err(DeviceError::from_uinput(io::Error::from(
                io::ErrorKind::PermissionDenied,
            )));
        }
        Ok(MemoryOutput::new(name))
    }
}
