//! Device capability interface and the bridge owning both device handles
//!
//! The redirect loop only sees [`DeviceBridge`]; platform specifics live in
//! an [`InputBackend`] implementation (evdev/uinput on Linux, in-memory for
//! tests).

use crate::error::DeviceError;
use crate::event::Event;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A physical input device opened for reading
pub trait RawDevice {
    /// Name reported by the device
    fn name(&self) -> &str;

    /// Block until at least one event is pending. No timeout.
    fn wait_readable(&mut self) -> Result<(), DeviceError>;

    /// Drain all currently pending events, in the order the device reported them
    fn read_events(&mut self) -> Result<Vec<Event>, DeviceError>;
}

/// A synthesized output device
pub trait VirtualOutput {
    /// Write one event followed by a `SYN_REPORT` marker
    fn write_event(&mut self, event: Event) -> Result<(), DeviceError>;

    /// Device node of the created device, if it can be resolved
    fn dev_node(&mut self) -> Option<PathBuf> {
        None
    }
}

/// Factory for raw and virtual devices
pub trait InputBackend {
    type Raw: RawDevice;
    type Virtual: VirtualOutput;

    /// Open the raw device at `path`
    fn open(&self, path: &Path) -> Result<Self::Raw, DeviceError>;

    /// Create a virtual device with the raw device's capabilities
    ///
    /// Fails with [`DeviceError::PermissionDenied`] when the platform refuses
    /// to create the device.
    fn create_virtual(&self, raw: &Self::Raw, name: &str) -> Result<Self::Virtual, DeviceError>;
}

/// Name given to the virtual clone of a raw device
pub fn virtual_name(raw_name: &str) -> String {
    format!("Calibrated {raw_name}")
}

/// Owns the raw input handle and the virtual output handle
pub struct DeviceBridge<R, V> {
    raw: R,
    output: V,
}

impl<R: RawDevice, V: VirtualOutput> DeviceBridge<R, V> {
    /// Open the raw device and create its calibrated virtual clone
    pub fn open<B>(backend: &B, path: &Path) -> Result<Self, DeviceError>
    where
        B: InputBackend<Raw = R, Virtual = V>,
    {
        let raw = backend.open(path)?;
        info!("Opened {}: {}", path.display(), raw.name());

        let name = virtual_name(raw.name());
        let mut output = backend.create_virtual(&raw, &name)?;
        match output.dev_node() {
            Some(node) => info!("Redirecting fixed stream to {} ({})", node.display(), name),
            None => warn!("Created \"{}\" but could not resolve its device node", name),
        }

        Ok(Self { raw, output })
    }

    /// Assemble a bridge from already opened handles
    pub fn from_parts(raw: R, output: V) -> Self {
        Self { raw, output }
    }

    pub fn wait_readable(&mut self) -> Result<(), DeviceError> {
        self.raw.wait_readable()
    }

    pub fn read_events(&mut self) -> Result<Vec<Event>, DeviceError> {
        self.raw.read_events()
    }

    /// Forward one event, framed by a sync marker
    pub fn emit(&mut self, event: Event) -> Result<(), DeviceError> {
        self.output.write_event(event)
    }

    pub fn raw(&self) -> &R {
        &self.raw
    }

    pub fn output(&self) -> &V {
        &self.output
    }

    pub fn into_parts(self) -> (R, V) {
        (self.raw, self.output)
    }
}
