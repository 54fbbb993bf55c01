//! Linux backend: evdev for the raw joystick, uinput for the calibrated clone

use crate::bridge::{InputBackend, RawDevice, VirtualOutput};
use crate::error::DeviceError;
use crate::event::Event;
use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AbsInfo, Device, UinputAbsSetup,
};
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Opens `/dev/input/event*` nodes and creates devices through `/dev/uinput`
#[derive(Debug, Default, Clone, Copy)]
pub struct EvdevBackend;

/// Raw joystick device
pub struct EvdevRaw {
    device: Device,
    name: String,
}

impl EvdevRaw {
    pub fn device(&self) -> &Device {
        &self.device
    }
}

/// Calibrated uinput clone
pub struct EvdevVirtual {
    device: VirtualDevice,
}

impl InputBackend for EvdevBackend {
    type Raw = EvdevRaw;
    type Virtual = EvdevVirtual;

    fn open(&self, path: &Path) -> Result<EvdevRaw, DeviceError> {
        let device = Device::open(path).map_err(|source| DeviceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let name = device.name().unwrap_or("Unknown").to_string();
        Ok(EvdevRaw { device, name })
    }

    fn create_virtual(&self, raw: &EvdevRaw, name: &str) -> Result<EvdevVirtual, DeviceError> {
        let dev = &raw.device;

        let mut builder = VirtualDeviceBuilder::new()
            .map_err(DeviceError::from_uinput)?
            .name(name)
            .input_id(dev.input_id());

        if let Some(keys) = dev.supported_keys() {
            builder = builder.with_keys(keys).map_err(DeviceError::from_uinput)?;
        }

        // Axis ranges come from the raw device's current state
        if let Some(axes) = dev.supported_absolute_axes() {
            let state = dev.get_abs_state().map_err(DeviceError::Capabilities)?;
            for axis in axes.iter() {
                let info = &state[axis.0 as usize];
                debug!(
                    "Cloning {:?}: min {}, max {}, fuzz {}, flat {}",
                    axis, info.minimum, info.maximum, info.fuzz, info.flat
                );
                let setup = UinputAbsSetup::new(
                    axis,
                    AbsInfo::new(
                        info.value,
                        info.minimum,
                        info.maximum,
                        info.fuzz,
                        info.flat,
                        info.resolution,
                    ),
                );
                builder = builder
                    .with_absolute_axis(&setup)
                    .map_err(DeviceError::from_uinput)?;
            }
        }

        if let Some(rel) = dev.supported_relative_axes() {
            builder = builder
                .with_relative_axes(rel)
                .map_err(DeviceError::from_uinput)?;
        }

        if let Some(switches) = dev.supported_switches() {
            builder = builder
                .with_switches(switches)
                .map_err(DeviceError::from_uinput)?;
        }

        builder = builder
            .with_properties(dev.properties())
            .map_err(DeviceError::from_uinput)?;

        let device = builder.build().map_err(DeviceError::from_uinput)?;
        Ok(EvdevVirtual { device })
    }
}

impl RawDevice for EvdevRaw {
    fn name(&self) -> &str {
        &self.name
    }

    fn wait_readable(&mut self) -> Result<(), DeviceError> {
        let mut fds = [libc::pollfd {
            fd: self.device.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        }];

        loop {
            let result = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, -1) };
            if result >= 0 {
                return Ok(());
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(DeviceError::Read(err));
            }
        }
    }

    fn read_events(&mut self) -> Result<Vec<Event>, DeviceError> {
        match self.device.fetch_events() {
            Ok(events) => Ok(events.map(Event::from).collect()),
            // Readiness can be spurious
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(Vec::new()),
            Err(e) => Err(DeviceError::Read(e)),
        }
    }
}

impl VirtualOutput for EvdevVirtual {
    fn write_event(&mut self, event: Event) -> Result<(), DeviceError> {
        // `emit` terminates the batch with SYN_REPORT
        self.device
            .emit(&[event.into()])
            .map_err(DeviceError::Write)
    }

    fn dev_node(&mut self) -> Option<PathBuf> {
        self.device
            .enumerate_dev_nodes_blocking()
            .ok()?
            .next()?
            .ok()
    }
}
