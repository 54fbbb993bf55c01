//! Joystick deadzone/scale calibration through a uinput clone
//!
//! Reads a physical joystick's evdev events, corrects absolute axis values
//! with the coefficients printed by `jscal -p`, and re-emits everything on a
//! virtual device named "Calibrated <original name>".

pub mod axis_map;
pub mod bridge;
pub mod calibration;
pub mod error;
pub mod evdev_backend;
pub mod event;
pub mod memory_backend;
pub mod redirect;

pub use axis_map::{AxisEntry, AxisMap};
pub use bridge::{virtual_name, DeviceBridge, InputBackend, RawDevice, VirtualOutput};
pub use calibration::{CalibrationProfile, CalibrationSet};
pub use error::{AxisMapError, CalibrationError, DeviceError, FormatError, RedirectError};
pub use evdev_backend::EvdevBackend;
pub use event::Event;
pub use memory_backend::{MemoryBackend, MemoryOutput, MemoryRaw};
pub use redirect::{EventFilter, EventRedirector, RedirectOptions, StopSignal};
