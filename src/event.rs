//! Backend-independent input event

use evdev::{EventType, InputEvent};
use std::fmt;

/// `EV_ABS`: absolute axis motion
pub const EV_ABS: u16 = EventType::ABSOLUTE.0;
/// `EV_SYN`: synchronization frame
pub const EV_SYN: u16 = EventType::SYNCHRONIZATION.0;
/// `SYN_REPORT` code within `EV_SYN`
pub const SYN_REPORT: u16 = 0;

/// A single (type, code, value) input event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Event {
    pub kind: u16,
    pub code: u16,
    pub value: i32,
}

impl Event {
    pub const fn new(kind: u16, code: u16, value: i32) -> Self {
        Self { kind, code, value }
    }

    /// Absolute axis event
    pub const fn motion(code: u16, value: i32) -> Self {
        Self::new(EV_ABS, code, value)
    }

    /// The marker that closes a frame
    pub const fn syn_report() -> Self {
        Self::new(EV_SYN, SYN_REPORT, 0)
    }

    pub fn is_motion(&self) -> bool {
        self.kind == EV_ABS
    }

    /// Same event with a different value
    pub fn with_value(self, value: i32) -> Self {
        Self { value, ..self }
    }
}

impl From<InputEvent> for Event {
    fn from(ev: InputEvent) -> Self {
        Self::new(ev.event_type().0, ev.code(), ev.value())
    }
}

impl From<Event> for InputEvent {
    fn from(ev: Event) -> Self {
        InputEvent::new(EventType(ev.kind), ev.code, ev.value)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type {:02}, code {:02}, value {:02}",
            self.kind, self.code, self.value
        )
    }
}
