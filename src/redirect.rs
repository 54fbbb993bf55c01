//! The read/correct/write loop
//!
//! Waits on the raw device, drains each batch in order, corrects absolute
//! axis events and forwards everything through the bridge one event at a
//! time. Any device error ends the loop.

use crate::axis_map::AxisMap;
use crate::bridge::{DeviceBridge, RawDevice, VirtualOutput};
use crate::calibration::CalibrationSet;
use crate::error::RedirectError;
use crate::event::Event;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Which events get a diagnostic trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFilter {
    /// Trace every motion event
    #[default]
    All,
    /// Trace only events with this code
    Code(u16),
}

impl EventFilter {
    /// Convert the command line form, where `-1` means no filter
    pub fn from_sentinel(code: i32) -> Self {
        u16::try_from(code).map_or(EventFilter::All, EventFilter::Code)
    }

    pub fn matches(&self, code: u16) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Code(filter) => *filter == code,
        }
    }
}

/// Runtime switches for the redirector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RedirectOptions {
    /// Forward raw values without applying calibration
    pub dry_run: bool,
    pub filter: EventFilter,
}

/// Cooperative stop request, checked between event batches
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Applies per-axis calibration to a device's event stream
pub struct EventRedirector<'a> {
    calibration: &'a CalibrationSet,
    axes: &'a AxisMap,
    options: RedirectOptions,
}

impl<'a> EventRedirector<'a> {
    /// Fails if an axis in `axes` has no calibration profile
    pub fn new(
        calibration: &'a CalibrationSet,
        axes: &'a AxisMap,
        options: RedirectOptions,
    ) -> Result<Self, RedirectError> {
        for entry in axes.entries() {
            if calibration.get(entry.index).is_none() {
                return Err(RedirectError::MissingProfile {
                    code: entry.code,
                    axis: entry.index,
                    available: calibration.len(),
                });
            }
        }

        Ok(Self {
            calibration,
            axes,
            options,
        })
    }

    pub fn options(&self) -> RedirectOptions {
        self.options
    }

    /// Corrected form of a single event
    ///
    /// Non-motion events and motion events on unmapped codes are returned
    /// unchanged.
    pub fn correct(&self, event: Event) -> Event {
        if !event.is_motion() {
            return event;
        }

        let Some(axis) = self.axes.lookup(event.code) else {
            if self.options.filter.matches(event.code) {
                debug!("{}\t-> No axis mapping, passed through", event);
            }
            return event;
        };

        let adjusted = if self.options.dry_run {
            event.value
        } else {
            self.calibration
                .get(axis)
                .map_or(event.value, |profile| profile.apply(event.value))
        };

        if self.options.filter.matches(event.code) {
            debug!("{}\t-> Adjusted value: {}", event, adjusted);
        }

        event.with_value(adjusted)
    }

    /// Run until `stop` is raised or a device operation fails
    ///
    /// `stop` is only checked between batches; the readiness wait itself
    /// blocks without a timeout.
    pub fn run<R, V>(
        &self,
        bridge: &mut DeviceBridge<R, V>,
        stop: &StopSignal,
    ) -> Result<(), RedirectError>
    where
        R: RawDevice,
        V: VirtualOutput,
    {
        info!(
            "Redirecting events{}",
            if self.options.dry_run {
                " (dry run, calibration not applied)"
            } else {
                ""
            }
        );

        while !stop.is_raised() {
            bridge.wait_readable()?;
            for event in bridge.read_events()? {
                bridge.emit(self.correct(event))?;
            }
        }

        info!("Stop requested, leaving redirect loop");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis_map::AxisEntry;
    use crate::calibration::CalibrationProfile;
    use crate::event::EV_SYN;
    use crate::memory_backend::{MemoryOutput, MemoryRaw};

    fn calibration() -> CalibrationSet {
        "jscal -s 2,1,1,90,91,9418500,8947575,1,1,32,150,-8947575,-8521500 /dev/input/js0"
            .parse()
            .unwrap()
    }

    fn two_axis_map() -> AxisMap {
        AxisMap::new(
            "test",
            [
                AxisEntry {
                    code: 0,
                    index: 0,
                    label: None,
                },
                AxisEntry {
                    code: 1,
                    index: 1,
                    label: None,
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_filter_from_sentinel() {
        assert_eq!(EventFilter::from_sentinel(-1), EventFilter::All);
        assert_eq!(EventFilter::from_sentinel(5), EventFilter::Code(5));
        assert!(EventFilter::All.matches(17));
        assert!(EventFilter::Code(5).matches(5));
        assert!(!EventFilter::Code(5).matches(6));
    }

    #[test]
    fn test_missing_profile_rejected() {
        let cal = calibration();
        let axes = AxisMap::cyborg_3d_gold();
        let err = EventRedirector::new(&cal, &axes, RedirectOptions::default())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            RedirectError::MissingProfile {
                code: 5,
                axis: 2,
                available: 2
            }
        ));
    }

    #[test]
    fn test_correct_applies_profile() {
        let cal = calibration();
        let axes = two_axis_map();
        let redirector = EventRedirector::new(&cal, &axes, RedirectOptions::default()).unwrap();

        assert_eq!(redirector.correct(Event::motion(0, 10)), Event::motion(0, -52));
        assert_eq!(redirector.correct(Event::motion(1, 32)), Event::motion(1, 128));
    }

    #[test]
    fn test_correct_uses_axis_map_index() {
        let cal = CalibrationSet::from(vec![
            CalibrationProfile::new(0, 0, 0, 0),
            CalibrationProfile::new(90, 91, 9418500, 8947575),
        ]);
        let axes = AxisMap::new(
            "swapped",
            [AxisEntry {
                code: 7,
                index: 1,
                label: None,
            }],
        )
        .unwrap();
        let redirector = EventRedirector::new(&cal, &axes, RedirectOptions::default()).unwrap();
        assert_eq!(redirector.correct(Event::motion(7, 10)).value, -52);
    }

    #[test]
    fn test_dry_run_keeps_raw_value() {
        let cal = calibration();
        let axes = two_axis_map();
        let options = RedirectOptions {
            dry_run: true,
            ..Default::default()
        };
        let redirector = EventRedirector::new(&cal, &axes, options).unwrap();
        for raw in [0, 10, 90, 91, 200, 255] {
            assert_eq!(redirector.correct(Event::motion(0, raw)).value, raw);
        }
    }

    #[test]
    fn test_non_motion_passthrough() {
        let cal = calibration();
        let axes = two_axis_map();
        let redirector = EventRedirector::new(&cal, &axes, RedirectOptions::default()).unwrap();

        let button = Event::new(1, 288, 1);
        assert_eq!(redirector.correct(button), button);
        assert_eq!(redirector.correct(Event::syn_report()), Event::syn_report());
    }

    #[test]
    fn test_unmapped_motion_passthrough() {
        let cal = calibration();
        let axes = two_axis_map();
        let redirector = EventRedirector::new(&cal, &axes, RedirectOptions::default()).unwrap();
        assert_eq!(redirector.correct(Event::motion(40, 3)), Event::motion(40, 3));
    }

    #[test]
    fn test_run_stops_on_signal() {
        let cal = calibration();
        let axes = two_axis_map();
        let redirector = EventRedirector::new(&cal, &axes, RedirectOptions::default()).unwrap();

        let stop = StopSignal::new();
        let raw = MemoryRaw::new("stick", vec![vec![Event::motion(0, 10), Event::syn_report()]])
            .stop_when_drained(stop.clone());
        let mut bridge = DeviceBridge::from_parts(raw, MemoryOutput::new("out"));

        redirector.run(&mut bridge, &stop).unwrap();
        assert!(stop.is_raised());

        let written = bridge.output().written();
        assert_eq!(written.len(), 4);
        assert_eq!(written[0], Event::motion(0, -52));
        assert_eq!(written[1].kind, EV_SYN);
        assert_eq!(written[2], Event::syn_report());
        assert_eq!(written[3], Event::syn_report());
    }

    #[test]
    fn test_run_returns_immediately_when_already_stopped() {
        let cal = calibration();
        let axes = two_axis_map();
        let redirector = EventRedirector::new(&cal, &axes, RedirectOptions::default()).unwrap();

        let stop = StopSignal::new();
        stop.raise();
        let raw = MemoryRaw::new("stick", vec![vec![Event::motion(0, 10)]]);
        let mut bridge = DeviceBridge::from_parts(raw, MemoryOutput::new("out"));

        redirector.run(&mut bridge, &stop).unwrap();
        assert!(bridge.output().written().is_empty());
    }
}
