//! Joystick calibration redirector
//!
//! Loads the calibration, clones the joystick through uinput and forwards
//! corrected events until interrupted.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info, warn};

use joystick_calib::{
    AxisMap, CalibrationSet, DeviceBridge, DeviceError, EvdevBackend, EventRedirector, StopSignal,
};

mod cli;
use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let calibration = CalibrationSet::load(&cli.calib_file)?;

    let axes = match &cli.axis_map {
        Some(path) => AxisMap::load(path)?,
        None => AxisMap::default(),
    };
    info!("Using axis map: {}", axes.name());
    for entry in axes.entries() {
        debug!("- {}", entry);
    }

    let redirector = EventRedirector::new(&calibration, &axes, cli.redirect_options())
        .context("Calibration file does not cover the axis map")?;

    let mut bridge = match DeviceBridge::open(&EvdevBackend, &cli.input_dev) {
        Ok(bridge) => bridge,
        Err(DeviceError::PermissionDenied(e)) => {
            error!("Cannot create the virtual joystick: {}", e);
            error!("Run this command as root, or give your user write access to /dev/uinput");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let stop = setup_interrupt_handler();
    redirector.run(&mut bridge, &stop)?;

    Ok(())
}

/// Raise the stop signal on Ctrl-C; a second Ctrl-C exits immediately.
///
/// The loop only sees the signal once the joystick produces another batch.
fn setup_interrupt_handler() -> StopSignal {
    let stop = StopSignal::new();
    let handler_stop = stop.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        if handler_stop.is_raised() {
            std::process::exit(130);
        }
        info!("Interrupted, stopping after the next event (Ctrl+C again to exit now)");
        handler_stop.raise();
    }) {
        warn!("Could not set Ctrl+C handler: {}", e);
    }

    stop
}
