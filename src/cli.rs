// CLI definitions using clap

use clap::Parser;
use joystick_calib::{EventFilter, RedirectOptions};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "joystick-calib")]
#[command(author, version, about = "Apply jscal calibration to a joystick through a virtual device")]
pub struct Cli {
    /// Input event device of the physical joystick
    #[arg(long, value_name = "PATH", default_value = "/dev/input/event28")]
    pub input_dev: PathBuf,

    /// Calibration file (output of `jscal -p`)
    #[arg(long, value_name = "FILE", default_value = "cal.txt")]
    pub calib_file: PathBuf,

    /// Print verbose debugging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Only trace events with this event code (-1 traces all)
    #[arg(
        long,
        value_name = "CODE",
        default_value_t = -1,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i32).range(-1..=65535)
    )]
    pub filter_evcode: i32,

    /// Do not apply calibration, just pass events through
    #[arg(long)]
    pub dry_run: bool,

    /// TOML axis table replacing the built-in Saitek Cyborg 3D Gold map
    #[arg(long, value_name = "FILE")]
    pub axis_map: Option<PathBuf>,
}

impl Cli {
    pub fn redirect_options(&self) -> RedirectOptions {
        RedirectOptions {
            dry_run: self.dry_run,
            filter: EventFilter::from_sentinel(self.filter_evcode),
        }
    }
}
