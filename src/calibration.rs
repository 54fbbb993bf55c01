//! Per-axis deadzone/scale correction and the `jscal -p` descriptor loader
//!
//! The descriptor is the single line printed by `jscal -p`, e.g.
//!
//! ```text
//! jscal -s 2,1,1,90,91,9418500,8947575,1,1,32,150,-8947575,-8521500 /dev/input/js0
//! ```
//!
//! The third token holds the axis count followed by six integers per axis:
//! `[type, precision, deadzone_low, deadzone_high, scale_low, scale_high]`.
//! Only the last four take part in the correction.

use crate::error::{CalibrationError, FormatError};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Integers per axis record in the coefficient list
const GROUP_LEN: usize = 6;

/// Fixed normalization constants. The output is centred on 128, which is
/// what sdl2-jstest and games expect from this joystick; keep them verbatim.
const SCALE_DIVISOR: f64 = 16384.0;
const OUTPUT_DIVISOR: f64 = 256.0;
const OUTPUT_CENTER: f64 = 128.0;

/// Correction parameters for a single axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationProfile {
    /// Raw values below this are corrected with `scale_low`
    pub deadzone_low: i32,
    /// Raw values above this are corrected with `scale_high`
    pub deadzone_high: i32,
    pub scale_low: i32,
    pub scale_high: i32,
}

impl CalibrationProfile {
    pub fn new(deadzone_low: i32, deadzone_high: i32, scale_low: i32, scale_high: i32) -> Self {
        Self {
            deadzone_low,
            deadzone_high,
            scale_low,
            scale_high,
        }
    }

    /// Map a raw axis reading to its corrected value
    ///
    /// Values inside `[deadzone_low, deadzone_high]` map to 128. Halfway
    /// results round to the even integer.
    pub fn apply(&self, raw: i32) -> i32 {
        let raw = i64::from(raw);
        let low = i64::from(self.deadzone_low);
        let high = i64::from(self.deadzone_high);

        // Exact integer product, a single rounding on the way to f64
        let correction: i128 = if raw < low {
            -i128::from(self.scale_low) * i128::from(low - raw)
        } else if raw > high {
            i128::from(self.scale_high) * i128::from(raw - high)
        } else {
            0
        };

        let y = correction as f64 / SCALE_DIVISOR;
        let y = y / OUTPUT_DIVISOR + OUTPUT_CENTER;
        y.round_ties_even() as i32
    }
}

impl fmt::Display for CalibrationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "deadzone [{}, {}], scale low {}, scale high {}",
            self.deadzone_low, self.deadzone_high, self.scale_low, self.scale_high
        )
    }
}

/// Calibration profiles indexed by logical axis (0-based, contiguous)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalibrationSet {
    profiles: Vec<CalibrationProfile>,
}

impl CalibrationSet {
    /// Parse descriptor text
    ///
    /// Only the first line is considered. Fails unless the coefficient list
    /// holds exactly as many six-integer groups as the declared axis count.
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        let line = text.lines().next().ok_or(FormatError::Empty)?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(FormatError::Empty);
        }
        let coefficients = tokens
            .get(2)
            .ok_or(FormatError::MissingCoefficients(tokens.len()))?;

        let numbers = coefficients
            .split(',')
            .enumerate()
            .map(|(position, token)| {
                token.parse::<i32>().map_err(|_| FormatError::InvalidNumber {
                    position,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // `split` always yields at least one item
        let (&count, values) = numbers
            .split_first()
            .ok_or(FormatError::InvalidAxisCount(0))?;
        let declared =
            usize::try_from(count).map_err(|_| FormatError::InvalidAxisCount(count))?;

        if values.len() % GROUP_LEN != 0 {
            return Err(FormatError::IncompleteGroup(values.len()));
        }

        let profiles: Vec<_> = values
            .chunks_exact(GROUP_LEN)
            .map(|group| CalibrationProfile::new(group[2], group[3], group[4], group[5]))
            .collect();

        if profiles.len() != declared {
            return Err(FormatError::AxisCountMismatch {
                declared,
                parsed: profiles.len(),
            });
        }

        Ok(Self { profiles })
    }

    /// Read and parse a calibration file, logging every loaded axis
    pub fn load(path: &Path) -> Result<Self, CalibrationError> {
        let text = std::fs::read_to_string(path).map_err(|source| CalibrationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let set = Self::parse(&text)?;

        info!("Loaded calibration for {} axes:", set.len());
        for (axis, profile) in set.iter() {
            info!("- axis {}: {}", axis, profile);
        }

        Ok(set)
    }

    /// Profile for a logical axis index
    pub fn get(&self, axis: usize) -> Option<&CalibrationProfile> {
        self.profiles.get(axis)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Iterate `(axis, profile)` pairs in axis order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &CalibrationProfile)> {
        self.profiles.iter().enumerate()
    }
}

impl FromStr for CalibrationSet {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Vec<CalibrationProfile>> for CalibrationSet {
    fn from(profiles: Vec<CalibrationProfile>) -> Self {
        Self { profiles }
    }
}
