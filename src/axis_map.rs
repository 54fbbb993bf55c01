//! Event code to logical axis lookup
//!
//! The table is device specific. A built-in table covers the Saitek Cyborg
//! 3D Gold; other models can supply their own in TOML:
//!
//! ```toml
//! name = "Saitek Cyborg 3D Gold"
//!
//! [[axis]]
//! code = 0
//! index = 0
//! label = "left-right"
//! ```

use crate::error::AxisMapError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// One row of the axis table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisEntry {
    /// `ABS_*` event code reported by the device
    pub code: u16,
    /// Index into the calibration set
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// On-disk representation
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AxisMapFile {
    #[serde(default = "default_name")]
    name: String,
    #[serde(default, rename = "axis")]
    axes: Vec<AxisEntry>,
}

fn default_name() -> String {
    "custom".to_string()
}

/// Immutable mapping from event code to logical axis index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisMap {
    name: String,
    entries: BTreeMap<u16, AxisEntry>,
}

impl AxisMap {
    /// Build a map from entries, rejecting duplicate codes
    pub fn new(
        name: impl Into<String>,
        entries: impl IntoIterator<Item = AxisEntry>,
    ) -> Result<Self, AxisMapError> {
        let mut map = BTreeMap::new();
        for entry in entries {
            let code = entry.code;
            if map.insert(code, entry).is_some() {
                return Err(AxisMapError::DuplicateCode(code));
            }
        }
        Ok(Self {
            name: name.into(),
            entries: map,
        })
    }

    /// Table for the Saitek Cyborg 3D Gold
    pub fn cyborg_3d_gold() -> Self {
        const AXES: [(u16, usize, &str); 6] = [
            (0, 0, "left-right"),
            (1, 1, "back-front"),
            (5, 2, "rotate left-right"),
            (6, 3, "throttle back-front"),
            (16, 4, "thumb hat left-right"),
            (17, 5, "thumb hat back-front"),
        ];

        let entries = AXES
            .iter()
            .map(|&(code, index, label)| {
                (
                    code,
                    AxisEntry {
                        code,
                        index,
                        label: Some(label.to_string()),
                    },
                )
            })
            .collect();

        Self {
            name: "Saitek Cyborg 3D Gold".to_string(),
            entries,
        }
    }

    /// Parse a TOML axis table
    pub fn from_toml(text: &str) -> Result<Self, AxisMapError> {
        let file: AxisMapFile = toml::from_str(text)?;
        Self::new(file.name, file.axes)
    }

    /// Load a TOML axis table from disk
    pub fn load(path: &Path) -> Result<Self, AxisMapError> {
        let text = std::fs::read_to_string(path).map_err(|source| AxisMapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Serialize back to the TOML file format
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        let file = AxisMapFile {
            name: self.name.clone(),
            axes: self.entries.values().cloned().collect(),
        };
        toml::to_string_pretty(&file)
    }

    /// Logical axis index for an event code
    pub fn lookup(&self, code: u16) -> Option<usize> {
        self.entries.get(&code).map(|e| e.index)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entries ordered by event code
    pub fn entries(&self) -> impl Iterator<Item = &AxisEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AxisMap {
    fn default() -> Self {
        Self::cyborg_3d_gold()
    }
}

impl fmt::Display for AxisEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code {} -> axis {}", self.code, self.index)?;
        if let Some(label) = &self.label {
            write!(f, " ({label})")?;
        }
        Ok(())
    }
}
