use serde::{Deserialize, Serialize};

/// Durations offered by the picker, in minutes.
pub const PRESET_MINUTES: [u32; 6] = [15, 30, 60, 120, 240, 480];

/// Preset selected when nothing else is chosen.
pub const DEFAULT_MINUTES: u32 = 60;

/// A block length in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockDuration(u32);

impl BlockDuration {
    pub fn from_minutes(minutes: u32) -> Self {
        Self(minutes)
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    /// Get duration in seconds.
    pub fn secs(self) -> i64 {
        i64::from(self.0) * 60
    }

    pub fn presets() -> Vec<BlockDuration> {
        PRESET_MINUTES.iter().copied().map(Self).collect()
    }

    /// Picker label: "N minutes" under an hour, whole hours otherwise.
    pub fn label(self) -> String {
        if self.0 < 60 {
            format!("{} minutes", self.0)
        } else {
            format!("{} hours", self.0 / 60)
        }
    }
}

impl Default for BlockDuration {
    fn default() -> Self {
        Self(DEFAULT_MINUTES)
    }
}
