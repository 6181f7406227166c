//! Gesture label table

use serde::{Deserialize, Serialize};

/// Number of gesture classes the model distinguishes
pub const NUM_CLASSES: usize = 8;

/// Class names, index-aligned with the model output
pub const GESTURE_LABELS: [&str; NUM_CLASSES] =
    ["palm", "l", "fist", "thumb", "index", "ok", "c", "down"];

/// Hand gesture recognized by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    Palm,
    L,
    Fist,
    Thumb,
    Index,
    Ok,
    C,
    Down,
}

impl Gesture {
    /// All gestures in output order
    pub const ALL: [Gesture; NUM_CLASSES] = [
        Gesture::Palm,
        Gesture::L,
        Gesture::Fist,
        Gesture::Thumb,
        Gesture::Index,
        Gesture::Ok,
        Gesture::C,
        Gesture::Down,
    ];

    /// Position in the model output
    pub fn index(self) -> usize {
        self as usize
    }

    /// Gesture at an output position
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        GESTURE_LABELS[self.index()]
    }
}
