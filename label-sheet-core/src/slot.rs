//! The four placement slots of a sheet

use crate::error::{LabelSheetError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four label positions, numbered 1-4 in reading order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Slot {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Slot {
    /// All slots in numbering order
    pub const ALL: [Slot; 4] = [
        Slot::TopLeft,
        Slot::TopRight,
        Slot::BottomLeft,
        Slot::BottomRight,
    ];

    /// Look up a slot by its 1-based number
    pub fn from_number(number: u8) -> Result<Self> {
        match number {
            1 => Ok(Slot::TopLeft),
            2 => Ok(Slot::TopRight),
            3 => Ok(Slot::BottomLeft),
            4 => Ok(Slot::BottomRight),
            other => Err(LabelSheetError::InvalidSlot(other.to_string())),
        }
    }

    /// 1-based slot number
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    /// 0-based index into [`Slot::ALL`]
    pub fn index(self) -> usize {
        match self {
            Slot::TopLeft => 0,
            Slot::TopRight => 1,
            Slot::BottomLeft => 2,
            Slot::BottomRight => 3,
        }
    }

    /// Grid row (0 = top)
    pub fn row(self) -> u32 {
        self.index() as u32 / 2
    }

    /// Grid column (0 = left)
    pub fn column(self) -> u32 {
        self.index() as u32 % 2
    }

    pub fn name(self) -> &'static str {
        match self {
            Slot::TopLeft => "top-left",
            Slot::TopRight => "top-right",
            Slot::BottomLeft => "bottom-left",
            Slot::BottomRight => "bottom-right",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.name())
    }
}

impl FromStr for Slot {
    type Err = LabelSheetError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Ok(number) = trimmed.parse::<u8>() {
            return Slot::from_number(number);
        }
        Slot::ALL
            .into_iter()
            .find(|slot| slot.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| LabelSheetError::InvalidSlot(trimmed.to_string()))
    }
}
