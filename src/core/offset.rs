//! Dual offsets: one byte offset per address width for the same field.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::width::{AddressWidth, AddressWidthMode};

/// Position of a native field under both address widths.
///
/// Wide layouts never place a field before its narrow position; building a
/// `DualOffset` that breaks this panics, at compile time when used in a
/// `const`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DualOffset {
    narrow: u32,
    wide: u32,
}

impl DualOffset {
    pub const fn new(narrow: u32, wide: u32) -> Self {
        assert!(wide >= narrow, "wide offset precedes narrow offset");
        Self { narrow, wide }
    }

    /// Field at the same offset under both widths.
    pub const fn fixed(offset: u32) -> Self {
        Self::new(offset, offset)
    }

    pub const fn narrow(self) -> u32 {
        self.narrow
    }

    pub const fn wide(self) -> u32 {
        self.wide
    }

    /// Single effective offset for `mode`.
    pub const fn resolve(self, mode: AddressWidthMode) -> usize {
        match mode {
            AddressWidthMode::Narrow => self.narrow as usize,
            AddressWidthMode::Wide => self.wide as usize,
        }
    }

    /// Single effective offset for the width `W`.
    #[inline(always)]
    pub fn for_width<W: AddressWidth>(self) -> usize {
        self.resolve(W::MODE)
    }

    /// Shift both offsets, e.g. to reach a field of an embedded record.
    pub const fn add(self, other: DualOffset) -> DualOffset {
        DualOffset::new(self.narrow + other.narrow, self.wide + other.wide)
    }

    /// `self + index * stride`, for records laid out in arrays.
    pub const fn element(self, stride: DualOffset, index: u32) -> DualOffset {
        DualOffset::new(
            self.narrow + stride.narrow * index,
            self.wide + stride.wide * index,
        )
    }

    /// True when the field does not move between widths.
    pub const fn is_fixed(self) -> bool {
        self.narrow == self.wide
    }
}

impl fmt::Display for DualOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}/{:#04x}", self.narrow, self.wide)
    }
}
