//! Address-width policy.
//!
//! The native engine is built either with 32-bit or with 64-bit effective
//! addresses ("EA64"). Every structured record it hands out has one field
//! layout per build, so the width is a process-wide choice made once at
//! build time through the `ea64` cargo feature and never toggled afterwards.
//!
//! The width is carried at the type level by the [`Narrow`] and [`Wide`]
//! markers. Each marker fixes both the offset table used by the accessors
//! and the integer type of an effective address, so a view cannot read a
//! 64-bit address out of a 32-bit layout or the other way round.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Process-wide effective-address width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressWidthMode {
    /// 32-bit effective addresses
    Narrow,
    /// 64-bit effective addresses (EA64)
    Wide,
}

impl AddressWidthMode {
    /// The width this binary was built for.
    pub const ACTIVE: AddressWidthMode = if cfg!(feature = "ea64") {
        AddressWidthMode::Wide
    } else {
        AddressWidthMode::Narrow
    };

    pub const fn is_wide(self) -> bool {
        matches!(self, AddressWidthMode::Wide)
    }

    /// Size in bits of an effective address under this width
    pub const fn ea_bits(self) -> u32 {
        match self {
            AddressWidthMode::Narrow => 32,
            AddressWidthMode::Wide => 64,
        }
    }

    pub const fn ea_bytes(self) -> usize {
        (self.ea_bits() / 8) as usize
    }
}

impl fmt::Display for AddressWidthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressWidthMode::Narrow => write!(f, "ea32"),
            AddressWidthMode::Wide => write!(f, "ea64"),
        }
    }
}

/// True when the binary was built for 64-bit effective addresses.
pub const IS_WIDE_MODE: bool = AddressWidthMode::ACTIVE.is_wide();

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Narrow {}
    impl Sealed for super::Wide {}
}

/// Type-level address width.
///
/// Sealed: only [`Narrow`] and [`Wide`] exist.
pub trait AddressWidth:
    sealed::Sealed + Copy + fmt::Debug + Default + Send + Sync + 'static
{
    /// Runtime counterpart of this width.
    const MODE: AddressWidthMode;

    /// Unsigned effective address (`ea_t`, `uval_t`, `tid_t`, `size_t`-like
    /// EA-sized fields).
    type Ea: Copy
        + Eq
        + Ord
        + Hash
        + Default
        + fmt::Debug
        + fmt::Display
        + fmt::LowerHex
        + Into<u64>
        + Serialize
        + Send
        + Sync
        + 'static;

    /// Signed counterpart of [`AddressWidth::Ea`] (`adiff_t`, `sval_t`).
    type SignedEa: Copy + Eq + Ord + fmt::Debug + fmt::Display + Into<i64> + Serialize + 'static;

    /// The engine's "no address" marker (`BADADDR`), all bits set.
    const BAD_ADDRESS: Self::Ea;

    /// Size of a pointer field in records laid out for this width.
    const POINTER_BYTES: usize;

    /// Pointer fields of this layout can be dereferenced in this process.
    const HOST_POINTERS: bool = Self::POINTER_BYTES == std::mem::size_of::<usize>();
}

/// 32-bit effective addresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Narrow;

/// 64-bit effective addresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Wide;

impl AddressWidth for Narrow {
    const MODE: AddressWidthMode = AddressWidthMode::Narrow;
    type Ea = u32;
    type SignedEa = i32;
    const BAD_ADDRESS: u32 = u32::MAX;
    const POINTER_BYTES: usize = 4;
}

impl AddressWidth for Wide {
    const MODE: AddressWidthMode = AddressWidthMode::Wide;
    type Ea = u64;
    type SignedEa = i64;
    const BAD_ADDRESS: u64 = u64::MAX;
    const POINTER_BYTES: usize = 8;
}

/// The width selected for this build.
#[cfg(feature = "ea64")]
pub type ActiveWidth = Wide;

/// The width selected for this build.
#[cfg(not(feature = "ea64"))]
pub type ActiveWidth = Narrow;

/// Effective address under the active width.
pub type Ea = <ActiveWidth as AddressWidth>::Ea;
