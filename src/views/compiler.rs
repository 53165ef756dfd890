//! Target compiler ABI facts (`compiler_info_t`).
//!
//! Every field is a single byte at the same offset under both widths, so the
//! record is 9 bytes in either build.

use serde::{Deserialize, Serialize};

use crate::core::{AddressWidth, DualOffset};

pub mod layout {
    use crate::core::DualOffset;

    pub const ID: DualOffset = DualOffset::fixed(0);
    pub const MEMORY_MODEL: DualOffset = DualOffset::fixed(1);
    pub const SIZEOF_INT: DualOffset = DualOffset::fixed(2);
    pub const SIZEOF_BOOL: DualOffset = DualOffset::fixed(3);
    pub const SIZEOF_ENUM: DualOffset = DualOffset::fixed(4);
    pub const DEFAULT_ALIGN: DualOffset = DualOffset::fixed(5);
    pub const SIZEOF_SHORT: DualOffset = DualOffset::fixed(6);
    pub const SIZEOF_LONG: DualOffset = DualOffset::fixed(7);
    pub const SIZEOF_LONGLONG: DualOffset = DualOffset::fixed(8);
    pub const SIZE: DualOffset = DualOffset::fixed(9);

    pub const FIELDS: &[(&str, DualOffset)] = &[
        ("id", ID),
        ("cm", MEMORY_MODEL),
        ("size_i", SIZEOF_INT),
        ("size_b", SIZEOF_BOOL),
        ("size_e", SIZEOF_ENUM),
        ("defalign", DEFAULT_ALIGN),
        ("size_s", SIZEOF_SHORT),
        ("size_l", SIZEOF_LONG),
        ("size_ll", SIZEOF_LONGLONG),
    ];
}

native_view!(
    /// View over the engine's compiler descriptor.
    CompilerView,
    "compiler_info_t",
    layout::SIZE
);

impl<'a, W: AddressWidth> CompilerView<'a, W> {
    fn byte(&self, offset: DualOffset) -> u8 {
        self.raw.u8(offset)
    }

    /// Compiler id (`COMP_*`).
    pub fn id(&self) -> u8 {
        self.byte(layout::ID)
    }

    /// Memory model (`C_PC_*` / `CM_*` bits).
    pub fn memory_model(&self) -> u8 {
        self.byte(layout::MEMORY_MODEL)
    }

    pub fn sizeof_int(&self) -> u8 {
        self.byte(layout::SIZEOF_INT)
    }

    pub fn sizeof_bool(&self) -> u8 {
        self.byte(layout::SIZEOF_BOOL)
    }

    pub fn sizeof_enum(&self) -> u8 {
        self.byte(layout::SIZEOF_ENUM)
    }

    /// Default structure alignment; 0 means unknown.
    pub fn default_alignment(&self) -> u8 {
        self.byte(layout::DEFAULT_ALIGN)
    }

    pub fn sizeof_short(&self) -> u8 {
        self.byte(layout::SIZEOF_SHORT)
    }

    pub fn sizeof_long(&self) -> u8 {
        self.byte(layout::SIZEOF_LONG)
    }

    pub fn sizeof_longlong(&self) -> u8 {
        self.byte(layout::SIZEOF_LONGLONG)
    }

    /// Copy every field out of the record.
    pub fn summary(&self) -> CompilerInfo {
        CompilerInfo {
            id: self.id(),
            memory_model: self.memory_model(),
            sizeof_int: self.sizeof_int(),
            sizeof_bool: self.sizeof_bool(),
            sizeof_enum: self.sizeof_enum(),
            default_alignment: self.default_alignment(),
            sizeof_short: self.sizeof_short(),
            sizeof_long: self.sizeof_long(),
            sizeof_longlong: self.sizeof_longlong(),
        }
    }
}

/// Owned copy of a compiler descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompilerInfo {
    pub id: u8,
    pub memory_model: u8,
    pub sizeof_int: u8,
    pub sizeof_bool: u8,
    pub sizeof_enum: u8,
    pub default_alignment: u8,
    pub sizeof_short: u8,
    pub sizeof_long: u8,
    pub sizeof_longlong: u8,
}

impl CompilerInfo {
    /// Native encoding of the descriptor, usable with [`CompilerView::from_bytes`].
    pub fn to_bytes(&self) -> [u8; 9] {
        [
            self.id,
            self.memory_model,
            self.sizeof_int,
            self.sizeof_bool,
            self.sizeof_enum,
            self.default_alignment,
            self.sizeof_short,
            self.sizeof_long,
            self.sizeof_longlong,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Narrow, Wide};
    use crate::views::NativeRecord;

    const MSVC_X64: [u8; 9] = [1, 0x03, 4, 1, 4, 8, 2, 4, 8];

    #[test]
    fn test_same_layout_in_both_widths() {
        let narrow = CompilerView::<Narrow>::from_bytes(&MSVC_X64).unwrap();
        let wide = CompilerView::<Wide>::from_bytes(&MSVC_X64).unwrap();
        assert_eq!(narrow.summary(), wide.summary());
        assert_eq!(CompilerView::<Narrow>::native_size(), 9);
        assert_eq!(CompilerView::<Wide>::native_size(), 9);
        assert!(<CompilerView<Wide> as NativeRecord>::SIZE.is_fixed());
    }

    #[test]
    fn test_field_order() {
        let view = CompilerView::<Narrow>::from_bytes(&MSVC_X64).unwrap();
        assert_eq!(view.id(), 1);
        assert_eq!(view.memory_model(), 0x03);
        assert_eq!(view.sizeof_int(), 4);
        assert_eq!(view.sizeof_bool(), 1);
        assert_eq!(view.sizeof_enum(), 4);
        assert_eq!(view.default_alignment(), 8);
        assert_eq!(view.sizeof_short(), 2);
        assert_eq!(view.sizeof_long(), 4);
        assert_eq!(view.sizeof_longlong(), 8);
        assert_eq!(view.summary().to_bytes(), MSVC_X64);
    }

    #[test]
    fn test_short_buffer_rejected() {
        assert!(CompilerView::<Narrow>::from_bytes(&MSVC_X64[..8]).is_err());
    }

    #[test]
    fn test_reads_are_not_cached() {
        let mut bytes = MSVC_X64;
        let ptr = bytes.as_mut_ptr();
        let view = unsafe { CompilerView::<Narrow>::from_ptr(ptr) };
        assert_eq!(view.sizeof_int(), 4);
        unsafe { ptr.add(2).write(2) };
        assert_eq!(view.sizeof_int(), 2);
    }
}
