//! Switch idiom flags (`switch_info_t::flags` and `switch_info_ex_t::flags2`).

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct SwitchFlags: u16 {
        /// Sparse switch: a value table replaces `lowcase`
        const SPARSE = 0x0001;
        const V32 = 0x0002;
        const J32 = 0x0004;
        /// Value table is split (32-bit values only)
        const VSPLIT = 0x0008;
        /// Default case present
        const DEFAULT = 0x0010;
        /// Switch end is the default entry of the table
        const END_IN_TABLE = 0x0020;
        /// Jump table is reversed
        const JUMP_INVERTED = 0x0040;
        /// Two-bit shift for `element << shift + elbase`
        const SHIFT_MASK = 0x0180;
        /// `elbase` is present
        const ELBASE = 0x0200;
        /// Jump entry size expansion bit
        const JSIZE = 0x0400;
        /// Value entry size expansion bit
        const VSIZE = 0x0800;
        /// Table is not an array of individual dwords
        const SEPARATE = 0x1000;
        const SIGNED = 0x2000;
        /// Table built by the processor module
        const CUSTOM = 0x4000;
        /// Record is a `switch_info_ex_t`
        const EXTENDED = 0x8000;
    }
}

impl SwitchFlags {
    pub fn is_sparse(self) -> bool {
        self.contains(Self::SPARSE)
    }

    pub fn is_extended(self) -> bool {
        self.contains(Self::EXTENDED)
    }

    pub fn has_default(self) -> bool {
        self.contains(Self::DEFAULT)
    }

    pub fn has_element_base(self) -> bool {
        self.contains(Self::ELBASE)
    }

    /// Shift applied to jump table elements, `0..=3`.
    pub fn shift(self) -> u8 {
        ((self.bits() & Self::SHIFT_MASK.bits()) >> 7) as u8
    }

    /// Size in bytes of one jump table entry.
    pub fn jump_element_size(self) -> u8 {
        Self::element_size(self.contains(Self::J32), self.contains(Self::JSIZE))
    }

    /// Size in bytes of one value table entry.
    pub fn value_element_size(self) -> u8 {
        Self::element_size(self.contains(Self::V32), self.contains(Self::VSIZE))
    }

    // The 32-bit bit alone means 4 and the expansion bit alone means 1.
    fn element_size(wide: bool, expanded: bool) -> u8 {
        match (wide, expanded) {
            (false, false) => 2,
            (true, false) => 4,
            (false, true) => 1,
            (true, true) => 8,
        }
    }
}

bitflags! {
    /// Extended switch flags (`switch_info_ex_t::flags2`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct SwitchFlagsEx: u32 {
        /// Value table entries index the jump table
        const INDIRECT = 0x0001;
        /// Table values are subtracted from `elbase`
        const SUBTRACT = 0x0002;
        /// `lowcase` must be ignored by the decompiler
        const NO_LOWCASE = 0x0004;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_sizes() {
        let cases = [
            (0x0000, 2, 2),
            (0x0004, 4, 2),
            (0x0400, 1, 2),
            (0x0404, 8, 2),
            (0x0002, 2, 4),
            (0x0800, 2, 1),
            (0x0802, 2, 8),
        ];
        for (bits, jump, value) in cases {
            let flags = SwitchFlags::from_bits_retain(bits);
            assert_eq!(flags.jump_element_size(), jump, "{bits:#x}");
            assert_eq!(flags.value_element_size(), value, "{bits:#x}");
        }
    }

    #[test]
    fn test_shift() {
        assert_eq!(SwitchFlags::empty().shift(), 0);
        assert_eq!(SwitchFlags::from_bits_retain(0x0080).shift(), 1);
        assert_eq!(SwitchFlags::from_bits_retain(0x0100).shift(), 2);
        assert_eq!(SwitchFlags::from_bits_retain(0x8191).shift(), 3);
    }

    #[test]
    fn test_kind_bits() {
        let flags = SwitchFlags::from_bits_retain(0x8211);
        assert!(flags.is_sparse());
        assert!(flags.is_extended());
        assert!(flags.has_default());
        assert!(flags.has_element_base());
        assert!(!SwitchFlags::J32.is_sparse());
    }
}
