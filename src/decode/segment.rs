//! Segment permissions, flags, bitness, type, alignment and combination.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::MarshalError;

bitflags! {
    /// Access permissions of a segment (`segment_t::perm`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct SegmentPermissions: u8 {
        const EXECUTE = 1;
        const WRITE = 2;
        const READ = 4;
    }
}

impl SegmentPermissions {
    pub fn can_read(self) -> bool {
        self.contains(Self::READ)
    }

    pub fn can_write(self) -> bool {
        self.contains(Self::WRITE)
    }

    pub fn can_execute(self) -> bool {
        self.contains(Self::EXECUTE)
    }

    /// Permission bits are unknown (the engine leaves them all clear).
    pub fn is_unknown(self) -> bool {
        self.is_empty()
    }
}

impl fmt::Display for SegmentPermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut perms = String::new();
        perms.push(if self.can_read() { 'r' } else { '-' });
        perms.push(if self.can_write() { 'w' } else { '-' });
        perms.push(if self.can_execute() { 'x' } else { '-' });
        write!(f, "{}", perms)
    }
}

bitflags! {
    /// Segment flags (`segment_t::flags`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct SegmentFlags: u16 {
        /// Processor dependent (IBM PC: ORG directive not commented out)
        const COMMENTED_ORG = 0x01;
        /// `orgbase` is present
        const ORGBASE_PRESENT = 0x02;
        const HIDDEN = 0x04;
        /// Created for the debugger
        const DEBUG = 0x08;
        /// Created by the loader
        const LOADER = 0x10;
        /// Segment type is not printed in the listing
        const HIDE_TYPE = 0x20;
    }
}

impl SegmentFlags {
    /// Debugger or loader segments are not analyzed automatically.
    pub fn is_ephemeral(self) -> bool {
        self.intersects(Self::DEBUG | Self::LOADER)
    }

    pub fn is_hidden(self) -> bool {
        self.contains(Self::HIDDEN)
    }
}

/// Addressing width of a segment (`segment_t::bitness`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SegmentBitness {
    Bits16 = 0,
    Bits32 = 1,
    Bits64 = 2,
}

impl SegmentBitness {
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(SegmentBitness::Bits16),
            1 => Some(SegmentBitness::Bits32),
            2 => Some(SegmentBitness::Bits64),
            _ => None,
        }
    }

    pub fn bits(self) -> u32 {
        1 << (self as u32 + 4)
    }

    pub fn bytes(self) -> u32 {
        self.bits() / 8
    }
}

impl TryFrom<u8> for SegmentBitness {
    type Error = MarshalError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        SegmentBitness::from_raw(raw).ok_or(MarshalError::UnknownDiscriminant {
            kind: "segment bitness",
            value: raw as u64,
        })
    }
}

/// Segment type (`segment_t::type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SegmentType {
    Normal = 0,
    /// `extern` definitions, no instructions
    Extern = 1,
    Code = 2,
    Data = 3,
    /// Java implementation segment
    Implementation = 4,
    Group = 6,
    Null = 7,
    Undefined = 8,
    Bss = 9,
    AbsoluteSymbols = 10,
    Communal = 11,
    /// Internal processor memory and SFRs (8051)
    InternalMemory = 12,
}

impl SegmentType {
    pub fn from_raw(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => SegmentType::Normal,
            1 => SegmentType::Extern,
            2 => SegmentType::Code,
            3 => SegmentType::Data,
            4 => SegmentType::Implementation,
            6 => SegmentType::Group,
            7 => SegmentType::Null,
            8 => SegmentType::Undefined,
            9 => SegmentType::Bss,
            10 => SegmentType::AbsoluteSymbols,
            11 => SegmentType::Communal,
            12 => SegmentType::InternalMemory,
            _ => return None,
        })
    }

    /// Types that hold no instructions or data and are not declared as
    /// segments in the listing.
    pub fn is_pseudo(self) -> bool {
        matches!(
            self,
            SegmentType::Extern
                | SegmentType::Group
                | SegmentType::AbsoluteSymbols
                | SegmentType::Communal
        )
    }
}

impl TryFrom<u8> for SegmentType {
    type Error = MarshalError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        SegmentType::from_raw(raw).ok_or(MarshalError::UnknownDiscriminant {
            kind: "segment type",
            value: raw as u64,
        })
    }
}

/// Segment alignment (`segment_t::align`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SegmentAlignment {
    Absolute = 0,
    Byte = 1,
    Word = 2,
    Paragraph = 3,
    Page256 = 4,
    Dword = 5,
    Page4K = 6,
    Group = 7,
    Bytes32 = 8,
    Bytes64 = 9,
    Qword = 10,
    Bytes128 = 11,
    Bytes512 = 12,
    Bytes1024 = 13,
    Bytes2048 = 14,
}

impl SegmentAlignment {
    pub fn from_raw(raw: u8) -> Option<Self> {
        use SegmentAlignment::*;
        const ALL: [SegmentAlignment; 15] = [
            Absolute, Byte, Word, Paragraph, Page256, Dword, Page4K, Group, Bytes32, Bytes64,
            Qword, Bytes128, Bytes512, Bytes1024, Bytes2048,
        ];
        ALL.get(raw as usize).copied()
    }

    /// Alignment in bytes for relocatable segments.
    pub fn bytes(self) -> Option<u32> {
        match self {
            SegmentAlignment::Absolute | SegmentAlignment::Group => None,
            SegmentAlignment::Byte => Some(1),
            SegmentAlignment::Word => Some(2),
            SegmentAlignment::Dword => Some(4),
            SegmentAlignment::Qword => Some(8),
            SegmentAlignment::Paragraph => Some(16),
            SegmentAlignment::Bytes32 => Some(32),
            SegmentAlignment::Bytes64 => Some(64),
            SegmentAlignment::Bytes128 => Some(128),
            SegmentAlignment::Page256 => Some(256),
            SegmentAlignment::Bytes512 => Some(512),
            SegmentAlignment::Bytes1024 => Some(1024),
            SegmentAlignment::Bytes2048 => Some(2048),
            SegmentAlignment::Page4K => Some(4096),
        }
    }
}

/// Segment combination (`segment_t::comb`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SegmentCombination {
    Private = 0,
    Group = 1,
    Public = 2,
    Public2 = 4,
    Stack = 5,
    Common = 6,
    Public3 = 7,
}

impl SegmentCombination {
    pub fn from_raw(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => SegmentCombination::Private,
            1 => SegmentCombination::Group,
            2 => SegmentCombination::Public,
            4 => SegmentCombination::Public2,
            5 => SegmentCombination::Stack,
            6 => SegmentCombination::Common,
            7 => SegmentCombination::Public3,
            _ => return None,
        })
    }

    /// The three public variants combine the same way.
    pub fn is_public(self) -> bool {
        matches!(
            self,
            SegmentCombination::Public | SegmentCombination::Public2 | SegmentCombination::Public3
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissions_display() {
        let rx = SegmentPermissions::READ | SegmentPermissions::EXECUTE;
        assert_eq!(rx.to_string(), "r-x");
        assert!(rx.can_execute());
        assert!(!rx.can_write());
        assert_eq!(SegmentPermissions::from_bits_retain(0).to_string(), "---");
        assert!(SegmentPermissions::empty().is_unknown());
    }

    #[test]
    fn test_permission_bit_values() {
        // execute is the low bit in the engine's encoding
        assert_eq!(SegmentPermissions::EXECUTE.bits(), 1);
        assert_eq!(SegmentPermissions::READ.bits(), 4);
    }

    #[test]
    fn test_bitness() {
        assert_eq!(SegmentBitness::Bits16.bits(), 16);
        assert_eq!(SegmentBitness::Bits32.bits(), 32);
        assert_eq!(SegmentBitness::Bits64.bytes(), 8);
        assert!(SegmentBitness::try_from(3).is_err());
        assert!(SegmentBitness::Bits64 > SegmentBitness::Bits32);
    }

    #[test]
    fn test_segment_flags() {
        assert!(SegmentFlags::LOADER.is_ephemeral());
        assert!(SegmentFlags::DEBUG.is_ephemeral());
        assert!(!SegmentFlags::HIDDEN.is_ephemeral());
    }

    #[test]
    fn test_type_and_alignment() {
        assert_eq!(SegmentType::from_raw(2), Some(SegmentType::Code));
        assert!(SegmentType::from_raw(5).is_none());
        assert!(SegmentType::Extern.is_pseudo());
        assert!(!SegmentType::Bss.is_pseudo());
        assert_eq!(SegmentAlignment::from_raw(3), Some(SegmentAlignment::Paragraph));
        assert_eq!(SegmentAlignment::Page4K.bytes(), Some(4096));
        assert!(SegmentAlignment::from_raw(15).is_none());
        assert!(SegmentCombination::from_raw(4).unwrap().is_public());
        assert!(SegmentCombination::from_raw(3).is_none());
    }
}
