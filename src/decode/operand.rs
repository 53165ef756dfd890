//! Operand kinds (`o_*`), operand flags (`OF_*`) and value types (`dt_*`).

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::MarshalError;

/// Kind of an operand (`op_t::type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum OperandType {
    /// No operand
    Void = 0,
    /// General register
    Register = 1,
    /// Direct memory data reference
    Memory = 2,
    /// Memory reference through registers, no displacement
    Phrase = 3,
    /// Memory reference through registers plus displacement
    Displacement = 4,
    /// Immediate value
    Immediate = 5,
    /// Immediate far code address
    Far = 6,
    /// Immediate near code address
    Near = 7,
    /// Processor specific kinds
    Special0 = 8,
    Special1 = 9,
    Special2 = 10,
    Special3 = 11,
    Special4 = 12,
    Special5 = 13,
}

impl OperandType {
    /// Decode a raw kind byte; `None` for values the engine does not define.
    pub fn from_raw(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => OperandType::Void,
            1 => OperandType::Register,
            2 => OperandType::Memory,
            3 => OperandType::Phrase,
            4 => OperandType::Displacement,
            5 => OperandType::Immediate,
            6 => OperandType::Far,
            7 => OperandType::Near,
            8 => OperandType::Special0,
            9 => OperandType::Special1,
            10 => OperandType::Special2,
            11 => OperandType::Special3,
            12 => OperandType::Special4,
            13 => OperandType::Special5,
            _ => return None,
        })
    }

    pub fn raw(self) -> u8 {
        self as u8
    }

    /// Operand refers to memory (direct, phrase or displacement).
    pub fn is_memory_reference(self) -> bool {
        matches!(
            self,
            OperandType::Memory | OperandType::Phrase | OperandType::Displacement
        )
    }

    /// Operand is a code address.
    pub fn is_code_reference(self) -> bool {
        matches!(self, OperandType::Far | OperandType::Near)
    }

    pub fn is_processor_specific(self) -> bool {
        self.raw() >= OperandType::Special0.raw()
    }
}

impl TryFrom<u8> for OperandType {
    type Error = MarshalError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        OperandType::from_raw(raw).ok_or(MarshalError::UnknownDiscriminant {
            kind: "optype_t",
            value: raw as u64,
        })
    }
}

impl fmt::Display for OperandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperandType::Void => write!(f, "void"),
            OperandType::Register => write!(f, "reg"),
            OperandType::Memory => write!(f, "mem"),
            OperandType::Phrase => write!(f, "phrase"),
            OperandType::Displacement => write!(f, "displ"),
            OperandType::Immediate => write!(f, "imm"),
            OperandType::Far => write!(f, "far"),
            OperandType::Near => write!(f, "near"),
            other => write!(f, "idpspec{}", other.raw() - OperandType::Special0.raw()),
        }
    }
}

bitflags! {
    /// Operand characteristics (`op_t::flags`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct OperandFlags: u8 {
        /// Operand is displayed
        const SHOW = 0x08;
        /// Can only be output as a number
        const NUMBER_ONLY = 0x10;
        /// Packed factor defined (packed real operands)
        const PACKED_FORM_DEFINED = 0x20;
        /// Displacement operand: outer displacement (`value`) exists
        const OUTER_DISPLACEMENT = 0x40;
        /// Displacement operand: base displacement (`addr`) does not exist
        const NO_BASE_DISPLACEMENT = 0x80;
    }
}

/// Type of an operand's value (`op_t::dtyp`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum OperandValueType {
    Byte = 0,
    Word = 1,
    Dword = 2,
    Float = 3,
    Double = 4,
    /// Processor dependent size (`ph.tbyte_size`)
    Tbyte = 5,
    PackedReal = 6,
    Qword = 7,
    Byte16 = 8,
    Code = 9,
    Void = 10,
    Fword = 11,
    Bitfield = 12,
    String = 13,
    Unicode = 14,
    ThreeBytes = 15,
    LongDouble = 16,
}

impl OperandValueType {
    pub fn from_raw(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => OperandValueType::Byte,
            1 => OperandValueType::Word,
            2 => OperandValueType::Dword,
            3 => OperandValueType::Float,
            4 => OperandValueType::Double,
            5 => OperandValueType::Tbyte,
            6 => OperandValueType::PackedReal,
            7 => OperandValueType::Qword,
            8 => OperandValueType::Byte16,
            9 => OperandValueType::Code,
            10 => OperandValueType::Void,
            11 => OperandValueType::Fword,
            12 => OperandValueType::Bitfield,
            13 => OperandValueType::String,
            14 => OperandValueType::Unicode,
            15 => OperandValueType::ThreeBytes,
            16 => OperandValueType::LongDouble,
            _ => return None,
        })
    }

    pub fn raw(self) -> u8 {
        self as u8
    }

    /// Fixed size in bytes, `None` when it depends on the processor or the
    /// value is a pointer to variable data.
    pub fn size_bytes(self) -> Option<usize> {
        match self {
            OperandValueType::Byte => Some(1),
            OperandValueType::Word => Some(2),
            OperandValueType::ThreeBytes => Some(3),
            OperandValueType::Dword | OperandValueType::Float => Some(4),
            OperandValueType::Fword => Some(6),
            OperandValueType::Double | OperandValueType::Qword => Some(8),
            OperandValueType::PackedReal => Some(12),
            OperandValueType::Byte16 => Some(16),
            OperandValueType::Void => Some(0),
            OperandValueType::Tbyte
            | OperandValueType::Code
            | OperandValueType::Bitfield
            | OperandValueType::String
            | OperandValueType::Unicode
            | OperandValueType::LongDouble => None,
        }
    }
}

impl TryFrom<u8> for OperandValueType {
    type Error = MarshalError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        OperandValueType::from_raw(raw).ok_or(MarshalError::UnknownDiscriminant {
            kind: "op_dtype_t",
            value: raw as u64,
        })
    }
}
