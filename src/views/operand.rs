//! Instruction operands (`op_t`).
//!
//! An operand record lives inside its instruction record; see
//! [`crate::views::InstructionView::operand`].

use serde::{Deserialize, Serialize};

use crate::core::AddressWidth;
use crate::decode::{OperandFlags, OperandType, OperandValueType};

pub mod layout {
    use crate::core::DualOffset;

    /// `uchar n`
    pub const NUMBER: DualOffset = DualOffset::fixed(0x00);
    /// `optype_t type`
    pub const KIND: DualOffset = DualOffset::fixed(0x01);
    /// `char offb`
    pub const OFFSET_B: DualOffset = DualOffset::fixed(0x02);
    /// `char offo`
    pub const OFFSET_O: DualOffset = DualOffset::fixed(0x03);
    /// `uchar flags`
    pub const FLAGS: DualOffset = DualOffset::fixed(0x04);
    /// `op_dtype_t dtyp`
    pub const VALUE_TYPE: DualOffset = DualOffset::fixed(0x05);
    /// `uint16 reg` / `uint16 phrase`
    pub const REGISTER: DualOffset = DualOffset::fixed(0x06);
    /// `uval_t value`
    pub const VALUE: DualOffset = DualOffset::fixed(0x08);
    /// `ea_t addr`
    pub const ADDRESS: DualOffset = DualOffset::new(0x0C, 0x10);
    /// `ea_t specval`
    pub const SPECIAL_VALUE: DualOffset = DualOffset::new(0x10, 0x18);
    pub const SPECIAL_FLAG1: DualOffset = DualOffset::new(0x14, 0x20);
    pub const SPECIAL_FLAG2: DualOffset = DualOffset::new(0x15, 0x21);
    pub const SPECIAL_FLAG3: DualOffset = DualOffset::new(0x16, 0x22);
    pub const SPECIAL_FLAG4: DualOffset = DualOffset::new(0x17, 0x23);
    pub const SIZE: DualOffset = DualOffset::new(0x18, 0x24);

    pub const FIELDS: &[(&str, DualOffset)] = &[
        ("n", NUMBER),
        ("type", KIND),
        ("offb", OFFSET_B),
        ("offo", OFFSET_O),
        ("flags", FLAGS),
        ("dtyp", VALUE_TYPE),
        ("reg", REGISTER),
        ("value", VALUE),
        ("addr", ADDRESS),
        ("specval", SPECIAL_VALUE),
        ("specflag1", SPECIAL_FLAG1),
        ("specflag2", SPECIAL_FLAG2),
        ("specflag3", SPECIAL_FLAG3),
        ("specflag4", SPECIAL_FLAG4),
    ];
}

native_view!(
    /// View over one operand of a decoded instruction.
    OperandView,
    "op_t",
    layout::SIZE
);

impl<'a, W: AddressWidth> OperandView<'a, W> {
    /// Operand number inside its instruction.
    pub fn number(&self) -> u8 {
        self.raw.u8(layout::NUMBER)
    }

    /// Raw kind byte.
    pub fn raw_kind(&self) -> u8 {
        self.raw.u8(layout::KIND)
    }

    /// Decoded kind; `None` for a byte outside the engine's `o_*` range.
    pub fn kind(&self) -> Option<OperandType> {
        OperandType::from_raw(self.raw_kind())
    }

    /// Offset of the operand value from the instruction start, 0 if unknown.
    pub fn offset_b(&self) -> u8 {
        self.raw.u8(layout::OFFSET_B)
    }

    /// Offset of the second value part (outer displacement), 0 if none.
    pub fn offset_o(&self) -> u8 {
        self.raw.u8(layout::OFFSET_O)
    }

    pub fn flags(&self) -> OperandFlags {
        OperandFlags::from_bits_retain(self.raw.u8(layout::FLAGS))
    }

    pub fn raw_value_type(&self) -> u8 {
        self.raw.u8(layout::VALUE_TYPE)
    }

    pub fn value_type(&self) -> Option<OperandValueType> {
        OperandValueType::from_raw(self.raw_value_type())
    }

    /// Register number (`o_reg`).
    pub fn register(&self) -> u16 {
        self.raw.u16(layout::REGISTER)
    }

    /// Register phrase number (`o_phrase`, `o_displ`). Shares its storage
    /// with [`Self::register`].
    pub fn phrase(&self) -> u16 {
        self.raw.u16(layout::REGISTER)
    }

    /// Immediate value or outer displacement.
    pub fn value(&self) -> W::Ea {
        self.raw.ea(layout::VALUE)
    }

    /// Address used by `o_mem`, `o_displ`, `o_far` and `o_near` operands.
    pub fn address(&self) -> W::Ea {
        self.raw.ea(layout::ADDRESS)
    }

    pub fn special_value(&self) -> W::Ea {
        self.raw.ea(layout::SPECIAL_VALUE)
    }

    pub fn special_flag1(&self) -> u8 {
        self.raw.u8(layout::SPECIAL_FLAG1)
    }

    pub fn special_flag2(&self) -> u8 {
        self.raw.u8(layout::SPECIAL_FLAG2)
    }

    pub fn special_flag3(&self) -> u8 {
        self.raw.u8(layout::SPECIAL_FLAG3)
    }

    pub fn special_flag4(&self) -> u8 {
        self.raw.u8(layout::SPECIAL_FLAG4)
    }

    /// Register operand naming `reg`.
    pub fn is_register(&self, reg: u16) -> bool {
        self.kind() == Some(OperandType::Register) && self.register() == reg
    }

    /// Immediate operand with value `value`.
    pub fn is_immediate(&self, value: W::Ea) -> bool {
        self.kind() == Some(OperandType::Immediate) && self.value() == value
    }

    /// Operand is displayed in the listing.
    pub fn is_shown(&self) -> bool {
        self.flags().contains(OperandFlags::SHOW)
    }

    /// `o_void`: the slot holds no operand.
    pub fn is_void(&self) -> bool {
        self.kind() == Some(OperandType::Void)
    }

    pub fn summary(&self) -> OperandSummary {
        OperandSummary {
            number: self.number(),
            kind: self.kind(),
            flags: self.flags(),
            value_type: self.value_type(),
            register: self.register(),
            value: self.value().into(),
            address: self.address().into(),
            special_value: self.special_value().into(),
            special_flags: [
                self.special_flag1(),
                self.special_flag2(),
                self.special_flag3(),
                self.special_flag4(),
            ],
        }
    }
}

/// Owned copy of an operand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperandSummary {
    pub number: u8,
    pub kind: Option<OperandType>,
    pub flags: OperandFlags,
    pub value_type: Option<OperandValueType>,
    /// Register or phrase number
    pub register: u16,
    pub value: u64,
    pub address: u64,
    pub special_value: u64,
    pub special_flags: [u8; 4],
}
