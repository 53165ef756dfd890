//! Shared helpers for the integration tests.
//!
//! Records are assembled in ordinary byte buffers laid out exactly as the
//! engine lays them out, then viewed through the public constructors.

#![allow(dead_code)]

use idaview::core::{AddressWidth, DualOffset};
use idaview::views::{instruction, member, operand, structure};
use std::marker::PhantomData;

/// Byte buffer holding one native record for the width `W`.
#[derive(Debug, Clone)]
pub struct RecordBuilder<W: AddressWidth> {
    buf: Vec<u8>,
    _width: PhantomData<W>,
}

impl<W: AddressWidth> RecordBuilder<W> {
    pub fn new(size: DualOffset) -> Self {
        Self {
            buf: vec![0u8; size.for_width::<W>()],
            _width: PhantomData,
        }
    }

    pub fn bytes(&mut self, off: DualOffset, bytes: &[u8]) -> &mut Self {
        let at = off.for_width::<W>();
        self.buf[at..at + bytes.len()].copy_from_slice(bytes);
        self
    }

    pub fn u8(&mut self, off: DualOffset, value: u8) -> &mut Self {
        self.bytes(off, &[value])
    }

    pub fn u16(&mut self, off: DualOffset, value: u16) -> &mut Self {
        self.bytes(off, &value.to_ne_bytes())
    }

    pub fn u32(&mut self, off: DualOffset, value: u32) -> &mut Self {
        self.bytes(off, &value.to_ne_bytes())
    }

    /// EA-sized field: 4 bytes narrow, 8 bytes wide.
    pub fn ea(&mut self, off: DualOffset, value: u64) -> &mut Self {
        let len = W::MODE.ea_bytes();
        self.bytes(off, &value.to_ne_bytes()[..len])
    }

    /// Host pointer field.
    pub fn ptr(&mut self, off: DualOffset, value: *const u8) -> &mut Self {
        self.bytes(off, &(value as usize).to_ne_bytes())
    }

    pub fn build(&self) -> Vec<u8> {
        self.buf.clone()
    }
}

/// One member of a synthetic structure.
#[derive(Debug, Clone, Copy)]
pub struct MemberSpec {
    pub id: u64,
    pub start: u64,
    pub end: u64,
    pub flags: u32,
    pub props: u32,
}

/// Contiguous `member_t` array.
pub fn member_array<W: AddressWidth>(members: &[MemberSpec]) -> Vec<u8> {
    let mut out = Vec::new();
    for m in members {
        let record = RecordBuilder::<W>::new(member::layout::SIZE)
            .ea(member::layout::ID, m.id)
            .ea(member::layout::START_OFFSET, m.start)
            .ea(member::layout::END_OFFSET, m.end)
            .u32(member::layout::FLAGS, m.flags)
            .u32(member::layout::PROPERTIES, m.props)
            .build();
        out.extend_from_slice(&record);
    }
    out
}

/// `struc_t` header pointing at `members`, which must outlive every view
/// over the header.
pub fn structure_header<W: AddressWidth>(
    id: u64,
    members: Option<&[u8]>,
    count: u32,
    props: u32,
) -> Vec<u8> {
    let members_ptr = members.map_or(std::ptr::null(), |m| m.as_ptr());
    RecordBuilder::<W>::new(structure::layout::SIZE)
        .ea(structure::layout::ID, id)
        .u32(structure::layout::MEMBER_COUNT, count)
        .ptr(structure::layout::MEMBERS, members_ptr)
        .u16(structure::layout::AGE, 1)
        .u32(structure::layout::PROPERTIES, props)
        .u32(structure::layout::ORDINAL, (-1i32) as u32)
        .build()
}

/// One operand slot of a synthetic instruction.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperandSpec {
    pub kind: u8,
    pub reg: u16,
    pub value_type: u8,
    pub addr: u64,
    pub value: u64,
    pub has_sib: bool,
    pub sib: u8,
}

/// `insn_t` with the given prefixes and operand slots.
pub fn instruction<W: AddressWidth>(
    itype: u16,
    auxpref: u16,
    insnpref: u8,
    operands: &[OperandSpec],
) -> Vec<u8> {
    let mut builder = RecordBuilder::<W>::new(instruction::layout::SIZE);
    builder
        .ea(instruction::layout::EA, 0x1000)
        .u16(instruction::layout::ITYPE, itype)
        .u16(instruction::layout::SIZE_BYTES, 5)
        .u16(instruction::layout::AUXPREF, auxpref)
        .u8(instruction::layout::INSNPREF, insnpref);
    for (slot, op) in operands.iter().enumerate() {
        let base = instruction::layout::operand(slot as u32);
        builder
            .u8(base.add(operand::layout::NUMBER), slot as u8)
            .u8(base.add(operand::layout::KIND), op.kind)
            .u8(base.add(operand::layout::VALUE_TYPE), op.value_type)
            .u16(base.add(operand::layout::REGISTER), op.reg)
            .ea(base.add(operand::layout::VALUE), op.value)
            .ea(base.add(operand::layout::ADDRESS), op.addr)
            .u8(base.add(operand::layout::SPECIAL_FLAG1), op.has_sib as u8)
            .u8(base.add(operand::layout::SPECIAL_FLAG2), op.sib);
    }
    builder.build()
}
