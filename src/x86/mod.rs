//! x86 interpretation of instruction and operand records.
//!
//! The engine's x86 processor module stores its prefix state in the generic
//! `auxpref` and `insnpref` fields of the instruction and its ModRM/SIB
//! details in the operand's special flags:
//! - `specflag1`: non-zero when the operand was encoded with a SIB byte,
//! - `specflag2`: the SIB byte itself.
//!
//! Register fields of a SIB byte are 3 bits wide and widened to 4 bits by
//! the REX prefix of the owning instruction, so operand addressing is always
//! decoded against its instruction.

use serde::{Deserialize, Serialize};

use crate::core::AddressWidth;
use crate::decode::x86::{self as regs, AuxPrefix, Rex, INDEX_NONE};
use crate::decode::{OperandType, OperandValueType};
use crate::error::Result;
use crate::views::{InstructionView, OperandView};

/// An instruction decoded by the x86 processor module.
#[derive(Debug, Clone, Copy)]
pub struct X86Instruction<'a, W: AddressWidth> {
    insn: InstructionView<'a, W>,
}

impl<'a, W: AddressWidth> X86Instruction<'a, W> {
    pub fn new(insn: InstructionView<'a, W>) -> Self {
        Self { insn }
    }

    pub fn view(&self) -> InstructionView<'a, W> {
        self.insn
    }

    pub fn aux(&self) -> AuxPrefix {
        AuxPrefix::from_bits_retain(self.insn.auxpref())
    }

    /// REX bits of the instruction prefix byte.
    pub fn rex(&self) -> Rex {
        Rex::from_bits_truncate(self.insn.insnpref())
    }

    pub fn rex_w(&self) -> bool {
        self.rex().contains(Rex::W)
    }

    pub fn rex_r(&self) -> bool {
        self.rex().contains(Rex::R)
    }

    pub fn rex_x(&self) -> bool {
        self.rex().contains(Rex::X)
    }

    pub fn rex_b(&self) -> bool {
        self.rex().contains(Rex::B)
    }

    /// 16-bit segment.
    pub fn mode16(&self) -> bool {
        !self.aux().intersects(AuxPrefix::USE32 | AuxPrefix::USE64)
    }

    /// 32-bit segment.
    pub fn mode32(&self) -> bool {
        self.aux().contains(AuxPrefix::USE32)
    }

    /// 64-bit segment.
    pub fn mode64(&self) -> bool {
        self.aux().contains(AuxPrefix::USE64)
    }

    /// Natural address size, no address size prefix.
    pub fn natad(&self) -> bool {
        self.aux().contains(AuxPrefix::NATURAL_ADDRESS)
    }

    /// Natural operand size, no operand size prefix.
    pub fn natop(&self) -> bool {
        self.aux().contains(AuxPrefix::NATURAL_OPERAND)
    }

    fn address_bits(&self) -> AuxPrefix {
        self.aux() & (AuxPrefix::USE32 | AuxPrefix::USE64 | AuxPrefix::NATURAL_ADDRESS)
    }

    fn operand_bits(&self) -> AuxPrefix {
        self.aux() & (AuxPrefix::USE32 | AuxPrefix::USE64 | AuxPrefix::NATURAL_OPERAND)
    }

    /// 16-bit addressing.
    pub fn ad16(&self) -> bool {
        let p = self.address_bits();
        p == AuxPrefix::NATURAL_ADDRESS || p == AuxPrefix::USE32
    }

    /// 32-bit addressing.
    pub fn ad32(&self) -> bool {
        let p = self.address_bits();
        p == AuxPrefix::NATURAL_ADDRESS | AuxPrefix::USE32
            || p.is_empty()
            || p == AuxPrefix::USE64
    }

    /// 64-bit addressing.
    pub fn ad64(&self) -> bool {
        self.address_bits() == AuxPrefix::NATURAL_ADDRESS | AuxPrefix::USE64
    }

    /// 16-bit operand size.
    pub fn op16(&self) -> bool {
        let p = self.operand_bits();
        p == AuxPrefix::NATURAL_OPERAND
            || p == AuxPrefix::USE32
            || (p == AuxPrefix::USE64 && !self.rex_w())
    }

    /// 32-bit operand size.
    pub fn op32(&self) -> bool {
        let p = self.operand_bits();
        p.is_empty()
            || p == AuxPrefix::USE32 | AuxPrefix::NATURAL_OPERAND
            || (p == AuxPrefix::USE64 | AuxPrefix::NATURAL_OPERAND && !self.rex_w())
    }

    /// Addressing width as a value type.
    pub fn address_value_type(&self) -> OperandValueType {
        if self.ad64() {
            OperandValueType::Qword
        } else if self.ad32() {
            OperandValueType::Dword
        } else {
            OperandValueType::Word
        }
    }

    /// Operand width as a value type. 64-bit operand sizes are not
    /// distinguished and come out as [`OperandValueType::Byte`].
    pub fn operand_value_type(&self) -> OperandValueType {
        if self.op32() {
            OperandValueType::Dword
        } else if self.op16() {
            OperandValueType::Word
        } else {
            OperandValueType::Byte
        }
    }

    /// Conditional or unconditional direct jump.
    pub fn is_jump(&self) -> bool {
        regs::is_jump_itype(self.insn.itype())
    }

    /// Port I/O instruction.
    pub fn is_io(&self) -> bool {
        regs::is_io_itype(self.insn.itype())
    }

    /// Operand slot `index` interpreted against this instruction.
    pub fn operand(&self, index: usize) -> Result<X86Operand<'a, W>> {
        Ok(X86Operand {
            op: self.insn.operand(index)?,
            owner: *self,
        })
    }

    pub fn operands(&self) -> impl Iterator<Item = X86Operand<'a, W>> {
        let owner = *self;
        self.insn.operands().map(move |op| X86Operand { op, owner })
    }
}

/// An operand paired with the instruction that owns it.
#[derive(Debug, Clone, Copy)]
pub struct X86Operand<'a, W: AddressWidth> {
    op: OperandView<'a, W>,
    owner: X86Instruction<'a, W>,
}

impl<'a, W: AddressWidth> X86Operand<'a, W> {
    pub fn new(op: OperandView<'a, W>, owner: X86Instruction<'a, W>) -> Self {
        Self { op, owner }
    }

    pub fn view(&self) -> OperandView<'a, W> {
        self.op
    }

    pub fn owner(&self) -> X86Instruction<'a, W> {
        self.owner
    }

    /// Encoded with a SIB byte.
    pub fn has_sib(&self) -> bool {
        self.op.special_flag1() != 0
    }

    /// The SIB byte, meaningful when [`Self::has_sib`].
    pub fn sib(&self) -> u8 {
        self.op.special_flag2()
    }

    /// Displacement operand, or direct memory operand encoded with SIB.
    pub fn has_displacement(&self) -> bool {
        match self.op.kind() {
            Some(OperandType::Displacement) => true,
            Some(OperandType::Memory) => self.has_sib(),
            _ => false,
        }
    }

    /// SIB base register, extended by REX.B.
    pub fn sib_base(&self) -> u8 {
        regs::sib_base(self.sib(), self.owner.rex())
    }

    /// SIB index register, extended by REX.X. See [`regs::sib_index`] for
    /// how the "no index" encoding is treated.
    pub fn sib_index(&self) -> u8 {
        regs::sib_index(self.sib(), self.owner.rex())
    }

    /// SIB scale; the factor is `1 << scale`.
    pub fn sib_scale(&self) -> u8 {
        regs::sib_scale(self.sib())
    }

    /// Base register of a memory operand: SIB base, else the phrase.
    pub fn base(&self) -> u16 {
        if self.has_sib() {
            self.sib_base() as u16
        } else {
            self.op.phrase()
        }
    }

    /// Index register: SIB index, else [`INDEX_NONE`].
    pub fn index(&self) -> u8 {
        if self.has_sib() {
            self.sib_index()
        } else {
            INDEX_NONE
        }
    }

    /// Scale: SIB scale, else 0.
    pub fn scale(&self) -> u8 {
        if self.has_sib() {
            self.sib_scale()
        } else {
            0
        }
    }

    /// Owned snapshot of the addressing fields.
    pub fn addressing(&self) -> OperandAddressing {
        OperandAddressing {
            kind: self.op.kind(),
            has_sib: self.has_sib(),
            has_displacement: self.has_displacement(),
            base: self.base(),
            index: self.index(),
            scale: self.scale(),
            displacement: self.op.address().into(),
        }
    }
}

/// Decoded ModRM/SIB addressing of one operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperandAddressing {
    pub kind: Option<OperandType>,
    pub has_sib: bool,
    pub has_displacement: bool,
    pub base: u16,
    pub index: u8,
    pub scale: u8,
    pub displacement: u64,
}

impl OperandAddressing {
    /// Index register in use, `None` for the unextended "no index" encoding.
    pub fn index_register(&self) -> Option<u8> {
        (self.index != INDEX_NONE).then_some(self.index)
    }

    pub fn scale_factor(&self) -> u32 {
        1 << self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DualOffset, Narrow, Wide};
    use crate::views::instruction::layout as insn_layout;
    use crate::views::operand::layout as op_layout;

    struct Builder<W: AddressWidth> {
        buf: Vec<u8>,
        _width: std::marker::PhantomData<W>,
    }

    impl<W: AddressWidth> Builder<W> {
        fn new(aux: u16, insnpref: u8) -> Self {
            let mut b = Self {
                buf: vec![0u8; insn_layout::SIZE.for_width::<W>()],
                _width: std::marker::PhantomData,
            };
            b.put(insn_layout::AUXPREF, &aux.to_ne_bytes());
            b.put(insn_layout::INSNPREF, &[insnpref]);
            b
        }

        fn put(&mut self, off: DualOffset, bytes: &[u8]) {
            let at = off.for_width::<W>();
            self.buf[at..at + bytes.len()].copy_from_slice(bytes);
        }

        fn operand(mut self, slot: u32, kind: OperandType, phrase: u16, sib: Option<u8>) -> Self {
            let base = insn_layout::operand(slot);
            self.put(base.add(op_layout::KIND), &[kind.raw()]);
            self.put(base.add(op_layout::REGISTER), &phrase.to_ne_bytes());
            if let Some(sib) = sib {
                self.put(base.add(op_layout::SPECIAL_FLAG1), &[1, sib]);
            }
            self
        }
    }

    const AUX64: u16 = AuxPrefix::USE64.bits() | AuxPrefix::NATURAL_ADDRESS.bits();

    #[test]
    fn test_sib_base_follows_rex_b() {
        // base field 3
        let sib = 0b00_000_011;
        for (rex, expected) in [(0x40u8, 3u16), (0x41, 11)] {
            let b = Builder::<Wide>::new(AUX64, rex).operand(0, OperandType::Phrase, 0, Some(sib));
            let insn = X86Instruction::new(InstructionView::<Wide>::from_bytes(&b.buf).unwrap());
            let op = insn.operand(0).unwrap();
            assert!(op.has_sib());
            assert_eq!(op.sib_base() as u16, expected);
            assert_eq!(op.base(), expected);
        }
    }

    #[test]
    fn test_no_index_sentinel_under_rex_x() {
        // index field 4, base 0
        let sib = 0b00_100_000;
        let plain = Builder::<Wide>::new(AUX64, 0).operand(0, OperandType::Phrase, 0, Some(sib));
        let insn = X86Instruction::new(InstructionView::<Wide>::from_bytes(&plain.buf).unwrap());
        let addressing = insn.operand(0).unwrap().addressing();
        assert_eq!(addressing.index, INDEX_NONE);
        assert_eq!(addressing.index_register(), None);

        // with REX.X the same field selects r12
        let rex_x = Builder::<Wide>::new(AUX64, 0x42).operand(0, OperandType::Phrase, 0, Some(sib));
        let insn = X86Instruction::new(InstructionView::<Wide>::from_bytes(&rex_x.buf).unwrap());
        let addressing = insn.operand(0).unwrap().addressing();
        assert_eq!(addressing.index, 12);
        assert_eq!(addressing.index_register(), Some(12));
    }

    #[test]
    fn test_effective_fields_without_sib() {
        for rex in [0x00u8, 0x4F] {
            let b = Builder::<Narrow>::new(AuxPrefix::USE32.bits(), rex).operand(
                1,
                OperandType::Displacement,
                5,
                None,
            );
            let insn =
                X86Instruction::new(InstructionView::<Narrow>::from_bytes(&b.buf).unwrap());
            let op = insn.operand(1).unwrap();
            assert!(!op.has_sib());
            assert!(op.has_displacement());
            assert_eq!(op.base(), 5);
            assert_eq!(op.index(), INDEX_NONE);
            assert_eq!(op.scale(), 0);
        }
    }

    #[test]
    fn test_has_displacement() {
        let b = Builder::<Narrow>::new(0, 0)
            .operand(0, OperandType::Memory, 0, None)
            .operand(1, OperandType::Memory, 0, Some(0x25))
            .operand(2, OperandType::Register, 0, Some(0x25));
        let insn = X86Instruction::new(InstructionView::<Narrow>::from_bytes(&b.buf).unwrap());
        let flags: Vec<bool> = insn.operands().map(|op| op.has_displacement()).collect();
        assert_eq!(flags, vec![false, true, false, false, false, false]);
    }

    #[test]
    fn test_scale() {
        let b = Builder::<Wide>::new(AUX64, 0).operand(0, OperandType::Phrase, 0, Some(0b11_001_010));
        let insn = X86Instruction::new(InstructionView::<Wide>::from_bytes(&b.buf).unwrap());
        let addressing = insn.operand(0).unwrap().addressing();
        assert_eq!(addressing.scale, 3);
        assert_eq!(addressing.scale_factor(), 8);
        assert_eq!(addressing.base, 2);
        assert_eq!(addressing.index, 1);
    }

    fn modes(aux: u16, rex: u8) -> X86Instruction<'static, Narrow> {
        let b = Builder::<Narrow>::new(aux, rex);
        let leaked: &'static [u8] = Box::leak(b.buf.into_boxed_slice());
        X86Instruction::new(InstructionView::<Narrow>::from_bytes(leaked).unwrap())
    }

    #[test]
    fn test_segment_modes() {
        let m16 = modes(0, 0);
        assert!(m16.mode16() && !m16.mode32() && !m16.mode64());
        let m32 = modes(AuxPrefix::USE32.bits(), 0);
        assert!(!m32.mode16() && m32.mode32());
        let m64 = modes(AuxPrefix::USE64.bits(), 0);
        assert!(m64.mode64() && !m64.mode16());
    }

    #[test]
    fn test_address_sizes() {
        let natad = AuxPrefix::NATURAL_ADDRESS.bits();
        let use32 = AuxPrefix::USE32.bits();
        let use64 = AuxPrefix::USE64.bits();

        // 16-bit segment without prefix, or 32-bit segment with 67h
        assert!(modes(natad, 0).ad16());
        assert!(modes(use32, 0).ad16());
        // 32-bit segment without prefix, 16-bit or 64-bit segment with 67h
        assert!(modes(use32 | natad, 0).ad32());
        assert!(modes(0, 0).ad32());
        assert!(modes(use64, 0).ad32());
        // 64-bit segment without prefix
        assert!(modes(use64 | natad, 0).ad64());
        assert!(!modes(use64 | natad, 0).ad32());

        assert_eq!(modes(use64 | natad, 0).address_value_type(), OperandValueType::Qword);
        assert_eq!(modes(use32 | natad, 0).address_value_type(), OperandValueType::Dword);
        assert_eq!(modes(natad, 0).address_value_type(), OperandValueType::Word);
    }

    #[test]
    fn test_operand_sizes() {
        let natop = AuxPrefix::NATURAL_OPERAND.bits();
        let use32 = AuxPrefix::USE32.bits();
        let use64 = AuxPrefix::USE64.bits();

        assert!(modes(natop, 0).op16());
        assert!(modes(use32, 0).op16());
        assert!(modes(use64, 0).op16());
        assert!(!modes(use64, 0x48).op16());

        assert!(modes(0, 0).op32());
        assert!(modes(use32 | natop, 0).op32());
        assert!(modes(use64 | natop, 0).op32());
        assert!(!modes(use64 | natop, 0x48).op32());

        assert_eq!(modes(use32 | natop, 0).operand_value_type(), OperandValueType::Dword);
        assert_eq!(modes(natop, 0).operand_value_type(), OperandValueType::Word);
        // rex.w in a 64-bit segment is neither 16 nor 32 bits
        assert_eq!(modes(use64 | natop, 0x48).operand_value_type(), OperandValueType::Byte);
    }

    #[test]
    fn test_rex_accessors() {
        let insn = modes(0, 0x4D);
        assert!(insn.rex_w());
        assert!(insn.rex_r());
        assert!(!insn.rex_x());
        assert!(insn.rex_b());
    }

    #[test]
    fn test_jump_and_io() {
        let mut b = Builder::<Narrow>::new(0, 0);
        b.put(insn_layout::ITYPE, &regs::itype::JZ.to_ne_bytes());
        let insn = X86Instruction::new(InstructionView::<Narrow>::from_bytes(&b.buf).unwrap());
        assert!(insn.is_jump());
        assert!(!insn.is_io());
    }
}
