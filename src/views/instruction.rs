//! Decoded instructions (`insn_t`).

use crate::config::MarshalConfig;
use crate::core::AddressWidth;
use crate::decode::{InstructionFlags, MAX_OPERANDS};
use crate::error::{MarshalError, Result};
use crate::views::instruction_descriptor::{InstructionDescriptor, InstructionTable};
use crate::views::operand::{self, OperandView};

pub mod layout {
    use crate::core::DualOffset;
    use crate::views::operand;

    /// `ea_t cs`, segment base in paragraphs
    pub const CS: DualOffset = DualOffset::fixed(0x00);
    /// `ea_t ip`, offset in the segment
    pub const IP: DualOffset = DualOffset::new(0x04, 0x08);
    /// `ea_t ea`, linear address
    pub const EA: DualOffset = DualOffset::new(0x08, 0x10);
    /// `uint16 itype`
    pub const ITYPE: DualOffset = DualOffset::new(0x0C, 0x18);
    /// `uint16 size`
    pub const SIZE_BYTES: DualOffset = DualOffset::new(0x0E, 0x1A);
    /// `uint16 auxpref`
    pub const AUXPREF: DualOffset = DualOffset::new(0x10, 0x1C);
    /// `char segpref`
    pub const SEGPREF: DualOffset = DualOffset::new(0x12, 0x1E);
    /// `char insnpref`
    pub const INSNPREF: DualOffset = DualOffset::new(0x13, 0x1F);
    /// `op_t ops[6]`
    pub const OPERANDS: DualOffset = DualOffset::new(0x14, 0x20);
    /// `char flags`
    pub const FLAGS: DualOffset = DualOffset::new(0xA4, 0xF8);
    pub const SIZE: DualOffset = DualOffset::new(0xA5, 0xF9);

    pub const FIELDS: &[(&str, DualOffset)] = &[
        ("cs", CS),
        ("ip", IP),
        ("ea", EA),
        ("itype", ITYPE),
        ("size", SIZE_BYTES),
        ("auxpref", AUXPREF),
        ("segpref", SEGPREF),
        ("insnpref", INSNPREF),
        ("ops", OPERANDS),
        ("flags", FLAGS),
    ];

    /// Offset of operand slot `index`.
    pub const fn operand(index: u32) -> DualOffset {
        OPERANDS.element(operand::layout::SIZE, index)
    }

    const _: () = assert!(operand(6).narrow() == FLAGS.narrow());
    const _: () = assert!(operand(6).wide() == FLAGS.wide());
}

native_view!(
    /// View over an instruction decoded by the engine's processor module.
    ///
    /// The six operand records are embedded in the instruction record.
    InstructionView,
    "insn_t",
    layout::SIZE
);

impl<'a, W: AddressWidth> InstructionView<'a, W> {
    /// Segment base in paragraphs.
    pub fn cs(&self) -> W::Ea {
        self.raw.ea(layout::CS)
    }

    /// Offset of the instruction in its segment.
    pub fn ip(&self) -> W::Ea {
        self.raw.ea(layout::IP)
    }

    /// Linear address of the instruction.
    pub fn ea(&self) -> W::Ea {
        self.raw.ea(layout::EA)
    }

    /// Processor-specific instruction code.
    pub fn itype(&self) -> u16 {
        self.raw.u16(layout::ITYPE)
    }

    /// Instruction length in bytes.
    pub fn size(&self) -> u16 {
        self.raw.u16(layout::SIZE_BYTES)
    }

    /// Processor dependent prefix field.
    pub fn auxpref(&self) -> u16 {
        self.raw.u16(layout::AUXPREF)
    }

    pub fn segpref(&self) -> u8 {
        self.raw.u8(layout::SEGPREF)
    }

    pub fn insnpref(&self) -> u8 {
        self.raw.u8(layout::INSNPREF)
    }

    pub fn flags(&self) -> InstructionFlags {
        InstructionFlags::from_bits_retain(self.raw.u8(layout::FLAGS))
    }

    /// Instruction is part of a macro instruction.
    pub fn is_macro(&self) -> bool {
        self.flags().contains(InstructionFlags::MACRO)
    }

    /// View of operand slot `index`, `0..6`.
    pub fn operand(&self, index: usize) -> Result<OperandView<'a, W>> {
        if index >= MAX_OPERANDS {
            return Err(MarshalError::OperandIndex {
                index,
                max: MAX_OPERANDS,
            });
        }
        let at = self.raw.at(layout::operand(index as u32));
        // The slot lies inside the instruction record.
        Ok(unsafe { OperandView::from_ptr(at) })
    }

    /// Views of all six operand slots, including `o_void` ones.
    pub fn operands(&self) -> impl Iterator<Item = OperandView<'a, W>> {
        let insn = *self;
        (0..MAX_OPERANDS).filter_map(move |i| insn.operand(i).ok())
    }

    /// Operands up to the first `o_void` slot.
    pub fn used_operands(&self) -> impl Iterator<Item = OperandView<'a, W>> {
        self.operands().take_while(|op| !op.is_void())
    }

    /// Descriptor of this instruction in `table`, when its code is canonical.
    pub fn descriptor(
        &self,
        table: &InstructionTable<'_>,
        config: &MarshalConfig,
    ) -> Option<InstructionDescriptor> {
        table.descriptor(self.itype(), config)
    }

    /// Size of one embedded operand record under `W`.
    pub fn operand_size() -> usize {
        operand::layout::SIZE.for_width::<W>()
    }
}
