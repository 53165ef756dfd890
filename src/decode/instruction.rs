//! Instruction feature flags (`CF_*`) and instruction flags (`INSN_*`).

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Operand slots in one instruction record.
pub const MAX_OPERANDS: usize = 6;

bitflags! {
    /// Static features of an instruction kind (`instruc_t::feature`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct InstructionFeature: u32 {
        /// Does not pass execution to the next instruction
        const STOP = 0x00001;
        /// Call instruction
        const CALL = 0x00002;
        const CHG1 = 0x00004;
        const CHG2 = 0x00008;
        const CHG3 = 0x00010;
        const CHG4 = 0x00020;
        const CHG5 = 0x00040;
        const CHG6 = 0x00080;
        const USE1 = 0x00100;
        const USE2 = 0x00200;
        const USE3 = 0x00400;
        const USE4 = 0x00800;
        const USE5 = 0x01000;
        const USE6 = 0x02000;
        /// Indirect jump or call
        const JUMP = 0x04000;
        /// Bit shift
        const SHIFT = 0x08000;
        /// May appear in a high level language function
        const HLL = 0x10000;
    }
}

const CHANGE_SHIFT: u32 = 2;
const USE_SHIFT: u32 = 8;

impl InstructionFeature {
    pub fn is_stop(self) -> bool {
        self.contains(Self::STOP)
    }

    pub fn is_call(self) -> bool {
        self.contains(Self::CALL)
    }

    pub fn is_indirect_jump(self) -> bool {
        self.contains(Self::JUMP)
    }

    pub fn is_shift(self) -> bool {
        self.contains(Self::SHIFT)
    }

    pub fn is_hll(self) -> bool {
        self.contains(Self::HLL)
    }

    /// Whether operand `n` (0-based) is modified. False past the sixth operand.
    pub fn changes_operand(self, n: usize) -> bool {
        n < MAX_OPERANDS && self.bits() & (1 << (CHANGE_SHIFT + n as u32)) != 0
    }

    /// Whether operand `n` (0-based) is read. False past the sixth operand.
    pub fn uses_operand(self, n: usize) -> bool {
        n < MAX_OPERANDS && self.bits() & (1 << (USE_SHIFT + n as u32)) != 0
    }

    /// Bit `n` set when operand `n` is modified.
    pub fn changed_operands(self) -> u8 {
        ((self.bits() >> CHANGE_SHIFT) & 0x3F) as u8
    }

    /// Bit `n` set when operand `n` is read.
    pub fn used_operands(self) -> u8 {
        ((self.bits() >> USE_SHIFT) & 0x3F) as u8
    }
}

bitflags! {
    /// Per-instance instruction flags (`insn_t::flags`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct InstructionFlags: u8 {
        /// Macro instruction
        const MACRO = 0x01;
        /// Macro that may modify the database to make room for itself
        const MODIFYING_MACRO = 0x02;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_change_use_sets() {
        // mov: changes op1, uses op2
        let mov = InstructionFeature::CHG1 | InstructionFeature::USE2;
        assert!(mov.changes_operand(0));
        assert!(!mov.changes_operand(1));
        assert!(mov.uses_operand(1));
        assert!(!mov.uses_operand(0));
        assert_eq!(mov.changed_operands(), 0b000001);
        assert_eq!(mov.used_operands(), 0b000010);
    }

    #[test]
    fn test_sixth_operand_and_beyond() {
        let f = InstructionFeature::CHG6 | InstructionFeature::USE6;
        assert!(f.changes_operand(5));
        assert!(f.uses_operand(5));
        assert!(!f.changes_operand(6));
        assert!(!f.uses_operand(42));
    }

    #[test]
    fn test_classification() {
        let ret = InstructionFeature::from_bits_retain(0x00001);
        assert!(ret.is_stop());
        assert!(!ret.is_call());

        let call = InstructionFeature::from_bits_retain(0x00002 | 0x00100 | 0x04000);
        assert!(call.is_call());
        assert!(call.is_indirect_jump());
        assert!(call.uses_operand(0));

        let shl = InstructionFeature::from_bits_retain(0x08000 | 0x10000);
        assert!(shl.is_shift());
        assert!(shl.is_hll());
    }

    #[test]
    fn test_instruction_flags() {
        let flags = InstructionFlags::from_bits_retain(0x03);
        assert!(flags.contains(InstructionFlags::MACRO));
        assert!(flags.contains(InstructionFlags::MODIFYING_MACRO));
    }
}
