//! Flag and enum decoders.
//!
//! Pure functions and types over raw integers already read out of native
//! records. Nothing here touches foreign memory, so the bit layouts can be
//! tested without building any record. Bits a decoder does not know are kept
//! (`from_bits_retain`) and raw values stay available to callers.

pub mod function;
pub mod instruction;
pub mod operand;
pub mod properties;
pub mod segment;
pub mod switch;
pub mod x86;

pub use function::FunctionFlags;
pub use instruction::{InstructionFeature, InstructionFlags, MAX_OPERANDS};
pub use operand::{OperandFlags, OperandType, OperandValueType};
pub use properties::{MemberProperties, StructureProperties};
pub use segment::{
    SegmentAlignment, SegmentBitness, SegmentCombination, SegmentFlags, SegmentPermissions,
    SegmentType,
};
pub use switch::{SwitchFlags, SwitchFlagsEx};
pub use x86::{AuxPrefix, Rex, X86Register};
