//! x86 register numbers, register classes, prefix bits and SIB fields as the
//! engine's x86 processor module encodes them.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::MarshalError;

/// Register number the engine uses for "no register" (`R_none`, -1).
pub const REGISTER_NONE: u16 = 0xFFFF;

/// SIB index field value meaning "no index register".
pub const INDEX_NONE: u8 = 4;

macro_rules! x86_registers {
    ($($variant:ident = $id:literal => $name:literal),* $(,)?) => {
        /// x86 register numbers of the engine's processor module.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[repr(u16)]
        pub enum X86Register {
            $($variant = $id),*
        }

        impl X86Register {
            pub fn from_raw(raw: u16) -> Option<Self> {
                match raw {
                    $($id => Some(X86Register::$variant),)*
                    _ => None,
                }
            }

            /// Lower-case assembler name.
            pub fn name(self) -> &'static str {
                match self {
                    $(X86Register::$variant => $name),*
                }
            }
        }
    };
}

x86_registers! {
    Ax = 0 => "ax", Cx = 1 => "cx", Dx = 2 => "dx", Bx = 3 => "bx",
    Sp = 4 => "sp", Bp = 5 => "bp", Si = 6 => "si", Di = 7 => "di",
    R8 = 8 => "r8", R9 = 9 => "r9", R10 = 10 => "r10", R11 = 11 => "r11",
    R12 = 12 => "r12", R13 = 13 => "r13", R14 = 14 => "r14", R15 = 15 => "r15",
    Al = 16 => "al", Cl = 17 => "cl", Dl = 18 => "dl", Bl = 19 => "bl",
    Ah = 20 => "ah", Ch = 21 => "ch", Dh = 22 => "dh", Bh = 23 => "bh",
    Spl = 24 => "spl", Bpl = 25 => "bpl", Sil = 26 => "sil", Dil = 27 => "dil",
    Ip = 28 => "ip",
    Es = 29 => "es", Cs = 30 => "cs", Ss = 31 => "ss", Ds = 32 => "ds",
    Fs = 33 => "fs", Gs = 34 => "gs",
    Cf = 35 => "cf", Zf = 36 => "zf", Sf = 37 => "sf", Of = 38 => "of",
    Pf = 39 => "pf", Af = 40 => "af", Tf = 41 => "tf", If = 42 => "if",
    Df = 43 => "df",
    Efl = 44 => "efl",
    St0 = 45 => "st0", St1 = 46 => "st1", St2 = 47 => "st2", St3 = 48 => "st3",
    St4 = 49 => "st4", St5 = 50 => "st5", St6 = 51 => "st6", St7 = 52 => "st7",
    FpCtrl = 53 => "fpctrl", FpStat = 54 => "fpstat", FpTags = 55 => "fptags",
    Mm0 = 56 => "mm0", Mm1 = 57 => "mm1", Mm2 = 58 => "mm2", Mm3 = 59 => "mm3",
    Mm4 = 60 => "mm4", Mm5 = 61 => "mm5", Mm6 = 62 => "mm6", Mm7 = 63 => "mm7",
    Xmm0 = 64 => "xmm0", Xmm1 = 65 => "xmm1", Xmm2 = 66 => "xmm2", Xmm3 = 67 => "xmm3",
    Xmm4 = 68 => "xmm4", Xmm5 = 69 => "xmm5", Xmm6 = 70 => "xmm6", Xmm7 = 71 => "xmm7",
    Xmm8 = 72 => "xmm8", Xmm9 = 73 => "xmm9", Xmm10 = 74 => "xmm10", Xmm11 = 75 => "xmm11",
    Xmm12 = 76 => "xmm12", Xmm13 = 77 => "xmm13", Xmm14 = 78 => "xmm14", Xmm15 = 79 => "xmm15",
    Mxcsr = 80 => "mxcsr",
}

impl X86Register {
    pub fn raw(self) -> u16 {
        self as u16
    }

    pub fn is_segment(self) -> bool {
        is_segment_register(self.raw())
    }

    pub fn is_fpu(self) -> bool {
        is_fpu_register(self.raw())
    }

    pub fn is_mmx(self) -> bool {
        is_mmx_register(self.raw())
    }

    pub fn is_xmm(self) -> bool {
        is_xmm_register(self.raw())
    }

    pub fn is_volatile(self) -> bool {
        is_volatile_register(self.raw())
    }
}

impl TryFrom<u16> for X86Register {
    type Error = MarshalError;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        X86Register::from_raw(raw).ok_or(MarshalError::UnknownDiscriminant {
            kind: "x86 register",
            value: raw as u64,
        })
    }
}

impl fmt::Display for X86Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// es, cs, ss, ds, fs, gs
pub fn is_segment_register(reg: u16) -> bool {
    (X86Register::Es.raw()..=X86Register::Gs.raw()).contains(&reg)
}

/// st0 through st7
pub fn is_fpu_register(reg: u16) -> bool {
    (X86Register::St0.raw()..=X86Register::St7.raw()).contains(&reg)
}

/// mm0 through mm7
pub fn is_mmx_register(reg: u16) -> bool {
    (X86Register::Mm0.raw()..=X86Register::Mm7.raw()).contains(&reg)
}

/// xmm0 through xmm15
pub fn is_xmm_register(reg: u16) -> bool {
    (X86Register::Xmm0.raw()..=X86Register::Xmm15.raw()).contains(&reg)
}

/// Everything except the callee-saved bx, bp, si, di and r12-r15.
pub fn is_volatile_register(reg: u16) -> bool {
    !matches!(
        X86Register::from_raw(reg),
        Some(
            X86Register::Bx
                | X86Register::Bp
                | X86Register::Si
                | X86Register::Di
                | X86Register::R12
                | X86Register::R13
                | X86Register::R14
                | X86Register::R15
        )
    )
}

/// `push eax` opcode byte.
pub fn is_push_eax(opcode: u8) -> bool {
    opcode == 0x50
}

/// `push ecx` opcode byte.
pub fn is_push_ecx(opcode: u8) -> bool {
    opcode == 0x51
}

/// `push edx` opcode byte.
pub fn is_push_edx(opcode: u8) -> bool {
    opcode == 0x52
}

/// `push ebx` opcode byte.
pub fn is_push_ebx(opcode: u8) -> bool {
    opcode == 0x53
}

/// Instruction codes (`itype`) of the engine's x86 processor module used by
/// the classification helpers below.
pub mod itype {
    pub const NULL: u16 = 0;
    pub const CALL: u16 = 16;
    pub const CALL_FAR_INDIRECT: u16 = 17;
    pub const CALL_NEAR_INDIRECT: u16 = 18;
    pub const IN: u16 = 43;
    pub const INS: u16 = 45;
    /// First conditional jump (`ja`)
    pub const JA: u16 = 53;
    pub const JRCXZ: u16 = 60;
    /// Last conditional jump (`jz`)
    pub const JZ: u16 = 85;
    pub const JMP: u16 = 86;
    pub const JMP_FAR_INDIRECT: u16 = 87;
    pub const JMP_NEAR_INDIRECT: u16 = 88;
    pub const JMP_SHORT: u16 = 89;
    pub const OUT: u16 = 132;
    pub const OUTS: u16 = 133;
}

/// Direct jumps: every conditional jump, `jmp` and `jmpshort`. Indirect
/// jumps are not included.
pub fn is_jump_itype(code: u16) -> bool {
    (itype::JA..=itype::JZ).contains(&code) || code == itype::JMP || code == itype::JMP_SHORT
}

/// Port I/O: `in`, `ins`, `out`, `outs`.
pub fn is_io_itype(code: u16) -> bool {
    matches!(code, itype::IN | itype::INS | itype::OUT | itype::OUTS)
}

bitflags! {
    /// REX prefix bits as stored in the instruction's `insnpref` byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Rex: u8 {
        /// ModRM r/m, SIB base or opcode register extension
        const B = 1;
        /// SIB index extension
        const X = 2;
        /// ModRM reg extension
        const R = 4;
        /// 64-bit operand size
        const W = 8;
    }
}

bitflags! {
    /// x86 meaning of the instruction's `auxpref` field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct AuxPrefix: u16 {
        const LOCK = 0x0001;
        const REP = 0x0002;
        const REPNE = 0x0004;
        /// 32-bit segment
        const USE32 = 0x0008;
        /// 64-bit segment
        const USE64 = 0x0010;
        /// 32-bit offset field
        const LARGE = 0x0020;
        /// Short (byte) displacement
        const SHORT = 0x0040;
        /// No segment prefix byte
        const NO_SEGMENT_PREFIX = 0x0080;
        /// No operand size prefix byte
        const NO_OPERAND_PREFIX = 0x0100;
        /// No address size prefix byte
        const NO_ADDRESS_PREFIX = 0x0200;
        /// SS based instruction
        const SS_BASED = 0x0400;
        /// Operand size not overridden by a prefix
        const NATURAL_OPERAND = 0x0800;
        /// Addressing mode not overridden by a prefix
        const NATURAL_ADDRESS = 0x1000;
        /// FP emulator instruction
        const FP_EMULATOR = 0x2000;
    }
}

/// Base field of a SIB byte, widened with REX.B.
pub fn sib_base(sib: u8, rex: Rex) -> u8 {
    let mut base = sib & 7;
    if rex.contains(Rex::B) {
        base |= 8;
    }
    base
}

/// Index field of a SIB byte, widened with REX.X.
///
/// An unextended index of [`INDEX_NONE`] means "no index". With REX.X set
/// the same field encodes r12, so the extension is applied unconditionally.
pub fn sib_index(sib: u8, rex: Rex) -> u8 {
    let mut index = (sib >> 3) & 7;
    if rex.contains(Rex::X) {
        index |= 8;
    }
    index
}

/// Scale field of a SIB byte; the factor is `1 << scale`.
pub fn sib_scale(sib: u8) -> u8 {
    (sib >> 6) & 3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_bands() {
        let bands: [(fn(u16) -> bool, u16, u16); 4] = [
            (is_segment_register, 29, 34),
            (is_fpu_register, 45, 52),
            (is_mmx_register, 56, 63),
            (is_xmm_register, 64, 79),
        ];
        for (predicate, first, last) in bands {
            for reg in first..=last {
                assert!(predicate(reg), "register {} should be in band", reg);
            }
            assert!(!predicate(first - 1));
            assert!(!predicate(last + 1));
        }
    }

    #[test]
    fn test_volatile_registers() {
        for reg in [3u16, 5, 6, 7, 12, 13, 14, 15] {
            assert!(!is_volatile_register(reg), "register {} is callee-saved", reg);
        }
        for reg in [0u16, 1, 2, 4, 8, 11, 16, 29, 64, 80, REGISTER_NONE] {
            assert!(is_volatile_register(reg));
        }
    }

    #[test]
    fn test_push_opcodes() {
        assert!(is_push_eax(0x50));
        assert!(is_push_ecx(0x51));
        assert!(is_push_edx(0x52));
        assert!(is_push_ebx(0x53));
        assert!(!is_push_eax(0x51));
        // the pushed registers: eax, ecx and edx are volatile, ebx is not
        assert!(X86Register::Ax.is_volatile());
        assert!(X86Register::Cx.is_volatile());
        assert!(X86Register::Dx.is_volatile());
        assert!(!X86Register::Bx.is_volatile());
    }

    #[test]
    fn test_register_names() {
        assert_eq!(X86Register::from_raw(11), Some(X86Register::R11));
        assert_eq!(X86Register::Xmm15.to_string(), "xmm15");
        assert!(X86Register::from_raw(81).is_none());
        assert!(X86Register::try_from(REGISTER_NONE).is_err());
        assert!(X86Register::Gs.is_segment());
        assert!(X86Register::St3.is_fpu());
    }

    #[test]
    fn test_itype_classes() {
        assert!(is_jump_itype(itype::JA));
        assert!(is_jump_itype(itype::JRCXZ));
        assert!(is_jump_itype(itype::JZ));
        assert!(is_jump_itype(itype::JMP));
        assert!(is_jump_itype(itype::JMP_SHORT));
        assert!(!is_jump_itype(itype::JMP_NEAR_INDIRECT));
        assert!(!is_jump_itype(itype::CALL));
        assert!(is_io_itype(itype::OUTS));
        assert!(!is_io_itype(44));
    }

    #[test]
    fn test_sib_base_extension() {
        // base field 3
        let sib = 0b00_000_011;
        assert_eq!(sib_base(sib, Rex::empty()), 3);
        assert_eq!(sib_base(sib, Rex::B), 11);
        assert_eq!(sib_base(sib, Rex::X), 3);
    }

    #[test]
    fn test_sib_index_and_scale() {
        let sib = 0b10_001_000;
        assert_eq!(sib_index(sib, Rex::empty()), 1);
        assert_eq!(sib_index(sib, Rex::X), 9);
        assert_eq!(sib_scale(sib), 2);
    }

    #[test]
    fn test_sib_index_none_with_rex_x() {
        let sib = 0b00_100_000;
        assert_eq!(sib_index(sib, Rex::empty()), INDEX_NONE);
        // REX.X turns the "no index" encoding into r12
        assert_eq!(sib_index(sib, Rex::X), 12);
        assert_eq!(sib_index(sib, Rex::X), X86Register::R12.raw() as u8);
    }
}
