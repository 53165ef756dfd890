//! Function chunks (`func_t`).
//!
//! A function is an entry chunk plus any number of tail chunks, each a
//! contiguous `[start, end)` range. Past the flags the record is a union:
//! entry chunks describe the stack frame, tail chunks name their owner.

use serde::{Deserialize, Serialize};

use crate::core::AddressWidth;
use crate::decode::FunctionFlags;

pub mod layout {
    use crate::core::DualOffset;

    /// `ea_t start_ea`
    pub const START: DualOffset = DualOffset::fixed(0x00);
    /// `ea_t end_ea`
    pub const END: DualOffset = DualOffset::new(0x04, 0x08);
    /// `ushort flags`
    pub const FLAGS: DualOffset = DualOffset::new(0x08, 0x10);
    /// `uval_t frame`, entry chunks
    pub const FRAME: DualOffset = DualOffset::new(0x0C, 0x18);
    /// `ea_t owner`, tail chunks
    pub const OWNER: DualOffset = FRAME;
    /// `asize_t frsize`
    pub const FRAME_SIZE: DualOffset = DualOffset::new(0x10, 0x20);
    /// `ushort frregs`
    pub const SAVED_REGISTERS: DualOffset = DualOffset::new(0x14, 0x28);
    /// `asize_t argsize`
    pub const ARG_SIZE: DualOffset = DualOffset::new(0x16, 0x2A);
    /// `asize_t fpd`
    pub const FP_DELTA: DualOffset = DualOffset::new(0x1A, 0x32);
    /// `bgcolor_t color`
    pub const COLOR: DualOffset = DualOffset::new(0x1E, 0x3A);
    /// `ushort pntqty`
    pub const SP_POINT_COUNT: DualOffset = DualOffset::new(0x22, 0x3E);
    /// `stkpnt_t *points`
    pub const SP_POINTS: DualOffset = DualOffset::new(0x24, 0x40);
    /// `int regvarqty`, -1 until loaded
    pub const REGVAR_COUNT: DualOffset = DualOffset::new(0x28, 0x48);
    /// `regvar_t *regvars`
    pub const REGVARS: DualOffset = DualOffset::new(0x2C, 0x4C);
    /// `int llabelqty`
    pub const LABEL_COUNT: DualOffset = DualOffset::new(0x30, 0x54);
    /// `llabel_t *llabels`
    pub const LABELS: DualOffset = DualOffset::new(0x34, 0x58);
    /// `int regargqty`
    pub const REGARG_COUNT: DualOffset = DualOffset::new(0x38, 0x60);
    /// `regarg_t *regargs`
    pub const REGARGS: DualOffset = DualOffset::new(0x3C, 0x64);
    /// `int tailqty`
    pub const TAIL_COUNT: DualOffset = DualOffset::new(0x40, 0x6C);
    /// `range_t *tails`
    pub const TAILS: DualOffset = DualOffset::new(0x44, 0x70);
    pub const SIZE: DualOffset = DualOffset::new(0x48, 0x78);

    // `owner` shares its slot with `frame` and is left out.
    pub const FIELDS: &[(&str, DualOffset)] = &[
        ("start_ea", START),
        ("end_ea", END),
        ("flags", FLAGS),
        ("frame", FRAME),
        ("frsize", FRAME_SIZE),
        ("frregs", SAVED_REGISTERS),
        ("argsize", ARG_SIZE),
        ("fpd", FP_DELTA),
        ("color", COLOR),
        ("pntqty", SP_POINT_COUNT),
        ("points", SP_POINTS),
        ("regvarqty", REGVAR_COUNT),
        ("regvars", REGVARS),
        ("llabelqty", LABEL_COUNT),
        ("llabels", LABELS),
        ("regargqty", REGARG_COUNT),
        ("regargs", REGARGS),
        ("tailqty", TAIL_COUNT),
        ("tails", TAILS),
    ];

    const POINTER: DualOffset = DualOffset::new(4, 8);
    const _: () = assert!(TAILS.add(POINTER).narrow() == SIZE.narrow());
    const _: () = assert!(TAILS.add(POINTER).wide() == SIZE.wide());
}

native_view!(
    /// View over a function chunk.
    FunctionView,
    "func_t",
    layout::SIZE
);

/// Stack frame of an entry chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionFrame {
    /// Netnode id of the frame structure
    pub id: u64,
    /// Local variables, also the BP offset when the frame pointer is used
    pub local_size: u64,
    pub saved_registers_size: u16,
    /// Bytes purged from the stack on return
    pub argument_size: u64,
    /// Frame pointer delta
    pub fp_delta: u64,
}

/// Owned copy of a function chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSummary {
    pub start: u64,
    pub end: u64,
    pub flags: FunctionFlags,
    pub color: u32,
    pub frame: Option<FunctionFrame>,
    pub owner: Option<u64>,
}

impl FunctionSummary {
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl<'a, W: AddressWidth> FunctionView<'a, W> {
    pub fn start(&self) -> W::Ea {
        self.raw.ea(layout::START)
    }

    /// First address past the chunk.
    pub fn end(&self) -> W::Ea {
        self.raw.ea(layout::END)
    }

    pub fn contains(&self, ea: W::Ea) -> bool {
        self.start() <= ea && ea < self.end()
    }

    /// Length of the chunk, 0 when the bounds are inverted.
    pub fn size(&self) -> u64 {
        let start: u64 = self.start().into();
        let end: u64 = self.end().into();
        end.saturating_sub(start)
    }

    pub fn flags(&self) -> FunctionFlags {
        FunctionFlags::from_bits_retain(self.raw.u16(layout::FLAGS))
    }

    pub fn is_tail(&self) -> bool {
        self.flags().is_tail()
    }

    pub fn does_return(&self) -> bool {
        self.flags().does_return()
    }

    pub fn is_far(&self) -> bool {
        self.flags().is_far()
    }

    pub fn sp_analyzed(&self) -> bool {
        self.flags().sp_analyzed()
    }

    /// User defined color.
    pub fn color(&self) -> u32 {
        self.raw.u32(layout::COLOR)
    }

    /// Frame of an entry chunk, `None` for a tail.
    pub fn frame(&self) -> Option<FunctionFrame> {
        if self.is_tail() {
            return None;
        }
        Some(FunctionFrame {
            id: self.raw.ea(layout::FRAME).into(),
            local_size: self.raw.ea(layout::FRAME_SIZE).into(),
            saved_registers_size: self.raw.u16(layout::SAVED_REGISTERS),
            argument_size: self.raw.ea(layout::ARG_SIZE).into(),
            fp_delta: self.raw.ea(layout::FP_DELTA).into(),
        })
    }

    /// Entry address of the function owning a tail, `None` for an entry.
    pub fn owner(&self) -> Option<W::Ea> {
        self.is_tail().then(|| self.raw.ea(layout::OWNER))
    }

    /// Number of stack pointer change points. Entry chunks only.
    pub fn sp_change_point_count(&self) -> Option<u16> {
        (!self.is_tail()).then(|| self.raw.u16(layout::SP_POINT_COUNT))
    }

    /// `None` for tails and while the register variables are not loaded.
    pub fn register_variable_count(&self) -> Option<u32> {
        self.entry_count(layout::REGVAR_COUNT)
    }

    pub fn local_label_count(&self) -> Option<u32> {
        self.entry_count(layout::LABEL_COUNT)
    }

    pub fn register_argument_count(&self) -> Option<u32> {
        self.entry_count(layout::REGARG_COUNT)
    }

    pub fn tail_count(&self) -> Option<u32> {
        self.entry_count(layout::TAIL_COUNT)
    }

    fn entry_count(&self, at: crate::core::DualOffset) -> Option<u32> {
        if self.is_tail() {
            return None;
        }
        u32::try_from(self.raw.i32(at)).ok()
    }

    pub fn summary(&self) -> FunctionSummary {
        FunctionSummary {
            start: self.start().into(),
            end: self.end().into(),
            flags: self.flags(),
            color: self.color(),
            frame: self.frame(),
            owner: self.owner().map(Into::into),
        }
    }
}
