//! Program segments (`segment_t`).
//!
//! Every address of the program belongs to exactly one segment, a contiguous
//! `[start, end)` range with a unique selector.

use crate::core::AddressWidth;
use crate::decode::{
    SegmentAlignment, SegmentBitness, SegmentCombination, SegmentFlags, SegmentPermissions,
    SegmentType,
};

/// Number of default segment register values stored per segment.
pub const SEGMENT_REGISTER_SLOTS: usize = 16;

pub mod layout {
    use crate::core::DualOffset;

    /// `ea_t start_ea`
    pub const START: DualOffset = DualOffset::fixed(0);
    /// `ea_t end_ea`
    pub const END: DualOffset = DualOffset::new(4, 8);
    /// `uval_t name`
    pub const NAME: DualOffset = DualOffset::new(8, 16);
    /// `uval_t sclass`
    pub const CLASS: DualOffset = DualOffset::new(12, 24);
    /// `uval_t orgbase`
    pub const ORGBASE: DualOffset = DualOffset::new(16, 32);
    /// `uchar align`
    pub const ALIGN: DualOffset = DualOffset::new(20, 40);
    /// `uchar comb`
    pub const COMB: DualOffset = DualOffset::new(21, 41);
    /// `uchar perm`
    pub const PERM: DualOffset = DualOffset::new(22, 42);
    /// `uchar bitness`
    pub const BITNESS: DualOffset = DualOffset::new(23, 43);
    /// `ushort flags`
    pub const FLAGS: DualOffset = DualOffset::new(24, 44);
    /// `sel_t sel`
    pub const SELECTOR: DualOffset = DualOffset::new(26, 46);
    /// `sel_t defsr[16]`
    pub const DEFAULT_REGISTERS: DualOffset = DualOffset::new(30, 54);
    /// `uchar type`
    pub const KIND: DualOffset = DualOffset::new(94, 182);
    /// `bgcolor_t color`
    pub const COLOR: DualOffset = DualOffset::new(95, 183);
    pub const SIZE: DualOffset = DualOffset::new(99, 187);

    /// Stride of one `sel_t`.
    pub const SELECTOR_SIZE: DualOffset = DualOffset::new(4, 8);

    pub const FIELDS: &[(&str, DualOffset)] = &[
        ("start_ea", START),
        ("end_ea", END),
        ("name", NAME),
        ("sclass", CLASS),
        ("orgbase", ORGBASE),
        ("align", ALIGN),
        ("comb", COMB),
        ("perm", PERM),
        ("bitness", BITNESS),
        ("flags", FLAGS),
        ("sel", SELECTOR),
        ("defsr", DEFAULT_REGISTERS),
        ("type", KIND),
        ("color", COLOR),
    ];

    const _: () = assert!(
        DEFAULT_REGISTERS.element(SELECTOR_SIZE, super::SEGMENT_REGISTER_SLOTS as u32).narrow()
            == KIND.narrow()
    );
    const _: () = assert!(
        DEFAULT_REGISTERS.element(SELECTOR_SIZE, super::SEGMENT_REGISTER_SLOTS as u32).wide()
            == KIND.wide()
    );
}

native_view!(
    /// View over a segment record.
    SegmentView,
    "segment_t",
    layout::SIZE
);

impl<'a, W: AddressWidth> SegmentView<'a, W> {
    /// First address of the segment.
    pub fn start(&self) -> W::Ea {
        self.raw.ea(layout::START)
    }

    /// First address past the segment.
    pub fn end(&self) -> W::Ea {
        self.raw.ea(layout::END)
    }

    /// Netnode id of the segment name.
    pub fn name_id(&self) -> W::Ea {
        self.raw.ea(layout::NAME)
    }

    /// Netnode id of the segment class.
    pub fn class_id(&self) -> W::Ea {
        self.raw.ea(layout::CLASS)
    }

    /// Value of the ORG directive, meaningful with
    /// [`SegmentFlags::ORGBASE_PRESENT`].
    pub fn orgbase(&self) -> W::Ea {
        self.raw.ea(layout::ORGBASE)
    }

    pub fn raw_alignment(&self) -> u8 {
        self.raw.u8(layout::ALIGN)
    }

    pub fn alignment(&self) -> Option<SegmentAlignment> {
        SegmentAlignment::from_raw(self.raw_alignment())
    }

    pub fn raw_combination(&self) -> u8 {
        self.raw.u8(layout::COMB)
    }

    pub fn combination(&self) -> Option<SegmentCombination> {
        SegmentCombination::from_raw(self.raw_combination())
    }

    pub fn permissions(&self) -> SegmentPermissions {
        SegmentPermissions::from_bits_retain(self.raw.u8(layout::PERM))
    }

    pub fn raw_bitness(&self) -> u8 {
        self.raw.u8(layout::BITNESS)
    }

    pub fn bitness(&self) -> Option<SegmentBitness> {
        SegmentBitness::from_raw(self.raw_bitness())
    }

    /// Address size in bits: 16, 32 or 64, and 0 for an unknown bitness.
    pub fn bits(&self) -> u32 {
        self.bitness().map_or(0, SegmentBitness::bits)
    }

    pub fn bytes(&self) -> u32 {
        self.bits() / 8
    }

    /// 32-bit or 64-bit segment.
    pub fn use32(&self) -> bool {
        matches!(
            self.bitness(),
            Some(SegmentBitness::Bits32 | SegmentBitness::Bits64)
        )
    }

    pub fn use64(&self) -> bool {
        self.bitness() == Some(SegmentBitness::Bits64)
    }

    pub fn flags(&self) -> SegmentFlags {
        SegmentFlags::from_bits_retain(self.raw.u16(layout::FLAGS))
    }

    pub fn is_hidden(&self) -> bool {
        self.flags().is_hidden()
    }

    pub fn is_visible(&self) -> bool {
        !self.is_hidden()
    }

    pub fn is_debug(&self) -> bool {
        self.flags().contains(SegmentFlags::DEBUG)
    }

    pub fn is_loader(&self) -> bool {
        self.flags().contains(SegmentFlags::LOADER)
    }

    pub fn hides_type(&self) -> bool {
        self.flags().contains(SegmentFlags::HIDE_TYPE)
    }

    pub fn has_orgbase(&self) -> bool {
        self.flags().contains(SegmentFlags::ORGBASE_PRESENT)
    }

    pub fn has_origin(&self) -> bool {
        self.flags().contains(SegmentFlags::COMMENTED_ORG)
    }

    /// Debugger or loader segment, not analyzed automatically and usually
    /// dropped at the end of a debugging session.
    pub fn is_ephemeral(&self) -> bool {
        self.flags().is_ephemeral()
    }

    pub fn selector(&self) -> W::Ea {
        self.raw.ea(layout::SELECTOR)
    }

    /// Default value of segment register `index`, `0..16`.
    pub fn default_segment_register(&self, index: usize) -> Option<W::Ea> {
        if index >= SEGMENT_REGISTER_SLOTS {
            return None;
        }
        let at = layout::DEFAULT_REGISTERS.element(layout::SELECTOR_SIZE, index as u32);
        Some(self.raw.ea(at))
    }

    pub fn raw_kind(&self) -> u8 {
        self.raw.u8(layout::KIND)
    }

    pub fn kind(&self) -> Option<SegmentType> {
        SegmentType::from_raw(self.raw_kind())
    }

    /// Background color.
    pub fn color(&self) -> u32 {
        self.raw.u32(layout::COLOR)
    }

    /// `start <= ea < end`.
    pub fn contains(&self, ea: W::Ea) -> bool {
        self.start() <= ea && ea < self.end()
    }

    /// Length of the segment, 0 when the bounds are inverted.
    pub fn size(&self) -> u64 {
        let start: u64 = self.start().into();
        let end: u64 = self.end().into();
        end.saturating_sub(start)
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }
}
