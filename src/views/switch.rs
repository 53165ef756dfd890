//! Switch idioms (`switch_info_t` and `switch_info_ex_t`).
//!
//! The extended record starts with the plain one and is flagged by
//! [`SwitchFlags::EXTENDED`].

use serde::{Deserialize, Serialize};

use crate::core::AddressWidth;
use crate::decode::{SwitchFlags, SwitchFlagsEx};

pub mod layout {
    use crate::core::DualOffset;

    /// `ushort flags`
    pub const FLAGS: DualOffset = DualOffset::fixed(0x00);
    /// `ushort ncases`, default excluded
    pub const CASE_COUNT: DualOffset = DualOffset::fixed(0x02);
    /// `ea_t jumps`
    pub const JUMPS: DualOffset = DualOffset::fixed(0x04);
    /// `ea_t values` (sparse) or `uval_t lowcase`
    pub const VALUES: DualOffset = DualOffset::new(0x08, 0x0C);
    pub const LOW_CASE: DualOffset = VALUES;
    /// `ea_t defjump`
    pub const DEFAULT_JUMP: DualOffset = DualOffset::new(0x0C, 0x14);
    /// `ea_t startea`
    pub const START: DualOffset = DualOffset::new(0x10, 0x1C);
    pub const SIZE: DualOffset = DualOffset::new(0x14, 0x24);

    pub const FIELDS: &[(&str, DualOffset)] = &[
        ("flags", FLAGS),
        ("ncases", CASE_COUNT),
        ("jumps", JUMPS),
        ("values", VALUES),
        ("defjump", DEFAULT_JUMP),
        ("startea", START),
    ];

    /// Fields of `switch_info_ex_t` past the plain record.
    pub mod ex {
        use crate::core::DualOffset;

        /// `int cb`
        pub const DECLARED_SIZE: DualOffset = super::SIZE;
        /// `int flags2`
        pub const FLAGS2: DualOffset = DualOffset::new(0x18, 0x28);
        /// `int jcases`
        pub const JUMP_COUNT: DualOffset = DualOffset::new(0x1C, 0x2C);
        /// `sval_t ind_lowcase`
        pub const INDEX_LOW_CASE: DualOffset = DualOffset::new(0x20, 0x30);
        /// `ea_t elbase`
        pub const ELEMENT_BASE: DualOffset = DualOffset::new(0x24, 0x38);
        /// `int regnum`, -1 when unknown
        pub const REGISTER: DualOffset = DualOffset::new(0x28, 0x40);
        /// `char regdtyp`
        pub const REGISTER_DTYPE: DualOffset = DualOffset::new(0x2C, 0x48);
        /// `uval_t custom`
        pub const CUSTOM: DualOffset = DualOffset::new(0x2D, 0x49);
        pub const SIZE: DualOffset = DualOffset::new(0x31, 0x51);

        pub const FIELDS: &[(&str, DualOffset)] = &[
            ("flags", super::FLAGS),
            ("ncases", super::CASE_COUNT),
            ("jumps", super::JUMPS),
            ("values", super::VALUES),
            ("defjump", super::DEFAULT_JUMP),
            ("startea", super::START),
            ("cb", DECLARED_SIZE),
            ("flags2", FLAGS2),
            ("jcases", JUMP_COUNT),
            ("ind_lowcase", INDEX_LOW_CASE),
            ("elbase", ELEMENT_BASE),
            ("regnum", REGISTER),
            ("regdtyp", REGISTER_DTYPE),
            ("custom", CUSTOM),
        ];
    }

    const EA: DualOffset = DualOffset::new(4, 8);
    const _: () = assert!(START.add(EA).narrow() == SIZE.narrow());
    const _: () = assert!(START.add(EA).wide() == SIZE.wide());
    const _: () = assert!(ex::CUSTOM.add(EA).narrow() == ex::SIZE.narrow());
    const _: () = assert!(ex::CUSTOM.add(EA).wide() == ex::SIZE.wide());
}

native_view!(
    /// View over a switch idiom description.
    SwitchInfoView,
    "switch_info_t",
    layout::SIZE
);

native_view!(
    /// View over an extended switch idiom description.
    SwitchInfoExView,
    "switch_info_ex_t",
    layout::ex::SIZE
);

/// Owned copy of a switch description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchSummary {
    pub flags: SwitchFlags,
    pub case_count: u16,
    pub jump_table: u64,
    pub jump_table_size: u32,
    pub jump_element_size: u8,
    pub values_table: Option<u64>,
    pub low_case: Option<i64>,
    pub default_jump: Option<u64>,
    pub start: u64,
}

impl SwitchSummary {
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl<'a, W: AddressWidth> SwitchInfoView<'a, W> {
    pub fn flags(&self) -> SwitchFlags {
        SwitchFlags::from_bits_retain(self.raw.u16(layout::FLAGS))
    }

    /// Number of cases, default excluded.
    pub fn case_count(&self) -> u16 {
        self.raw.u16(layout::CASE_COUNT)
    }

    /// Address of the jump table.
    pub fn jump_table(&self) -> W::Ea {
        self.raw.ea(layout::JUMPS)
    }

    /// Address of the value table of a sparse switch.
    pub fn values_table(&self) -> Option<W::Ea> {
        self.flags()
            .is_sparse()
            .then(|| self.raw.ea(layout::VALUES))
    }

    /// Lowest case value of a dense switch.
    pub fn low_case(&self) -> Option<W::SignedEa> {
        (!self.flags().is_sparse()).then(|| self.raw.signed_ea(layout::LOW_CASE))
    }

    /// Default jump target, `None` without a default case.
    pub fn default_jump(&self) -> Option<W::Ea> {
        let target = self.raw.ea(layout::DEFAULT_JUMP);
        (target != W::BAD_ADDRESS).then_some(target)
    }

    /// Address of the first instruction of the idiom.
    pub fn start(&self) -> W::Ea {
        self.raw.ea(layout::START)
    }

    pub fn shift(&self) -> u8 {
        self.flags().shift()
    }

    pub fn jump_element_size(&self) -> u8 {
        self.flags().jump_element_size()
    }

    pub fn value_element_size(&self) -> u8 {
        self.flags().value_element_size()
    }

    pub fn is_extended(&self) -> bool {
        self.flags().is_extended()
    }

    /// The same record seen as `switch_info_ex_t` when it is flagged as one.
    ///
    /// # Safety
    /// When the record is flagged extended it must be readable over the
    /// extended size. Records handed out by the engine always are; a view
    /// built with `from_bytes` over only the plain size is not.
    pub unsafe fn extended(&self) -> Option<SwitchInfoExView<'a, W>> {
        self.is_extended()
            .then(|| SwitchInfoExView::from_ptr(self.as_ptr()))
    }

    pub fn summary(&self) -> SwitchSummary {
        SwitchSummary {
            flags: self.flags(),
            case_count: self.case_count(),
            jump_table: self.jump_table().into(),
            jump_table_size: self.case_count().into(),
            jump_element_size: self.jump_element_size(),
            values_table: self.values_table().map(Into::into),
            low_case: self.low_case().map(Into::into),
            default_jump: self.default_jump().map(Into::into),
            start: self.start().into(),
        }
    }
}

impl<'a, W: AddressWidth> SwitchInfoExView<'a, W> {
    /// The leading `switch_info_t`.
    pub fn base(&self) -> SwitchInfoView<'a, W> {
        // The extended record covers the whole plain record.
        unsafe { SwitchInfoView::from_ptr(self.as_ptr()) }
    }

    /// Size the engine recorded in `cb`.
    pub fn declared_size(&self) -> i32 {
        self.raw.i32(layout::ex::DECLARED_SIZE)
    }

    /// Extended flags, empty unless the plain flags mark the record extended.
    pub fn flags_ex(&self) -> SwitchFlagsEx {
        if !self.base().is_extended() {
            return SwitchFlagsEx::empty();
        }
        SwitchFlagsEx::from_bits_retain(self.raw.u32(layout::ex::FLAGS2))
    }

    /// Value table entries index the jump table.
    pub fn is_indirect(&self) -> bool {
        self.flags_ex().contains(SwitchFlagsEx::INDIRECT)
    }

    pub fn is_subtract(&self) -> bool {
        self.flags_ex().contains(SwitchFlagsEx::SUBTRACT)
    }

    pub fn ignores_low_case(&self) -> bool {
        self.flags_ex().contains(SwitchFlagsEx::NO_LOWCASE)
    }

    /// Entries in the jump table of an indirect switch.
    pub fn jump_count(&self) -> i32 {
        self.raw.i32(layout::ex::JUMP_COUNT)
    }

    /// Number of jump table entries: `jcases` for an indirect switch,
    /// `ncases` otherwise. A negative `jcases` counts as empty.
    pub fn jump_table_size(&self) -> u32 {
        if self.is_indirect() {
            u32::try_from(self.jump_count()).unwrap_or(0)
        } else {
            self.base().case_count().into()
        }
    }

    /// Lowest case: `ind_lowcase` for an indirect switch, `lowcase` otherwise.
    pub fn low_case(&self) -> W::SignedEa {
        if self.is_indirect() {
            self.raw.signed_ea(layout::ex::INDEX_LOW_CASE)
        } else {
            self.raw.signed_ea(layout::LOW_CASE)
        }
    }

    /// Element base added to jump table entries.
    pub fn element_base(&self) -> W::Ea {
        self.raw.ea(layout::ex::ELEMENT_BASE)
    }

    /// Register holding the switch expression at the idiom start.
    pub fn register(&self) -> Option<u16> {
        u16::try_from(self.raw.i32(layout::ex::REGISTER)).ok()
    }

    /// Operand value type of that register.
    pub fn register_dtype(&self) -> u8 {
        self.raw.u8(layout::ex::REGISTER_DTYPE)
    }

    /// Processor module data for custom tables.
    pub fn custom(&self) -> W::Ea {
        self.raw.ea(layout::ex::CUSTOM)
    }

    /// Plain summary with the jump table size and low case of the
    /// extended record.
    pub fn summary(&self) -> SwitchSummary {
        let base = self.base();
        let mut summary = base.summary();
        summary.jump_table_size = self.jump_table_size();
        if self.is_indirect() {
            summary.low_case = Some(self.low_case().into());
        }
        summary
    }
}
