//! Structure members (`member_t`).

use serde::{Deserialize, Serialize};

use crate::core::AddressWidth;
use crate::decode::MemberProperties;

pub mod layout {
    use crate::core::DualOffset;

    /// `tid_t id`
    pub const ID: DualOffset = DualOffset::fixed(0);
    /// `ea_t soff`
    pub const START_OFFSET: DualOffset = DualOffset::new(0x04, 0x08);
    /// `ea_t eoff`
    pub const END_OFFSET: DualOffset = DualOffset::new(0x08, 0x10);
    /// `flags_t flag`
    pub const FLAGS: DualOffset = DualOffset::new(0x0C, 0x18);
    /// `uint32 props`
    pub const PROPERTIES: DualOffset = DualOffset::new(0x10, 0x1C);
    pub const SIZE: DualOffset = DualOffset::new(0x14, 0x20);

    pub const FIELDS: &[(&str, DualOffset)] = &[
        ("id", ID),
        ("soff", START_OFFSET),
        ("eoff", END_OFFSET),
        ("flag", FLAGS),
        ("props", PROPERTIES),
    ];
}

native_view!(
    /// View over one member of a structure.
    MemberView,
    "member_t",
    layout::SIZE
);

impl<'a, W: AddressWidth> MemberView<'a, W> {
    pub fn id(&self) -> W::Ea {
        self.raw.ea(layout::ID)
    }

    /// Start offset of the member.
    ///
    /// Reported only for union members. For every other member the stored
    /// value is ignored and 0 is returned.
    pub fn start_offset(&self) -> W::Ea {
        if self.is_union_member() {
            self.raw_start_offset()
        } else {
            W::Ea::default()
        }
    }

    /// Stored `soff` field, whatever the member kind.
    pub fn raw_start_offset(&self) -> W::Ea {
        self.raw.ea(layout::START_OFFSET)
    }

    pub fn end_offset(&self) -> W::Ea {
        self.raw.ea(layout::END_OFFSET)
    }

    /// Type and representation flags (`flags_t`), not decoded here.
    pub fn flags(&self) -> u32 {
        self.raw.u32(layout::FLAGS)
    }

    pub fn properties(&self) -> MemberProperties {
        MemberProperties::from_bits_retain(self.raw.i32(layout::PROPERTIES) as u32)
    }

    pub fn is_union_member(&self) -> bool {
        self.properties().is_union_member()
    }

    pub fn has_union_member(&self) -> bool {
        self.properties().has_union_member()
    }

    /// Member was created from a type library.
    pub fn is_by_type_library(&self) -> bool {
        self.properties().is_by_type_library()
    }

    pub fn has_type_info(&self) -> bool {
        self.properties().has_type_info()
    }

    /// `end_offset - start_offset`, 0 when the stored range is inverted.
    pub fn size(&self) -> u64 {
        let start: u64 = self.start_offset().into();
        let end: u64 = self.end_offset().into();
        end.saturating_sub(start)
    }

    pub fn summary(&self) -> MemberSummary {
        MemberSummary {
            id: self.id().into(),
            start_offset: self.start_offset().into(),
            end_offset: self.end_offset().into(),
            flags: self.flags(),
            properties: self.properties(),
        }
    }
}

/// Owned copy of a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSummary {
    pub id: u64,
    pub start_offset: u64,
    pub end_offset: u64,
    pub flags: u32,
    pub properties: MemberProperties,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DualOffset, Narrow, Wide};

    fn member<W: AddressWidth>(soff: u64, eoff: u64, props: u32) -> Vec<u8> {
        let mut buf = vec![0u8; layout::SIZE.for_width::<W>()];
        let ea_len = W::MODE.ea_bytes();
        let mut put = |off: DualOffset, bytes: &[u8]| {
            let at = off.for_width::<W>();
            buf[at..at + bytes.len()].copy_from_slice(bytes);
        };
        put(layout::ID, &0xFF00_0100u64.to_ne_bytes()[..ea_len]);
        put(layout::START_OFFSET, &soff.to_ne_bytes()[..ea_len]);
        put(layout::END_OFFSET, &eoff.to_ne_bytes()[..ea_len]);
        put(layout::FLAGS, &0x5040_0400u32.to_ne_bytes());
        put(layout::PROPERTIES, &props.to_ne_bytes());
        buf
    }

    #[test]
    fn test_start_offset_suppressed_outside_unions() {
        let buf = member::<Narrow>(0x10, 0x14, 0);
        let view = MemberView::<Narrow>::from_bytes(&buf).unwrap();
        assert_eq!(view.raw_start_offset(), 0x10);
        assert_eq!(view.start_offset(), 0);
        assert_eq!(view.end_offset(), 0x14);
        assert_eq!(view.size(), 0x14);
    }

    #[test]
    fn test_start_offset_reported_for_union_members() {
        let buf = member::<Wide>(3, 8, 0x02);
        let view = MemberView::<Wide>::from_bytes(&buf).unwrap();
        assert!(view.is_union_member());
        assert_eq!(view.start_offset(), 3u64);
        assert_eq!(view.size(), 5);
    }

    #[test]
    fn test_fields_follow_width() {
        let buf = member::<Wide>(0, 0x20, 0x1C);
        let view = MemberView::<Wide>::from_bytes(&buf).unwrap();
        assert_eq!(view.id(), 0xFF00_0100u64);
        assert_eq!(view.flags(), 0x5040_0400);
        assert!(view.has_union_member());
        assert!(view.is_by_type_library());
        assert!(view.has_type_info());
        assert!(!view.is_union_member());
        assert_eq!(view.properties().bits(), 0x1C);

        // the narrow layout is too short for a wide record and vice versa
        assert_eq!(MemberView::<Narrow>::native_size(), 0x14);
        assert!(MemberView::<Wide>::from_bytes(&buf[..0x14]).is_err());
    }

    #[test]
    fn test_summary() {
        let buf = member::<Narrow>(1, 9, 0x02);
        let view = MemberView::<Narrow>::from_bytes(&buf).unwrap();
        let summary = view.summary();
        assert_eq!(summary.start_offset, 1);
        assert_eq!(summary.end_offset, 9);
        assert_eq!(summary.id, 0xFF00_0100);
        assert!(summary.properties.is_union_member());
    }
}
