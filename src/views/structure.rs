//! Structure definitions (`struc_t`).

use serde::{Deserialize, Serialize};
use std::ffi::c_void;
use tracing::debug;

use crate::core::accessor::read_ea;
use crate::core::AddressWidth;
use crate::decode::StructureProperties;
use crate::views::member::{MemberSummary, MemberView};

pub mod layout {
    use crate::core::DualOffset;

    /// `tid_t id`
    pub const ID: DualOffset = DualOffset::fixed(0);
    /// `size_t memqty`
    pub const MEMBER_COUNT: DualOffset = DualOffset::new(0x04, 0x08);
    /// `member_t *members`
    pub const MEMBERS: DualOffset = DualOffset::new(0x08, 0x0C);
    /// `ushort age`
    pub const AGE: DualOffset = DualOffset::new(0x0C, 0x14);
    /// `uint32 props`
    pub const PROPERTIES: DualOffset = DualOffset::new(0x0E, 0x16);
    /// `int32 ordinal`
    pub const ORDINAL: DualOffset = DualOffset::new(0x12, 0x1A);
    pub const SIZE: DualOffset = DualOffset::new(0x16, 0x1E);

    pub const FIELDS: &[(&str, DualOffset)] = &[
        ("id", ID),
        ("memqty", MEMBER_COUNT),
        ("members", MEMBERS),
        ("age", AGE),
        ("props", PROPERTIES),
        ("ordinal", ORDINAL),
    ];
}

native_view!(
    /// View over a structure definition.
    ///
    /// Only defined members are listed; the engine leaves holes out of the
    /// member array.
    StructureView,
    "struc_t",
    layout::SIZE
);

impl<'a, W: AddressWidth> StructureView<'a, W> {
    /// Read the id of the structure at `base` without building a view.
    ///
    /// # Safety
    /// `base` must point to a live `struc_t` laid out for `W`.
    pub unsafe fn id_at(base: *const u8) -> W::Ea {
        read_ea::<W>(base, layout::ID)
    }

    pub fn id(&self) -> W::Ea {
        self.raw.ea(layout::ID)
    }

    /// Number of defined members.
    pub fn member_count(&self) -> u32 {
        self.raw.u32(layout::MEMBER_COUNT)
    }

    /// Engine-owned array of `member_count` members. Null when the layout's
    /// pointer width differs from the host's, see [`AddressWidth::HOST_POINTERS`].
    pub fn members_ptr(&self) -> *const c_void {
        self.raw.ptr(layout::MEMBERS)
    }

    /// Change counter maintained by the engine.
    pub fn age(&self) -> u16 {
        self.raw.u16(layout::AGE)
    }

    pub fn properties(&self) -> StructureProperties {
        StructureProperties::from_bits_retain(self.raw.u32(layout::PROPERTIES))
    }

    /// Local type ordinal, 0 when the structure has none.
    pub fn ordinal(&self) -> i32 {
        self.raw.i32(layout::ORDINAL)
    }

    pub fn is_variable_size(&self) -> bool {
        self.properties().is_variable_size()
    }

    pub fn is_union(&self) -> bool {
        self.properties().is_union()
    }

    pub fn has_union_member(&self) -> bool {
        self.properties().has_union_member()
    }

    /// Structure does not appear in the structure chooser.
    pub fn is_not_listed(&self) -> bool {
        self.properties().is_not_listed()
    }

    pub fn is_from_type_library(&self) -> bool {
        self.properties().is_from_type_library()
    }

    pub fn is_hidden(&self) -> bool {
        self.properties().is_hidden()
    }

    /// Function frame structure.
    pub fn is_frame(&self) -> bool {
        self.properties().is_frame()
    }

    /// View of the member at `index` in the member array.
    ///
    /// # Safety
    /// `members_ptr` must point to an array of at least `member_count`
    /// members laid out for `W`, live for `'a`.
    pub unsafe fn member(&self, index: u32) -> Option<MemberView<'a, W>> {
        let count = self.member_count();
        let members = self.members_ptr() as *const u8;
        if index >= count || members.is_null() {
            return None;
        }
        let stride = MemberView::<W>::native_size();
        Some(MemberView::from_ptr(members.add(index as usize * stride)))
    }

    /// Views of every member, in array order.
    ///
    /// # Safety
    /// Same contract as [`Self::member`].
    pub unsafe fn members(&self) -> Members<'a, W> {
        let count = self.member_count();
        debug!(id = %self.id(), count, "walking structure members");
        Members {
            base: self.members_ptr() as *const u8,
            count: if self.members_ptr().is_null() { 0 } else { count },
            next: 0,
            _width: std::marker::PhantomData,
        }
    }

    /// Owned copy of the structure header.
    pub fn summary(&self) -> StructureSummary {
        StructureSummary {
            id: self.id().into(),
            member_count: self.member_count(),
            age: self.age(),
            properties: self.properties(),
            ordinal: self.ordinal(),
        }
    }

    /// Owned copies of every member.
    ///
    /// # Safety
    /// Same contract as [`Self::member`].
    pub unsafe fn member_summaries(&self) -> Vec<MemberSummary> {
        crate::span_trace!("member_summaries", id = %self.id(), mode = %W::MODE);
        self.members().map(|m| m.summary()).collect()
    }
}

/// Iterator over the member array of a structure.
#[derive(Debug)]
pub struct Members<'a, W: AddressWidth> {
    base: *const u8,
    count: u32,
    next: u32,
    _width: std::marker::PhantomData<MemberView<'a, W>>,
}

impl<'a, W: AddressWidth> Iterator for Members<'a, W> {
    type Item = MemberView<'a, W>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let stride = MemberView::<W>::native_size();
        // `StructureView::members` requires the array to hold `count` members.
        let member =
            unsafe { MemberView::from_ptr(self.base.add(self.next as usize * stride)) };
        self.next += 1;
        Some(member)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.count - self.next) as usize;
        (left, Some(left))
    }
}

impl<'a, W: AddressWidth> ExactSizeIterator for Members<'a, W> {}

/// Owned copy of a structure header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureSummary {
    pub id: u64,
    pub member_count: u32,
    pub age: u16,
    pub properties: StructureProperties,
    pub ordinal: i32,
}

impl StructureSummary {
    pub fn is_union(&self) -> bool {
        self.properties.is_union()
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DualOffset, Narrow, Wide};

    fn header<W: AddressWidth>(id: u64, count: u32, age: u16, props: u32, ordinal: i32) -> Vec<u8> {
        let mut buf = vec![0u8; layout::SIZE.for_width::<W>()];
        let ea_len = W::MODE.ea_bytes();
        buf[..ea_len].copy_from_slice(&id.to_ne_bytes()[..ea_len]);
        let put = |buf: &mut Vec<u8>, off: DualOffset, bytes: &[u8]| {
            let at = off.for_width::<W>();
            buf[at..at + bytes.len()].copy_from_slice(bytes);
        };
        put(&mut buf, layout::MEMBER_COUNT, &count.to_ne_bytes());
        put(&mut buf, layout::AGE, &age.to_ne_bytes());
        put(&mut buf, layout::PROPERTIES, &props.to_ne_bytes());
        put(&mut buf, layout::ORDINAL, &ordinal.to_ne_bytes());
        buf
    }

    #[test]
    fn test_header_fields_narrow() {
        let buf = header::<Narrow>(0xFF00_0012, 3, 7, 0x06, 42);
        let view = StructureView::<Narrow>::from_bytes(&buf).unwrap();
        assert_eq!(view.id(), 0xFF00_0012u32);
        assert_eq!(view.member_count(), 3);
        assert_eq!(view.age(), 7);
        assert_eq!(view.ordinal(), 42);
        assert!(view.is_union());
        assert!(view.has_union_member());
        assert!(!view.is_variable_size());
        assert_eq!(unsafe { StructureView::<Narrow>::id_at(buf.as_ptr()) }, 0xFF00_0012);
    }

    #[test]
    fn test_header_fields_wide() {
        let buf = header::<Wide>(0xFF00_0000_0000_0012, 1, 2, 0x41, -1);
        let view = StructureView::<Wide>::from_bytes(&buf).unwrap();
        assert_eq!(view.id(), 0xFF00_0000_0000_0012u64);
        assert_eq!(view.member_count(), 1);
        assert_eq!(view.age(), 2);
        assert_eq!(view.ordinal(), -1);
        assert!(view.is_variable_size());
        assert!(view.is_frame());
        assert!(!view.is_union());
        assert_eq!(view.summary().properties.bits(), 0x41);
    }

    #[test]
    fn test_property_bits_match_mask() {
        let mask = 0x01 | 0x08 | 0x10 | 0x20;
        let buf = header::<Narrow>(1, 0, 0, mask, 0);
        let view = StructureView::<Narrow>::from_bytes(&buf).unwrap();
        assert!(view.is_variable_size());
        assert!(view.is_not_listed());
        assert!(view.is_from_type_library());
        assert!(view.is_hidden());
        assert!(!view.is_union());
        assert!(!view.is_frame());
        assert_eq!(view.properties().bits(), mask);
    }

    #[test]
    fn test_null_member_array() {
        let buf = header::<Wide>(1, 4, 0, 0, 0);
        let view = StructureView::<Wide>::from_bytes(&buf).unwrap();
        assert!(view.members_ptr().is_null());
        unsafe {
            assert_eq!(view.members().count(), 0);
            assert!(view.member(0).is_none());
        }
    }

    #[test]
    fn test_pointer_does_not_absorb_following_fields() {
        let buf = header::<Narrow>(1, 2, 0x1234, 0x02, 0);
        let view = StructureView::<Narrow>::from_bytes(&buf).unwrap();
        assert_eq!(view.age(), 0x1234);
        assert!(view.is_union());
        if !Narrow::HOST_POINTERS {
            assert!(view.members_ptr().is_null());
            unsafe {
                assert_eq!(view.members().len(), 0);
                assert!(view.member(0).is_none());
            }
        }
    }

    #[test]
    fn test_summary_json() {
        let buf = header::<Narrow>(5, 2, 1, 0x02, 9);
        let view = StructureView::<Narrow>::from_bytes(&buf).unwrap();
        let json = view.summary().to_json().unwrap();
        assert!(json.contains("\"member_count\":2"));
        assert!(json.contains("\"properties\":2"));
        assert!(view.summary().is_union());
    }
}
