//! Static instruction metadata (`instruc_t`) and the processor's table of it.
//!
//! Unlike the other records, an instruction descriptor has the same layout
//! under both address widths: a host pointer to the mnemonic followed by the
//! feature bits. The mnemonic is copied into an owned `String` when the
//! descriptor is built, since nothing bounds the lifetime of the foreign
//! string.

use serde::{Deserialize, Serialize};
use std::ffi::{c_char, c_void};
use std::marker::PhantomData;
use tracing::{debug, trace};

use crate::config::MarshalConfig;
use crate::core::accessor::read_c_string;
use crate::decode::InstructionFeature;
use crate::error::Result;
use crate::views::check_not_null;

/// Native layout of one descriptor.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawInstructionDescriptor {
    pub name: *const c_char,
    pub feature: u32,
}

/// Owned instruction descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionDescriptor {
    name: Option<String>,
    feature: InstructionFeature,
}

impl InstructionDescriptor {
    /// Copy the descriptor at `raw`, decoding its name per `config`.
    ///
    /// # Safety
    /// `raw` must point to a live descriptor whose name pointer is null or
    /// points to a string readable up to its terminator or
    /// `config.max_name_length` bytes.
    pub unsafe fn from_ptr(raw: *const RawInstructionDescriptor, config: &MarshalConfig) -> Self {
        let desc = std::ptr::read_unaligned(raw);
        let name = read_c_string(desc.name as *const c_void, config.max_name_length)
            .map(|bytes| config.decode_name(&bytes));
        trace!(name = ?name, feature = desc.feature, "materialized instruction descriptor");
        Self {
            name,
            feature: InstructionFeature::from_bits_retain(desc.feature),
        }
    }

    /// [`Self::from_ptr`] that rejects a null descriptor address.
    ///
    /// # Safety
    /// Same contract as [`Self::from_ptr`] for non-null addresses.
    pub unsafe fn try_from_ptr(
        raw: *const RawInstructionDescriptor,
        config: &MarshalConfig,
    ) -> Result<Self> {
        check_not_null("instruc_t", raw as *const u8)?;
        Ok(Self::from_ptr(raw, config))
    }

    pub fn new(name: Option<String>, feature: InstructionFeature) -> Self {
        Self { name, feature }
    }

    /// Mnemonic, `None` when the engine stored a null name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn feature(&self) -> InstructionFeature {
        self.feature
    }

    pub fn is_stop(&self) -> bool {
        self.feature.is_stop()
    }

    pub fn is_call(&self) -> bool {
        self.feature.is_call()
    }

    pub fn is_indirect_jump(&self) -> bool {
        self.feature.is_indirect_jump()
    }

    pub fn is_shift(&self) -> bool {
        self.feature.is_shift()
    }

    /// Operand `n` (0-based) is modified.
    pub fn changes_operand(&self, n: usize) -> bool {
        self.feature.changes_operand(n)
    }

    /// Operand `n` (0-based) is read.
    pub fn uses_operand(&self, n: usize) -> bool {
        self.feature.uses_operand(n)
    }

    /// Size of the native record on this host.
    pub const fn native_size() -> usize {
        std::mem::size_of::<RawInstructionDescriptor>()
    }
}

/// The processor module's descriptor array with its canonical code range
/// `[first, last)`.
#[derive(Debug, Clone, Copy)]
pub struct InstructionTable<'a> {
    base: *const RawInstructionDescriptor,
    first: u16,
    last: u16,
    _marker: PhantomData<&'a [RawInstructionDescriptor]>,
}

impl<'a> InstructionTable<'a> {
    /// # Safety
    /// `base` must point to `last - first` descriptors live for `'a`, each
    /// meeting the contract of [`InstructionDescriptor::from_ptr`].
    pub unsafe fn from_ptr(base: *const RawInstructionDescriptor, first: u16, last: u16) -> Self {
        debug!(first, last, "wrapping instruction table");
        Self {
            base,
            first,
            last: last.max(first),
            _marker: PhantomData,
        }
    }

    /// Table over a slice whose first entry describes code `first`.
    ///
    /// # Safety
    /// Every name pointer in `entries` must meet the contract of
    /// [`InstructionDescriptor::from_ptr`].
    pub unsafe fn from_slice(entries: &'a [RawInstructionDescriptor], first: u16) -> Self {
        let last = first.saturating_add(entries.len().min(u16::MAX as usize) as u16);
        Self::from_ptr(entries.as_ptr(), first, last)
    }

    pub fn first(&self) -> u16 {
        self.first
    }

    pub fn last(&self) -> u16 {
        self.last
    }

    pub fn len(&self) -> usize {
        (self.last - self.first) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `itype` names an instruction of this processor module.
    pub fn is_canonical(&self, itype: u16) -> bool {
        itype >= self.first && itype < self.last
    }

    /// Index of `itype` inside the table.
    pub fn canonical_code(&self, itype: u16) -> Option<usize> {
        self.is_canonical(itype).then(|| (itype - self.first) as usize)
    }

    pub fn descriptor(&self, itype: u16, config: &MarshalConfig) -> Option<InstructionDescriptor> {
        let index = self.canonical_code(itype)?;
        // `from_ptr` guarantees `len()` readable entries.
        Some(unsafe { InstructionDescriptor::from_ptr(self.base.add(index), config) })
    }

    /// Mnemonic of `itype`, if canonical and named.
    pub fn mnemonic(&self, itype: u16, config: &MarshalConfig) -> Option<String> {
        self.descriptor(itype, config)?.name
    }

    /// `(itype, descriptor)` for every canonical code.
    pub fn iter<'c>(
        &self,
        config: &'c MarshalConfig,
    ) -> impl Iterator<Item = (u16, InstructionDescriptor)> + 'c
    where
        'a: 'c,
    {
        let table: InstructionTable<'c> = *self;
        (table.first..table.last).filter_map(move |itype| {
            table
                .descriptor(itype, config)
                .map(|descriptor| (itype, descriptor))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NameEncoding;
    use crate::decode::x86::itype;

    fn entries(names: &[&'static [u8]]) -> Vec<RawInstructionDescriptor> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| RawInstructionDescriptor {
                name: if name.is_empty() {
                    std::ptr::null()
                } else {
                    name.as_ptr() as *const c_char
                },
                feature: if i == 0 { 0x0001 } else { 0x0102 },
            })
            .collect()
    }

    #[test]
    fn test_descriptor_materializes_name() {
        let raw = entries(&[b"retn\0"]);
        let config = MarshalConfig::default();
        let descriptor = unsafe { InstructionDescriptor::from_ptr(raw.as_ptr(), &config) };
        assert_eq!(descriptor.name(), Some("retn"));
        assert!(descriptor.is_stop());
        assert!(!descriptor.is_call());
    }

    #[test]
    fn test_name_survives_foreign_string() {
        let text = b"call\0".to_vec();
        let raw = [RawInstructionDescriptor {
            name: text.as_ptr() as *const c_char,
            feature: InstructionFeature::CALL.bits(),
        }];
        let config = MarshalConfig::default();
        let descriptor = unsafe { InstructionDescriptor::from_ptr(raw.as_ptr(), &config) };
        drop(text);
        assert_eq!(descriptor.name(), Some("call"));
        assert!(descriptor.is_call());
    }

    #[test]
    fn test_null_name_and_null_descriptor() {
        let raw = entries(&[b""]);
        let config = MarshalConfig::default();
        let descriptor = unsafe { InstructionDescriptor::from_ptr(raw.as_ptr(), &config) };
        assert_eq!(descriptor.name(), None);
        let rejected =
            unsafe { InstructionDescriptor::try_from_ptr(std::ptr::null(), &config) };
        assert!(rejected.is_err());
    }

    #[test]
    fn test_name_bound_and_encoding() {
        let raw = entries(&[b"fr\xE9d\0"]);
        let bounded = MarshalConfig {
            max_name_length: 2,
            ..MarshalConfig::default()
        };
        let descriptor = unsafe { InstructionDescriptor::from_ptr(raw.as_ptr(), &bounded) };
        assert_eq!(descriptor.name(), Some("fr"));

        let utf8 = MarshalConfig {
            name_encoding: NameEncoding::Utf8Lossy,
            ..MarshalConfig::default()
        };
        let descriptor = unsafe { InstructionDescriptor::from_ptr(raw.as_ptr(), &utf8) };
        assert_eq!(descriptor.name(), Some("fr\u{fffd}d"));
    }

    #[test]
    fn test_table_range() {
        let raw = entries(&[b"ja\0", b"jae\0", b"jb\0"]);
        let config = MarshalConfig::default();
        let table = unsafe { InstructionTable::from_slice(&raw, itype::JA) };
        assert_eq!(table.len(), 3);
        assert!(table.is_canonical(itype::JA));
        assert!(table.is_canonical(itype::JA + 2));
        assert!(!table.is_canonical(itype::JA + 3));
        assert!(!table.is_canonical(itype::JA - 1));
        assert_eq!(table.canonical_code(itype::JA + 1), Some(1));
        assert_eq!(table.mnemonic(itype::JA + 1, &config).as_deref(), Some("jae"));
        assert!(table.descriptor(0, &config).is_none());

        let listed: Vec<(u16, Option<String>)> = table
            .iter(&config)
            .map(|(code, d)| (code, d.name().map(str::to_string)))
            .collect();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[2], (itype::JA + 2, Some("jb".to_string())));
        assert!(table.descriptor(itype::JA + 1, &config).unwrap().uses_operand(0));
    }
}
