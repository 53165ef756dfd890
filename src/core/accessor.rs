//! Field accessors over foreign memory.
//!
//! Each accessor takes the base address of a native record and the
//! [`DualOffset`] of one field, selects the offset of the width `W` and reads
//! `size_of::<T>()` bytes there in host byte order. Nothing is validated:
//! the native engine lives in the same process and ABI, and a bad base
//! address is the caller's contract violation, not a recoverable condition.
//!
//! Reads are unaligned because the engine packs several of its records.

use std::ffi::c_void;
use std::marker::PhantomData;
use std::ptr;

use crate::core::offset::DualOffset;
use crate::core::width::AddressWidth;

/// Address of a field for the width `W`.
#[inline(always)]
pub fn field_address<W: AddressWidth>(base: *const u8, offset: DualOffset) -> *const u8 {
    base.wrapping_add(offset.for_width::<W>())
}

/// Read any plain value at `offset`.
///
/// # Safety
/// `base + offset` must be readable for `size_of::<T>()` bytes and hold a
/// valid bit pattern for `T`.
#[inline(always)]
pub unsafe fn read_field<W: AddressWidth, T: Copy>(base: *const u8, offset: DualOffset) -> T {
    ptr::read_unaligned(field_address::<W>(base, offset) as *const T)
}

/// # Safety
/// See [`read_field`].
#[inline(always)]
pub unsafe fn read_u8<W: AddressWidth>(base: *const u8, offset: DualOffset) -> u8 {
    read_field::<W, u8>(base, offset)
}

/// Non-zero byte.
///
/// # Safety
/// See [`read_field`].
#[inline(always)]
pub unsafe fn read_bool<W: AddressWidth>(base: *const u8, offset: DualOffset) -> bool {
    read_u8::<W>(base, offset) != 0
}

/// # Safety
/// See [`read_field`].
#[inline(always)]
pub unsafe fn read_u16<W: AddressWidth>(base: *const u8, offset: DualOffset) -> u16 {
    read_field::<W, u16>(base, offset)
}

/// # Safety
/// See [`read_field`].
#[inline(always)]
pub unsafe fn read_i32<W: AddressWidth>(base: *const u8, offset: DualOffset) -> i32 {
    read_field::<W, i32>(base, offset)
}

/// # Safety
/// See [`read_field`].
#[inline(always)]
pub unsafe fn read_u32<W: AddressWidth>(base: *const u8, offset: DualOffset) -> u32 {
    read_field::<W, u32>(base, offset)
}

/// Effective address, 4 or 8 bytes depending on `W`.
///
/// # Safety
/// See [`read_field`].
#[inline(always)]
pub unsafe fn read_ea<W: AddressWidth>(base: *const u8, offset: DualOffset) -> W::Ea {
    read_field::<W, W::Ea>(base, offset)
}

/// Signed effective-address-sized value (address differences).
///
/// # Safety
/// See [`read_field`].
#[inline(always)]
pub unsafe fn read_signed_ea<W: AddressWidth>(
    base: *const u8,
    offset: DualOffset,
) -> W::SignedEa {
    read_field::<W, W::SignedEa>(base, offset)
}

/// Pointer stored in the record.
///
/// Narrow layouts hold 4-byte pointers and wide layouts 8-byte ones. When
/// that differs from the host pointer width the stored value cannot name
/// memory of this process, and null is returned without reading.
///
/// # Safety
/// See [`read_field`].
#[inline(always)]
pub unsafe fn read_ptr<W: AddressWidth>(base: *const u8, offset: DualOffset) -> *const c_void {
    if !W::HOST_POINTERS {
        return ptr::null();
    }
    read_field::<W, *const c_void>(base, offset)
}

/// Copy `len` bytes starting at the field.
///
/// # Safety
/// `base + offset` must be readable for `len` bytes.
pub unsafe fn read_bytes<W: AddressWidth>(base: *const u8, offset: DualOffset, len: usize) -> Vec<u8> {
    let start = field_address::<W>(base, offset);
    std::slice::from_raw_parts(start, len).to_vec()
}

/// Bytes of a NUL-terminated string, scanning at most `max_len` bytes.
/// Returns `None` for a null pointer.
///
/// # Safety
/// `s` must be null or point to memory readable up to its terminator or
/// `max_len` bytes, whichever comes first.
pub unsafe fn read_c_string(s: *const c_void, max_len: usize) -> Option<Vec<u8>> {
    if s.is_null() {
        return None;
    }
    let start = s as *const u8;
    let mut out = Vec::new();
    for i in 0..max_len {
        let byte = ptr::read(start.add(i));
        if byte == 0 {
            break;
        }
        out.push(byte);
    }
    Some(out)
}

/// Hex dump of `len` bytes at `base`, sixteen bytes per line with a `-`
/// between the two halves.
///
/// # Safety
/// `base` must be readable for `len` bytes.
pub unsafe fn hex_dump(base: *const u8, len: usize) -> String {
    let bytes = std::slice::from_raw_parts(base, len);
    let mut out = String::new();
    for (line, chunk) in bytes.chunks(16).enumerate() {
        if line > 0 {
            out.push('\n');
        }
        out.push_str(&format!("{:08X} :", base as usize + line * 16));
        for (i, byte) in chunk.iter().enumerate() {
            if i == 8 {
                out.push_str(" -");
            }
            out.push_str(&format!(" {:02X}", byte));
        }
    }
    out
}

/// Base address of one native record, tied to the lifetime `'a` of the
/// memory it points into.
///
/// Only the record views build a `Record`, and only after their
/// constructor established that every field they read lies in readable
/// memory. That is what keeps the safe read methods below sound.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Record<'a, W: AddressWidth> {
    base: *const u8,
    _marker: PhantomData<(&'a [u8], W)>,
}

impl<'a, W: AddressWidth> Record<'a, W> {
    /// # Safety
    /// `base` must stay readable for `'a` over the whole record.
    pub(crate) unsafe fn new(base: *const u8) -> Self {
        Self {
            base,
            _marker: PhantomData,
        }
    }

    pub(crate) fn base(&self) -> *const u8 {
        self.base
    }

    pub(crate) fn at(&self, offset: DualOffset) -> *const u8 {
        field_address::<W>(self.base, offset)
    }

    pub(crate) fn u8(&self, offset: DualOffset) -> u8 {
        unsafe { read_u8::<W>(self.base, offset) }
    }

    pub(crate) fn u16(&self, offset: DualOffset) -> u16 {
        unsafe { read_u16::<W>(self.base, offset) }
    }

    pub(crate) fn i32(&self, offset: DualOffset) -> i32 {
        unsafe { read_i32::<W>(self.base, offset) }
    }

    pub(crate) fn u32(&self, offset: DualOffset) -> u32 {
        unsafe { read_u32::<W>(self.base, offset) }
    }

    pub(crate) fn ea(&self, offset: DualOffset) -> W::Ea {
        unsafe { read_ea::<W>(self.base, offset) }
    }

    pub(crate) fn signed_ea(&self, offset: DualOffset) -> W::SignedEa {
        unsafe { read_signed_ea::<W>(self.base, offset) }
    }

    pub(crate) fn ptr(&self, offset: DualOffset) -> *const c_void {
        unsafe { read_ptr::<W>(self.base, offset) }
    }
}
