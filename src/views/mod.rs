//! Read-only views over native records.
//!
//! A view wraps the base address of a record owned by the native engine and
//! reads fields on demand through the dual-offset accessors. Views never
//! copy, cache, free or mutate the record: every property access reads
//! foreign memory again, because the engine may rewrite the record between
//! two reads. A view must not outlive the call that produced its address.
//!
//! Every view can be built three ways:
//! - `from_ptr`: unchecked, for addresses handed out by the engine;
//! - `try_from_ptr`: same, but rejects null;
//! - `from_bytes`: safe, over a byte slice covering the record's native size.

/// Declares a view type over one native record kind together with its
/// constructors.
macro_rules! native_view {
    ($(#[$meta:meta])* $name:ident, $record:literal, $size:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name<'a, W: $crate::core::AddressWidth = $crate::core::ActiveWidth> {
            raw: $crate::core::accessor::Record<'a, W>,
        }

        impl<'a, W: $crate::core::AddressWidth> $crate::views::NativeRecord for $name<'a, W> {
            const NAME: &'static str = $record;
            const SIZE: $crate::core::DualOffset = $size;
        }

        impl<'a, W: $crate::core::AddressWidth> $name<'a, W> {
            /// Wrap the record at `base`.
            ///
            /// # Safety
            /// `base` must point to a live record of this kind laid out for
            /// the width `W`, readable over its whole native size and left in
            /// place by the engine for `'a`.
            pub unsafe fn from_ptr(base: *const u8) -> Self {
                tracing::trace!(record = $record, base = ?base, "wrapping native record");
                Self {
                    raw: $crate::core::accessor::Record::new(base),
                }
            }

            /// [`Self::from_ptr`] that rejects a null address.
            ///
            /// # Safety
            /// Same contract as [`Self::from_ptr`] for non-null addresses.
            pub unsafe fn try_from_ptr(base: *const u8) -> $crate::error::Result<Self> {
                $crate::views::check_not_null($record, base)?;
                Ok(Self::from_ptr(base))
            }

            /// View a record held in a byte slice. Fails when the slice is
            /// shorter than the record's size under `W`.
            pub fn from_bytes(bytes: &'a [u8]) -> $crate::error::Result<Self> {
                $crate::views::check_len::<W>($record, $size, bytes)?;
                // The slice covers every field of the record for `'a`.
                Ok(unsafe { Self::from_ptr(bytes.as_ptr()) })
            }

            /// Base address of the wrapped record.
            pub fn as_ptr(&self) -> *const u8 {
                self.raw.base()
            }

            /// Size of this record under `W`.
            pub fn native_size() -> usize {
                <Self as $crate::views::NativeRecord>::size_for::<W>()
            }

            /// Hex dump of the whole record.
            pub fn dump(&self) -> String {
                unsafe { $crate::core::accessor::hex_dump(self.raw.base(), Self::native_size()) }
            }
        }
    };
}

pub mod compiler;
pub mod function;
pub mod instruction;
pub mod instruction_descriptor;
pub mod member;
pub mod operand;
pub mod segment;
pub mod structure;
pub mod switch;

pub use compiler::{CompilerInfo, CompilerView};
pub use function::{FunctionFrame, FunctionSummary, FunctionView};
pub use instruction::InstructionView;
pub use instruction_descriptor::{
    InstructionDescriptor, InstructionTable, RawInstructionDescriptor,
};
pub use member::{MemberSummary, MemberView};
pub use operand::{OperandSummary, OperandView};
pub use segment::SegmentView;
pub use structure::{Members, StructureSummary, StructureView};
pub use switch::{SwitchInfoExView, SwitchInfoView, SwitchSummary};

use crate::core::{AddressWidth, DualOffset};
use crate::error::{MarshalError, Result};

/// A native record kind with a known size under both widths.
pub trait NativeRecord {
    /// Native type name, used in errors and logs.
    const NAME: &'static str;
    /// Total size of the record.
    const SIZE: DualOffset;

    /// Size of the record under the width `W`.
    fn size_for<W: AddressWidth>() -> usize {
        Self::SIZE.for_width::<W>()
    }
}

pub(crate) fn check_not_null(record: &'static str, base: *const u8) -> Result<()> {
    if base.is_null() {
        return Err(crate::log_error!(MarshalError::NullPointer { record }, record));
    }
    Ok(())
}

pub(crate) fn check_len<W: AddressWidth>(
    record: &'static str,
    size: DualOffset,
    bytes: &[u8],
) -> Result<()> {
    let needed = size.for_width::<W>();
    if bytes.len() < needed {
        let found = bytes.len();
        return Err(crate::log_error!(
            MarshalError::BufferTooSmall {
                record,
                needed,
                found,
            },
            record,
            needed,
            found,
            mode = %W::MODE
        ));
    }
    Ok(())
}
