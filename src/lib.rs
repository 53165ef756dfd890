//! Typed, width-aware views over the native records of a disassembly engine.
//!
//! The engine keeps its analysis state in packed C records (`struc_t`,
//! `member_t`, `op_t`, `insn_t`, `segment_t`, `func_t`, `switch_info_t`,
//! `compiler_info_t`) whose field offsets depend on whether effective
//! addresses are 32 or 64 bits wide.
//! Each view here wraps a base address, resolves field offsets for its
//! [`AddressWidth`](core::AddressWidth) and reads straight from memory on every
//! access. Nothing is cached, so a view always reflects the engine's current
//! state.
//!
//! ```
//! use idaview::core::Narrow;
//! use idaview::views::CompilerView;
//!
//! let record = [1u8, 0x23, 4, 1, 4, 8, 2, 4, 8];
//! let info = CompilerView::<Narrow>::from_bytes(&record).unwrap();
//! assert_eq!(info.sizeof_int(), 4);
//! assert_eq!(info.sizeof_longlong(), 8);
//! ```

#[cfg(feature = "python-ext")]
use pyo3::prelude::*;

pub mod config;
/// Address width policy and raw field accessors
pub mod core;
/// Flag sets and enumerations stored in record fields
pub mod decode;
pub mod error;
pub mod layout;
pub mod logging;
/// Record views
pub mod views;
/// x86 operand addressing
pub mod x86;

#[cfg(feature = "python-ext")]
mod python_bindings;

pub use config::{MarshalConfig, NameEncoding};
pub use core::{ActiveWidth, AddressWidth, AddressWidthMode, DualOffset, Narrow, Wide};
pub use error::{MarshalError, Result};
pub use layout::LayoutReport;
pub use views::{
    CompilerView, FunctionView, InstructionTable, InstructionView, MemberView, OperandView,
    SegmentView, StructureView, SwitchInfoExView, SwitchInfoView,
};

/// Python extension module.
#[cfg(feature = "python-ext")]
#[pymodule]
fn idaview(m: &Bound<'_, PyModule>) -> PyResult<()> {
    python_bindings::register_python_bindings(m.py(), m)
}
