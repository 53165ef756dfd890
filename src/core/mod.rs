//! Core marshaling primitives for idaview.
//!
//! This module holds the address-width policy, the dual-offset type and the
//! field accessors every record view is built on.

pub mod accessor;
pub mod offset;
pub mod width;

pub use offset::DualOffset;
pub use width::{ActiveWidth, AddressWidth, AddressWidthMode, Ea, Narrow, Wide, IS_WIDE_MODE};
