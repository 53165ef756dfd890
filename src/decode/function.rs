//! Function chunk flags (`func_t::flags`).

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct FunctionFlags: u16 {
        /// Function does not return
        const NORET = 0x0001;
        const FAR = 0x0002;
        /// Library function
        const LIB = 0x0004;
        const STATIC = 0x0008;
        /// Uses a frame pointer (BP)
        const FRAME = 0x0010;
        /// Far-ness was set by the user
        const USER_FAR = 0x0020;
        const HIDDEN = 0x0040;
        /// Thunk (jump) function
        const THUNK = 0x0080;
        /// BP points to the bottom of the stack frame
        const BOTTOM_BP = 0x0100;
        /// Non-return analysis still pending
        const NORET_PENDING = 0x0200;
        /// SP analysis done, stack change points are final
        const SP_READY = 0x0400;
        /// `argsize` has been validated
        const PURGED_OK = 0x4000;
        /// Function tail chunk. Only `HIDDEN` may be set alongside.
        const TAIL = 0x8000;
    }
}

impl FunctionFlags {
    pub fn does_return(self) -> bool {
        !self.contains(Self::NORET)
    }

    pub fn is_far(self) -> bool {
        self.contains(Self::FAR)
    }

    pub fn is_tail(self) -> bool {
        self.contains(Self::TAIL)
    }

    pub fn is_thunk(self) -> bool {
        self.contains(Self::THUNK)
    }

    pub fn is_library(self) -> bool {
        self.contains(Self::LIB)
    }

    pub fn uses_frame_pointer(self) -> bool {
        self.contains(Self::FRAME)
    }

    pub fn sp_analyzed(self) -> bool {
        self.contains(Self::SP_READY)
    }

    /// `argsize` holds the real number of purged bytes, even when 0.
    pub fn purged_known(self) -> bool {
        self.contains(Self::PURGED_OK)
    }
}
