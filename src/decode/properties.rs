//! Structure and member property flags (`SF_*`, `MF_*`).

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Properties of a structure type (`struc_t::props`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct StructureProperties: u32 {
        /// Variable size: the last member has zero size. A structure whose
        /// last member is itself variable-size is variable-size too; the
        /// engine maintains that, it is not re-derived here.
        const VARIABLE_SIZE = 0x0000_0001;
        /// The structure is a union
        const UNION = 0x0000_0002;
        /// Has members of union type
        const HAS_UNION_MEMBER = 0x0000_0004;
        /// Not listed in the structure chooser
        const NOT_LISTED = 0x0000_0008;
        /// Comes from a type library
        const FROM_TYPE_LIBRARY = 0x0000_0010;
        /// Collapsed in the listing
        const HIDDEN = 0x0000_0020;
        /// Function stack frame
        const FRAME = 0x0000_0040;
    }
}

bitflags! {
    /// Properties of a structure member (`member_t::props`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct MemberProperties: u32 {
        /// Always set by the engine
        const OK = 0x0000_0001;
        /// Member of a union
        const UNION_MEMBER = 0x0000_0002;
        /// Has members of union type
        const HAS_UNION_MEMBER = 0x0000_0004;
        /// Created by the type system
        const BY_TYPE_LIBRARY = 0x0000_0008;
        /// Carries type information
        const HAS_TYPE_INFO = 0x0000_0010;
    }
}

impl StructureProperties {
    pub fn is_variable_size(self) -> bool {
        self.contains(Self::VARIABLE_SIZE)
    }

    pub fn is_union(self) -> bool {
        self.contains(Self::UNION)
    }

    pub fn has_union_member(self) -> bool {
        self.contains(Self::HAS_UNION_MEMBER)
    }

    /// Excluded from the structure chooser.
    pub fn is_not_listed(self) -> bool {
        self.contains(Self::NOT_LISTED)
    }

    pub fn is_from_type_library(self) -> bool {
        self.contains(Self::FROM_TYPE_LIBRARY)
    }

    pub fn is_hidden(self) -> bool {
        self.contains(Self::HIDDEN)
    }

    pub fn is_frame(self) -> bool {
        self.contains(Self::FRAME)
    }
}

impl MemberProperties {
    pub fn is_union_member(self) -> bool {
        self.contains(Self::UNION_MEMBER)
    }

    pub fn has_union_member(self) -> bool {
        self.contains(Self::HAS_UNION_MEMBER)
    }

    pub fn is_by_type_library(self) -> bool {
        self.contains(Self::BY_TYPE_LIBRARY)
    }

    pub fn has_type_info(self) -> bool {
        self.contains(Self::HAS_TYPE_INFO)
    }
}
