//! Field layout report for diagnostics.
//!
//! Lists every record kind with its native size and field offsets under one
//! address width, so a layout can be compared against the engine's headers
//! or against a hex dump of a live record.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::{AddressWidthMode, DualOffset};
use crate::views::{compiler, function, instruction, member, operand, segment, structure, switch};

/// One field of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLayout {
    pub name: String,
    pub offset: usize,
    /// Same offset under both widths
    pub fixed: bool,
}

/// One record kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordLayout {
    pub record: String,
    pub size: usize,
    pub fields: Vec<FieldLayout>,
}

impl RecordLayout {
    fn build(
        record: &str,
        size: DualOffset,
        fields: &[(&str, DualOffset)],
        mode: AddressWidthMode,
    ) -> Self {
        Self {
            record: record.to_string(),
            size: size.resolve(mode),
            fields: fields
                .iter()
                .map(|(name, offset)| FieldLayout {
                    name: name.to_string(),
                    offset: offset.resolve(mode),
                    fixed: offset.is_fixed(),
                })
                .collect(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldLayout> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Layouts of every record kind under one width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutReport {
    pub mode: AddressWidthMode,
    pub records: Vec<RecordLayout>,
}

impl LayoutReport {
    pub fn for_mode(mode: AddressWidthMode) -> Self {
        let kinds: [(&str, DualOffset, &[(&str, DualOffset)]); 9] = [
            ("compiler_info_t", compiler::layout::SIZE, compiler::layout::FIELDS),
            ("struc_t", structure::layout::SIZE, structure::layout::FIELDS),
            ("member_t", member::layout::SIZE, member::layout::FIELDS),
            ("op_t", operand::layout::SIZE, operand::layout::FIELDS),
            ("insn_t", instruction::layout::SIZE, instruction::layout::FIELDS),
            ("segment_t", segment::layout::SIZE, segment::layout::FIELDS),
            ("func_t", function::layout::SIZE, function::layout::FIELDS),
            ("switch_info_t", switch::layout::SIZE, switch::layout::FIELDS),
            ("switch_info_ex_t", switch::layout::ex::SIZE, switch::layout::ex::FIELDS),
        ];
        let records = kinds
            .iter()
            .map(|(record, size, fields)| RecordLayout::build(record, *size, fields, mode))
            .collect();
        Self { mode, records }
    }

    /// Report for the width this binary was built with.
    pub fn active() -> Self {
        Self::for_mode(AddressWidthMode::ACTIVE)
    }

    pub fn record(&self, name: &str) -> Option<&RecordLayout> {
        self.records.iter().find(|r| r.record == name)
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for LayoutReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "record layouts ({})", self.mode)?;
        for record in &self.records {
            writeln!(f, "{} ({:#x} bytes)", record.record, record.size)?;
            for field in &record.fields {
                writeln!(f, "  {:#06x} {}", field.offset, field.name)?;
            }
        }
        Ok(())
    }
}
