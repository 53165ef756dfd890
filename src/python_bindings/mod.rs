//! Python bindings for idaview.
//!
//! Every class holds only the address of a native record. Each property
//! access builds a fresh view over that address for the width this module
//! was built with, so Python always sees the engine's current state. The
//! addresses come from the engine's own bindings; passing anything else
//! reads arbitrary memory.

use pyo3::prelude::*;

use crate::config::MarshalConfig;
use crate::core::IS_WIDE_MODE;
use crate::decode::x86;
use crate::layout::LayoutReport;
use crate::logging::{init_logging, log_message, LogLevel};
use crate::views::{
    CompilerView, FunctionView, InstructionView, MemberView, OperandView, SegmentView,
    StructureView, SwitchInfoView,
};
use crate::x86::X86Instruction;

/// Register all Python bindings with the module.
pub fn register_python_bindings(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("IS_WIDE_MODE", IS_WIDE_MODE)?;
    m.add("ADDRESS_WIDTH", crate::core::AddressWidthMode::ACTIVE.to_string())?;

    m.add_class::<Structure>()?;
    m.add_class::<Member>()?;
    m.add_class::<CompilerInfo>()?;
    m.add_class::<Operand>()?;
    m.add_class::<Instruction>()?;
    m.add_class::<Segment>()?;
    m.add_class::<Function>()?;
    m.add_class::<SwitchInfo>()?;
    m.add_class::<MarshalConfig>()?;
    m.add_class::<LogLevel>()?;

    m.add_function(wrap_pyfunction!(is_segment_register_py, m)?)?;
    m.add_function(wrap_pyfunction!(is_fpu_register_py, m)?)?;
    m.add_function(wrap_pyfunction!(is_mmx_register_py, m)?)?;
    m.add_function(wrap_pyfunction!(is_xmm_register_py, m)?)?;
    m.add_function(wrap_pyfunction!(is_volatile_register_py, m)?)?;
    m.add_function(wrap_pyfunction!(layout_report_py, m)?)?;
    m.add_function(wrap_pyfunction!(init_logging, m)?)?;
    m.add_function(wrap_pyfunction!(log_message, m)?)?;

    Ok(())
}

/// Structure type (`struc_t`).
#[pyclass(module = "idaview")]
#[derive(Debug, Clone, Copy)]
pub struct Structure {
    #[pyo3(get)]
    address: usize,
}

impl Structure {
    fn view(&self) -> PyResult<StructureView<'static>> {
        Ok(unsafe { StructureView::try_from_ptr(self.address as *const u8)? })
    }
}

#[pymethods]
impl Structure {
    #[new]
    fn new(address: usize) -> Self {
        Self { address }
    }

    #[getter]
    fn id(&self) -> PyResult<u64> {
        Ok(self.view()?.id().into())
    }

    #[getter]
    fn member_count(&self) -> PyResult<u32> {
        Ok(self.view()?.member_count())
    }

    #[getter]
    fn age(&self) -> PyResult<u16> {
        Ok(self.view()?.age())
    }

    #[getter]
    fn properties(&self) -> PyResult<u32> {
        Ok(self.view()?.properties().bits())
    }

    #[getter]
    fn ordinal(&self) -> PyResult<i32> {
        Ok(self.view()?.ordinal())
    }

    #[getter]
    fn is_union(&self) -> PyResult<bool> {
        Ok(self.view()?.is_union())
    }

    #[getter]
    fn is_variable_size(&self) -> PyResult<bool> {
        Ok(self.view()?.is_variable_size())
    }

    #[getter]
    fn is_frame(&self) -> PyResult<bool> {
        Ok(self.view()?.is_frame())
    }

    #[getter]
    fn is_hidden(&self) -> PyResult<bool> {
        Ok(self.view()?.is_hidden())
    }

    /// Members in array order.
    fn members(&self) -> PyResult<Vec<Member>> {
        let view = self.view()?;
        let members = unsafe { view.members() };
        Ok(members
            .map(|m| Member {
                address: m.as_ptr() as usize,
            })
            .collect())
    }

    fn to_json(&self) -> PyResult<String> {
        Ok(self.view()?.summary().to_json()?)
    }

    fn __repr__(&self) -> PyResult<String> {
        let view = self.view()?;
        Ok(format!(
            "Structure(id={:#x}, members={})",
            view.id(),
            view.member_count()
        ))
    }
}

/// Structure member (`member_t`).
#[pyclass(module = "idaview")]
#[derive(Debug, Clone, Copy)]
pub struct Member {
    #[pyo3(get)]
    address: usize,
}

impl Member {
    fn view(&self) -> PyResult<MemberView<'static>> {
        Ok(unsafe { MemberView::try_from_ptr(self.address as *const u8)? })
    }
}

#[pymethods]
impl Member {
    #[new]
    fn new(address: usize) -> Self {
        Self { address }
    }

    #[getter]
    fn id(&self) -> PyResult<u64> {
        Ok(self.view()?.id().into())
    }

    #[getter]
    fn start_offset(&self) -> PyResult<u64> {
        Ok(self.view()?.start_offset().into())
    }

    #[getter]
    fn end_offset(&self) -> PyResult<u64> {
        Ok(self.view()?.end_offset().into())
    }

    #[getter]
    fn flags(&self) -> PyResult<u32> {
        Ok(self.view()?.flags())
    }

    #[getter]
    fn properties(&self) -> PyResult<u32> {
        Ok(self.view()?.properties().bits())
    }

    #[getter]
    fn size(&self) -> PyResult<u64> {
        Ok(self.view()?.size())
    }

    #[getter]
    fn is_union_member(&self) -> PyResult<bool> {
        Ok(self.view()?.is_union_member())
    }

    #[getter]
    fn has_type_info(&self) -> PyResult<bool> {
        Ok(self.view()?.has_type_info())
    }

    fn __repr__(&self) -> PyResult<String> {
        let view = self.view()?;
        Ok(format!(
            "Member(id={:#x}, end_offset={:#x})",
            view.id(),
            view.end_offset()
        ))
    }
}

/// Compiler information (`compiler_info_t`).
#[pyclass(module = "idaview")]
#[derive(Debug, Clone, Copy)]
pub struct CompilerInfo {
    #[pyo3(get)]
    address: usize,
}

impl CompilerInfo {
    fn view(&self) -> PyResult<CompilerView<'static>> {
        Ok(unsafe { CompilerView::try_from_ptr(self.address as *const u8)? })
    }
}

#[pymethods]
impl CompilerInfo {
    #[new]
    fn new(address: usize) -> Self {
        Self { address }
    }

    #[getter]
    fn id(&self) -> PyResult<u8> {
        Ok(self.view()?.id())
    }

    #[getter]
    fn memory_model(&self) -> PyResult<u8> {
        Ok(self.view()?.memory_model())
    }

    #[getter]
    fn sizeof_int(&self) -> PyResult<u8> {
        Ok(self.view()?.sizeof_int())
    }

    #[getter]
    fn sizeof_bool(&self) -> PyResult<u8> {
        Ok(self.view()?.sizeof_bool())
    }

    #[getter]
    fn sizeof_enum(&self) -> PyResult<u8> {
        Ok(self.view()?.sizeof_enum())
    }

    #[getter]
    fn default_alignment(&self) -> PyResult<u8> {
        Ok(self.view()?.default_alignment())
    }

    #[getter]
    fn sizeof_short(&self) -> PyResult<u8> {
        Ok(self.view()?.sizeof_short())
    }

    #[getter]
    fn sizeof_long(&self) -> PyResult<u8> {
        Ok(self.view()?.sizeof_long())
    }

    #[getter]
    fn sizeof_longlong(&self) -> PyResult<u8> {
        Ok(self.view()?.sizeof_longlong())
    }
}

/// Instruction operand (`op_t`).
#[pyclass(module = "idaview")]
#[derive(Debug, Clone, Copy)]
pub struct Operand {
    #[pyo3(get)]
    address: usize,
}

impl Operand {
    fn view(&self) -> PyResult<OperandView<'static>> {
        Ok(unsafe { OperandView::try_from_ptr(self.address as *const u8)? })
    }
}

#[pymethods]
impl Operand {
    #[new]
    fn new(address: usize) -> Self {
        Self { address }
    }

    #[getter]
    fn number(&self) -> PyResult<u8> {
        Ok(self.view()?.number())
    }

    /// Raw `optype_t` value.
    #[getter]
    fn kind(&self) -> PyResult<u8> {
        Ok(self.view()?.raw_kind())
    }

    #[getter]
    fn flags(&self) -> PyResult<u8> {
        Ok(self.view()?.flags().bits())
    }

    #[getter]
    fn value_type(&self) -> PyResult<u8> {
        Ok(self.view()?.raw_value_type())
    }

    #[getter]
    fn register(&self) -> PyResult<u16> {
        Ok(self.view()?.register())
    }

    #[getter]
    fn value(&self) -> PyResult<u64> {
        Ok(self.view()?.value().into())
    }

    #[getter]
    fn address_value(&self) -> PyResult<u64> {
        Ok(self.view()?.address().into())
    }

    #[getter]
    fn special_value(&self) -> PyResult<u64> {
        Ok(self.view()?.special_value().into())
    }

    #[getter]
    fn special_flags(&self) -> PyResult<[u8; 4]> {
        let view = self.view()?;
        Ok([
            view.special_flag1(),
            view.special_flag2(),
            view.special_flag3(),
            view.special_flag4(),
        ])
    }

    #[getter]
    fn is_shown(&self) -> PyResult<bool> {
        Ok(self.view()?.is_shown())
    }

    fn is_register(&self, reg: u16) -> PyResult<bool> {
        Ok(self.view()?.is_register(reg))
    }
}

/// Decoded instruction (`insn_t`).
#[pyclass(module = "idaview")]
#[derive(Debug, Clone, Copy)]
pub struct Instruction {
    #[pyo3(get)]
    address: usize,
}

impl Instruction {
    fn view(&self) -> PyResult<InstructionView<'static>> {
        Ok(unsafe { InstructionView::try_from_ptr(self.address as *const u8)? })
    }
}

#[pymethods]
impl Instruction {
    #[new]
    fn new(address: usize) -> Self {
        Self { address }
    }

    #[getter]
    fn cs(&self) -> PyResult<u64> {
        Ok(self.view()?.cs().into())
    }

    #[getter]
    fn ip(&self) -> PyResult<u64> {
        Ok(self.view()?.ip().into())
    }

    #[getter]
    fn ea(&self) -> PyResult<u64> {
        Ok(self.view()?.ea().into())
    }

    #[getter]
    fn itype(&self) -> PyResult<u16> {
        Ok(self.view()?.itype())
    }

    #[getter]
    fn size(&self) -> PyResult<u16> {
        Ok(self.view()?.size())
    }

    #[getter]
    fn auxpref(&self) -> PyResult<u16> {
        Ok(self.view()?.auxpref())
    }

    #[getter]
    fn segpref(&self) -> PyResult<u8> {
        Ok(self.view()?.segpref())
    }

    #[getter]
    fn insnpref(&self) -> PyResult<u8> {
        Ok(self.view()?.insnpref())
    }

    #[getter]
    fn is_macro(&self) -> PyResult<bool> {
        Ok(self.view()?.is_macro())
    }

    fn operand(&self, index: usize) -> PyResult<Operand> {
        let op = self.view()?.operand(index)?;
        Ok(Operand {
            address: op.as_ptr() as usize,
        })
    }

    /// `(base, index, scale)` of an x86 memory operand, `index` being
    /// `None` when no index register is encoded.
    fn x86_addressing(&self, index: usize) -> PyResult<(u16, Option<u8>, u8)> {
        let addressing = X86Instruction::new(self.view()?).operand(index)?.addressing();
        Ok((
            addressing.base,
            addressing.index_register(),
            addressing.scale,
        ))
    }

    #[getter]
    fn x86_mode64(&self) -> PyResult<bool> {
        Ok(X86Instruction::new(self.view()?).mode64())
    }
}

/// Program segment (`segment_t`).
#[pyclass(module = "idaview")]
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    #[pyo3(get)]
    address: usize,
}

impl Segment {
    fn view(&self) -> PyResult<SegmentView<'static>> {
        Ok(unsafe { SegmentView::try_from_ptr(self.address as *const u8)? })
    }
}

#[pymethods]
impl Segment {
    #[new]
    fn new(address: usize) -> Self {
        Self { address }
    }

    #[getter]
    fn start(&self) -> PyResult<u64> {
        Ok(self.view()?.start().into())
    }

    #[getter]
    fn end(&self) -> PyResult<u64> {
        Ok(self.view()?.end().into())
    }

    #[getter]
    fn bits(&self) -> PyResult<u32> {
        Ok(self.view()?.bits())
    }

    #[getter]
    fn permissions(&self) -> PyResult<String> {
        Ok(self.view()?.permissions().to_string())
    }

    #[getter]
    fn selector(&self) -> PyResult<u64> {
        Ok(self.view()?.selector().into())
    }

    #[getter]
    fn kind(&self) -> PyResult<u8> {
        Ok(self.view()?.raw_kind())
    }

    #[getter]
    fn is_visible(&self) -> PyResult<bool> {
        Ok(self.view()?.is_visible())
    }

    #[getter]
    fn is_ephemeral(&self) -> PyResult<bool> {
        Ok(self.view()?.is_ephemeral())
    }

    fn contains(&self, ea: u64) -> PyResult<bool> {
        let view = self.view()?;
        let start: u64 = view.start().into();
        let end: u64 = view.end().into();
        Ok(start <= ea && ea < end)
    }

    fn __len__(&self) -> PyResult<usize> {
        Ok(self.view()?.size() as usize)
    }
}

/// Function chunk (`func_t`).
#[pyclass(module = "idaview")]
#[derive(Debug, Clone, Copy)]
pub struct Function {
    #[pyo3(get)]
    address: usize,
}

impl Function {
    fn view(&self) -> PyResult<FunctionView<'static>> {
        Ok(unsafe { FunctionView::try_from_ptr(self.address as *const u8)? })
    }
}

#[pymethods]
impl Function {
    #[new]
    fn new(address: usize) -> Self {
        Self { address }
    }

    #[getter]
    fn start(&self) -> PyResult<u64> {
        Ok(self.view()?.start().into())
    }

    #[getter]
    fn end(&self) -> PyResult<u64> {
        Ok(self.view()?.end().into())
    }

    #[getter]
    fn flags(&self) -> PyResult<u16> {
        Ok(self.view()?.flags().bits())
    }

    #[getter]
    fn is_tail(&self) -> PyResult<bool> {
        Ok(self.view()?.is_tail())
    }

    #[getter]
    fn does_return(&self) -> PyResult<bool> {
        Ok(self.view()?.does_return())
    }

    #[getter]
    fn owner(&self) -> PyResult<Option<u64>> {
        Ok(self.view()?.owner().map(Into::into))
    }

    fn to_json(&self) -> PyResult<String> {
        Ok(self.view()?.summary().to_json()?)
    }
}

/// Switch idiom (`switch_info_t`).
#[pyclass(module = "idaview")]
#[derive(Debug, Clone, Copy)]
pub struct SwitchInfo {
    #[pyo3(get)]
    address: usize,
}

impl SwitchInfo {
    fn view(&self) -> PyResult<SwitchInfoView<'static>> {
        Ok(unsafe { SwitchInfoView::try_from_ptr(self.address as *const u8)? })
    }
}

#[pymethods]
impl SwitchInfo {
    #[new]
    fn new(address: usize) -> Self {
        Self { address }
    }

    #[getter]
    fn case_count(&self) -> PyResult<u16> {
        Ok(self.view()?.case_count())
    }

    #[getter]
    fn jump_table(&self) -> PyResult<u64> {
        Ok(self.view()?.jump_table().into())
    }

    #[getter]
    fn start(&self) -> PyResult<u64> {
        Ok(self.view()?.start().into())
    }

    #[getter]
    fn default_jump(&self) -> PyResult<Option<u64>> {
        Ok(self.view()?.default_jump().map(Into::into))
    }

    /// Engine records are always readable over the extended size when
    /// flagged extended.
    fn to_json(&self) -> PyResult<String> {
        let view = self.view()?;
        let summary = match unsafe { view.extended() } {
            Some(ex) => ex.summary(),
            None => view.summary(),
        };
        Ok(summary.to_json()?)
    }
}

#[pyfunction]
#[pyo3(name = "is_segment_register")]
fn is_segment_register_py(reg: u16) -> bool {
    x86::is_segment_register(reg)
}

#[pyfunction]
#[pyo3(name = "is_fpu_register")]
fn is_fpu_register_py(reg: u16) -> bool {
    x86::is_fpu_register(reg)
}

#[pyfunction]
#[pyo3(name = "is_mmx_register")]
fn is_mmx_register_py(reg: u16) -> bool {
    x86::is_mmx_register(reg)
}

#[pyfunction]
#[pyo3(name = "is_xmm_register")]
fn is_xmm_register_py(reg: u16) -> bool {
    x86::is_xmm_register(reg)
}

#[pyfunction]
#[pyo3(name = "is_volatile_register")]
fn is_volatile_register_py(reg: u16) -> bool {
    x86::is_volatile_register(reg)
}

/// Record layouts of this build as JSON.
#[pyfunction]
#[pyo3(name = "layout_report")]
fn layout_report_py() -> PyResult<String> {
    Ok(LayoutReport::active().to_json()?)
}
