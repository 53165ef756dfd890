#![no_main]
use idaview::core::{Narrow, Wide};
use idaview::views::{
    CompilerView, FunctionView, MemberView, OperandView, SegmentView, StructureView,
    SwitchInfoExView, SwitchInfoView,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(view) = StructureView::<Wide>::from_bytes(data) {
        let _ = view.summary();
    }
    if let Ok(view) = StructureView::<Narrow>::from_bytes(data) {
        let _ = view.summary();
    }
    if let Ok(view) = MemberView::<Wide>::from_bytes(data) {
        let _ = view.summary();
    }
    if let Ok(view) = OperandView::<Narrow>::from_bytes(data) {
        let _ = view.summary();
    }
    if let Ok(view) = SegmentView::<Wide>::from_bytes(data) {
        let _ = (
            view.bits(),
            view.size(),
            view.kind(),
            view.default_segment_register(15),
        );
    }
    if let Ok(view) = FunctionView::<Wide>::from_bytes(data) {
        let _ = view.summary();
    }
    if let Ok(view) = SwitchInfoView::<Narrow>::from_bytes(data) {
        let _ = view.summary();
    }
    if let Ok(view) = SwitchInfoExView::<Wide>::from_bytes(data) {
        let _ = view.summary();
    }
    if let Ok(view) = CompilerView::<Narrow>::from_bytes(data) {
        let _ = view.summary();
    }
});
