#![no_main]
use idaview::core::Wide;
use idaview::views::InstructionView;
use idaview::x86::X86Instruction;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(view) = InstructionView::<Wide>::from_bytes(data) {
        let insn = X86Instruction::new(view);
        let _ = (insn.address_value_type(), insn.operand_value_type());
        for op in insn.operands() {
            let _ = op.addressing().index_register();
        }
    }
});
