use criterion::{criterion_group, criterion_main, Criterion};
use idaview::core::{AddressWidth, Narrow, Wide};
use idaview::views::{member, InstructionView, MemberView};
use idaview::x86::X86Instruction;
use std::hint::black_box;

fn member_array<W: AddressWidth>(count: usize) -> Vec<u8> {
    let stride = MemberView::<W>::native_size();
    let mut buf = vec![0u8; stride * count];
    let end = member::layout::END_OFFSET.for_width::<W>();
    for i in 0..count {
        buf[i * stride + end] = (i % 251) as u8;
    }
    buf
}

fn bench_member_reads<W: AddressWidth>(c: &mut Criterion, name: &str) {
    let buf = member_array::<W>(1024);
    let stride = MemberView::<W>::native_size();
    c.bench_function(name, |b| {
        b.iter(|| {
            let mut total = 0u64;
            for chunk in buf.chunks_exact(stride) {
                let view = MemberView::<W>::from_bytes(chunk).unwrap();
                total += view.size() + view.properties().bits() as u64;
            }
            black_box(total)
        })
    });
}

fn bench_members(c: &mut Criterion) {
    bench_member_reads::<Narrow>(c, "member_reads_ea32");
    bench_member_reads::<Wide>(c, "member_reads_ea64");
}

fn bench_sib(c: &mut Criterion) {
    let buf = vec![0x4Bu8; InstructionView::<Wide>::native_size()];
    let insn = X86Instruction::new(InstructionView::<Wide>::from_bytes(&buf).unwrap());
    c.bench_function("x86_operand_addressing", |b| {
        b.iter(|| {
            let mut acc = 0u32;
            for op in insn.operands() {
                let addressing = black_box(op).addressing();
                acc += addressing.base as u32 + addressing.scale_factor();
            }
            black_box(acc)
        })
    });
}

criterion_group!(benches, bench_members, bench_sib);
criterion_main!(benches);
