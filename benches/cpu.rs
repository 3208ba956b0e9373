use criterion::{criterion_group, criterion_main, Criterion};
use pocketcore::{Cartridge, Cpu, Mmu};

fn blank_rom() -> Vec<u8> {
    vec![0u8; 0x8000]
}

fn benchmark_cpu_step(c: &mut Criterion) {
    let mut cpu = Cpu::new(Mmu::new(Cartridge::from_data(&blank_rom())));
    cpu.boot();

    c.bench_function("cpu_step_1m", |b| {
        b.iter(|| {
            for _ in 0..1_000_000u32 {
                cpu.step();
            }
        })
    });
}

criterion_group!(benches, benchmark_cpu_step);
criterion_main!(benches);
