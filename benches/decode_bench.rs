//! Performance benchmarks for the decoding path.
//!
//! Edge recording runs once per bit inside the capture path, so it has to
//! stay a few nanoseconds; classification runs once per poll.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench decode_bench
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use wiegand_core::{KeyInput, WiegandFrame};
use wiegand_reader::{FrameClassifier, KeyAssembler, RawBits, WiegandBus};

const EDGE_AT: u64 = 1_000;
const CLASSIFY_AT: u64 = 1_100;

fn sample_frames() -> Vec<(&'static str, WiegandFrame)> {
    vec![
        ("keypad4", WiegandFrame::keypad4(KeyInput::Digit(7)).unwrap()),
        ("keypad8", WiegandFrame::keypad8(KeyInput::Hash).unwrap()),
        ("card26", WiegandFrame::card26(0x00AB_CDEF).unwrap()),
        ("card34", WiegandFrame::card34(0xDEAD_BEEF)),
    ]
}

/// Benchmark recording single edges through the locked bus.
fn bench_record_edge(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_edge");
    group.throughput(Throughput::Elements(1));

    let bus = WiegandBus::new();
    let frame = WiegandFrame::card34(0x1234_5678);
    let lines: Vec<_> = frame.lines().collect();

    group.bench_function("locked_bus", |b| {
        let mut i = 0;
        b.iter(|| {
            bus.record_edge(black_box(lines[i % lines.len()]), EDGE_AT);
            i += 1;
        });
    });

    group.bench_function("raw_bits", |b| {
        let mut bits = RawBits::new();
        let mut i = 0;
        b.iter(|| {
            bits.push(black_box(lines[i % lines.len()]), EDGE_AT);
            i += 1;
        });
        black_box(bits);
    });

    group.finish();
}

/// Benchmark accumulating and classifying a complete frame of each format.
fn bench_decode_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_frame");

    for (name, frame) in sample_frames() {
        group.throughput(Throughput::Elements(frame.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &frame, |b, frame| {
            let mut classifier = FrameClassifier::new();
            b.iter(|| {
                let mut bits = RawBits::new();
                for line in frame.lines() {
                    bits.push(line, EDGE_AT);
                }
                black_box(classifier.classify(&mut bits, CLASSIFY_AT))
            });
        });
    }

    group.finish();
}

/// Benchmark assembling a four digit code.
fn bench_assemble_code(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble_code");
    group.throughput(Throughput::Elements(5));

    group.bench_function("four_digits_and_hash", |b| {
        b.iter(|| {
            let mut assembler = KeyAssembler::new();
            for (i, value) in [1, 9, 8, 4, 11].into_iter().enumerate() {
                if let Some(code) = assembler.on_frame(black_box(value), i as u64 * 300) {
                    black_box(code);
                }
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_record_edge,
    bench_decode_frame,
    bench_assemble_code
);
criterion_main!(benches);
