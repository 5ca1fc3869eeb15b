//! Benchmarks for block generation and frame encoding.
//!
//! Run with: cargo bench -p sigstream-core --bench waveform_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sigstream_core::frame_codec::FrameCodec;
use sigstream_core::signal_source::{SignalSource, Waveform};

const FRAME_SIZE: usize = 512;
const SAMPLE_RATE: f64 = 8000.0;

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    group.throughput(Throughput::Elements(FRAME_SIZE as u64));

    let kinds = [
        ("sine", Waveform::sine(1000.0)),
        ("multi", Waveform::MultiTone),
        ("chirp", Waveform::chirp()),
        ("noise", Waveform::noise()),
        ("impulse", Waveform::ImpulseTrain { rate: 100.0 }),
        ("square", Waveform::Square { frequency: 440.0 }),
        ("sawtooth", Waveform::Sawtooth { frequency: 440.0 }),
        ("am", Waveform::am()),
        ("fm", Waveform::fm()),
        (
            "signal_noise",
            Waveform::SignalPlusNoise {
                frequency: 1000.0,
                snr_db: 6.0,
            },
        ),
    ];

    for (name, waveform) in kinds {
        let mut src = SignalSource::new(waveform, SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("block", name), &FRAME_SIZE, |b, &n| {
            b.iter(|| black_box(src.generate(n)));
        });
    }
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Bytes((FRAME_SIZE * 4) as u64));

    let codec = FrameCodec::new(FRAME_SIZE);
    let mut src = SignalSource::new(Waveform::sine(1000.0), SAMPLE_RATE);
    let block = src.generate(FRAME_SIZE);

    group.bench_function("frame", |b| {
        b.iter(|| black_box(codec.encode(&block).unwrap()));
    });
    group.finish();
}

criterion_group!(benches, bench_generate, bench_encode);
criterion_main!(benches);
