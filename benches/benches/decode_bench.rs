use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use mtu_core::{
    ContinuousReader, MemorySequence, NativeReader, ReaderConfig, FRAME_SIZE, HEADER_SIZE,
};

const FRAMES_PER_FILE: u32 = 2_400;
const FILES: u32 = 4;

fn header(seq: u32) -> Vec<u8> {
    let mut buf = vec![0u8; HEADER_SIZE];
    buf[0] = 1;
    buf[1] = 3;
    buf[2..4].copy_from_slice(&(HEADER_SIZE as u16).to_be_bytes());
    buf[4..12].copy_from_slice(b"MTU-5C\0\0");
    buf[25..29].copy_from_slice(&seq.to_be_bytes());
    buf[31..39].copy_from_slice(b"BCM01-I\0");
    buf[51..59].copy_from_slice(&[4, 3, 0, 0, 0, 10, 128, 0]);
    buf[59..61].copy_from_slice(&24_000u16.to_be_bytes());
    buf[62] = 3;
    buf[63..67].copy_from_slice(&0x0100_0040u32.to_be_bytes());
    buf
}

fn native_sequence() -> MemorySequence {
    let mut seq = MemorySequence::new();
    let mut counter = 0u32;

    for file in 1..=FILES {
        let mut data = header(file);
        for _ in 0..FRAMES_PER_FILE {
            for i in 0..20i32 {
                let s = ((counter as i32 + i) % 4_000) - 2_000;
                data.extend_from_slice(&s.to_be_bytes()[1..4]);
            }
            data.extend_from_slice(&counter.to_le_bytes());
            counter += 1;
        }
        seq.push(format!("10128_608783FD_0_{file:08X}.bin"), data);
    }

    seq
}

fn continuous_sequence() -> MemorySequence {
    let mut seq = MemorySequence::new();

    for file in 1..=FILES {
        let mut data = header(file);
        for i in 0..FRAMES_PER_FILE * 20 {
            data.extend_from_slice(&((i as f32) * 1e-3).to_le_bytes());
        }
        seq.push(format!("10128_608783FD_0_{file:08X}.td_150"), data);
    }

    seq
}

fn bench_native(c: &mut Criterion) {
    let source = native_sequence();
    let config = ReaderConfig {
        num_files: FILES as usize,
        ..Default::default()
    };
    let total_frames = (FILES * FRAMES_PER_FILE) as usize;

    let mut group = c.benchmark_group("native");
    group.throughput(Throughput::Bytes((total_frames * FRAME_SIZE) as u64));

    group.bench_function("read_frames/1024", |b| {
        b.iter(|| {
            let mut reader = NativeReader::new(source.clone(), 0, config.clone()).unwrap();
            let mut n = 0;
            loop {
                let samples = reader.read_frames(black_box(1_024)).unwrap();
                if samples.is_empty() {
                    break;
                }
                n += samples.len();
            }
            n
        })
    });

    group.bench_function("read_sequence", |b| {
        b.iter(|| {
            let mut reader = NativeReader::new(source.clone(), 0, config.clone()).unwrap();
            reader.read_sequence(..).unwrap().frame_count()
        })
    });

    group.finish();
}

fn bench_continuous(c: &mut Criterion) {
    let source = continuous_sequence();
    let config = ReaderConfig {
        num_files: FILES as usize,
        ..Default::default()
    };

    let mut group = c.benchmark_group("continuous");
    group.throughput(Throughput::Elements((FILES * FRAMES_PER_FILE * 20) as u64));

    group.bench_function("read_data/4096", |b| {
        b.iter(|| {
            let mut reader = ContinuousReader::new(source.clone(), 0, config.clone()).unwrap();
            let mut n = 0;
            loop {
                let samples = reader.read_data(black_box(4_096)).unwrap();
                if samples.is_empty() {
                    break;
                }
                n += samples.len();
            }
            n
        })
    });

    group.finish();
}

criterion_group!(benches, bench_native, bench_continuous);
criterion_main!(benches);
