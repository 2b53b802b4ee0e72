//! Синтетические файлы записи для модульных тестов.

use crate::{MemorySequence, FRAME_SIZE, HEADER_SIZE};

/// Заголовок BCM01-I H-канала (total gain 4.0) с порядковым номером `seq`.
pub fn header_bytes(seq: u32) -> Vec<u8> {
    let mut buf = vec![0u8; HEADER_SIZE];
    buf[0] = 1;
    buf[1] = 3;
    buf[2..4].copy_from_slice(&(HEADER_SIZE as u16).to_be_bytes());
    buf[4..12].copy_from_slice(b"MTU-5C\0\0");
    buf[12..20].copy_from_slice(b"10128\0\0\0");
    buf[20..24].copy_from_slice(&1_619_492_349u32.to_be_bytes());
    buf[25..29].copy_from_slice(&seq.to_be_bytes());
    buf[31..39].copy_from_slice(b"BCM01-I\0");
    buf[39..47].copy_from_slice(b"--------");
    buf[51..59].copy_from_slice(&[4, 3, 0, 0, 0, 10, 128, 0]);
    buf[59..61].copy_from_slice(&24_000u16.to_be_bytes());
    buf[62] = 3;
    buf[63..67].copy_from_slice(&0x0100_0040u32.to_be_bytes());
    buf
}

/// Нативный кадр: 20 выборок (24 бита со знаком, big-endian) и футер
/// (little-endian).
pub fn frame_bytes(
    counter: u32,
    samples: &[i32; 20],
    saturations: u8,
) -> Vec<u8> {
    let mut frame = Vec::with_capacity(FRAME_SIZE);
    for s in samples {
        frame.extend_from_slice(&s.to_be_bytes()[1..4]);
    }
    let footer = (counter & 0x0FFF_FFFF) | (((saturations & 0x07) as u32) << 28);
    frame.extend_from_slice(&footer.to_le_bytes());
    frame
}

/// Файл из заголовка и кадров с последовательными счётчиками.
pub fn native_file(
    seq: u32,
    counters: impl IntoIterator<Item = u32>,
) -> Vec<u8> {
    let mut file = header_bytes(seq);
    for c in counters {
        file.extend_from_slice(&frame_bytes(c, &ramp(c), 0));
    }
    file
}

/// Детерминированные выборки кадра, зависящие от счётчика.
pub fn ramp(counter: u32) -> [i32; 20] {
    let mut out = [0i32; 20];
    for (i, v) in out.iter_mut().enumerate() {
        *v = (counter as i32 * 20 + i as i32) - 1_000;
    }
    out
}

pub fn file_name(seq: u32) -> String {
    format!("10128_608783FD_0_{seq:08X}.bin")
}

pub fn sequence(files: Vec<Vec<u8>>) -> MemorySequence {
    let mut seq = MemorySequence::new();
    for (i, data) in files.into_iter().enumerate() {
        seq.push(file_name(i as u32 + 1), data);
    }
    seq
}
