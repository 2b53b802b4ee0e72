use byteorder::{BigEndian, ByteOrder};
use mtu_types::PayloadByteOrder;

use crate::{FLOAT_SAMPLE_SIZE, HEADER_SIZE};

pub fn read_u8_local(
    buf: &[u8; HEADER_SIZE],
    off: &mut usize,
) -> u8 {
    let v = buf[*off];
    *off += 1;
    v
}

pub fn read_i8_local(
    buf: &[u8; HEADER_SIZE],
    off: &mut usize,
) -> i8 {
    read_u8_local(buf, off) as i8
}

pub fn read_u16_local(
    buf: &[u8; HEADER_SIZE],
    off: &mut usize,
) -> u16 {
    let v = BigEndian::read_u16(&buf[*off..*off + 2]);
    *off += 2;
    v
}

pub fn read_u32_local(
    buf: &[u8; HEADER_SIZE],
    off: &mut usize,
) -> u32 {
    let v = BigEndian::read_u32(&buf[*off..*off + 4]);
    *off += 4;
    v
}

pub fn read_i32_local(
    buf: &[u8; HEADER_SIZE],
    off: &mut usize,
) -> i32 {
    let v = BigEndian::read_i32(&buf[*off..*off + 4]);
    *off += 4;
    v
}

pub fn read_f32_local(
    buf: &[u8; HEADER_SIZE],
    off: &mut usize,
) -> f32 {
    let v = BigEndian::read_f32(&buf[*off..*off + 4]);
    *off += 4;
    v
}

pub fn read_bytes_local<const N: usize>(
    buf: &[u8; HEADER_SIZE],
    off: &mut usize,
) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[*off..*off + N]);
    *off += N;
    out
}

/// Текстовое поле фиксированной ширины без хвостовых пробелов и NUL.
pub fn read_text_local(
    buf: &[u8; HEADER_SIZE],
    off: &mut usize,
    len: usize,
) -> String {
    let raw = &buf[*off..*off + len];
    *off += len;

    String::from_utf8_lossy(raw)
        .trim_end_matches([' ', '\0'])
        .to_string()
}

/// 3-байтовая big-endian выборка со знаком.
///
/// Байты кладутся в старшие разряды 32-битного слова, младший байт нулевой,
/// поэтому результат равен значению выборки, умноженному на 256.
pub fn read_sample_padded(b: &[u8]) -> i32 {
    BigEndian::read_i32(&[b[0], b[1], b[2], 0])
}

/// Float-выборки децимированных потоков. Неполный хвост не читается.
pub fn read_floats(
    bytes: &[u8],
    order: PayloadByteOrder,
) -> Vec<f32> {
    bytes
        .chunks_exact(FLOAT_SAMPLE_SIZE)
        .map(|c| order.read_f32(c))
        .collect()
}
