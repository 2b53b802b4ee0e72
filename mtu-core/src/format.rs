//! Бинарный формат файлов записи MTU.
//!
//! Файл: заголовок фиксированного размера и полезная нагрузка одного из трёх
//! видов (нативные кадры, сегментированные записи, непрерывный float-поток).
//! Все многобайтовые поля заголовка хранятся в порядке big-endian.

use log::debug;
use mtu_types::{Header, MtuError, MtuResult, TimingStatus};

use crate::{
    binary::{
        read_bytes_local, read_f32_local, read_i32_local, read_i8_local, read_text_local,
        read_u16_local, read_u32_local, read_u8_local,
    },
    gain::{self, GainInputs},
};

/// Размер фиксированного заголовка (128 байт)
pub const HEADER_SIZE: usize = 128;

/// Размер нативного кадра: 20 выборок по 3 байта и 4 байта футера
pub const FRAME_SIZE: usize = 64;

/// Число выборок в нативном кадре
pub const SAMPLES_PER_FRAME: usize = 20;

/// Размер одной нативной выборки
pub const NATIVE_SAMPLE_SIZE: usize = 3;

/// Смещение футера внутри кадра
pub const FOOTER_OFFSET: usize = SAMPLES_PER_FRAME * NATIVE_SAMPLE_SIZE;

/// Размер подзаголовка сегментированной записи
pub const SUBHEADER_SIZE: usize = 32;

/// Размер float-выборки децимированных потоков
pub const FLOAT_SAMPLE_SIZE: usize = 4;

/// Декодирование заголовка из байтового буфера.
pub trait HeaderExt: Sized {
    /// Разбирает заголовок длиной `header_length` и вычисляет коэффициенты
    /// усиления.
    fn decode(
        buf: &[u8],
        header_length: usize,
    ) -> MtuResult<Self>;
}

impl HeaderExt for Header {
    fn decode(
        buf: &[u8],
        header_length: usize,
    ) -> MtuResult<Self> {
        let expected = header_length.max(HEADER_SIZE);
        if buf.len() < expected {
            return Err(MtuError::TruncatedHeader {
                expected,
                found: buf.len(),
            });
        }

        let mut block = [0u8; HEADER_SIZE];
        block.copy_from_slice(&buf[..HEADER_SIZE]);
        let buf = &block;
        let mut off = 0;

        let file_type = read_u8_local(buf, &mut off);
        let file_version = read_u8_local(buf, &mut off);
        let header_length = read_u16_local(buf, &mut off);
        let instrument_type = read_text_local(buf, &mut off, 8);
        let instrument_serial_number = read_text_local(buf, &mut off, 8);
        let recording_id = read_u32_local(buf, &mut off);
        let channel_id = read_u8_local(buf, &mut off);
        let file_sequence = read_u32_local(buf, &mut off);
        let frag_period = read_u16_local(buf, &mut off);
        let board_model = read_text_local(buf, &mut off, 8);
        let board_serial = parse_board_serial(&read_text_local(buf, &mut off, 8));
        let firmware_id = read_u32_local(buf, &mut off);
        let hw_fingerprint = read_bytes_local::<8>(buf, &mut off);
        let sample_rate_base = read_u16_local(buf, &mut off);
        let sample_rate_exp = read_i8_local(buf, &mut off);
        let bytes_per_sample = read_u8_local(buf, &mut off);
        let frame_size = read_u32_local(buf, &mut off);
        let decimation_node_id = read_u16_local(buf, &mut off);
        let frame_rollover_count = read_u16_local(buf, &mut off);
        let gps_longitude = read_f32_local(buf, &mut off);
        let gps_latitude = read_f32_local(buf, &mut off);
        let gps_elevation = read_f32_local(buf, &mut off);
        let gps_h_accuracy = read_u32_local(buf, &mut off);
        let gps_v_accuracy = read_u32_local(buf, &mut off);
        let timing_status = TimingStatus {
            flags: read_u8_local(buf, &mut off),
            sat_count: read_u8_local(buf, &mut off),
            stability: read_u16_local(buf, &mut off),
        };
        let future1 = read_i8_local(buf, &mut off);
        off += 1; // padding
        let future2 = read_i32_local(buf, &mut off);
        let saturated_frames = unpack_saturated_frames(read_u16_local(buf, &mut off));
        let missing_frames = read_u16_local(buf, &mut off);
        let battery_voltage_mv = read_u16_local(buf, &mut off);
        let min_signal = read_f32_local(buf, &mut off);
        let max_signal = read_f32_local(buf, &mut off);

        let gains = gain::resolve(&GainInputs::from_board(&hw_fingerprint, &board_model))?;

        debug!(
            "Header: {instrument_type} #{instrument_serial_number} ch {channel_id} seq {file_sequence}, board {board_model}, {} channel, total gain {}",
            gains.channel_type, gains.total_circuitry_gain,
        );

        Ok(Header {
            file_type,
            file_version,
            header_length,
            instrument_type,
            instrument_serial_number,
            recording_id,
            channel_id,
            file_sequence,
            frag_period,
            board_model,
            board_serial,
            firmware_id,
            hw_fingerprint,
            sample_rate_base,
            sample_rate_exp,
            bytes_per_sample,
            frame_size,
            decimation_node_id,
            frame_rollover_count,
            gps_longitude,
            gps_latitude,
            gps_elevation,
            gps_h_accuracy,
            gps_v_accuracy,
            timing_status,
            future1,
            future2,
            saturated_frames,
            missing_frames,
            battery_voltage_mv,
            min_signal,
            max_signal,
            gains,
        })
    }
}

/// Распаковывает 12-битный счётчик насыщенных кадров из 16-битного поля.
///
/// Если установлен старший бит младшего байта, значение маскируется до 7 бит
/// и сдвигается влево на 4.
pub fn unpack_saturated_frames(raw: u16) -> u16 {
    if raw & 0x80 != 0 {
        (raw & 0x7F) << 4
    } else {
        raw
    }
}

/// Серийный номер платы: шестнадцатеричное число или 0 для заглушек
/// старых прошивок (например `--------`).
pub fn parse_board_serial(text: &str) -> u32 {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_hexdigit()) {
        return 0;
    }

    u32::from_str_radix(text, 16).unwrap_or(0)
}
