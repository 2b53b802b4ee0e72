use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ChannelType;

/// Заголовок файла записи (фиксированный блок 128 байт).
///
/// Создаётся один раз при открытии файла; производные коэффициенты усиления
/// в [`ChannelGains`] вычисляются сразу при декодировании.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Тип файла
    pub file_type: u8,
    /// Версия формата файла
    pub file_version: u8,
    /// Длина заголовка в байтах (0 для файлов без заголовка)
    pub header_length: u16,
    /// Модель прибора, например `MTU-5C`
    pub instrument_type: String,
    /// Серийный номер прибора
    pub instrument_serial_number: String,
    /// Идентификатор записи (Unix timestamp начала, секунды)
    pub recording_id: u32,
    /// Номер канала
    pub channel_id: u8,
    /// Порядковый номер файла в записи
    pub file_sequence: u32,
    /// Период фрагментации, секунды
    pub frag_period: u16,
    /// Модель платы канала, например `BCM01-I`
    pub board_model: String,
    /// Серийный номер платы (0 для старых прошивок)
    pub board_serial: u32,
    /// Идентификатор прошивки
    pub firmware_id: u32,
    /// Упакованная конфигурация аппаратуры канала
    pub hw_fingerprint: [u8; 8],
    pub sample_rate_base: u16,
    pub sample_rate_exp: i8,
    pub bytes_per_sample: u8,
    /// Упакованное поле: старший байт — флаг футера, младшие 24 бита —
    /// размер кадра в байтах
    pub frame_size: u32,
    pub decimation_node_id: u16,
    pub frame_rollover_count: u16,
    pub gps_longitude: f32,
    pub gps_latitude: f32,
    pub gps_elevation: f32,
    /// Горизонтальная точность GPS, мм
    pub gps_h_accuracy: u32,
    /// Вертикальная точность GPS, мм
    pub gps_v_accuracy: u32,
    pub timing_status: TimingStatus,
    pub future1: i8,
    pub future2: i32,
    /// Количество кадров с насыщением (распакованное 12-битное значение)
    pub saturated_frames: u16,
    pub missing_frames: u16,
    pub battery_voltage_mv: u16,
    pub min_signal: f32,
    pub max_signal: f32,
    /// Коэффициенты тракта, вычисленные из `hw_fingerprint` и модели платы
    pub gains: ChannelGains,
}

/// Статус синхронизации времени.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingStatus {
    pub flags: u8,
    /// Число спутников
    pub sat_count: u8,
    pub stability: u16,
}

/// Производные параметры аналогового тракта канала.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelGains {
    pub channel_type: ChannelType,
    /// Тип канала, определённый электроникой
    pub detected_channel_type: ChannelType,
    /// Частота среза ФНЧ, Гц (`None`, если код фильтра не распознан)
    pub lp_frequency: Option<u32>,
    pub preamp_gain: f64,
    pub channel_main_gain: f64,
    pub intrinsic_circuitry_gain: f64,
    pub attenuator_gain: f64,
    /// `main × preamp × attenuator`
    pub total_selectable_gain: f64,
    /// `total_selectable_gain × intrinsic_circuitry_gain`
    pub total_circuitry_gain: f64,
}

impl Header {
    /// Частота дискретизации, Гц.
    pub fn sample_rate(&self) -> f64 {
        let base = self.sample_rate_base as f64;

        if self.sample_rate_exp == 0 {
            base
        } else {
            base * 10f64.powi(self.sample_rate_exp as i32)
        }
    }

    /// Размер кадра в байтах (младшие 24 бита `frame_size`).
    pub fn frame_size_bytes(&self) -> u32 {
        self.frame_size & 0x00FF_FFFF
    }

    /// Есть ли у кадров футер (старший байт `frame_size`).
    pub fn has_footer(&self) -> bool {
        (self.frame_size >> 24) != 0
    }

    /// Число 3-байтовых выборок в кадре.
    pub fn samples_per_frame(&self) -> u32 {
        self.frame_size_bytes().saturating_sub(4) / 3
    }

    /// Время начала записи (из `recording_id`).
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.recording_id as i64, 0)
    }

    pub fn board_model_main(&self) -> &str {
        board_model_main(&self.board_model)
    }

    pub fn board_model_revision(&self) -> &str {
        board_model_revision(&self.board_model)
    }

    /// Горизонтальная точность GPS, м.
    pub fn gps_horizontal_accuracy_m(&self) -> f64 {
        self.gps_h_accuracy as f64 / 1000.0
    }

    /// Вертикальная точность GPS, м.
    pub fn gps_vertical_accuracy_m(&self) -> f64 {
        self.gps_v_accuracy as f64 / 1000.0
    }

    /// Напряжение батареи, В.
    pub fn battery_voltage_v(&self) -> f64 {
        self.battery_voltage_mv as f64 / 1000.0
    }

    /// Диапазон ±В на входе платы при диапазоне АЦП `ad_plus_minus_range`.
    pub fn input_plusminus_range(
        &self,
        ad_plus_minus_range: f64,
    ) -> f64 {
        ad_plus_minus_range / self.gains.total_circuitry_gain
    }

    pub fn channel_type(&self) -> ChannelType {
        self.gains.channel_type
    }
}

/// Основная модель платы: первые 5 символов, например `BCM01`.
pub fn board_model_main(model: &str) -> &str {
    match model.char_indices().nth(5) {
        Some((i, _)) => &model[..i],
        None => model,
    }
}

/// Ревизия платы.
///
/// Извлекается срезом `[6..1]`, который всегда пуст. Поведение сохранено
/// буквально до подтверждения формата производителем.
#[allow(clippy::reversed_empty_ranges)]
pub fn board_model_revision(model: &str) -> &str {
    model.get(6..1).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Header {
        Header {
            file_type: 1,
            file_version: 3,
            header_length: 128,
            instrument_type: "MTU-5C".to_string(),
            instrument_serial_number: "10128".to_string(),
            recording_id: 1_619_492_349,
            channel_id: 0,
            file_sequence: 1,
            frag_period: 60,
            board_model: "BCM01-I".to_string(),
            board_serial: 0x200803,
            firmware_id: 65567,
            hw_fingerprint: [4, 3, 0, 0, 0, 10, 128, 0],
            sample_rate_base: 24_000,
            sample_rate_exp: 0,
            bytes_per_sample: 3,
            frame_size: 0x0100_0040,
            decimation_node_id: 0,
            frame_rollover_count: 0,
            gps_longitude: -79.39,
            gps_latitude: 43.69,
            gps_elevation: 97.2,
            gps_h_accuracy: 18_332,
            gps_v_accuracy: 44_669,
            timing_status: TimingStatus {
                flags: 55,
                sat_count: 9,
                stability: 12,
            },
            future1: 27,
            future2: 0,
            saturated_frames: 0,
            missing_frames: 0,
            battery_voltage_mv: 12_475,
            min_signal: -2.05,
            max_signal: 2.05,
            gains: ChannelGains {
                channel_type: ChannelType::H,
                detected_channel_type: ChannelType::H,
                lp_frequency: Some(10_000),
                preamp_gain: 1.0,
                channel_main_gain: 4.0,
                intrinsic_circuitry_gain: 1.0,
                attenuator_gain: 1.0,
                total_selectable_gain: 4.0,
                total_circuitry_gain: 4.0,
            },
        }
    }

    #[test]
    fn test_sample_rate_exponent() {
        let mut h = header();
        assert_eq!(h.sample_rate(), 24_000.0);

        h.sample_rate_base = 15;
        h.sample_rate_exp = 1;
        assert_eq!(h.sample_rate(), 150.0);

        h.sample_rate_base = 24;
        h.sample_rate_exp = 3;
        assert_eq!(h.sample_rate(), 24_000.0);
    }

    #[test]
    fn test_frame_size_unpacking() {
        let h = header();
        assert_eq!(h.frame_size_bytes(), 64);
        assert!(h.has_footer());
        assert_eq!(h.samples_per_frame(), 20);

        let mut no_footer = header();
        no_footer.frame_size = 64;
        assert!(!no_footer.has_footer());
    }

    #[test]
    fn test_unit_conversions() {
        let h = header();
        assert!((h.gps_horizontal_accuracy_m() - 18.332).abs() < 1e-9);
        assert!((h.gps_vertical_accuracy_m() - 44.669).abs() < 1e-9);
        assert!((h.battery_voltage_v() - 12.475).abs() < 1e-9);
        assert_eq!(h.input_plusminus_range(5.0), 1.25);
    }

    #[test]
    fn test_start_time() {
        let h = header();
        let t = h.start_time().unwrap();
        assert_eq!(t.timestamp(), 1_619_492_349);
        assert_eq!(t.to_rfc3339(), "2021-04-27T02:59:09+00:00");
    }

    #[test]
    fn test_board_model_parts() {
        assert_eq!(board_model_main("BCM01-I"), "BCM01");
        assert_eq!(board_model_main("BCM"), "BCM");
        assert_eq!(board_model_revision("BCM01-L"), "");
        assert_eq!(board_model_revision(""), "");
    }

    #[test]
    fn test_header_serializes_as_json() {
        let json = serde_json::to_value(header()).unwrap();
        assert_eq!(json["instrument_type"], "MTU-5C");
        assert_eq!(json["gains"]["channel_type"], "H");
        assert_eq!(json["timing_status"]["flags"], 55);
    }
}
