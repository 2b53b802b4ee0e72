use mtu_types::{DataScaling, MtuError, MtuResult, PayloadByteOrder};

use crate::HEADER_SIZE;

/// Параметры читателей записи.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Сколько файлов последовательности читать, начиная с первого
    pub num_files: usize,
    /// Размер заголовка в начале каждого файла (0 — файлы без заголовка)
    pub header_size: usize,
    /// Единицы нативных выборок
    pub scale_to: DataScaling,
    /// Счётчик последнего кадра перед первым читаемым (`None` — нет опоры)
    pub last_frame: Option<u32>,
    /// Диапазон АЦП, ±В
    pub ad_plus_minus_range: f64,
    /// Усиление тракта для файлов без заголовка
    pub channel_gain: f64,
    /// Журналировать насыщения в каждом кадре
    pub report_hw_sat: bool,
    /// Порядок байт футеров, подзаголовков и float-данных
    pub byte_order: PayloadByteOrder,
}

impl ReaderConfig {
    fn new() -> Self {
        Self {
            num_files: 1,
            header_size: HEADER_SIZE,
            scale_to: DataScaling::AdInputVolts,
            last_frame: None,
            ad_plus_minus_range: 5.0,
            channel_gain: 0.5,
            report_hw_sat: false,
            byte_order: PayloadByteOrder::Little,
        }
    }

    /// Проверяет значения до открытия файлов.
    pub fn validate(&self) -> MtuResult<()> {
        if self.num_files == 0 {
            return Err(MtuError::config("num_files must be >= 1"));
        }

        if self.header_size != 0 && self.header_size < HEADER_SIZE {
            return Err(MtuError::config(format!(
                "header_size must be 0 or >= {HEADER_SIZE}, got {}",
                self.header_size
            )));
        }

        if self.ad_plus_minus_range.is_nan() || self.ad_plus_minus_range <= 0.0 {
            return Err(MtuError::config(format!(
                "ad_plus_minus_range must be > 0, got {}",
                self.ad_plus_minus_range
            )));
        }

        if self.channel_gain.is_nan() || self.channel_gain <= 0.0 {
            return Err(MtuError::config(format!(
                "channel_gain must be > 0, got {}",
                self.channel_gain
            )));
        }

        Ok(())
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self::new()
    }
}
