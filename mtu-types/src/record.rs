use serde::{Deserialize, Serialize};

/// Подзаголовок записи сегментированного децимированного потока (32 байта).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Subheader {
    /// Метка времени записи
    pub timestamp: u32,
    /// Число float-выборок в записи
    pub sample_count: u32,
    pub saturation_count: u16,
    pub miss_count: u16,
    pub min_value: f32,
    pub max_value: f32,
    pub avg_value: f32,
}

impl Subheader {
    /// Подзаголовок конца данных: `sample_count == 0`.
    pub fn end_of_data() -> Self {
        Self::default()
    }

    pub fn is_end_of_data(&self) -> bool {
        self.sample_count == 0
    }
}

/// Запись сегментированного потока: подзаголовок и данные.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentedRecord {
    pub subheader: Subheader,
    pub samples: Vec<f32>,
}
