use serde::{Deserialize, Serialize};

/// Маска счётчика кадров в футере (биты 0–27)
pub const FOOTER_COUNTER_MASK: u32 = 0x0FFF_FFFF;

/// Маска счётчика насыщений в футере
pub const FOOTER_SATURATION_MASK: u32 = 0x7000_0000;

/// Футер нативного кадра (последние 4 байта из 64).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameFooter {
    /// Исходное 32-битное значение
    pub raw: u32,
    /// Бегущий счётчик кадров
    pub counter: u32,
    /// Число насыщений АЦП в кадре
    pub saturation_count: u8,
}

impl FrameFooter {
    pub fn from_raw(raw: u32) -> Self {
        FrameFooter {
            raw,
            counter: raw & FOOTER_COUNTER_MASK,
            saturation_count: ((raw & FOOTER_SATURATION_MASK) >> 24) as u8,
        }
    }
}

/// Разрыв в счётчике кадров: `counter - previous != 1`.
///
/// Не ошибка: декодирование продолжается, событие сохраняется в статистике.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameGap {
    /// Счётчик кадра, на котором обнаружен разрыв
    pub counter: u32,
    /// Разность с предыдущим счётчиком
    pub difference: i64,
}

impl FrameGap {
    /// Число пропущенных кадров (0 для повторов и сбросов счётчика).
    pub fn missing(&self) -> u64 {
        if self.difference > 1 {
            (self.difference - 1) as u64
        } else {
            0
        }
    }
}

/// Результат пакетного чтения нативных кадров.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeBlock {
    /// Масштабированные выборки, по 20 на кадр
    pub samples: Vec<f64>,
    /// Футеры, по одному на кадр
    pub footers: Vec<FrameFooter>,
}

impl NativeBlock {
    pub fn frame_count(&self) -> usize {
        self.footers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.footers.is_empty()
    }

    /// Счётчики кадров, параллельные `footers`.
    pub fn counters(&self) -> Vec<u32> {
        self.footers.iter().map(|f| f.counter).collect()
    }

    pub fn append(
        &mut self,
        other: NativeBlock,
    ) {
        self.samples.extend(other.samples);
        self.footers.extend(other.footers);
    }
}
