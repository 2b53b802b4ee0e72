use mtu_types::FrameGap;

/// Статистика, накопленная читателем в процессе декодирования.
#[derive(Debug, Default, Clone)]
pub struct ReadStats {
    /// Декодированных кадров (нативный поток)
    pub frames_decoded: u64,
    /// Прочитанных записей (сегментированный поток)
    pub records_read: u64,
    /// Выданных выборок
    pub samples_decoded: u64,
    /// Разрывы счётчика кадров
    pub gaps: Vec<FrameGap>,
    /// Сумма пропущенных кадров по всем разрывам
    pub missing_frames: u64,
    /// Кадров/записей с ненулевым счётчиком насыщений
    pub saturated_frames: u64,
    /// Хвостовых неполных кадров/выборок, отброшенных в конце данных
    pub partial_discarded: u64,
}

impl ReadStats {
    pub fn record_gap(
        &mut self,
        gap: FrameGap,
    ) {
        self.missing_frames += gap.missing();
        self.gaps.push(gap);
    }

    pub fn gap_count(&self) -> usize {
        self.gaps.len()
    }
}
