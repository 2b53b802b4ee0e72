//! Чтение нативного потока (полная частота дискретизации).
//!
//! Кадр — 64 байта: 20 выборок по 3 байта (big-endian, со знаком) и 4 байта
//! футера с бегущим счётчиком кадров и счётчиком насыщений.

use std::{
    ops::{Bound, RangeBounds},
    path::Path,
};

use log::{info, warn};
use mtu_types::{
    DataScaling, FrameFooter, FrameGap, Header, MtuError, MtuResult, NativeBlock,
};

use crate::{
    binary::read_sample_padded, FileSequence, ReadStats, ReaderConfig, SegmentSource,
    SequenceStream, FOOTER_OFFSET, FRAME_SIZE, NATIVE_SAMPLE_SIZE, SAMPLES_PER_FRAME,
};

/// 2^31: полная шкала 32-битного слова выборки
const FULL_SCALE: f64 = 2_147_483_648.0;

/// Верхняя граница предварительного резервирования под кадры
const PREALLOC_FRAMES: usize = 4_096;

/// Потоковый читатель нативных кадров.
pub struct NativeReader<S: SegmentSource> {
    stream: SequenceStream<S>,
    config: ReaderConfig,
    scale_factor: f64,
    input_plusminus_range: f64,
    last_frame: Option<u32>,
    channel: String,
    stats: ReadStats,
}

/// Множитель для перевода 32-битного слова выборки в единицы `scale_to`.
pub fn scale_factor(
    scale_to: DataScaling,
    ad_plus_minus_range: f64,
    input_plusminus_range: f64,
) -> f64 {
    match scale_to {
        DataScaling::AdUnits => 256.0,
        DataScaling::AdInputVolts => ad_plus_minus_range / FULL_SCALE,
        DataScaling::InstrumentInputVolts => input_plusminus_range / FULL_SCALE,
    }
}

impl NativeReader<FileSequence> {
    /// Открывает запись, начиная с файла `path`.
    pub fn open(
        path: &Path,
        config: ReaderConfig,
    ) -> MtuResult<Self> {
        config.validate()?;
        let (source, first) = FileSequence::discover(path)?;
        Self::new(source, first, config)
    }
}

impl<S: SegmentSource> NativeReader<S> {
    pub fn new(
        source: S,
        first: usize,
        config: ReaderConfig,
    ) -> MtuResult<Self> {
        config.validate()?;

        let stream = SequenceStream::new(source, first, config.num_files, config.header_size)?;

        let total_circuitry_gain = stream
            .header()
            .map_or(config.channel_gain, |h| h.gains.total_circuitry_gain);
        let input_plusminus_range = config.ad_plus_minus_range / total_circuitry_gain;
        let scale_factor = scale_factor(
            config.scale_to,
            config.ad_plus_minus_range,
            input_plusminus_range,
        );

        let channel = match stream.header() {
            Some(h) => {
                let frame_size = h.frame_size_bytes() as usize;
                if frame_size != 0 && frame_size != FRAME_SIZE {
                    warn!(
                        "{}: header frame size {frame_size} bytes, decoding {FRAME_SIZE}-byte frames",
                        stream.current_name()
                    );
                }
                h.channel_id.to_string()
            }
            None => stream.current_name(),
        };

        Ok(Self {
            last_frame: config.last_frame,
            stream,
            config,
            scale_factor,
            input_plusminus_range,
            channel,
            stats: ReadStats::default(),
        })
    }

    /// Декодирует `num_frames` кадров, переходя между файлами.
    ///
    /// В конце последовательности возвращает кадры, прочитанные до неё;
    /// пустой результат — данных больше нет.
    pub fn read_frames(
        &mut self,
        num_frames: usize,
    ) -> MtuResult<Vec<f64>> {
        Ok(self.read_block(num_frames)?.samples)
    }

    /// То же, что [`read_frames`](Self::read_frames), вместе с футерами.
    pub fn read_block(
        &mut self,
        num_frames: usize,
    ) -> MtuResult<NativeBlock> {
        let reserve = num_frames.min(PREALLOC_FRAMES);
        let mut block = NativeBlock {
            samples: Vec::with_capacity(reserve * SAMPLES_PER_FRAME),
            footers: Vec::with_capacity(reserve),
        };

        while block.frame_count() < num_frames {
            let frame = self.stream.read_unit(FRAME_SIZE)?;

            if frame.is_empty() {
                break;
            }

            if frame.len() < FRAME_SIZE {
                self.discard_partial(frame.len());
                continue;
            }

            self.decode_frame(&frame, &mut block);
        }

        Ok(block)
    }

    /// Декодирует остаток полезной нагрузки текущего файла.
    pub fn read(&mut self) -> MtuResult<NativeBlock> {
        let bytes = self.stream.read_current_to_end()?;
        let n_frames = bytes.len() / FRAME_SIZE;

        let mut block = NativeBlock {
            samples: Vec::with_capacity(n_frames * SAMPLES_PER_FRAME),
            footers: Vec::with_capacity(n_frames),
        };

        let mut frames = bytes.chunks_exact(FRAME_SIZE);
        for frame in frames.by_ref() {
            self.decode_frame(frame, &mut block);
        }

        let tail = frames.remainder().len();
        if tail > 0 {
            self.discard_partial(tail);
        }

        Ok(block)
    }

    /// Декодирует целиком файлы `range` упорядоченного списка.
    ///
    /// Заголовок каждого файла разбирается заново.
    pub fn read_sequence<R: RangeBounds<usize>>(
        &mut self,
        range: R,
    ) -> MtuResult<NativeBlock> {
        let (start, end) = resolve_range(range, self.stream.sequence_len());
        let limits = self.stream.range();
        let mut block = NativeBlock::default();

        let result: MtuResult<()> = (start..end).try_for_each(|index| {
            self.stream.open_index(index)?;
            block.append(self.read()?);
            Ok(())
        });
        self.stream.restore_range(limits);

        result.map(|()| block)
    }

    /// Пропускает `num_frames` кадров без декодирования.
    ///
    /// `false`, если последовательность закончилась раньше.
    pub fn skip_frames(
        &mut self,
        num_frames: usize,
    ) -> MtuResult<bool> {
        let bytes = (num_frames as u64)
            .checked_mul(FRAME_SIZE as u64)
            .ok_or_else(|| MtuError::config(format!("cannot skip {num_frames} frames")))?;
        let skipped = self.stream.skip(bytes)?;

        if skipped {
            self.last_frame = self
                .last_frame
                .map(|last| last.wrapping_add(num_frames as u32));
        }

        Ok(skipped)
    }

    fn decode_frame(
        &mut self,
        frame: &[u8],
        block: &mut NativeBlock,
    ) {
        let footer = FrameFooter::from_raw(
            self.config
                .byte_order
                .read_u32(&frame[FOOTER_OFFSET..FRAME_SIZE]),
        );

        if let Some(last) = self.last_frame {
            let difference = footer.counter as i64 - last as i64;
            if difference != 1 {
                warn!(
                    "Ch [{}] Missing frames at {} [{difference}]",
                    self.channel, footer.counter
                );
                self.stats.record_gap(FrameGap {
                    counter: footer.counter,
                    difference,
                });
            }
        }
        self.last_frame = Some(footer.counter);

        block.samples.extend(
            frame[..FOOTER_OFFSET]
                .chunks_exact(NATIVE_SAMPLE_SIZE)
                .map(|s| read_sample_padded(s) as f64 * self.scale_factor),
        );
        block.footers.push(footer);

        if footer.saturation_count != 0 {
            self.stats.saturated_frames += 1;
            if self.config.report_hw_sat {
                info!(
                    "Ch [{}] Frame {} has {} saturations",
                    self.channel, footer.counter, footer.saturation_count
                );
            }
        }

        self.stats.frames_decoded += 1;
        self.stats.samples_decoded += SAMPLES_PER_FRAME as u64;
    }

    fn discard_partial(
        &mut self,
        len: usize,
    ) {
        warn!(
            "Ch [{}] Discarding partial frame ({len} bytes) in {}",
            self.channel,
            self.stream.current_name()
        );
        self.stats.partial_discarded += 1;
    }

    /// Заголовок текущего файла.
    pub fn header(&self) -> Option<&Header> {
        self.stream.header()
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Диапазон ±В на входе платы.
    pub fn input_plusminus_range(&self) -> f64 {
        self.input_plusminus_range
    }

    /// Число выборок в кадре по заголовку текущего файла.
    pub fn samples_per_frame(&self) -> usize {
        self.header()
            .map(|h| h.samples_per_frame() as usize)
            .filter(|&n| n > 0)
            .unwrap_or(SAMPLES_PER_FRAME)
    }

    pub fn last_frame(&self) -> Option<u32> {
        self.last_frame
    }

    pub fn stats(&self) -> &ReadStats {
        &self.stats
    }

    pub fn stream(&self) -> &SequenceStream<S> {
        &self.stream
    }

    pub fn stream_mut(&mut self) -> &mut SequenceStream<S> {
        &mut self.stream
    }

    pub fn close(&mut self) {
        self.stream.close();
    }
}

/// Переводит диапазон индексов в `[start, end)` в пределах `len`.
pub(crate) fn resolve_range<R: RangeBounds<usize>>(
    range: R,
    len: usize,
) -> (usize, usize) {
    let start = match range.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s + 1,
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&e) => e + 1,
        Bound::Excluded(&e) => e,
        Bound::Unbounded => len,
    };

    (start.min(len), end.min(len).max(start.min(len)))
}
