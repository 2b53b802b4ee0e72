//! Непрерывный децимированный поток: сплошной массив float-выборок.

use std::{ops::RangeBounds, path::Path};

use log::warn;
use mtu_types::{Header, MtuResult};

use crate::{
    binary::read_floats, native::resolve_range, FileSequence, ReadStats, ReaderConfig,
    SegmentSource, SequenceStream, FLOAT_SAMPLE_SIZE,
};

/// Верхняя граница предварительного резервирования под выборки
const PREALLOC_SAMPLES: usize = 65_536;

pub struct ContinuousReader<S: SegmentSource> {
    stream: SequenceStream<S>,
    config: ReaderConfig,
    stats: ReadStats,
}

impl ContinuousReader<FileSequence> {
    pub fn open(
        path: &Path,
        config: ReaderConfig,
    ) -> MtuResult<Self> {
        config.validate()?;
        let (source, first) = FileSequence::discover(path)?;
        Self::new(source, first, config)
    }
}

impl<S: SegmentSource> ContinuousReader<S> {
    pub fn new(
        source: S,
        first: usize,
        config: ReaderConfig,
    ) -> MtuResult<Self> {
        config.validate()?;
        let stream = SequenceStream::new(source, first, config.num_files, config.header_size)?;

        Ok(Self {
            stream,
            config,
            stats: ReadStats::default(),
        })
    }

    /// Читает `num_samples` выборок, переходя между файлами.
    ///
    /// В конце последовательности возвращает то, что успело прочитаться.
    pub fn read_data(
        &mut self,
        num_samples: usize,
    ) -> MtuResult<Vec<f32>> {
        let mut samples = Vec::with_capacity(num_samples.min(PREALLOC_SAMPLES));

        while samples.len() < num_samples {
            let want = (num_samples - samples.len()).saturating_mul(FLOAT_SAMPLE_SIZE);
            let bytes = self.stream.read_unit(want)?;
            if bytes.is_empty() {
                break;
            }

            self.decode_into(&bytes, &mut samples);
        }

        Ok(samples)
    }

    /// Выборки из остатка текущего файла.
    pub fn read(&mut self) -> MtuResult<Vec<f32>> {
        let bytes = self.stream.read_current_to_end()?;
        let mut samples = Vec::with_capacity(bytes.len() / FLOAT_SAMPLE_SIZE);

        self.decode_into(&bytes, &mut samples);

        Ok(samples)
    }

    /// Выборки файлов `range` упорядоченного списка целиком.
    pub fn read_sequence<R: RangeBounds<usize>>(
        &mut self,
        range: R,
    ) -> MtuResult<Vec<f32>> {
        let (start, end) = resolve_range(range, self.stream.sequence_len());
        let limits = self.stream.range();
        let mut samples = Vec::new();

        let result: MtuResult<()> = (start..end).try_for_each(|index| {
            self.stream.open_index(index)?;
            samples.extend(self.read()?);
            Ok(())
        });
        self.stream.restore_range(limits);

        result.map(|()| samples)
    }

    fn decode_into(
        &mut self,
        bytes: &[u8],
        samples: &mut Vec<f32>,
    ) {
        let decoded = read_floats(bytes, self.config.byte_order);
        self.stats.samples_decoded += decoded.len() as u64;
        samples.extend(decoded);

        let tail = bytes.len() % FLOAT_SAMPLE_SIZE;
        if tail != 0 {
            warn!(
                "Discarding partial sample ({tail} bytes) in {}",
                self.stream.current_name()
            );
            self.stats.partial_discarded += 1;
        }
    }

    pub fn header(&self) -> Option<&Header> {
        self.stream.header()
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
