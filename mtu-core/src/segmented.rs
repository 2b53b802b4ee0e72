//! Сегментированный децимированный поток: записи из 32-байтового
//! подзаголовка и блока float-выборок.

use std::path::Path;

use log::{info, warn};
use mtu_types::{Header, MtuResult, SegmentedRecord, Subheader};

use crate::{
    binary::read_floats, FileSequence, ReadStats, ReaderConfig, SegmentSource, SequenceStream,
    FLOAT_SAMPLE_SIZE, SUBHEADER_SIZE,
};

/// Читатель записей сегментированного потока.
///
/// Подзаголовок и данные записи всегда берутся из одного файла: следующий
/// файл открывается, только когда текущий исчерпан.
pub struct SegmentedReader<S: SegmentSource> {
    stream: SequenceStream<S>,
    config: ReaderConfig,
    subheader: Subheader,
    stats: ReadStats,
}

impl SegmentedReader<FileSequence> {
    pub fn open(
        path: &Path,
        config: ReaderConfig,
    ) -> MtuResult<Self> {
        config.validate()?;
        let (source, first) = FileSequence::discover(path)?;
        Self::new(source, first, config)
    }
}

impl<S: SegmentSource> SegmentedReader<S> {
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
            subheader: Subheader::default(),
            stats: ReadStats::default(),
        })
    }

    /// Читает подзаголовок следующей записи.
    ///
    /// Если данных не осталось (или остался неполный подзаголовок),
    /// возвращает подзаголовок конца данных с `sample_count == 0`.
    pub fn read_subheader(&mut self) -> MtuResult<Subheader> {
        let bytes = self.stream.read_unit(SUBHEADER_SIZE)?;

        if bytes.len() < SUBHEADER_SIZE {
            if !bytes.is_empty() {
                warn!(
                    "Discarding partial subheader ({} bytes) in {}",
                    bytes.len(),
                    self.stream.current_name()
                );
                self.stats.partial_discarded += 1;
            }
            self.subheader = Subheader::end_of_data();
            return Ok(self.subheader);
        }

        let order = self.config.byte_order;
        self.subheader = Subheader {
            timestamp: order.read_u32(&bytes[0..4]),
            sample_count: order.read_u32(&bytes[4..8]),
            saturation_count: order.read_u16(&bytes[8..10]),
            miss_count: order.read_u16(&bytes[10..12]),
            min_value: order.read_f32(&bytes[12..16]),
            max_value: order.read_f32(&bytes[16..20]),
            avg_value: order.read_f32(&bytes[20..24]),
        };

        Ok(self.subheader)
    }

    /// Читает данные записи, описанной последним подзаголовком.
    ///
    /// При `sample_count == 0` ничего не читает.
    pub fn read_record_data(&mut self) -> MtuResult<Vec<f32>> {
        let count = self.subheader.sample_count as usize;
        if count == 0 {
            return Ok(Vec::new());
        }

        let bytes = self.stream.read_unit(count.saturating_mul(FLOAT_SAMPLE_SIZE))?;
        let samples = read_floats(&bytes, self.config.byte_order);

        if samples.len() < count {
            warn!(
                "Record at {} truncated: {} of {count} samples in {}",
                self.subheader.timestamp,
                samples.len(),
                self.stream.current_name()
            );
        }
        if bytes.len() % FLOAT_SAMPLE_SIZE != 0 {
            self.stats.partial_discarded += 1;
        }

        self.stats.samples_decoded += samples.len() as u64;
        Ok(samples)
    }

    /// Подзаголовок и данные следующей записи; `None` в конце данных.
    pub fn read_record(&mut self) -> MtuResult<Option<SegmentedRecord>> {
        let subheader = self.read_subheader()?;
        if subheader.is_end_of_data() {
            return Ok(None);
        }

        let samples = self.read_record_data()?;

        self.stats.records_read += 1;
        self.stats.missing_frames += subheader.miss_count as u64;
        if subheader.saturation_count != 0 {
            self.stats.saturated_frames += 1;
            if self.config.report_hw_sat {
                info!(
                    "Record at {} has {} saturations",
                    subheader.timestamp, subheader.saturation_count
                );
            }
        }

        Ok(Some(SegmentedRecord { subheader, samples }))
    }

    /// Последний прочитанный подзаголовок.
    pub fn subheader(&self) -> &Subheader {
        &self.subheader
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

impl<S: SegmentSource> Iterator for SegmentedReader<S> {
    type Item = MtuResult<SegmentedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}
