//! Потоковое чтение записей временных рядов MTU
//!
//! Файлы записи прибора MTU-5C: заголовок 128 байт и полезная нагрузка в
//! одном из трёх форматов. Многофайловая запись читается как единый поток,
//! коэффициенты тракта восстанавливаются из заголовка каждого файла.
//!
//! # Быстрый старт
//!
//! ```no_run
//! use std::path::Path;
//!
//! use mtu_core::{DataScaling, NativeReader, ReaderConfig};
//!
//! let config = ReaderConfig {
//!     num_files: 3,
//!     scale_to: DataScaling::InstrumentInputVolts,
//!     ..Default::default()
//! };
//!
//! let mut reader = NativeReader::open(Path::new("10128_608783F4_0_00000001.bin"), config)?;
//! let samples = reader.read_frames(1_000)?;
//! println!("{} samples, {} gaps", samples.len(), reader.stats().gap_count());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod binary;
pub mod config;
pub mod continuous;
pub mod filename;
pub mod format;
pub mod gain;
pub mod native;
pub mod segmented;
pub mod sequence;
pub mod stats;

#[cfg(test)]
mod testutil;

pub use config::*;
pub use continuous::*;
pub use filename::*;
pub use format::*;
pub use native::*;
pub use segmented::*;
pub use sequence::*;
pub use stats::*;

pub use mtu_types::{
    ChannelGains, ChannelType, DataScaling, FrameFooter, FrameGap, Header, MtuError,
    MtuResult, NativeBlock, PayloadByteOrder, SegmentedRecord, Subheader, TimingStatus,
};

/// Версия библиотеки.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
