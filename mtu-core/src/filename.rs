use std::path::Path;

use mtu_types::{MtuError, MtuResult};

/// Имя файла записи: `<instrument>_<recording>_<channel>_<seq_hex>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingFileName {
    pub instrument_id: String,
    pub recording_id: String,
    pub channel_id: String,
    /// Порядковый номер (в имени записан в шестнадцатеричном виде)
    pub sequence: u32,
    /// Расширение без точки, например `td_24k`
    pub extension: String,
}

impl RecordingFileName {
    pub fn parse(path: &Path) -> MtuResult<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| MtuError::invalid_file_name(path.display().to_string()))?;

        name.parse()
    }

    /// Префикс, общий для всех файлов одной записи одного канала.
    pub fn stem_prefix(&self) -> String {
        format!(
            "{}_{}_{}_",
            self.instrument_id, self.recording_id, self.channel_id
        )
    }
}

impl std::str::FromStr for RecordingFileName {
    type Err = MtuError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let (stem, extension) = name
            .rsplit_once('.')
            .ok_or_else(|| MtuError::invalid_file_name(format!("{name}: no extension")))?;

        let parts: Vec<&str> = stem.split('_').collect();
        let [instrument_id, recording_id, channel_id, seq] = parts[..] else {
            return Err(MtuError::invalid_file_name(format!(
                "{name}: expected 4 '_'-separated fields, found {}",
                parts.len()
            )));
        };

        let sequence = u32::from_str_radix(seq, 16)
            .map_err(|e| MtuError::invalid_file_name(format!("{name}: sequence '{seq}': {e}")))?;

        Ok(RecordingFileName {
            instrument_id: instrument_id.to_string(),
            recording_id: recording_id.to_string(),
            channel_id: channel_id.to_string(),
            sequence,
            extension: extension.to_string(),
        })
    }
}
