use serde::{Deserialize, Serialize};

use crate::{MtuError, MtuResult};

/// Единицы, в которые масштабируются выборки нативного потока.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum DataScaling {
    /// Отсчёты АЦП
    AdUnits = 0,
    /// Вольты на входе АЦП
    AdInputVolts = 1,
    /// Вольты на входе прибора (с учётом усиления тракта)
    InstrumentInputVolts = 2,
}

impl DataScaling {
    pub fn from_u8(v: u8) -> MtuResult<Self> {
        match v {
            0 => Ok(DataScaling::AdUnits),
            1 => Ok(DataScaling::AdInputVolts),
            2 => Ok(DataScaling::InstrumentInputVolts),
            _ => Err(MtuError::InvalidScalingMode(format!("{v}"))),
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl std::str::FromStr for DataScaling {
    type Err = MtuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ad_units" | "adunits" | "counts" => Ok(DataScaling::AdUnits),
            "ad_input_volts" | "ad_volts" => Ok(DataScaling::AdInputVolts),
            "instrument_input_volts" | "input_volts" | "sensor_volts" => {
                Ok(DataScaling::InstrumentInputVolts)
            }
            _ => Err(MtuError::InvalidScalingMode(s.to_string())),
        }
    }
}

/// Порядок байт футеров, подзаголовков и float-данных.
///
/// Заголовок файла всегда big-endian. Прошивка пишет полезную нагрузку в
/// little-endian; `Big` нужен для перепакованных файлов.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadByteOrder {
    Big,
    #[default]
    Little,
}

impl PayloadByteOrder {
    /// Читает `u32` из первых 4 байт `b`.
    pub fn read_u32(
        &self,
        b: &[u8],
    ) -> u32 {
        let b = [b[0], b[1], b[2], b[3]];
        match self {
            PayloadByteOrder::Big => u32::from_be_bytes(b),
            PayloadByteOrder::Little => u32::from_le_bytes(b),
        }
    }

    pub fn read_u16(
        &self,
        b: &[u8],
    ) -> u16 {
        let b = [b[0], b[1]];
        match self {
            PayloadByteOrder::Big => u16::from_be_bytes(b),
            PayloadByteOrder::Little => u16::from_le_bytes(b),
        }
    }

    pub fn read_f32(
        &self,
        b: &[u8],
    ) -> f32 {
        f32::from_bits(self.read_u32(b))
    }
}
