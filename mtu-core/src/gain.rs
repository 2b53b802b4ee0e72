//! Восстановление коэффициентов аналогового тракта канала.
//!
//! Вход: 8-байтовая упакованная конфигурация (`hw_fingerprint`) и модель
//! платы. Позиции битов зафиксированы аппаратурой. Зависимость от ревизий
//! плат собрана в таблицы ниже, чтобы каждую строку можно было проверить
//! отдельно.

use mtu_types::{
    board_model_main, board_model_revision, ChannelGains, ChannelType, MtuError, MtuResult,
};

/// Бит типа канала в `fingerprint[1]`
pub const CHANNEL_TYPE_BIT: u8 = 0x08;
/// Бит типа канала, определённого электроникой, в `fingerprint[1]`
pub const DETECTED_CHANNEL_TYPE_BIT: u8 = 0x20;
/// Бит внутреннего усиления H-канала в `fingerprint[1]`
pub const INTRINSIC_GAIN_BIT: u8 = 0x01;
/// Бит включения ФНЧ в `fingerprint[0]`
pub const LP_FILTER_ON_BIT: u8 = 0x80;
/// Маска кода ФНЧ в `fingerprint[0]`
pub const LP_FILTER_MASK: u8 = 0x03;
/// Бит предусилителя в `fingerprint[0]`
pub const PREAMP_BIT: u8 = 0x10;
/// Маска основного усиления в `fingerprint[0]`
pub const MAIN_GAIN_MASK: u8 = 0x0C;
/// Бит аттенюатора в `fingerprint[4]`
pub const ATTENUATOR_BIT: u8 = 0x01;

/// Аппаратная версия экспериментального прототипа
const BCM05_A: &str = "BCM05-A";

/// Банк коэффициентов, к которому относится плата.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GainBank {
    /// BCM01, BCM03: исходные платы 24 и 96 kSps
    Original,
    /// Прототип BCM05-A со старыми банками усиления
    Bcm05aPrototype,
    /// BCM05-B, BCM06 и все более новые платы
    Current,
}

/// Набор частот ФНЧ, к которому относится плата.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterBank {
    Standard,
    /// BCM03, BCM06
    HighRate,
}

/// Основное усиление: `(код, Original/прототип, Current)`.
pub const MAIN_GAIN_TABLE: [(u8, f64, f64); 4] = [
    (0x00, 1.0, 1.0),
    (0x04, 4.0, 4.0),
    (0x08, 16.0, 6.0),
    (0x0C, 32.0, 8.0),
];

/// Частота среза включённого ФНЧ: `(код, Standard, HighRate)`.
pub const LP_FREQUENCY_TABLE: [(u8, u32, u32); 3] = [
    (0x03, 10, 10),
    (0x02, 100, 1_000),
    (0x01, 1_000, 10_000),
];

/// Частота среза при выключенном ФНЧ: `(Standard, HighRate)`.
pub const LP_FILTER_OFF: (u32, u32) = (10_000, 17_800);

/// Предусилитель E-канала: `(Original, прототип, Current)`.
pub const PREAMP_GAIN_TABLE: (f64, f64, f64) = (4.0, 4.0, 8.0);

/// Предусилитель экспериментальной ревизии `L` плат BCM01/BCM03.
pub const PREAMP_GAIN_REVISION_L: f64 = 8.0;

/// Аттенюатор E-канала: `(Original/прототип, Current)`.
pub const ATTENUATOR_GAIN_TABLE: (f64, f64) = (0.1, 523.0 / 5223.0);

/// Входные данные расчёта.
#[derive(Debug, Clone, Copy)]
pub struct GainInputs<'a> {
    pub fingerprint: &'a [u8; 8],
    /// Первые 5 символов модели платы
    pub board_model_main: &'a str,
    pub board_model_revision: &'a str,
    /// Аппаратная версия платы (полная строка модели)
    pub hardware_version: &'a str,
}

impl<'a> GainInputs<'a> {
    pub fn from_board(
        fingerprint: &'a [u8; 8],
        board_model: &'a str,
    ) -> Self {
        GainInputs {
            fingerprint,
            board_model_main: board_model_main(board_model),
            board_model_revision: board_model_revision(board_model),
            hardware_version: board_model,
        }
    }

    pub fn gain_bank(&self) -> GainBank {
        if matches!(self.board_model_main, "BCM01" | "BCM03") {
            GainBank::Original
        } else if self.hardware_version.starts_with(BCM05_A) {
            GainBank::Bcm05aPrototype
        } else {
            GainBank::Current
        }
    }

    pub fn filter_bank(&self) -> FilterBank {
        if matches!(self.board_model_main, "BCM03" | "BCM06") {
            FilterBank::HighRate
        } else {
            FilterBank::Standard
        }
    }
}

/// Вычисляет все коэффициенты канала за один проход.
pub fn resolve(inputs: &GainInputs<'_>) -> MtuResult<ChannelGains> {
    let channel_type = channel_type(inputs.fingerprint);
    let known = Some(channel_type);

    let preamp_gain = preamp_gain(inputs, known)?;
    let channel_main_gain = main_gain(inputs);
    let intrinsic_circuitry_gain = intrinsic_circuitry_gain(inputs, known)?;
    let attenuator_gain = attenuator_gain(inputs, known)?;
    let total_selectable_gain = channel_main_gain * preamp_gain * attenuator_gain;

    Ok(ChannelGains {
        channel_type,
        detected_channel_type: detected_channel_type(inputs.fingerprint),
        lp_frequency: lp_frequency(inputs),
        preamp_gain,
        channel_main_gain,
        intrinsic_circuitry_gain,
        attenuator_gain,
        total_selectable_gain,
        total_circuitry_gain: total_selectable_gain * intrinsic_circuitry_gain,
    })
}

pub fn channel_type(fingerprint: &[u8; 8]) -> ChannelType {
    if fingerprint[1] & CHANNEL_TYPE_BIT != 0 {
        ChannelType::E
    } else {
        ChannelType::H
    }
}

pub fn detected_channel_type(fingerprint: &[u8; 8]) -> ChannelType {
    if fingerprint[1] & DETECTED_CHANNEL_TYPE_BIT != 0 {
        ChannelType::E
    } else {
        ChannelType::H
    }
}

pub fn lp_frequency(inputs: &GainInputs<'_>) -> Option<u32> {
    let bank = inputs.filter_bank();
    let pick = |standard: u32, high_rate: u32| match bank {
        FilterBank::Standard => standard,
        FilterBank::HighRate => high_rate,
    };

    if inputs.fingerprint[0] & LP_FILTER_ON_BIT == 0 {
        return Some(pick(LP_FILTER_OFF.0, LP_FILTER_OFF.1));
    }

    let code = inputs.fingerprint[0] & LP_FILTER_MASK;

    LP_FREQUENCY_TABLE
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|&(_, standard, high_rate)| pick(standard, high_rate))
}

pub fn preamp_gain(
    inputs: &GainInputs<'_>,
    channel_type: Option<ChannelType>,
) -> MtuResult<f64> {
    let channel_type = channel_type.ok_or(MtuError::ChannelTypeUndetermined)?;

    if channel_type != ChannelType::E || inputs.fingerprint[0] & PREAMP_BIT == 0 {
        return Ok(1.0);
    }

    let (original, prototype, current) = PREAMP_GAIN_TABLE;

    Ok(match inputs.gain_bank() {
        GainBank::Original if inputs.board_model_revision == "L" => PREAMP_GAIN_REVISION_L,
        GainBank::Original => original,
        GainBank::Bcm05aPrototype => prototype,
        GainBank::Current => current,
    })
}

pub fn main_gain(inputs: &GainInputs<'_>) -> f64 {
    let code = inputs.fingerprint[0] & MAIN_GAIN_MASK;
    let legacy = inputs.gain_bank() != GainBank::Current;

    MAIN_GAIN_TABLE
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|&(_, old, new)| if legacy { old } else { new })
        .unwrap_or(1.0)
}

pub fn intrinsic_circuitry_gain(
    inputs: &GainInputs<'_>,
    channel_type: Option<ChannelType>,
) -> MtuResult<f64> {
    let channel_type = channel_type.ok_or(MtuError::ChannelTypeUndetermined)?;

    if channel_type == ChannelType::H && inputs.fingerprint[1] & INTRINSIC_GAIN_BIT != 0 {
        Ok(1.0)
    } else {
        Ok(0.5)
    }
}

pub fn attenuator_gain(
    inputs: &GainInputs<'_>,
    channel_type: Option<ChannelType>,
) -> MtuResult<f64> {
    let channel_type = channel_type.ok_or(MtuError::ChannelTypeUndetermined)?;

    if channel_type != ChannelType::E || inputs.fingerprint[4] & ATTENUATOR_BIT == 0 {
        return Ok(1.0);
    }

    let (legacy, current) = ATTENUATOR_GAIN_TABLE;

    Ok(match inputs.gain_bank() {
        GainBank::Current => current,
        GainBank::Original | GainBank::Bcm05aPrototype => legacy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs<'a>(
        fingerprint: &'a [u8; 8],
        model: &'a str,
    ) -> GainInputs<'a> {
        GainInputs::from_board(fingerprint, model)
    }

    #[test]
    fn test_h_channel_bcm01() {
        // Магнитный канал BCM01-I: main gain 4, внутреннее усиление 1
        let fp = [4, 3, 0, 0, 0, 10, 128, 0];
        let gains = resolve(&inputs(&fp, "BCM01-I")).unwrap();

        assert_eq!(gains.channel_type, ChannelType::H);
        assert_eq!(gains.detected_channel_type, ChannelType::H);
        assert_eq!(gains.lp_frequency, Some(10_000));
        assert_eq!(gains.preamp_gain, 1.0);
        assert_eq!(gains.channel_main_gain, 4.0);
        assert_eq!(gains.intrinsic_circuitry_gain, 1.0);
        assert_eq!(gains.attenuator_gain, 1.0);
        assert_eq!(gains.total_selectable_gain, 4.0);
        assert_eq!(gains.total_circuitry_gain, 4.0);
    }

    #[test]
    fn test_e_channel_bcm01_preamp() {
        let fp = [0x10, 0x28, 0, 0, 0, 234, 127, 0];
        let gains = resolve(&inputs(&fp, "BCM01-I")).unwrap();

        assert_eq!(gains.channel_type, ChannelType::E);
        assert_eq!(gains.detected_channel_type, ChannelType::E);
        assert_eq!(gains.preamp_gain, 4.0);
        assert_eq!(gains.channel_main_gain, 1.0);
        assert_eq!(gains.intrinsic_circuitry_gain, 0.5);
        assert_eq!(gains.total_circuitry_gain, 2.0);
    }

    #[test]
    fn test_preamp_table() {
        let fp = [PREAMP_BIT, CHANNEL_TYPE_BIT, 0, 0, 0, 0, 0, 0];
        let e = Some(ChannelType::E);

        assert_eq!(preamp_gain(&inputs(&fp, "BCM03-A"), e).unwrap(), 4.0);
        assert_eq!(preamp_gain(&inputs(&fp, "BCM05-A1"), e).unwrap(), 4.0);
        assert_eq!(preamp_gain(&inputs(&fp, "BCM05-B"), e).unwrap(), 8.0);
        assert_eq!(preamp_gain(&inputs(&fp, "BCM06-A"), e).unwrap(), 8.0);

        // Ревизия L достижима только при явной передаче ревизии
        let rev_l = GainInputs {
            board_model_revision: "L",
            ..inputs(&fp, "BCM01-L")
        };
        assert_eq!(preamp_gain(&rev_l, e).unwrap(), 8.0);
        // Из строки модели ревизия не извлекается
        assert_eq!(preamp_gain(&inputs(&fp, "BCM01-L"), e).unwrap(), 4.0);

        // Без бита предусилителя или для H-канала — 1.0
        let off = [0, CHANNEL_TYPE_BIT, 0, 0, 0, 0, 0, 0];
        assert_eq!(preamp_gain(&inputs(&off, "BCM05-B"), e).unwrap(), 1.0);
        assert_eq!(
            preamp_gain(&inputs(&fp, "BCM05-B"), Some(ChannelType::H)).unwrap(),
            1.0
        );
    }

    #[test]
    fn test_main_gain_table() {
        let cases = [
            (0x00, "BCM01-I", 1.0),
            (0x04, "BCM01-I", 4.0),
            (0x08, "BCM01-I", 16.0),
            (0x0C, "BCM03-B", 32.0),
            (0x08, "BCM05-A", 16.0),
            (0x0C, "BCM05-A", 32.0),
            (0x08, "BCM05-B", 6.0),
            (0x0C, "BCM06-A", 8.0),
            (0x04, "BCM06-A", 4.0),
        ];

        for (code, model, expected) in cases {
            let fp = [code, 0, 0, 0, 0, 0, 0, 0];
            assert_eq!(
                main_gain(&inputs(&fp, model)),
                expected,
                "code {code:#04x} on {model}"
            );
        }
    }

    #[test]
    fn test_lp_frequency_table() {
        let cases = [
            (0x00, "BCM01-I", Some(10_000)),
            (0x00, "BCM03-A", Some(17_800)),
            (0x00, "BCM06-A", Some(17_800)),
            (0x83, "BCM01-I", Some(10)),
            (0x83, "BCM06-A", Some(10)),
            (0x82, "BCM01-I", Some(100)),
            (0x82, "BCM03-A", Some(1_000)),
            (0x81, "BCM05-B", Some(1_000)),
            (0x81, "BCM06-A", Some(10_000)),
            (0x80, "BCM01-I", None),
        ];

        for (code, model, expected) in cases {
            let fp = [code, 0, 0, 0, 0, 0, 0, 0];
            assert_eq!(
                lp_frequency(&inputs(&fp, model)),
                expected,
                "code {code:#04x} on {model}"
            );
        }
    }

    #[test]
    fn test_attenuator_table() {
        let fp = [0, CHANNEL_TYPE_BIT, 0, 0, ATTENUATOR_BIT, 0, 0, 0];
        let e = Some(ChannelType::E);

        assert_eq!(attenuator_gain(&inputs(&fp, "BCM01-I"), e).unwrap(), 0.1);
        assert_eq!(attenuator_gain(&inputs(&fp, "BCM03-I"), e).unwrap(), 0.1);
        assert_eq!(attenuator_gain(&inputs(&fp, "BCM05-A"), e).unwrap(), 0.1);
        assert_eq!(
            attenuator_gain(&inputs(&fp, "BCM05-B"), e).unwrap(),
            523.0 / 5223.0
        );
        assert_eq!(
            attenuator_gain(&inputs(&fp, "BCM05-B"), Some(ChannelType::H)).unwrap(),
            1.0
        );
    }

    #[test]
    fn test_intrinsic_gain() {
        let fp = [0, INTRINSIC_GAIN_BIT, 0, 0, 0, 0, 0, 0];
        let i = inputs(&fp, "BCM05-B");

        assert_eq!(intrinsic_circuitry_gain(&i, Some(ChannelType::H)).unwrap(), 1.0);
        assert_eq!(intrinsic_circuitry_gain(&i, Some(ChannelType::E)).unwrap(), 0.5);

        let no_bit = [0u8; 8];
        assert_eq!(
            intrinsic_circuitry_gain(&inputs(&no_bit, "BCM05-B"), Some(ChannelType::H))
                .unwrap(),
            0.5
        );
    }

    #[test]
    fn test_undetermined_channel_type() {
        let fp = [0u8; 8];
        let i = inputs(&fp, "BCM05-B");

        assert!(matches!(
            preamp_gain(&i, None),
            Err(MtuError::ChannelTypeUndetermined)
        ));
        assert!(matches!(
            intrinsic_circuitry_gain(&i, None),
            Err(MtuError::ChannelTypeUndetermined)
        ));
        assert!(matches!(
            attenuator_gain(&i, None),
            Err(MtuError::ChannelTypeUndetermined)
        ));
    }

    #[test]
    fn test_totals_are_products() {
        for b0 in [0x00u8, 0x14, 0x1C, 0x98, 0x9F] {
            for b1 in [0x00u8, 0x01, 0x08, 0x29] {
                for model in ["BCM01-I", "BCM05-A", "BCM05-B", "BCM06-A"] {
                    let fp = [b0, b1, 0, 0, 0x01, 0, 0, 0];
                    let g = resolve(&inputs(&fp, model)).unwrap();
                    assert_eq!(
                        g.total_selectable_gain,
                        g.channel_main_gain * g.preamp_gain * g.attenuator_gain
                    );
                    assert_eq!(
                        g.total_circuitry_gain,
                        g.total_selectable_gain * g.intrinsic_circuitry_gain
                    );
                }
            }
        }
    }
}
