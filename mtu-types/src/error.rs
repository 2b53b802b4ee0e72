use thiserror::Error;

/// Результат для операций чтения записей MTU
pub type MtuResult<T> = std::result::Result<T, MtuError>;

/// Типы ошибок при декодировании записей.
#[derive(Debug, Error)]
pub enum MtuError {
    /// Буфер заголовка короче заявленной длины
    #[error("Truncated header: expected {expected} bytes, found {found}")]
    TruncatedHeader { expected: usize, found: usize },

    /// Расчёт усиления вызван до определения типа канала
    #[error("Channel type must be determined before calculating gains")]
    ChannelTypeUndetermined,

    /// Неизвестный режим масштабирования
    #[error("Invalid scaling requested: {0}")]
    InvalidScalingMode(String),

    /// Имя файла не соответствует соглашению
    /// `<instrument>_<recording>_<channel>_<seq>.<ext>`
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    /// Нет файла с таким порядковым номером
    #[error("No file with sequence number {0}")]
    SequenceNotFound(u32),

    /// В каталоге нет ни одного файла последовательности
    #[error("Empty file sequence")]
    EmptySequence,

    /// Поток уже завершился ошибкой ввода/вывода
    #[error("Stream failed on a previous I/O error")]
    StreamFailed,

    /// Некорректная конфигурация читателя
    #[error("Config error: {0}")]
    Config(String),

    /// Ошибки ввода/вывода (автоконвертируются из std::io::Error)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MtuError {
    /// Удобные конструкторы
    pub fn invalid_file_name<S: Into<String>>(s: S) -> Self {
        Self::InvalidFileName(s.into())
    }

    pub fn config<S: Into<String>>(s: S) -> Self {
        Self::Config(s.into())
    }

    /// `true` для ошибок, прерывающих декодирование текущего заголовка.
    pub fn is_header_error(&self) -> bool {
        matches!(
            self,
            MtuError::TruncatedHeader { .. } | MtuError::ChannelTypeUndetermined
        )
    }
}
