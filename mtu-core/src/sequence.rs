//! Упорядоченная последовательность файлов одной записи как единый поток.
//!
//! Файлы записи читаются один за другим: при исчерпании текущего файла он
//! закрывается, открывается следующий, его заголовок разбирается заново и
//! чтение продолжается с начала полезной нагрузки.

use std::{
    fs::{self, File},
    io::{self, BufReader, Cursor, Read},
    path::{Path, PathBuf},
};

use log::info;
use mtu_types::{Header, MtuError, MtuResult};

use crate::{HeaderExt, RecordingFileName};

/// Источник упорядоченных сегментов (файлов) одной записи.
pub trait SegmentSource {
    type Segment: Read;

    /// Количество сегментов в источнике.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Имя сегмента (имя файла) для журналирования.
    fn name(
        &self,
        index: usize,
    ) -> String;

    /// Порядковый номер, записанный в имени сегмента.
    fn sequence_number(
        &self,
        index: usize,
    ) -> Option<u32> {
        self.name(index)
            .parse::<RecordingFileName>()
            .ok()
            .map(|n| n.sequence)
    }

    /// Открывает сегмент с начала.
    fn open(
        &mut self,
        index: usize,
    ) -> io::Result<Self::Segment>;
}

/// Файлы записи на диске, отсортированные по имени.
#[derive(Debug, Clone)]
pub struct FileSequence {
    paths: Vec<PathBuf>,
}

/// Записи в памяти: `(имя, содержимое)`. Для тестов и встраивания.
#[derive(Debug, Clone, Default)]
pub struct MemorySequence {
    segments: Vec<(String, Vec<u8>)>,
}

/// Состояние потока.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Ни один файл не открыт
    Idle,
    /// Открыт файл, чтение продолжается
    Streaming,
    /// Прочитан последний файл последовательности
    Exhausted,
    /// Предыдущая операция завершилась ошибкой ввода/вывода или заголовка
    Error,
}

/// Последовательность файлов, читаемая как один непрерывный поток байт.
///
/// Не потокобезопасна: владеет единственным курсором и открытым файлом.
pub struct SequenceStream<S: SegmentSource> {
    source: S,
    state: StreamState,
    current: Option<S::Segment>,
    header: Option<Header>,
    index: usize,
    first: usize,
    last: usize,
    header_size: usize,
    position: u64,
    files_opened: u64,
}

impl FileSequence {
    pub fn new(mut paths: Vec<PathBuf>) -> Self {
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Self { paths }
    }

    /// Находит все файлы записи, к которой относится `first`.
    ///
    /// Берутся файлы того же каталога и расширения; если имя `first`
    /// соответствует соглашению, то и с тем же префиксом
    /// `<instrument>_<recording>_<channel>_`. Возвращает последовательность
    /// и индекс `first` в ней.
    pub fn discover(first: &Path) -> MtuResult<(Self, usize)> {
        if !first.is_file() {
            return Err(MtuError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", first.display()),
            )));
        }

        let dir = match first.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let extension = first.extension().map(|e| e.to_os_string());
        let prefix = RecordingFileName::parse(first)
            .ok()
            .map(|n| n.stem_prefix());

        let mut paths = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();

            if !path.is_file() || path.extension().map(|e| e.to_os_string()) != extension {
                continue;
            }

            if let Some(prefix) = &prefix {
                let matches = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(prefix.as_str()));
                if !matches {
                    continue;
                }
            }

            paths.push(path);
        }

        let sequence = Self::new(paths);
        let index = sequence
            .paths
            .iter()
            .position(|p| p.file_name() == first.file_name())
            .ok_or(MtuError::EmptySequence)?;

        Ok((sequence, index))
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl SegmentSource for FileSequence {
    type Segment = BufReader<File>;

    fn len(&self) -> usize {
        self.paths.len()
    }

    fn name(
        &self,
        index: usize,
    ) -> String {
        self.paths[index]
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn open(
        &mut self,
        index: usize,
    ) -> io::Result<Self::Segment> {
        Ok(BufReader::new(File::open(&self.paths[index])?))
    }
}

impl MemorySequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавляет сегмент; порядок сегментов — порядок добавления.
    pub fn push<S: Into<String>>(
        &mut self,
        name: S,
        data: Vec<u8>,
    ) {
        self.segments.push((name.into(), data));
    }
}

impl SegmentSource for MemorySequence {
    type Segment = Cursor<Vec<u8>>;

    fn len(&self) -> usize {
        self.segments.len()
    }

    fn name(
        &self,
        index: usize,
    ) -> String {
        self.segments[index].0.clone()
    }

    fn open(
        &mut self,
        index: usize,
    ) -> io::Result<Self::Segment> {
        Ok(Cursor::new(self.segments[index].1.clone()))
    }
}

impl SequenceStream<FileSequence> {
    /// Открывает `num_files` файлов записи, начиная с `first`.
    pub fn open_path(
        first: &Path,
        num_files: usize,
        header_size: usize,
    ) -> MtuResult<Self> {
        let (source, index) = FileSequence::discover(first)?;
        Self::new(source, index, num_files, header_size)
    }
}

impl<S: SegmentSource> SequenceStream<S> {
    /// Создаёт поток и сразу открывает сегмент `first`.
    pub fn new(
        source: S,
        first: usize,
        num_files: usize,
        header_size: usize,
    ) -> MtuResult<Self> {
        if source.is_empty() {
            return Err(MtuError::EmptySequence);
        }
        if first >= source.len() {
            return Err(MtuError::config(format!(
                "first file index {first} out of range (sequence has {} files)",
                source.len()
            )));
        }
        if num_files == 0 {
            return Err(MtuError::config("num_files must be >= 1"));
        }

        let last = (first + num_files).min(source.len()) - 1;

        let mut stream = Self {
            source,
            state: StreamState::Idle,
            current: None,
            header: None,
            index: first,
            first,
            last,
            header_size,
            position: 0,
            files_opened: 0,
        };

        stream.open_index(first)?;

        Ok(stream)
    }

    /// Читает до `n` байт, переходя между файлами.
    ///
    /// Меньше `n` байт возвращается только в конце последовательности.
    /// Буфер растёт по мере чтения, поэтому `n` может быть недостоверным
    /// значением из данных.
    pub fn read(
        &mut self,
        n: usize,
    ) -> MtuResult<Vec<u8>> {
        let mut out = Vec::new();

        while out.len() < n {
            let got = self.read_current_into(n - out.len(), &mut out)?;
            if got == 0 && !self.open_next()? {
                break;
            }
        }

        Ok(out)
    }

    /// Читает до `n` байт из текущего файла, а если он исчерпан, из
    /// следующего.
    ///
    /// Единица данных (кадр, подзаголовок) не склеивается из хвоста одного
    /// файла и начала другого. Пустой результат означает конец
    /// последовательности.
    pub fn read_unit(
        &mut self,
        n: usize,
    ) -> MtuResult<Vec<u8>> {
        let mut out = Vec::new();

        loop {
            if self.read_current_into(n, &mut out)? > 0 || !self.open_next()? {
                return Ok(out);
            }
        }
    }

    /// Дописывает в `out` до `n` байт текущего файла.
    fn read_current_into(
        &mut self,
        n: usize,
        out: &mut Vec<u8>,
    ) -> MtuResult<usize> {
        let segment = match self.state {
            StreamState::Error => return Err(MtuError::StreamFailed),
            StreamState::Idle | StreamState::Exhausted => return Ok(0),
            StreamState::Streaming => match self.current.as_mut() {
                Some(s) => s,
                None => return Ok(0),
            },
        };

        match segment.take(n as u64).read_to_end(out) {
            Ok(got) => {
                self.position += got as u64;
                Ok(got)
            }
            Err(e) => {
                self.fail();
                Err(e.into())
            }
        }
    }

    /// Читает до `buf.len()` байт только из текущего файла.
    pub fn read_current(
        &mut self,
        buf: &mut [u8],
    ) -> MtuResult<usize> {
        let segment = match self.state {
            StreamState::Error => return Err(MtuError::StreamFailed),
            StreamState::Idle | StreamState::Exhausted => return Ok(0),
            StreamState::Streaming => match self.current.as_mut() {
                Some(s) => s,
                None => return Ok(0),
            },
        };

        let mut filled = 0;
        while filled < buf.len() {
            match segment.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) => {
                    self.fail();
                    return Err(e.into());
                }
            }
        }

        self.position += filled as u64;
        Ok(filled)
    }

    /// Остаток полезной нагрузки текущего файла.
    pub fn read_current_to_end(&mut self) -> MtuResult<Vec<u8>> {
        let mut out = Vec::new();

        let segment = match self.state {
            StreamState::Error => return Err(MtuError::StreamFailed),
            StreamState::Idle | StreamState::Exhausted => return Ok(out),
            StreamState::Streaming => match self.current.as_mut() {
                Some(s) => s,
                None => return Ok(out),
            },
        };

        if let Err(e) = segment.read_to_end(&mut out) {
            self.fail();
            return Err(e.into());
        }

        self.position += out.len() as u64;
        Ok(out)
    }

    /// Пропускает `n` байт, переходя между файлами.
    ///
    /// Возвращает `false`, если последовательность закончилась раньше;
    /// пропущенными остаются только фактически прочитанные байты.
    pub fn skip(
        &mut self,
        n: u64,
    ) -> MtuResult<bool> {
        let mut remaining = n;

        while remaining > 0 {
            let skipped = self.skip_current(remaining)?;
            if skipped == 0 {
                if !self.open_next()? {
                    return Ok(false);
                }
            } else {
                remaining -= skipped;
            }
        }

        Ok(true)
    }

    fn skip_current(
        &mut self,
        n: u64,
    ) -> MtuResult<u64> {
        let segment = match self.state {
            StreamState::Error => return Err(MtuError::StreamFailed),
            StreamState::Idle | StreamState::Exhausted => return Ok(0),
            StreamState::Streaming => match self.current.as_mut() {
                Some(s) => s,
                None => return Ok(0),
            },
        };

        match io::copy(&mut segment.take(n), &mut io::sink()) {
            Ok(skipped) => {
                self.position += skipped;
                Ok(skipped)
            }
            Err(e) => {
                self.fail();
                Err(e.into())
            }
        }
    }

    /// Закрывает текущий файл и открывает следующий.
    ///
    /// `false` — следующего файла в пределах последовательности нет.
    pub fn open_next(&mut self) -> MtuResult<bool> {
        match self.state {
            StreamState::Error => return Err(MtuError::StreamFailed),
            StreamState::Idle | StreamState::Exhausted => return Ok(false),
            StreamState::Streaming => {}
        }

        self.current = None;

        if self.index < self.last {
            self.open_index(self.index + 1)?;
            Ok(true)
        } else {
            self.state = StreamState::Exhausted;
            Ok(false)
        }
    }

    /// Открывает файл с порядковым номером `seq` из имени файла.
    pub fn open_at(
        &mut self,
        seq: u32,
    ) -> MtuResult<()> {
        let index = (0..self.source.len())
            .find(|&i| self.source.sequence_number(i) == Some(seq))
            .ok_or(MtuError::SequenceNotFound(seq))?;

        self.open_index(index)
    }

    /// Открывает файл по индексу в упорядоченном списке.
    ///
    /// Если индекс вне текущего диапазона, диапазон расширяется до него.
    pub fn open_index(
        &mut self,
        index: usize,
    ) -> MtuResult<()> {
        if index >= self.source.len() {
            return Err(MtuError::config(format!(
                "file index {index} out of range (sequence has {} files)",
                self.source.len()
            )));
        }

        self.current = None;
        self.header = None;
        self.first = self.first.min(index);
        self.last = self.last.max(index);
        self.index = index;

        info!("Opening {}", self.source.name(index));

        let mut segment = match self.source.open(index) {
            Ok(s) => s,
            Err(e) => {
                self.fail();
                return Err(e.into());
            }
        };
        self.files_opened += 1;

        if self.header_size > 0 {
            match read_header(&mut segment, self.header_size) {
                Ok(h) => self.header = Some(h),
                Err(e) => {
                    self.fail();
                    return Err(e);
                }
            }
        }

        self.current = Some(segment);
        self.state = StreamState::Streaming;

        Ok(())
    }

    /// Закрывает текущий файл.
    pub fn close(&mut self) {
        self.current = None;
        self.state = StreamState::Idle;
    }

    fn fail(&mut self) {
        self.current = None;
        self.state = StreamState::Error;
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Заголовок текущего файла (`None` для файлов без заголовка).
    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    pub fn header_size(&self) -> usize {
        self.header_size
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn current_name(&self) -> String {
        self.source.name(self.index)
    }

    /// Диапазон индексов `[first, last]`, по которому идёт чтение.
    pub fn range(&self) -> (usize, usize) {
        (self.first, self.last)
    }

    /// Возвращает диапазон чтения к ранее сохранённому `range()`.
    ///
    /// Если текущий файл оказался за пределами диапазона, следующий
    /// переход завершит последовательность.
    pub fn restore_range(
        &mut self,
        (first, last): (usize, usize),
    ) {
        self.first = first;
        self.last = last;
    }

    pub fn sequence_len(&self) -> usize {
        self.source.len()
    }

    pub fn file_names(&self) -> Vec<String> {
        (0..self.source.len()).map(|i| self.source.name(i)).collect()
    }

    /// Всего байт полезной нагрузки, прочитанных или пропущенных.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn files_opened(&self) -> u64 {
        self.files_opened
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

fn read_header<R: Read>(
    segment: &mut R,
    header_size: usize,
) -> MtuResult<Header> {
    let mut buf = Vec::with_capacity(header_size);
    segment.take(header_size as u64).read_to_end(&mut buf)?;

    Header::decode(&buf, header_size)
}
