//! Forward-only, rewindable line sources.

use crate::codec::LineCodec;
use crate::config::CsvConfiguration;
use crate::error::{CsvError, CsvResult};
use bytes::BytesMut;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tokio_util::codec::Decoder;

/// A stream of text lines that can be restarted from the top.
pub trait LineSource {
    /// Next line without its terminator, or `None` at end of stream.
    fn next_line(&mut self) -> CsvResult<Option<String>>;

    /// Reposition to offset zero, dropping anything buffered, so the next
    /// call to [`next_line`](LineSource::next_line) yields the first line.
    fn reset_to_start(&mut self) -> CsvResult<()>;

    /// True when the next [`next_line`](LineSource::next_line) would return
    /// `None`. May read ahead into internal buffers, never past a line.
    fn at_end(&mut self) -> CsvResult<bool>;

    /// Total number of physical lines, when the source can tell without
    /// decoding them one by one. Must not move the read position.
    fn line_count_hint(&mut self) -> CsvResult<Option<usize>> {
        Ok(None)
    }
}

/// Line source over any seekable reader.
pub struct StreamLineSource<R> {
    reader: R,
    buf: BytesMut,
    chunk_size: usize,
    codec: LineCodec,
    eof: bool,
}

impl<R: Read + Seek> StreamLineSource<R> {
    pub fn new(reader: R, config: &CsvConfiguration) -> Self {
        let chunk_size = config.buffer_size().max(1);
        Self {
            reader,
            buf: BytesMut::with_capacity(chunk_size),
            chunk_size,
            codec: LineCodec::new(config.encoding()),
            eof: false,
        }
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn fill(&mut self) -> io::Result<()> {
        let start = self.buf.len();
        self.buf.resize(start + self.chunk_size, 0);
        let read = loop {
            match self.reader.read(&mut self.buf[start..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.buf.truncate(start);
                    return Err(e);
                }
            }
        };
        self.buf.truncate(start + read);
        if read == 0 {
            self.eof = true;
        }
        Ok(())
    }
}

impl<R: Read + Seek> LineSource for StreamLineSource<R> {
    fn next_line(&mut self) -> CsvResult<Option<String>> {
        loop {
            if self.eof {
                return Ok(self.codec.decode_eof(&mut self.buf)?);
            }
            if let Some(line) = self.codec.decode(&mut self.buf)? {
                return Ok(Some(line));
            }
            self.fill()?;
        }
    }

    fn at_end(&mut self) -> CsvResult<bool> {
        loop {
            if !self.buf.is_empty() {
                self.codec.absorb(&mut self.buf, false);
            }
            if self.codec.has_pending() {
                return Ok(false);
            }
            if self.eof {
                self.codec.absorb(&mut self.buf, true);
                return Ok(!self.codec.has_pending());
            }
            self.fill()?;
        }
    }

    fn reset_to_start(&mut self) -> CsvResult<()> {
        self.reader.seek(SeekFrom::Start(0))?;
        self.buf.clear();
        self.codec.reset();
        self.eof = false;
        Ok(())
    }
}

/// Line source over a local file. Remembers its path so the optional
/// fast path can count lines without decoding.
pub struct FileLineSource {
    path: PathBuf,
    inner: StreamLineSource<File>,
    #[cfg_attr(not(feature = "fast_local"), allow(dead_code))]
    utf8: bool,
}

impl FileLineSource {
    /// Fails with `InvalidArgument` for an empty path and `NotFound` when
    /// nothing exists at `path`.
    pub fn open(path: &Path, config: &CsvConfiguration) -> CsvResult<Self> {
        if path.as_os_str().is_empty() {
            return Err(CsvError::InvalidArgument(
                "path cannot be empty".to_string(),
            ));
        }
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CsvError::NotFound {
                path: path.to_path_buf(),
            },
            _ => CsvError::Io(e),
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            inner: StreamLineSource::new(file, config),
            utf8: config.encoding() == encoding_rs::UTF_8,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LineSource for FileLineSource {
    fn next_line(&mut self) -> CsvResult<Option<String>> {
        self.inner.next_line()
    }

    fn at_end(&mut self) -> CsvResult<bool> {
        self.inner.at_end()
    }

    fn reset_to_start(&mut self) -> CsvResult<()> {
        self.inner.reset_to_start()
    }

    #[cfg(feature = "fast_local")]
    fn line_count_hint(&mut self) -> CsvResult<Option<usize>> {
        if !self.utf8 {
            return Ok(None);
        }
        crate::fast::count_lines(&self.path).map(Some)
    }
}

impl<S: LineSource + ?Sized> LineSource for Box<S> {
    fn next_line(&mut self) -> CsvResult<Option<String>> {
        (**self).next_line()
    }

    fn at_end(&mut self) -> CsvResult<bool> {
        (**self).at_end()
    }

    fn reset_to_start(&mut self) -> CsvResult<()> {
        (**self).reset_to_start()
    }

    fn line_count_hint(&mut self) -> CsvResult<Option<usize>> {
        (**self).line_count_hint()
    }
}
