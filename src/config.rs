use crate::error::{CsvError, CsvResult};

pub const DEFAULT_DELIMITER: char = ',';
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Parser options. Fixed once a parser has been built from them.
#[derive(Debug, Clone)]
pub struct CsvConfiguration {
    delimiter: char,
    /// Read chunk size for the underlying stream (an I/O hint only).
    buffer_size: usize,
    /// Which character encoding to expect (defaults to UTF-8)
    encoding: &'static encoding_rs::Encoding,
    /// Trim surrounding whitespace from data field values.
    ignore_white_spaces: bool,
}

impl Default for CsvConfiguration {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            buffer_size: DEFAULT_BUFFER_SIZE,
            encoding: encoding_rs::UTF_8,
            ignore_white_spaces: false,
        }
    }
}

impl CsvConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Newline, carriage return and NUL can never separate fields.
    pub fn set_delimiter(&mut self, delimiter: char) -> CsvResult<()> {
        let reason = match delimiter {
            '\n' => "new line is not a valid delimiter",
            '\r' => "carriage return is not a valid delimiter",
            '\0' => "null is not a valid delimiter",
            _ => {
                self.delimiter = delimiter;
                return Ok(());
            }
        };
        Err(CsvError::InvalidArgument(reason.to_string()))
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn set_buffer_size(&mut self, buffer_size: usize) -> CsvResult<()> {
        if buffer_size == 0 {
            return Err(CsvError::InvalidArgument(
                "buffer size must be greater than zero".to_string(),
            ));
        }
        self.buffer_size = buffer_size;
        Ok(())
    }

    pub fn encoding(&self) -> &'static encoding_rs::Encoding {
        self.encoding
    }

    pub fn set_encoding(&mut self, encoding: &'static encoding_rs::Encoding) {
        self.encoding = encoding;
    }

    /// Resolve a WHATWG encoding label such as `"latin1"` or `"utf-16le"`.
    pub fn set_encoding_label(&mut self, label: &str) -> CsvResult<()> {
        let encoding = encoding_rs::Encoding::for_label(label.trim().as_bytes()).ok_or_else(
            || CsvError::InvalidArgument(format!("unknown character encoding `{label}`")),
        )?;
        self.encoding = encoding;
        Ok(())
    }

    pub fn ignore_white_spaces(&self) -> bool {
        self.ignore_white_spaces
    }

    pub fn set_ignore_white_spaces(&mut self, ignore: bool) {
        self.ignore_white_spaces = ignore;
    }
}
