use bytes::{Buf, BytesMut};
use encoding_rs::CoderResult;
use std::io;
use tokio_util::codec::Decoder;

/// Transcodes raw bytes to UTF-8 and splits them into lines.
///
/// Lines end at `\n` or `\r\n`; the terminator is not part of the item.
/// A leading byte-order mark is consumed by the underlying decoder.
pub struct LineCodec {
    encoding: &'static encoding_rs::Encoding,
    decoder: encoding_rs::Decoder,
    pending: String,
    consumed: usize,
    finished: bool,
}

impl LineCodec {
    pub fn new(encoding: &'static encoding_rs::Encoding) -> Self {
        Self {
            encoding,
            decoder: encoding.new_decoder(),
            pending: String::new(),
            consumed: 0,
            finished: false,
        }
    }

    /// Forget everything buffered so far, as if freshly constructed.
    pub fn reset(&mut self) {
        self.decoder = self.encoding.new_decoder();
        self.pending.clear();
        self.consumed = 0;
        self.finished = false;
    }

    /// Move `src` into the decoded buffer without yielding a line.
    /// `last` flushes the decoder; nothing more may be fed afterwards.
    pub fn absorb(&mut self, src: &mut BytesMut, last: bool) {
        self.transcode(src, last);
    }

    /// Decoded text is waiting, possibly an unterminated final line.
    pub fn has_pending(&self) -> bool {
        self.consumed < self.pending.len()
    }

    fn transcode(&mut self, src: &mut BytesMut, last: bool) {
        if self.finished {
            src.clear();
            return;
        }
        if self.consumed > 0 {
            self.pending.drain(..self.consumed);
            self.consumed = 0;
        }

        loop {
            let needed = self
                .decoder
                .max_utf8_buffer_length(src.len())
                .unwrap_or_else(|| src.len() * 3 + 16);
            self.pending.reserve(needed);

            let (result, bytes_read, _has_errors) =
                self.decoder.decode_to_string(src, &mut self.pending, last);
            src.advance(bytes_read);

            if let CoderResult::InputEmpty = result {
                break;
            }
        }

        self.finished = last;
    }

    fn take_line(&mut self) -> Option<String> {
        let rest = &self.pending[self.consumed..];
        let newline = rest.find('\n')?;
        let line = trim_carriage_return(&rest[..newline]).to_string();
        self.consumed += newline + 1;
        Some(line)
    }

    fn take_rest(&mut self) -> Option<String> {
        if self.consumed >= self.pending.len() {
            return None;
        }
        let line = trim_carriage_return(&self.pending[self.consumed..]).to_string();
        self.pending.clear();
        self.consumed = 0;
        Some(line)
    }
}

fn trim_carriage_return(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(line) = self.take_line() {
            return Ok(Some(line));
        }
        if src.is_empty() {
            return Ok(None);
        }

        self.transcode(src, false);
        Ok(self.take_line())
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(line) = self.decode(buf)? {
            return Ok(Some(line));
        }

        self.transcode(buf, true);
        Ok(self.take_line().or_else(|| self.take_rest()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(codec: &mut LineCodec, input: &[u8]) -> Vec<String> {
        let mut buf = BytesMut::from(input);
        let mut lines = Vec::new();
        while let Some(line) = codec.decode(&mut buf).unwrap() {
            lines.push(line);
        }
        while let Some(line) = codec.decode_eof(&mut buf).unwrap() {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn splits_lf_and_crlf() {
        let mut codec = LineCodec::new(encoding_rs::UTF_8);
        let lines = drain(&mut codec, b"a,b\r\nc,d\ne,f");
        assert_eq!(lines, vec!["a,b", "c,d", "e,f"]);
    }

    #[test]
    fn trailing_newline_adds_no_line_but_blank_lines_survive() {
        let mut codec = LineCodec::new(encoding_rs::UTF_8);
        assert_eq!(drain(&mut codec, b"a\n\nb\n"), vec!["a", "", "b"]);
    }

    #[test]
    fn strips_bom_and_transcodes() {
        let mut codec = LineCodec::new(encoding_rs::UTF_8);
        assert_eq!(drain(&mut codec, b"\xEF\xBB\xBFname\nx"), vec!["name", "x"]);

        let mut codec = LineCodec::new(encoding_rs::WINDOWS_1252);
        assert_eq!(drain(&mut codec, b"caf\xE9\n"), vec!["café"]);
    }

    #[test]
    fn multibyte_sequence_split_across_chunks() {
        let mut codec = LineCodec::new(encoding_rs::UTF_8);
        let bytes = "é,ü\n".as_bytes();
        let mut first = BytesMut::from(&bytes[..1]);
        assert_eq!(codec.decode(&mut first).unwrap(), None);
        let mut second = BytesMut::from(&bytes[1..]);
        assert_eq!(codec.decode(&mut second).unwrap(), Some("é,ü".to_string()));
    }

    #[test]
    fn absorb_buffers_without_taking_a_line() {
        let mut codec = LineCodec::new(encoding_rs::UTF_8);
        let mut buf = BytesMut::from(&b"tail"[..]);
        assert!(!codec.has_pending());
        codec.absorb(&mut buf, true);
        assert!(buf.is_empty());
        assert!(codec.has_pending());
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), Some("tail".to_string()));
        assert!(!codec.has_pending());
    }

    #[test]
    fn reset_starts_over() {
        let mut codec = LineCodec::new(encoding_rs::UTF_8);
        let mut buf = BytesMut::from(&b"one\ntwo"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("one".to_string()));
        codec.reset();
        assert_eq!(drain(&mut codec, b"three\n"), vec!["three"]);
    }
}
