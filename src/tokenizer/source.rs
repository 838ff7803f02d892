//! Raw character sources
//!
//! The leaf layer of a tokenizer chain reads its input one character at a time
//! through [`CharSource`]. No random access or pushback is needed: whatever has
//! been read but not yet resolved into spans is buffered by the tokenizer.
//!
//! Two sources are provided:
//! - [`CharReader`] decodes UTF-8 from any `io::Read`, one scalar per call.
//! - [`StrSource`] walks the characters of an in-memory string.

use std::io::{self, BufReader, Read};
use std::str::Chars;

/// A sequential character source.
pub trait CharSource {
    /// Read the next character. `Ok(None)` signals end-of-stream.
    fn read_char(&mut self) -> io::Result<Option<char>>;
}

impl<T: CharSource + ?Sized> CharSource for Box<T> {
    fn read_char(&mut self) -> io::Result<Option<char>> {
        (**self).read_char()
    }
}

impl<T: CharSource + ?Sized> CharSource for &mut T {
    fn read_char(&mut self) -> io::Result<Option<char>> {
        (**self).read_char()
    }
}

/// UTF-8 decoding character source over a byte reader.
///
/// Malformed input is an `InvalidData` error, not a replacement character:
/// the caller has to be able to tell broken input from a clean end-of-stream.
pub struct CharReader<R> {
    inner: BufReader<R>,
    offset: usize,
}

impl<R: Read> CharReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: BufReader::new(reader),
            offset: 0,
        }
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: Read> CharSource for CharReader<R> {
    fn read_char(&mut self) -> io::Result<Option<char>> {
        let lead = match self.read_byte()? {
            Some(byte) => byte,
            None => return Ok(None),
        };

        let len = utf8_sequence_length(lead).ok_or_else(|| {
            invalid_utf8(format!(
                "invalid UTF-8 lead byte 0x{lead:02X} at byte offset {}",
                self.offset
            ))
        })?;

        let mut bytes = [lead, 0, 0, 0];
        if len > 1 {
            self.inner
                .read_exact(&mut bytes[1..len])
                .map_err(|e| match e.kind() {
                    io::ErrorKind::UnexpectedEof => invalid_utf8(format!(
                        "truncated UTF-8 sequence at byte offset {}",
                        self.offset
                    )),
                    _ => e,
                })?;
        }

        let decoded = std::str::from_utf8(&bytes[..len]).map_err(|e| {
            invalid_utf8(format!(
                "malformed UTF-8 sequence {:02X?} at byte offset {}: {e}",
                &bytes[..len],
                self.offset
            ))
        })?;

        self.offset += len;
        Ok(decoded.chars().next())
    }
}

/// Character source over a borrowed string.
pub struct StrSource<'a> {
    chars: Chars<'a>,
}

impl<'a> StrSource<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars(),
        }
    }
}

impl CharSource for StrSource<'_> {
    fn read_char(&mut self) -> io::Result<Option<char>> {
        Ok(self.chars.next())
    }
}

fn utf8_sequence_length(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC0..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF7 => Some(4),
        _ => None,
    }
}

fn invalid_utf8(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(source: &mut impl CharSource) -> io::Result<String> {
        let mut out = String::new();
        while let Some(ch) = source.read_char()? {
            out.push(ch);
        }
        Ok(out)
    }

    #[test]
    fn test_reader_ascii() {
        let mut reader = CharReader::new(&b"abc"[..]);
        assert_eq!(reader.read_char().unwrap(), Some('a'));
        assert_eq!(reader.read_char().unwrap(), Some('b'));
        assert_eq!(reader.read_char().unwrap(), Some('c'));
        assert_eq!(reader.read_char().unwrap(), None);
        assert_eq!(reader.read_char().unwrap(), None);
    }

    #[test]
    fn test_reader_multibyte() {
        let mut reader = CharReader::new("中文🎉é".as_bytes());
        assert_eq!(drain(&mut reader).unwrap(), "中文🎉é");
    }

    #[test]
    fn test_reader_invalid_lead_byte() {
        let mut reader = CharReader::new(&[b'a', 0x80, b'b'][..]);
        assert_eq!(reader.read_char().unwrap(), Some('a'));
        let err = reader.read_char().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("lead byte 0x80"));
    }

    #[test]
    fn test_reader_truncated_sequence() {
        let mut reader = CharReader::new(&[0xF0, 0x9F][..]);
        let err = reader.read_char().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_reader_bad_continuation() {
        let mut reader = CharReader::new(&[0xC3, b'a'][..]);
        let err = reader.read_char().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    /// Hands out one byte per read, with an `Interrupted` error before each.
    struct InterruptingReader {
        bytes: Vec<u8>,
        pos: usize,
        interrupt: bool,
    }

    impl InterruptingReader {
        fn new(text: &str) -> Self {
            Self {
                bytes: text.as_bytes().to_vec(),
                pos: 0,
                interrupt: true,
            }
        }
    }

    impl Read for InterruptingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if !self.interrupt {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "signal"));
            }
            match (self.bytes.get(self.pos), buf.first_mut()) {
                (Some(&byte), Some(slot)) => {
                    *slot = byte;
                    self.pos += 1;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    #[test]
    fn test_reader_retries_interrupted_reads() {
        let mut reader = CharReader::new(InterruptingReader::new("ab12é🎉"));
        assert_eq!(drain(&mut reader).unwrap(), "ab12é🎉");
        assert_eq!(reader.read_char().unwrap(), None);
    }

    #[test]
    fn test_interrupted_reads_do_not_disturb_tokenizing() {
        let tokenizer =
            crate::tokenizer::Tokenizer::from_reader(InterruptingReader::new("ab12é"), "[0-9]+")
                .unwrap();
        let texts: Vec<String> = tokenizer
            .collect_spans()
            .unwrap()
            .into_iter()
            .map(|span| span.into_text())
            .collect();
        assert_eq!(texts, vec!["ab", "12", "é"]);
    }

    #[test]
    fn test_str_source() {
        let mut source = StrSource::new("a b");
        assert_eq!(drain(&mut source).unwrap(), "a b");
        assert_eq!(source.read_char().unwrap(), None);
    }

    #[test]
    fn test_boxed_source() {
        let mut source: Box<dyn CharSource> = Box::new(StrSource::new("xy"));
        assert_eq!(drain(&mut source).unwrap(), "xy");
    }
}
