//! # Binary Codec
//!
//! Deterministic encoding for every persisted record.
//!
//! ## Wire Rules
//!
//! | Item | Encoding |
//! |------|----------|
//! | fixed-width integers | big-endian |
//! | `f64` | IEEE-754 bits, big-endian |
//! | string / bytes | unsigned LEB128 length, then raw bytes |
//! | `Option<T>` | presence byte (0/1), then `T` when present |
//! | `bool` | one byte (0/1) |
//! | map | LEB128 count, entries sorted by key bytes |
//!
//! ## Forward Compatibility
//!
//! Fields may only be appended. Decoders read appended fields behind a
//! [`Reader::has_remaining`] probe so records written before the field existed
//! still decode, taking the field's default.

pub mod records;

use crate::errors::CodecError;

/// Maximum encoded length of a u64 varint.
const MAX_VARINT_LEN: usize = 10;

// =============================================================================
// TRAITS
// =============================================================================

/// Types with a canonical byte encoding.
pub trait Encode {
    /// Appends the encoding to `w`.
    fn encode(&self, w: &mut Writer);

    /// Encodes into a fresh buffer.
    fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        self.encode(&mut w);
        w.into_bytes()
    }
}

/// Types decodable from their canonical encoding.
pub trait Decode: Sized {
    /// Reads one value from `r`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] on truncated or malformed input.
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError>;

    /// Decodes a whole buffer. Unread trailing bytes are ignored so newer
    /// records decode under older readers.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] on truncated or malformed input.
    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut r = Reader::new(bytes);
        Self::decode(&mut r)
    }
}

// =============================================================================
// WRITER
// =============================================================================

/// Append-only encoder.
#[derive(Debug, Default, Clone)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the writer.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True if nothing was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn put_bool(&mut self, v: bool) {
        self.buf.push(u8::from(v));
    }

    pub fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_bits().to_be_bytes());
    }

    /// Unsigned LEB128.
    pub fn put_varint(&mut self, mut v: u64) {
        loop {
            let byte = (v & 0x7f) as u8;
            v >>= 7;
            if v == 0 {
                self.buf.push(byte);
                return;
            }
            self.buf.push(byte | 0x80);
        }
    }

    pub fn put_bytes(&mut self, v: &[u8]) {
        self.put_varint(v.len() as u64);
        self.buf.extend_from_slice(v);
    }

    pub fn put_str(&mut self, v: &str) {
        self.put_bytes(v.as_bytes());
    }

    /// Presence flag followed by the value.
    pub fn put_option<T>(&mut self, v: Option<&T>, mut put: impl FnMut(&mut Self, &T)) {
        match v {
            Some(inner) => {
                self.put_u8(1);
                put(self, inner);
            }
            None => self.put_u8(0),
        }
    }

    /// Count followed by each element.
    pub fn put_seq<T>(&mut self, items: &[T], mut put: impl FnMut(&mut Self, &T)) {
        self.put_varint(items.len() as u64);
        for item in items {
            put(self, item);
        }
    }

    /// Count followed by string-keyed entries in byte order of their keys.
    pub fn put_map<'a, V: 'a>(
        &mut self,
        entries: impl IntoIterator<Item = (&'a str, &'a V)>,
        mut put_value: impl FnMut(&mut Self, &V),
    ) {
        let mut sorted: Vec<(&str, &V)> = entries.into_iter().collect();
        sorted.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
        self.put_varint(sorted.len() as u64);
        for (key, value) in sorted {
            self.put_str(key);
            put_value(self, value);
        }
    }
}

// =============================================================================
// READER
// =============================================================================

/// Cursor over an encoded buffer.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current offset.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Probe for an appended field.
    #[must_use]
    pub fn has_remaining(&self) -> bool {
        self.pos < self.buf.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        let available = self.buf.len() - self.pos;
        if n > available {
            return Err(CodecError::UnexpectedEof {
                offset: self.pos,
                needed: n - available,
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn get_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    pub fn get_bool(&mut self) -> Result<bool, CodecError> {
        let offset = self.pos;
        match self.get_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(CodecError::InvalidFlag { offset, value }),
        }
    }

    pub fn get_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_be_bytes(self.take_array()?))
    }

    pub fn get_u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_be_bytes(self.take_array()?))
    }

    pub fn get_i64(&mut self) -> Result<i64, CodecError> {
        Ok(i64::from_be_bytes(self.take_array()?))
    }

    pub fn get_f64(&mut self) -> Result<f64, CodecError> {
        Ok(f64::from_bits(u64::from_be_bytes(self.take_array()?)))
    }

    pub fn get_varint(&mut self) -> Result<u64, CodecError> {
        let start = self.pos;
        let mut value: u64 = 0;
        for i in 0..MAX_VARINT_LEN {
            let byte = match self.get_u8() {
                Ok(b) => b,
                Err(_) => return Err(CodecError::InvalidVarint(start)),
            };
            let bits = u64::from(byte & 0x7f);
            // The tenth byte may only carry the top bit of a u64.
            if i == MAX_VARINT_LEN - 1 && bits > 1 {
                return Err(CodecError::InvalidVarint(start));
            }
            value |= bits << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(CodecError::InvalidVarint(start))
    }

    /// Length-prefixed slice.
    pub fn get_bytes(&mut self) -> Result<&'a [u8], CodecError> {
        let offset = self.pos;
        let len = self.get_varint()?;
        let len = usize::try_from(len).map_err(|_| CodecError::UnexpectedEof {
            offset,
            needed: usize::MAX,
        })?;
        self.take(len)
    }

    pub fn get_str(&mut self) -> Result<String, CodecError> {
        let offset = self.pos;
        let bytes = self.get_bytes()?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8(offset))
    }

    pub fn get_option<T>(
        &mut self,
        get: impl FnOnce(&mut Self) -> Result<T, CodecError>,
    ) -> Result<Option<T>, CodecError> {
        if self.get_bool()? {
            get(self).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn get_seq<T>(
        &mut self,
        mut get: impl FnMut(&mut Self) -> Result<T, CodecError>,
    ) -> Result<Vec<T>, CodecError> {
        let count = self.get_varint()?;
        // Each element takes at least one byte.
        let remaining = (self.buf.len() - self.pos) as u64;
        if count > remaining {
            return Err(CodecError::UnexpectedEof {
                offset: self.pos,
                needed: usize::try_from(count - remaining).unwrap_or(usize::MAX),
            });
        }
        let mut items = Vec::with_capacity(count as usize);
        for _ in 0..count {
            items.push(get(self)?);
        }
        Ok(items)
    }

    /// Appended field: decoded when bytes remain, else `default`.
    pub fn get_trailing<T>(
        &mut self,
        default: T,
        get: impl FnOnce(&mut Self) -> Result<T, CodecError>,
    ) -> Result<T, CodecError> {
        if self.has_remaining() {
            get(self)
        } else {
            Ok(default)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_encoding() {
        let mut w = Writer::new();
        w.put_varint(0);
        w.put_varint(127);
        w.put_varint(128);
        w.put_varint(300);
        assert_eq!(w.into_bytes(), vec![0x00, 0x7f, 0x80, 0x01, 0xac, 0x02]);
    }

    #[test]
    fn test_varint_max_value() {
        let mut w = Writer::new();
        w.put_varint(u64::MAX);
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 10);
        assert_eq!(Reader::new(&bytes).get_varint().unwrap(), u64::MAX);
    }

    #[test]
    fn test_malformed_varint() {
        let unterminated = [0x80, 0x80];
        assert_eq!(
            Reader::new(&unterminated).get_varint(),
            Err(CodecError::InvalidVarint(0))
        );
        let overlong = [0xff; 11];
        assert_eq!(
            Reader::new(&overlong).get_varint(),
            Err(CodecError::InvalidVarint(0))
        );
    }

    #[test]
    fn test_length_prefix_beyond_buffer() {
        let bytes = [0x05, b'a', b'b'];
        assert!(matches!(
            Reader::new(&bytes).get_str(),
            Err(CodecError::UnexpectedEof { offset: 1, needed: 3 })
        ));
    }

    #[test]
    fn test_integers_are_big_endian() {
        let mut w = Writer::new();
        w.put_u32(1);
        w.put_i64(-2);
        assert_eq!(
            w.into_bytes(),
            vec![0, 0, 0, 1, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe]
        );
    }

    #[test]
    fn test_map_is_sorted() {
        let mut w = Writer::new();
        let b = 2u64;
        let a = 1u64;
        w.put_map([("update_quorum", &b), ("toggle_pause", &a)], |w, v| {
            w.put_u64(*v);
        });
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        assert_eq!(r.get_varint().unwrap(), 2);
        assert_eq!(r.get_str().unwrap(), "toggle_pause");
        assert_eq!(r.get_u64().unwrap(), 1);
        assert_eq!(r.get_str().unwrap(), "update_quorum");
    }

    #[test]
    fn test_option_and_trailing() {
        let mut w = Writer::new();
        w.put_option(Some(&"x".to_string()), |w, s| w.put_str(s));
        w.put_option::<String>(None, |w, s| w.put_str(s));
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        assert_eq!(r.get_option(Reader::get_str).unwrap(), Some("x".into()));
        assert_eq!(r.get_option(Reader::get_str).unwrap(), None);
        assert!(!r.has_remaining());
        assert_eq!(r.get_trailing(7u64, Reader::get_u64).unwrap(), 7);
    }

    #[test]
    fn test_invalid_flag() {
        assert!(matches!(
            Reader::new(&[2]).get_bool(),
            Err(CodecError::InvalidFlag { offset: 0, value: 2 })
        ));
    }
}
