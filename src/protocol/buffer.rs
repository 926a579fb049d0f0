//! Packet reader and writer
//!
//! Cursor-based access over message bytes. All multi-byte reads and
//! writes are network byte order. The reader carries start/target
//! annotations so body readers know exactly where the current message
//! (or nested structure list) ends, and so the parser can force the
//! cursor to the next message boundary after a failed body parse.

use bytes::{BufMut, Bytes, BytesMut};

use super::error::{Error, Result};

/// Reads protocol fields from a byte buffer without consuming the
/// underlying storage; the cursor is explicit and can be rewound or
/// forced forward.
#[derive(Debug)]
pub struct PacketReader {
    buf: Bytes,
    pos: usize,
    start: usize,
    target: usize,
}

impl PacketReader {
    /// Wrap a buffer, cursor at zero.
    #[must_use]
    pub fn new(buf: Bytes) -> Self {
        Self { buf, pos: 0, start: 0, target: 0 }
    }

    /// Current cursor position.
    #[must_use]
    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// Move the cursor to an absolute position. Clamped to the buffer
    /// limit.
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.buf.len());
    }

    /// Total number of bytes in the underlying buffer.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.buf.len()
    }

    /// Bytes left between the cursor and the end of the buffer.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Annotate where the current message started.
    pub fn set_start(&mut self, start: usize) {
        self.start = start;
    }

    /// Where the current message started.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Annotate where the current message must end.
    pub fn set_target(&mut self, target: usize) {
        self.target = target;
    }

    /// Where the current message must end.
    #[must_use]
    pub const fn target(&self) -> usize {
        self.target
    }

    fn check(&self, needed: usize) -> Result<()> {
        if self.remaining() < needed {
            return Err(Error::BufferUnderflow { needed, got: self.remaining() });
        }
        Ok(())
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        self.check(1)?;
        let v = self.buf[self.pos];
        self.pos += 1;
        Ok(v)
    }

    /// Read a u16.
    pub fn read_u16(&mut self) -> Result<u16> {
        self.check(2)?;
        let v = u16::from_be_bytes([self.buf[self.pos], self.buf[self.pos + 1]]);
        self.pos += 2;
        Ok(v)
    }

    /// Read a u32.
    pub fn read_u32(&mut self) -> Result<u32> {
        self.check(4)?;
        let mut b = [0u8; 4];
        b.copy_from_slice(&self.buf[self.pos..self.pos + 4]);
        self.pos += 4;
        Ok(u32::from_be_bytes(b))
    }

    /// Read a u64.
    pub fn read_u64(&mut self) -> Result<u64> {
        self.check(8)?;
        let mut b = [0u8; 8];
        b.copy_from_slice(&self.buf[self.pos..self.pos + 8]);
        self.pos += 8;
        Ok(u64::from_be_bytes(b))
    }

    /// Read `n` bytes as an owned slice of the underlying buffer.
    pub fn read_bytes(&mut self, n: usize) -> Result<Bytes> {
        self.check(n)?;
        let b = self.buf.slice(self.pos..self.pos + n);
        self.pos += n;
        Ok(b)
    }

    /// Read a fixed-size field holding a NUL-padded ASCII name.
    pub fn read_name(&mut self, field_len: usize) -> Result<String> {
        let raw = self.read_bytes(field_len)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(field_len);
        Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
    }

    /// Skip `n` pad bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.check(n)?;
        self.pos += n;
        Ok(())
    }

    /// Peek a u16 at an absolute offset relative to the cursor, without
    /// consuming anything.
    pub fn peek_u16(&self, offset: usize) -> Result<u16> {
        let at = self.pos + offset;
        if at + 2 > self.buf.len() {
            return Err(Error::BufferUnderflow { needed: offset + 2, got: self.remaining() });
        }
        Ok(u16::from_be_bytes([self.buf[at], self.buf[at + 1]]))
    }

    /// A hex snippet of the bytes between `from` and the cursor, capped
    /// at `max` bytes. Used when wrapping parse failures with context.
    #[must_use]
    pub fn hex_snippet(&self, from: usize, max: usize) -> String {
        let lo = from.min(self.buf.len());
        let hi = self.pos.max(lo).min(self.buf.len()).min(lo + max);
        hex(&self.buf[lo..hi])
    }
}

/// Render bytes as lowercase hex, space-separated.
#[must_use]
pub fn hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            s.push(' ');
        }
        s.push_str(&format!("{b:02x}"));
    }
    s
}

/// Appends protocol fields to a growable buffer.
#[derive(Debug, Default)]
pub struct PacketWriter {
    buf: BytesMut,
}

impl PacketWriter {
    /// A writer with the given capacity hint.
    #[must_use]
    pub fn with_capacity(cap: usize) -> Self {
        Self { buf: BytesMut::with_capacity(cap) }
    }

    /// Bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Write one byte.
    pub fn write_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    /// Write a u16.
    pub fn write_u16(&mut self, v: u16) {
        self.buf.put_u16(v);
    }

    /// Write a u32.
    pub fn write_u32(&mut self, v: u32) {
        self.buf.put_u32(v);
    }

    /// Write a u64.
    pub fn write_u64(&mut self, v: u64) {
        self.buf.put_u64(v);
    }

    /// Write raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Write `n` zero bytes (pad / reserved fields).
    pub fn write_zeros(&mut self, n: usize) {
        self.buf.put_bytes(0, n);
    }

    /// Write a NUL-padded ASCII name into a fixed-size field. The name is
    /// truncated if longer than the field.
    pub fn write_name(&mut self, name: &str, field_len: usize) {
        let raw = name.as_bytes();
        let n = raw.len().min(field_len);
        self.buf.put_slice(&raw[..n]);
        self.buf.put_bytes(0, field_len - n);
    }

    /// Consume the writer, yielding the written bytes.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    /// Consume the writer, yielding a plain vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.buf.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_basics() {
        let mut r = PacketReader::new(Bytes::from_static(&[0x01, 0x02, 0x03, 0x04, 0xaa, 0xbb]));
        assert_eq!(r.read_u8().unwrap(), 0x01);
        assert_eq!(r.read_u16().unwrap(), 0x0203);
        assert_eq!(r.pos(), 3);
        assert_eq!(r.remaining(), 3);
        r.skip(1).unwrap();
        assert_eq!(r.read_u16().unwrap(), 0xaabb);
        assert!(r.read_u8().is_err());
    }

    #[test]
    fn test_peek_does_not_consume() {
        let r = PacketReader::new(Bytes::from_static(&[0x04, 0x0e, 0x00, 0x48]));
        assert_eq!(r.peek_u16(2).unwrap(), 0x0048);
        assert_eq!(r.pos(), 0);
    }

    #[test]
    fn test_underflow_reports_sizes() {
        let mut r = PacketReader::new(Bytes::from_static(&[0x00]));
        match r.read_u32() {
            Err(Error::BufferUnderflow { needed: 4, got: 1 }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_writer_name_field() {
        let mut w = PacketWriter::with_capacity(16);
        w.write_name("eth0", 16);
        let b = w.into_bytes();
        assert_eq!(b.len(), 16);
        assert_eq!(&b[..4], b"eth0");
        assert!(b[4..].iter().all(|&x| x == 0));

        let mut r = PacketReader::new(b);
        assert_eq!(r.read_name(16).unwrap(), "eth0");
    }

    #[test]
    fn test_hex_snippet() {
        let mut r = PacketReader::new(Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]));
        r.skip(3).unwrap();
        assert_eq!(r.hex_snippet(0, 64), "de ad be");
    }
}
