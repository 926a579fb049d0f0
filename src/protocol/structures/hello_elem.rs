//! Hello elements
//!
//! Hello payloads carry TLV elements padded to 8 bytes. Unknown element
//! types are skipped, never rejected: a hello must parse even when sent
//! by a newer peer, or version negotiation cannot happen at all.

use bytes::Bytes;

use crate::protocol::buffer::{PacketReader, PacketWriter};
use crate::protocol::codes::HelloElemType;
use crate::protocol::error::{Error, Result};
use crate::protocol::subcodec::pad_to_8;
use crate::protocol::version::ProtocolVersion;

/// One element of a hello message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelloElem {
    /// Bitmap of the versions the sender speaks.
    VersionBitmap(Vec<ProtocolVersion>),
}

impl HelloElem {
    /// Wire length of the element, pad excluded.
    #[must_use]
    pub fn payload_length(&self) -> usize {
        match self {
            // one 32-bit word covers every version this library knows
            Self::VersionBitmap(_) => 4 + 4,
        }
    }

    /// Write the element, pad included.
    pub fn write(&self, writer: &mut PacketWriter) {
        match self {
            Self::VersionBitmap(versions) => {
                let length = self.payload_length();
                writer.write_u16(HelloElemType::VersionBitmap.code() as u16);
                writer.write_u16(length as u16);
                let mut word = 0u32;
                for v in versions {
                    word |= 1 << v.wire_value();
                }
                writer.write_u32(word);
                writer.write_zeros(pad_to_8(length));
            }
        }
    }

    /// Total wire length, pad included.
    #[must_use]
    pub fn wire_length(&self) -> usize {
        let length = self.payload_length();
        length + pad_to_8(length)
    }
}

/// Parse hello elements until the cursor reaches `target`. Elements of
/// unknown type are skipped.
pub fn parse_hello_elems(reader: &mut PacketReader, target: usize) -> Result<Vec<HelloElem>> {
    let mut elems = Vec::new();
    while reader.pos() < target {
        if target - reader.pos() < 4 {
            return Err(Error::IncompleteStructure { what: "HelloElem" });
        }
        let code = reader.read_u16()?;
        let length = reader.read_u16()? as usize;
        if length < 4 || reader.pos() - 4 + length > target {
            return Err(Error::IncompleteStructure { what: "HelloElem" });
        }
        let payload = reader.read_bytes(length - 4)?;
        reader.skip(pad_to_8(length).min(reader.remaining()))?;
        match HelloElemType::decode(code.into()) {
            Some(HelloElemType::VersionBitmap) => {
                elems.push(HelloElem::VersionBitmap(decode_version_words(&payload)));
            }
            None => {} // skip
        }
    }
    Ok(elems)
}

fn decode_version_words(payload: &Bytes) -> Vec<ProtocolVersion> {
    let mut versions = Vec::new();
    for (w, chunk) in payload.chunks(4).enumerate() {
        if chunk.len() < 4 {
            break;
        }
        let word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        for bit in 0..32u32 {
            if word & (1 << bit) != 0 {
                let wire = w as u32 * 32 + bit;
                if let Ok(byte) = u8::try_from(wire) {
                    if let Ok(v) = ProtocolVersion::from_wire(byte) {
                        versions.push(v);
                    }
                }
            }
        }
    }
    versions
}

/// Write a list of hello elements.
pub fn write_hello_elems(elems: &[HelloElem], writer: &mut PacketWriter) {
    for e in elems {
        e.write(writer);
    }
}

/// Total wire length of a hello element list.
#[must_use]
pub fn hello_elems_length(elems: &[HelloElem]) -> usize {
    elems.iter().map(HelloElem::wire_length).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::version::ProtocolVersion::{V1_0, V1_3};

    #[test]
    fn test_version_bitmap_roundtrip() {
        let elem = HelloElem::VersionBitmap(vec![V1_0, V1_3]);
        let mut w = PacketWriter::with_capacity(8);
        elem.write(&mut w);
        let b = w.into_bytes();
        assert_eq!(b.len(), 8);
        // bits 1 and 4 set
        assert_eq!(&b[..], &[0x00, 0x01, 0x00, 0x08, 0x00, 0x00, 0x00, 0x12]);
        let mut r = PacketReader::new(b);
        assert_eq!(parse_hello_elems(&mut r, 8).unwrap(), vec![elem]);
    }

    #[test]
    fn test_unknown_elem_skipped() {
        let mut w = PacketWriter::with_capacity(24);
        // unknown type 0x7f, 6-byte payload, 6 pad bytes
        w.write_u16(0x7f);
        w.write_u16(10);
        w.write_zeros(6 + 6);
        HelloElem::VersionBitmap(vec![V1_3]).write(&mut w);
        let b = w.into_bytes();
        let target = b.len();
        let mut r = PacketReader::new(b);
        let elems = parse_hello_elems(&mut r, target).unwrap();
        assert_eq!(elems, vec![HelloElem::VersionBitmap(vec![V1_3])]);
    }

    #[test]
    fn test_truncated_elem_rejected() {
        let mut w = PacketWriter::with_capacity(8);
        w.write_u16(1);
        w.write_u16(12); // claims more payload than the region holds
        w.write_u32(0);
        let mut r = PacketReader::new(w.into_bytes());
        assert!(parse_hello_elems(&mut r, 8).is_err());
    }
}
