//! Table features (1.3)
//!
//! Carried in TABLE_FEATURES multipart bodies. The property payloads
//! have per-type sub-structure this layer does not interpret; they are
//! preserved as raw bytes with their TLV framing intact.

use bytes::Bytes;

use crate::protocol::buffer::{PacketReader, PacketWriter};
use crate::protocol::codes::TableFeaturePropType;
use crate::protocol::error::{Error, Result};
use crate::protocol::subcodec::pad_to_8;
use crate::protocol::version::ProtocolVersion;

const FEATURE_FIXED_LEN: usize = 64;

/// One property of a table features description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFeatureProp {
    /// Property type.
    pub prop_type: TableFeaturePropType,
    /// Raw property payload, excluding the TLV header and pad.
    pub payload: Bytes,
}

impl TableFeatureProp {
    /// Total wire length, pad included.
    #[must_use]
    pub fn wire_length(&self) -> usize {
        let length = 4 + self.payload.len();
        length + pad_to_8(length)
    }

    fn parse(reader: &mut PacketReader, pv: ProtocolVersion) -> Result<Self> {
        let code = reader.read_u16()?;
        let length = reader.read_u16()? as usize;
        if length < 4 {
            return Err(Error::LengthMismatch {
                what: "TableFeatureProp",
                declared: length,
                actual: 4,
            });
        }
        let prop_type = TableFeaturePropType::decode(code.into(), pv)?;
        let payload = reader.read_bytes(length - 4)?;
        reader.skip(pad_to_8(length).min(reader.remaining()))?;
        Ok(Self { prop_type, payload })
    }

    fn write(&self, writer: &mut PacketWriter, pv: ProtocolVersion) -> Result<()> {
        let length = 4 + self.payload.len();
        writer.write_u16(self.prop_type.code(pv)? as u16);
        writer.write_u16(length as u16);
        writer.write_bytes(&self.payload);
        writer.write_zeros(pad_to_8(length));
        Ok(())
    }
}

/// A table features description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFeature {
    /// Table id.
    pub table_id: u8,
    /// Table name.
    pub name: String,
    /// Bits of metadata the table can match.
    pub metadata_match: u64,
    /// Bits of metadata the table can write.
    pub metadata_write: u64,
    /// Table configuration bits.
    pub config: u32,
    /// Maximum number of entries.
    pub max_entries: u32,
    /// Properties.
    pub props: Vec<TableFeatureProp>,
}

impl TableFeature {
    /// Total wire length, properties included.
    #[must_use]
    pub fn wire_length(&self) -> usize {
        FEATURE_FIXED_LEN + self.props.iter().map(TableFeatureProp::wire_length).sum::<usize>()
    }

    /// Parse one table features description.
    pub fn parse(reader: &mut PacketReader, pv: ProtocolVersion) -> Result<Self> {
        let start = reader.pos();
        let length = reader.read_u16()? as usize;
        if length < FEATURE_FIXED_LEN {
            return Err(Error::LengthMismatch {
                what: "TableFeature",
                declared: length,
                actual: FEATURE_FIXED_LEN,
            });
        }
        let table_id = reader.read_u8()?;
        reader.skip(5)?;
        let name = reader.read_name(32)?;
        let metadata_match = reader.read_u64()?;
        let metadata_write = reader.read_u64()?;
        let config = reader.read_u32()?;
        let max_entries = reader.read_u32()?;
        let end = start + length;
        if end > reader.limit() {
            return Err(Error::IncompleteStructure { what: "TableFeature" });
        }
        let mut props = Vec::new();
        while reader.pos() < end {
            props.push(TableFeatureProp::parse(reader, pv)?);
        }
        Ok(Self { table_id, name, metadata_match, metadata_write, config, max_entries, props })
    }

    /// Write one table features description.
    pub fn write(&self, writer: &mut PacketWriter, pv: ProtocolVersion) -> Result<()> {
        writer.write_u16(self.wire_length() as u16);
        writer.write_u8(self.table_id);
        writer.write_zeros(5);
        writer.write_name(&self.name, 32);
        writer.write_u64(self.metadata_match);
        writer.write_u64(self.metadata_write);
        writer.write_u32(self.config);
        writer.write_u32(self.max_entries);
        for p in &self.props {
            p.write(writer, pv)?;
        }
        Ok(())
    }
}

/// Parse table features descriptions until the cursor reaches `target`.
pub fn parse_table_feature_list(
    reader: &mut PacketReader,
    pv: ProtocolVersion,
    target: usize,
) -> Result<Vec<TableFeature>> {
    let mut features = Vec::new();
    while reader.pos() < target {
        features.push(TableFeature::parse(reader, pv)?);
    }
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::version::ProtocolVersion::{V1_2, V1_3};

    fn sample() -> TableFeature {
        TableFeature {
            table_id: 0,
            name: "first".into(),
            metadata_match: u64::MAX,
            metadata_write: u64::MAX,
            config: 0,
            max_entries: 1024,
            props: vec![TableFeatureProp {
                prop_type: TableFeaturePropType::NextTables,
                payload: Bytes::from_static(&[1, 2, 3]),
            }],
        }
    }

    #[test]
    fn test_table_feature_roundtrip() {
        let tf = sample();
        // 64 fixed + (7 -> 8 padded)
        assert_eq!(tf.wire_length(), 72);
        let mut w = PacketWriter::with_capacity(72);
        tf.write(&mut w, V1_3).unwrap();
        let b = w.into_bytes();
        assert_eq!(b.len(), 72);
        let mut r = PacketReader::new(b);
        assert_eq!(TableFeature::parse(&mut r, V1_3).unwrap(), tf);
    }

    #[test]
    fn test_table_features_are_13_only() {
        let tf = sample();
        let mut w = PacketWriter::with_capacity(72);
        assert!(tf.write(&mut w, V1_2).is_err());
    }
}
