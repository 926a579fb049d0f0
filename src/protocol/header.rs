//! Message header
//!
//! Every message opens with the same 8-byte header: version byte, type
//! code, total length, transaction id. The type code is version-mapped;
//! the codes for GROUP_MOD onward were renumbered when 1.1 added new
//! message kinds, so both directions of the mapping take the version.

use super::buffer::{PacketReader, PacketWriter};
use super::error::{Error, Result};
use super::version::ProtocolVersion;
use super::version::ProtocolVersion::{V1_0, V1_2, V1_3};

/// Fixed length of the message header, bytes.
pub const OFM_HEADER_LEN: usize = 8;

/// The kind of an OpenFlow message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum MessageType {
    Hello,
    Error,
    EchoRequest,
    EchoReply,
    Experimenter,
    FeaturesRequest,
    FeaturesReply,
    GetConfigRequest,
    GetConfigReply,
    SetConfig,
    PacketIn,
    FlowRemoved,
    PortStatus,
    PacketOut,
    FlowMod,
    GroupMod,
    PortMod,
    TableMod,
    MultipartRequest,
    MultipartReply,
    BarrierRequest,
    BarrierReply,
    QueueGetConfigRequest,
    QueueGetConfigReply,
    RoleRequest,
    RoleReply,
    GetAsyncRequest,
    GetAsyncReply,
    SetAsync,
    MeterMod,
}

impl MessageType {
    /// Decode a header type code for the given version.
    pub fn decode(code: u8, pv: ProtocolVersion) -> Result<Self> {
        // codes 0..=14 are stable across all versions
        match code {
            0 => return Ok(Self::Hello),
            1 => return Ok(Self::Error),
            2 => return Ok(Self::EchoRequest),
            3 => return Ok(Self::EchoReply),
            4 => return Ok(Self::Experimenter),
            5 => return Ok(Self::FeaturesRequest),
            6 => return Ok(Self::FeaturesReply),
            7 => return Ok(Self::GetConfigRequest),
            8 => return Ok(Self::GetConfigReply),
            9 => return Ok(Self::SetConfig),
            10 => return Ok(Self::PacketIn),
            11 => return Ok(Self::FlowRemoved),
            12 => return Ok(Self::PortStatus),
            13 => return Ok(Self::PacketOut),
            14 => return Ok(Self::FlowMod),
            _ => {}
        }
        if pv == V1_0 {
            return match code {
                15 => Ok(Self::PortMod),
                16 => Ok(Self::MultipartRequest),
                17 => Ok(Self::MultipartReply),
                18 => Ok(Self::BarrierRequest),
                19 => Ok(Self::BarrierReply),
                20 => Ok(Self::QueueGetConfigRequest),
                21 => Ok(Self::QueueGetConfigReply),
                _ => Err(Error::UnknownCode { what: "MessageType", code: code.into(), version: pv }),
            };
        }
        match code {
            15 => Ok(Self::GroupMod),
            16 => Ok(Self::PortMod),
            17 => Ok(Self::TableMod),
            18 => Ok(Self::MultipartRequest),
            19 => Ok(Self::MultipartReply),
            20 => Ok(Self::BarrierRequest),
            21 => Ok(Self::BarrierReply),
            22 => Ok(Self::QueueGetConfigRequest),
            23 => Ok(Self::QueueGetConfigReply),
            24 if pv >= V1_2 => Ok(Self::RoleRequest),
            25 if pv >= V1_2 => Ok(Self::RoleReply),
            26 if pv >= V1_3 => Ok(Self::GetAsyncRequest),
            27 if pv >= V1_3 => Ok(Self::GetAsyncReply),
            28 if pv >= V1_3 => Ok(Self::SetAsync),
            29 if pv >= V1_3 => Ok(Self::MeterMod),
            24..=29 => Err(Error::VersionMismatch { what: "MessageType", version: pv }),
            _ => Err(Error::UnknownCode { what: "MessageType", code: code.into(), version: pv }),
        }
    }

    /// The header type code for the given version.
    pub fn code(self, pv: ProtocolVersion) -> Result<u8> {
        let stable = match self {
            Self::Hello => Some(0),
            Self::Error => Some(1),
            Self::EchoRequest => Some(2),
            Self::EchoReply => Some(3),
            Self::Experimenter => Some(4),
            Self::FeaturesRequest => Some(5),
            Self::FeaturesReply => Some(6),
            Self::GetConfigRequest => Some(7),
            Self::GetConfigReply => Some(8),
            Self::SetConfig => Some(9),
            Self::PacketIn => Some(10),
            Self::FlowRemoved => Some(11),
            Self::PortStatus => Some(12),
            Self::PacketOut => Some(13),
            Self::FlowMod => Some(14),
            _ => None,
        };
        if let Some(c) = stable {
            return Ok(c);
        }
        if pv == V1_0 {
            return match self {
                Self::PortMod => Ok(15),
                Self::MultipartRequest => Ok(16),
                Self::MultipartReply => Ok(17),
                Self::BarrierRequest => Ok(18),
                Self::BarrierReply => Ok(19),
                Self::QueueGetConfigRequest => Ok(20),
                Self::QueueGetConfigReply => Ok(21),
                _ => Err(Error::VersionMismatch { what: "MessageType", version: pv }),
            };
        }
        match self {
            Self::GroupMod => Ok(15),
            Self::PortMod => Ok(16),
            Self::TableMod => Ok(17),
            Self::MultipartRequest => Ok(18),
            Self::MultipartReply => Ok(19),
            Self::BarrierRequest => Ok(20),
            Self::BarrierReply => Ok(21),
            Self::QueueGetConfigRequest => Ok(22),
            Self::QueueGetConfigReply => Ok(23),
            Self::RoleRequest if pv >= V1_2 => Ok(24),
            Self::RoleReply if pv >= V1_2 => Ok(25),
            Self::GetAsyncRequest if pv >= V1_3 => Ok(26),
            Self::GetAsyncReply if pv >= V1_3 => Ok(27),
            Self::SetAsync if pv >= V1_3 => Ok(28),
            Self::MeterMod if pv >= V1_3 => Ok(29),
            _ => Err(Error::VersionMismatch { what: "MessageType", version: pv }),
        }
    }

    /// True for kinds whose wire form is the bare 8-byte header.
    #[must_use]
    pub const fn is_header_only(self) -> bool {
        matches!(
            self,
            Self::FeaturesRequest
                | Self::GetConfigRequest
                | Self::BarrierRequest
                | Self::BarrierReply
                | Self::GetAsyncRequest
        )
    }
}

/// The fixed 8-byte message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Protocol version of the message.
    pub version: ProtocolVersion,
    /// Kind of message.
    pub message_type: MessageType,
    /// Total message length in bytes, header included.
    pub length: u16,
    /// Transaction id.
    pub xid: u32,
}

impl Header {
    /// Parse a header from the reader. The cursor advances 8 bytes.
    pub fn parse(reader: &mut PacketReader) -> Result<Self> {
        let version = ProtocolVersion::from_wire(reader.read_u8()?)?;
        let type_code = reader.read_u8()?;
        let message_type = MessageType::decode(type_code, version)?;
        let length = reader.read_u16()?;
        let xid = reader.read_u32()?;
        if (length as usize) < OFM_HEADER_LEN {
            return Err(Error::LengthMismatch {
                what: "Header",
                declared: length as usize,
                actual: OFM_HEADER_LEN,
            });
        }
        Ok(Self { version, message_type, length, xid })
    }

    /// Write the header.
    pub fn write(&self, writer: &mut PacketWriter) -> Result<()> {
        writer.write_u8(self.version.wire_value());
        writer.write_u8(self.message_type.code(self.version)?);
        writer.write_u16(self.length);
        writer.write_u32(self.xid);
        Ok(())
    }
}

impl std::fmt::Display for Header {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[V{},{:?},len={},xid={}]",
            self.version, self.message_type, self.length, self.xid
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::version::ProtocolVersion::V1_1;
    use bytes::Bytes;

    #[test]
    fn test_type_code_divergence() {
        // FLOW_MOD is 14 everywhere
        assert_eq!(MessageType::FlowMod.code(V1_0).unwrap(), 14);
        assert_eq!(MessageType::FlowMod.code(V1_3).unwrap(), 14);
        // PORT_MOD moved from 15 to 16 when GROUP_MOD took 15
        assert_eq!(MessageType::PortMod.code(V1_0).unwrap(), 15);
        assert_eq!(MessageType::PortMod.code(V1_3).unwrap(), 16);
        assert_eq!(MessageType::decode(15, V1_0).unwrap(), MessageType::PortMod);
        assert_eq!(MessageType::decode(15, V1_3).unwrap(), MessageType::GroupMod);
        // stats renamed to multipart but same slot shift
        assert_eq!(MessageType::decode(16, V1_0).unwrap(), MessageType::MultipartRequest);
        assert_eq!(MessageType::decode(18, V1_1).unwrap(), MessageType::MultipartRequest);
    }

    #[test]
    fn test_version_gated_types() {
        assert!(MessageType::GroupMod.code(V1_0).is_err());
        assert!(matches!(
            MessageType::decode(26, V1_2),
            Err(Error::VersionMismatch { .. })
        ));
        assert_eq!(MessageType::decode(29, V1_3).unwrap(), MessageType::MeterMod);
        assert!(matches!(
            MessageType::decode(30, V1_3),
            Err(Error::UnknownCode { .. })
        ));
    }

    #[test]
    fn test_header_roundtrip() {
        let h = Header {
            version: V1_3,
            message_type: MessageType::EchoRequest,
            length: 8,
            xid: 0x01020304,
        };
        let mut w = PacketWriter::with_capacity(8);
        h.write(&mut w).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(&bytes[..], &[0x04, 0x02, 0x00, 0x08, 0x01, 0x02, 0x03, 0x04]);
        let mut r = PacketReader::new(bytes);
        assert_eq!(Header::parse(&mut r).unwrap(), h);
    }

    #[test]
    fn test_header_length_too_small() {
        let mut r = PacketReader::new(Bytes::from_static(&[0x04, 0x00, 0x00, 0x04, 0, 0, 0, 1]));
        assert!(matches!(
            Header::parse(&mut r),
            Err(Error::LengthMismatch { declared: 4, .. })
        ));
    }
}
