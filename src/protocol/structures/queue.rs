//! Packet queues and queue properties
//!
//! The queue header grew a port field (and more pad) in 1.2, so its
//! fixed part is 8 bytes through 1.1 and 16 from 1.2. Properties are
//! 8-byte TLV headers followed by a per-type body.

use bytes::Bytes;

use crate::protocol::buffer::{PacketReader, PacketWriter};
use crate::protocol::codes::QueuePropType;
use crate::protocol::error::{Error, Result};
use crate::protocol::version::ProtocolVersion;
use crate::protocol::version::ProtocolVersion::V1_2;

const QUEUE_HDR_LEN: usize = 8;
const QUEUE_HDR_LEN_12: usize = 16;
const PROP_HDR_LEN: usize = 8;
const RATE_PROP_LEN: usize = 16;

/// A rate of this value or above means "rate disabled".
pub const QUEUE_RATE_DISABLED: u16 = 1001;

/// One property of a packet queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueProp {
    /// Guaranteed minimum rate, in tenths of a percent.
    MinRate {
        /// Rate in 1/10 of a percent; >= 1000 disables the guarantee.
        rate: u16,
    },
    /// Maximum rate cap, in tenths of a percent (1.2+).
    MaxRate {
        /// Rate in 1/10 of a percent; >= 1000 disables the cap.
        rate: u16,
    },
    /// Experimenter-defined property (1.2+).
    Experimenter {
        /// Experimenter id.
        experimenter: u32,
        /// Opaque property data.
        data: Bytes,
    },
}

impl QueueProp {
    fn prop_type(&self) -> QueuePropType {
        match self {
            Self::MinRate { .. } => QueuePropType::MinRate,
            Self::MaxRate { .. } => QueuePropType::MaxRate,
            Self::Experimenter { .. } => QueuePropType::Experimenter,
        }
    }

    /// Wire length of the property, header included.
    #[must_use]
    pub fn wire_length(&self) -> usize {
        match self {
            Self::MinRate { .. } | Self::MaxRate { .. } => RATE_PROP_LEN,
            Self::Experimenter { data, .. } => PROP_HDR_LEN + 8 + data.len(),
        }
    }

    fn parse(reader: &mut PacketReader, pv: ProtocolVersion) -> Result<Self> {
        let code = reader.read_u16()?;
        let length = reader.read_u16()? as usize;
        reader.skip(4)?;
        if length < PROP_HDR_LEN {
            return Err(Error::LengthMismatch {
                what: "QueueProp",
                declared: length,
                actual: PROP_HDR_LEN,
            });
        }
        match QueuePropType::decode(code.into(), pv)? {
            QueuePropType::MinRate => {
                let rate = reader.read_u16()?;
                reader.skip(6)?;
                Ok(Self::MinRate { rate })
            }
            QueuePropType::MaxRate => {
                let rate = reader.read_u16()?;
                reader.skip(6)?;
                Ok(Self::MaxRate { rate })
            }
            QueuePropType::Experimenter => {
                let experimenter = reader.read_u32()?;
                reader.skip(4)?;
                let data = reader.read_bytes(length - PROP_HDR_LEN - 8)?;
                Ok(Self::Experimenter { experimenter, data })
            }
        }
    }

    fn write(&self, writer: &mut PacketWriter, pv: ProtocolVersion) -> Result<()> {
        writer.write_u16(self.prop_type().code(pv)? as u16);
        writer.write_u16(self.wire_length() as u16);
        writer.write_zeros(4);
        match self {
            Self::MinRate { rate } | Self::MaxRate { rate } => {
                writer.write_u16(*rate);
                writer.write_zeros(6);
            }
            Self::Experimenter { experimenter, data } => {
                writer.write_u32(*experimenter);
                writer.write_zeros(4);
                writer.write_bytes(data);
            }
        }
        Ok(())
    }
}

/// A packet queue attached to a port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Queue {
    /// Queue id.
    pub queue_id: u32,
    /// The port the queue is attached to. Only on the wire from 1.2.
    pub port: u32,
    /// Queue properties.
    pub props: Vec<QueueProp>,
}

impl Queue {
    /// Wire length of the queue, properties included.
    #[must_use]
    pub fn wire_length(&self, pv: ProtocolVersion) -> usize {
        let hdr = if pv >= V1_2 { QUEUE_HDR_LEN_12 } else { QUEUE_HDR_LEN };
        hdr + self.props.iter().map(QueueProp::wire_length).sum::<usize>()
    }

    /// Parse one queue, properties included.
    pub fn parse(reader: &mut PacketReader, pv: ProtocolVersion) -> Result<Self> {
        let start = reader.pos();
        let queue_id = reader.read_u32()?;
        let (port, length) = if pv >= V1_2 {
            let port = reader.read_u32()?;
            let length = reader.read_u16()? as usize;
            reader.skip(6)?;
            (port, length)
        } else {
            let length = reader.read_u16()? as usize;
            reader.skip(2)?;
            (0, length)
        };
        let end = start + length;
        if end > reader.limit() || reader.pos() > end {
            return Err(Error::IncompleteStructure { what: "Queue" });
        }
        let mut props = Vec::new();
        while reader.pos() < end {
            props.push(QueueProp::parse(reader, pv)?);
        }
        Ok(Self { queue_id, port, props })
    }

    /// Write one queue, properties included.
    pub fn write(&self, writer: &mut PacketWriter, pv: ProtocolVersion) -> Result<()> {
        let length = self.wire_length(pv);
        writer.write_u32(self.queue_id);
        if pv >= V1_2 {
            writer.write_u32(self.port);
            writer.write_u16(length as u16);
            writer.write_zeros(6);
        } else {
            writer.write_u16(length as u16);
            writer.write_zeros(2);
        }
        for p in &self.props {
            p.write(writer, pv)?;
        }
        Ok(())
    }
}

/// Parse queues until the cursor reaches `target`.
pub fn parse_queue_list(
    reader: &mut PacketReader,
    pv: ProtocolVersion,
    target: usize,
) -> Result<Vec<Queue>> {
    let mut queues = Vec::new();
    while reader.pos() < target {
        queues.push(Queue::parse(reader, pv)?);
    }
    Ok(queues)
}

/// Builds a [`Queue`]. Consumed by [`QueueBuilder::finish`].
#[derive(Debug)]
pub struct QueueBuilder {
    queue: Queue,
}

impl QueueBuilder {
    /// A builder for the given queue id.
    #[must_use]
    pub fn new(queue_id: u32) -> Self {
        Self { queue: Queue { queue_id, port: 0, props: Vec::new() } }
    }

    /// Set the port the queue is attached to.
    #[must_use]
    pub fn port(mut self, port: u32) -> Self {
        self.queue.port = port;
        self
    }

    /// Append a property.
    #[must_use]
    pub fn prop(mut self, prop: QueueProp) -> Self {
        self.queue.props.push(prop);
        self
    }

    /// Produce the queue.
    #[must_use]
    pub fn finish(self) -> Queue {
        self.queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::version::ProtocolVersion::{V1_0, V1_3};

    #[test]
    fn test_queue_roundtrip_10() {
        let q = QueueBuilder::new(4).prop(QueueProp::MinRate { rate: 300 }).finish();
        assert_eq!(q.wire_length(V1_0), 24);
        let mut w = PacketWriter::with_capacity(24);
        q.write(&mut w, V1_0).unwrap();
        let b = w.into_bytes();
        assert_eq!(b.len(), 24);
        let mut r = PacketReader::new(b);
        assert_eq!(Queue::parse(&mut r, V1_0).unwrap(), q);
    }

    #[test]
    fn test_queue_roundtrip_13_with_port() {
        let q = QueueBuilder::new(1)
            .port(9)
            .prop(QueueProp::MinRate { rate: 100 })
            .prop(QueueProp::MaxRate { rate: 900 })
            .finish();
        assert_eq!(q.wire_length(V1_3), 16 + 32);
        let mut w = PacketWriter::with_capacity(48);
        q.write(&mut w, V1_3).unwrap();
        let mut r = PacketReader::new(w.into_bytes());
        let back = Queue::parse(&mut r, V1_3).unwrap();
        assert_eq!(back, q);
        assert_eq!(back.port, 9);
    }

    #[test]
    fn test_max_rate_not_in_10() {
        let q = QueueBuilder::new(1).prop(QueueProp::MaxRate { rate: 500 }).finish();
        let mut w = PacketWriter::with_capacity(32);
        assert!(q.write(&mut w, V1_0).is_err());
    }

    #[test]
    fn test_unknown_prop_type_rejected() {
        // queue header declares one 8-byte property of type 0x55
        let mut w = PacketWriter::with_capacity(16);
        w.write_u32(1);
        w.write_u16(16);
        w.write_zeros(2);
        w.write_u16(0x55);
        w.write_u16(8);
        w.write_zeros(4);
        let mut r = PacketReader::new(w.into_bytes());
        assert!(matches!(
            Queue::parse(&mut r, V1_0),
            Err(Error::UnknownCode { .. })
        ));
    }
}
