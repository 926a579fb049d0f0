//! Group buckets (1.1+)

use crate::protocol::buffer::{PacketReader, PacketWriter};
use crate::protocol::error::{Error, Result};
use crate::protocol::structures::port::PortNumber;
use crate::protocol::subcodec::{Action, action_list_length, parse_action_list, write_action_list};
use crate::protocol::version::ProtocolVersion;

const BUCKET_HDR_LEN: usize = 16;

/// One bucket of a group entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// Relative weight, for SELECT groups.
    pub weight: u16,
    /// Port whose liveness gates the bucket, for fast-failover groups.
    pub watch_port: u32,
    /// Group whose liveness gates the bucket, for fast-failover groups.
    pub watch_group: u32,
    /// Actions applied to packets hitting the bucket.
    pub actions: Vec<Action>,
}

impl Bucket {
    /// A bucket with the given actions, no weight, no watches.
    #[must_use]
    pub fn new(actions: Vec<Action>) -> Self {
        Self { weight: 0, watch_port: PortNumber::ANY, watch_group: 0xffff_ffff, actions }
    }

    /// Wire length, header included.
    #[must_use]
    pub fn wire_length(&self) -> usize {
        BUCKET_HDR_LEN + action_list_length(&self.actions)
    }

    /// Parse one bucket.
    pub fn parse(reader: &mut PacketReader, pv: ProtocolVersion) -> Result<Self> {
        let start = reader.pos();
        let length = reader.read_u16()? as usize;
        if length < BUCKET_HDR_LEN {
            return Err(Error::LengthMismatch {
                what: "Bucket",
                declared: length,
                actual: BUCKET_HDR_LEN,
            });
        }
        let weight = reader.read_u16()?;
        let watch_port = reader.read_u32()?;
        let watch_group = reader.read_u32()?;
        reader.skip(4)?;
        let end = start + length;
        if end > reader.limit() {
            return Err(Error::IncompleteStructure { what: "Bucket" });
        }
        let actions = parse_action_list(reader, end)?;
        if watch_port != PortNumber::ANY {
            PortNumber::validate(watch_port, pv)?;
        }
        Ok(Self { weight, watch_port, watch_group, actions })
    }

    /// Write one bucket.
    pub fn write(&self, writer: &mut PacketWriter) {
        writer.write_u16(self.wire_length() as u16);
        writer.write_u16(self.weight);
        writer.write_u32(self.watch_port);
        writer.write_u32(self.watch_group);
        writer.write_zeros(4);
        write_action_list(&self.actions, writer);
    }
}

/// Parse buckets until the cursor reaches `target`.
pub fn parse_bucket_list(
    reader: &mut PacketReader,
    pv: ProtocolVersion,
    target: usize,
) -> Result<Vec<Bucket>> {
    let mut buckets = Vec::new();
    while reader.pos() < target {
        buckets.push(Bucket::parse(reader, pv)?);
    }
    Ok(buckets)
}

/// Write a list of buckets.
pub fn write_bucket_list(buckets: &[Bucket], writer: &mut PacketWriter) {
    for b in buckets {
        b.write(writer);
    }
}

/// Total wire length of a bucket list.
#[must_use]
pub fn bucket_list_length(buckets: &[Bucket]) -> usize {
    buckets.iter().map(Bucket::wire_length).sum()
}
