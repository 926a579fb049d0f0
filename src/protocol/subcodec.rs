//! Match, action and instruction framing
//!
//! These families have their own rich sub-protocols; this layer preserves
//! their outer framing exactly (fixed-size in older versions, TLV with
//! pad-to-8 in newer ones) while carrying the field payloads as raw
//! bytes. Round-tripping a message reproduces the sub-structure bytes
//! untouched.

use bytes::Bytes;

use super::buffer::{PacketReader, PacketWriter};
use super::error::{Error, Result};
use super::version::ProtocolVersion;
use super::version::ProtocolVersion::{V1_0, V1_1};

/// Fixed match length in 1.0 (wildcards + fields, no type/length).
pub const MATCH_LEN_10: usize = 40;
/// Fixed match length in 1.1 (type + length + fields).
pub const MATCH_LEN_11: usize = 88;
/// Match type code for the OXM TLV form (1.2+).
pub const MATCH_TYPE_OXM: u16 = 1;
/// Match type code for the fixed standard form (1.1).
pub const MATCH_TYPE_STANDARD: u16 = 0;

/// OXM class for the basic field set.
const OXM_CLASS_BASIC: u16 = 0x8000;
/// OXM basic field number for the ingress port.
const OXM_BASIC_IN_PORT: u8 = 0;

/// A match structure with its field payload kept as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// The match type code. Meaningless in 1.0, which has no type field.
    pub match_type: u16,
    /// The field payload, excluding type/length framing and trailing pad.
    pub fields: Bytes,
}

impl Match {
    /// An empty OXM match, matching all packets.
    #[must_use]
    pub fn match_all() -> Self {
        Self { match_type: MATCH_TYPE_OXM, fields: Bytes::new() }
    }

    /// Parse a match structure, consuming its trailing pad.
    pub fn parse(reader: &mut PacketReader, pv: ProtocolVersion) -> Result<Self> {
        match pv {
            V1_0 => Ok(Self {
                match_type: MATCH_TYPE_STANDARD,
                fields: reader.read_bytes(MATCH_LEN_10)?,
            }),
            V1_1 => {
                let match_type = reader.read_u16()?;
                let length = reader.read_u16()? as usize;
                if length != MATCH_LEN_11 {
                    return Err(Error::LengthMismatch {
                        what: "Match",
                        declared: length,
                        actual: MATCH_LEN_11,
                    });
                }
                let fields = reader.read_bytes(MATCH_LEN_11 - 4)?;
                Ok(Self { match_type, fields })
            }
            _ => {
                let match_type = reader.read_u16()?;
                let length = reader.read_u16()? as usize;
                if length < 4 {
                    return Err(Error::LengthMismatch {
                        what: "Match",
                        declared: length,
                        actual: 4,
                    });
                }
                let fields = reader.read_bytes(length - 4)?;
                reader.skip(pad_to_8(length))?;
                Ok(Self { match_type, fields })
            }
        }
    }

    /// Write the match structure, including its trailing pad.
    pub fn write(&self, writer: &mut PacketWriter, pv: ProtocolVersion) -> Result<()> {
        match pv {
            V1_0 => {
                if self.fields.len() != MATCH_LEN_10 {
                    return Err(Error::LengthMismatch {
                        what: "Match",
                        declared: self.fields.len(),
                        actual: MATCH_LEN_10,
                    });
                }
                writer.write_bytes(&self.fields);
            }
            V1_1 => {
                if self.fields.len() != MATCH_LEN_11 - 4 {
                    return Err(Error::LengthMismatch {
                        what: "Match",
                        declared: self.fields.len() + 4,
                        actual: MATCH_LEN_11,
                    });
                }
                writer.write_u16(self.match_type);
                writer.write_u16(MATCH_LEN_11 as u16);
                writer.write_bytes(&self.fields);
            }
            _ => {
                let length = 4 + self.fields.len();
                writer.write_u16(self.match_type);
                writer.write_u16(length as u16);
                writer.write_bytes(&self.fields);
                writer.write_zeros(pad_to_8(length));
            }
        }
        Ok(())
    }

    /// Total wire length of the match, trailing pad included.
    #[must_use]
    pub fn wire_length(&self, pv: ProtocolVersion) -> usize {
        match pv {
            V1_0 => MATCH_LEN_10,
            V1_1 => MATCH_LEN_11,
            _ => {
                let length = 4 + self.fields.len();
                length + pad_to_8(length)
            }
        }
    }

    /// Scan an OXM match for the basic IN_PORT field.
    #[must_use]
    pub fn oxm_in_port(&self) -> Option<u32> {
        if self.match_type != MATCH_TYPE_OXM {
            return None;
        }
        let b = &self.fields;
        let mut at = 0;
        while at + 4 <= b.len() {
            let class = u16::from_be_bytes([b[at], b[at + 1]]);
            let field = b[at + 2] >> 1;
            let len = b[at + 3] as usize;
            if at + 4 + len > b.len() {
                return None;
            }
            if class == OXM_CLASS_BASIC && field == OXM_BASIC_IN_PORT && len == 4 {
                let v = &b[at + 4..at + 8];
                return Some(u32::from_be_bytes([v[0], v[1], v[2], v[3]]));
            }
            at += 4 + len;
        }
        None
    }
}

/// Pad bytes needed to round `len` up to a multiple of 8.
#[must_use]
pub const fn pad_to_8(len: usize) -> usize {
    (8 - len % 8) % 8
}

/// An action with its body kept as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// The action type code.
    pub action_type: u16,
    /// Everything after the 4-byte type/length header, pad included.
    pub body: Bytes,
}

impl Action {
    /// Parse one action header and its body.
    pub fn parse(reader: &mut PacketReader) -> Result<Self> {
        let action_type = reader.read_u16()?;
        let length = reader.read_u16()? as usize;
        if length < 4 || length % 8 != 0 {
            return Err(Error::LengthMismatch { what: "Action", declared: length, actual: 8 });
        }
        let body = reader.read_bytes(length - 4)?;
        Ok(Self { action_type, body })
    }

    /// Write the action.
    pub fn write(&self, writer: &mut PacketWriter) {
        writer.write_u16(self.action_type);
        writer.write_u16((4 + self.body.len()) as u16);
        writer.write_bytes(&self.body);
    }

    /// Total wire length, header included.
    #[must_use]
    pub fn wire_length(&self) -> usize {
        4 + self.body.len()
    }
}

/// Parse actions until the cursor reaches `target`.
pub fn parse_action_list(reader: &mut PacketReader, target: usize) -> Result<Vec<Action>> {
    let mut actions = Vec::new();
    while reader.pos() < target {
        if target - reader.pos() < 4 {
            return Err(Error::IncompleteStructure { what: "Action" });
        }
        actions.push(Action::parse(reader)?);
        if reader.pos() > target {
            return Err(Error::IncompleteStructure { what: "Action" });
        }
    }
    Ok(actions)
}

/// Write a list of actions.
pub fn write_action_list(actions: &[Action], writer: &mut PacketWriter) {
    for a in actions {
        a.write(writer);
    }
}

/// Total wire length of an action list.
#[must_use]
pub fn action_list_length(actions: &[Action]) -> usize {
    actions.iter().map(Action::wire_length).sum()
}

/// An instruction with its body kept as raw bytes (1.1+).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// The instruction type code.
    pub instruction_type: u16,
    /// Everything after the 4-byte type/length header, pad included.
    pub body: Bytes,
}

impl Instruction {
    /// Parse one instruction header and its body.
    pub fn parse(reader: &mut PacketReader) -> Result<Self> {
        let instruction_type = reader.read_u16()?;
        let length = reader.read_u16()? as usize;
        if length < 4 {
            return Err(Error::LengthMismatch { what: "Instruction", declared: length, actual: 4 });
        }
        let body = reader.read_bytes(length - 4)?;
        Ok(Self { instruction_type, body })
    }

    /// Write the instruction.
    pub fn write(&self, writer: &mut PacketWriter) {
        writer.write_u16(self.instruction_type);
        writer.write_u16((4 + self.body.len()) as u16);
        writer.write_bytes(&self.body);
    }

    /// Total wire length, header included.
    #[must_use]
    pub fn wire_length(&self) -> usize {
        4 + self.body.len()
    }
}

/// Parse instructions until the cursor reaches `target`.
pub fn parse_instruction_list(reader: &mut PacketReader, target: usize) -> Result<Vec<Instruction>> {
    let mut instructions = Vec::new();
    while reader.pos() < target {
        if target - reader.pos() < 4 {
            return Err(Error::IncompleteStructure { what: "Instruction" });
        }
        instructions.push(Instruction::parse(reader)?);
        if reader.pos() > target {
            return Err(Error::IncompleteStructure { what: "Instruction" });
        }
    }
    Ok(instructions)
}

/// Write a list of instructions.
pub fn write_instruction_list(instructions: &[Instruction], writer: &mut PacketWriter) {
    for i in instructions {
        i.write(writer);
    }
}

/// Total wire length of an instruction list.
#[must_use]
pub fn instruction_list_length(instructions: &[Instruction]) -> usize {
    instructions.iter().map(Instruction::wire_length).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oxm_match_roundtrip_with_pad() {
        // one IN_PORT field: class 0x8000, field 0, len 4, value 7
        let fields = Bytes::from_static(&[0x80, 0x00, 0x00, 0x04, 0, 0, 0, 7]);
        let m = Match { match_type: MATCH_TYPE_OXM, fields };
        let pv = ProtocolVersion::V1_3;
        assert_eq!(m.wire_length(pv), 16); // 12 + 4 pad

        let mut w = PacketWriter::with_capacity(16);
        m.write(&mut w, pv).unwrap();
        let b = w.into_bytes();
        assert_eq!(b.len(), 16);
        assert_eq!(&b[..4], &[0x00, 0x01, 0x00, 0x0c]);

        let mut r = PacketReader::new(b);
        let back = Match::parse(&mut r, pv).unwrap();
        assert_eq!(back, m);
        assert_eq!(r.remaining(), 0);
        assert_eq!(back.oxm_in_port(), Some(7));
    }

    #[test]
    fn test_empty_match_pads_to_eight() {
        let m = Match::match_all();
        let pv = ProtocolVersion::V1_3;
        assert_eq!(m.wire_length(pv), 8);
        let mut w = PacketWriter::with_capacity(8);
        m.write(&mut w, pv).unwrap();
        assert_eq!(&w.into_vec(), &[0x00, 0x01, 0x00, 0x04, 0, 0, 0, 0]);
    }

    #[test]
    fn test_fixed_match_10() {
        let pv = ProtocolVersion::V1_0;
        let m = Match {
            match_type: MATCH_TYPE_STANDARD,
            fields: Bytes::from(vec![0u8; MATCH_LEN_10]),
        };
        let mut w = PacketWriter::with_capacity(MATCH_LEN_10);
        m.write(&mut w, pv).unwrap();
        let b = w.into_bytes();
        assert_eq!(b.len(), MATCH_LEN_10);
        let mut r = PacketReader::new(b);
        assert_eq!(Match::parse(&mut r, pv).unwrap(), m);

        // wrong payload size cannot encode
        let bad = Match { match_type: 0, fields: Bytes::from_static(&[1, 2, 3]) };
        assert!(bad.write(&mut PacketWriter::with_capacity(8), pv).is_err());
    }

    #[test]
    fn test_action_list_to_target() {
        // output action (type 0) and a second 8-byte action
        let mut w = PacketWriter::with_capacity(24);
        Action { action_type: 0, body: Bytes::from(vec![0u8; 12]) }.write(&mut w);
        Action { action_type: 11, body: Bytes::from(vec![0u8; 4]) }.write(&mut w);
        let b = w.into_bytes();
        let target = b.len();

        let mut r = PacketReader::new(b);
        let actions = parse_action_list(&mut r, target).unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].action_type, 0);
        assert_eq!(actions[1].wire_length(), 8);
    }

    #[test]
    fn test_action_overrunning_target_rejected() {
        // declared length 16 but the list region is only 8 bytes
        let mut w = PacketWriter::with_capacity(16);
        w.write_u16(0);
        w.write_u16(16);
        w.write_zeros(12);
        let mut r = PacketReader::new(w.into_bytes());
        assert!(parse_action_list(&mut r, 8).is_err());
    }

    #[test]
    fn test_instruction_roundtrip() {
        // goto-table (type 1): table 4, 3 pad
        let ins = Instruction { instruction_type: 1, body: Bytes::from_static(&[4, 0, 0, 0]) };
        let mut w = PacketWriter::with_capacity(8);
        ins.write(&mut w);
        let b = w.into_bytes();
        assert_eq!(b.len(), 8);
        let mut r = PacketReader::new(b);
        let list = parse_instruction_list(&mut r, 8).unwrap();
        assert_eq!(list, vec![ins]);
    }
}
