//! Port descriptions and port numbers
//!
//! Port numbers live in a u32 space with reserved logical values at the
//! top. OpenFlow 1.0 used a u16 space with the same logical values at
//! the top of that range; the reader and writer translate between the
//! two so callers only ever see the u32 form.

use crate::protocol::bitmap::{decode_bitmap, encode_bitmap};
use crate::protocol::buffer::{PacketReader, PacketWriter};
use crate::protocol::error::{Error, Result};
use crate::protocol::flags::{PortConfig, PortFeature, PortState};
use crate::protocol::version::ProtocolVersion;
use crate::protocol::version::ProtocolVersion::V1_0;

/// Reserved port numbers and port-number codec helpers.
pub struct PortNumber;

impl PortNumber {
    /// Largest assignable physical port number.
    pub const MAX: u32 = 0xffff_ff00;
    /// Send back out the ingress port.
    pub const IN_PORT: u32 = 0xffff_fff8;
    /// Submit to the flow table (packet-out only).
    pub const TABLE: u32 = 0xffff_fff9;
    /// Forward using traditional L2/L3 processing.
    pub const NORMAL: u32 = 0xffff_fffa;
    /// Flood, minus the ingress port and blocked ports.
    pub const FLOOD: u32 = 0xffff_fffb;
    /// All ports except the ingress port.
    pub const ALL: u32 = 0xffff_fffc;
    /// Send to the controller.
    pub const CONTROLLER: u32 = 0xffff_fffd;
    /// The local networking stack of the switch.
    pub const LOCAL: u32 = 0xffff_fffe;
    /// Wildcard, or "no port".
    pub const ANY: u32 = 0xffff_ffff;

    const U16_SPECIAL_BASE: u32 = 0xfff8;

    /// Fails on values in the dead zone between MAX and the reserved
    /// logical ports.
    pub fn validate(port: u32, pv: ProtocolVersion) -> Result<()> {
        if port > Self::MAX && port < Self::IN_PORT {
            return Err(Error::BadPortNumber { port: port.into(), version: pv });
        }
        Ok(())
    }

    /// Read a port number, translating the 1.0 u16 form.
    pub fn read(reader: &mut PacketReader, pv: ProtocolVersion) -> Result<u32> {
        let port = if pv == V1_0 {
            let raw = u32::from(reader.read_u16()?);
            if raw >= Self::U16_SPECIAL_BASE { 0xffff_0000 | raw } else { raw }
        } else {
            reader.read_u32()?
        };
        Self::validate(port, pv)?;
        Ok(port)
    }

    /// Write a port number, translating to the 1.0 u16 form.
    pub fn write(port: u32, writer: &mut PacketWriter, pv: ProtocolVersion) -> Result<()> {
        Self::validate(port, pv)?;
        if pv == V1_0 {
            if port >= Self::IN_PORT {
                writer.write_u16((port & 0xffff) as u16);
            } else if port <= 0xff00 {
                writer.write_u16(port as u16);
            } else {
                return Err(Error::BadPortNumber { port: port.into(), version: pv });
            }
        } else {
            writer.write_u32(port);
        }
        Ok(())
    }
}

/// Fixed length of a 1.0 port description.
pub const PORT_LEN_10: usize = 48;
/// Fixed length of a 1.1+ port description.
pub const PORT_LEN: usize = 64;

/// A port description, as carried in features replies, port-status
/// messages and port-description multipart bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    /// Port number.
    pub port_number: u32,
    /// Hardware address.
    pub hw_address: [u8; 6],
    /// Human-readable name.
    pub name: String,
    /// Administrative configuration.
    pub config: Vec<PortConfig>,
    /// Current state.
    pub state: Vec<PortState>,
    /// Current features.
    pub current: Vec<PortFeature>,
    /// Features advertised by the port.
    pub advertised: Vec<PortFeature>,
    /// Features supported by the port.
    pub supported: Vec<PortFeature>,
    /// Features advertised by the peer.
    pub peer: Vec<PortFeature>,
    /// Current speed in kbps (zero in 1.0, which has no field for it).
    pub current_speed: u32,
    /// Maximum speed in kbps (zero in 1.0).
    pub max_speed: u32,
}

impl Port {
    /// The wire length of a port description for the given version.
    #[must_use]
    pub const fn wire_length(pv: ProtocolVersion) -> usize {
        match pv {
            V1_0 => PORT_LEN_10,
            _ => PORT_LEN,
        }
    }

    /// Parse one port description.
    pub fn parse(reader: &mut PacketReader, pv: ProtocolVersion) -> Result<Self> {
        let port_number = PortNumber::read(reader, pv)?;
        if pv > V1_0 {
            reader.skip(4)?;
        }
        let raw = reader.read_bytes(6)?;
        let mut hw_address = [0u8; 6];
        hw_address.copy_from_slice(&raw);
        if pv > V1_0 {
            reader.skip(2)?;
        }
        let name = reader.read_name(16)?;
        let config = decode_bitmap(reader.read_u32()?, pv)?;
        let state = PortState::decode_bitmap(reader.read_u32()?, pv)?;
        let current = decode_bitmap(reader.read_u32()?, pv)?;
        let advertised = decode_bitmap(reader.read_u32()?, pv)?;
        let supported = decode_bitmap(reader.read_u32()?, pv)?;
        let peer = decode_bitmap(reader.read_u32()?, pv)?;
        let (current_speed, max_speed) = if pv > V1_0 {
            (reader.read_u32()?, reader.read_u32()?)
        } else {
            (0, 0)
        };
        Ok(Self {
            port_number,
            hw_address,
            name,
            config,
            state,
            current,
            advertised,
            supported,
            peer,
            current_speed,
            max_speed,
        })
    }

    /// Write one port description.
    pub fn write(&self, writer: &mut PacketWriter, pv: ProtocolVersion) -> Result<()> {
        PortNumber::write(self.port_number, writer, pv)?;
        if pv > V1_0 {
            writer.write_zeros(4);
        }
        writer.write_bytes(&self.hw_address);
        if pv > V1_0 {
            writer.write_zeros(2);
        }
        writer.write_name(&self.name, 16);
        writer.write_u32(encode_bitmap(&self.config, pv)?);
        writer.write_u32(PortState::encode_bitmap(&self.state, pv)?);
        writer.write_u32(encode_bitmap(&self.current, pv)?);
        writer.write_u32(encode_bitmap(&self.advertised, pv)?);
        writer.write_u32(encode_bitmap(&self.supported, pv)?);
        writer.write_u32(encode_bitmap(&self.peer, pv)?);
        if pv > V1_0 {
            writer.write_u32(self.current_speed);
            writer.write_u32(self.max_speed);
        }
        Ok(())
    }
}

/// Parse port descriptions until the cursor reaches `target`.
pub fn parse_port_list(
    reader: &mut PacketReader,
    pv: ProtocolVersion,
    target: usize,
) -> Result<Vec<Port>> {
    let mut ports = Vec::new();
    while reader.pos() < target {
        ports.push(Port::parse(reader, pv)?);
    }
    Ok(ports)
}

/// Builds a [`Port`]. Consumed by [`PortBuilder::finish`].
#[derive(Debug)]
pub struct PortBuilder {
    port: Port,
}

impl PortBuilder {
    /// A builder for the given port number; every other field defaults
    /// to empty.
    #[must_use]
    pub fn new(port_number: u32) -> Self {
        Self {
            port: Port {
                port_number,
                hw_address: [0; 6],
                name: String::new(),
                config: Vec::new(),
                state: Vec::new(),
                current: Vec::new(),
                advertised: Vec::new(),
                supported: Vec::new(),
                peer: Vec::new(),
                current_speed: 0,
                max_speed: 0,
            },
        }
    }

    /// Set the hardware address.
    #[must_use]
    pub fn hw_address(mut self, mac: [u8; 6]) -> Self {
        self.port.hw_address = mac;
        self
    }

    /// Set the port name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.port.name = name.into();
        self
    }

    /// Set the administrative configuration.
    #[must_use]
    pub fn config(mut self, config: Vec<PortConfig>) -> Self {
        self.port.config = config;
        self
    }

    /// Set the port state.
    #[must_use]
    pub fn state(mut self, state: Vec<PortState>) -> Self {
        self.port.state = state;
        self
    }

    /// Set the current features.
    #[must_use]
    pub fn current(mut self, features: Vec<PortFeature>) -> Self {
        self.port.current = features;
        self
    }

    /// Set the advertised features.
    #[must_use]
    pub fn advertised(mut self, features: Vec<PortFeature>) -> Self {
        self.port.advertised = features;
        self
    }

    /// Set the supported features.
    #[must_use]
    pub fn supported(mut self, features: Vec<PortFeature>) -> Self {
        self.port.supported = features;
        self
    }

    /// Set the peer features.
    #[must_use]
    pub fn peer(mut self, features: Vec<PortFeature>) -> Self {
        self.port.peer = features;
        self
    }

    /// Set current and maximum speed, kbps.
    #[must_use]
    pub fn speeds(mut self, current: u32, max: u32) -> Self {
        self.port.current_speed = current;
        self.port.max_speed = max;
        self
    }

    /// Validate and produce the port.
    pub fn finish(self, pv: ProtocolVersion) -> Result<Port> {
        PortNumber::validate(self.port.port_number, pv)?;
        Ok(self.port)
    }
}

/// Render a hardware address as colon-separated hex.
#[must_use]
pub fn format_mac(mac: &[u8; 6]) -> String {
    format!(
        "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    )
}
