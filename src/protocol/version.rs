//! OpenFlow protocol versions

use std::fmt;

use super::error::{Error, Result};

/// The protocol versions this library knows the wire layout of.
///
/// Ordering follows the wire values, so range checks like
/// `pv >= ProtocolVersion::V1_1` read naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ProtocolVersion {
    /// OpenFlow 1.0
    V1_0 = 0x01,
    /// OpenFlow 1.1
    V1_1 = 0x02,
    /// OpenFlow 1.2
    V1_2 = 0x03,
    /// OpenFlow 1.3
    V1_3 = 0x04,
}

impl ProtocolVersion {
    /// All versions, in wire order.
    pub const ALL: [Self; 4] = [Self::V1_0, Self::V1_1, Self::V1_2, Self::V1_3];

    /// Decode the header version byte.
    pub fn from_wire(byte: u8) -> Result<Self> {
        match byte {
            0x01 => Ok(Self::V1_0),
            0x02 => Ok(Self::V1_1),
            0x03 => Ok(Self::V1_2),
            0x04 => Ok(Self::V1_3),
            _ => Err(Error::UnknownVersion { byte }),
        }
    }

    /// The wire byte for this version.
    #[must_use]
    pub const fn wire_value(self) -> u8 {
        self as u8
    }

    /// Table index for per-version lookup arrays (0..=3).
    #[must_use]
    pub(crate) const fn index(self) -> usize {
        self as usize - 1
    }
}

/// Fails unless `pv` is at least 1.1.
pub(crate) fn ver_min_1_1(pv: ProtocolVersion, what: &'static str) -> Result<()> {
    if pv >= ProtocolVersion::V1_1 {
        Ok(())
    } else {
        Err(Error::VersionMismatch { what, version: pv })
    }
}

/// Fails unless `pv` is at least 1.2.
pub(crate) fn ver_min_1_2(pv: ProtocolVersion, what: &'static str) -> Result<()> {
    if pv >= ProtocolVersion::V1_2 {
        Ok(())
    } else {
        Err(Error::VersionMismatch { what, version: pv })
    }
}

/// Fails unless `pv` is at least 1.3.
pub(crate) fn ver_min_1_3(pv: ProtocolVersion, what: &'static str) -> Result<()> {
    if pv >= ProtocolVersion::V1_3 {
        Ok(())
    } else {
        Err(Error::VersionMismatch { what, version: pv })
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::V1_0 => "1.0",
            Self::V1_1 => "1.1",
            Self::V1_2 => "1.2",
            Self::V1_3 => "1.3",
        };
        write!(f, "{name}")
    }
}
