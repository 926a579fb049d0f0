//! Meter bands (1.3)

use crate::protocol::buffer::{PacketReader, PacketWriter};
use crate::protocol::codes::MeterBandType;
use crate::protocol::error::{Error, Result};
use crate::protocol::version::ProtocolVersion;

const BAND_LEN: usize = 16;

/// One band of a meter. All bands share a rate/burst prefix; the tail
/// differs per type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeterBand {
    /// Drop packets exceeding the rate.
    Drop {
        /// Rate, in units set by the meter flags.
        rate: u32,
        /// Burst size.
        burst_size: u32,
    },
    /// Remark the DSCP field of packets exceeding the rate.
    DscpRemark {
        /// Rate, in units set by the meter flags.
        rate: u32,
        /// Burst size.
        burst_size: u32,
        /// How many drop-precedence levels to add.
        prec_level: u8,
    },
    /// Experimenter-defined band.
    Experimenter {
        /// Rate, in units set by the meter flags.
        rate: u32,
        /// Burst size.
        burst_size: u32,
        /// Experimenter id.
        experimenter: u32,
    },
}

impl MeterBand {
    fn band_type(&self) -> MeterBandType {
        match self {
            Self::Drop { .. } => MeterBandType::Drop,
            Self::DscpRemark { .. } => MeterBandType::DscpRemark,
            Self::Experimenter { .. } => MeterBandType::Experimenter,
        }
    }

    /// Wire length of the band.
    #[must_use]
    pub const fn wire_length(&self) -> usize {
        BAND_LEN
    }

    /// Parse one meter band.
    pub fn parse(reader: &mut PacketReader, pv: ProtocolVersion) -> Result<Self> {
        let code = reader.read_u16()?;
        let length = reader.read_u16()? as usize;
        if length != BAND_LEN {
            return Err(Error::LengthMismatch {
                what: "MeterBand",
                declared: length,
                actual: BAND_LEN,
            });
        }
        let rate = reader.read_u32()?;
        let burst_size = reader.read_u32()?;
        match MeterBandType::decode(code.into(), pv)? {
            MeterBandType::Drop => {
                reader.skip(4)?;
                Ok(Self::Drop { rate, burst_size })
            }
            MeterBandType::DscpRemark => {
                let prec_level = reader.read_u8()?;
                reader.skip(3)?;
                Ok(Self::DscpRemark { rate, burst_size, prec_level })
            }
            MeterBandType::Experimenter => {
                let experimenter = reader.read_u32()?;
                Ok(Self::Experimenter { rate, burst_size, experimenter })
            }
        }
    }

    /// Write one meter band.
    pub fn write(&self, writer: &mut PacketWriter, pv: ProtocolVersion) -> Result<()> {
        writer.write_u16(self.band_type().code(pv)? as u16);
        writer.write_u16(BAND_LEN as u16);
        match self {
            Self::Drop { rate, burst_size } => {
                writer.write_u32(*rate);
                writer.write_u32(*burst_size);
                writer.write_zeros(4);
            }
            Self::DscpRemark { rate, burst_size, prec_level } => {
                writer.write_u32(*rate);
                writer.write_u32(*burst_size);
                writer.write_u8(*prec_level);
                writer.write_zeros(3);
            }
            Self::Experimenter { rate, burst_size, experimenter } => {
                writer.write_u32(*rate);
                writer.write_u32(*burst_size);
                writer.write_u32(*experimenter);
            }
        }
        Ok(())
    }
}

/// Parse meter bands until the cursor reaches `target`.
pub fn parse_band_list(
    reader: &mut PacketReader,
    pv: ProtocolVersion,
    target: usize,
) -> Result<Vec<MeterBand>> {
    let mut bands = Vec::new();
    while reader.pos() < target {
        bands.push(MeterBand::parse(reader, pv)?);
    }
    Ok(bands)
}

/// Write a list of meter bands.
pub fn write_band_list(
    bands: &[MeterBand],
    writer: &mut PacketWriter,
    pv: ProtocolVersion,
) -> Result<()> {
    for b in bands {
        b.write(writer, pv)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::version::ProtocolVersion::{V1_2, V1_3};

    #[test]
    fn test_band_roundtrip() {
        let bands = vec![
            MeterBand::Drop { rate: 1000, burst_size: 64 },
            MeterBand::DscpRemark { rate: 500, burst_size: 32, prec_level: 2 },
        ];
        let mut w = PacketWriter::with_capacity(32);
        write_band_list(&bands, &mut w, V1_3).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 32);
        let mut r = PacketReader::new(bytes);
        assert_eq!(parse_band_list(&mut r, V1_3, 32).unwrap(), bands);
    }

    #[test]
    fn test_bands_need_13() {
        let band = MeterBand::Drop { rate: 1, burst_size: 1 };
        let mut w = PacketWriter::with_capacity(16);
        assert!(band.write(&mut w, V1_2).is_err());
    }

    #[test]
    fn test_bad_band_length() {
        let mut w = PacketWriter::with_capacity(16);
        w.write_u16(1);
        w.write_u16(12); // bands are always 16 bytes
        w.write_zeros(12);
        let mut r = PacketReader::new(w.into_bytes());
        assert!(MeterBand::parse(&mut r, V1_3).is_err());
    }
}
