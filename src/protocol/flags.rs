//! Flag enumerations with version-dependent wire bits
//!
//! Bit positions follow the OpenFlow 1.0 through 1.3 specifications.
//! Several flags moved position between 1.0 and 1.1 (the port features
//! COPPER and up), some exist in only a range of versions (STP flags,
//! PORT_BLOCKED), and two families carry a multi-bit code field that is
//! validated as a set rather than per-bit (fragment handling in the
//! switch config, STP state in the 1.0 port state).

use super::bitmap::{WireBitmap, strict_parsing};
use super::error::{Error, Result};
use super::version::ProtocolVersion;
use super::version::ProtocolVersion::{V1_0, V1_1, V1_2, V1_3};

/// Datapath capabilities, reported in the features reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Flow statistics
    FlowStats,
    /// Table statistics
    TableStats,
    /// Port statistics
    PortStats,
    /// 802.1d spanning tree (1.0 only)
    Stp,
    /// Group statistics (1.1+)
    GroupStats,
    /// Can reassemble IP fragments
    IpReasm,
    /// Queue statistics
    QueueStats,
    /// Match IP addresses in ARP packets (through 1.2)
    ArpMatchIp,
    /// Switch will block looping ports (1.3)
    PortBlocked,
}

impl WireBitmap for Capability {
    const ALL: &'static [Self] = &[
        Self::FlowStats,
        Self::TableStats,
        Self::PortStats,
        Self::Stp,
        Self::GroupStats,
        Self::IpReasm,
        Self::QueueStats,
        Self::ArpMatchIp,
        Self::PortBlocked,
    ];
    const FAMILY: &'static str = "Capability";

    fn bit(self, pv: ProtocolVersion) -> Option<u32> {
        match self {
            Self::FlowStats => Some(1 << 0),
            Self::TableStats => Some(1 << 1),
            Self::PortStats => Some(1 << 2),
            Self::Stp => (pv == V1_0).then_some(1 << 3),
            Self::GroupStats => (pv >= V1_1).then_some(1 << 3),
            Self::IpReasm => Some(1 << 5),
            Self::QueueStats => Some(1 << 6),
            Self::ArpMatchIp => (pv <= V1_2).then_some(1 << 7),
            Self::PortBlocked => (pv == V1_3).then_some(1 << 8),
        }
    }
}

/// Port administrative configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortConfig {
    /// Port is administratively down
    PortDown,
    /// Disable 802.1d STP on the port (1.0 only)
    NoStp,
    /// Drop all packets received by the port
    NoRecv,
    /// Drop received 802.1d STP packets (1.0 only)
    NoRecvStp,
    /// Do not include this port when flooding (1.0 only)
    NoFlood,
    /// Drop packets forwarded to the port
    NoFwd,
    /// Do not send packet-in messages for the port
    NoPacketIn,
}

impl WireBitmap for PortConfig {
    const ALL: &'static [Self] = &[
        Self::PortDown,
        Self::NoStp,
        Self::NoRecv,
        Self::NoRecvStp,
        Self::NoFlood,
        Self::NoFwd,
        Self::NoPacketIn,
    ];
    const FAMILY: &'static str = "PortConfig";

    fn bit(self, pv: ProtocolVersion) -> Option<u32> {
        match self {
            Self::PortDown => Some(1 << 0),
            Self::NoStp => (pv == V1_0).then_some(1 << 1),
            Self::NoRecv => Some(1 << 2),
            Self::NoRecvStp => (pv == V1_0).then_some(1 << 3),
            Self::NoFlood => (pv == V1_0).then_some(1 << 4),
            Self::NoFwd => Some(1 << 5),
            Self::NoPacketIn => Some(1 << 6),
        }
    }
}

/// Port features: link modes and medium, advertised and supported.
///
/// The medium/negotiation bits sit at different positions in 1.0 versus
/// 1.1+ because 40GB/100GB/1TB/OTHER were inserted ahead of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortFeature {
    /// 10 Mb half-duplex
    Rate10MbHd,
    /// 10 Mb full-duplex
    Rate10MbFd,
    /// 100 Mb half-duplex
    Rate100MbHd,
    /// 100 Mb full-duplex
    Rate100MbFd,
    /// 1 Gb half-duplex
    Rate1GbHd,
    /// 1 Gb full-duplex
    Rate1GbFd,
    /// 10 Gb full-duplex
    Rate10GbFd,
    /// 40 Gb full-duplex (1.1+)
    Rate40GbFd,
    /// 100 Gb full-duplex (1.1+)
    Rate100GbFd,
    /// 1 Tb full-duplex (1.1+)
    Rate1TbFd,
    /// Other rate (1.1+)
    Other,
    /// Copper medium
    Copper,
    /// Fiber medium
    Fiber,
    /// Auto-negotiation
    Autoneg,
    /// Pause
    Pause,
    /// Asymmetric pause
    PauseAsym,
}

impl WireBitmap for PortFeature {
    const ALL: &'static [Self] = &[
        Self::Rate10MbHd,
        Self::Rate10MbFd,
        Self::Rate100MbHd,
        Self::Rate100MbFd,
        Self::Rate1GbHd,
        Self::Rate1GbFd,
        Self::Rate10GbFd,
        Self::Rate40GbFd,
        Self::Rate100GbFd,
        Self::Rate1TbFd,
        Self::Other,
        Self::Copper,
        Self::Fiber,
        Self::Autoneg,
        Self::Pause,
        Self::PauseAsym,
    ];
    const FAMILY: &'static str = "PortFeature";

    fn bit(self, pv: ProtocolVersion) -> Option<u32> {
        let v10 = pv == V1_0;
        match self {
            Self::Rate10MbHd => Some(1 << 0),
            Self::Rate10MbFd => Some(1 << 1),
            Self::Rate100MbHd => Some(1 << 2),
            Self::Rate100MbFd => Some(1 << 3),
            Self::Rate1GbHd => Some(1 << 4),
            Self::Rate1GbFd => Some(1 << 5),
            Self::Rate10GbFd => Some(1 << 6),
            Self::Rate40GbFd => (!v10).then_some(1 << 7),
            Self::Rate100GbFd => (!v10).then_some(1 << 8),
            Self::Rate1TbFd => (!v10).then_some(1 << 9),
            Self::Other => (!v10).then_some(1 << 10),
            Self::Copper => Some(if v10 { 1 << 7 } else { 1 << 11 }),
            Self::Fiber => Some(if v10 { 1 << 8 } else { 1 << 12 }),
            Self::Autoneg => Some(if v10 { 1 << 9 } else { 1 << 13 }),
            Self::Pause => Some(if v10 { 1 << 10 } else { 1 << 14 }),
            Self::PauseAsym => Some(if v10 { 1 << 11 } else { 1 << 15 }),
        }
    }
}

/// Flow-mod option flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowModFlag {
    /// Send a flow-removed message when the entry expires
    SendFlowRem,
    /// Check for overlapping entries first
    CheckOverlap,
    /// Emergency flow entry (1.0 only)
    Emerg,
    /// Reset flow packet and byte counts (1.2+)
    ResetCounts,
    /// Do not keep packet counts (1.3)
    NoPktCounts,
    /// Do not keep byte counts (1.3)
    NoBytCounts,
}

impl WireBitmap for FlowModFlag {
    const ALL: &'static [Self] = &[
        Self::SendFlowRem,
        Self::CheckOverlap,
        Self::Emerg,
        Self::ResetCounts,
        Self::NoPktCounts,
        Self::NoBytCounts,
    ];
    const FAMILY: &'static str = "FlowModFlag";

    fn bit(self, pv: ProtocolVersion) -> Option<u32> {
        match self {
            Self::SendFlowRem => Some(1 << 0),
            Self::CheckOverlap => Some(1 << 1),
            Self::Emerg => (pv == V1_0).then_some(1 << 2),
            Self::ResetCounts => (pv >= V1_2).then_some(1 << 2),
            Self::NoPktCounts => (pv == V1_3).then_some(1 << 3),
            Self::NoBytCounts => (pv == V1_3).then_some(1 << 4),
        }
    }
}

/// Table miss handling configuration (1.1 and 1.2; deprecated in 1.3
/// where no flags are defined).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableConfig {
    /// Continue to the next table on a miss
    MissContinue,
    /// Drop on a miss
    MissDrop,
}

impl WireBitmap for TableConfig {
    const ALL: &'static [Self] = &[Self::MissContinue, Self::MissDrop];
    const FAMILY: &'static str = "TableConfig";

    fn bit(self, pv: ProtocolVersion) -> Option<u32> {
        let mid = pv == V1_1 || pv == V1_2;
        match self {
            Self::MissContinue => mid.then_some(1 << 0),
            Self::MissDrop => mid.then_some(1 << 1),
        }
    }
}

/// Meter option flags (1.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeterFlag {
    /// Rate value in kilobits per second
    Kbps,
    /// Rate value in packets per second
    Pktps,
    /// Do burst size
    Burst,
    /// Collect statistics
    Stats,
}

impl WireBitmap for MeterFlag {
    const ALL: &'static [Self] = &[Self::Kbps, Self::Pktps, Self::Burst, Self::Stats];
    const FAMILY: &'static str = "MeterFlag";

    fn bit(self, pv: ProtocolVersion) -> Option<u32> {
        let v13 = pv == V1_3;
        match self {
            Self::Kbps => v13.then_some(1 << 0),
            Self::Pktps => v13.then_some(1 << 1),
            Self::Burst => v13.then_some(1 << 2),
            Self::Stats => v13.then_some(1 << 3),
        }
    }
}

/// Multipart request flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultipartRequestFlag {
    /// More requests to follow
    RequestMore,
}

impl WireBitmap for MultipartRequestFlag {
    const ALL: &'static [Self] = &[Self::RequestMore];
    const FAMILY: &'static str = "MultipartRequestFlag";

    fn bit(self, _pv: ProtocolVersion) -> Option<u32> {
        Some(1 << 0)
    }
}

/// Multipart reply flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultipartReplyFlag {
    /// More replies to follow
    ReplyMore,
}

impl WireBitmap for MultipartReplyFlag {
    const ALL: &'static [Self] = &[Self::ReplyMore];
    const FAMILY: &'static str = "MultipartReplyFlag";

    fn bit(self, _pv: ProtocolVersion) -> Option<u32> {
        Some(1 << 0)
    }
}

/// Actions a 1.0 datapath supports, reported in the features reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum SupportedAction {
    Output,
    SetVlanVid,
    SetVlanPcp,
    StripVlan,
    SetDlSrc,
    SetDlDst,
    SetNwSrc,
    SetNwDst,
    SetNwTos,
    SetTpSrc,
    SetTpDst,
    Enqueue,
}

impl WireBitmap for SupportedAction {
    const ALL: &'static [Self] = &[
        Self::Output,
        Self::SetVlanVid,
        Self::SetVlanPcp,
        Self::StripVlan,
        Self::SetDlSrc,
        Self::SetDlDst,
        Self::SetNwSrc,
        Self::SetNwDst,
        Self::SetNwTos,
        Self::SetTpSrc,
        Self::SetTpDst,
        Self::Enqueue,
    ];
    const FAMILY: &'static str = "SupportedAction";

    fn bit(self, pv: ProtocolVersion) -> Option<u32> {
        if pv != V1_0 {
            return None;
        }
        let bit = match self {
            Self::Output => 0,
            Self::SetVlanVid => 1,
            Self::SetVlanPcp => 2,
            Self::StripVlan => 3,
            Self::SetDlSrc => 4,
            Self::SetDlDst => 5,
            Self::SetNwSrc => 6,
            Self::SetNwDst => 7,
            Self::SetNwTos => 8,
            Self::SetTpSrc => 9,
            Self::SetTpDst => 10,
            Self::Enqueue => 11,
        };
        Some(1 << bit)
    }
}

// ====================================================================
// Families with multi-bit code fields, validated as a set

/// Switch configuration flags. Fragment handling is a two-bit code field
/// at bits 0-1 (NORMAL is the zero value), so the frag flags are
/// mutually exclusive. INVALID_TTL_TO_CONTROLLER occupies bit 2 in 1.1
/// and 1.2 only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigFlag {
    /// No special fragment handling
    FragNormal,
    /// Drop fragments
    FragDrop,
    /// Reassemble fragments
    FragReasm,
    /// Send packets with invalid TTL to the controller (1.1, 1.2)
    InvalidTtlToController,
}

const FRAG_MASK: u32 = 0x3;
const INV_TTL_BIT: u32 = 1 << 2;

impl ConfigFlag {
    /// Decode a switch-config flags field.
    pub fn decode_bitmap(bitmap: u32, pv: ProtocolVersion) -> Result<Vec<Self>> {
        let known: u32 = if pv == V1_1 || pv == V1_2 { FRAG_MASK | INV_TTL_BIT } else { FRAG_MASK };
        let mut bitmap = bitmap;
        let junk = bitmap & !(FRAG_MASK | INV_TTL_BIT);
        if junk != 0 {
            if strict_parsing() {
                return Err(Error::BadBits { what: "ConfigFlag", bits: junk, version: pv });
            }
            bitmap &= FRAG_MASK | INV_TTL_BIT;
        }
        if bitmap & !known != 0 {
            return Err(Error::VersionMismatch { what: "ConfigFlag", version: pv });
        }

        let mut flags = Vec::new();
        match bitmap & FRAG_MASK {
            0 => flags.push(Self::FragNormal),
            1 => flags.push(Self::FragDrop),
            2 => flags.push(Self::FragReasm),
            _ => return Err(Error::ConflictingFlags { what: "ConfigFlag frag" }),
        }
        if bitmap & INV_TTL_BIT != 0 {
            flags.push(Self::InvalidTtlToController);
        }
        Ok(flags)
    }

    /// Encode a set of switch-config flags, enforcing frag exclusivity.
    pub fn encode_bitmap(flags: &[Self], pv: ProtocolVersion) -> Result<u32> {
        let mut frag: Option<u32> = None;
        let mut bits = 0u32;
        for &f in flags {
            match f {
                Self::FragNormal | Self::FragDrop | Self::FragReasm => {
                    let code = match f {
                        Self::FragNormal => 0,
                        Self::FragDrop => 1,
                        _ => 2,
                    };
                    if frag.replace(code).is_some() {
                        return Err(Error::ConflictingFlags { what: "ConfigFlag frag" });
                    }
                }
                Self::InvalidTtlToController => {
                    if pv != V1_1 && pv != V1_2 {
                        return Err(Error::VersionMismatch { what: "ConfigFlag", version: pv });
                    }
                    bits |= INV_TTL_BIT;
                }
            }
        }
        Ok(bits | frag.unwrap_or(0))
    }
}

/// Port state flags. In 1.0 the STP port state is a two-bit code field
/// at bits 8-9 (LISTEN is the zero value); 1.1+ replaced it with the
/// BLOCKED and LIVE bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortState {
    /// No physical link present
    LinkDown,
    /// Port is blocked (1.1+)
    Blocked,
    /// Live for fast failover (1.1+)
    Live,
    /// STP listening state (1.0)
    StpListen,
    /// STP learning state (1.0)
    StpLearn,
    /// STP forwarding state (1.0)
    StpForward,
    /// STP blocking state (1.0)
    StpBlock,
}

const LINK_DOWN_BIT: u32 = 1 << 0;
const BLOCKED_BIT: u32 = 1 << 1;
const LIVE_BIT: u32 = 1 << 2;
const STP_SHIFT: u32 = 8;
const STP_FIELD: u32 = 0x3 << STP_SHIFT;

impl PortState {
    /// Decode a port-state field.
    pub fn decode_bitmap(bitmap: u32, pv: ProtocolVersion) -> Result<Vec<Self>> {
        let known: u32 = if pv == V1_0 {
            LINK_DOWN_BIT | STP_FIELD
        } else {
            LINK_DOWN_BIT | BLOCKED_BIT | LIVE_BIT
        };
        let every: u32 = LINK_DOWN_BIT | BLOCKED_BIT | LIVE_BIT | STP_FIELD;

        let mut bitmap = bitmap;
        let junk = bitmap & !every;
        if junk != 0 {
            if strict_parsing() {
                return Err(Error::BadBits { what: "PortState", bits: junk, version: pv });
            }
            bitmap &= every;
        }
        if bitmap & !known != 0 {
            return Err(Error::VersionMismatch { what: "PortState", version: pv });
        }

        let mut flags = Vec::new();
        if bitmap & LINK_DOWN_BIT != 0 {
            flags.push(Self::LinkDown);
        }
        if pv == V1_0 {
            flags.push(match (bitmap & STP_FIELD) >> STP_SHIFT {
                0 => Self::StpListen,
                1 => Self::StpLearn,
                2 => Self::StpForward,
                _ => Self::StpBlock,
            });
        } else {
            if bitmap & BLOCKED_BIT != 0 {
                flags.push(Self::Blocked);
            }
            if bitmap & LIVE_BIT != 0 {
                flags.push(Self::Live);
            }
        }
        Ok(flags)
    }

    /// Encode a set of port-state flags, enforcing STP exclusivity.
    pub fn encode_bitmap(flags: &[Self], pv: ProtocolVersion) -> Result<u32> {
        let mut bits = 0u32;
        let mut stp: Option<u32> = None;
        for &f in flags {
            match f {
                Self::LinkDown => bits |= LINK_DOWN_BIT,
                Self::Blocked => {
                    if pv == V1_0 {
                        return Err(Error::VersionMismatch { what: "PortState", version: pv });
                    }
                    bits |= BLOCKED_BIT;
                }
                Self::Live => {
                    if pv == V1_0 {
                        return Err(Error::VersionMismatch { what: "PortState", version: pv });
                    }
                    bits |= LIVE_BIT;
                }
                Self::StpListen | Self::StpLearn | Self::StpForward | Self::StpBlock => {
                    if pv != V1_0 {
                        return Err(Error::VersionMismatch { what: "PortState", version: pv });
                    }
                    let code = match f {
                        Self::StpListen => 0,
                        Self::StpLearn => 1,
                        Self::StpForward => 2,
                        _ => 3,
                    };
                    if stp.replace(code).is_some() {
                        return Err(Error::ConflictingFlags { what: "PortState STP" });
                    }
                }
            }
        }
        Ok(bits | (stp.unwrap_or(0) << STP_SHIFT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::bitmap::{decode_bitmap, encode_bitmap};

    #[test]
    fn test_capability_bit_moves() {
        // bit 3 is STP in 1.0, GROUP_STATS from 1.1
        assert_eq!(Capability::Stp.bit(V1_0), Some(1 << 3));
        assert_eq!(Capability::Stp.bit(V1_3), None);
        assert_eq!(Capability::GroupStats.bit(V1_0), None);
        assert_eq!(Capability::GroupStats.bit(V1_3), Some(1 << 3));

        let decoded = decode_bitmap::<Capability>(1 << 3, V1_0).unwrap();
        assert_eq!(decoded, vec![Capability::Stp]);
        let decoded = decode_bitmap::<Capability>(1 << 3, V1_3).unwrap();
        assert_eq!(decoded, vec![Capability::GroupStats]);
    }

    #[test]
    fn test_port_feature_position_shift() {
        assert_eq!(PortFeature::Copper.bit(V1_0), Some(1 << 7));
        assert_eq!(PortFeature::Copper.bit(V1_3), Some(1 << 11));
        let bits = encode_bitmap(&[PortFeature::Rate1GbFd, PortFeature::Copper], V1_0).unwrap();
        assert_eq!(bits, (1 << 5) | (1 << 7));
        let bits = encode_bitmap(&[PortFeature::Rate1GbFd, PortFeature::Copper], V1_3).unwrap();
        assert_eq!(bits, (1 << 5) | (1 << 11));
    }

    #[test]
    fn test_port_blocked_only_13() {
        assert!(encode_bitmap(&[Capability::PortBlocked], V1_0).is_err());
        assert!(decode_bitmap::<Capability>(1 << 8, V1_0).is_err());
        assert!(decode_bitmap::<Capability>(1 << 8, V1_3).is_ok());
    }

    #[test]
    fn test_config_flag_exclusion() {
        let bits = ConfigFlag::encode_bitmap(&[ConfigFlag::FragDrop], V1_3).unwrap();
        assert_eq!(bits, 1);
        assert_eq!(
            ConfigFlag::decode_bitmap(bits, V1_3).unwrap(),
            vec![ConfigFlag::FragDrop]
        );
        assert!(matches!(
            ConfigFlag::encode_bitmap(&[ConfigFlag::FragDrop, ConfigFlag::FragReasm], V1_3),
            Err(Error::ConflictingFlags { .. })
        ));
        // wire value 3 is the mask, not a legal state
        assert!(ConfigFlag::decode_bitmap(3, V1_3).is_err());
    }

    #[test]
    fn test_config_flag_frag_normal_is_zero() {
        assert_eq!(ConfigFlag::encode_bitmap(&[ConfigFlag::FragNormal], V1_0).unwrap(), 0);
        assert_eq!(
            ConfigFlag::decode_bitmap(0, V1_0).unwrap(),
            vec![ConfigFlag::FragNormal]
        );
    }

    #[test]
    fn test_invalid_ttl_version_range() {
        assert!(ConfigFlag::encode_bitmap(&[ConfigFlag::InvalidTtlToController], V1_1).is_ok());
        assert!(ConfigFlag::encode_bitmap(&[ConfigFlag::InvalidTtlToController], V1_3).is_err());
        assert!(ConfigFlag::decode_bitmap(INV_TTL_BIT, V1_3).is_err());
    }

    #[test]
    fn test_port_state_stp_field() {
        let bits =
            PortState::encode_bitmap(&[PortState::LinkDown, PortState::StpForward], V1_0).unwrap();
        assert_eq!(bits, LINK_DOWN_BIT | (2 << STP_SHIFT));
        assert_eq!(
            PortState::decode_bitmap(bits, V1_0).unwrap(),
            vec![PortState::LinkDown, PortState::StpForward]
        );
        assert!(PortState::encode_bitmap(&[PortState::StpLearn], V1_3).is_err());
        assert!(PortState::encode_bitmap(&[PortState::Live], V1_0).is_err());
    }

    #[test]
    fn test_flow_mod_flag_bit_reuse() {
        // bit 2 is EMERG in 1.0, RESET_COUNTS from 1.2
        assert_eq!(
            decode_bitmap::<FlowModFlag>(1 << 2, V1_0).unwrap(),
            vec![FlowModFlag::Emerg]
        );
        assert_eq!(
            decode_bitmap::<FlowModFlag>(1 << 2, V1_3).unwrap(),
            vec![FlowModFlag::ResetCounts]
        );
        assert!(decode_bitmap::<FlowModFlag>(1 << 2, V1_1).is_err());
    }

    #[test]
    fn test_table_config_deprecated_in_13() {
        assert!(decode_bitmap::<TableConfig>(1 << 0, V1_1).is_ok());
        assert!(decode_bitmap::<TableConfig>(1 << 0, V1_3).is_err());
        assert_eq!(decode_bitmap::<TableConfig>(0, V1_3).unwrap(), vec![]);
    }
}
