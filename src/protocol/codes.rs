//! Code-based wire enumerations
//!
//! Unlike the bitmap families, these map one enumerated constant to one
//! numeric code. Several carry version-specific codes (notably the error
//! types, which were renumbered in 1.1), and many constants are simply
//! undefined below the version that introduced them. Decode rejects
//! codes that no constant maps to for the active version; encode rejects
//! constants not applicable to the target version.

use super::error::{Error, Result};
use super::version::ProtocolVersion;
use super::version::ProtocolVersion::{V1_0, V1_1, V1_2, V1_3};

macro_rules! unknown {
    ($what:literal, $code:expr, $pv:expr) => {
        Err(Error::UnknownCode { what: $what, code: $code, version: $pv })
    };
}

macro_rules! mismatch {
    ($what:literal, $pv:expr) => {
        Err(Error::VersionMismatch { what: $what, version: $pv })
    };
}

/// Flow-mod command. One wire byte wide from 1.1 (u16 in 1.0); codes are
/// stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowModCommand {
    /// Add a new flow entry
    Add,
    /// Modify all matching entries
    Modify,
    /// Modify strictly matching entries
    ModifyStrict,
    /// Delete all matching entries
    Delete,
    /// Delete strictly matching entries
    DeleteStrict,
}

impl FlowModCommand {
    /// Decode a flow-mod command code.
    pub fn decode(code: u32, pv: ProtocolVersion) -> Result<Self> {
        match code {
            0 => Ok(Self::Add),
            1 => Ok(Self::Modify),
            2 => Ok(Self::ModifyStrict),
            3 => Ok(Self::Delete),
            4 => Ok(Self::DeleteStrict),
            _ => unknown!("FlowModCommand", code, pv),
        }
    }

    /// The wire code for the given version.
    pub fn code(self, _pv: ProtocolVersion) -> Result<u32> {
        Ok(match self {
            Self::Add => 0,
            Self::Modify => 1,
            Self::ModifyStrict => 2,
            Self::Delete => 3,
            Self::DeleteStrict => 4,
        })
    }
}

/// Group-mod command (1.1+).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupModCommand {
    /// Add a group
    Add,
    /// Modify a group
    Modify,
    /// Delete a group
    Delete,
}

impl GroupModCommand {
    /// Decode a group-mod command code.
    pub fn decode(code: u32, pv: ProtocolVersion) -> Result<Self> {
        if pv < V1_1 {
            return mismatch!("GroupModCommand", pv);
        }
        match code {
            0 => Ok(Self::Add),
            1 => Ok(Self::Modify),
            2 => Ok(Self::Delete),
            _ => unknown!("GroupModCommand", code, pv),
        }
    }

    /// The wire code for the given version.
    pub fn code(self, pv: ProtocolVersion) -> Result<u32> {
        if pv < V1_1 {
            return mismatch!("GroupModCommand", pv);
        }
        Ok(match self {
            Self::Add => 0,
            Self::Modify => 1,
            Self::Delete => 2,
        })
    }
}

/// Group type (1.1+).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupType {
    /// All buckets execute
    All,
    /// One bucket selected per packet
    Select,
    /// Single-bucket indirection
    Indirect,
    /// Fast failover to the first live bucket
    FastFailover,
}

impl GroupType {
    /// Decode a group type code.
    pub fn decode(code: u32, pv: ProtocolVersion) -> Result<Self> {
        if pv < V1_1 {
            return mismatch!("GroupType", pv);
        }
        match code {
            0 => Ok(Self::All),
            1 => Ok(Self::Select),
            2 => Ok(Self::Indirect),
            3 => Ok(Self::FastFailover),
            _ => unknown!("GroupType", code, pv),
        }
    }

    /// The wire code for the given version.
    pub fn code(self, pv: ProtocolVersion) -> Result<u32> {
        if pv < V1_1 {
            return mismatch!("GroupType", pv);
        }
        Ok(match self {
            Self::All => 0,
            Self::Select => 1,
            Self::Indirect => 2,
            Self::FastFailover => 3,
        })
    }
}

/// Meter-mod command (1.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeterModCommand {
    /// Add a meter
    Add,
    /// Modify a meter
    Modify,
    /// Delete a meter
    Delete,
}

impl MeterModCommand {
    /// Decode a meter-mod command code.
    pub fn decode(code: u32, pv: ProtocolVersion) -> Result<Self> {
        if pv < V1_3 {
            return mismatch!("MeterModCommand", pv);
        }
        match code {
            0 => Ok(Self::Add),
            1 => Ok(Self::Modify),
            2 => Ok(Self::Delete),
            _ => unknown!("MeterModCommand", code, pv),
        }
    }

    /// The wire code for the given version.
    pub fn code(self, pv: ProtocolVersion) -> Result<u32> {
        if pv < V1_3 {
            return mismatch!("MeterModCommand", pv);
        }
        Ok(match self {
            Self::Add => 0,
            Self::Modify => 1,
            Self::Delete => 2,
        })
    }
}

/// Meter band type (1.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeterBandType {
    /// Drop packets over the rate
    Drop,
    /// Remark the DSCP field
    DscpRemark,
    /// Experimenter band
    Experimenter,
}

impl MeterBandType {
    /// Decode a meter band type code.
    pub fn decode(code: u32, pv: ProtocolVersion) -> Result<Self> {
        if pv < V1_3 {
            return mismatch!("MeterBandType", pv);
        }
        match code {
            1 => Ok(Self::Drop),
            2 => Ok(Self::DscpRemark),
            0xffff => Ok(Self::Experimenter),
            _ => unknown!("MeterBandType", code, pv),
        }
    }

    /// The wire code for the given version.
    pub fn code(self, pv: ProtocolVersion) -> Result<u32> {
        if pv < V1_3 {
            return mismatch!("MeterBandType", pv);
        }
        Ok(match self {
            Self::Drop => 1,
            Self::DscpRemark => 2,
            Self::Experimenter => 0xffff,
        })
    }
}

/// Why a packet was sent to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketInReason {
    /// No matching flow entry
    NoMatch,
    /// An explicit output-to-controller action
    Action,
    /// Packet had an invalid TTL (1.2+)
    InvalidTtl,
}

impl PacketInReason {
    /// All reasons, in code order.
    pub const ALL: [Self; 3] = [Self::NoMatch, Self::Action, Self::InvalidTtl];

    /// Decode a packet-in reason code.
    pub fn decode(code: u32, pv: ProtocolVersion) -> Result<Self> {
        match code {
            0 => Ok(Self::NoMatch),
            1 => Ok(Self::Action),
            2 if pv >= V1_2 => Ok(Self::InvalidTtl),
            2 => mismatch!("PacketInReason", pv),
            _ => unknown!("PacketInReason", code, pv),
        }
    }

    /// The wire code for the given version.
    pub fn code(self, pv: ProtocolVersion) -> Result<u32> {
        match self {
            Self::NoMatch => Ok(0),
            Self::Action => Ok(1),
            Self::InvalidTtl if pv >= V1_2 => Ok(2),
            Self::InvalidTtl => mismatch!("PacketInReason", pv),
        }
    }

    /// Decode an async-config mask where bit N stands for reason code N.
    pub fn decode_flags(mask: u32, pv: ProtocolVersion) -> Result<Vec<Self>> {
        decode_reason_flags(mask, pv, &Self::ALL, |r, v| r.code(v), "PacketInReason")
    }

    /// Encode an async-config mask where bit N stands for reason code N.
    pub fn encode_flags(reasons: &[Self], pv: ProtocolVersion) -> Result<u32> {
        encode_reason_flags(reasons, pv, |r, v| r.code(v))
    }
}

/// Why a port-status message was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortReason {
    /// Port was added
    Add,
    /// Port was removed
    Delete,
    /// Port attributes changed
    Modify,
}

impl PortReason {
    /// All reasons, in code order.
    pub const ALL: [Self; 3] = [Self::Add, Self::Delete, Self::Modify];

    /// Decode a port-status reason code.
    pub fn decode(code: u32, pv: ProtocolVersion) -> Result<Self> {
        match code {
            0 => Ok(Self::Add),
            1 => Ok(Self::Delete),
            2 => Ok(Self::Modify),
            _ => unknown!("PortReason", code, pv),
        }
    }

    /// The wire code for the given version.
    pub fn code(self, _pv: ProtocolVersion) -> Result<u32> {
        Ok(match self {
            Self::Add => 0,
            Self::Delete => 1,
            Self::Modify => 2,
        })
    }

    /// Decode an async-config mask where bit N stands for reason code N.
    pub fn decode_flags(mask: u32, pv: ProtocolVersion) -> Result<Vec<Self>> {
        decode_reason_flags(mask, pv, &Self::ALL, |r, v| r.code(v), "PortReason")
    }

    /// Encode an async-config mask where bit N stands for reason code N.
    pub fn encode_flags(reasons: &[Self], pv: ProtocolVersion) -> Result<u32> {
        encode_reason_flags(reasons, pv, |r, v| r.code(v))
    }
}

/// Why a flow entry was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowRemovedReason {
    /// Idle timeout expired
    IdleTimeout,
    /// Hard timeout expired
    HardTimeout,
    /// Deleted by a flow-mod
    Delete,
    /// Group it pointed to was deleted (1.1+)
    GroupDelete,
}

impl FlowRemovedReason {
    /// All reasons, in code order.
    pub const ALL: [Self; 4] =
        [Self::IdleTimeout, Self::HardTimeout, Self::Delete, Self::GroupDelete];

    /// Decode a flow-removed reason code.
    pub fn decode(code: u32, pv: ProtocolVersion) -> Result<Self> {
        match code {
            0 => Ok(Self::IdleTimeout),
            1 => Ok(Self::HardTimeout),
            2 => Ok(Self::Delete),
            3 if pv >= V1_1 => Ok(Self::GroupDelete),
            3 => mismatch!("FlowRemovedReason", pv),
            _ => unknown!("FlowRemovedReason", code, pv),
        }
    }

    /// The wire code for the given version.
    pub fn code(self, pv: ProtocolVersion) -> Result<u32> {
        match self {
            Self::IdleTimeout => Ok(0),
            Self::HardTimeout => Ok(1),
            Self::Delete => Ok(2),
            Self::GroupDelete if pv >= V1_1 => Ok(3),
            Self::GroupDelete => mismatch!("FlowRemovedReason", pv),
        }
    }

    /// Decode an async-config mask where bit N stands for reason code N.
    pub fn decode_flags(mask: u32, pv: ProtocolVersion) -> Result<Vec<Self>> {
        decode_reason_flags(mask, pv, &Self::ALL, |r, v| r.code(v), "FlowRemovedReason")
    }

    /// Encode an async-config mask where bit N stands for reason code N.
    pub fn encode_flags(reasons: &[Self], pv: ProtocolVersion) -> Result<u32> {
        encode_reason_flags(reasons, pv, |r, v| r.code(v))
    }
}

// The async-config masks re-use reason codes as bit positions.
fn decode_reason_flags<T: Copy>(
    mask: u32,
    pv: ProtocolVersion,
    all: &[T],
    code: impl Fn(T, ProtocolVersion) -> Result<u32>,
    what: &'static str,
) -> Result<Vec<T>> {
    let mut known = 0u32;
    let mut out = Vec::new();
    for &r in all {
        if let Ok(c) = code(r, pv) {
            known |= 1 << c;
            if mask & (1 << c) != 0 {
                out.push(r);
            }
        }
    }
    let junk = mask & !known;
    if junk != 0 {
        if super::bitmap::strict_parsing() {
            return Err(Error::BadBits { what, bits: junk, version: pv });
        }
        // non-strict: extra bits already ignored above
    }
    Ok(out)
}

fn encode_reason_flags<T: Copy>(
    reasons: &[T],
    pv: ProtocolVersion,
    code: impl Fn(T, ProtocolVersion) -> Result<u32>,
) -> Result<u32> {
    let mut mask = 0u32;
    for &r in reasons {
        mask |= 1 << code(r, pv)?;
    }
    Ok(mask)
}

/// Controller role (1.2+).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerRole {
    /// Keep the current role
    NoChange,
    /// Default full access
    Equal,
    /// Full access, others demoted to slave
    Master,
    /// Read-only access
    Slave,
}

impl ControllerRole {
    /// Decode a controller role code.
    pub fn decode(code: u32, pv: ProtocolVersion) -> Result<Self> {
        if pv < V1_2 {
            return mismatch!("ControllerRole", pv);
        }
        match code {
            0 => Ok(Self::NoChange),
            1 => Ok(Self::Equal),
            2 => Ok(Self::Master),
            3 => Ok(Self::Slave),
            _ => unknown!("ControllerRole", code, pv),
        }
    }

    /// The wire code for the given version.
    pub fn code(self, pv: ProtocolVersion) -> Result<u32> {
        if pv < V1_2 {
            return mismatch!("ControllerRole", pv);
        }
        Ok(match self {
            Self::NoChange => 0,
            Self::Equal => 1,
            Self::Master => 2,
            Self::Slave => 3,
        })
    }
}

/// High-level error category in an error message.
///
/// Renumbered in 1.1: BAD_INSTRUCTION and BAD_MATCH were inserted after
/// BAD_ACTION, shifting everything that followed, so the lookup must be
/// keyed by `(code, version)` both ways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ErrorType {
    HelloFailed,
    BadRequest,
    BadAction,
    BadInstruction,
    BadMatch,
    FlowModFailed,
    GroupModFailed,
    PortModFailed,
    TableModFailed,
    QueueOpFailed,
    SwitchConfigFailed,
    RoleRequestFailed,
    MeterModFailed,
    TableFeaturesFailed,
    Experimenter,
}

impl ErrorType {
    /// Decode an error type code.
    pub fn decode(code: u32, pv: ProtocolVersion) -> Result<Self> {
        if pv == V1_0 {
            return match code {
                0 => Ok(Self::HelloFailed),
                1 => Ok(Self::BadRequest),
                2 => Ok(Self::BadAction),
                3 => Ok(Self::FlowModFailed),
                4 => Ok(Self::PortModFailed),
                5 => Ok(Self::QueueOpFailed),
                _ => unknown!("ErrorType", code, pv),
            };
        }
        match code {
            0 => Ok(Self::HelloFailed),
            1 => Ok(Self::BadRequest),
            2 => Ok(Self::BadAction),
            3 => Ok(Self::BadInstruction),
            4 => Ok(Self::BadMatch),
            5 => Ok(Self::FlowModFailed),
            6 => Ok(Self::GroupModFailed),
            7 => Ok(Self::PortModFailed),
            8 => Ok(Self::TableModFailed),
            9 => Ok(Self::QueueOpFailed),
            10 => Ok(Self::SwitchConfigFailed),
            11 if pv >= V1_2 => Ok(Self::RoleRequestFailed),
            12 if pv >= V1_3 => Ok(Self::MeterModFailed),
            13 if pv >= V1_3 => Ok(Self::TableFeaturesFailed),
            0xffff if pv >= V1_2 => Ok(Self::Experimenter),
            11..=13 | 0xffff => mismatch!("ErrorType", pv),
            _ => unknown!("ErrorType", code, pv),
        }
    }

    /// The wire code for the given version.
    pub fn code(self, pv: ProtocolVersion) -> Result<u32> {
        if pv == V1_0 {
            return match self {
                Self::HelloFailed => Ok(0),
                Self::BadRequest => Ok(1),
                Self::BadAction => Ok(2),
                Self::FlowModFailed => Ok(3),
                Self::PortModFailed => Ok(4),
                Self::QueueOpFailed => Ok(5),
                _ => mismatch!("ErrorType", pv),
            };
        }
        match self {
            Self::HelloFailed => Ok(0),
            Self::BadRequest => Ok(1),
            Self::BadAction => Ok(2),
            Self::BadInstruction => Ok(3),
            Self::BadMatch => Ok(4),
            Self::FlowModFailed => Ok(5),
            Self::GroupModFailed => Ok(6),
            Self::PortModFailed => Ok(7),
            Self::TableModFailed => Ok(8),
            Self::QueueOpFailed => Ok(9),
            Self::SwitchConfigFailed => Ok(10),
            Self::RoleRequestFailed if pv >= V1_2 => Ok(11),
            Self::MeterModFailed if pv >= V1_3 => Ok(12),
            Self::TableFeaturesFailed if pv >= V1_3 => Ok(13),
            Self::Experimenter if pv >= V1_2 => Ok(0xffff),
            _ => mismatch!("ErrorType", pv),
        }
    }
}

/// Queue property type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueuePropType {
    /// Minimum rate guarantee
    MinRate,
    /// Maximum rate cap (1.2+)
    MaxRate,
    /// Experimenter property (1.2+)
    Experimenter,
}

impl QueuePropType {
    /// Decode a queue property type code.
    pub fn decode(code: u32, pv: ProtocolVersion) -> Result<Self> {
        match code {
            1 => Ok(Self::MinRate),
            2 if pv >= V1_2 => Ok(Self::MaxRate),
            0xffff if pv >= V1_2 => Ok(Self::Experimenter),
            2 | 0xffff => mismatch!("QueuePropType", pv),
            _ => unknown!("QueuePropType", code, pv),
        }
    }

    /// The wire code for the given version.
    pub fn code(self, pv: ProtocolVersion) -> Result<u32> {
        match self {
            Self::MinRate => Ok(1),
            Self::MaxRate if pv >= V1_2 => Ok(2),
            Self::Experimenter if pv >= V1_2 => Ok(0xffff),
            _ => mismatch!("QueuePropType", pv),
        }
    }
}

/// Hello element type (1.3; hello payloads are parsed for any declared
/// version, per the negotiation rule).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelloElemType {
    /// Bitmap of supported versions
    VersionBitmap,
}

impl HelloElemType {
    /// Decode a hello element type code; `None` for types this library
    /// does not know (those elements are skipped, not rejected).
    #[must_use]
    pub fn decode(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::VersionBitmap),
            _ => None,
        }
    }

    /// The wire code.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::VersionBitmap => 1,
        }
    }
}

/// Multipart (statistics) body type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum MultipartType {
    Desc,
    Flow,
    Aggregate,
    Table,
    PortStats,
    Queue,
    Group,
    GroupDesc,
    GroupFeatures,
    Meter,
    MeterConfig,
    MeterFeatures,
    TableFeatures,
    PortDesc,
    Experimenter,
}

impl MultipartType {
    /// Decode a multipart type code.
    pub fn decode(code: u32, pv: ProtocolVersion) -> Result<Self> {
        match code {
            0 => Ok(Self::Desc),
            1 => Ok(Self::Flow),
            2 => Ok(Self::Aggregate),
            3 => Ok(Self::Table),
            4 => Ok(Self::PortStats),
            5 => Ok(Self::Queue),
            6 if pv >= V1_1 => Ok(Self::Group),
            7 if pv >= V1_1 => Ok(Self::GroupDesc),
            8 if pv >= V1_2 => Ok(Self::GroupFeatures),
            9 if pv >= V1_3 => Ok(Self::Meter),
            10 if pv >= V1_3 => Ok(Self::MeterConfig),
            11 if pv >= V1_3 => Ok(Self::MeterFeatures),
            12 if pv >= V1_3 => Ok(Self::TableFeatures),
            13 if pv >= V1_3 => Ok(Self::PortDesc),
            0xffff => Ok(Self::Experimenter),
            6..=13 => mismatch!("MultipartType", pv),
            _ => unknown!("MultipartType", code, pv),
        }
    }

    /// The wire code for the given version.
    pub fn code(self, pv: ProtocolVersion) -> Result<u32> {
        let (code, min) = match self {
            Self::Desc => (0, V1_0),
            Self::Flow => (1, V1_0),
            Self::Aggregate => (2, V1_0),
            Self::Table => (3, V1_0),
            Self::PortStats => (4, V1_0),
            Self::Queue => (5, V1_0),
            Self::Group => (6, V1_1),
            Self::GroupDesc => (7, V1_1),
            Self::GroupFeatures => (8, V1_2),
            Self::Meter => (9, V1_3),
            Self::MeterConfig => (10, V1_3),
            Self::MeterFeatures => (11, V1_3),
            Self::TableFeatures => (12, V1_3),
            Self::PortDesc => (13, V1_3),
            Self::Experimenter => (0xffff, V1_0),
        };
        if pv < min {
            return mismatch!("MultipartType", pv);
        }
        Ok(code)
    }
}

/// Table features property type (1.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum TableFeaturePropType {
    Instructions,
    InstructionsMiss,
    NextTables,
    NextTablesMiss,
    WriteActions,
    WriteActionsMiss,
    ApplyActions,
    ApplyActionsMiss,
    Match,
    Wildcards,
    WriteSetfield,
    WriteSetfieldMiss,
    ApplySetfield,
    ApplySetfieldMiss,
    Experimenter,
    ExperimenterMiss,
}

impl TableFeaturePropType {
    /// Decode a table features property type code.
    pub fn decode(code: u32, pv: ProtocolVersion) -> Result<Self> {
        if pv < V1_3 {
            return mismatch!("TableFeaturePropType", pv);
        }
        match code {
            0 => Ok(Self::Instructions),
            1 => Ok(Self::InstructionsMiss),
            2 => Ok(Self::NextTables),
            3 => Ok(Self::NextTablesMiss),
            4 => Ok(Self::WriteActions),
            5 => Ok(Self::WriteActionsMiss),
            6 => Ok(Self::ApplyActions),
            7 => Ok(Self::ApplyActionsMiss),
            8 => Ok(Self::Match),
            10 => Ok(Self::Wildcards),
            12 => Ok(Self::WriteSetfield),
            13 => Ok(Self::WriteSetfieldMiss),
            14 => Ok(Self::ApplySetfield),
            15 => Ok(Self::ApplySetfieldMiss),
            0xfffe => Ok(Self::Experimenter),
            0xffff => Ok(Self::ExperimenterMiss),
            _ => unknown!("TableFeaturePropType", code, pv),
        }
    }

    /// The wire code for the given version.
    pub fn code(self, pv: ProtocolVersion) -> Result<u32> {
        if pv < V1_3 {
            return mismatch!("TableFeaturePropType", pv);
        }
        Ok(match self {
            Self::Instructions => 0,
            Self::InstructionsMiss => 1,
            Self::NextTables => 2,
            Self::NextTablesMiss => 3,
            Self::WriteActions => 4,
            Self::WriteActionsMiss => 5,
            Self::ApplyActions => 6,
            Self::ApplyActionsMiss => 7,
            Self::Match => 8,
            Self::Wildcards => 10,
            Self::WriteSetfield => 12,
            Self::WriteSetfieldMiss => 13,
            Self::ApplySetfield => 14,
            Self::ApplySetfieldMiss => 15,
            Self::Experimenter => 0xfffe,
            Self::ExperimenterMiss => 0xffff,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_type_renumbering() {
        // FLOW_MOD_FAILED is 3 in 1.0 but 5 from 1.1
        assert_eq!(ErrorType::decode(3, V1_0).unwrap(), ErrorType::FlowModFailed);
        assert_eq!(ErrorType::decode(5, V1_3).unwrap(), ErrorType::FlowModFailed);
        assert_eq!(ErrorType::FlowModFailed.code(V1_0).unwrap(), 3);
        assert_eq!(ErrorType::FlowModFailed.code(V1_3).unwrap(), 5);
        // BAD_INSTRUCTION does not exist in 1.0
        assert!(ErrorType::BadInstruction.code(V1_0).is_err());
        assert_eq!(ErrorType::decode(3, V1_3).unwrap(), ErrorType::BadInstruction);
    }

    #[test]
    fn test_version_gated_codes() {
        assert!(matches!(
            PacketInReason::decode(2, V1_0),
            Err(Error::VersionMismatch { .. })
        ));
        assert_eq!(PacketInReason::decode(2, V1_3).unwrap(), PacketInReason::InvalidTtl);
        assert!(GroupType::decode(0, V1_0).is_err());
        assert!(ControllerRole::Master.code(V1_1).is_err());
        assert_eq!(ControllerRole::Master.code(V1_2).unwrap(), 2);
    }

    #[test]
    fn test_unknown_codes() {
        assert!(matches!(
            FlowModCommand::decode(9, V1_3),
            Err(Error::UnknownCode { code: 9, .. })
        ));
        assert!(matches!(
            MultipartType::decode(77, V1_3),
            Err(Error::UnknownCode { .. })
        ));
    }

    #[test]
    fn test_reason_flag_masks() {
        let mask =
            PacketInReason::encode_flags(&[PacketInReason::NoMatch, PacketInReason::InvalidTtl], V1_3)
                .unwrap();
        assert_eq!(mask, 0b101);
        assert_eq!(
            PacketInReason::decode_flags(mask, V1_3).unwrap(),
            vec![PacketInReason::NoMatch, PacketInReason::InvalidTtl]
        );
        // InvalidTtl bit is not encodable pre-1.2
        assert!(PacketInReason::encode_flags(&[PacketInReason::InvalidTtl], V1_0).is_err());
    }

    #[test]
    fn test_multipart_type_table() {
        assert_eq!(MultipartType::decode(12, V1_3).unwrap(), MultipartType::TableFeatures);
        assert!(MultipartType::decode(12, V1_2).is_err());
        assert_eq!(MultipartType::Experimenter.code(V1_0).unwrap(), 0xffff);
    }
}
