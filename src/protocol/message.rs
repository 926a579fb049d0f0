//! The message model
//!
//! A [`Message`] is a parsed header plus a typed body. Body structs
//! carry fields in the u32/u64 shapes of the newest supported version;
//! fields that exist only in a version range are `Option`s. The parser
//! and encoder translate to and from the per-version wire layouts.

use bytes::Bytes;

use super::codes::{
    ControllerRole, ErrorType, FlowModCommand, FlowRemovedReason, GroupModCommand, GroupType,
    MeterModCommand, MultipartType, PacketInReason, PortReason,
};
use super::error::{Error, Result};
use super::flags::{
    Capability, ConfigFlag, FlowModFlag, MeterFlag, MultipartReplyFlag, MultipartRequestFlag,
    PortConfig, PortFeature, SupportedAction, TableConfig,
};
use super::header::{Header, MessageType};
use super::structures::hello_elem::HelloElem;
use super::structures::meter_band::MeterBand;
use super::structures::port::Port;
use super::structures::queue::Queue;
use super::structures::table_feature::TableFeature;
use super::structures::Bucket;
use super::subcodec::{Action, Instruction, Match};
use super::version::ProtocolVersion;
use super::version::ProtocolVersion::{V1_0, V1_1};

/// Buffer id meaning "packet not buffered on the switch".
pub const NO_BUFFER: u32 = 0xffff_ffff;
/// Group id wildcard.
pub const GROUP_ANY: u32 = 0xffff_ffff;
/// Meter id wildcard.
pub const METER_ALL: u32 = 0xffff_ffff;
/// Table id wildcard (1.1+).
pub const TABLE_ALL: u8 = 0xff;

/// A complete OpenFlow message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The fixed header.
    pub header: Header,
    /// The typed body.
    pub body: Body,
}

impl Message {
    /// Protocol version of the message.
    #[must_use]
    pub const fn version(&self) -> ProtocolVersion {
        self.header.version
    }

    /// Kind of message.
    #[must_use]
    pub const fn message_type(&self) -> MessageType {
        self.header.message_type
    }

    /// Transaction id.
    #[must_use]
    pub const fn xid(&self) -> u32 {
        self.header.xid
    }

    /// Checks internal consistency: the body variant must match the
    /// header type, and version-gated fields must agree with the header
    /// version.
    pub fn validate(&self) -> Result<()> {
        let pv = self.version();
        if self.body.message_type() != self.message_type() {
            return Err(Error::IncompleteMessage { what: "body does not match header type" });
        }
        match &self.body {
            Body::FlowMod(b) => b.validate(pv),
            Body::PacketIn(b) => b.validate(pv),
            Body::PacketOut(b) => b.validate(pv),
            Body::GroupMod(_) => super::version::ver_min_1_1(pv, "GroupMod"),
            Body::MeterMod(_) => super::version::ver_min_1_3(pv, "MeterMod"),
            Body::RoleRequest(_) | Body::RoleReply(_) => {
                super::version::ver_min_1_2(pv, "Role")
            }
            Body::GetAsyncReply(_) | Body::SetAsync(_) => {
                super::version::ver_min_1_3(pv, "AsyncConfig")
            }
            Body::GetAsyncRequest => super::version::ver_min_1_3(pv, "GetAsyncRequest"),
            Body::TableMod(_) => super::version::ver_min_1_1(pv, "TableMod"),
            _ => Ok(()),
        }
    }
}

/// The typed body of a message. Kinds whose wire form is the bare
/// header are unit variants.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Body {
    Hello(HelloBody),
    Error(ErrorBody),
    EchoRequest(EchoBody),
    EchoReply(EchoBody),
    Experimenter(ExperimenterBody),
    FeaturesRequest,
    FeaturesReply(FeaturesReplyBody),
    GetConfigRequest,
    GetConfigReply(SwitchConfigBody),
    SetConfig(SwitchConfigBody),
    PacketIn(PacketInBody),
    FlowRemoved(FlowRemovedBody),
    PortStatus(PortStatusBody),
    PacketOut(PacketOutBody),
    FlowMod(FlowModBody),
    GroupMod(GroupModBody),
    PortMod(PortModBody),
    TableMod(TableModBody),
    MultipartRequest(MultipartRequestBody),
    MultipartReply(MultipartReplyBody),
    BarrierRequest,
    BarrierReply,
    QueueGetConfigRequest(QueueGetConfigRequestBody),
    QueueGetConfigReply(QueueGetConfigReplyBody),
    RoleRequest(RoleBody),
    RoleReply(RoleBody),
    GetAsyncRequest,
    GetAsyncReply(AsyncConfigBody),
    SetAsync(AsyncConfigBody),
    MeterMod(MeterModBody),
}

impl Body {
    /// The message type this body belongs under.
    #[must_use]
    pub const fn message_type(&self) -> MessageType {
        match self {
            Self::Hello(_) => MessageType::Hello,
            Self::Error(_) => MessageType::Error,
            Self::EchoRequest(_) => MessageType::EchoRequest,
            Self::EchoReply(_) => MessageType::EchoReply,
            Self::Experimenter(_) => MessageType::Experimenter,
            Self::FeaturesRequest => MessageType::FeaturesRequest,
            Self::FeaturesReply(_) => MessageType::FeaturesReply,
            Self::GetConfigRequest => MessageType::GetConfigRequest,
            Self::GetConfigReply(_) => MessageType::GetConfigReply,
            Self::SetConfig(_) => MessageType::SetConfig,
            Self::PacketIn(_) => MessageType::PacketIn,
            Self::FlowRemoved(_) => MessageType::FlowRemoved,
            Self::PortStatus(_) => MessageType::PortStatus,
            Self::PacketOut(_) => MessageType::PacketOut,
            Self::FlowMod(_) => MessageType::FlowMod,
            Self::GroupMod(_) => MessageType::GroupMod,
            Self::PortMod(_) => MessageType::PortMod,
            Self::TableMod(_) => MessageType::TableMod,
            Self::MultipartRequest(_) => MessageType::MultipartRequest,
            Self::MultipartReply(_) => MessageType::MultipartReply,
            Self::BarrierRequest => MessageType::BarrierRequest,
            Self::BarrierReply => MessageType::BarrierReply,
            Self::QueueGetConfigRequest(_) => MessageType::QueueGetConfigRequest,
            Self::QueueGetConfigReply(_) => MessageType::QueueGetConfigReply,
            Self::RoleRequest(_) => MessageType::RoleRequest,
            Self::RoleReply(_) => MessageType::RoleReply,
            Self::GetAsyncRequest => MessageType::GetAsyncRequest,
            Self::GetAsyncReply(_) => MessageType::GetAsyncReply,
            Self::SetAsync(_) => MessageType::SetAsync,
            Self::MeterMod(_) => MessageType::MeterMod,
        }
    }
}

/// Hello body: TLV elements, usually a version bitmap.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HelloBody {
    /// Elements carried in the hello.
    pub elements: Vec<HelloElem>,
}

impl HelloBody {
    /// The peer's declared version set, if a version bitmap was present.
    #[must_use]
    pub fn version_bitmap(&self) -> Option<&[ProtocolVersion]> {
        self.elements.iter().find_map(|e| match e {
            HelloElem::VersionBitmap(v) => Some(v.as_slice()),
        })
    }
}

/// Standard or experimenter error detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDetail {
    /// A standard error: the sub-code within the error type.
    Standard {
        /// Type-specific error code, kept raw.
        code: u16,
    },
    /// An experimenter error (1.2+).
    Experimenter {
        /// Experimenter-defined type.
        exp_type: u16,
        /// Experimenter id.
        experimenter: u32,
    },
}

/// Error message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    /// High-level error category.
    pub error_type: ErrorType,
    /// Standard or experimenter detail.
    pub detail: ErrorDetail,
    /// Offending message bytes, or an ASCII message for HELLO_FAILED.
    pub data: Bytes,
}

impl ErrorBody {
    /// The ASCII explanation carried by HELLO_FAILED errors.
    #[must_use]
    pub fn hello_failed_message(&self) -> Option<String> {
        if self.error_type == ErrorType::HelloFailed && !self.data.is_empty() {
            Some(String::from_utf8_lossy(&self.data).into_owned())
        } else {
            None
        }
    }
}

/// Echo request/reply body: opaque payload echoed back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EchoBody {
    /// Opaque payload.
    pub data: Bytes,
}

/// Experimenter (vendor) message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimenterBody {
    /// Experimenter id.
    pub experimenter: u32,
    /// Experimenter-defined type. Not on the wire in 1.0.
    pub exp_type: u32,
    /// Opaque payload.
    pub data: Bytes,
}

/// Features reply body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturesReplyBody {
    /// Datapath id.
    pub datapath_id: u64,
    /// Packets the switch can buffer.
    pub num_buffers: u32,
    /// Number of flow tables.
    pub num_tables: u8,
    /// Auxiliary connection id (1.3).
    pub auxiliary_id: u8,
    /// Datapath capabilities.
    pub capabilities: Vec<Capability>,
    /// Actions the datapath supports (1.0 only).
    pub supported_actions: Vec<SupportedAction>,
    /// Port descriptions (absent in 1.3, which moved them to a
    /// multipart body).
    pub ports: Vec<Port>,
}

/// Switch config body, for GET_CONFIG_REPLY and SET_CONFIG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchConfigBody {
    /// Fragment handling and TTL flags.
    pub flags: Vec<ConfigFlag>,
    /// Max bytes of a packet sent to the controller on a table miss.
    pub miss_send_length: u16,
}

impl Default for SwitchConfigBody {
    fn default() -> Self {
        Self { flags: vec![ConfigFlag::FragNormal], miss_send_length: 128 }
    }
}

/// Packet-in body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketInBody {
    /// Buffer id on the switch, or [`NO_BUFFER`].
    pub buffer_id: u32,
    /// Full length of the original frame.
    pub total_length: u16,
    /// Ingress port. Explicit field through 1.1; recovered from the
    /// match from 1.2.
    pub in_port: Option<u32>,
    /// Physical ingress port (1.1 only).
    pub in_phy_port: Option<u32>,
    /// Why the packet came to the controller.
    pub reason: PacketInReason,
    /// Table that triggered the event (1.1+).
    pub table_id: Option<u8>,
    /// Cookie of the triggering flow (1.3).
    pub cookie: Option<u64>,
    /// Packet match (1.2+).
    pub match_fields: Option<Match>,
    /// Frame bytes, possibly truncated.
    pub data: Bytes,
}

impl PacketInBody {
    fn validate(&self, pv: ProtocolVersion) -> Result<()> {
        if pv >= ProtocolVersion::V1_2 && self.match_fields.is_none() {
            return Err(Error::IncompleteMessage { what: "PacketIn match" });
        }
        if pv <= V1_1 && self.in_port.is_none() {
            return Err(Error::IncompleteMessage { what: "PacketIn in_port" });
        }
        Ok(())
    }
}

/// Flow-removed body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRemovedBody {
    /// Cookie of the removed flow.
    pub cookie: u64,
    /// Priority of the removed flow.
    pub priority: u16,
    /// Why the flow was removed.
    pub reason: FlowRemovedReason,
    /// Table the flow lived in (1.1+).
    pub table_id: Option<u8>,
    /// Seconds the flow was installed.
    pub duration_seconds: u32,
    /// Nanosecond remainder of the duration.
    pub duration_nanoseconds: u32,
    /// Idle timeout of the removed flow.
    pub idle_timeout: u16,
    /// Hard timeout of the removed flow (1.3).
    pub hard_timeout: Option<u16>,
    /// Packets matched by the flow.
    pub packet_count: u64,
    /// Bytes matched by the flow.
    pub byte_count: u64,
    /// The flow's match.
    pub match_fields: Match,
}

/// Port-status body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortStatusBody {
    /// What happened to the port.
    pub reason: PortReason,
    /// The port description after the change.
    pub port: Port,
}

/// Packet-out body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketOutBody {
    /// Buffer id of a switch-buffered packet, or [`NO_BUFFER`].
    pub buffer_id: u32,
    /// Ingress port the packet is treated as arriving on.
    pub in_port: u32,
    /// Actions applied to the packet.
    pub actions: Vec<Action>,
    /// Frame bytes; only sent when `buffer_id` is [`NO_BUFFER`].
    pub data: Bytes,
}

impl PacketOutBody {
    fn validate(&self, pv: ProtocolVersion) -> Result<()> {
        super::structures::port::PortNumber::validate(self.in_port, pv)?;
        if self.buffer_id != NO_BUFFER && !self.data.is_empty() {
            return Err(Error::IncompleteMessage { what: "PacketOut buffered with data" });
        }
        Ok(())
    }
}

/// Flow-mod body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowModBody {
    /// Opaque controller cookie.
    pub cookie: u64,
    /// Cookie mask for delete/modify matching (1.1+).
    pub cookie_mask: Option<u64>,
    /// Target table (1.1+).
    pub table_id: Option<u8>,
    /// What to do.
    pub command: FlowModCommand,
    /// Idle timeout, seconds.
    pub idle_timeout: u16,
    /// Hard timeout, seconds.
    pub hard_timeout: u16,
    /// Entry priority.
    pub priority: u16,
    /// Buffered packet to apply the flow to, or [`NO_BUFFER`].
    pub buffer_id: u32,
    /// Output port filter for delete commands.
    pub out_port: u32,
    /// Output group filter for delete commands (1.1+).
    pub out_group: Option<u32>,
    /// Option flags.
    pub flags: Vec<FlowModFlag>,
    /// The match.
    pub match_fields: Match,
    /// Actions (1.0 only).
    pub actions: Vec<Action>,
    /// Instructions (1.1+).
    pub instructions: Vec<Instruction>,
}

impl FlowModBody {
    fn validate(&self, pv: ProtocolVersion) -> Result<()> {
        if pv == V1_0 {
            if !self.instructions.is_empty() {
                return Err(Error::VersionMismatch { what: "FlowMod instructions", version: pv });
            }
        } else {
            if !self.actions.is_empty() {
                return Err(Error::VersionMismatch { what: "FlowMod actions", version: pv });
            }
            if self.table_id.is_none() {
                return Err(Error::IncompleteMessage { what: "FlowMod table_id" });
            }
        }
        Ok(())
    }
}

/// Group-mod body (1.1+).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupModBody {
    /// What to do.
    pub command: GroupModCommand,
    /// Group type.
    pub group_type: GroupType,
    /// Group id.
    pub group_id: u32,
    /// Buckets.
    pub buckets: Vec<Bucket>,
}

/// Port-mod body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortModBody {
    /// Port to modify.
    pub port_number: u32,
    /// Expected hardware address, sanity check against misdirection.
    pub hw_address: [u8; 6],
    /// Config bits to set.
    pub config: Vec<PortConfig>,
    /// Which config bits to change.
    pub config_mask: Vec<PortConfig>,
    /// Features to advertise; empty leaves them unchanged.
    pub advertise: Vec<PortFeature>,
}

/// Table-mod body (1.1+).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableModBody {
    /// Table to configure, or [`TABLE_ALL`].
    pub table_id: u8,
    /// Miss behavior (empty in 1.3, which deprecated the flags).
    pub config: Vec<TableConfig>,
}

/// The body of a multipart request, typed where this layer models the
/// content and raw otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartPayload {
    /// Table features descriptions (TABLE_FEATURES, 1.3).
    TableFeatures(Vec<TableFeature>),
    /// Port descriptions (PORT_DESC reply, 1.3).
    PortDesc(Vec<Port>),
    /// Raw body bytes for the other multipart types.
    Raw(Bytes),
}

impl MultipartPayload {
    /// An empty raw payload, for request types with no body.
    #[must_use]
    pub fn empty() -> Self {
        Self::Raw(Bytes::new())
    }
}

/// Multipart request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartRequestBody {
    /// What is being requested.
    pub mp_type: MultipartType,
    /// Request flags.
    pub flags: Vec<MultipartRequestFlag>,
    /// Request payload.
    pub payload: MultipartPayload,
}

/// Multipart reply body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartReplyBody {
    /// What is being reported.
    pub mp_type: MultipartType,
    /// Reply flags; REPLY_MORE means further replies share the xid.
    pub flags: Vec<MultipartReplyFlag>,
    /// Reply payload.
    pub payload: MultipartPayload,
}

impl MultipartReplyBody {
    /// True if further replies with the same xid will follow.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.flags.contains(&MultipartReplyFlag::ReplyMore)
    }
}

/// Queue-get-config request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueGetConfigRequestBody {
    /// Port to query.
    pub port: u32,
}

/// Queue-get-config reply body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueGetConfigReplyBody {
    /// Port the queues belong to.
    pub port: u32,
    /// The configured queues.
    pub queues: Vec<Queue>,
}

/// Role request/reply body (1.2+).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleBody {
    /// Requested or granted role.
    pub role: ControllerRole,
    /// Master election generation id.
    pub generation_id: u64,
}

/// Async-config body (1.3): which async messages reach this controller,
/// one mask for the master/equal role and one for the slave role.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AsyncConfigBody {
    /// Packet-in reasons delivered, per role.
    pub packet_in_mask: [Vec<PacketInReason>; 2],
    /// Port-status reasons delivered, per role.
    pub port_status_mask: [Vec<PortReason>; 2],
    /// Flow-removed reasons delivered, per role.
    pub flow_removed_mask: [Vec<FlowRemovedReason>; 2],
}

/// Meter-mod body (1.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeterModBody {
    /// What to do.
    pub command: MeterModCommand,
    /// Meter flags.
    pub flags: Vec<MeterFlag>,
    /// Meter id, or [`METER_ALL`].
    pub meter_id: u32,
    /// Bands.
    pub bands: Vec<MeterBand>,
}
