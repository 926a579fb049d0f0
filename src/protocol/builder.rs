//! Message builders
//!
//! One consuming builder per message kind a controller composes.
//! Builders start from sane defaults (no buffer, wildcard out port and
//! group), keep a running total of the wire length as parts are added,
//! and stamp it into the header on `finish`. The xid is left at zero;
//! [`assign_xid`](crate::protocol::factory::assign_xid) stamps a fresh
//! one at send time.

use bytes::Bytes;

use super::codes::{
    ControllerRole, ErrorType, FlowModCommand, GroupModCommand, GroupType, MeterModCommand,
    MultipartType,
};
use super::error::Result;
use super::flags::{
    ConfigFlag, FlowModFlag, MeterFlag, MultipartRequestFlag, PortConfig, PortFeature, TableConfig,
};
use super::header::{Header, MessageType, OFM_HEADER_LEN};
use super::message::*;
use super::structures::bucket::{Bucket, bucket_list_length};
use super::structures::hello_elem::{HelloElem, hello_elems_length};
use super::structures::meter_band::MeterBand;
use super::structures::port::PortNumber;
use super::subcodec::{
    Action, Instruction, MATCH_LEN_10, MATCH_TYPE_STANDARD, Match, action_list_length,
    instruction_list_length,
};
use super::version::ProtocolVersion;
use super::version::ProtocolVersion::{V1_0, V1_2};

fn finish_message(pv: ProtocolVersion, body: Body, length: usize) -> Result<Message> {
    let message_type = body.message_type();
    super::factory::check_create_allowed(pv, message_type)?;
    let msg = Message {
        header: Header { version: pv, message_type, length: length as u16, xid: 0 },
        body,
    };
    msg.validate()?;
    Ok(msg)
}

fn default_match(pv: ProtocolVersion) -> Match {
    if pv == V1_0 {
        Match { match_type: MATCH_TYPE_STANDARD, fields: Bytes::from(vec![0u8; MATCH_LEN_10]) }
    } else {
        Match::match_all()
    }
}

/// Builds a hello message.
#[derive(Debug)]
pub struct HelloBuilder {
    pv: ProtocolVersion,
    elements: Vec<HelloElem>,
}

impl HelloBuilder {
    /// A hello for the given (highest supported) version.
    #[must_use]
    pub fn new(pv: ProtocolVersion) -> Self {
        Self { pv, elements: Vec::new() }
    }

    /// Advertise the full version set in a version bitmap element.
    #[must_use]
    pub fn version_bitmap(mut self, versions: Vec<ProtocolVersion>) -> Self {
        self.elements.push(HelloElem::VersionBitmap(versions));
        self
    }

    /// Produce the message.
    pub fn finish(self) -> Result<Message> {
        let length = OFM_HEADER_LEN + hello_elems_length(&self.elements);
        finish_message(self.pv, Body::Hello(HelloBody { elements: self.elements }), length)
    }
}

/// Builds an echo request or reply.
#[derive(Debug)]
pub struct EchoBuilder {
    pv: ProtocolVersion,
    reply: bool,
    data: Bytes,
}

impl EchoBuilder {
    /// An echo request.
    #[must_use]
    pub fn request(pv: ProtocolVersion) -> Self {
        Self { pv, reply: false, data: Bytes::new() }
    }

    /// An echo reply.
    #[must_use]
    pub fn reply(pv: ProtocolVersion) -> Self {
        Self { pv, reply: true, data: Bytes::new() }
    }

    /// Set the opaque payload.
    #[must_use]
    pub fn data(mut self, data: Bytes) -> Self {
        self.data = data;
        self
    }

    /// Produce the message.
    pub fn finish(self) -> Result<Message> {
        let length = OFM_HEADER_LEN + self.data.len();
        let body = EchoBody { data: self.data };
        let body = if self.reply { Body::EchoReply(body) } else { Body::EchoRequest(body) };
        finish_message(self.pv, body, length)
    }
}

/// Builds an error message.
#[derive(Debug)]
pub struct ErrorBuilder {
    pv: ProtocolVersion,
    error_type: ErrorType,
    detail: ErrorDetail,
    data: Bytes,
}

impl ErrorBuilder {
    /// An error of the given type and sub-code.
    #[must_use]
    pub fn new(pv: ProtocolVersion, error_type: ErrorType, code: u16) -> Self {
        Self { pv, error_type, detail: ErrorDetail::Standard { code }, data: Bytes::new() }
    }

    /// An experimenter error (1.2+).
    #[must_use]
    pub fn experimenter(pv: ProtocolVersion, exp_type: u16, experimenter: u32) -> Self {
        Self {
            pv,
            error_type: ErrorType::Experimenter,
            detail: ErrorDetail::Experimenter { exp_type, experimenter },
            data: Bytes::new(),
        }
    }

    /// Attach the offending message bytes, or an ASCII explanation for
    /// HELLO_FAILED.
    #[must_use]
    pub fn data(mut self, data: Bytes) -> Self {
        self.data = data;
        self
    }

    /// Produce the message.
    pub fn finish(self) -> Result<Message> {
        let detail_len = match self.detail {
            ErrorDetail::Standard { .. } => 4,
            ErrorDetail::Experimenter { .. } => 8,
        };
        let length = OFM_HEADER_LEN + detail_len + self.data.len();
        finish_message(
            self.pv,
            Body::Error(ErrorBody {
                error_type: self.error_type,
                detail: self.detail,
                data: self.data,
            }),
            length,
        )
    }
}

/// Builds a flow-mod.
#[derive(Debug)]
pub struct FlowModBuilder {
    pv: ProtocolVersion,
    body: FlowModBody,
    length: usize,
}

impl FlowModBuilder {
    const FIXED_10: usize = 72; // header + match + fixed fields
    const FIXED: usize = 48; // header + fixed fields, match excluded

    /// A flow-mod with the given command; no buffer, wildcard out port
    /// and group, match-all.
    #[must_use]
    pub fn new(pv: ProtocolVersion, command: FlowModCommand) -> Self {
        let match_fields = default_match(pv);
        let length = if pv == V1_0 {
            Self::FIXED_10
        } else {
            Self::FIXED + match_fields.wire_length(pv)
        };
        Self {
            pv,
            body: FlowModBody {
                cookie: 0,
                cookie_mask: (pv > V1_0).then_some(0),
                table_id: (pv > V1_0).then_some(0),
                command,
                idle_timeout: 0,
                hard_timeout: 0,
                priority: 0,
                buffer_id: NO_BUFFER,
                out_port: PortNumber::ANY,
                out_group: (pv > V1_0).then_some(GROUP_ANY),
                flags: Vec::new(),
                match_fields,
                actions: Vec::new(),
                instructions: Vec::new(),
            },
            length,
        }
    }

    /// Set the cookie.
    #[must_use]
    pub fn cookie(mut self, cookie: u64) -> Self {
        self.body.cookie = cookie;
        self
    }

    /// Set the cookie mask (1.1+).
    #[must_use]
    pub fn cookie_mask(mut self, mask: u64) -> Self {
        self.body.cookie_mask = Some(mask);
        self
    }

    /// Set the target table (1.1+).
    #[must_use]
    pub fn table_id(mut self, table_id: u8) -> Self {
        self.body.table_id = Some(table_id);
        self
    }

    /// Set idle and hard timeouts.
    #[must_use]
    pub fn timeouts(mut self, idle: u16, hard: u16) -> Self {
        self.body.idle_timeout = idle;
        self.body.hard_timeout = hard;
        self
    }

    /// Set the priority.
    #[must_use]
    pub fn priority(mut self, priority: u16) -> Self {
        self.body.priority = priority;
        self
    }

    /// Apply the flow to a switch-buffered packet.
    #[must_use]
    pub fn buffer_id(mut self, buffer_id: u32) -> Self {
        self.body.buffer_id = buffer_id;
        self
    }

    /// Restrict delete commands to flows with this output port.
    #[must_use]
    pub fn out_port(mut self, port: u32) -> Self {
        self.body.out_port = port;
        self
    }

    /// Restrict delete commands to flows with this output group (1.1+).
    #[must_use]
    pub fn out_group(mut self, group: u32) -> Self {
        self.body.out_group = Some(group);
        self
    }

    /// Set the option flags.
    #[must_use]
    pub fn flags(mut self, flags: Vec<FlowModFlag>) -> Self {
        self.body.flags = flags;
        self
    }

    /// Set the match.
    #[must_use]
    pub fn match_fields(mut self, m: Match) -> Self {
        self.length -= self.body.match_fields.wire_length(self.pv);
        self.length += m.wire_length(self.pv);
        self.body.match_fields = m;
        self
    }

    /// Append an action (1.0 only).
    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.length += action.wire_length();
        self.body.actions.push(action);
        self
    }

    /// Append an instruction (1.1+).
    #[must_use]
    pub fn instruction(mut self, instruction: Instruction) -> Self {
        self.length += instruction.wire_length();
        self.body.instructions.push(instruction);
        self
    }

    /// Produce the message.
    pub fn finish(self) -> Result<Message> {
        debug_assert_eq!(
            self.length,
            if self.pv == V1_0 {
                Self::FIXED_10 - MATCH_LEN_10 + self.body.match_fields.wire_length(self.pv)
                    + action_list_length(&self.body.actions)
            } else {
                Self::FIXED
                    + self.body.match_fields.wire_length(self.pv)
                    + instruction_list_length(&self.body.instructions)
            }
        );
        finish_message(self.pv, Body::FlowMod(self.body), self.length)
    }
}

/// Builds a packet-out.
#[derive(Debug)]
pub struct PacketOutBuilder {
    pv: ProtocolVersion,
    body: PacketOutBody,
    length: usize,
}

impl PacketOutBuilder {
    /// A packet-out with no buffer and the controller as ingress.
    #[must_use]
    pub fn new(pv: ProtocolVersion) -> Self {
        let length = if pv == V1_0 { 16 } else { 24 };
        Self {
            pv,
            body: PacketOutBody {
                buffer_id: NO_BUFFER,
                in_port: PortNumber::CONTROLLER,
                actions: Vec::new(),
                data: Bytes::new(),
            },
            length,
        }
    }

    /// Reference a switch-buffered packet instead of carrying bytes.
    #[must_use]
    pub fn buffer_id(mut self, buffer_id: u32) -> Self {
        self.body.buffer_id = buffer_id;
        self
    }

    /// Set the ingress port the packet is treated as arriving on.
    #[must_use]
    pub fn in_port(mut self, port: u32) -> Self {
        self.body.in_port = port;
        self
    }

    /// Append an action.
    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.length += action.wire_length();
        self.body.actions.push(action);
        self
    }

    /// Set the frame bytes.
    #[must_use]
    pub fn data(mut self, data: Bytes) -> Self {
        self.length -= self.body.data.len();
        self.length += data.len();
        self.body.data = data;
        self
    }

    /// Produce the message.
    pub fn finish(self) -> Result<Message> {
        finish_message(self.pv, Body::PacketOut(self.body), self.length)
    }
}

/// Builds a group-mod (1.1+).
#[derive(Debug)]
pub struct GroupModBuilder {
    pv: ProtocolVersion,
    body: GroupModBody,
    length: usize,
}

impl GroupModBuilder {
    /// A group-mod for the given command, type and group id.
    #[must_use]
    pub fn new(pv: ProtocolVersion, command: GroupModCommand, group_type: GroupType, group_id: u32) -> Self {
        Self {
            pv,
            body: GroupModBody { command, group_type, group_id, buckets: Vec::new() },
            length: 16,
        }
    }

    /// Append a bucket.
    #[must_use]
    pub fn bucket(mut self, bucket: Bucket) -> Self {
        self.length += bucket.wire_length();
        self.body.buckets.push(bucket);
        self
    }

    /// Produce the message.
    pub fn finish(self) -> Result<Message> {
        debug_assert_eq!(self.length, 16 + bucket_list_length(&self.body.buckets));
        finish_message(self.pv, Body::GroupMod(self.body), self.length)
    }
}

/// Builds a meter-mod (1.3).
#[derive(Debug)]
pub struct MeterModBuilder {
    pv: ProtocolVersion,
    body: MeterModBody,
    length: usize,
}

impl MeterModBuilder {
    /// A meter-mod for the given command and meter id.
    #[must_use]
    pub fn new(pv: ProtocolVersion, command: MeterModCommand, meter_id: u32) -> Self {
        Self {
            pv,
            body: MeterModBody { command, flags: Vec::new(), meter_id, bands: Vec::new() },
            length: 16,
        }
    }

    /// Set the meter flags.
    #[must_use]
    pub fn flags(mut self, flags: Vec<MeterFlag>) -> Self {
        self.body.flags = flags;
        self
    }

    /// Append a band.
    #[must_use]
    pub fn band(mut self, band: MeterBand) -> Self {
        self.length += band.wire_length();
        self.body.bands.push(band);
        self
    }

    /// Produce the message.
    pub fn finish(self) -> Result<Message> {
        finish_message(self.pv, Body::MeterMod(self.body), self.length)
    }
}

/// Builds a set-config.
#[derive(Debug)]
pub struct SetConfigBuilder {
    pv: ProtocolVersion,
    body: SwitchConfigBody,
}

impl SetConfigBuilder {
    /// A set-config with normal fragment handling and the default miss
    /// send length.
    #[must_use]
    pub fn new(pv: ProtocolVersion) -> Self {
        Self { pv, body: SwitchConfigBody::default() }
    }

    /// Set the config flags.
    #[must_use]
    pub fn flags(mut self, flags: Vec<ConfigFlag>) -> Self {
        self.body.flags = flags;
        self
    }

    /// Set the miss send length.
    #[must_use]
    pub fn miss_send_length(mut self, len: u16) -> Self {
        self.body.miss_send_length = len;
        self
    }

    /// Produce the message.
    pub fn finish(self) -> Result<Message> {
        finish_message(self.pv, Body::SetConfig(self.body), 12)
    }
}

/// Builds a multipart request.
#[derive(Debug)]
pub struct MultipartRequestBuilder {
    pv: ProtocolVersion,
    body: MultipartRequestBody,
}

impl MultipartRequestBuilder {
    /// A request for the given multipart type, with an empty body.
    #[must_use]
    pub fn new(pv: ProtocolVersion, mp_type: MultipartType) -> Self {
        Self {
            pv,
            body: MultipartRequestBody {
                mp_type,
                flags: Vec::new(),
                payload: MultipartPayload::empty(),
            },
        }
    }

    /// Mark that further requests will follow.
    #[must_use]
    pub fn more(mut self) -> Self {
        self.body.flags = vec![MultipartRequestFlag::RequestMore];
        self
    }

    /// Set the request payload.
    #[must_use]
    pub fn payload(mut self, payload: MultipartPayload) -> Self {
        self.body.payload = payload;
        self
    }

    /// Produce the message.
    pub fn finish(self) -> Result<Message> {
        let hdr = if self.pv >= V1_2 { 16 } else { 12 };
        let payload_len = match &self.body.payload {
            MultipartPayload::Raw(b) => b.len(),
            MultipartPayload::TableFeatures(f) => f.iter().map(|t| t.wire_length()).sum(),
            MultipartPayload::PortDesc(_) => 0,
        };
        finish_message(self.pv, Body::MultipartRequest(self.body), hdr + payload_len)
    }
}

/// Builds a port-mod.
#[derive(Debug)]
pub struct PortModBuilder {
    pv: ProtocolVersion,
    body: PortModBody,
}

impl PortModBuilder {
    /// A port-mod for the given port and hardware address; changes
    /// nothing until config bits are set.
    #[must_use]
    pub fn new(pv: ProtocolVersion, port_number: u32, hw_address: [u8; 6]) -> Self {
        Self {
            pv,
            body: PortModBody {
                port_number,
                hw_address,
                config: Vec::new(),
                config_mask: Vec::new(),
                advertise: Vec::new(),
            },
        }
    }

    /// Set config bits and the mask of bits to change.
    #[must_use]
    pub fn config(mut self, config: Vec<PortConfig>, mask: Vec<PortConfig>) -> Self {
        self.body.config = config;
        self.body.config_mask = mask;
        self
    }

    /// Set the features to advertise.
    #[must_use]
    pub fn advertise(mut self, features: Vec<PortFeature>) -> Self {
        self.body.advertise = features;
        self
    }

    /// Produce the message.
    pub fn finish(self) -> Result<Message> {
        let length = if self.pv == V1_0 { 32 } else { 40 };
        finish_message(self.pv, Body::PortMod(self.body), length)
    }
}

/// Builds a table-mod (1.1+).
#[derive(Debug)]
pub struct TableModBuilder {
    pv: ProtocolVersion,
    body: TableModBody,
}

impl TableModBuilder {
    /// A table-mod for the given table.
    #[must_use]
    pub fn new(pv: ProtocolVersion, table_id: u8) -> Self {
        Self { pv, body: TableModBody { table_id, config: Vec::new() } }
    }

    /// Set the miss behavior (1.1 and 1.2 only).
    #[must_use]
    pub fn config(mut self, config: Vec<TableConfig>) -> Self {
        self.body.config = config;
        self
    }

    /// Produce the message.
    pub fn finish(self) -> Result<Message> {
        finish_message(self.pv, Body::TableMod(self.body), 16)
    }
}

/// Builds a role request (1.2+).
#[derive(Debug)]
pub struct RoleRequestBuilder {
    pv: ProtocolVersion,
    body: RoleBody,
}

impl RoleRequestBuilder {
    /// A role request for the given role.
    #[must_use]
    pub fn new(pv: ProtocolVersion, role: ControllerRole) -> Self {
        Self { pv, body: RoleBody { role, generation_id: 0 } }
    }

    /// Set the election generation id.
    #[must_use]
    pub fn generation_id(mut self, generation_id: u64) -> Self {
        self.body.generation_id = generation_id;
        self
    }

    /// Produce the message.
    pub fn finish(self) -> Result<Message> {
        finish_message(self.pv, Body::RoleRequest(self.body), 24)
    }
}

/// Builds a set-async (1.3).
#[derive(Debug)]
pub struct SetAsyncBuilder {
    pv: ProtocolVersion,
    body: AsyncConfigBody,
}

impl SetAsyncBuilder {
    /// A set-async delivering nothing; add reasons per role slot
    /// (0 = master/equal, 1 = slave).
    #[must_use]
    pub fn new(pv: ProtocolVersion) -> Self {
        Self { pv, body: AsyncConfigBody::default() }
    }

    /// Set the full async configuration.
    #[must_use]
    pub fn config(mut self, body: AsyncConfigBody) -> Self {
        self.body = body;
        self
    }

    /// Produce the message.
    pub fn finish(self) -> Result<Message> {
        finish_message(self.pv, Body::SetAsync(self.body), 32)
    }
}

/// Builds a queue-get-config request.
#[derive(Debug)]
pub struct QueueGetConfigRequestBuilder {
    pv: ProtocolVersion,
    port: u32,
}

impl QueueGetConfigRequestBuilder {
    /// A request for the queues of the given port.
    #[must_use]
    pub fn new(pv: ProtocolVersion, port: u32) -> Self {
        Self { pv, port }
    }

    /// Produce the message.
    pub fn finish(self) -> Result<Message> {
        let length = if self.pv == V1_0 { 12 } else { 16 };
        finish_message(
            self.pv,
            Body::QueueGetConfigRequest(QueueGetConfigRequestBody { port: self.port }),
            length,
        )
    }
}

/// Builds an experimenter message.
#[derive(Debug)]
pub struct ExperimenterBuilder {
    pv: ProtocolVersion,
    body: ExperimenterBody,
}

impl ExperimenterBuilder {
    /// An experimenter message for the given experimenter id.
    #[must_use]
    pub fn new(pv: ProtocolVersion, experimenter: u32) -> Self {
        Self { pv, body: ExperimenterBody { experimenter, exp_type: 0, data: Bytes::new() } }
    }

    /// Set the experimenter-defined type (ignored on the 1.0 wire).
    #[must_use]
    pub fn exp_type(mut self, exp_type: u32) -> Self {
        self.body.exp_type = exp_type;
        self
    }

    /// Set the opaque payload.
    #[must_use]
    pub fn data(mut self, data: Bytes) -> Self {
        self.body.data = data;
        self
    }

    /// Produce the message.
    pub fn finish(self) -> Result<Message> {
        let fixed = if self.pv == V1_0 { 12 } else { 16 };
        let length = fixed + self.body.data.len();
        finish_message(self.pv, Body::Experimenter(self.body), length)
    }
}

/// A message whose wire form is the bare header.
pub fn header_only(pv: ProtocolVersion, message_type: MessageType) -> Result<Message> {
    let body = match message_type {
        MessageType::FeaturesRequest => Body::FeaturesRequest,
        MessageType::GetConfigRequest => Body::GetConfigRequest,
        MessageType::BarrierRequest => Body::BarrierRequest,
        MessageType::BarrierReply => Body::BarrierReply,
        MessageType::GetAsyncRequest => Body::GetAsyncRequest,
        _ => {
            return Err(super::error::Error::IncompleteMessage {
                what: "message type requires a body",
            });
        }
    };
    finish_message(pv, body, OFM_HEADER_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::version::ProtocolVersion::{V1_1, V1_3};

    #[test]
    fn test_flow_mod_defaults() {
        let msg = FlowModBuilder::new(V1_3, FlowModCommand::Add).finish().unwrap();
        assert_eq!(msg.message_type(), MessageType::FlowMod);
        assert_eq!(msg.header.length, 56); // 48 fixed + 8 empty match
        let Body::FlowMod(fm) = &msg.body else { panic!() };
        assert_eq!(fm.buffer_id, NO_BUFFER);
        assert_eq!(fm.out_port, PortNumber::ANY);
        assert_eq!(fm.out_group, Some(GROUP_ANY));
        assert_eq!(fm.table_id, Some(0));
    }

    #[test]
    fn test_flow_mod_length_tracks_parts() {
        let ins = Instruction { instruction_type: 1, body: Bytes::from_static(&[0, 0, 0, 0]) };
        let msg = FlowModBuilder::new(V1_3, FlowModCommand::Add)
            .instruction(ins.clone())
            .instruction(ins)
            .finish()
            .unwrap();
        assert_eq!(msg.header.length, 56 + 16);
    }

    #[test]
    fn test_flow_mod_10_defaults() {
        let msg = FlowModBuilder::new(V1_0, FlowModCommand::Add).finish().unwrap();
        assert_eq!(msg.header.length, 72);
        let Body::FlowMod(fm) = &msg.body else { panic!() };
        assert_eq!(fm.table_id, None);
        assert_eq!(fm.out_group, None);
    }

    #[test]
    fn test_packet_out_lengths() {
        let msg = PacketOutBuilder::new(V1_3)
            .in_port(PortNumber::CONTROLLER)
            .data(Bytes::from_static(&[1, 2, 3, 4]))
            .finish()
            .unwrap();
        assert_eq!(msg.header.length, 28);
        assert_eq!(PacketOutBuilder::new(V1_0).finish().unwrap().header.length, 16);
    }

    #[test]
    fn test_buffered_packet_out_with_data_rejected() {
        let res = PacketOutBuilder::new(V1_3)
            .buffer_id(7)
            .data(Bytes::from_static(&[1]))
            .finish();
        assert!(res.is_err());
    }

    #[test]
    fn test_header_only_kinds() {
        let msg = header_only(V1_3, MessageType::BarrierRequest).unwrap();
        assert_eq!(msg.header.length, 8);
        assert!(header_only(V1_3, MessageType::FlowMod).is_err());
    }

    #[test]
    fn test_version_gated_builders() {
        assert!(
            GroupModBuilder::new(V1_0, GroupModCommand::Add, GroupType::All, 1).finish().is_err()
        );
        assert!(
            GroupModBuilder::new(V1_3, GroupModCommand::Add, GroupType::All, 1).finish().is_ok()
        );
        assert!(RoleRequestBuilder::new(V1_1, ControllerRole::Master).finish().is_err());
        assert!(MeterModBuilder::new(V1_1, MeterModCommand::Add, 1).finish().is_err());
    }

    #[test]
    fn test_unsupported_versions_rejected_at_build() {
        // non-negotiable versions fail at construction, not at encode
        assert!(matches!(
            FlowModBuilder::new(V1_1, FlowModCommand::Add).finish(),
            Err(crate::protocol::error::Error::VersionNotSupported { .. })
        ));
        assert!(EchoBuilder::request(V1_1).finish().is_err());
        // hello and error stay exempt, so negotiation can answer any peer
        assert!(HelloBuilder::new(V1_1).finish().is_ok());
        assert!(ErrorBuilder::new(V1_1, ErrorType::HelloFailed, 0).finish().is_ok());
    }

    #[test]
    fn test_hello_with_bitmap() {
        let msg = HelloBuilder::new(V1_3)
            .version_bitmap(vec![V1_0, V1_3])
            .finish()
            .unwrap();
        assert_eq!(msg.header.length, 16);
    }
}
