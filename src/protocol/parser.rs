//! Message parsing
//!
//! [`parse_message`] pulls one complete message off a reader. The
//! length field is peeked before anything is consumed, so a partial
//! message leaves the cursor untouched and returns `Ok(None)`; the
//! caller reads more bytes and retries. When a body fails to parse the
//! cursor is forced to the next message boundary, so one bad message
//! does not desynchronize the stream, and the failure is wrapped with
//! the offending header and a hex snippet.

use tracing::warn;

use super::buffer::PacketReader;
use super::codes::{
    ControllerRole, ErrorType, FlowModCommand, FlowRemovedReason, GroupModCommand, GroupType,
    MeterModCommand, MultipartType, PacketInReason, PortReason,
};
use super::error::{Error, Result};
use super::factory::check_version_supported;
use super::bitmap::decode_bitmap;
use super::flags::ConfigFlag;
use super::header::{Header, MessageType, OFM_HEADER_LEN};
use super::message::*;
use super::structures::hello_elem::parse_hello_elems;
use super::structures::meter_band::parse_band_list;
use super::structures::port::{Port, PortNumber, parse_port_list};
use super::structures::queue::parse_queue_list;
use super::structures::table_feature::parse_table_feature_list;
use super::structures::bucket::parse_bucket_list;
use super::subcodec::{Match, parse_action_list, parse_instruction_list};
use super::version::ProtocolVersion;
use super::version::ProtocolVersion::{V1_0, V1_1, V1_2, V1_3};

/// Cap on the hex snippet included in wrapped parse failures.
const HEX_SNIPPET_MAX: usize = 64;

/// Parse one message, or `Ok(None)` if the reader does not yet hold a
/// complete one.
///
/// Hello and error messages parse regardless of version support, so
/// negotiation and peer complaints always get through; anything else in
/// an unsupported version fails with
/// [`Error::VersionNotSupported`](crate::protocol::Error), unwrapped.
pub fn parse_message(reader: &mut PacketReader) -> Result<Option<Message>> {
    if reader.remaining() < OFM_HEADER_LEN {
        return Ok(None);
    }
    let declared = reader.peek_u16(2)? as usize;
    if reader.remaining() < declared {
        return Ok(None);
    }

    let start = reader.pos();
    let target = start + declared;
    reader.set_start(start);
    reader.set_target(target);

    let header = match Header::parse(reader) {
        Ok(h) => h,
        Err(e) => {
            resync(reader, start, target);
            return Err(e);
        }
    };

    let exempt = matches!(header.message_type, MessageType::Hello | MessageType::Error);
    if !exempt {
        if let Err(e) = check_version_supported(header.version) {
            resync(reader, start, target);
            return Err(e);
        }
    }

    match read_body(reader, &header, target) {
        Ok(body) => {
            if reader.pos() != target {
                let e = Error::LengthMismatch {
                    what: "Message",
                    declared,
                    actual: reader.pos() - start,
                };
                let wrapped = wrap(e, &header, reader, start);
                resync(reader, start, target);
                return Err(wrapped);
            }
            Ok(Some(Message { header, body }))
        }
        Err(e) => {
            let wrapped = wrap(e, &header, reader, start);
            resync(reader, start, target);
            Err(wrapped)
        }
    }
}

// Never resync backwards into the fixed header, or a corrupt length
// field would make the caller re-parse the same bytes forever.
fn resync(reader: &mut PacketReader, start: usize, target: usize) {
    let floor = start + OFM_HEADER_LEN;
    reader.set_pos(target.max(floor).min(reader.limit()));
}

fn wrap(err: Error, header: &Header, reader: &PacketReader, start: usize) -> Error {
    if err.is_version_unsupported() {
        return err;
    }
    let snippet = reader.hex_snippet(start, HEX_SNIPPET_MAX);
    warn!(header = %header, data = %snippet, error = %err, "message body failed to parse");
    Error::Parse { context: format!("{header} data=[{snippet}]"), source: Box::new(err) }
}

fn read_body(reader: &mut PacketReader, header: &Header, target: usize) -> Result<Body> {
    let pv = header.version;
    Ok(match header.message_type {
        MessageType::Hello => Body::Hello(read_hello(reader, target)?),
        MessageType::Error => Body::Error(read_error(reader, pv, target)?),
        MessageType::EchoRequest => Body::EchoRequest(read_echo(reader, target)?),
        MessageType::EchoReply => Body::EchoReply(read_echo(reader, target)?),
        MessageType::Experimenter => Body::Experimenter(read_experimenter(reader, pv, target)?),
        MessageType::FeaturesRequest => Body::FeaturesRequest,
        MessageType::FeaturesReply => Body::FeaturesReply(read_features_reply(reader, pv, target)?),
        MessageType::GetConfigRequest => Body::GetConfigRequest,
        MessageType::GetConfigReply => Body::GetConfigReply(read_switch_config(reader, pv)?),
        MessageType::SetConfig => Body::SetConfig(read_switch_config(reader, pv)?),
        MessageType::PacketIn => Body::PacketIn(read_packet_in(reader, pv, target)?),
        MessageType::FlowRemoved => Body::FlowRemoved(read_flow_removed(reader, pv)?),
        MessageType::PortStatus => Body::PortStatus(read_port_status(reader, pv)?),
        MessageType::PacketOut => Body::PacketOut(read_packet_out(reader, pv, target)?),
        MessageType::FlowMod => Body::FlowMod(read_flow_mod(reader, pv, target)?),
        MessageType::GroupMod => Body::GroupMod(read_group_mod(reader, pv, target)?),
        MessageType::PortMod => Body::PortMod(read_port_mod(reader, pv)?),
        MessageType::TableMod => Body::TableMod(read_table_mod(reader, pv)?),
        MessageType::MultipartRequest => {
            Body::MultipartRequest(read_multipart_request(reader, pv, target)?)
        }
        MessageType::MultipartReply => {
            Body::MultipartReply(read_multipart_reply(reader, pv, target)?)
        }
        MessageType::BarrierRequest => Body::BarrierRequest,
        MessageType::BarrierReply => Body::BarrierReply,
        MessageType::QueueGetConfigRequest => {
            Body::QueueGetConfigRequest(read_queue_cfg_request(reader, pv)?)
        }
        MessageType::QueueGetConfigReply => {
            Body::QueueGetConfigReply(read_queue_cfg_reply(reader, pv, target)?)
        }
        MessageType::RoleRequest => Body::RoleRequest(read_role(reader, pv)?),
        MessageType::RoleReply => Body::RoleReply(read_role(reader, pv)?),
        MessageType::GetAsyncRequest => Body::GetAsyncRequest,
        MessageType::GetAsyncReply => Body::GetAsyncReply(read_async_config(reader, pv)?),
        MessageType::SetAsync => Body::SetAsync(read_async_config(reader, pv)?),
        MessageType::MeterMod => Body::MeterMod(read_meter_mod(reader, pv, target)?),
    })
}

fn read_hello(reader: &mut PacketReader, target: usize) -> Result<HelloBody> {
    // elements are parsed for any declared version, or negotiation with
    // a newer peer could never start
    Ok(HelloBody { elements: parse_hello_elems(reader, target)? })
}

fn read_error(reader: &mut PacketReader, pv: ProtocolVersion, target: usize) -> Result<ErrorBody> {
    let type_code = reader.read_u16()?;
    let error_type = ErrorType::decode(type_code.into(), pv)?;
    let detail = if error_type == ErrorType::Experimenter {
        let exp_type = reader.read_u16()?;
        let experimenter = reader.read_u32()?;
        ErrorDetail::Experimenter { exp_type, experimenter }
    } else {
        ErrorDetail::Standard { code: reader.read_u16()? }
    };
    let data = reader.read_bytes(target - reader.pos())?;
    Ok(ErrorBody { error_type, detail, data })
}

fn read_echo(reader: &mut PacketReader, target: usize) -> Result<EchoBody> {
    Ok(EchoBody { data: reader.read_bytes(target - reader.pos())? })
}

fn read_experimenter(
    reader: &mut PacketReader,
    pv: ProtocolVersion,
    target: usize,
) -> Result<ExperimenterBody> {
    let experimenter = reader.read_u32()?;
    let exp_type = if pv > V1_0 { reader.read_u32()? } else { 0 };
    let data = reader.read_bytes(target - reader.pos())?;
    Ok(ExperimenterBody { experimenter, exp_type, data })
}

fn read_features_reply(
    reader: &mut PacketReader,
    pv: ProtocolVersion,
    target: usize,
) -> Result<FeaturesReplyBody> {
    let datapath_id = reader.read_u64()?;
    let num_buffers = reader.read_u32()?;
    let num_tables = reader.read_u8()?;
    let auxiliary_id = if pv == V1_3 {
        let aux = reader.read_u8()?;
        reader.skip(2)?;
        aux
    } else {
        reader.skip(3)?;
        0
    };
    let capabilities = decode_bitmap(reader.read_u32()?, pv)?;
    let supported_actions = if pv == V1_0 {
        decode_bitmap(reader.read_u32()?, pv)?
    } else {
        reader.skip(4)?; // reserved
        Vec::new()
    };
    let ports = if pv == V1_3 {
        Vec::new() // moved to the PORT_DESC multipart body
    } else {
        parse_port_list(reader, pv, target)?
    };
    Ok(FeaturesReplyBody {
        datapath_id,
        num_buffers,
        num_tables,
        auxiliary_id,
        capabilities,
        supported_actions,
        ports,
    })
}

fn read_switch_config(reader: &mut PacketReader, pv: ProtocolVersion) -> Result<SwitchConfigBody> {
    let flags = ConfigFlag::decode_bitmap(reader.read_u16()?.into(), pv)?;
    let miss_send_length = reader.read_u16()?;
    Ok(SwitchConfigBody { flags, miss_send_length })
}

fn read_packet_in(
    reader: &mut PacketReader,
    pv: ProtocolVersion,
    target: usize,
) -> Result<PacketInBody> {
    let buffer_id = reader.read_u32()?;
    match pv {
        V1_0 => {
            let total_length = reader.read_u16()?;
            let in_port = PortNumber::read(reader, pv)?;
            let reason = PacketInReason::decode(reader.read_u8()?.into(), pv)?;
            reader.skip(1)?;
            let data = reader.read_bytes(target - reader.pos())?;
            Ok(PacketInBody {
                buffer_id,
                total_length,
                in_port: Some(in_port),
                in_phy_port: None,
                reason,
                table_id: None,
                cookie: None,
                match_fields: None,
                data,
            })
        }
        V1_1 => {
            let in_port = reader.read_u32()?;
            let in_phy_port = reader.read_u32()?;
            let total_length = reader.read_u16()?;
            let reason = PacketInReason::decode(reader.read_u8()?.into(), pv)?;
            let table_id = reader.read_u8()?;
            let data = reader.read_bytes(target - reader.pos())?;
            Ok(PacketInBody {
                buffer_id,
                total_length,
                in_port: Some(in_port),
                in_phy_port: Some(in_phy_port),
                reason,
                table_id: Some(table_id),
                cookie: None,
                match_fields: None,
                data,
            })
        }
        _ => {
            let total_length = reader.read_u16()?;
            let reason = PacketInReason::decode(reader.read_u8()?.into(), pv)?;
            let table_id = reader.read_u8()?;
            let cookie = if pv == V1_3 { Some(reader.read_u64()?) } else { None };
            let match_fields = Match::parse(reader, pv)?;
            reader.skip(2)?;
            let data = reader.read_bytes(target - reader.pos())?;
            let in_port = match_fields.oxm_in_port();
            Ok(PacketInBody {
                buffer_id,
                total_length,
                in_port,
                in_phy_port: None,
                reason,
                table_id: Some(table_id),
                cookie,
                match_fields: Some(match_fields),
                data,
            })
        }
    }
}

fn read_flow_removed(reader: &mut PacketReader, pv: ProtocolVersion) -> Result<FlowRemovedBody> {
    if pv == V1_0 {
        let match_fields = Match::parse(reader, pv)?;
        let cookie = reader.read_u64()?;
        let priority = reader.read_u16()?;
        let reason = FlowRemovedReason::decode(reader.read_u8()?.into(), pv)?;
        reader.skip(1)?;
        let duration_seconds = reader.read_u32()?;
        let duration_nanoseconds = reader.read_u32()?;
        let idle_timeout = reader.read_u16()?;
        reader.skip(2)?;
        let packet_count = reader.read_u64()?;
        let byte_count = reader.read_u64()?;
        return Ok(FlowRemovedBody {
            cookie,
            priority,
            reason,
            table_id: None,
            duration_seconds,
            duration_nanoseconds,
            idle_timeout,
            hard_timeout: None,
            packet_count,
            byte_count,
            match_fields,
        });
    }
    let cookie = reader.read_u64()?;
    let priority = reader.read_u16()?;
    let reason = FlowRemovedReason::decode(reader.read_u8()?.into(), pv)?;
    let table_id = reader.read_u8()?;
    let duration_seconds = reader.read_u32()?;
    let duration_nanoseconds = reader.read_u32()?;
    let idle_timeout = reader.read_u16()?;
    let hard_timeout = if pv == V1_3 {
        Some(reader.read_u16()?)
    } else {
        reader.skip(2)?;
        None
    };
    let packet_count = reader.read_u64()?;
    let byte_count = reader.read_u64()?;
    let match_fields = Match::parse(reader, pv)?;
    Ok(FlowRemovedBody {
        cookie,
        priority,
        reason,
        table_id: Some(table_id),
        duration_seconds,
        duration_nanoseconds,
        idle_timeout,
        hard_timeout,
        packet_count,
        byte_count,
        match_fields,
    })
}

fn read_port_status(reader: &mut PacketReader, pv: ProtocolVersion) -> Result<PortStatusBody> {
    let reason = PortReason::decode(reader.read_u8()?.into(), pv)?;
    reader.skip(7)?;
    let port = Port::parse(reader, pv)?;
    Ok(PortStatusBody { reason, port })
}

fn read_packet_out(
    reader: &mut PacketReader,
    pv: ProtocolVersion,
    target: usize,
) -> Result<PacketOutBody> {
    let buffer_id = reader.read_u32()?;
    let in_port = PortNumber::read(reader, pv)?;
    let actions_length = reader.read_u16()? as usize;
    if pv > V1_0 {
        reader.skip(6)?;
    }
    let actions_end = reader.pos() + actions_length;
    if actions_end > target {
        return Err(Error::IncompleteStructure { what: "PacketOut actions" });
    }
    let actions = parse_action_list(reader, actions_end)?;
    let data = reader.read_bytes(target - reader.pos())?;
    Ok(PacketOutBody { buffer_id, in_port, actions, data })
}

fn read_flow_mod(
    reader: &mut PacketReader,
    pv: ProtocolVersion,
    target: usize,
) -> Result<FlowModBody> {
    if pv == V1_0 {
        let match_fields = Match::parse(reader, pv)?;
        let cookie = reader.read_u64()?;
        let command = FlowModCommand::decode(reader.read_u16()?.into(), pv)?;
        let idle_timeout = reader.read_u16()?;
        let hard_timeout = reader.read_u16()?;
        let priority = reader.read_u16()?;
        let buffer_id = reader.read_u32()?;
        let out_port = PortNumber::read(reader, pv)?;
        let flags = decode_bitmap(reader.read_u16()?.into(), pv)?;
        let actions = parse_action_list(reader, target)?;
        return Ok(FlowModBody {
            cookie,
            cookie_mask: None,
            table_id: None,
            command,
            idle_timeout,
            hard_timeout,
            priority,
            buffer_id,
            out_port,
            out_group: None,
            flags,
            match_fields,
            actions,
            instructions: Vec::new(),
        });
    }
    let cookie = reader.read_u64()?;
    let cookie_mask = reader.read_u64()?;
    let table_id = reader.read_u8()?;
    let command = FlowModCommand::decode(reader.read_u8()?.into(), pv)?;
    let idle_timeout = reader.read_u16()?;
    let hard_timeout = reader.read_u16()?;
    let priority = reader.read_u16()?;
    let buffer_id = reader.read_u32()?;
    let out_port = PortNumber::read(reader, pv)?;
    let out_group = reader.read_u32()?;
    let flags = decode_bitmap(reader.read_u16()?.into(), pv)?;
    reader.skip(2)?;
    let match_fields = Match::parse(reader, pv)?;
    let instructions = parse_instruction_list(reader, target)?;
    Ok(FlowModBody {
        cookie,
        cookie_mask: Some(cookie_mask),
        table_id: Some(table_id),
        command,
        idle_timeout,
        hard_timeout,
        priority,
        buffer_id,
        out_port,
        out_group: Some(out_group),
        flags,
        match_fields,
        actions: Vec::new(),
        instructions,
    })
}

fn read_group_mod(
    reader: &mut PacketReader,
    pv: ProtocolVersion,
    target: usize,
) -> Result<GroupModBody> {
    let command = GroupModCommand::decode(reader.read_u16()?.into(), pv)?;
    let group_type = GroupType::decode(reader.read_u8()?.into(), pv)?;
    reader.skip(1)?;
    let group_id = reader.read_u32()?;
    let buckets = parse_bucket_list(reader, pv, target)?;
    Ok(GroupModBody { command, group_type, group_id, buckets })
}

fn read_port_mod(reader: &mut PacketReader, pv: ProtocolVersion) -> Result<PortModBody> {
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
    let config = decode_bitmap(reader.read_u32()?, pv)?;
    let config_mask = decode_bitmap(reader.read_u32()?, pv)?;
    let advertise = decode_bitmap(reader.read_u32()?, pv)?;
    reader.skip(4)?;
    Ok(PortModBody { port_number, hw_address, config, config_mask, advertise })
}

fn read_table_mod(reader: &mut PacketReader, pv: ProtocolVersion) -> Result<TableModBody> {
    super::version::ver_min_1_1(pv, "TableMod")?;
    let table_id = reader.read_u8()?;
    reader.skip(3)?;
    let config = decode_bitmap(reader.read_u32()?, pv)?;
    Ok(TableModBody { table_id, config })
}

fn read_multipart_header(
    reader: &mut PacketReader,
    pv: ProtocolVersion,
) -> Result<(MultipartType, u16)> {
    let mp_type = MultipartType::decode(reader.read_u16()?.into(), pv)?;
    let flags = reader.read_u16()?;
    if pv >= V1_2 {
        reader.skip(4)?;
    }
    Ok((mp_type, flags))
}

fn read_multipart_payload(
    reader: &mut PacketReader,
    pv: ProtocolVersion,
    mp_type: MultipartType,
    target: usize,
    reply: bool,
) -> Result<MultipartPayload> {
    match mp_type {
        MultipartType::TableFeatures => Ok(MultipartPayload::TableFeatures(
            parse_table_feature_list(reader, pv, target)?,
        )),
        MultipartType::PortDesc if reply => {
            Ok(MultipartPayload::PortDesc(parse_port_list(reader, pv, target)?))
        }
        _ => Ok(MultipartPayload::Raw(reader.read_bytes(target - reader.pos())?)),
    }
}

fn read_multipart_request(
    reader: &mut PacketReader,
    pv: ProtocolVersion,
    target: usize,
) -> Result<MultipartRequestBody> {
    let (mp_type, raw_flags) = read_multipart_header(reader, pv)?;
    let flags = decode_bitmap(raw_flags.into(), pv)?;
    let payload = read_multipart_payload(reader, pv, mp_type, target, false)?;
    Ok(MultipartRequestBody { mp_type, flags, payload })
}

fn read_multipart_reply(
    reader: &mut PacketReader,
    pv: ProtocolVersion,
    target: usize,
) -> Result<MultipartReplyBody> {
    let (mp_type, raw_flags) = read_multipart_header(reader, pv)?;
    let flags = decode_bitmap(raw_flags.into(), pv)?;
    let payload = read_multipart_payload(reader, pv, mp_type, target, true)?;
    Ok(MultipartReplyBody { mp_type, flags, payload })
}

fn read_queue_cfg_request(
    reader: &mut PacketReader,
    pv: ProtocolVersion,
) -> Result<QueueGetConfigRequestBody> {
    let port = PortNumber::read(reader, pv)?;
    reader.skip(if pv == V1_0 { 2 } else { 4 })?;
    Ok(QueueGetConfigRequestBody { port })
}

fn read_queue_cfg_reply(
    reader: &mut PacketReader,
    pv: ProtocolVersion,
    target: usize,
) -> Result<QueueGetConfigReplyBody> {
    let port = PortNumber::read(reader, pv)?;
    reader.skip(if pv == V1_0 { 6 } else { 4 })?;
    let queues = parse_queue_list(reader, pv, target)?;
    Ok(QueueGetConfigReplyBody { port, queues })
}

fn read_role(reader: &mut PacketReader, pv: ProtocolVersion) -> Result<RoleBody> {
    let role = ControllerRole::decode(reader.read_u32()?, pv)?;
    reader.skip(4)?;
    let generation_id = reader.read_u64()?;
    Ok(RoleBody { role, generation_id })
}

fn read_async_config(reader: &mut PacketReader, pv: ProtocolVersion) -> Result<AsyncConfigBody> {
    super::version::ver_min_1_3(pv, "AsyncConfig")?;
    let packet_in_mask = [
        PacketInReason::decode_flags(reader.read_u32()?, pv)?,
        PacketInReason::decode_flags(reader.read_u32()?, pv)?,
    ];
    let port_status_mask = [
        PortReason::decode_flags(reader.read_u32()?, pv)?,
        PortReason::decode_flags(reader.read_u32()?, pv)?,
    ];
    let flow_removed_mask = [
        FlowRemovedReason::decode_flags(reader.read_u32()?, pv)?,
        FlowRemovedReason::decode_flags(reader.read_u32()?, pv)?,
    ];
    Ok(AsyncConfigBody { packet_in_mask, port_status_mask, flow_removed_mask })
}

fn read_meter_mod(
    reader: &mut PacketReader,
    pv: ProtocolVersion,
    target: usize,
) -> Result<MeterModBody> {
    let command = MeterModCommand::decode(reader.read_u16()?.into(), pv)?;
    let flags = decode_bitmap(reader.read_u16()?.into(), pv)?;
    let meter_id = reader.read_u32()?;
    let bands = parse_band_list(reader, pv, target)?;
    Ok(MeterModBody { command, flags, meter_id, bands })
}
