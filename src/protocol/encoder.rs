//! Message encoding
//!
//! The body is rendered first so the header can be stamped with the
//! true length; whatever length the caller left in the header is
//! ignored. Every message is validated before any bytes are written, so
//! a failed encode never emits a partial message.

use bytes::Bytes;

use super::bitmap::encode_bitmap;
use super::buffer::PacketWriter;
use super::codes::{FlowRemovedReason, PacketInReason, PortReason};
use super::error::{Error, Result};
use super::factory::check_version_supported;
use super::flags::ConfigFlag;
use super::header::{Header, MessageType, OFM_HEADER_LEN};
use super::message::*;
use super::structures::bucket::write_bucket_list;
use super::structures::hello_elem::write_hello_elems;
use super::structures::meter_band::write_band_list;
use super::structures::port::PortNumber;
use super::subcodec::{write_action_list, action_list_length, write_instruction_list};
use super::version::ProtocolVersion;
use super::version::ProtocolVersion::{V1_0, V1_2, V1_3};

/// Encode a message to its wire form.
///
/// The header length field is computed here; the caller's value is
/// ignored. Hello and error messages encode for any version, matching
/// the parse-side exemption.
pub fn encode_message(msg: &Message) -> Result<Bytes> {
    msg.validate()?;
    let exempt = matches!(msg.message_type(), MessageType::Hello | MessageType::Error);
    if !exempt {
        check_version_supported(msg.version())?;
    }

    let mut body = PacketWriter::with_capacity(64);
    write_body(&mut body, msg)?;

    let length = OFM_HEADER_LEN + body.len();
    if length > u16::MAX as usize {
        return Err(Error::BufferOverflow { needed: length, room: u16::MAX as usize });
    }
    let mut w = PacketWriter::with_capacity(length);
    let header = Header { length: length as u16, ..msg.header };
    header.write(&mut w)?;
    w.write_bytes(&body.into_vec());
    Ok(w.into_bytes())
}

fn write_body(w: &mut PacketWriter, msg: &Message) -> Result<()> {
    let pv = msg.version();
    match &msg.body {
        Body::Hello(b) => {
            write_hello_elems(&b.elements, w);
            Ok(())
        }
        Body::Error(b) => write_error(w, b, pv),
        Body::EchoRequest(b) | Body::EchoReply(b) => {
            w.write_bytes(&b.data);
            Ok(())
        }
        Body::Experimenter(b) => {
            w.write_u32(b.experimenter);
            if pv > V1_0 {
                w.write_u32(b.exp_type);
            }
            w.write_bytes(&b.data);
            Ok(())
        }
        Body::FeaturesRequest
        | Body::GetConfigRequest
        | Body::BarrierRequest
        | Body::BarrierReply
        | Body::GetAsyncRequest => Ok(()),
        Body::FeaturesReply(b) => write_features_reply(w, b, pv),
        Body::GetConfigReply(b) | Body::SetConfig(b) => write_switch_config(w, b, pv),
        Body::PacketIn(b) => write_packet_in(w, b, pv),
        Body::FlowRemoved(b) => write_flow_removed(w, b, pv),
        Body::PortStatus(b) => {
            w.write_u8(b.reason.code(pv)? as u8);
            w.write_zeros(7);
            b.port.write(w, pv)
        }
        Body::PacketOut(b) => write_packet_out(w, b, pv),
        Body::FlowMod(b) => write_flow_mod(w, b, pv),
        Body::GroupMod(b) => {
            w.write_u16(b.command.code(pv)? as u16);
            w.write_u8(b.group_type.code(pv)? as u8);
            w.write_zeros(1);
            w.write_u32(b.group_id);
            write_bucket_list(&b.buckets, w);
            Ok(())
        }
        Body::PortMod(b) => write_port_mod(w, b, pv),
        Body::TableMod(b) => {
            w.write_u8(b.table_id);
            w.write_zeros(3);
            w.write_u32(encode_bitmap(&b.config, pv)?);
            Ok(())
        }
        Body::MultipartRequest(b) => {
            write_multipart_header(w, b.mp_type.code(pv)? as u16, encode_bitmap(&b.flags, pv)?, pv);
            write_multipart_payload(w, &b.payload, pv)
        }
        Body::MultipartReply(b) => {
            write_multipart_header(w, b.mp_type.code(pv)? as u16, encode_bitmap(&b.flags, pv)?, pv);
            write_multipart_payload(w, &b.payload, pv)
        }
        Body::QueueGetConfigRequest(b) => {
            PortNumber::write(b.port, w, pv)?;
            w.write_zeros(if pv == V1_0 { 2 } else { 4 });
            Ok(())
        }
        Body::QueueGetConfigReply(b) => {
            PortNumber::write(b.port, w, pv)?;
            w.write_zeros(if pv == V1_0 { 6 } else { 4 });
            for q in &b.queues {
                q.write(w, pv)?;
            }
            Ok(())
        }
        Body::RoleRequest(b) | Body::RoleReply(b) => {
            w.write_u32(b.role.code(pv)?);
            w.write_zeros(4);
            w.write_u64(b.generation_id);
            Ok(())
        }
        Body::GetAsyncReply(b) | Body::SetAsync(b) => write_async_config(w, b, pv),
        Body::MeterMod(b) => {
            w.write_u16(b.command.code(pv)? as u16);
            w.write_u16(encode_bitmap(&b.flags, pv)? as u16);
            w.write_u32(b.meter_id);
            write_band_list(&b.bands, w, pv)
        }
    }
}

fn write_error(w: &mut PacketWriter, b: &ErrorBody, pv: ProtocolVersion) -> Result<()> {
    w.write_u16(b.error_type.code(pv)? as u16);
    match b.detail {
        ErrorDetail::Standard { code } => w.write_u16(code),
        ErrorDetail::Experimenter { exp_type, experimenter } => {
            w.write_u16(exp_type);
            w.write_u32(experimenter);
        }
    }
    w.write_bytes(&b.data);
    Ok(())
}

fn write_features_reply(w: &mut PacketWriter, b: &FeaturesReplyBody, pv: ProtocolVersion) -> Result<()> {
    w.write_u64(b.datapath_id);
    w.write_u32(b.num_buffers);
    w.write_u8(b.num_tables);
    if pv == V1_3 {
        w.write_u8(b.auxiliary_id);
        w.write_zeros(2);
    } else {
        w.write_zeros(3);
    }
    w.write_u32(encode_bitmap(&b.capabilities, pv)?);
    if pv == V1_0 {
        w.write_u32(encode_bitmap(&b.supported_actions, pv)?);
    } else {
        w.write_zeros(4); // reserved
    }
    if pv != V1_3 {
        for p in &b.ports {
            p.write(w, pv)?;
        }
    }
    Ok(())
}

fn write_switch_config(w: &mut PacketWriter, b: &SwitchConfigBody, pv: ProtocolVersion) -> Result<()> {
    w.write_u16(ConfigFlag::encode_bitmap(&b.flags, pv)? as u16);
    w.write_u16(b.miss_send_length);
    Ok(())
}

fn write_packet_in(w: &mut PacketWriter, b: &PacketInBody, pv: ProtocolVersion) -> Result<()> {
    w.write_u32(b.buffer_id);
    match pv {
        V1_0 => {
            w.write_u16(b.total_length);
            let in_port =
                b.in_port.ok_or(Error::IncompleteMessage { what: "PacketIn in_port" })?;
            PortNumber::write(in_port, w, pv)?;
            w.write_u8(b.reason.code(pv)? as u8);
            w.write_zeros(1);
        }
        ProtocolVersion::V1_1 => {
            let in_port =
                b.in_port.ok_or(Error::IncompleteMessage { what: "PacketIn in_port" })?;
            w.write_u32(in_port);
            w.write_u32(b.in_phy_port.unwrap_or(in_port));
            w.write_u16(b.total_length);
            w.write_u8(b.reason.code(pv)? as u8);
            w.write_u8(b.table_id.unwrap_or(0));
        }
        _ => {
            w.write_u16(b.total_length);
            w.write_u8(b.reason.code(pv)? as u8);
            w.write_u8(b.table_id.unwrap_or(0));
            if pv == V1_3 {
                w.write_u64(b.cookie.unwrap_or(0));
            }
            let m = b
                .match_fields
                .as_ref()
                .ok_or(Error::IncompleteMessage { what: "PacketIn match" })?;
            m.write(w, pv)?;
            w.write_zeros(2);
        }
    }
    w.write_bytes(&b.data);
    Ok(())
}

fn write_flow_removed(w: &mut PacketWriter, b: &FlowRemovedBody, pv: ProtocolVersion) -> Result<()> {
    if pv == V1_0 {
        b.match_fields.write(w, pv)?;
        w.write_u64(b.cookie);
        w.write_u16(b.priority);
        w.write_u8(b.reason.code(pv)? as u8);
        w.write_zeros(1);
        w.write_u32(b.duration_seconds);
        w.write_u32(b.duration_nanoseconds);
        w.write_u16(b.idle_timeout);
        w.write_zeros(2);
        w.write_u64(b.packet_count);
        w.write_u64(b.byte_count);
        return Ok(());
    }
    w.write_u64(b.cookie);
    w.write_u16(b.priority);
    w.write_u8(b.reason.code(pv)? as u8);
    w.write_u8(b.table_id.unwrap_or(0));
    w.write_u32(b.duration_seconds);
    w.write_u32(b.duration_nanoseconds);
    w.write_u16(b.idle_timeout);
    if pv == V1_3 {
        w.write_u16(b.hard_timeout.unwrap_or(0));
    } else {
        w.write_zeros(2);
    }
    w.write_u64(b.packet_count);
    w.write_u64(b.byte_count);
    b.match_fields.write(w, pv)
}

fn write_packet_out(w: &mut PacketWriter, b: &PacketOutBody, pv: ProtocolVersion) -> Result<()> {
    w.write_u32(b.buffer_id);
    PortNumber::write(b.in_port, w, pv)?;
    w.write_u16(action_list_length(&b.actions) as u16);
    if pv > V1_0 {
        w.write_zeros(6);
    }
    write_action_list(&b.actions, w);
    w.write_bytes(&b.data);
    Ok(())
}

fn write_flow_mod(w: &mut PacketWriter, b: &FlowModBody, pv: ProtocolVersion) -> Result<()> {
    if pv == V1_0 {
        b.match_fields.write(w, pv)?;
        w.write_u64(b.cookie);
        w.write_u16(b.command.code(pv)? as u16);
        w.write_u16(b.idle_timeout);
        w.write_u16(b.hard_timeout);
        w.write_u16(b.priority);
        w.write_u32(b.buffer_id);
        PortNumber::write(b.out_port, w, pv)?;
        w.write_u16(encode_bitmap(&b.flags, pv)? as u16);
        write_action_list(&b.actions, w);
        return Ok(());
    }
    w.write_u64(b.cookie);
    w.write_u64(b.cookie_mask.unwrap_or(0));
    w.write_u8(b.table_id.ok_or(Error::IncompleteMessage { what: "FlowMod table_id" })?);
    w.write_u8(b.command.code(pv)? as u8);
    w.write_u16(b.idle_timeout);
    w.write_u16(b.hard_timeout);
    w.write_u16(b.priority);
    w.write_u32(b.buffer_id);
    PortNumber::write(b.out_port, w, pv)?;
    w.write_u32(b.out_group.unwrap_or(GROUP_ANY));
    w.write_u16(encode_bitmap(&b.flags, pv)? as u16);
    w.write_zeros(2);
    b.match_fields.write(w, pv)?;
    write_instruction_list(&b.instructions, w);
    Ok(())
}

fn write_port_mod(w: &mut PacketWriter, b: &PortModBody, pv: ProtocolVersion) -> Result<()> {
    PortNumber::write(b.port_number, w, pv)?;
    if pv > V1_0 {
        w.write_zeros(4);
    }
    w.write_bytes(&b.hw_address);
    if pv > V1_0 {
        w.write_zeros(2);
    }
    w.write_u32(encode_bitmap(&b.config, pv)?);
    w.write_u32(encode_bitmap(&b.config_mask, pv)?);
    w.write_u32(encode_bitmap(&b.advertise, pv)?);
    w.write_zeros(4);
    Ok(())
}

fn write_multipart_header(w: &mut PacketWriter, code: u16, flags: u32, pv: ProtocolVersion) {
    w.write_u16(code);
    w.write_u16(flags as u16);
    if pv >= V1_2 {
        w.write_zeros(4);
    }
}

fn write_multipart_payload(
    w: &mut PacketWriter,
    payload: &MultipartPayload,
    pv: ProtocolVersion,
) -> Result<()> {
    match payload {
        MultipartPayload::TableFeatures(features) => {
            for f in features {
                f.write(w, pv)?;
            }
            Ok(())
        }
        MultipartPayload::PortDesc(ports) => {
            for p in ports {
                p.write(w, pv)?;
            }
            Ok(())
        }
        MultipartPayload::Raw(data) => {
            w.write_bytes(data);
            Ok(())
        }
    }
}

fn write_async_config(w: &mut PacketWriter, b: &AsyncConfigBody, pv: ProtocolVersion) -> Result<()> {
    super::version::ver_min_1_3(pv, "AsyncConfig")?;
    for mask in &b.packet_in_mask {
        w.write_u32(PacketInReason::encode_flags(mask, pv)?);
    }
    for mask in &b.port_status_mask {
        w.write_u32(PortReason::encode_flags(mask, pv)?);
    }
    for mask in &b.flow_removed_mask {
        w.write_u32(FlowRemovedReason::encode_flags(mask, pv)?);
    }
    Ok(())
}
