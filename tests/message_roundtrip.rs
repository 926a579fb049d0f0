//! End-to-end codec coverage: build, encode, parse back, compare.

use bytes::Bytes;

use ofwire::protocol::codes::{
    ControllerRole, ErrorType, FlowModCommand, GroupModCommand, GroupType, MeterModCommand,
    MultipartType, PacketInReason,
};
use ofwire::protocol::flags::{ConfigFlag, FlowModFlag, MeterFlag};
use ofwire::protocol::message::{Body, NO_BUFFER, PacketInBody};
use ofwire::protocol::structures::{Bucket, MeterBand, PortNumber};
use ofwire::protocol::{
    Action, EchoBuilder, ErrorBuilder, ExperimenterBuilder, FlowModBuilder, GroupModBuilder,
    Header, HelloBuilder, Instruction, Match, MeterModBuilder, MultipartRequestBuilder,
    PacketOutBuilder, PortModBuilder, QueueGetConfigRequestBuilder, RoleRequestBuilder,
    SetAsyncBuilder, SetConfigBuilder, TableModBuilder, header_only,
};
use ofwire::ProtocolVersion::{V1_0, V1_1, V1_3};
use ofwire::{
    Error, Message, MessageType, PacketReader, ProtocolVersion, encode_message, parse_message,
};

/// Encode, check the stamped length, parse back, and require the reader
/// to be fully drained.
fn roundtrip(msg: &Message) -> Message {
    let bytes = encode_message(msg).expect("encode");
    assert_eq!(bytes.len(), usize::from(msg.header.length), "stamped length");
    let mut reader = PacketReader::new(bytes);
    let parsed = parse_message(&mut reader).expect("parse").expect("complete message");
    assert_eq!(reader.remaining(), 0);
    parsed
}

#[test]
fn test_hello_roundtrip() {
    let msg = HelloBuilder::new(V1_3).version_bitmap(vec![V1_0, V1_3]).finish().unwrap();
    let parsed = roundtrip(&msg);
    assert_eq!(parsed, msg);

    let plain = HelloBuilder::new(V1_0).finish().unwrap();
    assert_eq!(roundtrip(&plain), plain);
}

#[test]
fn test_echo_roundtrip_both_versions() {
    for pv in [V1_0, V1_3] {
        let msg = EchoBuilder::request(pv).data(Bytes::from_static(b"ping")).finish().unwrap();
        assert_eq!(roundtrip(&msg), msg);
        let reply = EchoBuilder::reply(pv).data(Bytes::from_static(b"ping")).finish().unwrap();
        assert_eq!(roundtrip(&reply), reply);
    }
}

#[test]
fn test_error_roundtrip() {
    let msg = ErrorBuilder::new(V1_3, ErrorType::BadRequest, 2)
        .data(Bytes::from_static(&[0x04, 0x0e, 0x00, 0x08]))
        .finish()
        .unwrap();
    assert_eq!(roundtrip(&msg), msg);

    let exp = ErrorBuilder::experimenter(V1_3, 17, 0x00ff_ffaa).finish().unwrap();
    assert_eq!(roundtrip(&exp), exp);
}

#[test]
fn test_error_parses_in_unsupported_version() {
    // peer complaints always get through, whatever version they speak
    let msg = ErrorBuilder::new(V1_1, ErrorType::HelloFailed, 0)
        .data(Bytes::from_static(b"no common version"))
        .finish()
        .unwrap();
    let parsed = roundtrip(&msg);
    let Body::Error(body) = &parsed.body else { panic!() };
    assert_eq!(body.hello_failed_message().as_deref(), Some("no common version"));
}

#[test]
fn test_flow_mod_roundtrip_v1_0() {
    let output = Action { action_type: 0, body: Bytes::from_static(&[0x00, 0x01, 0xff, 0xff]) };
    let msg = FlowModBuilder::new(V1_0, FlowModCommand::Add)
        .cookie(0xdead_beef)
        .timeouts(30, 300)
        .priority(1000)
        .flags(vec![FlowModFlag::SendFlowRem])
        .action(output)
        .finish()
        .unwrap();
    assert_eq!(roundtrip(&msg), msg);
}

#[test]
fn test_flow_mod_roundtrip_v1_3() {
    // apply-actions instruction with one empty action slot
    let apply = Instruction {
        instruction_type: 4,
        body: Bytes::from_static(&[0, 0, 0, 0, 0x00, 0x00, 0x00, 0x08, 0, 0, 0, 0]),
    };
    let msg = FlowModBuilder::new(V1_3, FlowModCommand::Add)
        .cookie(7)
        .cookie_mask(0xffff_ffff_ffff_ffff)
        .table_id(3)
        .priority(200)
        .instruction(apply)
        .finish()
        .unwrap();
    assert_eq!(roundtrip(&msg), msg);
}

#[test]
fn test_flow_mod_delete_filters_roundtrip() {
    let msg = FlowModBuilder::new(V1_3, FlowModCommand::Delete)
        .out_port(PortNumber::CONTROLLER)
        .out_group(9)
        .finish()
        .unwrap();
    let parsed = roundtrip(&msg);
    let Body::FlowMod(fm) = &parsed.body else { panic!() };
    assert_eq!(fm.out_port, PortNumber::CONTROLLER);
    assert_eq!(fm.out_group, Some(9));
}

#[test]
fn test_packet_out_roundtrip() {
    for pv in [V1_0, V1_3] {
        let output = Action { action_type: 0, body: Bytes::from_static(&[0x00, 0x02, 0xff, 0xff]) };
        let msg = PacketOutBuilder::new(pv)
            .in_port(PortNumber::CONTROLLER)
            .action(output)
            .data(Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]))
            .finish()
            .unwrap();
        assert_eq!(roundtrip(&msg), msg);
    }
}

#[test]
fn test_group_mod_roundtrip() {
    let output = Action { action_type: 0, body: Bytes::from_static(&[0x00, 0x03, 0xff, 0xff]) };
    let msg = GroupModBuilder::new(V1_3, GroupModCommand::Add, GroupType::All, 42)
        .bucket(Bucket::new(vec![output]))
        .finish()
        .unwrap();
    assert_eq!(roundtrip(&msg), msg);
}

#[test]
fn test_meter_mod_roundtrip() {
    let msg = MeterModBuilder::new(V1_3, MeterModCommand::Add, 5)
        .flags(vec![MeterFlag::Kbps])
        .band(MeterBand::Drop { rate: 1000, burst_size: 64 })
        .finish()
        .unwrap();
    assert_eq!(roundtrip(&msg), msg);
}

#[test]
fn test_small_message_roundtrips() {
    let msgs = vec![
        SetConfigBuilder::new(V1_3)
            .flags(vec![ConfigFlag::FragDrop])
            .miss_send_length(256)
            .finish()
            .unwrap(),
        RoleRequestBuilder::new(V1_3, ControllerRole::Master).generation_id(11).finish().unwrap(),
        SetAsyncBuilder::new(V1_3).finish().unwrap(),
        TableModBuilder::new(V1_3, 0xff).finish().unwrap(),
        PortModBuilder::new(V1_3, 6, [0, 1, 2, 3, 4, 5]).finish().unwrap(),
        PortModBuilder::new(V1_0, 6, [0, 1, 2, 3, 4, 5]).finish().unwrap(),
        QueueGetConfigRequestBuilder::new(V1_3, 2).finish().unwrap(),
        QueueGetConfigRequestBuilder::new(V1_0, 2).finish().unwrap(),
        ExperimenterBuilder::new(V1_3, 0x2320).exp_type(1).data(Bytes::from_static(&[9])).finish().unwrap(),
        MultipartRequestBuilder::new(V1_3, MultipartType::PortDesc).finish().unwrap(),
        header_only(V1_3, MessageType::FeaturesRequest).unwrap(),
        header_only(V1_3, MessageType::BarrierRequest).unwrap(),
        header_only(V1_0, MessageType::GetConfigRequest).unwrap(),
        header_only(V1_3, MessageType::GetAsyncRequest).unwrap(),
    ];
    for msg in msgs {
        assert_eq!(roundtrip(&msg), msg);
    }
}

#[test]
fn test_experimenter_v1_0_drops_exp_type() {
    let msg = ExperimenterBuilder::new(V1_0, 0x2320).exp_type(7).finish().unwrap();
    let parsed = roundtrip(&msg);
    let Body::Experimenter(body) = &parsed.body else { panic!() };
    // 1.0 has no type field on the wire
    assert_eq!(body.exp_type, 0);
}

#[test]
fn test_packet_in_recovers_in_port_from_match() {
    // OXM_OF_IN_PORT: class 0x8000, field 0, length 4
    let oxm = Bytes::from_static(&[0x80, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x07]);
    let msg = Message {
        header: Header {
            version: V1_3,
            message_type: MessageType::PacketIn,
            length: 0, // stamped on encode
            xid: 5,
        },
        body: Body::PacketIn(PacketInBody {
            buffer_id: NO_BUFFER,
            total_length: 60,
            in_port: Some(7),
            in_phy_port: None,
            reason: PacketInReason::NoMatch,
            table_id: Some(0),
            cookie: Some(0),
            match_fields: Some(Match { match_type: 1, fields: oxm }),
            data: Bytes::from_static(&[0xaa; 60]),
        }),
    };
    let bytes = encode_message(&msg).unwrap();
    let mut reader = PacketReader::new(bytes);
    let parsed = parse_message(&mut reader).unwrap().unwrap();
    let Body::PacketIn(pi) = &parsed.body else { panic!() };
    assert_eq!(pi.in_port, Some(7));
    assert_eq!(pi.table_id, Some(0));
    assert_eq!(pi.data.len(), 60);
}

#[test]
fn test_partial_buffer_returns_none() {
    let msg = EchoBuilder::request(V1_3).data(Bytes::from_static(b"wait")).finish().unwrap();
    let bytes = encode_message(&msg).unwrap();

    let mut reader = PacketReader::new(bytes.slice(..bytes.len() - 1));
    assert!(matches!(parse_message(&mut reader), Ok(None)));
    assert_eq!(reader.pos(), 0);

    // fewer than 8 bytes cannot even hold the header
    let mut reader = PacketReader::new(bytes.slice(..5));
    assert!(matches!(parse_message(&mut reader), Ok(None)));
}

#[test]
fn test_bad_body_does_not_desync_stream() {
    let mut bad = encode_message(
        &FlowModBuilder::new(V1_3, FlowModCommand::Add).finish().unwrap(),
    )
    .unwrap()
    .to_vec();
    bad[25] = 0xaa; // flow mod command slot
    let good = EchoBuilder::request(V1_3).data(Bytes::from_static(b"ok")).finish().unwrap();
    let mut stream = bad;
    stream.extend_from_slice(&encode_message(&good).unwrap());

    let mut reader = PacketReader::new(Bytes::from(stream));
    match parse_message(&mut reader) {
        Err(Error::Parse { context, .. }) => {
            assert!(context.contains("FlowMod"), "context carries the header: {context}");
        }
        other => panic!("expected wrapped parse failure, got {other:?}"),
    }
    let next = parse_message(&mut reader).unwrap().unwrap();
    assert_eq!(next.message_type(), MessageType::EchoRequest);
    assert_eq!(next, good);
}

#[test]
fn test_unsupported_version_rejected_unwrapped() {
    // 1.1 echo request; the version gate fires before the body parse
    let raw = Bytes::from_static(&[0x02, 0x02, 0x00, 0x08, 0x00, 0x00, 0x00, 0x01]);
    let mut reader = PacketReader::new(raw);
    match parse_message(&mut reader) {
        Err(Error::VersionNotSupported { version }) => assert_eq!(version, V1_1),
        other => panic!("expected version rejection, got {other:?}"),
    }
    // the cursor still moved past the message
    assert_eq!(reader.remaining(), 0);
}

#[test]
fn test_hello_exempt_from_version_gate() {
    let raw = Bytes::from_static(&[0x02, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x01]);
    let mut reader = PacketReader::new(raw);
    let msg = parse_message(&mut reader).unwrap().unwrap();
    assert_eq!(msg.message_type(), MessageType::Hello);
    assert_eq!(msg.version(), V1_1);
}

#[test]
fn test_several_messages_off_one_reader() {
    let msgs = vec![
        HelloBuilder::new(V1_3).version_bitmap(vec![V1_0, V1_3]).finish().unwrap(),
        header_only(V1_3, MessageType::FeaturesRequest).unwrap(),
        EchoBuilder::request(V1_3).finish().unwrap(),
    ];
    let mut stream = Vec::new();
    for m in &msgs {
        stream.extend_from_slice(&encode_message(m).unwrap());
    }
    let mut reader = PacketReader::new(Bytes::from(stream));
    for expected in &msgs {
        assert_eq!(&parse_message(&mut reader).unwrap().unwrap(), expected);
    }
    assert!(matches!(parse_message(&mut reader), Ok(None)));
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn version_strategy() -> impl Strategy<Value = ProtocolVersion> {
        prop_oneof![Just(V1_0), Just(V1_3)]
    }

    proptest! {
        #[test]
        fn prop_echo_roundtrip_preserves_data(
            pv in version_strategy(),
            data in prop::collection::vec(any::<u8>(), 0..=512),
        ) {
            let msg = EchoBuilder::request(pv).data(Bytes::from(data)).finish().unwrap();
            let parsed = roundtrip(&msg);
            prop_assert_eq!(parsed, msg);
        }

        #[test]
        fn prop_flow_mod_scalars_roundtrip(
            pv in version_strategy(),
            cookie in any::<u64>(),
            priority in any::<u16>(),
            idle in any::<u16>(),
            hard in any::<u16>(),
        ) {
            let msg = FlowModBuilder::new(pv, FlowModCommand::Add)
                .cookie(cookie)
                .priority(priority)
                .timeouts(idle, hard)
                .finish()
                .unwrap();
            let parsed = roundtrip(&msg);
            prop_assert_eq!(parsed, msg);
        }

        #[test]
        fn prop_encoded_length_matches_header(
            pv in version_strategy(),
            data in prop::collection::vec(any::<u8>(), 0..=256),
        ) {
            let msg = PacketOutBuilder::new(pv).data(Bytes::from(data)).finish().unwrap();
            let bytes = encode_message(&msg).unwrap();
            prop_assert_eq!(bytes.len(), usize::from(msg.header.length));
            let declared = u16::from_be_bytes([bytes[2], bytes[3]]);
            prop_assert_eq!(usize::from(declared), bytes.len());
        }

        #[test]
        fn prop_random_bytes_never_panic(
            data in prop::collection::vec(any::<u8>(), 0..=128),
        ) {
            let mut reader = PacketReader::new(Bytes::from(data));
            // parse until the reader yields nothing; errors are fine,
            // panics and infinite loops are not
            for _ in 0..32 {
                match parse_message(&mut reader) {
                    Ok(None) => break,
                    Ok(Some(_)) | Err(_) => {}
                }
            }
        }
    }
}
