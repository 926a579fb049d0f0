use bytes::Bytes;
use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use ofwire::ProtocolVersion::{V1_0, V1_3};
use ofwire::protocol::codes::FlowModCommand;
use ofwire::protocol::{EchoBuilder, PacketOutBuilder};
use ofwire::{FlowModBuilder, PacketReader, encode_message, parse_message};

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    let flow_mod = FlowModBuilder::new(V1_3, FlowModCommand::Add)
        .cookie(0xdead_beef)
        .priority(1000)
        .finish()
        .unwrap();
    group.throughput(Throughput::Bytes(u64::from(flow_mod.header.length)));
    group.bench_function("encode_flow_mod_13", |b| {
        b.iter(|| {
            black_box(encode_message(&flow_mod).unwrap());
        });
    });

    let flow_mod_10 = FlowModBuilder::new(V1_0, FlowModCommand::Add).finish().unwrap();
    group.throughput(Throughput::Bytes(u64::from(flow_mod_10.header.length)));
    group.bench_function("encode_flow_mod_10", |b| {
        b.iter(|| {
            black_box(encode_message(&flow_mod_10).unwrap());
        });
    });

    // packet-out carrying a full frame
    let packet_out = PacketOutBuilder::new(V1_3)
        .data(Bytes::from(vec![0u8; 1500]))
        .finish()
        .unwrap();
    group.throughput(Throughput::Bytes(u64::from(packet_out.header.length)));
    group.bench_function("encode_packet_out_1500b", |b| {
        b.iter(|| {
            black_box(encode_message(&packet_out).unwrap());
        });
    });

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    let flow_mod = encode_message(
        &FlowModBuilder::new(V1_3, FlowModCommand::Add).priority(1000).finish().unwrap(),
    )
    .unwrap();
    group.throughput(Throughput::Bytes(flow_mod.len() as u64));
    group.bench_function("parse_flow_mod_13", |b| {
        b.iter(|| {
            let mut reader = PacketReader::new(flow_mod.clone());
            black_box(parse_message(&mut reader).unwrap().unwrap());
        });
    });

    let echo = encode_message(
        &EchoBuilder::request(V1_3).data(Bytes::from(vec![0u8; 1024])).finish().unwrap(),
    )
    .unwrap();
    group.throughput(Throughput::Bytes(echo.len() as u64));
    group.bench_function("parse_echo_1kb", |b| {
        b.iter(|| {
            let mut reader = PacketReader::new(echo.clone());
            black_box(parse_message(&mut reader).unwrap().unwrap());
        });
    });

    group.finish();
}

fn bench_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    // 100 flow mods back to back, the shape of a table push
    let one = encode_message(
        &FlowModBuilder::new(V1_3, FlowModCommand::Add).finish().unwrap(),
    )
    .unwrap();
    let mut stream = Vec::with_capacity(one.len() * 100);
    for _ in 0..100 {
        stream.extend_from_slice(&one);
    }
    let stream = Bytes::from(stream);
    group.throughput(Throughput::Bytes(stream.len() as u64));
    group.bench_function("parse_stream_100_flow_mods", |b| {
        b.iter(|| {
            let mut reader = PacketReader::new(stream.clone());
            while let Some(msg) = parse_message(&mut reader).unwrap() {
                black_box(msg);
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_parse, bench_stream);
criterion_main!(benches);
