use bytes::{BufMut, BytesMut};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rfcollector_core::constants::{impinj, params, tv, IMPINJ_VENDOR_ID};
use rfcollector_core::param::{put_tlv, put_tv};
use rfcollector_core::{Frame, Message, MessageType};

fn report_frame(records: usize) -> BytesMut {
    let mut body = BytesMut::new();
    for i in 0..records {
        let mut inner = BytesMut::new();
        put_tv(&mut inner, tv::EPC_96, &[i as u8; 12]);
        put_tv(&mut inner, tv::ANTENNA_ID, &1u16.to_be_bytes());
        put_tv(&mut inner, tv::CHANNEL_INDEX, &7u16.to_be_bytes());
        put_tv(&mut inner, tv::FIRST_SEEN_TIMESTAMP_UTC, &(i as u64).to_be_bytes());
        for (subtype, value) in [
            (impinj::RF_PHASE_ANGLE, 2048i16),
            (impinj::PEAK_RSSI, -5000),
            (impinj::RF_DOPPLER_FREQUENCY, 160),
        ] {
            let mut custom = BytesMut::new();
            custom.put_u32(IMPINJ_VENDOR_ID);
            custom.put_u32(subtype);
            custom.put_i16(value);
            put_tlv(&mut inner, params::CUSTOM, &custom);
        }
        put_tlv(&mut body, params::TAG_REPORT_DATA, &inner);
    }
    Frame::with_body(MessageType::RoAccessReport, 0, body.freeze()).encode()
}

fn bench_report_decode(c: &mut Criterion) {
    let wire = report_frame(100);
    c.bench_function("decode RO_ACCESS_REPORT x100", |b| {
        b.iter(|| {
            let frame = Frame::decode(black_box(wire.clone())).unwrap();
            Message::decode(frame).unwrap()
        })
    });
}

criterion_group!(benches, bench_report_decode);
criterion_main!(benches);
