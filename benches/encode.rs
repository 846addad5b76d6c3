use criterion::{black_box, criterion_group, criterion_main, Criterion};
use msgstore_migrate::*;

fn sample() -> StoredMessage {
    let segment = |i: i64| {
        Msg::new()
            .with("text", "the quick brown fox jumps over the lazy dog")
            .with("seq", i)
            .with("face", Msg::new().with("id", 14u32).with("name", "smile"))
    };
    StoredMessage::from(GroupMessage {
        id: "AAAAAAAAAgAAAAEAAAAA".into(),
        global_id: 1_234_567,
        attribute: Some(MessageAttribute {
            message_seq: 8812,
            internal_id: 44,
            sender_uin: 10001,
            sender_name: "someone".into(),
            timestamp: 1_650_000_000,
        }),
        sub_type: "normal".into(),
        quoted_info: Some(QuotedInfo {
            prev_id: "AAAAAAAAAgAAAAEAAAAB".into(),
            prev_global_id: 1_234_566,
            quoted_content: (0..4).map(segment).collect(),
        }),
        group_code: 123456,
        anonymous_id: String::new(),
        content: (0..32).map(segment).collect(),
    })
}

fn encode(c: &mut Criterion) {
    let m = sample();
    c.bench_function("encode group message", |b| {
        b.iter(|| encode_message(black_box(&m)))
    });
}

fn decode(c: &mut Criterion) {
    let bytes = encode_message(&sample());
    c.bench_function("decode group message", |b| {
        b.iter(|| decode_message(black_box(&bytes)).unwrap())
    });
}

fn convert(c: &mut Criterion) {
    let legacy = to_legacy_value(&sample()).unwrap();
    let migrator = Migrator::new(JsonLegacyDecoder);
    c.bench_function("convert legacy record", |b| {
        b.iter(|| migrator.convert(black_box(&legacy)).unwrap())
    });
}

criterion_group!(benches, encode, decode, convert);
criterion_main!(benches);
