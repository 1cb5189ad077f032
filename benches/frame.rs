//! Benchmarks for IPC frame encoding
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn benchmark_encode_set_activity(c: &mut Criterion) {
    use rspresence::protocol::encode;
    use rspresence::types::{Activity, IpcOpcode, RpcCommand};

    let activity = Activity::for_track(
        "Never Gonna Give You Up",
        "Rick Astley",
        Some("https://lh3.googleusercontent.com/artwork=w500-h500-l90-rj"),
        1704067200000,
    );
    let command = RpcCommand::set_activity(Some(activity));

    c.bench_function("encode_set_activity", |b| {
        b.iter(|| encode(IpcOpcode::Frame, black_box(&command)))
    });
}

fn benchmark_build_set_activity(c: &mut Criterion) {
    use rspresence::types::{now_millis, Activity, RpcCommand};

    c.bench_function("build_set_activity", |b| {
        b.iter(|| {
            let activity = Activity::for_track(
                black_box("Song"),
                black_box("Artist"),
                black_box(Some("https://img/x.png")),
                now_millis(),
            );
            RpcCommand::set_activity(Some(activity))
        })
    });
}

fn benchmark_decode_frame(c: &mut Criterion) {
    use rspresence::protocol::{encode, read_frame};
    use rspresence::types::{IpcOpcode, RpcResponse};

    let reply = serde_json::json!({
        "cmd": "DISPATCH",
        "evt": "READY",
        "data": { "v": 1, "user": { "username": "rspresence" } },
    });
    let encoded = encode(IpcOpcode::Frame, &reply).unwrap();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();

    c.bench_function("decode_ready_frame", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let mut reader = black_box(encoded.as_slice());
                let frame = read_frame(&mut reader).await.unwrap();
                frame.json::<RpcResponse>().unwrap()
            })
        })
    });
}

criterion_group!(
    benches,
    benchmark_encode_set_activity,
    benchmark_build_set_activity,
    benchmark_decode_frame,
);

criterion_main!(benches);
