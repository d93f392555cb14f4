use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use std::{
    hint::black_box,
    net::{SocketAddr, UdpSocket},
    thread,
    time::Duration,
};

use digitwin_puppet::component_a::{
    frame_drain::FrameDrain,
    socket_channel::SocketChannel,
};

// Backlog depths: one frame at 50 Hz telemetry, a stalled second, a long stall.
const BACKLOGS: &[usize] = &[1, 50, 500];

fn drain_latency_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("drain_latest");
    group.measurement_time(Duration::from_secs(3));
    group.sample_size(30);

    let mut channel = SocketChannel::open(SocketAddr::from(([127, 0, 0, 1], 0))).unwrap();
    let target = channel.local_addr();
    let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
    let mut drain = FrameDrain::new(1024, 4096);

    // Empty socket: cost of a frame with no telemetry
    group.bench_function("empty", |b| {
        b.iter(|| black_box(drain.drain(&mut channel)))
    });

    for &depth in BACKLOGS {
        group.bench_with_input(BenchmarkId::new("backlog", depth), &depth, |b, &depth| {
            b.iter_batched(
                || {
                    // SETUP: queue `depth` datagrams before the timer starts
                    for i in 0..depth {
                        let payload = format!("{},{},{},{},{}", i % 1024, 1, 2, 3, 200);
                        sender.send_to(payload.as_bytes(), target).unwrap();
                    }
                    thread::sleep(Duration::from_millis(1));
                },
                |_| black_box(drain.drain_report(&mut channel)),
                BatchSize::PerIteration,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, drain_latency_bench);
criterion_main!(benches);
