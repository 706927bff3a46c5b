//! Benchmarks for the NDJSON streamer.
//!
//! Measures draining a pre-filled queue of identical records into a
//! discarding sink, under both flush policies.

// Benchmark code - performance of the benchmark setup is not critical
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use mixport_exports::{
    EventRecord, ExportConfig, FlushPolicy, JsonStreamer, event_queue,
};

fn sample_event() -> EventRecord {
    let mut event = EventRecord::with_event_id("id");
    event.insert("foo", "bar,baz");
    event
}

fn bench_stream_to_sink(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("failed to build runtime");
    let mut group = c.benchmark_group("stream_to_sink");

    for count in [1_000usize, 10_000] {
        group.throughput(Throughput::Elements(count as u64));

        for flush in [FlushPolicy::EachRecord, FlushPolicy::OnFinish] {
            let streamer = JsonStreamer::new(ExportConfig {
                flush,
                ..ExportConfig::default()
            });

            group.bench_with_input(
                BenchmarkId::new(format!("{flush:?}"), count),
                &count,
                |b, &count| {
                    b.iter_batched(
                        || {
                            let (tx, queue) = event_queue(count);
                            for _ in 0..count {
                                tx.try_send(sample_event()).expect("queue sized for batch");
                            }
                            queue
                        },
                        |mut queue| {
                            runtime
                                .block_on(streamer.run(tokio::io::sink(), &mut queue))
                                .expect("stream failed")
                        },
                        criterion::BatchSize::LargeInput,
                    );
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_stream_to_sink);
criterion_main!(benches);
