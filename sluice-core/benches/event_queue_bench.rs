#[macro_use]
extern crate criterion;

use criterion::{BatchSize, Criterion, Throughput};

use sluice_core::events::{Event, EventQueue, SystemId};
use sluice_core::resource::Resource;

fn bench_event_queue_push_pop(c: &mut Criterion) {
    let resource = Resource::create("bench", 0, 1).unwrap();
    let mut group = c.benchmark_group("event_queue_throughput");

    for depth in [16, 256, 4096] {
        group.throughput(Throughput::Elements(depth as u64));
        group.bench_function(format!("depth_{}", depth), |b| {
            b.iter_batched(
                EventQueue::new,
                |queue| {
                    for i in 0..depth {
                        queue.push(Event::new(SystemId(0), &resource, 0, i % 3, i));
                    }
                    while queue.pop().is_some() {}
                    queue
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_event_queue_push_pop);
criterion_main!(benches);
