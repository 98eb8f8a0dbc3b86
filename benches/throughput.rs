//! Throughput benchmarks for the striped compound queue.
//!
//! Mirrors the shape of the teacher crate's own `benches/throughput.rs`:
//! a single-producer baseline, a scan across producer counts to show how
//! striping holds up under contention, and a lane-count sweep at fixed
//! total capacity to show the K-vs-contention tradeoff directly.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use stripe_mpsc::Compound;

const MSG_PER_PRODUCER: u64 = 1_000_000;

fn bench_spsc(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc");
    group.throughput(Throughput::Elements(MSG_PER_PRODUCER));

    group.bench_function("single_producer_consumer", |b| {
        b.iter(|| {
            let queue = Arc::new(Compound::<u64>::with_parallelism(4096, 1).unwrap());

            let q = Arc::clone(&queue);
            let producer = thread::spawn(move || {
                for i in 0..MSG_PER_PRODUCER {
                    while !q.offer(i) {
                        std::hint::spin_loop();
                    }
                }
            });

            let mut received = 0u64;
            while received < MSG_PER_PRODUCER {
                if let Some(item) = queue.poll() {
                    black_box(item);
                    received += 1;
                } else {
                    std::hint::spin_loop();
                }
            }

            producer.join().unwrap();
        });
    });

    group.finish();
}

fn bench_mpsc_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("mpsc_scaling");

    for &num_producers in &[2usize, 4, 8, 16] {
        let total_msgs = MSG_PER_PRODUCER * num_producers as u64;
        group.throughput(Throughput::Elements(total_msgs));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{num_producers}P_1C")),
            &num_producers,
            |b, &n| {
                b.iter(|| {
                    let queue = Arc::new(Compound::<u64>::with_parallelism(65536, n).unwrap());
                    let target = MSG_PER_PRODUCER * n as u64;

                    let handles: Vec<_> = (0..n)
                        .map(|_| {
                            let q = Arc::clone(&queue);
                            thread::spawn(move || {
                                for i in 0..MSG_PER_PRODUCER {
                                    while !q.offer(i) {
                                        std::hint::spin_loop();
                                    }
                                }
                            })
                        })
                        .collect();

                    let consumer_q = Arc::clone(&queue);
                    let consumer = thread::spawn(move || {
                        let mut received = 0u64;
                        while received < target {
                            if let Some(item) = consumer_q.poll() {
                                black_box(item);
                                received += 1;
                            } else {
                                std::hint::spin_loop();
                            }
                        }
                    });

                    for h in handles {
                        h.join().unwrap();
                    }
                    consumer.join().unwrap();
                });
            },
        );
    }

    group.finish();
}

/// Fixed total capacity and producer count, varying lane count `K` — shows
/// the tail-contention reduction the striping exists to deliver.
fn bench_lane_count_tradeoff(c: &mut Criterion) {
    let mut group = c.benchmark_group("lane_count_tradeoff");
    const PRODUCERS: usize = 8;
    let total_msgs = MSG_PER_PRODUCER * PRODUCERS as u64;
    group.throughput(Throughput::Elements(total_msgs));

    for &lanes in &[1usize, 2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("K{lanes}")),
            &lanes,
            |b, &k| {
                b.iter(|| {
                    let queue = Arc::new(Compound::<u64>::with_parallelism(65536, k).unwrap());
                    let received_total = Arc::new(AtomicU64::new(0));

                    let handles: Vec<_> = (0..PRODUCERS)
                        .map(|_| {
                            let q = Arc::clone(&queue);
                            thread::spawn(move || {
                                for i in 0..MSG_PER_PRODUCER {
                                    while !q.offer(i) {
                                        std::hint::spin_loop();
                                    }
                                }
                            })
                        })
                        .collect();

                    let consumer_q = Arc::clone(&queue);
                    let received = Arc::clone(&received_total);
                    let consumer = thread::spawn(move || {
                        while received.load(Ordering::Relaxed) < total_msgs {
                            if let Some(item) = consumer_q.poll() {
                                black_box(item);
                                received.fetch_add(1, Ordering::Relaxed);
                            } else {
                                std::hint::spin_loop();
                            }
                        }
                    });

                    for h in handles {
                        h.join().unwrap();
                    }
                    consumer.join().unwrap();
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_spsc,
    bench_mpsc_scaling,
    bench_lane_count_tradeoff
);
criterion_main!(benches);
