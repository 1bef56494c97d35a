use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;
use tempograph::{Attributes, TemporalGraph, TimeWindow, Timestamp, WriteOptions};

fn populated(entities: usize, versions: u64) -> TemporalGraph {
    let mut graph = TemporalGraph::starting_at(Timestamp::EPOCH);
    for step in 0..versions {
        for e in 0..entities {
            graph
                .write_node(
                    format!("entity:{}", e),
                    Attributes::new().with("step", step as i64),
                    None,
                )
                .unwrap();
        }
        for e in 1..entities {
            graph
                .link(
                    format!("entity:{}", e - 1),
                    format!("entity:{}", e),
                    "next",
                    Attributes::new(),
                    None,
                )
                .unwrap();
        }
        graph.advance_clock(Duration::from_secs(60));
    }
    graph
}

fn benchmark_writes(c: &mut Criterion) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut group = c.benchmark_group("writes");

    let mut graph = TemporalGraph::starting_at(Timestamp::EPOCH);

    group.bench_function("write_node_new_version", |b| {
        let mut counter = 0u64;
        b.iter(|| {
            counter += 1;
            graph
                .write_node(
                    black_box("Robot1"),
                    Attributes::new().with("battery", 1.0),
                    Some(WriteOptions::at(Timestamp::from_millis(counter))),
                )
                .unwrap()
        })
    });

    group.bench_function("write_node_rewrite", |b| {
        b.iter(|| {
            graph
                .write_node(
                    black_box("Shelf1"),
                    Attributes::new().with("inventory", 50),
                    Some(WriteOptions::at(Timestamp::EPOCH)),
                )
                .unwrap()
        })
    });

    group.bench_function("link", |b| {
        b.iter(|| {
            graph
                .link(
                    black_box("Robot1"),
                    black_box("Shelf1"),
                    "can_access",
                    Attributes::new(),
                    Some(WriteOptions::at(Timestamp::EPOCH)),
                )
                .unwrap()
        })
    });

    group.finish();
}

fn benchmark_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("reads");
    let graph = populated(100, 100);
    let middle = Timestamp::from_secs(50 * 60);

    group.bench_function("read_latest", |b| {
        b.iter(|| graph.read_latest(black_box("entity:42")).unwrap().len())
    });

    group.bench_function("read_node_exact", |b| {
        b.iter(|| graph.read_node(black_box("entity:42"), middle).unwrap().len())
    });

    group.bench_function("read_as_of", |b| {
        let between = Timestamp::from_secs(50 * 60 + 30);
        b.iter(|| graph.read_as_of(black_box("entity:42"), between).unwrap().0)
    });

    group.bench_function("history", |b| {
        b.iter(|| graph.history(black_box("entity:42")).len())
    });

    group.finish();
}

fn benchmark_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("projection");

    for entities in [10usize, 100, 1000].iter() {
        let graph = populated(*entities, 20);

        group.bench_with_input(
            BenchmarkId::new("project_single_instant", entities),
            entities,
            |b, &_size| {
                let at = Timestamp::from_secs(10 * 60);
                b.iter(|| graph.project(black_box(TimeWindow::at(at))).unwrap().node_count())
            },
        );

        group.bench_with_input(
            BenchmarkId::new("project_all", entities),
            entities,
            |b, &_size| {
                b.iter(|| graph.project(black_box(TimeWindow::all())).unwrap().edge_count())
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_writes, benchmark_reads, benchmark_projection);
criterion_main!(benches);
