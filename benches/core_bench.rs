use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use or_route_builder::{find_shortest_path, Graph, NodeId, Pose, RouteWriter, Vector, WriterOptions};
use std::hint::black_box;

/// Hauptgleis mit `switches` Weichen; jede Weiche zweigt in ein kurzes Stumpfgleis ab.
fn build_branched_route(switches: usize) -> (Graph, NodeId, NodeId) {
    let mut graph = Graph::new();
    let start = graph.add_node(Pose::at(Vector::ZERO));
    let mut main = graph.add_edge_at_node(start, 200.0, 0.0, false);

    for index in 0..switches {
        let radius = if index % 2 == 0 { 500.0 } else { -500.0 };
        let branch = graph
            .add_edge_at_end(main, 50.0, radius, false)
            .expect("Abzweig");
        graph
            .add_edge_at_end(branch, 100.0, 0.0, true)
            .expect("Stumpfgleis");
        main = graph
            .add_edge_at_end(main, 200.0, 0.0, false)
            .expect("Hauptgleis");
    }

    let end = graph.end_node(main);
    (graph, start, end)
}

fn bench_route_authoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("route_authoring");

    for &switches in &[100usize, 1_000usize] {
        group.bench_with_input(
            BenchmarkId::new("build_and_finalize", switches),
            &switches,
            |b, &switches| {
                b.iter(|| {
                    let (mut graph, _, _) = build_branched_route(black_box(switches));
                    graph.set_directions();
                    graph.contract_edges();
                    graph.make_directed();
                    black_box(graph.edge_count())
                })
            },
        );
    }

    group.finish();
}

fn bench_shortest_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("shortest_path");

    for &switches in &[100usize, 1_000usize] {
        let (graph, start, end) = build_branched_route(switches);
        group.bench_with_input(
            BenchmarkId::new("start_to_end", switches),
            &graph,
            |b, graph| {
                b.iter(|| {
                    let path = find_shortest_path(graph, black_box(start), black_box(end));
                    black_box(path.len())
                })
            },
        );
    }

    group.finish();
}

fn bench_writer_indexing(c: &mut Criterion) {
    let (graph, _, _) = build_branched_route(1_000);
    let directory = std::env::temp_dir().join("or_route_builder_bench");

    c.bench_function("writer_index_pass_1000_switches", |b| {
        b.iter(|| {
            let writer = RouteWriter::new(&directory, black_box(&graph), WriterOptions::default())
                .expect("Indexvergabe");
            black_box(writer.world().len())
        })
    });
}

criterion_group!(
    benches,
    bench_route_authoring,
    bench_shortest_path,
    bench_writer_indexing
);
criterion_main!(benches);
