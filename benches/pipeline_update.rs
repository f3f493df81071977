//! Benchmarks for demand-driven updates and composite traversal
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::rc::Rc;
use vispipe_rs::data::{CompositeDataSet, DataKind, DataSet};
use vispipe_rs::pipeline::nodes::{DataSetSource, PassThrough};
use vispipe_rs::pipeline::Executive;
use vispipe_rs::ExecutiveConfig;

/// Source followed by `depth` pass-through filters; returns (source, sink).
fn chain(depth: usize, points: usize) -> (Rc<Executive>, Rc<Executive>) {
    let config = ExecutiveConfig::default();
    let source = Executive::new(DataSetSource::new(DataKind::PolyData, points), config.clone())
        .expect("source");
    let mut last = source.clone();
    for _ in 0..depth {
        let filter = Executive::new(PassThrough::new(), config.clone()).expect("filter");
        filter.set_input_connection(0, &last, 0).expect("connect");
        last = filter;
    }
    (source, last)
}

fn bench_clean_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("clean_update");

    for depth in [1, 8, 64].iter() {
        let (_source, sink) = chain(*depth, 1000);
        sink.update().expect("update");
        group.throughput(Throughput::Elements(*depth as u64));
        group.bench_with_input(BenchmarkId::new("chain", depth), &sink, |b, sink| {
            b.iter(|| black_box(sink.update()))
        });
    }

    group.finish();
}

fn bench_modified_source(c: &mut Criterion) {
    let mut group = c.benchmark_group("modified_source");

    for depth in [1, 8, 64].iter() {
        let (source, sink) = chain(*depth, 1000);
        group.throughput(Throughput::Elements(*depth as u64));
        group.bench_with_input(BenchmarkId::new("chain", depth), &sink, |b, sink| {
            b.iter(|| {
                source.modified();
                black_box(sink.update())
            })
        });
    }

    group.finish();
}

/// Balanced tree of multi-blocks with `fanout` children per level.
fn tree(fanout: usize, levels: usize) -> CompositeDataSet {
    let mut node = CompositeDataSet::multi_block();
    node.set_number_of_children(fanout);
    for i in 0..fanout {
        let child = if levels <= 1 {
            DataSet::new(DataKind::PolyData).into_ref()
        } else {
            tree(fanout, levels - 1).into_ref()
        };
        node.set_child(i, Some(child));
    }
    node
}

fn bench_composite_traversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("composite_traversal");

    for levels in [2, 3, 4].iter() {
        let data = tree(8, *levels);
        group.throughput(Throughput::Elements(data.number_of_leaves() as u64));
        group.bench_with_input(BenchmarkId::new("forward", levels), &data, |b, data| {
            b.iter(|| {
                let mut iter = data.new_iterator();
                iter.init_traversal();
                black_box(iter.items().count())
            })
        });
        group.bench_with_input(BenchmarkId::new("reverse", levels), &data, |b, data| {
            b.iter(|| {
                let mut iter = data.new_iterator();
                iter.init_reverse_traversal();
                black_box(iter.items().count())
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_clean_update,
    bench_modified_source,
    bench_composite_traversal
);
criterion_main!(benches);
