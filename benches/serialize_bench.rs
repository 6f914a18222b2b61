use std::cell::RefCell;
use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use safelog_core::logging::MemorySink;
use safelog_core::{redact_headers, safer_format, serialize, HeaderCollection, Pii};
use serde::Serialize;

#[derive(Serialize)]
struct Node {
    id: u32,
    children: Vec<Node>,
    parent: RefCell<Option<Rc<Node>>>,
}

/// Tree of `width^depth` nodes; depth-bounded serialization should not
/// scale with it.
fn wide_tree(width: usize, depth: usize) -> Node {
    Node {
        id: depth as u32,
        children: if depth == 0 {
            Vec::new()
        } else {
            (0..width).map(|_| wide_tree(width, depth - 1)).collect()
        },
        parent: RefCell::new(None),
    }
}

fn headers(n: usize) -> HeaderCollection {
    let mut headers = HeaderCollection::new();
    headers.insert("Authorization", ["Bearer abc.def.ghi"]);
    headers.insert("Accept", ["application/json"]);
    for i in 0..n {
        headers.insert(&format!("X-Custom-{i}"), [format!("value-{i}")]);
    }
    headers
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");
    for &depth in &[2usize, 4, 6] {
        let tree = wide_tree(4, depth);
        group.bench_function(BenchmarkId::new("wide_tree", depth), |b| {
            b.iter(|| black_box(serialize(black_box(&tree))))
        });
    }

    let looped = Rc::new(wide_tree(2, 2));
    *looped.parent.borrow_mut() = Some(looped.clone());
    group.bench_function("self_loop", |b| {
        b.iter(|| black_box(serialize(black_box(&looped))))
    });
    looped.parent.borrow_mut().take();

    group.finish();
}

fn bench_redact(c: &mut Criterion) {
    let mut group = c.benchmark_group("redact_headers");
    let marker = |pii: &Pii| format!("<pii>{}</pii>", pii.value());
    for &n in &[4usize, 32] {
        let input = headers(n);
        group.bench_function(BenchmarkId::new("scramble_only", n), |b| {
            b.iter(|| black_box(redact_headers(black_box(&input), None)))
        });
        group.bench_function(BenchmarkId::new("with_marker", n), |b| {
            b.iter(|| black_box(redact_headers(black_box(&input), Some(&marker))))
        });
    }
    group.finish();
}

fn bench_format(c: &mut Criterion) {
    let sink = MemorySink::new();
    let pii = Pii::new("alice@example.com");
    c.bench_function("safer_format", |b| {
        b.iter(|| black_box(safer_format(&sink, "{0} items for {1}", &[&5, &pii])))
    });
}

criterion_group!(benches, bench_serialize, bench_redact, bench_format);
criterion_main!(benches);
