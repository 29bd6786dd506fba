use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use salesgraph::graph::{GraphStore, NodeKey, PropertyMap};
use salesgraph::load::{BipartiteBatchLoader, SaleRecord};
use salesgraph::projection::{
    build_view, MonopartiteProjector, ProjectionCatalog, ProjectionRule,
};
use salesgraph::PipelineResult;

/// Resellers and products, every reseller selling a sliding window of products
fn sales_store(resellers: i64, products: i64) -> GraphStore {
    let mut store = GraphStore::new();
    for key in 0..resellers {
        store.upsert_node("Reseller", NodeKey::Int(key), PropertyMap::new());
    }
    for key in 0..products {
        store.upsert_node("Product", NodeKey::Int(key), PropertyMap::new());
    }
    store
}

fn sales(
    resellers: i64,
    products: i64,
    lines_per_reseller: i64,
) -> Vec<PipelineResult<SaleRecord>> {
    (0..resellers)
        .flat_map(|reseller| {
            (0..lines_per_reseller).map(move |line| {
                Ok(SaleRecord {
                    reseller,
                    product: (reseller * 7 + line % 20) % products,
                })
            })
        })
        .collect()
}

/// Benchmark dedup + write of a sales fact table
fn bench_bipartite_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("bipartite_load");

    for resellers in [100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(resellers), resellers, |b, &resellers| {
            b.iter(|| {
                let mut store = sales_store(resellers, 500);
                let stats = BipartiteBatchLoader::new(&mut store)
                    .load(sales(resellers, 500, 60))
                    .unwrap();
                criterion::black_box(stats.distinct);
            });
        });
    }
    group.finish();
}

/// Benchmark the shared-reseller projection
fn bench_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("commonly_sold_by");

    for resellers in [100, 1000].iter() {
        let mut base = sales_store(*resellers, 500);
        BipartiteBatchLoader::new(&mut base)
            .load(sales(*resellers, 500, 60))
            .unwrap();
        let rule = ProjectionRule::commonly_sold_by();

        group.bench_with_input(BenchmarkId::from_parameter(resellers), resellers, |b, _| {
            // Repeat runs take the merge path once the first one has written the edges
            b.iter(|| {
                let stats = MonopartiteProjector::new(&mut base).project(&rule).unwrap();
                criterion::black_box(stats.pairs);
            });
        });
    }
    group.finish();
}

/// Benchmark CSR materialization of the product view
fn bench_build_view(c: &mut Criterion) {
    let mut store = sales_store(1000, 500);
    BipartiteBatchLoader::new(&mut store)
        .load(sales(1000, 500, 60))
        .unwrap();
    MonopartiteProjector::new(&mut store)
        .project(&ProjectionRule::commonly_sold_by())
        .unwrap();
    let catalog = ProjectionCatalog::standard();
    let spec = catalog.get("product-graph").unwrap();

    c.bench_function("build_view_product_graph", |b| {
        b.iter(|| {
            let view = build_view(&store, spec);
            criterion::black_box(view.edge_count());
        });
    });
}

criterion_group!(benches, bench_bipartite_load, bench_projection, bench_build_view);
criterion_main!(benches);
