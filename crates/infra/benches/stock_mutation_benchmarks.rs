use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use std::sync::Arc;

use zambrano_core::{ColorId, ProductId, SizeId, VariantId};
use zambrano_infra::ledger::{InMemoryLedgerStore, LedgerStore};
use zambrano_infra::stock_service::StockService;
use zambrano_inventory::Variant;

fn seed_service(stock: i64) -> (StockService<Arc<InMemoryLedgerStore>>, VariantId) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("failed to build runtime");

    let store = Arc::new(InMemoryLedgerStore::new());
    let variant_id = VariantId::new();
    runtime.block_on(async {
        store
            .insert_variants(vec![Variant {
                variant_id,
                product_id: ProductId::new(),
                color_id: ColorId::new(),
                size_id: SizeId::new(),
                price: 2500,
                stock,
                active: true,
            }])
            .await
            .expect("failed to seed variant");
    });

    (StockService::new(store), variant_id)
}

fn bench_single_mutation_latency(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("failed to build runtime");

    let mut group = c.benchmark_group("stock_mutation_latency");

    // Receipts never deplete, so the same seeded variant serves every iteration.
    let (service, variant_id) = seed_service(0);
    group.bench_function("receive_one_unit", |b| {
        b.iter(|| {
            runtime
                .block_on(service.receive(variant_id, 1))
                .expect("receive failed");
        })
    });

    let (service, variant_id) = seed_service(i64::MAX / 2);
    group.bench_function("sell_one_unit", |b| {
        b.iter(|| {
            runtime
                .block_on(service.sell(variant_id, 1, 2500))
                .expect("sell failed");
        })
    });

    group.finish();
}

fn bench_mutation_throughput(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("failed to build runtime");

    let mut group = c.benchmark_group("stock_mutation_throughput");

    for batch in [100u64, 1_000] {
        group.throughput(Throughput::Elements(batch));
        group.bench_with_input(
            BenchmarkId::new("alternating_sell_receive", batch),
            &batch,
            |b, &batch| {
                let (service, variant_id) = seed_service(batch as i64);
                b.iter(|| {
                    runtime.block_on(async {
                        for _ in 0..batch {
                            service.sell(variant_id, 1, 2500).await.expect("sell failed");
                            service.receive(variant_id, 1).await.expect("receive failed");
                        }
                    })
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_mutation_latency,
    bench_mutation_throughput
);
criterion_main!(benches);
