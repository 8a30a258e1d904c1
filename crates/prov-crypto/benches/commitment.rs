use criterion::{black_box, criterion_group, criterion_main, Criterion};
use prov_crypto::{FixedTreeCombiner, SaltedLeafBuilder};
use prov_types::{Digest, FieldValue, Salt};

fn product_fields() -> [FieldValue; 4] {
    [
        FieldValue::Integer(1),
        FieldValue::text("Widget"),
        FieldValue::text("2024-01-01"),
        FieldValue::text("B7"),
    ]
}

fn bench_leaf_with_salt(c: &mut Criterion) {
    let builder = SaltedLeafBuilder::new();
    let salt = Salt::from_bytes([7; 16]);
    let value = FieldValue::text("Widget");

    c.bench_function("leaf_with_salt", |b| {
        b.iter(|| builder.leaf_with_salt(black_box(&salt), black_box(&value)));
    });
}

fn bench_product_root(c: &mut Criterion) {
    let combiner = FixedTreeCombiner::product();
    let leaves: Vec<Digest> = (0u8..4).map(|i| Digest::from_hash([i; 32])).collect();

    c.bench_function("product_root", |b| {
        b.iter(|| combiner.root(black_box(&leaves)));
    });
}

fn bench_full_commitment(c: &mut Criterion) {
    let builder = SaltedLeafBuilder::new();
    let combiner = FixedTreeCombiner::product();
    let fields = product_fields();

    c.bench_function("fresh_salts_and_root", |b| {
        b.iter(|| {
            let leaves: Vec<Digest> = fields.iter().map(|f| builder.leaf(f).1).collect();
            combiner.root(black_box(&leaves))
        });
    });
}

criterion_group!(
    benches,
    bench_leaf_with_salt,
    bench_product_root,
    bench_full_commitment
);
criterion_main!(benches);
