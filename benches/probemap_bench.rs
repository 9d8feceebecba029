use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use probemap::{Table, TableRegistry};

const CELLSZ: usize = 8;
const CAPACITY: usize = 4096;
// Fill to 75% so probe chains are realistic but inserts still succeed.
const LOAD: usize = CAPACITY * 3 / 4;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn filled_table() -> Table {
    let mut t = Table::new(CELLSZ, CAPACITY).unwrap();
    for (i, x) in lcg(1).take(LOAD).enumerate() {
        t.insert(&key(x), &(i as u64).to_le_bytes()).unwrap();
    }
    t
}

fn bench_fill_to_load(c: &mut Criterion) {
    c.bench_function("table::fill_to_load", |b| {
        b.iter_batched(
            || Table::new(CELLSZ, CAPACITY).unwrap(),
            |mut t| {
                for (i, x) in lcg(1).take(LOAD).enumerate() {
                    t.insert(&key(x), &(i as u64).to_le_bytes()).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hot(c: &mut Criterion) {
    let t = filled_table();
    let keys: Vec<String> = lcg(1).take(LOAD).map(key).collect();
    c.bench_function("table::get_hot", |b| {
        b.iter(|| {
            let mut found = 0usize;
            for k in &keys {
                if t.get(k).unwrap().is_some() {
                    found += 1;
                }
            }
            black_box(found)
        })
    });
}

fn bench_get_all_collisions(c: &mut Criterion) {
    // Constant hook: every lookup degenerates into a linear scan.
    let mut t = Table::with_hasher(CELLSZ, 256, |_: &str, _: usize| 0).unwrap();
    let keys: Vec<String> = lcg(7).take(192).map(key).collect();
    for (i, k) in keys.iter().enumerate() {
        t.insert(k, &(i as u64).to_le_bytes()).unwrap();
    }
    c.bench_function("table::get_all_collisions", |b| {
        b.iter(|| {
            let mut found = 0usize;
            for k in &keys {
                if t.get(k).unwrap().is_some() {
                    found += 1;
                }
            }
            black_box(found)
        })
    });
}

fn bench_optimum(c: &mut Criterion) {
    let t = filled_table();
    c.bench_function("table::optimum", |b| b.iter(|| black_box(t.optimum())));
}

fn bench_cursor_drain(c: &mut Criterion) {
    let mut t = filled_table();
    c.bench_function("table::cursor_drain", |b| {
        b.iter(|| {
            t.begin();
            let mut sum = 0u64;
            while let Some(cell) = t.next_value() {
                sum = sum.wrapping_add(cell[0] as u64);
            }
            black_box(sum)
        })
    });
}

fn bench_registry_resolve(c: &mut Criterion) {
    let mut reg = TableRegistry::new();
    let h = reg.create(CELLSZ, CAPACITY).unwrap();
    reg.table_mut(h)
        .unwrap()
        .insert("probe", &0u64.to_le_bytes())
        .unwrap();
    c.bench_function("registry::resolve_and_get", |b| {
        b.iter(|| {
            let t = reg.table(h).unwrap();
            black_box(t.get("probe").unwrap())
        })
    });
}

criterion_group!(
    benches,
    bench_fill_to_load,
    bench_get_hot,
    bench_get_all_collisions,
    bench_optimum,
    bench_cursor_drain,
    bench_registry_resolve,
);
criterion_main!(benches);
