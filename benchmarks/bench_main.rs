use criterion::criterion_main;

mod benches;

criterion_main! {
    benches::membership_bench::benchmarks,
    benches::groebner_bench::benchmarks,
}
