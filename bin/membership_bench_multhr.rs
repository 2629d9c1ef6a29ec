use clap::Parser;
use identcheck::membership::data_structures::GeneratorGroup;
use identcheck::{
    check_field_membership, Diagnostics, EngineChoice, GroebnerEngine, OptimizedBuchberger,
    RationalFunction, Ring,
};
use std::iter::zip;
use std::time::Instant;

// Elementary symmetric functions e_1..e_n of n variables, and candidates
// that are and are not symmetric.
fn symmetric_case(num_vars: usize) -> (Vec<GeneratorGroup>, Vec<RationalFunction>) {
    let names: Vec<String> = (0..num_vars).map(|i| format!("x{}", i)).collect();
    let ring = Ring::new(names.iter().cloned());
    let mut group = vec![ring.parse_poly("1").unwrap()];
    for k in 1..=num_vars {
        let mut terms = Vec::new();
        let mut subset: Vec<usize> = (0..k).collect();
        loop {
            terms.push(subset.iter().map(|&i| names[i].as_str()).collect::<Vec<_>>().join("*"));
            // next k-subset in lexicographic order
            let Some(pos) = (0..k).rev().find(|&i| subset[i] < num_vars - k + i) else {
                break;
            };
            subset[pos] += 1;
            for i in pos + 1..k {
                subset[i] = subset[i - 1] + 1;
            }
        }
        group.push(ring.parse_poly(&terms.join(" + ")).unwrap());
    }

    let squares = names.iter().map(|x| format!("{}^2", x)).collect::<Vec<_>>().join(" + ");
    let candidates = vec![
        ring.parse(&squares).unwrap(),
        ring.parse(&names[0]).unwrap(),
    ];
    (vec![group], candidates)
}

fn test_template<E: GroebnerEngine>(num_vars: usize, repeat: u32, engine: &E) -> u128 {
    let instant = Instant::now();

    let (groups, candidates) = symmetric_case(num_vars);

    let duration = instant.elapsed().as_millis();
    println!("Preparing generators for {num_vars} variables ....{duration}ms");

    let instant = Instant::now();
    let mut rng = ark_std::test_rng();
    let mut diagnostics = Diagnostics::new("membership_bench");
    let result = (0..repeat)
        .map(|_| {
            check_field_membership(&groups, &candidates, 0.99, engine, &mut rng, &mut diagnostics).unwrap()
        })
        .collect::<Vec<_>>()
        .last()
        .cloned()
        .unwrap();

    let runtime = instant.elapsed();
    assert_eq!(result, vec![true, false]);
    for (stage, elapsed) in diagnostics.timings() {
        println!("  {stage}: {:?}", *elapsed / repeat);
    }
    runtime.as_millis()
}

#[derive(Parser, Debug)]
struct Args {
    /// Number of repetitions for each test
    #[arg(long, default_value = "10")]
    repeat: u32,

    /// Minimum number of variables
    #[arg(long, default_value = "2")]
    min_size: usize,

    /// Maximum number of variables (inclusive)
    #[arg(long, default_value = "4")]
    max_size: usize,

    /// Number of threads for the batch reductions of the optimized engine
    #[arg(long, default_value = "1")]
    run_threads: usize,

    // choose between `naive` and `optimized`
    #[arg(long, default_value = "optimized")]
    engine: String,
}

fn bench_membership() {
    let args = Args::parse();
    let repeat = args.repeat;
    let engine: EngineChoice = args.engine.parse().unwrap();

    let (sizes, runtimes): (Vec<usize>, Vec<u128>) = (args.min_size..=args.max_size)
        .map(|size| {
            let total_runtime = match engine {
                EngineChoice::Naive => test_template(size, repeat, &engine),
                EngineChoice::Optimized => {
                    test_template(size, repeat, &OptimizedBuchberger::with_threads(args.run_threads))
                }
            };
            (size, total_runtime)
        })
        .unzip();

    for (size, runtime) in zip(sizes, runtimes) {
        println!(
            "Variables: {:?}\t|| Engine: {:?}\t|| Avg. Runtime: {:?} ms",
            size,
            args.engine,
            (runtime as f64) / (repeat as f64),
        );
    }
}

fn main() {
    bench_membership();
}
