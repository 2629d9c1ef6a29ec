#[cfg(test)]
mod tests {
    use std::time::Instant;

    use ark_std::rand::{rngs::StdRng, SeedableRng};
    use ark_std::test_rng;
    use identcheck::membership::data_structures::GeneratorGroup;
    use identcheck::poly::rational;
    use identcheck::{
        check_field_membership, check_field_membership_at, Diagnostics, EngineChoice,
        GroebnerEngine, OptimizedBuchberger, RationalFunction, Ring,
    };

    fn scenario(groups: &[&[&str]], candidates: &[&str], names: &[&str]) -> (Vec<GeneratorGroup>, Vec<RationalFunction>) {
        let ring = Ring::new(names.iter().copied());
        let groups = groups
            .iter()
            .map(|g| g.iter().map(|s| ring.parse_poly(s).unwrap()).collect())
            .collect();
        let candidates = candidates.iter().map(|s| ring.parse(s).unwrap()).collect();
        (groups, candidates)
    }

    fn test_template<E: GroebnerEngine>(
        engine: &E,
        groups: &[GeneratorGroup],
        candidates: &[RationalFunction],
        p: f64,
        repeat: u64,
    ) -> (Vec<Vec<bool>>, u128) {
        let instant = Instant::now();
        let results = (0..repeat)
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                check_field_membership(
                    groups,
                    candidates,
                    p,
                    engine,
                    &mut rng,
                    &mut Diagnostics::init_diagnostics(),
                )
                .unwrap()
            })
            .collect::<Vec<_>>();
        (results, instant.elapsed().as_millis())
    }

    #[test]
    fn ratio_field_accuracy_test() {
        // Q(xy/x) = Q(y)
        let (groups, candidates) = scenario(
            &[&["x", "x*y"]],
            &["y", "y^2", "(y + 1)/(y - 1)", "x", "z"],
            &["x", "y", "z"],
        );
        let (results, runtime) = test_template(&EngineChoice::default(), &groups, &candidates, 0.99, 10);
        for result in results {
            assert_eq!(result, vec![true, true, true, false, false]);
        }
        println!("ratio field, 10 seeds: {}ms", runtime);
    }

    #[test]
    fn symmetric_functions_test() {
        let (groups, candidates) = scenario(
            &[&["1", "a + b", "a*b"]],
            &["a^2 + b^2", "a", "a - b", "(a - b)^2", "1/(a*b + 1)"],
            &["a", "b"],
        );
        let (results, _) = test_template(&EngineChoice::Naive, &groups, &candidates, 0.95, 5);
        for result in results {
            assert_eq!(result, vec![true, false, false, true, true]);
        }
    }

    #[test]
    fn engines_agree_test() {
        let (groups, candidates) = scenario(
            &[&["1", "a*b*c"], &["a", "b + c"]],
            &["a*b*c", "(b + c)/a", "a", "b*c*(b + c)", "a^2*b*c + 1"],
            &["a", "b", "c"],
        );
        let point = [rational(3), rational(-2), rational(5)];
        let naive = check_field_membership_at(
            &groups,
            &candidates,
            &point,
            &EngineChoice::Naive,
            &mut Diagnostics::init_diagnostics(),
        )
        .unwrap();
        let optimized = check_field_membership_at(
            &groups,
            &candidates,
            &point,
            &OptimizedBuchberger::with_threads(2),
            &mut Diagnostics::init_diagnostics(),
        )
        .unwrap();
        assert_eq!(naive, optimized);
        assert_eq!(naive[..2], [true, true]);
        assert!(!naive[2]);
    }

    #[test]
    fn same_seed_same_answer_test() {
        let (groups, candidates) = scenario(&[&["x + 1", "x^2*y"]], &["y", "x*y", "x"], &["x", "y"]);
        let engine = EngineChoice::default();
        let run = || {
            let mut rng = StdRng::seed_from_u64(42);
            let mut diagnostics = Diagnostics::new("determinism");
            let result =
                check_field_membership(&groups, &candidates, 0.9, &engine, &mut rng, &mut diagnostics).unwrap();
            (result, diagnostics.counter("basis_size"))
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn diagnostics_stages_test() {
        let (groups, candidates) = scenario(&[&["x", "x*y"]], &["y"], &["x", "y"]);
        let mut diagnostics = Diagnostics::init_diagnostics();
        let result = check_field_membership(
            &groups,
            &candidates,
            0.9,
            &EngineChoice::default(),
            &mut test_rng(),
            &mut diagnostics,
        )
        .unwrap();
        assert_eq!(result, vec![true]);
        for stage in ["sample", "saturation_ideal", "groebner", "reduce"] {
            assert!(diagnostics.timing(stage).is_some(), "missing stage {}", stage);
        }
        assert!(diagnostics.counter("sample_attempts") >= 1);
        assert!(diagnostics.counter("basis_size") >= 1);
    }
}
