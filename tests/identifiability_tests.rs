#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::{Mutex, Once};
    use std::thread::{self, ThreadId};
    use std::time::Instant;

    use ark_std::rand::{rngs::StdRng, SeedableRng};
    use ark_std::test_rng;
    use identcheck::poly::rational;
    use log::{Level, LevelFilter, Log, Metadata, Record};
    use identcheck::{
        assess_global_identifiability, check_identifiability, check_identifiability_io,
        extract_identifiable_functions, Assessment, Diagnostics, EngineChoice, IdentError, OdeModel,
        OdeSystem, RationalFunction, VariableChangePolicy,
    };

    // Records log output per test thread.
    struct Capture {
        records: Mutex<Vec<(ThreadId, Level, String)>>,
    }

    impl Log for Capture {
        fn enabled(&self, _: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            if let Ok(mut records) = self.records.lock() {
                records.push((thread::current().id(), record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    static CAPTURE: Capture = Capture {
        records: Mutex::new(Vec::new()),
    };

    fn install_capture() {
        static INSTALL: Once = Once::new();
        INSTALL.call_once(|| {
            log::set_logger(&CAPTURE).unwrap();
            log::set_max_level(LevelFilter::Trace);
        });
    }

    fn captured(level: Level, needle: &str) -> usize {
        let me = thread::current().id();
        CAPTURE
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, l, msg)| *id == me && *l == level && msg.contains(needle))
            .count()
    }

    // x1' = -a*b*x1 + x2, x2' = -x2, y = x1
    fn two_compartments() -> OdeSystem {
        OdeSystem::new(&["a", "b"], &["x1", "x2"], &[])
            .with_dynamics("x1", "-a*b*x1 + x2")
            .unwrap()
            .with_dynamics("x2", "-x2")
            .unwrap()
            .with_output("y", "x1")
            .unwrap()
            .with_io_equation("y_2 + (a*b + 1)*y_1 + a*b*y_0")
    }

    // x' = -a*x, y = b*x
    fn scaled_decay() -> OdeSystem {
        OdeSystem::new(&["a", "b"], &["x"], &[])
            .with_dynamics("x", "-a*x")
            .unwrap()
            .with_output("y", "b*x")
            .unwrap()
            .with_io_equation("y_1 + a*y_0")
    }

    fn parse_all(model: &OdeSystem, functions: &[&str]) -> Vec<RationalFunction> {
        functions.iter().map(|f| model.ring().parse(f).unwrap()).collect()
    }

    fn test_template(model: &OdeSystem, functions: &[&str], p: f64, seed: u64) -> (Vec<bool>, u128) {
        let candidates = parse_all(model, functions);
        let instant = Instant::now();
        let result = check_identifiability(
            model,
            &candidates,
            &[] as &[&str],
            p,
            VariableChangePolicy::Default,
            &EngineChoice::default(),
            &mut StdRng::seed_from_u64(seed),
            &mut Diagnostics::init_diagnostics(),
        )
        .unwrap();
        (result, instant.elapsed().as_millis())
    }

    #[test]
    fn product_of_parameters_test() {
        let model = two_compartments();
        for seed in 0..3 {
            let (result, runtime) = test_template(&model, &["a", "b", "a*b", "a*b + 1/(a*b)"], 0.99, seed);
            assert_eq!(result, vec![false, false, true, true]);
            println!("seed {}: {}ms", seed, runtime);
        }
    }

    #[test]
    fn all_parameters_test() {
        let model = two_compartments();
        let assessment = assess_global_identifiability(
            &model,
            None,
            &[] as &[&str],
            0.99,
            VariableChangePolicy::Default,
            &EngineChoice::Naive,
            &mut test_rng(),
            &mut Diagnostics::init_diagnostics(),
        )
        .unwrap();
        let expected: BTreeMap<String, bool> = [("a".to_string(), false), ("b".to_string(), false)]
            .into_iter()
            .collect();
        assert_eq!(assessment, Assessment::Parameters(expected));
    }

    #[test]
    fn entries_agree_for_the_same_seed_test() {
        let model = two_compartments();
        let functions = ["a*b", "b", "a + b"];
        let candidates = parse_all(&model, &functions);
        let (direct, _) = test_template(&model, &functions, 0.95, 11);
        let assessed = assess_global_identifiability(
            &model,
            Some(candidates.as_slice()),
            &[] as &[&str],
            0.95,
            VariableChangePolicy::Default,
            &EngineChoice::default(),
            &mut StdRng::seed_from_u64(11),
            &mut Diagnostics::init_diagnostics(),
        )
        .unwrap();
        assert_eq!(assessed, Assessment::Functions(direct));
    }

    #[test]
    fn known_quantity_test() {
        let model = two_compartments();
        let candidates = parse_all(&model, &["a", "b"]);
        let result = assess_global_identifiability(
            &model,
            Some(candidates.as_slice()),
            &["a"],
            0.99,
            VariableChangePolicy::Default,
            &EngineChoice::default(),
            &mut test_rng(),
            &mut Diagnostics::init_diagnostics(),
        )
        .unwrap();
        assert_eq!(result, Assessment::Functions(vec![true, true]));
    }

    #[test]
    fn state_functions_test() {
        let model = scaled_decay();
        let mut diagnostics = Diagnostics::init_diagnostics();
        let candidates = parse_all(&model, &["x", "b*x", "a", "a*b*x"]);
        let result = check_identifiability(
            &model,
            &candidates,
            &[] as &[&str],
            0.99,
            VariableChangePolicy::Default,
            &EngineChoice::default(),
            &mut test_rng(),
            &mut diagnostics,
        )
        .unwrap();
        assert_eq!(result, vec![false, true, true, true]);
        assert!(diagnostics.timing("simplify").is_some());
        assert!(diagnostics.timing("wronskian").is_some());
    }

    #[test]
    fn degenerate_wronskian_still_answers_test() {
        let model = two_compartments()
            .with_wronskian(vec![
                vec![rational(1), rational(0), rational(0)],
                vec![rational(2), rational(0), rational(0)],
            ])
            .with_submodel(&["a"]);
        let io = model.io_equations(VariableChangePolicy::Default).unwrap();
        let w = &model.wronskians(&io).unwrap()[0];
        assert_eq!(identcheck::identifiability::corank(w), 2);

        install_capture();
        let (result, _) = test_template(&model, &["a*b", "a"], 0.9, 7);
        assert_eq!(result, vec![true, false]);
        assert_eq!(captured(Level::Warn, "corank 2"), 1);
        assert_eq!(captured(Level::Info, "non-trivial submodels"), 1);
    }

    #[test]
    fn unusable_known_quantities_are_reported_test() {
        install_capture();
        let model = two_compartments();
        let candidates = parse_all(&model, &["a*b", "b"]);
        let result = check_identifiability(
            &model,
            &candidates,
            &["c + 1", "y_0"],
            0.99,
            VariableChangePolicy::Default,
            &EngineChoice::default(),
            &mut test_rng(),
            &mut Diagnostics::init_diagnostics(),
        )
        .unwrap();
        assert_eq!(result, vec![true, false]);
        // `c` is not a variable of the model
        assert_eq!(captured(Level::Warn, "`c + 1` is dropped"), 1);
        assert_eq!(captured(Level::Info, "are unused: y_0"), 1);
    }

    #[test]
    fn io_entry_agrees_with_model_entry_test() {
        let model = two_compartments();
        let io = model.io_equations(VariableChangePolicy::No).unwrap();
        let candidates: Vec<RationalFunction> = ["a", "a*b", "(a*b)^2 - 3"]
            .iter()
            .map(|f| io.ring().parse(f).unwrap())
            .collect();
        let from_io = check_identifiability_io(
            &io,
            &model.parameters(),
            &candidates,
            0.99,
            &EngineChoice::Naive,
            &mut test_rng(),
            &mut Diagnostics::init_diagnostics(),
        )
        .unwrap();
        let (from_model, _) = test_template(&model, &["a", "a*b", "(a*b)^2 - 3"], 0.99, 1);
        assert_eq!(from_io, from_model);
        assert_eq!(from_io, vec![false, true, true]);
    }

    #[test]
    fn identifiable_functions_test() {
        let model = scaled_decay();
        let io = model.io_equations(VariableChangePolicy::Default).unwrap();
        let functions = extract_identifiable_functions(&io, &model.parameters(), &EngineChoice::default()).unwrap();
        assert_eq!(functions.len(), 1);
        let a = io.ring().parse("a").unwrap();
        assert!(functions[0] == a || functions[0] == -a);
    }

    #[test]
    fn invalid_probability_test() {
        let model = two_compartments();
        let candidates = parse_all(&model, &["a"]);
        for p in [0.0, 1.0, -0.5, f64::NAN] {
            let err = check_identifiability(
                &model,
                &candidates,
                &[] as &[&str],
                p,
                VariableChangePolicy::Default,
                &EngineChoice::default(),
                &mut test_rng(),
                &mut Diagnostics::init_diagnostics(),
            )
            .unwrap_err();
            assert!(matches!(
                err.downcast_ref::<IdentError>(),
                Some(IdentError::InvalidProbability(_))
            ));
        }
    }
}
