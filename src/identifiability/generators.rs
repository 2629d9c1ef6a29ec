use anyhow::Error;
use num_traits::One;

use super::model::{IoEquations, OdeModel};
use crate::membership::data_structures::GeneratorGroup;
use crate::poly::{MonomialOrder, Rational, Ring};

/// Generator groups of the identifiable functions, split by whether they
/// involve non-parameter variables, all written over `ring`.
#[derive(Clone, Debug)]
pub struct GeneratorBuckets {
    pub with_states: Vec<GeneratorGroup>,
    pub no_states: Vec<GeneratorGroup>,
    pub ring: Ring,
}

impl GeneratorBuckets {
    /// Both buckets, parameter-only groups first.
    pub fn merged(self) -> Vec<GeneratorGroup> {
        let mut groups = self.no_states;
        groups.extend(self.with_states);
        groups
    }
}

/// Working ring: the IO ring, extended by the model's variables when
/// state generators are requested.
fn working_ring(io: &IoEquations, model: Option<&Ring>) -> Ring {
    match model {
        Some(model_ring) => {
            let fresh: Vec<&String> = model_ring
                .names()
                .iter()
                .filter(|n| !io.ring().contains(n))
                .collect();
            io.ring().extend(&fresh, MonomialOrder::DegRevLex)
        }
        None => io.ring().clone(),
    }
}

/// Collects the generator groups of the field of identifiable functions.
///
/// Attributes:
/// io - input-output equations of the model
/// parameters - names of the parameters in the IO ring
/// known - quantities known a priori, parsed over the working ring
/// with_states - also produce generators of functions of the states
/// model - source of the state generators
///
/// Returns
/// GeneratorBuckets - one group per IO equation (its coefficients as a
/// polynomial in the non-parameter variables), the state generators and
/// one `[1, q]` group per representable known quantity
pub fn extract_generators<M, S>(
    io: &IoEquations,
    parameters: &[String],
    known: &[S],
    with_states: bool,
    model: Option<&M>,
) -> Result<GeneratorBuckets, Error>
where
    M: OdeModel + ?Sized,
    S: AsRef<str>,
{
    let model = if with_states { model } else { None };
    let ring = working_ring(io, model.map(|m| m.ring()));
    let is_param = |i: usize| ring.names().get(i).is_some_and(|n| parameters.contains(n));

    let mut no_states = Vec::with_capacity(io.len());
    for equation in io.equations() {
        let equation = ring.cast(equation, io.ring())?;
        let group: GeneratorGroup = equation
            .collect_coefficients(is_param)
            .into_iter()
            .map(|(_, c)| c)
            .collect();
        no_states.push(group);
    }

    let mut with_states = match model {
        Some(m) => m.state_generators(&ring)?,
        None => Vec::new(),
    };

    for q in known {
        let q = q.as_ref();
        let f = match ring.parse(q) {
            Ok(f) => f,
            Err(e) => {
                log::warn!("known quantity `{}` is dropped: {}", q, e);
                continue;
            }
        };
        let uses_states = f
            .numerator()
            .variables()
            .union(&f.denominator().variables())
            .any(|&i| !is_param(i));
        let (num, den) = f.into_parts();
        if uses_states {
            with_states.push(vec![den, num]);
        } else {
            no_states.push(vec![den, num]);
        }
    }

    log::debug!(
        "extracted {} parameter-only and {} state generator groups",
        no_states.len(),
        with_states.len()
    );
    Ok(GeneratorBuckets {
        with_states,
        no_states,
        ring,
    })
}

/// The trivial group generating Q over `ring`.
pub(crate) fn ground_field(ring: &Ring) -> GeneratorGroup {
    vec![ring.constant(Rational::one())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiability::ode::OdeSystem;

    fn io() -> IoEquations {
        let ring = Ring::new(["a", "b", "y_0", "y_1", "y_2"]);
        IoEquations::parse(ring, &["y_2 + (a*b + 1)*y_1 + a*b*y_0"]).unwrap()
    }

    #[test]
    fn test_coefficient_groups() {
        let io = io();
        let params = vec!["a".to_string(), "b".to_string()];
        let buckets = extract_generators::<OdeSystem, &str>(&io, &params, &[], false, None).unwrap();
        assert_eq!(buckets.no_states.len(), 1);
        assert!(buckets.with_states.is_empty());

        let ring = &buckets.ring;
        let group = &buckets.no_states[0];
        assert_eq!(group.len(), 3);
        for expected in ["1", "a*b + 1", "a*b"] {
            let p = ring.parse_poly(expected).unwrap();
            assert!(group.contains(&p));
        }
    }

    #[test]
    fn test_known_quantities_are_routed_or_dropped() {
        let io = io();
        let params = vec!["a".to_string(), "b".to_string()];
        let buckets =
            extract_generators::<OdeSystem, &str>(&io, &params, &["a", "y_1 * a", "c + 1"], false, None).unwrap();
        // `c` is not in the ring
        assert_eq!(buckets.no_states.len(), 2);
        assert_eq!(buckets.with_states.len(), 1);
    }

    #[test]
    fn test_state_bucket_uses_the_model_ring() {
        let model = OdeSystem::new(&["a", "b"], &["x"], &[])
            .with_dynamics("x", "-a*x")
            .unwrap()
            .with_output("y", "b*x")
            .unwrap()
            .with_io_equation("y_1 + a*y_0");
        let io = model
            .io_equations(crate::identifiability::VariableChangePolicy::Default)
            .unwrap();
        let params = model.parameters();
        let buckets = extract_generators(&io, &params, &["x^2"], true, Some(&model)).unwrap();
        assert!(buckets.ring.contains("x"));
        // b*x, -a*b*x and the known x^2
        assert_eq!(buckets.with_states.len(), 3);
        assert_eq!(buckets.no_states.len(), 1);
    }
}
