//! Randomized field-membership checks for fields of rational functions,
//! and global identifiability of ODE model parameters built on them.

pub mod diagnostics;
pub mod errors;
pub mod groebner;
pub mod identifiability;
pub mod membership;
pub mod poly;

pub use diagnostics::Diagnostics;
pub use errors::IdentError;
pub use groebner::{EngineChoice, GroebnerBasis, GroebnerEngine, NaiveBuchberger, OptimizedBuchberger};
pub use identifiability::{
    assess_global_identifiability, check_identifiability, check_identifiability_io,
    extract_identifiable_functions, Assessment, IoEquations, OdeModel, OdeSystem,
    VariableChangePolicy,
};
pub use membership::{check_field_membership, check_field_membership_at, check_field_membership_in};
pub use poly::{MonomialOrder, MultiPoly, Rational, RationalFunction, Ring};
