use displaydoc::Display;
use ark_std::string::String;

/// Errors raised by the membership and identifiability pipeline.
///
/// Public operations return `anyhow::Error`; callers that need to branch
/// on the failure kind can `downcast_ref::<IdentError>()`.
#[derive(Display, Debug, Clone, PartialEq)]
pub enum IdentError {
    /// probability must lie strictly between 0 and 1, got {0}
    InvalidProbability(f64),
    /// at least one generator group is required
    EmptyGenerators,
    /// generator group {0} is empty
    EmptyGroup(usize),
    /// unknown Groebner engine `{0}`
    UnknownEngine(String),
    /// rational function `{0}` has a zero denominator
    ZeroDenominator(String),
    /// dimension mismatch: expected {expected}, found {found}
    DimensionMismatch { expected: usize, found: usize },
    /// variable `{0}` is not part of the ring
    UnknownVariable(String),
    /// failed to parse `{input}`: {reason}
    Parse { input: String, reason: String },
    /// polynomials of one ideal use different monomial orders
    MixedOrders,
    /// all {0} sampled points hit a degenerate locus
    DegenerateSample(usize),
    /// state `{0}` has no dynamics
    MissingDynamics(String),
}

impl std::error::Error for IdentError {}
