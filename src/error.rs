//! Domain errors surfaced by the core (§7). Conflicts reached during
//! propagation are *not* represented here — they are a normal outcome
//! recorded in [`crate::assign::PropState`] and queried by callers, not
//! an error. Internal invariant violations (a busy `FatInequality`
//! reused re-entrantly, a negative coefficient reaching the arithmetic
//! core) are assertion-style panics, not `PropError` variants: by the
//! time one fires the engine is in an undefined state and must be
//! discarded, which a `Result` cannot express usefully.

use std::fmt;

/// A domain error raised while constructing or growing a constraint
/// or the engine itself.
#[derive(Debug, Eq, PartialEq)]
pub enum PropError {
    /// a variable id `<= 0` was supplied where a variable was expected.
    NonPositiveVariable,
    /// a degree `< 0` was supplied to an inequality constructor.
    NegativeDegree,
    /// a coefficient does not fit the requested fixed-width
    /// representation; the caller should retry with the
    /// arbitrary-precision representation.
    CoefficientOverflow,
    /// an unconditional root-level assignment produced an immediate
    /// conflict (the database is unsatisfiable at the empty trail).
    RootLevelConflict,
}

impl fmt::Display for PropError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PropError::NonPositiveVariable => write!(f, "non-positive variable id"),
            PropError::NegativeDegree => write!(f, "negative degree"),
            PropError::CoefficientOverflow => write!(f, "coefficient overflow"),
            PropError::RootLevelConflict => write!(f, "conflict at the root level"),
        }
    }
}

impl std::error::Error for PropError {}
