//! Module `types` provides the building blocks shared by every other
//! module: the literal/variable encoding, constraint flags, and the
//! small set of common traits and error types used throughout the
//! crate.

/// literals and variables
pub mod lit;
/// bitflags used on constraints and variables
pub mod flags;
/// variable phase memory
pub mod var;

pub use self::{flags::*, lit::*, var::*};

pub use crate::{config::Config, error::PropError};

use std::fmt;

/// A constraint is identified, from the outside, by a caller-chosen id.
/// The same content may be attached under several ids at once (a proof
/// step may re-derive an already known constraint).
pub type ConstraintId = u64;

/// API for object instantiation from a [`Config`]. Implemented by every
/// stateful module of this crate except `Config` and `PropError`
/// themselves.
pub trait Instantiate {
    /// build a fresh instance sized for `n_vars` variables.
    fn instantiate(config: &Config, n_vars: u32) -> Self;
}

/// A return type used by the few operations that can fail at
/// construction time. See [`PropError`] for what counts as a domain
/// error versus an internal invariant violation.
pub type MaybeInconsistent = Result<(), PropError>;

#[derive(Debug, Default)]
pub(crate) struct Stats {
    pub(crate) num_propagations: usize,
    pub(crate) num_conflicts: usize,
    pub(crate) num_decisions: usize,
    pub(crate) hash_collisions: usize,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "propagations: {}, conflicts: {}, decisions: {}, hash collisions: {}",
            self.num_propagations, self.num_conflicts, self.num_decisions, self.hash_collisions
        )
    }
}
