//! The trail: the ground truth of which literals are currently
//! assigned, why, and at what level, plus the fixpoint propagation
//! loop built on top of it (§3 "Assignment", §4.1, §4.2).

pub mod propagate;
pub mod stack;

pub use propagate::PropagationMaster;
pub use stack::{Assignment, PropState};

use crate::cdb::Handle;

/// why a literal is on the trail: a decision has no justifying
/// constraint, a propagated literal names the [`Handle`] of the
/// constraint that forced it (§3 "reason").
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Reason {
    Decision,
    Constraint(Handle),
}

impl Reason {
    pub fn handle(&self) -> Option<Handle> {
        match self {
            Reason::Decision => None,
            Reason::Constraint(h) => Some(*h),
        }
    }
}

/// a proof-checking core has no search, so there is exactly one
/// notion of "deeper" on the trail: assignments made since the last
/// [`crate::assign::PropagationMaster::reset`] checkpoint. This is a
/// plain trail index, not a CDCL decision level (§9, Open Question:
/// "no decision levels").
pub type TrailMark = usize;
