//! The constraint database: polymorphic storage for clauses and
//! pseudo-Boolean inequalities, their watch lists, and the lifecycle
//! bookkeeping around attaching/detaching them (§3, §4, §9 "Constraint
//! façade").

pub mod clause;
pub mod coeff;
pub mod fat;
pub mod group;
pub mod inequality;
pub mod ineq;
pub mod propagator;
pub mod store;
pub mod term;
pub mod watch;

pub use clause::Clause;
pub use coeff::{Coeff, FatCoeff};
pub use fat::FatInequality;
pub use group::PropagatorGroup;
pub use inequality::Inequality;
pub use ineq::FixedInequality;
pub use propagator::{init_watch_clause, init_watch_ineq, update_clause, update_ineq, InitResult, WatchOutcome};
pub use store::{ConstraintStore, IneqArena};
pub use term::Term;
pub use watch::{Watch, WatchDb, Watches};

/// which arena a [`Handle`] indexes into (§9: "tagged union of
/// Clause / FixedIneq<small> / FixedIneq<big>").
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Kind {
    Clause,
    Small,
    Big,
}

/// a constraint's address inside a [`ConstraintStore`]: which
/// representation it is stored as, plus its slot index within that
/// representation's arena. Stable across substitution and
/// propagation; invalidated only once the slot is actually freed
/// (§9 "resolved with indices/handle IDs into arenas").
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Handle {
    pub kind: Kind,
    pub index: u32,
}
