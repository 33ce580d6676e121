/*!
# A pseudo-Boolean propagation core

`pbprop` is the watched-literal propagation engine behind a VeriPB-style
proof checker: given a database of pseudo-Boolean constraints (clauses
and linear `Σ aᵢℓᵢ ≥ d` inequalities over non-negative integer
coefficients, arbitrary-precision where `u32`/`i64` would overflow), it
maintains unit propagation over them incrementally as a checker attaches
and detaches proof steps, and answers the two questions a checker
repeatedly needs: is a candidate constraint implied by reverse unit
propagation (RUP), and which live constraints does a variable
substitution actually change.

There is no search, no decision heuristics, and no learning: a proof
checker drives every assignment itself, so this core only ever needs to
propagate to a fixpoint and report back.

# Examples

## Attach constraints and read off what they force

```
use pbprop::{engine::PropEngine, cdb::Inequality};

let mut engine = PropEngine::new(3);
engine.attach(Inequality::from_coeffs_lits_degree(&[1, 1], &[1, 2], 1).unwrap(), 1);
engine.attach(Inequality::from_coeffs_lits_degree(&[1, 1], &[-1, 3], 1).unwrap(), 2);
engine.attach(Inequality::from_coeffs_lits_degree(&[1], &[1], 1).unwrap(), 3);

let forced = engine.propagated_lits();
assert!(forced.contains(&1));
assert!(forced.contains(&3));
```

## Check whether a constraint is RUP

```
use pbprop::{engine::PropEngine, cdb::Inequality};

let mut engine = PropEngine::new(1);
engine.attach(Inequality::from_coeffs_lits_degree(&[1], &[1], 1).unwrap(), 1);
engine.init_propagation(false);
let candidate = Inequality::from_coeffs_lits_degree(&[1], &[1], 1).unwrap();
assert!(engine.rup_check(&candidate, false));
```
*/
/// Trail and fixpoint propagation: [`assign::Assignment`] (the
/// per-variable truth values and trail) and
/// [`assign::PropagationMaster`] (the per-representation watch-driven
/// fixpoint loop, conflict recording, and scoped rollback).
pub mod assign;
/// Constraint storage: [`cdb::Clause`]/[`cdb::FixedInequality`]/
/// [`cdb::FatInequality`] representations, the [`cdb::Inequality`]
/// façade, [`cdb::ConstraintStore`] arena, watch lists, and
/// [`cdb::PropagatorGroup`] lifecycle bookkeeping.
pub mod cdb;
/// Runtime-tunable constants for a [`engine::PropEngine`].
pub mod config;
/// The propagation façade: [`engine::PropEngine`], the single object an
/// embedding proof checker drives.
pub mod engine;
/// Domain errors raised while constructing or growing a constraint.
pub mod error;
/// Variable substitution and the "effected constraints" computation.
pub mod substitution;
/// Shared building blocks: literal/variable encoding, constraint flags,
/// and the common traits used throughout the crate.
pub mod types;

pub use {
    cdb::Inequality,
    config::Config,
    engine::PropEngine,
    error::PropError,
    substitution::Substitution,
};
