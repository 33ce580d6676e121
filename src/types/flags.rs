//! Bitflags used by the constraint header (§3: "a header
//! `{markedForDeletion, isReason}`") and by the per-constraint
//! classification bookkeeping kept by the store.

use bitflags::bitflags;

/// API for object properties, mirroring the flag accessors of the
/// constraints and groups that carry them.
pub trait FlagIF {
    type FlagType;
    fn is(&self, flag: Self::FlagType) -> bool;
    fn set(&mut self, f: Self::FlagType, b: bool);
    fn toggle(&mut self, flag: Self::FlagType);
    fn turn_off(&mut self, flag: Self::FlagType);
    fn turn_on(&mut self, flag: Self::FlagType);
}

bitflags! {
    /// Header flags carried by every attached constraint, clause or
    /// inequality alike.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
    pub struct FlagConstraint: u16 {
        /// the constraint is detached and parked in the junkyard, but
        /// still referenced as a reason on the trail; it must not be
        /// freed until `cleanup_trail` rebuilds the trail.
        const MARKED_FOR_DELETION = 0b0000_0001;
        /// the constraint currently sits as a reason on the trail.
        const IS_REASON           = 0b0000_0010;
        /// the constraint is classified as core (considered by
        /// `rup_check(only_core = true)` and core-only effected-set
        /// enumeration).
        const IS_CORE             = 0b0000_0100;
        /// the constraint was attached at least once in the past
        /// (distinguishes "never seen" from "detached").
        const WAS_ATTACHED        = 0b0000_1000;
        /// at freeze time the constraint was found to already
        /// propagate under the empty assignment (§4.2 "Propagation-at-0
        /// test").
        const PROPAGATES_AT_ROOT  = 0b0001_0000;
        /// every subset of `watch_size` watched terms still covers
        /// `max_coeff` after any single falsification, so slack need
        /// not be recomputed on every watch update (§3).
        const ENOUGH_WATCHES      = 0b0010_0000;
    }
}

impl<T> FlagIF for T
where
    T: FlagsField,
{
    type FlagType = FlagConstraint;
    fn is(&self, flag: FlagConstraint) -> bool {
        self.flags_field().contains(flag)
    }
    fn set(&mut self, f: FlagConstraint, b: bool) {
        self.flags_field_mut().set(f, b);
    }
    fn toggle(&mut self, flag: FlagConstraint) {
        self.flags_field_mut().toggle(flag);
    }
    fn turn_off(&mut self, flag: FlagConstraint) {
        self.flags_field_mut().remove(flag);
    }
    fn turn_on(&mut self, flag: FlagConstraint) {
        self.flags_field_mut().insert(flag);
    }
}

/// implemented by every type that carries a [`FlagConstraint`] field,
/// so the blanket [`FlagIF`] impl above can reach it.
pub trait FlagsField {
    fn flags_field(&self) -> FlagConstraint;
    fn flags_field_mut(&mut self) -> &mut FlagConstraint;
}
