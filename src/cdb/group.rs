//! `PropagatorGroup`: lifecycle bookkeeping for the constraints a
//! [`crate::engine::PropEngine`] is actively maintaining, plus the
//! occurrence index used to compute which constraints are "effected"
//! by a substitution (§4.7, §4.9).
//!
//! A constraint moves through four lists as it is built up and torn
//! down: freshly derived content starts `unhandled`; once normalized
//! and ready for storage it becomes `unattached`; once given watch
//! literals and registered in the watch lists it becomes
//! `unregistered` no more and is finally `handled` — fully live and
//! taking part in propagation. Detaching walks the same stages in
//! reverse.

use crate::{cdb::Handle, types::VarId};
use std::collections::HashMap;

#[cfg(feature = "deterministic")]
type BuildHasher = ahash::RandomState;
#[cfg(not(feature = "deterministic"))]
type BuildHasher = std::collections::hash_map::RandomState;

#[derive(Default)]
pub struct PropagatorGroup {
    /// derived but not yet normalized/deduped against the store.
    unhandled: Vec<Handle>,
    /// stored, but not yet given watch literals.
    unattached: Vec<Handle>,
    /// given watch literals, but not yet registered in the watch
    /// lists (i.e. mid-registration; always empty between calls).
    unregistered: Vec<Handle>,
    /// fully live: stored, watched, and registered.
    handled: Vec<Handle>,
    /// `var -> constraints mentioning var`, kept in step with
    /// `handled` so [`PropagatorGroup::compute_effected`] doesn't need
    /// to scan the whole group (§4.7).
    occurrence: HashMap<VarId, Vec<Handle>, BuildHasher>,
    /// every live constraint flagged `PROPAGATES_AT_ROOT`, so a mode
    /// switch that resets the trail to empty (§4.7 `initPropagation`)
    /// can replay exactly these without rescanning `handled` (§4.5
    /// "propagate-at-level-0 list").
    propagating_at_root: Vec<Handle>,
}

impl PropagatorGroup {
    pub fn new() -> PropagatorGroup {
        PropagatorGroup::default()
    }

    pub fn push_unhandled(&mut self, handle: Handle) {
        self.unhandled.push(handle);
    }

    pub fn drain_unhandled(&mut self) -> Vec<Handle> {
        std::mem::take(&mut self.unhandled)
    }

    pub fn push_unattached(&mut self, handle: Handle) {
        self.unattached.push(handle);
    }

    pub fn drain_unattached(&mut self) -> Vec<Handle> {
        std::mem::take(&mut self.unattached)
    }

    pub fn push_unregistered(&mut self, handle: Handle) {
        self.unregistered.push(handle);
    }

    pub fn drain_unregistered(&mut self) -> Vec<Handle> {
        std::mem::take(&mut self.unregistered)
    }

    /// the constraint has cleared every stage: record it as live and
    /// index the variables it mentions (§4.9). `propagates_at_root`
    /// mirrors the constraint's `PROPAGATES_AT_ROOT` flag at the time
    /// it became handled (§4.5, §4.7).
    pub fn mark_handled(&mut self, handle: Handle, vars: &[VarId], propagates_at_root: bool) {
        self.handled.push(handle);
        for &v in vars {
            self.occurrence.entry(v).or_default().push(handle);
        }
        if propagates_at_root {
            self.propagating_at_root.push(handle);
        }
    }

    /// reverse of [`PropagatorGroup::mark_handled`]: a constraint is
    /// being fully torn down (detach reached zero references and it
    /// was not a trail reason), or is being relocated to the other
    /// group ([`crate::engine::PropEngine::move_to_core`]).
    pub fn unmark_handled(&mut self, handle: Handle, vars: &[VarId]) {
        self.handled.retain(|h| *h != handle);
        for &v in vars {
            if let Some(list) = self.occurrence.get_mut(&v) {
                list.retain(|h| *h != handle);
            }
        }
        self.propagating_at_root.retain(|h| *h != handle);
    }

    /// every live constraint that propagates under the empty
    /// assignment (§4.7 "replay core's propagate-at-0 list").
    pub fn propagating_at_root(&self) -> &[Handle] {
        &self.propagating_at_root
    }

    pub fn handled(&self) -> &[Handle] {
        &self.handled
    }

    pub fn is_handled(&self, handle: Handle) -> bool {
        self.handled.contains(&handle)
    }

    /// every live constraint mentioning `var` (§4.7 "effected
    /// constraint computation"): the set a substitution of `var` must
    /// re-check.
    pub fn compute_effected(&self, var: VarId) -> &[Handle] {
        self.occurrence.get(&var).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.handled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handled.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdb::Kind;

    fn h(i: u32) -> Handle {
        Handle { kind: Kind::Clause, index: i }
    }

    #[test]
    fn lifecycle_stages_drain_independently() {
        let mut g = PropagatorGroup::new();
        g.push_unhandled(h(0));
        g.push_unhandled(h(1));
        assert_eq!(g.drain_unhandled().len(), 2);
        assert!(g.drain_unhandled().is_empty());
    }

    #[test]
    fn occurrence_index_tracks_mark_and_unmark() {
        let mut g = PropagatorGroup::new();
        g.mark_handled(h(0), &[1, 2], false);
        g.mark_handled(h(1), &[2], true);
        assert_eq!(g.compute_effected(2).len(), 2);
        assert_eq!(g.propagating_at_root(), &[h(1)]);
        g.unmark_handled(h(0), &[1, 2]);
        assert_eq!(g.compute_effected(2).len(), 1);
        assert_eq!(g.compute_effected(1).len(), 0);
    }
}
