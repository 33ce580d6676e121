//! `PropagationMaster`: the central authority driving every attached
//! propagator to a fixpoint, recording reasons, and supporting
//! rollback and trail rebuild (§4.6, §4.7).

use crate::{
    assign::{Assignment, Reason, TrailMark},
    cdb::{update_clause, update_ineq, Coeff, ConstraintStore, Handle, IneqArena, Watch, WatchDb, Watches, WatchOutcome},
    types::{Config, Instantiate, Lit},
};
use num_bigint::BigUint;
use std::collections::HashSet;

use crate::assign::stack::PropState;

pub struct PropagationMaster {
    assignment: Assignment,
    /// how far each representation's propagator has consumed the
    /// trail (§4.6 "each propagator runs from its own qhead forward").
    qhead_clause: usize,
    qhead_small: usize,
    qhead_big: usize,
    /// set for the duration of an [`AutoReset`] scope: skips the
    /// (costly) `IS_REASON` bookkeeping since everything done under it
    /// is about to be rolled back anyway (§4.1, §4.6).
    is_temporary: bool,
}

impl Instantiate for PropagationMaster {
    fn instantiate(config: &Config, n_vars: u32) -> PropagationMaster {
        PropagationMaster {
            assignment: Assignment::instantiate(config, n_vars),
            qhead_clause: 0,
            qhead_small: 0,
            qhead_big: 0,
            is_temporary: false,
        }
    }
}

impl PropagationMaster {
    pub fn resize(&mut self, n_vars: u32) {
        self.assignment.resize(n_vars);
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    pub fn trail(&self) -> &[Lit] {
        self.assignment.trail()
    }

    pub fn trail_mark(&self) -> TrailMark {
        self.assignment.trail_len()
    }

    pub fn has_conflict(&self) -> bool {
        self.assignment.has_conflict()
    }

    pub fn conflict_reason(&self) -> Option<Reason> {
        self.assignment.conflict_reason()
    }

    pub fn is_temporary(&self) -> bool {
        self.is_temporary
    }

    /// §4.6 `enqueue`: append to the trail, assign, record the reason.
    /// If `lit` is already false, this is the conflict — recorded, not
    /// propagated as an error (§7: "conflicts ... are not errors").
    pub fn enqueue(&mut self, lit: Lit, reason: Reason, store: &mut ConstraintStore) {
        do_enqueue(&mut self.assignment, store, lit, reason, self.is_temporary);
    }

    /// §4.6 `conflict`: first call wins; later calls during the same
    /// pass are ignored so a speculative check cannot overwrite the
    /// true reason.
    pub fn record_conflict(&mut self, reason: Reason, store: &mut ConstraintStore) {
        do_conflict(&mut self.assignment, store, reason, self.is_temporary);
    }

    pub fn snapshot(&self) -> PropState {
        let mut s = self.assignment.snapshot();
        s.qhead = self.assignment.trail_len();
        s
    }

    /// §4.6 `reset`: truncate the trail and undo assignments back to
    /// `state`, clamping every propagator's private qhead down to the
    /// restored trail length.
    pub fn reset(&mut self, state: PropState) {
        self.assignment.rollback_to(state.trail_len);
        if !state.has_conflict {
            self.assignment.clear_conflict();
        }
        let len = self.assignment.trail_len();
        self.qhead_clause = self.qhead_clause.min(len);
        self.qhead_small = self.qhead_small.min(len);
        self.qhead_big = self.qhead_big.min(len);
    }

    /// §4.6 `AutoReset`: snapshot now, restore on scope exit, and mark
    /// everything done in between as temporary so `IS_REASON`
    /// bookkeeping is skipped.
    pub fn auto_reset(&mut self) -> AutoReset<'_> {
        let saved = self.snapshot();
        let prev_temporary = self.is_temporary;
        self.is_temporary = true;
        AutoReset {
            master: self,
            saved,
            prev_temporary,
        }
    }

    /// §4.6 `propagate`: run the three representations, in fixed
    /// order, to a fixpoint. `derived_active` gates whether a
    /// non-core constraint's watch hit is acted on at all (§4.5
    /// `activate`/`deactivate`) — constraints outside the active
    /// group(s) are left exactly where they are for a later call.
    pub fn propagate(&mut self, store: &mut ConstraintStore, watches: &mut Watches, derived_active: bool) {
        loop {
            let before = self.assignment.trail_len();
            drive_clause(
                &mut self.assignment,
                store,
                &mut watches.clause,
                &mut self.qhead_clause,
                derived_active,
                self.is_temporary,
            );
            if !self.assignment.has_conflict() {
                drive_ineq::<u32>(
                    &mut self.assignment,
                    store,
                    &mut watches.small,
                    &mut self.qhead_small,
                    derived_active,
                    self.is_temporary,
                );
            }
            if !self.assignment.has_conflict() {
                drive_ineq::<BigUint>(
                    &mut self.assignment,
                    store,
                    &mut watches.big,
                    &mut self.qhead_big,
                    derived_active,
                    self.is_temporary,
                );
            }
            if self.assignment.has_conflict() || self.assignment.trail_len() == before {
                break;
            }
        }
    }

    /// §4.6 `cleanupTrail`: when a reason on the trail has been
    /// detached (`MARKED_FOR_DELETION`), it can no longer justify
    /// anything — rebuild the trail in its original order, dropping
    /// any literal whose sole justification is gone, and replaying
    /// everything else exactly (decisions unconditionally, live
    /// constraints with their recorded reason, since their watches
    /// were never touched by the detach that triggered this).
    /// Post-condition: no reason left on the trail is marked deleted
    /// (§8).
    pub fn cleanup_trail(&mut self, store: &mut ConstraintStore) {
        let old_reasons: Vec<Reason> = self
            .assignment
            .trail()
            .iter()
            .map(|l| self.assignment.reason_of(l.var()))
            .collect();
        let old_reason_handles: HashSet<Handle> =
            old_reasons.iter().filter_map(Reason::handle).collect();

        let old_trail = self.assignment.rollback_all();
        self.qhead_clause = 0;
        self.qhead_small = 0;
        self.qhead_big = 0;

        let mut still_reason = HashSet::new();
        for (lit, reason) in old_trail.into_iter().zip(old_reasons) {
            match reason {
                Reason::Decision => {
                    let _ = self.assignment.assign(lit, Reason::Decision);
                }
                Reason::Constraint(h) => {
                    if store.is_marked_for_deletion(h) {
                        continue;
                    }
                    let _ = self.assignment.assign(lit, reason);
                    still_reason.insert(h);
                }
            }
        }
        for h in still_reason.iter() {
            store.set_is_reason(*h, true);
        }
        for h in old_reason_handles.difference(&still_reason) {
            store.set_is_reason(*h, false);
        }
    }
}

/// a scoped restoration of [`PropagationMaster`]'s trail state,
/// released on drop (§4.6 `AutoReset`). Holds no reference to the
/// store/watches since rolling back assignments never touches them —
/// a term's watched *position* doesn't depend on its *value*.
pub struct AutoReset<'m> {
    master: &'m mut PropagationMaster,
    saved: PropState,
    prev_temporary: bool,
}

impl AutoReset<'_> {
    pub fn master(&mut self) -> &mut PropagationMaster {
        self.master
    }
}

impl Drop for AutoReset<'_> {
    fn drop(&mut self) {
        self.master.reset(self.saved);
        self.master.is_temporary = self.prev_temporary;
    }
}

fn do_enqueue(
    assignment: &mut Assignment,
    store: &mut ConstraintStore,
    lit: Lit,
    reason: Reason,
    is_temporary: bool,
) {
    match assignment.assign(lit, reason) {
        Ok(()) => {
            if !is_temporary {
                if let Reason::Constraint(h) = reason {
                    store.set_is_reason(h, true);
                }
            }
        }
        Err(()) => do_conflict(assignment, store, reason, is_temporary),
    }
}

fn do_conflict(assignment: &mut Assignment, store: &mut ConstraintStore, reason: Reason, is_temporary: bool) {
    if !assignment.has_conflict() {
        assignment.record_conflict(reason);
        if !is_temporary {
            if let Reason::Constraint(h) = reason {
                store.set_is_reason(h, true);
            }
        }
    }
}

fn drive_clause(
    assignment: &mut Assignment,
    store: &mut ConstraintStore,
    watch_db: &mut WatchDb,
    qhead: &mut usize,
    derived_active: bool,
    is_temporary: bool,
) {
    while !assignment.has_conflict() && *qhead < assignment.trail_len() {
        let lit = assignment.trail()[*qhead];
        *qhead += 1;
        let false_lit = !lit;
        let entries = watch_db.take(false_lit);
        let mut kept = Vec::with_capacity(entries.len());
        for w in entries {
            if assignment.has_conflict()
                || (!derived_active && !store.is_core(w.handle))
                || assignment.is_true(w.blocker)
            {
                kept.push(w);
                continue;
            }
            match update_clause(store.clause_mut(w.handle), false_lit, assignment) {
                WatchOutcome::Keep => kept.push(w),
                WatchOutcome::Moved { new_watch, blocker } => {
                    store.replace_watched_lit(w.handle, false_lit, new_watch);
                    watch_db.push_back(new_watch, Watch::new(blocker, w.handle));
                }
                WatchOutcome::Unit(lits) => {
                    kept.push(w);
                    for l in lits {
                        do_enqueue(assignment, store, l, Reason::Constraint(w.handle), is_temporary);
                    }
                }
                WatchOutcome::Conflict => {
                    kept.push(w);
                    do_conflict(assignment, store, Reason::Constraint(w.handle), is_temporary);
                }
            }
        }
        watch_db.extend_back(false_lit, kept);
    }
}

fn drive_ineq<T: Coeff>(
    assignment: &mut Assignment,
    store: &mut ConstraintStore,
    watch_db: &mut WatchDb,
    qhead: &mut usize,
    derived_active: bool,
    is_temporary: bool,
) where
    ConstraintStore: IneqArena<T>,
{
    while !assignment.has_conflict() && *qhead < assignment.trail_len() {
        let lit = assignment.trail()[*qhead];
        *qhead += 1;
        let false_lit = !lit;
        let entries = watch_db.take(false_lit);
        let mut kept = Vec::with_capacity(entries.len());
        for w in entries {
            if assignment.has_conflict()
                || (!derived_active && !store.is_core(w.handle))
                || assignment.is_true(w.blocker)
            {
                kept.push(w);
                continue;
            }
            let ineq = <ConstraintStore as IneqArena<T>>::ineq_mut(store, w.handle);
            match update_ineq(ineq, false_lit, assignment) {
                WatchOutcome::Keep => kept.push(w),
                WatchOutcome::Moved { new_watch, blocker } => {
                    store.replace_watched_lit(w.handle, false_lit, new_watch);
                    watch_db.push_back(new_watch, Watch::new(blocker, w.handle));
                }
                WatchOutcome::Unit(lits) => {
                    kept.push(w);
                    for l in lits {
                        do_enqueue(assignment, store, l, Reason::Constraint(w.handle), is_temporary);
                    }
                }
                WatchOutcome::Conflict => {
                    kept.push(w);
                    do_conflict(assignment, store, Reason::Constraint(w.handle), is_temporary);
                }
            }
        }
        watch_db.extend_back(false_lit, kept);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdb::Clause;

    fn engine_bits(n: u32) -> (PropagationMaster, ConstraintStore, Watches) {
        let config = Config::with_vars(n);
        (
            PropagationMaster::instantiate(&config, n),
            ConstraintStore::new(),
            Watches::new(n),
        )
    }

    #[test]
    fn unit_propagation_via_two_clauses() {
        // {x1, x2}=1, {-x1, x3}=2, {x1}=3 (scenario 1).
        let (mut master, mut store, mut watches) = engine_bits(3);
        let c1 = store.attach_clause(1, 1, Clause::new(vec![Lit::from(1), Lit::from(2)]));
        store.set_watched_lits(c1, vec![Lit::from(1), Lit::from(2)]);
        watches.clause.register(Lit::from(1), Lit::from(2), c1);
        watches.clause.register(Lit::from(2), Lit::from(1), c1);

        let c2 = store.attach_clause(2, 2, Clause::new(vec![Lit::from(-1), Lit::from(3)]));
        store.set_watched_lits(c2, vec![Lit::from(-1), Lit::from(3)]);
        watches.clause.register(Lit::from(-1), Lit::from(3), c2);
        watches.clause.register(Lit::from(3), Lit::from(-1), c2);

        let c3 = store.attach_clause(3, 3, Clause::new(vec![Lit::from(1)]));
        store.set_watched_lits(c3, vec![Lit::from(1)]);

        master.enqueue(Lit::from(1), Reason::Constraint(c3), &mut store);
        master.propagate(&mut store, &mut watches, true);
        assert!(!master.has_conflict());
        let forced: Vec<i32> = crate::types::i32s(master.trail());
        assert!(forced.contains(&1));
        assert!(forced.contains(&3));
        assert_eq!(forced.len(), 2);
    }

    #[test]
    fn conflicting_binary_clause_is_recorded_once() {
        // {-x1, -x2} with both x1 and x2 forced true is a conflict.
        let (mut master, mut store, mut watches) = engine_bits(2);
        let c1 = store.attach_clause(1, 1, Clause::new(vec![Lit::from(-1), Lit::from(-2)]));
        store.set_watched_lits(c1, vec![Lit::from(-1), Lit::from(-2)]);
        watches.clause.register(Lit::from(-1), Lit::from(-2), c1);
        watches.clause.register(Lit::from(-2), Lit::from(-1), c1);

        master.enqueue(Lit::from(1), Reason::Decision, &mut store);
        master.enqueue(Lit::from(2), Reason::Decision, &mut store);
        master.propagate(&mut store, &mut watches, true);
        assert!(master.has_conflict());
    }

    #[test]
    fn auto_reset_undoes_everything_on_drop() {
        let (mut master, mut store, _watches) = engine_bits(2);
        let mark = master.trail_mark();
        {
            let guard = master.auto_reset();
            guard.master().enqueue(Lit::from(1), Reason::Decision, &mut store);
        }
        assert_eq!(master.trail_mark(), mark);
        assert!(!master.has_conflict());
    }
}
