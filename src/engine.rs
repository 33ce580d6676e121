//! `PropEngine`: the façade tying the constraint store, watch
//! databases, propagation trail and propagator groups into the single
//! object an embedding proof checker drives (§2 item 8, §6).
//!
//! Every operation here is a thin dispatcher: the actual algorithms
//! live in [`crate::cdb`] (storage, watches) and [`crate::assign`]
//! (the trail, the fixpoint loop). `PropEngine` owns the wiring between
//! them — which group a constraint belongs to, when watches get
//! (re)installed, and the few places (RUP checking, effected-constraint
//! computation) where several of those pieces have to cooperate in one
//! call.

use crate::{
    assign::{propagate::AutoReset, PropagationMaster, Reason},
    cdb::{
        init_watch_clause, init_watch_ineq, propagator::find_blocker, ConstraintStore, Handle, Inequality, Kind,
        PropagatorGroup, Watches,
    },
    substitution::Substitution,
    types::{Config, ConstraintId, Instantiate, Lit, VarId},
};
use std::collections::HashSet;

/// a constraint `compute_effected` found changed by the substitution,
/// paired with the smallest id it is currently attached under (§4.10
/// "carrying the originating id" — a checker uses this to report which
/// proof step the rewritten constraint came from).
#[derive(Clone, Debug)]
pub struct Effected {
    pub min_id: ConstraintId,
    pub ineq: Inequality,
}

#[derive(Clone, Copy, Eq, PartialEq)]
enum GroupKind {
    Core,
    Derived,
}

/// the propagation core a proof checker drives one step at a time:
/// attach/detach constraints, ask it to propagate, and query whether a
/// candidate constraint is RUP or whether a substitution changes
/// anything (§6).
pub struct PropEngine {
    n_vars: u32,
    store: ConstraintStore,
    watches: Watches,
    master: PropagationMaster,
    core: PropagatorGroup,
    derived: PropagatorGroup,
    /// `false` between a `core_only` `init_propagation` and the next
    /// call that reactivates the derived group (§4.7 `activate`/
    /// `deactivate`).
    derived_active: bool,
    /// set whenever a `detach` frees a slot that was still a trail
    /// reason; `init_propagation` must rebuild the trail before relying
    /// on it again (§4.6 `cleanupTrail`).
    has_detached: bool,
    rup_calls_since_full_check: usize,
    config: Config,
}

impl Instantiate for PropEngine {
    fn instantiate(config: &Config, n_vars: u32) -> PropEngine {
        let n_vars = n_vars.max(config.initial_vars);
        PropEngine {
            n_vars,
            store: ConstraintStore::new(),
            watches: Watches::new(n_vars),
            master: PropagationMaster::instantiate(config, n_vars),
            core: PropagatorGroup::new(),
            derived: PropagatorGroup::new(),
            derived_active: true,
            has_detached: false,
            rup_calls_since_full_check: 0,
            config: config.clone(),
        }
    }
}

impl PropEngine {
    pub fn new(n_vars: u32) -> PropEngine {
        PropEngine::instantiate(&Config::with_vars(n_vars), n_vars)
    }

    pub fn num_vars(&self) -> u32 {
        self.n_vars
    }

    /// §6 `increaseNumVarsTo`: variable counts only ever grow.
    pub fn increase_num_vars_to(&mut self, n_vars: u32) {
        if n_vars > self.n_vars {
            self.n_vars = n_vars;
            self.master.resize(n_vars);
            self.watches.resize(n_vars);
        }
    }

    pub fn store(&self) -> &ConstraintStore {
        &self.store
    }

    pub fn master(&self) -> &PropagationMaster {
        &self.master
    }

    // ---- attach / detach ------------------------------------------------

    /// attach `ineq` under `id` as a derived constraint (§4.5 `attach`).
    pub fn attach(&mut self, ineq: Inequality, id: ConstraintId) -> Handle {
        self.attach_with(ineq, id, false)
    }

    /// attach `ineq` under `id` directly into the core group (§4.5
    /// `attachCore`) — used for constraints a checker already knows it
    /// will need for the lifetime of the proof (e.g. the input formula).
    pub fn attach_core(&mut self, ineq: Inequality, id: ConstraintId) -> Handle {
        self.attach_with(ineq, id, true)
    }

    fn attach_with(&mut self, ineq: Inequality, id: ConstraintId, is_core: bool) -> Handle {
        let hash = ineq.content_hash();
        let handle = match ineq {
            Inequality::Clause(c) => self.store.attach_clause(hash, id, c),
            Inequality::Small(i) => self.store.attach_small(hash, id, i),
            Inequality::Big(i) => self.store.attach_big(hash, id, i),
        };
        if self.store.attach_count(handle) == 1 {
            self.store.flags_mut(handle).insert(crate::types::FlagConstraint::WAS_ATTACHED);
            if is_core {
                self.store.move_to_core(handle);
            }
            let group = if self.store.is_core(handle) { &mut self.core } else { &mut self.derived };
            group.push_unhandled(handle);
        }
        handle
    }

    /// §4.5 `detach`: drop `id`'s reference to `handle`; returns `true`
    /// iff that was the last reference and the constraint actually left
    /// propagation.
    pub fn detach(&mut self, handle: Handle, id: ConstraintId) -> bool {
        if !self.store.is_attached(handle) {
            return false;
        }
        let was_reason = self.store.is_reason(handle);
        let vars = self.vars_of_handle(handle);
        let which = if self.store.is_core(handle) { GroupKind::Core } else { GroupKind::Derived };
        let watch_db = self.watch_db_for(handle.kind);
        self.store.detach(handle, id, watch_db);
        let left_propagation = !self.store.is_attached(handle);
        if left_propagation {
            self.group_mut(which).unmark_handled(handle, &vars);
            if was_reason {
                self.has_detached = true;
            }
        }
        left_propagation
    }

    /// §4.5 `getDeletions`: like `detach`, but drops the single
    /// most-recently-attached id and reports every id the constraint
    /// was ever attached under, if this detach is the one that retires
    /// it — the shape a checker's deletion proof step needs.
    pub fn get_deletions(&mut self, handle: Handle) -> Vec<ConstraintId> {
        if !self.store.is_attached(handle) {
            return Vec::new();
        }
        let was_reason = self.store.is_reason(handle);
        let vars = self.vars_of_handle(handle);
        let which = if self.store.is_core(handle) { GroupKind::Core } else { GroupKind::Derived };
        let watch_db = self.watch_db_for(handle.kind);
        let ids = self.store.get_deletions(handle, watch_db);
        if !ids.is_empty() {
            self.group_mut(which).unmark_handled(handle, &vars);
            if was_reason {
                self.has_detached = true;
            }
        }
        ids
    }

    /// §4.5 `moveToCore`: relocate a single derived constraint into the
    /// core group, ensuring it is fully handled first.
    pub fn move_to_core(&mut self, handle: Handle) {
        if self.store.is_core(handle) {
            return;
        }
        self.attach_pending();
        let vars = self.vars_of_handle(handle);
        let propagates_at_root = self.store.propagates_at_root(handle);
        self.derived.unmark_handled(handle, &vars);
        self.store.move_to_core(handle);
        self.core.mark_handled(handle, &vars, propagates_at_root);
    }

    /// §4.5 `moveAllToCore`: promote every currently-handled derived
    /// constraint, e.g. once a checker has established it will need the
    /// whole derived set for the rest of the proof.
    pub fn move_all_to_core(&mut self) {
        self.attach_pending();
        let handles: Vec<Handle> = self.derived.handled().to_vec();
        for handle in handles {
            let vars = self.vars_of_handle(handle);
            let propagates_at_root = self.store.propagates_at_root(handle);
            self.derived.unmark_handled(handle, &vars);
            self.store.move_to_core(handle);
            self.core.mark_handled(handle, &vars, propagates_at_root);
        }
    }

    // ---- propagation ------------------------------------------------

    /// §4.7 `initPropagation`: make sure every constraint the active
    /// group(s) hold is stored, watched and registered, rebuilding the
    /// trail first if a detach left a dangling reason behind.
    /// `core_only` deactivates the derived group for the duration —
    /// useful for a checker re-verifying just the input formula.
    pub fn init_propagation(&mut self, core_only: bool) {
        if core_only && self.derived_active {
            self.derived_active = false;
            self.master.reset(crate::assign::PropState { trail_len: 0, has_conflict: false, qhead: 0 });
            self.replay_root(GroupKind::Core);
        } else if self.has_detached && !self.trail_is_clean() {
            self.master.cleanup_trail(&mut self.store);
            self.replay_root(GroupKind::Core);
            if !core_only {
                self.replay_root(GroupKind::Derived);
            }
        } else if !core_only && !self.derived_active {
            self.derived_active = true;
            self.replay_root(GroupKind::Derived);
        }

        self.attach_pending_group(GroupKind::Core);
        if !core_only {
            self.attach_pending_group(GroupKind::Derived);
        }

        if self.has_detached {
            self.store.flush_junkyards();
            self.has_detached = false;
        }
    }

    /// §4.6 `propagate`: drive every representation to a fixpoint.
    pub fn propagate(&mut self) {
        self.master.propagate(&mut self.store, &mut self.watches, self.derived_active);
    }

    /// §6 `propagatedLits`: every literal currently forced, after
    /// bringing the active groups up to date and running propagation
    /// once more.
    pub fn propagated_lits(&mut self) -> Vec<i32> {
        self.init_propagation(false);
        self.propagate();
        crate::types::i32s(self.master.trail())
    }

    /// §6 `checkSat`: is the formula (core and derived constraints)
    /// satisfiable under the literals in `lits` enqueued as decisions?
    /// `[]` means yes (every variable got a value), `[0]` means no, a
    /// non-empty list without a leading `0` means propagation stalled
    /// with some variables still undetermined (§9 Open Question).
    pub fn check_sat(&mut self, lits: &[i32]) -> Vec<i32> {
        self.init_propagation(false);
        self.propagate();
        self.propagate4sat(lits)
    }

    /// §6 `propagate4sat`: enqueue `lits` as decisions, propagate, and
    /// if anything is left undetermined, decide every remaining
    /// variable false and propagate once more — the same two-pass
    /// shape the original checker uses to turn "still some freedom
    /// left" into a concrete witness or a conflict. Unlike `rup_check`,
    /// this permanently commits whatever it decides; callers that want
    /// a throwaway check should wrap the call in their own
    /// `auto_reset`-style scope.
    pub fn propagate4sat(&mut self, lits: &[i32]) -> Vec<i32> {
        for &raw in lits {
            if self.master.has_conflict() {
                break;
            }
            let l = Lit::from(raw);
            if self.master.assignment().is_undef(l) {
                self.master.enqueue(l, Reason::Decision, &mut self.store);
            } else if self.master.assignment().is_false(l) {
                self.master.record_conflict(Reason::Decision, &mut self.store);
            }
        }
        self.propagate();

        if self.master.has_conflict() {
            return vec![0];
        }

        let undetermined: Vec<VarId> = (1..=self.n_vars)
            .filter(|&v| self.master.assignment().is_undef(Lit::new(v, false)))
            .collect();
        if undetermined.is_empty() {
            return Vec::new();
        }

        for v in undetermined {
            if self.master.has_conflict() {
                break;
            }
            if self.master.assignment().is_undef(Lit::new(v, false)) {
                self.master.enqueue(Lit::new(v, false), Reason::Decision, &mut self.store);
            }
        }
        self.propagate();

        if self.master.has_conflict() {
            vec![0]
        } else {
            Vec::new()
        }
    }

    // ---- RUP ------------------------------------------------------------

    /// §4.8 `rupCheck`: is `ineq` implied by unit propagation over the
    /// active constraints once its negation is assumed? Runs inside an
    /// `AutoReset` scope, so every assignment made to test this — the
    /// negated constraint's own watches included — is undone before
    /// returning, regardless of the outcome.
    pub fn rup_check(&mut self, ineq: &Inequality, only_core: bool) -> bool {
        self.init_propagation(only_core);

        self.rup_calls_since_full_check += 1;
        if self.rup_calls_since_full_check > self.config.rup_full_check_period {
            self.propagate();
            self.rup_calls_since_full_check = 0;
        }

        if self.master.has_conflict() {
            return true;
        }

        let negated = ineq.negated();
        let aux = match negated {
            Inequality::Clause(c) => self.store.insert_temp_clause(c),
            Inequality::Small(i) => self.store.insert_temp_small(i),
            Inequality::Big(i) => self.store.insert_temp_big(i),
        };

        let conflicting = {
            let mut guard = self.master.auto_reset();
            install_aux_watches(&mut self.store, &mut self.watches, aux, &mut guard);
            if !guard.master().has_conflict() {
                let derived_active = self.derived_active;
                guard.master().propagate(&mut self.store, &mut self.watches, derived_active);
            }
            guard.master().has_conflict()
        };

        let final_watched = self.store.watched_lits(aux).to_vec();
        {
            let watch_db = self.watch_db_for(aux.kind);
            for lit in &final_watched {
                watch_db.unregister(*lit, aux);
            }
        }
        self.store.remove_temp(aux);

        conflicting
    }

    /// §4.10 `computeEffected`: every live constraint whose form
    /// changes under `sub` — neither implied by its un-substituted
    /// original nor already present in the store verbatim.
    pub fn compute_effected(&mut self, sub: &Substitution, only_core: bool) -> Vec<Effected> {
        self.attach_pending();
        let mut seen: HashSet<Handle> = HashSet::new();
        let mut out = Vec::new();
        self.collect_effected(GroupKind::Core, sub, &mut seen, &mut out);
        if !only_core {
            self.collect_effected(GroupKind::Derived, sub, &mut seen, &mut out);
        }
        out
    }

    fn collect_effected(
        &self,
        which: GroupKind,
        sub: &Substitution,
        seen: &mut HashSet<Handle>,
        out: &mut Vec<Effected>,
    ) {
        let group = self.group(which);
        for var in sub.domain() {
            // §4.10: a variable mapped to ⊤ contributes nothing — every
            // constraint mentioning it is trivially satisfied by the
            // substitution in a way that can never make it *newly*
            // falsifiable, so it is never "effected".
            if sub.get(var) == Some(Lit::TRUE) {
                continue;
            }
            for &handle in group.compute_effected(var) {
                if !seen.insert(handle) {
                    continue;
                }
                let original = self.content_of(handle);
                let Some(rewritten) = sub.apply(&original) else {
                    continue;
                };
                if original.implies(&rewritten) {
                    continue;
                }
                if self.store.find(&rewritten).is_some() {
                    continue;
                }
                let min_id = self.store.min_id(handle).unwrap_or(0);
                out.push(Effected { min_id, ineq: rewritten });
            }
        }
    }

    // ---- internal plumbing ------------------------------------------

    fn content_of(&self, handle: Handle) -> Inequality {
        match handle.kind {
            Kind::Clause => Inequality::Clause(self.store.clause(handle).clone()),
            Kind::Small => Inequality::Small(self.store.small_ineq(handle).clone()),
            Kind::Big => Inequality::Big(self.store.big_ineq(handle).clone()),
        }
    }

    fn vars_of_handle(&self, handle: Handle) -> Vec<VarId> {
        match handle.kind {
            Kind::Clause => self.store.clause(handle).iter().map(|l| l.var()).collect(),
            Kind::Small => self.store.small_ineq(handle).terms().iter().map(|t| t.lit.var()).collect(),
            Kind::Big => self.store.big_ineq(handle).terms().iter().map(|t| t.lit.var()).collect(),
        }
    }

    fn watch_db_for(&mut self, kind: Kind) -> &mut crate::cdb::WatchDb {
        match kind {
            Kind::Clause => &mut self.watches.clause,
            Kind::Small => &mut self.watches.small,
            Kind::Big => &mut self.watches.big,
        }
    }

    fn group(&self, which: GroupKind) -> &PropagatorGroup {
        match which {
            GroupKind::Core => &self.core,
            GroupKind::Derived => &self.derived,
        }
    }

    fn group_mut(&mut self, which: GroupKind) -> &mut PropagatorGroup {
        match which {
            GroupKind::Core => &mut self.core,
            GroupKind::Derived => &mut self.derived,
        }
    }

    /// drain both groups' `unhandled`/`unattached` queues, installing
    /// watches for everything found (§4.7).
    fn attach_pending(&mut self) {
        self.attach_pending_group(GroupKind::Core);
        self.attach_pending_group(GroupKind::Derived);
    }

    fn attach_pending_group(&mut self, which: GroupKind) {
        let handles: Vec<Handle> = {
            let group = self.group_mut(which);
            let mut v = group.drain_unhandled();
            v.extend(group.drain_unattached());
            v
        };
        for handle in handles {
            self.install_watches(handle, which);
        }
    }

    /// install (or reinstall) `handle`'s watches against the current
    /// assignment, process whatever it immediately forces or conflicts
    /// on, and mark it handled in `which` (§4.2 `initWatch`, §4.7).
    fn install_watches(&mut self, handle: Handle, which: GroupKind) {
        let (forced, conflict) = compute_and_register_watches(&mut self.store, &mut self.watches, handle, self.master.assignment());
        if conflict {
            self.master.record_conflict(Reason::Constraint(handle), &mut self.store);
        } else {
            for lit in forced {
                self.master.enqueue(lit, Reason::Constraint(handle), &mut self.store);
            }
        }
        let vars = self.vars_of_handle(handle);
        let propagates_at_root = self.store.propagates_at_root(handle);
        self.group_mut(which).mark_handled(handle, &vars, propagates_at_root);
    }

    /// recompute an already-handled constraint's watches against the
    /// (now reset-to-root) assignment, without touching group
    /// membership or the occurrence index — used when a mode switch
    /// resets the trail to empty and the `propagate_at_root` list must
    /// be replayed from scratch (§4.7).
    fn replay_handle(&mut self, handle: Handle) {
        let (forced, conflict) = compute_and_register_watches(&mut self.store, &mut self.watches, handle, self.master.assignment());
        if conflict {
            self.master.record_conflict(Reason::Constraint(handle), &mut self.store);
        } else {
            for lit in forced {
                self.master.enqueue(lit, Reason::Constraint(handle), &mut self.store);
            }
        }
    }

    fn replay_root(&mut self, which: GroupKind) {
        let handles: Vec<Handle> = self.group(which).propagating_at_root().to_vec();
        for handle in handles {
            if self.master.has_conflict() {
                break;
            }
            self.replay_handle(handle);
        }
    }

    /// §4.6: no reason currently on the trail is a detached-but-parked
    /// constraint. `cleanup_trail` only needs to run when this is false.
    fn trail_is_clean(&self) -> bool {
        self.master.trail().iter().all(|l| match self.master.assignment().reason_of(l.var()) {
            Reason::Decision => true,
            Reason::Constraint(h) => !self.store.is_marked_for_deletion(h),
        })
    }
}

/// the shared tail of installing a constraint's watches from scratch —
/// used both for a handle becoming `handled` for the first time and for
/// replaying one that already is (§4.2 `initWatch`). Unregisters
/// whatever the handle was previously registered under (a no-op the
/// first time, since `watched_lits` starts empty) before registering
/// the freshly computed set, so the two call sites never leave a stale
/// watch-list entry behind.
fn compute_and_register_watches(
    store: &mut ConstraintStore,
    watches: &mut Watches,
    handle: Handle,
    assignment: &crate::assign::Assignment,
) -> (Vec<Lit>, bool) {
    let old_watched = store.watched_lits(handle).to_vec();
    let watch_db = match handle.kind {
        Kind::Clause => &mut watches.clause,
        Kind::Small => &mut watches.small,
        Kind::Big => &mut watches.big,
    };
    for lit in &old_watched {
        watch_db.unregister(*lit, handle);
    }

    let (watched, forced, conflict, blockers) = match handle.kind {
        Kind::Clause => {
            let r = init_watch_clause(store.clause_mut(handle), assignment);
            let blockers = match r.watched.len() {
                2 => vec![r.watched[1], r.watched[0]],
                1 => vec![Lit::TRUE],
                _ => vec![],
            };
            (r.watched, r.forced, r.conflict, blockers)
        }
        Kind::Small => {
            let r = init_watch_ineq(store.small_ineq_mut(handle), assignment);
            let blocker = find_blocker(store.small_ineq(handle));
            let n = r.watched.len();
            (r.watched, r.forced, r.conflict, vec![blocker; n])
        }
        Kind::Big => {
            let r = init_watch_ineq(store.big_ineq_mut(handle), assignment);
            let blocker = find_blocker(store.big_ineq(handle));
            let n = r.watched.len();
            (r.watched, r.forced, r.conflict, vec![blocker; n])
        }
    };

    let watch_db = match handle.kind {
        Kind::Clause => &mut watches.clause,
        Kind::Small => &mut watches.small,
        Kind::Big => &mut watches.big,
    };
    for (lit, blocker) in watched.iter().zip(blockers.iter()) {
        watch_db.register(*lit, *blocker, handle);
    }
    store.set_watched_lits(handle, watched);

    (forced, conflict)
}

/// install the transient RUP negation buffer's watches (§4.8): same
/// shape as [`compute_and_register_watches`], but runs through the
/// `AutoReset` guard's borrowed assignment since the caller is already
/// inside that scope, and keeps `store.watched_lits` in sync so the
/// caller can clean up using the *final* registration even if
/// propagation moved a watch mid-scope.
fn install_aux_watches(store: &mut ConstraintStore, watches: &mut Watches, aux: Handle, guard: &mut AutoReset<'_>) {
    let (watched, forced, conflict, blockers) = match aux.kind {
        Kind::Clause => {
            let r = init_watch_clause(store.clause_mut(aux), guard.master().assignment());
            let blockers = match r.watched.len() {
                2 => vec![r.watched[1], r.watched[0]],
                1 => vec![Lit::TRUE],
                _ => vec![],
            };
            (r.watched, r.forced, r.conflict, blockers)
        }
        Kind::Small => {
            let r = init_watch_ineq(store.small_ineq_mut(aux), guard.master().assignment());
            let blocker = find_blocker(store.small_ineq(aux));
            let n = r.watched.len();
            (r.watched, r.forced, r.conflict, vec![blocker; n])
        }
        Kind::Big => {
            let r = init_watch_ineq(store.big_ineq_mut(aux), guard.master().assignment());
            let blocker = find_blocker(store.big_ineq(aux));
            let n = r.watched.len();
            (r.watched, r.forced, r.conflict, vec![blocker; n])
        }
    };

    let watch_db = match aux.kind {
        Kind::Clause => &mut watches.clause,
        Kind::Small => &mut watches.small,
        Kind::Big => &mut watches.big,
    };
    for (lit, blocker) in watched.iter().zip(blockers.iter()) {
        watch_db.register(*lit, *blocker, aux);
    }
    store.set_watched_lits(aux, watched);

    if conflict {
        guard.master().record_conflict(Reason::Constraint(aux), store);
    } else {
        for lit in forced {
            guard.master().enqueue(lit, Reason::Constraint(aux), store);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_clauses_propagate_through_the_engine() {
        // {x1, x2}=1, {-x1, x3}=2, {x1}=3 (spec scenario 1).
        let mut engine = PropEngine::new(3);
        engine.attach(Inequality::from_coeffs_lits_degree(&[1, 1], &[1, 2], 1).unwrap(), 1);
        engine.attach(Inequality::from_coeffs_lits_degree(&[1, 1], &[-1, 3], 1).unwrap(), 2);
        engine.attach(Inequality::from_coeffs_lits_degree(&[1], &[1], 1).unwrap(), 3);

        let forced = engine.propagated_lits();
        assert!(forced.contains(&1));
        assert!(forced.contains(&3));
        assert!(!engine.master().has_conflict());
    }

    #[test]
    fn ineq_forces_unit_at_root() {
        // 3x1 + 2x2 + 2x3 >= 3 (spec scenario 2): x1 is forced immediately.
        let mut engine = PropEngine::new(3);
        engine.attach(Inequality::from_coeffs_lits_degree(&[3, 2, 2], &[1, 2, 3], 3).unwrap(), 1);
        let forced = engine.propagated_lits();
        assert_eq!(forced, vec![1]);
    }

    #[test]
    fn rup_check_confirms_an_implied_unit() {
        let mut engine = PropEngine::new(2);
        engine.attach(Inequality::from_coeffs_lits_degree(&[1, 1], &[1, 2], 1).unwrap(), 1);
        engine.init_propagation(false);
        let candidate = Inequality::from_coeffs_lits_degree(&[1], &[1], 1).unwrap();
        // not yet implied: x2 could still be true with x1 false.
        assert!(!engine.rup_check(&candidate, false));

        let mut engine = PropEngine::new(1);
        engine.attach(Inequality::from_coeffs_lits_degree(&[1], &[1], 1).unwrap(), 1);
        engine.init_propagation(false);
        let same = Inequality::from_coeffs_lits_degree(&[1], &[1], 1).unwrap();
        assert!(engine.rup_check(&same, false));
    }

    #[test]
    fn rup_check_leaves_no_trace_on_the_trail() {
        let mut engine = PropEngine::new(1);
        engine.attach(Inequality::from_coeffs_lits_degree(&[1], &[1], 1).unwrap(), 1);
        engine.init_propagation(false);
        engine.propagate();
        let mark = engine.master().trail().len();
        let candidate = Inequality::from_coeffs_lits_degree(&[1], &[1], 1).unwrap();
        assert!(engine.rup_check(&candidate, false));
        assert_eq!(engine.master().trail().len(), mark);
        assert_eq!(engine.store().num_clauses(), 1);
    }

    #[test]
    fn detach_last_reference_removes_from_propagation() {
        let mut engine = PropEngine::new(2);
        let h = engine.attach(Inequality::from_coeffs_lits_degree(&[1, 1], &[1, 2], 1).unwrap(), 1);
        engine.init_propagation(false);
        assert!(engine.detach(h, 1));
        assert_eq!(engine.store().num_clauses(), 0);
    }

    #[test]
    fn compute_effected_reports_a_rewritten_unseen_constraint() {
        let mut engine = PropEngine::new(3);
        engine.attach(Inequality::from_coeffs_lits_degree(&[1, 1], &[1, 2], 1).unwrap(), 1);
        engine.init_propagation(false);

        let mut sub = Substitution::new();
        sub.set(1, Lit::from(3));
        let effected = engine.compute_effected(&sub, false);
        assert_eq!(effected.len(), 1);
        assert_eq!(effected[0].min_id, 1);
    }

    #[test]
    fn compute_effected_skips_substitutions_mapped_to_true() {
        let mut engine = PropEngine::new(2);
        engine.attach(Inequality::from_coeffs_lits_degree(&[1, 1], &[1, 2], 1).unwrap(), 1);
        engine.init_propagation(false);

        let mut sub = Substitution::new();
        sub.set(1, Lit::TRUE);
        assert!(engine.compute_effected(&sub, false).is_empty());
    }
}
