//! `ConstraintStore`: arena-backed storage for every attached
//! constraint, content-hash deduplication, and the attach/detach
//! reference-counting lifecycle (§3, §4.5, §4.9).
//!
//! Detaching a constraint that is still serving as a trail reason
//! must not invalidate the handles that reason holds, so a retired
//! slot is not freed for reuse immediately — it is parked in a
//! per-arena junkyard and only handed back to the allocator once
//! [`ConstraintStore::flush_junkyards`] confirms nothing on the trail
//! still needs it (§4.5, §4.9; see also [`crate::assign::PropagationMaster::cleanup_trail`]).

use crate::{
    cdb::{clause::Clause, ineq::FixedInequality, inequality::Inequality, watch::WatchDb, Handle, Kind},
    types::{ConstraintId, FlagConstraint, FlagsField, Lit},
};
use num_bigint::BigUint;
use std::collections::HashMap;

#[cfg(feature = "deterministic")]
type BuildHasher = ahash::RandomState;
#[cfg(not(feature = "deterministic"))]
type BuildHasher = std::collections::hash_map::RandomState;

/// bookkeeping kept alongside a constraint's content: the external
/// proof-step ids currently referencing it (dedup means more than one
/// id can share a single stored constraint), and the literals it is
/// currently registered to watch, so [`ConstraintStore::retire`] can
/// remove exactly those entries in O(watch size) rather than scanning
/// every watch list.
#[derive(Clone, Debug, Default)]
pub struct Header {
    pub(crate) ids: Vec<ConstraintId>,
    pub(crate) watched_lits: Vec<Lit>,
}

impl Header {
    fn with_id(id: ConstraintId) -> Header {
        Header {
            ids: vec![id],
            watched_lits: Vec::new(),
        }
    }
}

struct Slot<T> {
    content: T,
    header: Header,
}

struct Arena<T> {
    slots: Vec<Option<Slot<T>>>,
    free: Vec<u32>,
    junkyard: Vec<u32>,
}

impl<T> Default for Arena<T> {
    fn default() -> Arena<T> {
        Arena {
            slots: Vec::new(),
            free: Vec::new(),
            junkyard: Vec::new(),
        }
    }
}

impl<T> Arena<T> {
    fn alloc(&mut self, content: T, id: ConstraintId) -> u32 {
        let header = Header::with_id(id);
        if let Some(index) = self.free.pop() {
            self.slots[index as usize] = Some(Slot { content, header });
            index
        } else {
            self.slots.push(Some(Slot { content, header }));
            (self.slots.len() - 1) as u32
        }
    }

    fn get(&self, index: u32) -> &T {
        &self.slots[index as usize].as_ref().expect("stale handle").content
    }

    fn get_mut(&mut self, index: u32) -> &mut T {
        &mut self.slots[index as usize].as_mut().expect("stale handle").content
    }

    fn header(&self, index: u32) -> &Header {
        &self.slots[index as usize].as_ref().expect("stale handle").header
    }

    fn header_mut(&mut self, index: u32) -> &mut Header {
        &mut self.slots[index as usize].as_mut().expect("stale handle").header
    }

    /// park a slot whose `ids` have just become empty. If it is still
    /// a trail reason (`IS_REASON`), its content must stay readable;
    /// otherwise free it for reuse right away.
    fn retire(&mut self, index: u32)
    where
        T: FlagsField,
    {
        let is_reason = self.slots[index as usize]
            .as_ref()
            .expect("stale handle")
            .content
            .flags_field()
            .contains(FlagConstraint::IS_REASON);
        if is_reason {
            self.slots[index as usize]
                .as_mut()
                .unwrap()
                .content
                .flags_field_mut()
                .insert(FlagConstraint::MARKED_FOR_DELETION);
            self.junkyard.push(index);
        } else {
            self.slots[index as usize] = None;
            self.free.push(index);
        }
    }

    /// move every junkyard slot no longer flagged `IS_REASON` back
    /// into the free list (§4.5 `flushJunkyards`).
    fn flush_junkyard(&mut self)
    where
        T: FlagsField,
    {
        let mut still_pending = Vec::new();
        for index in self.junkyard.drain(..) {
            let still_reason = self.slots[index as usize]
                .as_ref()
                .map(|s| s.content.flags_field().contains(FlagConstraint::IS_REASON))
                .unwrap_or(false);
            if still_reason {
                still_pending.push(index);
            } else {
                self.slots[index as usize] = None;
                self.free.push(index);
            }
        }
        self.junkyard = still_pending;
    }

    fn len(&self) -> usize {
        self.slots.len() - self.free.len() - self.junkyard.len()
    }
}

/// every attached constraint, partitioned by representation, with
/// content-hash dedup and id-based lookup (§3, §4.5).
#[derive(Default)]
pub struct ConstraintStore {
    clauses: Arena<Clause>,
    small: Arena<FixedInequality<u32>>,
    big: Arena<FixedInequality<BigUint>>,
    /// every hash bucket holds every handle whose content hashed to
    /// it; a bucket with more than one *distinct-content* entry is a
    /// genuine collision, counted in `hash_collisions` (§9).
    by_content_hash: HashMap<u64, Vec<Handle>, BuildHasher>,
    by_id: HashMap<ConstraintId, Handle, BuildHasher>,
    hash_collisions: usize,
}

impl ConstraintStore {
    pub fn new() -> ConstraintStore {
        ConstraintStore::default()
    }

    pub fn lookup_id(&self, id: ConstraintId) -> Option<Handle> {
        self.by_id.get(&id).copied()
    }

    /// every handle currently stored under `hash`; more than one only
    /// if two distinct contents genuinely collided (§9).
    pub fn lookup_hash(&self, hash: u64) -> &[Handle] {
        self.by_content_hash.get(&hash).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn hash_collisions(&self) -> usize {
        self.hash_collisions
    }

    /// look up a stored constraint with the same content, if any —
    /// the read-only counterpart of `attach_*`'s dedup check, used by
    /// [`crate::engine::PropEngine::compute_effected`] to skip
    /// reporting a rewritten constraint the store already holds (§4.10).
    pub fn find(&self, ineq: &Inequality) -> Option<Handle> {
        let hash = ineq.content_hash();
        let bucket = self.lookup_hash(hash);
        match ineq {
            Inequality::Clause(c) => bucket
                .iter()
                .copied()
                .find(|h| h.kind == Kind::Clause && self.clauses.get(h.index).content_eq(c)),
            Inequality::Small(i) => bucket
                .iter()
                .copied()
                .find(|h| h.kind == Kind::Small && self.small.get(h.index).content_eq(i)),
            Inequality::Big(i) => bucket
                .iter()
                .copied()
                .find(|h| h.kind == Kind::Big && self.big.get(h.index).content_eq(i)),
        }
    }

    /// attach brand-new content under `hash`, or, if the bucket
    /// already holds a constraint with equal content, just attach
    /// `id` to the existing one (§4.5, §9 content-hash dedup — a real
    /// hash-set lookup, not a hash-only shortcut: two different
    /// constraints sharing a hash must not be merged). The three
    /// `attach_*` entry points share this dance but the arena type
    /// differs per kind, so each gets its own small copy rather than a
    /// generic helper (which would fight the borrow checker over
    /// `self`).
    pub fn attach_clause(&mut self, hash: u64, id: ConstraintId, content: Clause) -> Handle {
        let bucket = self.by_content_hash.entry(hash).or_default();
        if let Some(existing) = bucket
            .iter()
            .copied()
            .find(|h| self.clauses.get(h.index).content_eq(&content))
        {
            self.add_id(existing, id);
            return existing;
        }
        if !bucket.is_empty() {
            self.hash_collisions += 1;
        }
        let index = self.clauses.alloc(content, id);
        let handle = Handle { kind: Kind::Clause, index };
        self.by_content_hash.entry(hash).or_default().push(handle);
        self.by_id.insert(id, handle);
        handle
    }

    pub fn attach_small(&mut self, hash: u64, id: ConstraintId, content: FixedInequality<u32>) -> Handle {
        let bucket = self.by_content_hash.entry(hash).or_default();
        if let Some(existing) = bucket
            .iter()
            .copied()
            .find(|h| self.small.get(h.index).content_eq(&content))
        {
            self.add_id(existing, id);
            return existing;
        }
        if !bucket.is_empty() {
            self.hash_collisions += 1;
        }
        let index = self.small.alloc(content, id);
        let handle = Handle { kind: Kind::Small, index };
        self.by_content_hash.entry(hash).or_default().push(handle);
        self.by_id.insert(id, handle);
        handle
    }

    pub fn attach_big(&mut self, hash: u64, id: ConstraintId, content: FixedInequality<BigUint>) -> Handle {
        let bucket = self.by_content_hash.entry(hash).or_default();
        if let Some(existing) = bucket
            .iter()
            .copied()
            .find(|h| self.big.get(h.index).content_eq(&content))
        {
            self.add_id(existing, id);
            return existing;
        }
        if !bucket.is_empty() {
            self.hash_collisions += 1;
        }
        let index = self.big.alloc(content, id);
        let handle = Handle { kind: Kind::Big, index };
        self.by_content_hash.entry(hash).or_default().push(handle);
        self.by_id.insert(id, handle);
        handle
    }

    fn add_id(&mut self, handle: Handle, id: ConstraintId) {
        self.by_id.insert(id, handle);
        self.header_mut(handle).ids.push(id);
    }

    pub fn attach_count(&self, handle: Handle) -> usize {
        self.header(handle).ids.len()
    }

    pub fn min_id(&self, handle: Handle) -> Option<ConstraintId> {
        self.header(handle).ids.iter().copied().min()
    }

    pub fn is_attached(&self, handle: Handle) -> bool {
        !self.header(handle).ids.is_empty()
    }

    pub fn was_attached(&self, handle: Handle) -> bool {
        self.flags(handle).contains(FlagConstraint::WAS_ATTACHED)
    }

    pub fn is_core(&self, handle: Handle) -> bool {
        self.flags(handle).contains(FlagConstraint::IS_CORE)
    }

    pub fn move_to_core(&mut self, handle: Handle) {
        self.flags_mut(handle).insert(FlagConstraint::IS_CORE);
    }

    pub fn set_watched_lits(&mut self, handle: Handle, lits: Vec<Lit>) {
        self.header_mut(handle).watched_lits = lits;
    }

    pub fn watched_lits(&self, handle: Handle) -> &[Lit] {
        &self.header(handle).watched_lits
    }

    /// record that `handle` now watches `new` instead of `old`
    /// (§4.2 watch replacement); keeps [`Header::watched_lits`] in
    /// sync so [`ConstraintStore::detach`] still removes exactly the
    /// literals currently registered.
    pub fn replace_watched_lit(&mut self, handle: Handle, old: Lit, new: Lit) {
        let lits = &mut self.header_mut(handle).watched_lits;
        if let Some(slot) = lits.iter_mut().find(|l| **l == old) {
            *slot = new;
        }
    }

    pub fn is_marked_for_deletion(&self, handle: Handle) -> bool {
        self.flags(handle).contains(FlagConstraint::MARKED_FOR_DELETION)
    }

    pub fn is_reason(&self, handle: Handle) -> bool {
        self.flags(handle).contains(FlagConstraint::IS_REASON)
    }

    pub fn set_is_reason(&mut self, handle: Handle, is_reason: bool) {
        self.flags_mut(handle).set(FlagConstraint::IS_REASON, is_reason);
    }

    pub fn propagates_at_root(&self, handle: Handle) -> bool {
        self.flags(handle).contains(FlagConstraint::PROPAGATES_AT_ROOT)
    }

    /// detach `id` from `handle`; if that was the last reference,
    /// remove its watches (via `watches`) and retire it through the
    /// junkyard (§4.5 `detach`).
    pub fn detach(&mut self, handle: Handle, id: ConstraintId, watches: &mut WatchDb) {
        self.by_id.remove(&id);
        let is_empty = {
            let header = self.header_mut(handle);
            header.ids.retain(|&i| i != id);
            header.ids.is_empty()
        };
        if is_empty {
            let lits = std::mem::take(&mut self.header_mut(handle).watched_lits);
            for lit in &lits {
                watches.unregister(*lit, handle);
            }
            for bucket in self.by_content_hash.values_mut() {
                bucket.retain(|h| *h != handle);
            }
            self.by_content_hash.retain(|_, bucket| !bucket.is_empty());
            match handle.kind {
                Kind::Clause => self.clauses.retire(handle.index),
                Kind::Small => self.small.retire(handle.index),
                Kind::Big => self.big.retire(handle.index),
            }
        }
    }

    /// detach the single most-recently-added id and report every id
    /// that was attached to `handle` if that was the last one, empty
    /// otherwise (§4.5 `getDeletions`/`detach`: a proof checker deletes
    /// one step at a time, but only the step that drops the last
    /// reference actually removes the constraint from propagation, and
    /// that is the point at which every id sharing the slot is
    /// reported as deleted together).
    pub fn get_deletions(&mut self, handle: Handle, watches: &mut WatchDb) -> Vec<ConstraintId> {
        let ids = &self.header(handle).ids;
        let Some(&last_id) = ids.last() else {
            return Vec::new();
        };
        let all_ids = if ids.len() == 1 { ids.clone() } else { Vec::new() };
        self.detach(handle, last_id, watches);
        all_ids
    }

    /// insert content that takes part in propagation but is invisible
    /// to the attach/detach id-tracking and content-hash dedup used by
    /// every permanently-live constraint — the transient negated
    /// buffer a RUP check installs and tears down on every call
    /// (§4.8), which must never be merged into (or merge with) a
    /// genuinely attached constraint of identical content.
    pub fn insert_temp_clause(&mut self, content: Clause) -> Handle {
        Handle { kind: Kind::Clause, index: self.clauses.alloc(content, 0) }
    }

    pub fn insert_temp_small(&mut self, content: FixedInequality<u32>) -> Handle {
        Handle { kind: Kind::Small, index: self.small.alloc(content, 0) }
    }

    pub fn insert_temp_big(&mut self, content: FixedInequality<BigUint>) -> Handle {
        Handle { kind: Kind::Big, index: self.big.alloc(content, 0) }
    }

    /// free a slot inserted via `insert_temp_*` unconditionally — it
    /// was never reachable through `by_id`/`by_content_hash`, and a
    /// `rup_check` runs entirely inside an `AutoReset` scope so it can
    /// never have become a trail reason that must be parked instead.
    pub fn remove_temp(&mut self, handle: Handle) {
        match handle.kind {
            Kind::Clause => {
                self.clauses.slots[handle.index as usize] = None;
                self.clauses.free.push(handle.index);
            }
            Kind::Small => {
                self.small.slots[handle.index as usize] = None;
                self.small.free.push(handle.index);
            }
            Kind::Big => {
                self.big.slots[handle.index as usize] = None;
                self.big.free.push(handle.index);
            }
        }
    }

    /// §4.5 `flushJunkyards`: reclaim every parked slot that is no
    /// longer needed as a trail reason.
    pub fn flush_junkyards(&mut self) {
        self.clauses.flush_junkyard();
        self.small.flush_junkyard();
        self.big.flush_junkyard();
    }

    pub fn clause(&self, handle: Handle) -> &Clause {
        debug_assert_eq!(handle.kind, Kind::Clause);
        self.clauses.get(handle.index)
    }

    pub fn clause_mut(&mut self, handle: Handle) -> &mut Clause {
        debug_assert_eq!(handle.kind, Kind::Clause);
        self.clauses.get_mut(handle.index)
    }

    pub fn small_ineq(&self, handle: Handle) -> &FixedInequality<u32> {
        debug_assert_eq!(handle.kind, Kind::Small);
        self.small.get(handle.index)
    }

    pub fn small_ineq_mut(&mut self, handle: Handle) -> &mut FixedInequality<u32> {
        debug_assert_eq!(handle.kind, Kind::Small);
        self.small.get_mut(handle.index)
    }

    pub fn big_ineq(&self, handle: Handle) -> &FixedInequality<BigUint> {
        debug_assert_eq!(handle.kind, Kind::Big);
        self.big.get(handle.index)
    }

    pub fn big_ineq_mut(&mut self, handle: Handle) -> &mut FixedInequality<BigUint> {
        debug_assert_eq!(handle.kind, Kind::Big);
        self.big.get_mut(handle.index)
    }

    pub fn flags(&self, handle: Handle) -> FlagConstraint {
        match handle.kind {
            Kind::Clause => self.clauses.get(handle.index).flags_field(),
            Kind::Small => self.small.get(handle.index).flags_field(),
            Kind::Big => self.big.get(handle.index).flags_field(),
        }
    }

    pub fn flags_mut(&mut self, handle: Handle) -> &mut FlagConstraint {
        match handle.kind {
            Kind::Clause => self.clauses.get_mut(handle.index).flags_field_mut(),
            Kind::Small => self.small.get_mut(handle.index).flags_field_mut(),
            Kind::Big => self.big.get_mut(handle.index).flags_field_mut(),
        }
    }

    fn header(&self, handle: Handle) -> &Header {
        match handle.kind {
            Kind::Clause => self.clauses.header(handle.index),
            Kind::Small => self.small.header(handle.index),
            Kind::Big => self.big.header(handle.index),
        }
    }

    fn header_mut(&mut self, handle: Handle) -> &mut Header {
        match handle.kind {
            Kind::Clause => self.clauses.header_mut(handle.index),
            Kind::Small => self.small.header_mut(handle.index),
            Kind::Big => self.big.header_mut(handle.index),
        }
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    pub fn num_small(&self) -> usize {
        self.small.len()
    }

    pub fn num_big(&self) -> usize {
        self.big.len()
    }
}

/// lets propagation code fetch the right arena for `T` without
/// matching on [`Kind`] itself, so `drive_ineq::<T>` in
/// [`crate::assign::PropagationMaster::propagate`] can stay generic
/// over `u32`/[`num_bigint::BigUint`] (§4.2, §4.5).
pub trait IneqArena<T: crate::cdb::coeff::Coeff> {
    fn ineq(&self, handle: Handle) -> &FixedInequality<T>;
    fn ineq_mut(&mut self, handle: Handle) -> &mut FixedInequality<T>;
}

impl IneqArena<u32> for ConstraintStore {
    fn ineq(&self, handle: Handle) -> &FixedInequality<u32> {
        self.small_ineq(handle)
    }
    fn ineq_mut(&mut self, handle: Handle) -> &mut FixedInequality<u32> {
        self.small_ineq_mut(handle)
    }
}

impl IneqArena<BigUint> for ConstraintStore {
    fn ineq(&self, handle: Handle) -> &FixedInequality<BigUint> {
        self.big_ineq(handle)
    }
    fn ineq_mut(&mut self, handle: Handle) -> &mut FixedInequality<BigUint> {
        self.big_ineq_mut(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Lit;

    #[test]
    fn dedup_by_hash_shares_one_slot() {
        let mut store = ConstraintStore::new();
        let h1 = store.attach_clause(42, 1, Clause::new(vec![Lit::from(1)]));
        let h2 = store.attach_clause(42, 2, Clause::new(vec![Lit::from(1)]));
        assert_eq!(h1, h2);
        assert_eq!(store.attach_count(h1), 2);
        assert_eq!(store.hash_collisions(), 0);
    }

    #[test]
    fn distinct_content_sharing_a_hash_is_not_merged() {
        let mut store = ConstraintStore::new();
        let h1 = store.attach_clause(42, 1, Clause::new(vec![Lit::from(1)]));
        let h2 = store.attach_clause(42, 2, Clause::new(vec![Lit::from(2)]));
        assert_ne!(h1, h2);
        assert_eq!(store.attach_count(h1), 1);
        assert_eq!(store.attach_count(h2), 1);
        assert_eq!(store.hash_collisions(), 1);
        assert_eq!(store.lookup_hash(42).len(), 2);
    }

    #[test]
    fn detach_last_id_frees_slot_when_not_a_reason() {
        let mut store = ConstraintStore::new();
        let mut watches = WatchDb::new(4);
        let h = store.attach_clause(7, 1, Clause::new(vec![Lit::from(1)]));
        assert!(store.is_attached(h));
        store.detach(h, 1, &mut watches);
        assert!(!store.is_attached(h));
        assert_eq!(store.num_clauses(), 0);
        assert!(store.lookup_hash(7).is_empty());
    }

    #[test]
    fn detach_while_reason_parks_in_junkyard() {
        let mut store = ConstraintStore::new();
        let mut watches = WatchDb::new(4);
        let h = store.attach_clause(7, 1, Clause::new(vec![Lit::from(1)]));
        store.flags_mut(h).insert(FlagConstraint::IS_REASON);
        store.detach(h, 1, &mut watches);
        // still readable: the slot was parked, not freed.
        assert_eq!(store.clause(h).len(), 1);
        assert_eq!(store.num_clauses(), 0);
        store.flags_mut(h).remove(FlagConstraint::IS_REASON);
        store.flush_junkyards();
    }
}
