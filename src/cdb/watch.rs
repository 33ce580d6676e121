//! Watch lists: per-literal registries of which constraints currently
//! watch that literal, keyed for O(1) lookup during unit propagation
//! (§3, §4.2, §4.3).

use crate::{cdb::Handle, types::Lit};

/// one entry in a literal's watch list.
///
/// `blocker` is a literal already known to satisfy the constraint
/// without inspecting it at all — the "blocking literal" optimization
/// common to both the clause and the PB propagator (§4.3).
#[derive(Clone, Copy, Debug)]
pub struct Watch {
    pub blocker: Lit,
    pub handle: Handle,
}

impl Watch {
    pub fn new(blocker: Lit, handle: Handle) -> Watch {
        Watch { blocker, handle }
    }
}

/// `WatchList[lit]` holds every [`Watch`] registered against `lit`
/// becoming false. Indexed by [`Lit::index`], so both polarities of a
/// variable have independent lists.
#[derive(Default)]
pub struct WatchDb {
    lists: Vec<Vec<Watch>>,
}

impl WatchDb {
    pub fn new(n_vars: u32) -> WatchDb {
        let mut db = WatchDb { lists: Vec::new() };
        db.resize(n_vars);
        db
    }

    pub fn resize(&mut self, n_vars: u32) {
        let want = crate::types::num_lits(n_vars);
        if self.lists.len() < want {
            self.lists.resize_with(want, Vec::new);
        }
    }

    pub fn list(&self, watched_false_when: Lit) -> &[Watch] {
        &self.lists[watched_false_when.index()]
    }

    /// register `handle` as watching `watched_false_when`, i.e. it
    /// must be revisited whenever that literal becomes false.
    pub fn register(&mut self, watched_false_when: Lit, blocker: Lit, handle: Handle) {
        self.lists[watched_false_when.index()].push(Watch::new(blocker, handle));
    }

    /// remove every watch entry for `handle` against `watched_false_when`.
    /// Used for the exact, O(1)-per-literal detach in
    /// [`crate::cdb::ConstraintStore::retire`] — the caller supplies
    /// the small set of literals the constraint is known to watch,
    /// rather than scanning every list in the database.
    pub fn unregister(&mut self, watched_false_when: Lit, handle: Handle) {
        let list = &mut self.lists[watched_false_when.index()];
        if let Some(pos) = list.iter().position(|w| w.handle == handle) {
            list.swap_remove(pos);
        }
    }

    /// drain the list for in-place rewriting during propagation: the
    /// caller takes ownership of the current entries and is
    /// responsible for pushing back every watch it decides to keep,
    /// via [`WatchDb::push_back`] (the classic MiniSat-style
    /// compaction loop, §4.2/§4.3).
    pub fn take(&mut self, watched_false_when: Lit) -> Vec<Watch> {
        std::mem::take(&mut self.lists[watched_false_when.index()])
    }

    pub fn push_back(&mut self, watched_false_when: Lit, watch: Watch) {
        self.lists[watched_false_when.index()].push(watch);
    }

    pub fn extend_back(&mut self, watched_false_when: Lit, watches: Vec<Watch>) {
        let list = &mut self.lists[watched_false_when.index()];
        if list.is_empty() {
            *list = watches;
        } else {
            list.extend(watches);
        }
    }
}

/// the three per-representation watch databases a
/// [`crate::engine::PropEngine`] drives propagation through, shared by
/// the core and derived groups alike (§2 item 4, §4.5). Group
/// membership is tracked on the constraint itself
/// ([`crate::types::FlagConstraint::IS_CORE`]), not by splitting the
/// watch lists, so deactivating the derived group only changes which
/// hits [`crate::assign::PropagationMaster::propagate`] is willing to
/// act on, not where they are registered.
#[derive(Default)]
pub struct Watches {
    pub clause: WatchDb,
    pub small: WatchDb,
    pub big: WatchDb,
}

impl Watches {
    pub fn new(n_vars: u32) -> Watches {
        Watches {
            clause: WatchDb::new(n_vars),
            small: WatchDb::new(n_vars),
            big: WatchDb::new(n_vars),
        }
    }

    pub fn resize(&mut self, n_vars: u32) {
        self.clause.resize(n_vars);
        self.small.resize(n_vars);
        self.big.resize(n_vars);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdb::Kind;

    #[test]
    fn register_then_unregister_empties_list() {
        let mut db = WatchDb::new(4);
        let lit = Lit::from(1);
        let h = Handle { kind: Kind::Clause, index: 0 };
        db.register(lit, Lit::from(2), h);
        assert_eq!(db.list(lit).len(), 1);
        db.unregister(lit, h);
        assert!(db.list(lit).is_empty());
    }

    #[test]
    fn take_and_push_back_round_trips() {
        let mut db = WatchDb::new(4);
        let lit = Lit::from(1);
        let h = Handle { kind: Kind::Small, index: 2 };
        db.register(lit, Lit::from(3), h);
        let drained = db.take(lit);
        assert!(db.list(lit).is_empty());
        for w in drained {
            db.push_back(lit, w);
        }
        assert_eq!(db.list(lit).len(), 1);
    }
}
