//! `Assignment`: the per-variable truth-value array, the trail of
//! assigned literals in the order they were made, and their reasons
//! (§3 "Assignment").

use crate::{
    assign::Reason,
    types::{Instantiate, Config, Lit, LitBool, Phase, PhaseSaver, VarId},
};

/// a snapshot of [`Assignment`]'s mutable extent, used by
/// [`crate::assign::PropagationMaster::reset`] to roll back everything
/// assigned since a checkpoint without re-walking the whole trail
/// (§4.1 `AutoReset`).
#[derive(Clone, Copy, Debug)]
pub struct PropState {
    pub trail_len: usize,
    pub has_conflict: bool,
    /// how far the fixpoint loop has fully processed the trail
    /// (§3 `PropState = (qhead, trailSize, conflict)`); owned by
    /// [`crate::assign::PropagationMaster`], carried here only so a
    /// snapshot can restore it in one shot.
    pub qhead: usize,
}

pub struct Assignment {
    /// `value[lit.index()]` — kept one entry per literal (both
    /// polarities) rather than per variable so a lookup never needs a
    /// branch on sign (§3).
    value: Vec<LitBool>,
    reason: Vec<Reason>,
    level_mark: Vec<usize>,
    trail: Vec<Lit>,
    phases: PhaseSaver,
    conflict: Option<Reason>,
}

impl Instantiate for Assignment {
    fn instantiate(config: &Config, n_vars: u32) -> Assignment {
        let n_vars = n_vars.max(config.initial_vars);
        Assignment {
            value: vec![LitBool::Undef; crate::types::num_lits(n_vars)],
            reason: vec![Reason::Decision; n_vars as usize + 1],
            level_mark: vec![0; n_vars as usize + 1],
            trail: Vec::new(),
            phases: PhaseSaver::new(n_vars),
            conflict: None,
        }
    }
}

impl Assignment {
    pub fn resize(&mut self, n_vars: u32) {
        let want_lits = crate::types::num_lits(n_vars);
        if self.value.len() < want_lits {
            self.value.resize(want_lits, LitBool::Undef);
        }
        let want_vars = n_vars as usize + 1;
        if self.reason.len() < want_vars {
            self.reason.resize(want_vars, Reason::Decision);
            self.level_mark.resize(want_vars, 0);
        }
        self.phases.resize(n_vars);
    }

    pub fn value(&self, lit: Lit) -> LitBool {
        self.value[lit.index()]
    }

    pub fn is_true(&self, lit: Lit) -> bool {
        self.value(lit) == LitBool::True
    }

    pub fn is_false(&self, lit: Lit) -> bool {
        self.value(lit) == LitBool::False
    }

    pub fn is_undef(&self, lit: Lit) -> bool {
        self.value(lit) == LitBool::Undef
    }

    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    pub fn reason_of(&self, var: VarId) -> Reason {
        self.reason[var as usize]
    }

    pub fn has_conflict(&self) -> bool {
        self.conflict.is_some()
    }

    pub fn conflict_reason(&self) -> Option<Reason> {
        self.conflict
    }

    /// a snapshot with `qhead` left at `0`; callers that track a
    /// `qhead` (currently only [`crate::assign::PropagationMaster`])
    /// overwrite it before storing the result.
    pub fn snapshot(&self) -> PropState {
        PropState {
            trail_len: self.trail.len(),
            has_conflict: self.conflict.is_some(),
            qhead: 0,
        }
    }

    /// assign `lit` true with the given justification. Returns `Err`
    /// if `lit` was already assigned false — the caller is
    /// responsible for recording that as the conflict (§4.1).
    pub fn assign(&mut self, lit: Lit, reason: Reason) -> Result<(), ()> {
        match self.value(lit) {
            LitBool::True => Ok(()),
            LitBool::False => Err(()),
            LitBool::Undef => {
                self.value[lit.index()] = LitBool::True;
                self.value[(!lit).index()] = LitBool::False;
                self.reason[lit.var() as usize] = reason;
                self.level_mark[lit.var() as usize] = self.trail.len();
                self.phases.save(lit);
                self.trail.push(lit);
                Ok(())
            }
        }
    }

    pub fn record_conflict(&mut self, reason: Reason) {
        if self.conflict.is_none() {
            self.conflict = Some(reason);
        }
    }

    pub fn clear_conflict(&mut self) {
        self.conflict = None;
    }

    pub fn phase(&self, var: VarId) -> Phase {
        self.phases.get(var)
    }

    /// unassign everything made after `mark` (trail index),
    /// preserving insertion order of what remains (§4.1 `AutoReset`).
    pub fn rollback_to(&mut self, mark: usize) {
        while self.trail.len() > mark {
            let lit = self.trail.pop().expect("trail.len() > mark > 0");
            self.value[lit.index()] = LitBool::Undef;
            self.value[(!lit).index()] = LitBool::Undef;
            self.reason[lit.var() as usize] = Reason::Decision;
        }
        self.conflict = None;
    }

    /// unassign the entire trail, for [`PropagationMaster::cleanup_trail`].
    ///
    /// [`PropagationMaster::cleanup_trail`]: crate::assign::PropagationMaster::cleanup_trail
    pub fn rollback_all(&mut self) -> Vec<Lit> {
        let old = std::mem::take(&mut self.trail);
        for &lit in &old {
            self.value[lit.index()] = LitBool::Undef;
            self.value[(!lit).index()] = LitBool::Undef;
            self.reason[lit.var() as usize] = Reason::Decision;
        }
        self.conflict = None;
        old
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_then_rollback_restores_undef() {
        let mut a = Assignment::instantiate(&Config::default(), 4);
        let l = Lit::from(2);
        let mark = a.trail_len();
        a.assign(l, Reason::Decision).unwrap();
        assert!(a.is_true(l));
        a.rollback_to(mark);
        assert!(a.is_undef(l));
    }

    #[test]
    fn assigning_already_false_literal_errs() {
        let mut a = Assignment::instantiate(&Config::default(), 4);
        let l = Lit::from(2);
        a.assign(l, Reason::Decision).unwrap();
        assert!(a.assign(!l, Reason::Decision).is_err());
    }

    #[test]
    fn reassigning_same_literal_is_a_noop_ok() {
        let mut a = Assignment::instantiate(&Config::default(), 4);
        let l = Lit::from(2);
        a.assign(l, Reason::Decision).unwrap();
        assert!(a.assign(l, Reason::Decision).is_ok());
        assert_eq!(a.trail_len(), 1);
    }
}
