//! The watched-literal schemes for clauses and pseudo-Boolean
//! inequalities (§4.2 "Fixed inequality: watches, propagation,
//! initialization", §4.3 "Clause propagator").
//!
//! These are free functions rather than methods on [`Clause`] /
//! [`FixedInequality`] because they need the current [`Assignment`]
//! alongside the constraint, and keeping them outside the
//! representation types mirrors the split the spec draws between
//! "constraint representations" (§2 item 3) and "propagators" (§2
//! item 4) — a [`crate::assign::PropagationMaster`] drives these, the
//! representations themselves stay dumb data.

use crate::{
    assign::Assignment,
    cdb::{coeff::Coeff, Clause, FixedInequality},
    types::Lit,
};

/// what a watch update (or a fresh `init_watch`) decided.
pub enum WatchOutcome {
    /// nothing forced; still watching the same literal.
    Keep,
    /// the falsified literal is no longer watched; `new_watch` is now
    /// watched instead, with `blocker` cached on its [`crate::cdb::Watch`]
    /// entry (§4.2 "a blocking literal ... is cached").
    Moved { new_watch: Lit, blocker: Lit },
    /// every watched term became unassignable-without-forcing: these
    /// literals must be enqueued true, this constraint as reason.
    Unit(Vec<Lit>),
    /// slack went negative: this constraint conflicts.
    Conflict,
}

/// the result of (re)installing every watch of a constraint from
/// scratch — at attach time, or when rebuilding after a mode switch
/// (§4.2 `initWatch`, §4.7).
pub struct InitResult {
    pub watched: Vec<Lit>,
    pub forced: Vec<Lit>,
    pub conflict: bool,
}

// ---- clauses --------------------------------------------------------

/// §4.3: two watched literals plus a rotating cursor into the rest.
pub fn update_clause(clause: &mut Clause, falsified: Lit, assignment: &Assignment) -> WatchOutcome {
    if clause.lits[0] == falsified {
        clause.lits.swap(0, 1);
    }
    debug_assert_eq!(clause.lits[1], falsified);
    let other = clause.lits[0];
    if assignment.is_true(other) {
        return WatchOutcome::Keep; // blocking literal already satisfies the clause
    }
    let len = clause.lits.len();
    if len < 2 {
        // a unit/empty clause is flagged `PROPAGATES_AT_ROOT` and
        // never gets here through the normal watch machinery.
        return if assignment.is_false(other) {
            WatchOutcome::Conflict
        } else {
            WatchOutcome::Unit(vec![other])
        };
    }
    let span = len - 2;
    let start = clause.search_from.clamp(2, len) - 2;
    for offset in 0..span {
        let idx = 2 + (start + offset) % span;
        let candidate = clause.lits[idx];
        if !assignment.is_false(candidate) {
            clause.lits.swap(1, idx);
            clause.search_from = if idx + 1 >= len { 2 } else { idx + 1 };
            return WatchOutcome::Moved { new_watch: candidate, blocker: other };
        }
    }
    if assignment.is_false(other) {
        WatchOutcome::Conflict
    } else {
        WatchOutcome::Unit(vec![other])
    }
}

/// §4.2 `initWatch`, specialized for a clause: called once at attach
/// time (and when rebuilding for a mode switch), against whatever
/// assignment already exists.
pub fn init_watch_clause(clause: &mut Clause, assignment: &Assignment) -> InitResult {
    let len = clause.lits.len();
    if len == 0 {
        return InitResult { watched: vec![], forced: vec![], conflict: true };
    }
    if len == 1 {
        let l = clause.lits[0];
        return InitResult {
            watched: vec![l],
            forced: if assignment.is_undef(l) { vec![l] } else { vec![] },
            conflict: assignment.is_false(l),
        };
    }
    for want in 0..2 {
        if assignment.is_false(clause.lits[want]) {
            if let Some(j) = (2..len).find(|&j| !assignment.is_false(clause.lits[j])) {
                clause.lits.swap(want, j);
            }
        }
    }
    clause.search_from = 2;
    let (a, b) = (clause.lits[0], clause.lits[1]);
    if assignment.is_true(a) || assignment.is_true(b) {
        return InitResult { watched: vec![a, b], forced: vec![], conflict: false };
    }
    match (assignment.is_false(a), assignment.is_false(b)) {
        (true, true) => InitResult { watched: vec![a, b], forced: vec![], conflict: true },
        (true, false) => InitResult { watched: vec![a, b], forced: vec![b], conflict: false },
        (false, true) => InitResult { watched: vec![a, b], forced: vec![a], conflict: false },
        (false, false) => InitResult { watched: vec![a, b], forced: vec![], conflict: false },
    }
}

// ---- pseudo-Boolean inequalities -------------------------------------

/// a literal whose coefficient alone meets the degree, cached so the
/// outer watch loop can skip the constraint entirely when it is true
/// (§4.2 "blocking literal"). `Lit::TRUE` stands for "no such literal"
/// — it is never assigned, so `assignment.is_true` on it is always
/// `false`, harmlessly disabling the fast path.
pub fn find_blocker<T: Coeff>(ineq: &FixedInequality<T>) -> Lit {
    ineq.terms()[..ineq.watch_size()]
        .iter()
        .find(|t| t.coeff >= *ineq.degree())
        .map(|t| t.lit)
        .unwrap_or(Lit::TRUE)
}

pub fn update_ineq<T: Coeff>(
    ineq: &mut FixedInequality<T>,
    falsified: Lit,
    assignment: &Assignment,
) -> WatchOutcome {
    let watch_size = ineq.watch_size;
    let Some(pos) = ineq.terms[..watch_size].iter().position(|t| t.lit == falsified) else {
        // stale entry: this literal was already swapped out by an
        // earlier update in the same propagation pass.
        return WatchOutcome::Keep;
    };

    let len = ineq.terms.len();
    let mut fallback = None;
    let mut phase_matched = None;
    for j in watch_size..len {
        let cand = ineq.terms[j].lit;
        if assignment.is_false(cand) {
            continue;
        }
        if fallback.is_none() {
            fallback = Some(j);
        }
        if assignment.phase(cand.var()).matches(cand) {
            phase_matched = Some(j);
            break;
        }
    }
    if let Some(j) = phase_matched.or(fallback) {
        ineq.terms.swap(pos, j);
        let new_watch = ineq.terms[pos].lit;
        let blocker = find_blocker(ineq);
        return WatchOutcome::Moved { new_watch, blocker };
    }

    finish_by_slack(ineq, assignment)
}

/// §4.2 `initWatch`: install watches for a freshly attached (or
/// being-rebuilt) inequality against the current assignment.
pub fn init_watch_ineq<T: Coeff>(ineq: &mut FixedInequality<T>, assignment: &Assignment) -> InitResult {
    let watch_size = ineq.watch_size;
    let len = ineq.terms.len();
    let mut next_candidate = watch_size;
    for pos in 0..watch_size.min(len) {
        if assignment.is_false(ineq.terms[pos].lit) {
            if let Some(j) = (next_candidate..len).find(|&j| !assignment.is_false(ineq.terms[j].lit)) {
                ineq.terms.swap(pos, j);
                next_candidate = j + 1;
            }
        }
    }
    match finish_by_slack(ineq, assignment) {
        WatchOutcome::Keep => InitResult {
            watched: ineq.terms[..watch_size].iter().map(|t| t.lit).collect(),
            forced: vec![],
            conflict: false,
        },
        WatchOutcome::Unit(forced) => InitResult {
            watched: ineq.terms[..watch_size].iter().map(|t| t.lit).collect(),
            forced,
            conflict: false,
        },
        WatchOutcome::Conflict => InitResult {
            watched: ineq.terms[..watch_size].iter().map(|t| t.lit).collect(),
            forced: vec![],
            conflict: true,
        },
        WatchOutcome::Moved { .. } => unreachable!("finish_by_slack never moves a watch"),
    }
}

/// shared tail of `update_ineq`/`init_watch_ineq` once no further
/// replacement is possible: recompute slack over the watched prefix
/// and either signal a conflict or collect every watched, unassigned
/// term whose coefficient exceeds it (§4.2 `updateWatch`).
fn finish_by_slack<T: Coeff>(ineq: &FixedInequality<T>, assignment: &Assignment) -> WatchOutcome {
    let watch_size = ineq.watch_size;
    let mut sum = T::zero();
    for t in &ineq.terms[..watch_size] {
        if !assignment.is_false(t.lit) {
            sum = sum.checked_add(&t.coeff).unwrap_or_else(|| t.coeff.clone());
        }
    }
    if sum < *ineq.degree() {
        return WatchOutcome::Conflict;
    }
    let slack = sum.sub(ineq.degree());
    let forced: Vec<Lit> = ineq.terms[..watch_size]
        .iter()
        .filter(|t| assignment.is_undef(t.lit) && t.coeff > slack)
        .map(|t| t.lit)
        .collect();
    if forced.is_empty() {
        WatchOutcome::Keep
    } else {
        WatchOutcome::Unit(forced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cdb::Term, types::Instantiate, Config};

    fn assignment(n: u32) -> Assignment {
        Assignment::instantiate(&Config::default(), n)
    }

    #[test]
    fn clause_init_with_one_false_watch_finds_replacement() {
        let mut a = assignment(4);
        a.assign(Lit::from(-1), crate::assign::Reason::Decision).unwrap();
        let mut c = Clause::new(vec![Lit::from(1), Lit::from(2), Lit::from(3)]);
        let r = init_watch_clause(&mut c, &a);
        assert!(!r.conflict);
        assert!(r.forced.is_empty());
        assert!(!r.watched.contains(&Lit::from(1)));
    }

    #[test]
    fn clause_init_unit_when_only_one_literal_left() {
        let mut a = assignment(4);
        a.assign(Lit::from(-1), crate::assign::Reason::Decision).unwrap();
        let mut c = Clause::new(vec![Lit::from(1), Lit::from(2)]);
        let r = init_watch_clause(&mut c, &a);
        assert_eq!(r.forced, vec![Lit::from(2)]);
    }

    #[test]
    fn ineq_propagates_unit_on_slack_exhaustion() {
        // 3x1 + 2x2 + 2x3 >= 3 (scenario 2): nothing assigned yet
        // forces x1 immediately via the root-level slack computation,
        // which `init_watch_ineq` reproduces under the empty
        // assignment.
        let ineq = FixedInequality::from_normalized(
            vec![
                Term::new(2u32, Lit::from(2)),
                Term::new(2u32, Lit::from(3)),
                Term::new(3u32, Lit::from(1)),
            ],
            3u32,
        );
        let mut ineq = ineq;
        let a = assignment(4);
        let r = init_watch_ineq(&mut ineq, &a);
        assert!(!r.conflict);
        assert_eq!(r.forced, vec![Lit::from(1)]);
    }
}
