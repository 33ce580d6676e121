//! `Substitution`: a partial variable remap used to rewrite a
//! constraint database into a new one and compute which constraints
//! changed (§4.10).
//!
//! Each variable is mapped either to a literal (a rename, possibly
//! with a flipped polarity) or to one of the two reserved constants
//! `⊤`/`⊥` via [`crate::types::CONST_VAR`]. Applying a substitution to
//! a clause or inequality rewrites every literal in place and then
//! re-normalizes through the same fat-inequality round trip used by
//! construction (§4.4), so a substitution can never leave behind a
//! duplicate variable, a non-saturated coefficient, or an unnoticed
//! tautology/contradiction.

use crate::{
    cdb::{Clause, Coeff, FatInequality, FixedInequality, Inequality},
    types::{Lit, VarId},
};
use std::collections::HashMap;

#[cfg(feature = "deterministic")]
type BuildHasher = ahash::RandomState;
#[cfg(not(feature = "deterministic"))]
type BuildHasher = std::collections::hash_map::RandomState;

/// a partial map from variable to replacement literal, `Lit::TRUE`/
/// `Lit::FALSE` standing in for the two constants.
#[derive(Clone, Default)]
pub struct Substitution {
    map: HashMap<VarId, Lit, BuildHasher>,
}

impl Substitution {
    pub fn new() -> Substitution {
        Substitution::default()
    }

    /// map `var` to `replacement`, which may itself be a literal over
    /// `CONST_VAR` (i.e. `Lit::TRUE`/`Lit::FALSE`).
    pub fn set(&mut self, var: VarId, replacement: Lit) {
        self.map.insert(var, replacement);
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// the raw replacement `var` maps to, if any — used by
    /// [`crate::engine::PropEngine::compute_effected`] to skip a
    /// variable mapped to `⊤` before walking its occurrence list.
    pub fn get(&self, var: VarId) -> Option<Lit> {
        self.map.get(&var).copied()
    }

    /// every variable this substitution rewrites.
    pub fn domain(&self) -> impl Iterator<Item = VarId> + '_ {
        self.map.keys().copied()
    }

    /// rewrite a single literal: unmapped literals pass through
    /// unchanged, mapped ones are looked up and their sign composed
    /// with the substituted literal's own sign.
    pub fn apply_lit(&self, lit: Lit) -> Lit {
        match self.map.get(&lit.var()) {
            None => lit,
            Some(&replacement) if lit.is_pos() => replacement,
            Some(&replacement) => !replacement,
        }
    }

    /// rewrite a clause. Returns `None` if the clause becomes
    /// trivially true (a literal substituted to `⊤`, or two
    /// complementary literals after rewriting), `Some` of the
    /// rewritten clause otherwise — `⊥`-forced and duplicate literals
    /// are dropped, not counted twice (§4.10).
    pub fn apply_clause(&self, clause: &Clause) -> Option<Clause> {
        let mut lits = Vec::with_capacity(clause.len());
        for &l in clause.iter() {
            let rewritten = self.apply_lit(l);
            if rewritten == Lit::TRUE {
                return None;
            }
            if rewritten == Lit::FALSE {
                continue;
            }
            if lits.contains(&!rewritten) {
                return None; // tautology: l and !l both present
            }
            if !lits.contains(&rewritten) {
                lits.push(rewritten);
            }
        }
        Some(Clause::new(lits))
    }

    /// rewrite a pseudo-Boolean inequality through a fat-inequality
    /// round trip (§4.10): a term forced to `⊤` contributes its
    /// coefficient to the satisfied side, lowering the degree by that
    /// amount; a term forced to `⊥` simply drops; every other term is
    /// re-added under its (possibly sign-flipped, possibly renamed)
    /// literal, letting the usual cancel-add arithmetic merge any
    /// variables the substitution happens to collide.
    pub fn apply_ineq<T: Coeff>(
        &self,
        ineq: &FixedInequality<T>,
        fat: &mut FatInequality<T::Signed>,
    ) -> FixedInequality<T> {
        debug_assert!(!fat.is_busy());
        fat.set_degree(ineq.degree().to_signed());
        for t in ineq.terms() {
            let rewritten = self.apply_lit(t.lit);
            if rewritten == Lit::TRUE {
                fat.reduce_degree_by(&t.coeff.to_signed());
                continue;
            }
            if rewritten == Lit::FALSE {
                continue;
            }
            let signed_coeff = t.coeff.to_signed();
            fat.add_lhs_term(&signed_coeff, rewritten);
        }
        fat.freeze()
    }

    /// rewrite a façade-level constraint, dispatching to whichever
    /// representation it is currently stored as. A `Clause` that
    /// becomes trivially true rewrites to `None`; an inequality never
    /// does (an always-true inequality freezes to the empty,
    /// zero-degree constraint rather than disappearing, since
    /// `Inequality` has no "absent" variant of its own).
    pub fn apply(&self, ineq: &Inequality) -> Option<Inequality> {
        match ineq {
            Inequality::Clause(c) => self.apply_clause(c).map(Inequality::Clause),
            Inequality::Small(i) => {
                let mut fat = FatInequality::<i64>::new(i.terms().iter().map(|t| t.lit.var()).max().unwrap_or(0));
                Some(Inequality::from_fixed_small(self.apply_ineq(i, &mut fat)))
            }
            Inequality::Big(i) => {
                let n_vars = i.terms().iter().map(|t| t.lit.var()).max().unwrap_or(0);
                let mut fat = FatInequality::<num_bigint::BigInt>::new(n_vars);
                Some(Inequality::Big(self.apply_ineq(i, &mut fat)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdb::Term;

    #[test]
    fn apply_lit_renames_and_composes_sign() {
        let mut sub = Substitution::new();
        sub.set(1, Lit::from(2)); // x1 -> x2
        sub.set(3, !Lit::from(4)); // x3 -> -x4
        assert_eq!(sub.apply_lit(Lit::from(1)), Lit::from(2));
        assert_eq!(sub.apply_lit(Lit::from(-1)), Lit::from(-2));
        assert_eq!(sub.apply_lit(Lit::from(3)), Lit::from(-4));
        assert_eq!(sub.apply_lit(Lit::from(-3)), Lit::from(4));
        assert_eq!(sub.apply_lit(Lit::from(5)), Lit::from(5));
    }

    #[test]
    fn clause_drops_false_literal_and_shrinks() {
        let mut sub = Substitution::new();
        sub.set(1, Lit::FALSE);
        let c = Clause::new(vec![Lit::from(1), Lit::from(2)]);
        let rewritten = sub.apply_clause(&c).unwrap();
        assert_eq!(rewritten.as_slice(), &[Lit::from(2)]);
    }

    #[test]
    fn clause_becomes_trivial_when_literal_forced_true() {
        let mut sub = Substitution::new();
        sub.set(1, Lit::TRUE);
        let c = Clause::new(vec![Lit::from(1), Lit::from(2)]);
        assert!(sub.apply_clause(&c).is_none());
    }

    #[test]
    fn ineq_true_literal_lowers_degree() {
        // 2x1 + x2 >= 2, x1 forced true -> x2 >= 0, trivial.
        let ineq: FixedInequality<u32> = FixedInequality::from_normalized(
            vec![Term::new(1u32, Lit::from(2)), Term::new(2u32, Lit::from(1))],
            2,
        );
        let mut sub = Substitution::new();
        sub.set(1, Lit::TRUE);
        let mut fat = FatInequality::<i64>::new(2);
        let rewritten = sub.apply_ineq(&ineq, &mut fat);
        assert!(rewritten.is_trivial());
    }

    #[test]
    fn ineq_false_literal_drops_term_but_keeps_degree() {
        // x1 + x2 >= 1, x1 forced false -> x2 >= 1.
        let ineq: FixedInequality<u32> = FixedInequality::from_normalized(
            vec![Term::new(1u32, Lit::from(1)), Term::new(1u32, Lit::from(2))],
            1,
        );
        let mut sub = Substitution::new();
        sub.set(1, Lit::FALSE);
        let mut fat = FatInequality::<i64>::new(2);
        let rewritten = sub.apply_ineq(&ineq, &mut fat);
        assert_eq!(rewritten.len(), 1);
        assert_eq!(rewritten.terms()[0].lit, Lit::from(2));
        assert_eq!(*rewritten.degree(), 1);
    }

    #[test]
    fn ineq_rename_can_merge_variables() {
        // x1 + x2 >= 1, x1 -> x2, merges to 2x2 >= 1.
        let ineq: FixedInequality<u32> = FixedInequality::from_normalized(
            vec![Term::new(1u32, Lit::from(1)), Term::new(1u32, Lit::from(2))],
            1,
        );
        let mut sub = Substitution::new();
        sub.set(1, Lit::from(2));
        let mut fat = FatInequality::<i64>::new(2);
        let rewritten = sub.apply_ineq(&ineq, &mut fat);
        assert_eq!(rewritten.len(), 1);
        assert_eq!(rewritten.terms()[0].coeff, 2);
        assert_eq!(*rewritten.degree(), 1);
    }
}
