//! `Inequality`: the polymorphic façade over the three constraint
//! representations (§3 "Constraint façade", §4.1, §4.10).
//!
//! Construction, substitution, and implication all funnel through
//! here so that normalization — duplicate-variable merging,
//! saturation, trivial/contradiction detection, and the small-vs-big
//! and clause-vs-inequality downgrades — happens in exactly one place
//! regardless of which representation the caller started from.

use crate::{
    cdb::{clause::Clause, coeff::Coeff, coeff::FatCoeff, fat::FatInequality, ineq::FixedInequality, term::Term},
    types::{Lit, PropError},
};
use num_bigint::{BigInt, BigUint};
use std::fmt;

/// a constraint in its canonical, representation-chosen form, not yet
/// given a [`crate::cdb::Handle`] (i.e. not yet attached).
#[derive(Clone, Debug)]
pub enum Inequality {
    Clause(Clause),
    Small(FixedInequality<u32>),
    Big(FixedInequality<BigUint>),
}

impl Inequality {
    /// build and normalize `Σ coeffs[i]*lits[i] >= degree` (§3, §4.1,
    /// §4.10). Duplicate variables are merged (later occurrences
    /// cancel or accumulate against earlier ones), negative or
    /// zero-after-merge terms are dropped with a degree adjustment
    /// (saturating at zero), and the whole thing downgrades to a
    /// [`Clause`] when every surviving coefficient is `1` and
    /// `degree == 1`.
    pub fn from_coeffs_lits_degree(
        coeffs: &[u64],
        lits: &[i32],
        degree: i64,
    ) -> Result<Inequality, PropError> {
        if coeffs.len() != lits.len() {
            return Err(PropError::NonPositiveVariable);
        }
        for &raw in lits {
            if raw == 0 {
                return Err(PropError::NonPositiveVariable);
            }
        }
        if degree < 0 {
            return Err(PropError::NegativeDegree);
        }

        let n_vars = lits.iter().map(|l| l.unsigned_abs()).max().unwrap_or(0);
        let mut fat = FatInequality::<i64>::new(n_vars);
        fat.set_degree(degree);
        for (&c, &raw) in coeffs.iter().zip(lits) {
            let lit = Lit::from(raw);
            fat.add_lhs_term(&(c as i64), lit);
        }

        let small = fat.freeze();
        Ok(Inequality::from_fixed_small(small))
    }

    /// wrap a normalized small inequality, downgrading it to a
    /// [`Clause`] when every coefficient and the degree are `1`
    /// (§4.1, §4.10 — substitution reuses this same downgrade check).
    pub(crate) fn from_fixed_small(ineq: FixedInequality<u32>) -> Inequality {
        if ineq.is_clause_shaped() {
            let lits = ineq.terms().iter().map(|t| t.lit).collect();
            Inequality::Clause(Clause::new(lits))
        } else {
            Inequality::Small(ineq)
        }
    }

    /// promote a small-domain inequality to the arbitrary-precision
    /// representation, e.g. because a later `add`/`multiply` step
    /// would otherwise overflow `u32`/`i64` (§2, §9).
    pub fn promote_to_big(ineq: &FixedInequality<u32>) -> FixedInequality<BigUint> {
        let terms = ineq
            .terms()
            .iter()
            .map(|t| Term::new(BigUint::from(t.coeff), t.lit))
            .collect();
        FixedInequality::from_normalized(terms, BigUint::from(*ineq.degree()))
    }

    pub fn is_contradiction(&self) -> bool {
        match self {
            Inequality::Clause(c) => c.is_empty(),
            Inequality::Small(i) => i.is_contradiction(),
            Inequality::Big(i) => i.is_contradiction(),
        }
    }

    pub fn is_trivial(&self) -> bool {
        match self {
            Inequality::Clause(_) => false,
            Inequality::Small(i) => i.is_trivial(),
            Inequality::Big(i) => i.is_trivial(),
        }
    }

    /// §GLOSSARY "syntactic implication": `self` implies `other` when
    /// every literal of `other` occurs in `self` with at least as
    /// large a coefficient and the degree comparison, after summing
    /// the "weakening cost" of every literal in `self` absent from
    /// `other`, still holds (§4.6).
    pub fn implies(&self, other: &Inequality) -> bool {
        match (self, other) {
            (Inequality::Clause(a), Inequality::Clause(b)) => {
                a.iter().all(|l| b.iter().any(|m| m == l))
            }
            _ => {
                let (a_terms, a_degree) = self.as_big_terms();
                let (b_terms, b_degree) = other.as_big_terms();
                implies_big(&a_terms, &a_degree, &b_terms, &b_degree)
            }
        }
    }

    pub(crate) fn as_big_terms(&self) -> (Vec<Term<BigUint>>, BigUint) {
        match self {
            Inequality::Clause(c) => (
                c.iter().map(|&l| Term::new(BigUint::from(1u32), l)).collect(),
                BigUint::from(1u32),
            ),
            Inequality::Small(i) => (
                i.terms().iter().map(|t| Term::new(BigUint::from(t.coeff), t.lit)).collect(),
                BigUint::from(*i.degree()),
            ),
            Inequality::Big(i) => (i.terms().to_vec(), i.degree().clone()),
        }
    }

    /// a dedup key for the content-hash bucket (§4.5, §9 "hash-set of
    /// constraints"): two inequalities with the same `content_hash`
    /// are candidates for `content_eq`, not guaranteed equal — the
    /// store still resolves collisions by comparing content.
    pub fn content_hash(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut pairs: Vec<(u32, bool, u64)> = Vec::new();
        let degree_hash: u64;
        match self {
            Inequality::Clause(c) => {
                for &l in c.iter() {
                    pairs.push((l.var(), l.is_neg(), 1));
                }
                degree_hash = 1;
            }
            Inequality::Small(i) => {
                for t in i.terms() {
                    pairs.push((t.lit.var(), t.lit.is_neg(), t.coeff as u64));
                }
                degree_hash = *i.degree() as u64;
            }
            Inequality::Big(i) => {
                for t in i.terms() {
                    let mut h = DefaultHasher::new();
                    t.coeff.hash(&mut h);
                    pairs.push((t.lit.var(), t.lit.is_neg(), h.finish()));
                }
                let mut h = DefaultHasher::new();
                i.degree().hash(&mut h);
                degree_hash = h.finish();
            }
        }
        pairs.sort_unstable_by_key(|&(var, _, _)| var);

        let mut hasher = DefaultHasher::new();
        std::mem::discriminant(self).hash(&mut hasher);
        pairs.hash(&mut hasher);
        degree_hash.hash(&mut hasher);
        hasher.finish()
    }

    /// §4.8 step 3: the negation of `Σ aᵢℓᵢ ≥ d` is `Σ aᵢ(¬ℓᵢ) ≥ 1 - d +
    /// Σaᵢ` — flip every literal, move the whole left-hand side's mass
    /// to the new degree. Used to build the auxiliary propagator a RUP
    /// check installs before asking whether it conflicts (§4.8). A
    /// [`FatInequality`] round trip gets saturation and the
    /// clause/small downgrade right for free, same as every other
    /// normalization path.
    pub fn negated(&self) -> Inequality {
        match self {
            Inequality::Clause(c) => {
                let terms: Vec<Term<u32>> = c.iter().map(|&l| Term::new(1u32, l)).collect();
                Inequality::from_fixed_small(negate_unsigned(&terms, &1u32))
            }
            Inequality::Small(i) => Inequality::from_fixed_small(negate_unsigned(i.terms(), i.degree())),
            Inequality::Big(i) => Inequality::Big(negate_unsigned(i.terms(), i.degree())),
        }
    }

    /// §4.9 "is the constraint satisfied by a full assignment": used
    /// by the testable-properties harness, not by propagation itself
    /// (propagation only ever needs slack against a *partial*
    /// assignment, computed by the watch/slack machinery in
    /// [`crate::cdb::propagator`]).
    pub fn is_sat(&self, full_assignment: &[Option<bool>]) -> bool {
        match self {
            Inequality::Clause(c) => c.iter().any(|&l| literal_value(full_assignment, l)),
            Inequality::Small(i) => {
                sum_satisfied(i.terms(), full_assignment) >= *i.degree()
            }
            Inequality::Big(i) => {
                sum_satisfied(i.terms(), full_assignment) >= *i.degree()
            }
        }
    }

    /// render for proof-log diagnostics, numbering literals by
    /// ascending variable (not by the order they happen to be stored
    /// in) so output is stable across watch-list reshuffles.
    pub fn to_string(&self, var_name: impl Fn(u32) -> String) -> String {
        match self {
            Inequality::Clause(c) => {
                let mut lits: Vec<Lit> = c.iter().copied().collect();
                lits.sort_unstable_by_key(|l| l.var());
                let body = lits
                    .iter()
                    .map(|l| format_lit(*l, &var_name))
                    .collect::<Vec<_>>()
                    .join(" + ");
                format!("{body} >= 1")
            }
            Inequality::Small(i) => format_ineq(i.terms(), i.degree(), &var_name),
            Inequality::Big(i) => format_ineq(i.terms(), i.degree(), &var_name),
        }
    }
}

fn literal_value(full_assignment: &[Option<bool>], lit: Lit) -> bool {
    let value = full_assignment
        .get(lit.var() as usize)
        .copied()
        .flatten()
        .unwrap_or(false);
    value != lit.is_neg()
}

fn sum_satisfied<T: Coeff>(terms: &[Term<T>], full_assignment: &[Option<bool>]) -> T {
    let mut sum = T::zero();
    for t in terms {
        if literal_value(full_assignment, t.lit) {
            sum = sum.checked_add(&t.coeff).unwrap_or_else(|| t.coeff.clone());
        }
    }
    sum
}

fn format_lit(lit: Lit, var_name: &impl Fn(u32) -> String) -> String {
    if lit.is_neg() {
        format!("~{}", var_name(lit.var()))
    } else {
        var_name(lit.var())
    }
}

fn format_ineq<T: Coeff>(terms: &[Term<T>], degree: &T, var_name: &impl Fn(u32) -> String) -> String {
    let mut sorted: Vec<&Term<T>> = terms.iter().collect();
    sorted.sort_unstable_by_key(|t| t.lit.var());
    let body = sorted
        .iter()
        .map(|t| {
            if t.coeff == T::one() {
                format_lit(t.lit, var_name)
            } else {
                format!("{} {}", t.coeff, format_lit(t.lit, var_name))
            }
        })
        .collect::<Vec<_>>()
        .join(" + ");
    format!("{body} >= {degree}")
}

/// weakening-cost implication check shared by every representation
/// pair, computed in the arbitrary-precision domain so mixed
/// small/big comparisons never overflow (§4.6).
fn implies_big(
    a_terms: &[Term<BigUint>],
    a_degree: &BigUint,
    b_terms: &[Term<BigUint>],
    b_degree: &BigUint,
) -> bool {
    use std::collections::HashMap;
    let b_index: HashMap<u32, &Term<BigUint>> = b_terms.iter().map(|t| (t.lit.index() as u32, t)).collect();

    let mut weakening_cost = BigInt::from(0);
    for t in a_terms {
        match b_index.get(&(t.lit.index() as u32)) {
            Some(bt) if bt.coeff >= t.coeff => {}
            // `other`'s coefficient is already saturated against its
            // own degree, so it could not have been any larger to
            // begin with — weakening down to it is free.
            Some(bt) if bt.coeff >= *b_degree => {}
            Some(bt) => {
                // present in `other` but with a smaller, unsaturated
                // coefficient: the shortfall must be paid for by weakening.
                weakening_cost += BigInt::from(t.coeff.clone()) - BigInt::from(bt.coeff.clone());
            }
            None => {
                weakening_cost += BigInt::from(t.coeff.clone());
            }
        }
    }
    BigInt::from(a_degree.clone()) - weakening_cost >= BigInt::from(b_degree.clone())
}

/// shared arithmetic behind [`Inequality::negated`]: `Σ aᵢ(¬ℓᵢ) ≥ 1 -
/// d + Σaᵢ`, computed via a fat-inequality round trip so a
/// contradiction (`d'` clamps to `0`) or a now-trivial term (coefficient
/// saturates to `0`) falls out of the usual freeze logic rather than
/// needing its own special case here.
fn negate_unsigned<T: Coeff>(terms: &[Term<T>], degree: &T) -> FixedInequality<T> {
    let mut sum = T::zero();
    for t in terms {
        sum = sum.checked_add(&t.coeff).unwrap_or_else(|| t.coeff.clone());
    }
    let n_vars = terms.iter().map(|t| t.lit.var()).max().unwrap_or(0);
    let mut fat = FatInequality::<T::Signed>::new(n_vars);
    let one = T::Signed::from_unsigned(&T::one(), false);
    let degree_signed = sum.to_signed().add(&one).sub(&degree.to_signed());
    fat.set_degree(degree_signed);
    for t in terms {
        fat.add_lhs_term(&t.coeff.to_signed(), !t.lit);
    }
    fat.freeze()
}

impl fmt::Display for Inequality {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Inequality::Clause(c) => write!(f, "{c}"),
            Inequality::Small(i) => write!(f, "{i}"),
            Inequality::Big(i) => write!(f, "{i}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_clause_downgrades_to_clause_variant() {
        let ineq = Inequality::from_coeffs_lits_degree(&[1, 1], &[1, 2], 1).unwrap();
        assert!(matches!(ineq, Inequality::Clause(_)));
    }

    #[test]
    fn weighted_stays_an_inequality() {
        let ineq = Inequality::from_coeffs_lits_degree(&[2, 1], &[1, 2], 2).unwrap();
        assert!(matches!(ineq, Inequality::Small(_)));
    }

    #[test]
    fn self_implies_self() {
        let a = Inequality::from_coeffs_lits_degree(&[2, 2], &[1, 2], 3).unwrap();
        assert!(a.implies(&a.clone()));
    }

    #[test]
    fn stronger_implies_weaker() {
        // 2x1 + 2x2 >= 4  implies  x1 + x2 >= 1 (plenty of slack).
        let strong = Inequality::from_coeffs_lits_degree(&[2, 2], &[1, 2], 4).unwrap();
        let weak = Inequality::from_coeffs_lits_degree(&[1, 1], &[1, 2], 1).unwrap();
        assert!(strong.implies(&weak));
        assert!(!weak.implies(&strong));
    }

    #[test]
    fn smaller_clause_implies_the_clause_it_is_a_subset_of() {
        // {x1} implies {x1, x2}: x1 alone already forces x1 \/ x2.
        let unit = Inequality::from_coeffs_lits_degree(&[1], &[1], 1).unwrap();
        let pair = Inequality::from_coeffs_lits_degree(&[1, 1], &[1, 2], 1).unwrap();
        assert!(matches!(unit, Inequality::Clause(_)));
        assert!(matches!(pair, Inequality::Clause(_)));
        assert!(unit.implies(&pair));
        assert!(!pair.implies(&unit));
    }

    #[test]
    fn saturated_target_coefficient_is_free_to_weaken_to() {
        // 2x1 + 2x2 >= 2 implies x1 + x2 >= 1: weakening either term
        // down to its counterpart in the target costs nothing once the
        // target's own coefficient already saturates its degree (here
        // 1 >= 1), even though 2 > 1.
        let strong = Inequality::from_coeffs_lits_degree(&[2, 2], &[1, 2], 2).unwrap();
        let weak = Inequality::from_coeffs_lits_degree(&[1, 1], &[1, 2], 1).unwrap();
        assert!(strong.implies(&weak));
    }

    #[test]
    fn rejects_zero_literal() {
        assert!(Inequality::from_coeffs_lits_degree(&[1], &[0], 1).is_err());
    }

    #[test]
    fn rejects_negative_degree() {
        assert!(Inequality::from_coeffs_lits_degree(&[1], &[1], -1).is_err());
    }

    #[test]
    fn negating_a_clause_conjoins_the_flipped_literals() {
        // {x1, x2} >= 1 negates to -x1 + -x2 >= 2, i.e. both forced false.
        let ineq = Inequality::from_coeffs_lits_degree(&[1, 1], &[1, 2], 1).unwrap();
        match ineq.negated() {
            Inequality::Small(i) => {
                assert_eq!(*i.degree(), 2);
                assert_eq!(i.len(), 2);
            }
            other => panic!("expected a small inequality, got {other:?}"),
        }
    }

    #[test]
    fn negating_a_unit_clause_stays_a_clause() {
        let ineq = Inequality::from_coeffs_lits_degree(&[1], &[1], 1).unwrap();
        assert!(matches!(ineq.negated(), Inequality::Clause(_)));
    }

    #[test]
    fn negation_round_trips() {
        let ineq = Inequality::from_coeffs_lits_degree(&[2, 1], &[1, 2], 2).unwrap();
        let back = ineq.negated().negated();
        assert_eq!(ineq.content_hash(), back.content_hash());
    }

    #[test]
    fn negation_of_contradiction_is_trivially_true() {
        let ineq = Inequality::from_coeffs_lits_degree(&[], &[], 1).unwrap();
        assert!(ineq.is_contradiction());
        assert!(ineq.negated().is_trivial());
    }
}
