//! `FixedInequality<T>`: the immutable, attached form of a
//! pseudo-Boolean inequality `Σ aᵢℓᵢ ≥ d` (§3, §4.2).

use crate::{
    cdb::{coeff::Coeff, term::Term},
    types::{FlagConstraint, FlagsField, Lit},
};
use std::fmt;

/// A normalized, immutable `Σ aᵢℓᵢ ≥ d` with `aᵢ: T` non-negative,
/// `d: T`, literals distinct by variable, and terms sorted by
/// ascending coefficient.
#[derive(Clone, Debug)]
pub struct FixedInequality<T: Coeff> {
    pub(crate) degree: T,
    pub(crate) terms: Box<[Term<T>]>,
    /// `terms.last().coeff`, cached (§3).
    pub(crate) max_coeff: T,
    /// the smallest prefix length whose coefficient sum is `>=
    /// max(degree, max_coeff)` (§3, §4.2).
    pub(crate) watch_size: usize,
    pub(crate) flags: FlagConstraint,
}

impl<T: Coeff> FlagsField for FixedInequality<T> {
    fn flags_field(&self) -> FlagConstraint {
        self.flags
    }
    fn flags_field_mut(&mut self) -> &mut FlagConstraint {
        &mut self.flags
    }
}

impl<T: Coeff> FixedInequality<T> {
    /// build from already fully-normalized data (sorted ascending,
    /// positive coefficients, no duplicate variables). Normalization
    /// itself happens once, at the façade level, via a fat-inequality
    /// round trip (§4.4, §4.10) so it is shared by every caller
    /// (construction, substitution, saturation).
    pub(crate) fn from_normalized(mut terms: Vec<Term<T>>, degree: T) -> FixedInequality<T> {
        terms.sort_by(|a, b| a.coeff.cmp(&b.coeff));
        let max_coeff = terms.last().map(|t| t.coeff.clone()).unwrap_or_else(T::zero);
        let watch_size = Self::compute_watch_size(&terms, &degree, &max_coeff);
        let enough_watches = Self::covers_after_any_single_drop(&terms, watch_size, &max_coeff);
        let mut flags = FlagConstraint::empty();
        flags.set(FlagConstraint::ENOUGH_WATCHES, enough_watches);
        flags.set(
            FlagConstraint::PROPAGATES_AT_ROOT,
            Self::propagates_under_empty_assignment(&terms, &degree, watch_size),
        );
        FixedInequality {
            degree,
            terms: terms.into_boxed_slice(),
            max_coeff,
            watch_size,
            flags,
        }
    }

    /// §4.2: "the smallest prefix length `w` such that `Σ_{i<w}
    /// coeff_i >= max(d, maxCoeff)`".
    fn compute_watch_size(terms: &[Term<T>], degree: &T, max_coeff: &T) -> usize {
        let target = if *degree > *max_coeff {
            degree.clone()
        } else {
            max_coeff.clone()
        };
        let mut sum = T::zero();
        for (i, t) in terms.iter().enumerate() {
            if sum >= target {
                return i;
            }
            sum = sum.checked_add(&t.coeff).unwrap_or_else(|| t.coeff.clone());
        }
        terms.len()
    }

    /// `true` iff the coefficient sum of the *entire* term list
    /// already covers `max_coeff`, i.e. slack need not be recomputed
    /// from scratch on every watch update (§3 `enoughWatches`).
    fn covers_after_any_single_drop(terms: &[Term<T>], watch_size: usize, max_coeff: &T) -> bool {
        if watch_size >= terms.len() {
            return true;
        }
        let mut sum = T::zero();
        for t in terms {
            sum = sum.checked_add(&t.coeff).unwrap_or_else(|| t.coeff.clone());
        }
        sum >= *max_coeff
    }

    /// §4.2 "propagation-at-0 test": would `init_watch` against the
    /// empty assignment already force a literal or find a conflict?
    /// Under the empty assignment every literal is "not falsified", so
    /// the slack of the watched prefix is `sum(watched) - degree`,
    /// which by construction of `watch_size` is `>= 0` unless the
    /// whole constraint is a contradiction.
    fn propagates_under_empty_assignment(terms: &[Term<T>], degree: &T, watch_size: usize) -> bool {
        if terms.is_empty() {
            return !degree.is_zero();
        }
        let mut sum = T::zero();
        for t in &terms[..watch_size] {
            sum = sum.checked_add(&t.coeff).unwrap_or_else(|| t.coeff.clone());
        }
        if sum < *degree {
            return true; // contradiction under the empty assignment
        }
        let slack = sum.sub(degree);
        terms[..watch_size].iter().any(|t| t.coeff > slack)
    }

    pub fn degree(&self) -> &T {
        &self.degree
    }

    pub fn max_coeff(&self) -> &T {
        &self.max_coeff
    }

    pub fn watch_size(&self) -> usize {
        self.watch_size
    }

    pub fn terms(&self) -> &[Term<T>] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// §GLOSSARY "contradiction": the empty sum can never reach a
    /// positive degree.
    pub fn is_contradiction(&self) -> bool {
        self.terms.is_empty() && !self.degree.is_zero()
    }

    /// §GLOSSARY "trivial": the degree is already met by nothing.
    pub fn is_trivial(&self) -> bool {
        self.degree.is_zero()
    }

    /// down-convert eligibility (§4.2, §9): every coefficient equals
    /// `1` and `degree == 1`.
    pub fn is_clause_shaped(&self) -> bool {
        self.degree == T::one() && self.terms.iter().all(|t| t.coeff == T::one())
    }

    /// content equality for dedup (§4.5, §9 "hash-set of
    /// constraints"): same degree, same `(coefficient, literal)`
    /// multiset, order-independent. Ignores the cached
    /// `watch_size`/`max_coeff`/flags, which are derived from the
    /// terms, not independent content.
    pub fn content_eq(&self, other: &FixedInequality<T>) -> bool {
        if self.degree != other.degree || self.terms.len() != other.terms.len() {
            return false;
        }
        let mut a: Vec<&Term<T>> = self.terms.iter().collect();
        let mut b: Vec<&Term<T>> = other.terms.iter().collect();
        a.sort_unstable_by_key(|t| t.lit.var());
        b.sort_unstable_by_key(|t| t.lit.var());
        a.iter().zip(b.iter()).all(|(x, y)| x.lit == y.lit && x.coeff == y.coeff)
    }
}

impl<T: Coeff> fmt::Display for FixedInequality<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, t) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{t}")?;
        }
        write!(f, "}} >= {}", self.degree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(c: u32, l: i32) -> Term<u32> {
        Term::new(c, Lit::from(l))
    }

    #[test]
    fn watch_size_covers_max_of_degree_and_max_coeff() {
        // 3x1 + 2x2 + 2x3 >= 3 (scenario 2 of the spec).
        let ineq = FixedInequality::from_normalized(
            vec![term(2, 2), term(2, 3), term(3, 1)],
            3u32,
        );
        assert_eq!(*ineq.max_coeff(), 3);
        // prefix [2,2] sums to 4 >= max(3,3)=3 already at i=1... but
        // terms are sorted ascending so the smallest prefix covering
        // 3 is just the first term (2) -> not enough, need two: 2+2=4>=3.
        assert!(ineq.watch_size() <= 2);
    }

    #[test]
    fn clause_shaped_detection() {
        let ineq = FixedInequality::from_normalized(vec![term(1, 1), term(1, 2)], 1u32);
        assert!(ineq.is_clause_shaped());
        let ineq2 = FixedInequality::from_normalized(vec![term(2, 1), term(1, 2)], 1u32);
        assert!(!ineq2.is_clause_shaped());
    }

    #[test]
    fn contradiction_and_trivial() {
        let empty_false: FixedInequality<u32> = FixedInequality::from_normalized(vec![], 1u32);
        assert!(empty_false.is_contradiction());
        let empty_true: FixedInequality<u32> = FixedInequality::from_normalized(vec![], 0u32);
        assert!(empty_true.is_trivial());
    }
}
