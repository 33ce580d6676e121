//! `Clause`: the coefficient-free, degree-1 specialization of a
//! pseudo-Boolean constraint (§3, §4.3).

use crate::types::{FlagConstraint, FlagsField, Lit};
use std::fmt;

/// A disjunction of literals, `Σ 1*ℓᵢ ≥ 1`, stored as a plain literal
/// vector rather than a `Term` vector since every coefficient is `1`.
#[derive(Clone, Debug)]
pub struct Clause {
    pub(crate) lits: Vec<Lit>,
    /// rotating cursor into `lits[2..]` used to speed up the next
    /// watch-replacement search (§3).
    pub(crate) search_from: usize,
    pub(crate) flags: FlagConstraint,
}

impl Clause {
    /// build a clause from already-normalized, distinct-by-variable
    /// literals. Normalization (dedup, tautology detection) is the
    /// caller's responsibility — see
    /// [`crate::cdb::Inequality::from_coeffs_lits_degree`], which
    /// performs it once for every representation.
    pub fn new(lits: Vec<Lit>) -> Clause {
        let mut flags = FlagConstraint::empty();
        // a clause with 0 or 1 literals can never get a second watch,
        // so it is a conflict or a unit under the empty assignment
        // already (§4.2 "propagation-at-0 test").
        flags.set(FlagConstraint::PROPAGATES_AT_ROOT, lits.len() <= 1);
        Clause {
            lits,
            search_from: 2,
            flags,
        }
    }

    pub fn len(&self) -> usize {
        self.lits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Lit> {
        self.lits.iter()
    }

    pub fn as_slice(&self) -> &[Lit] {
        &self.lits
    }

    /// content equality for dedup (§4.5, §9 "hash-set of
    /// constraints"): same literals, order-independent. Ignores
    /// `search_from`/`flags`, which are propagation bookkeeping, not
    /// content.
    pub fn content_eq(&self, other: &Clause) -> bool {
        if self.lits.len() != other.lits.len() {
            return false;
        }
        let mut a = self.lits.clone();
        let mut b = other.lits.clone();
        a.sort_unstable_by_key(|l| l.var());
        b.sort_unstable_by_key(|l| l.var());
        a == b
    }
}

impl FlagsField for Clause {
    fn flags_field(&self) -> FlagConstraint {
        self.flags
    }
    fn flags_field_mut(&mut self) -> &mut FlagConstraint {
        &mut self.flags
    }
}

impl std::ops::Index<usize> for Clause {
    type Output = Lit;
    fn index(&self, i: usize) -> &Lit {
        &self.lits[i]
    }
}

impl std::ops::IndexMut<usize> for Clause {
    fn index_mut(&mut self, i: usize) -> &mut Lit {
        &mut self.lits[i]
    }
}

impl<'a> IntoIterator for &'a Clause {
    type Item = &'a Lit;
    type IntoIter = std::slice::Iter<'a, Lit>;
    fn into_iter(self) -> Self::IntoIter {
        self.lits.iter()
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, l) in self.lits.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{l}")?;
        }
        write!(f, "}} >= 1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_literal_order() {
        let c = Clause::new(vec![Lit::from(1), Lit::from(-2)]);
        assert_eq!(c.to_string(), "{1, -2} >= 1");
    }
}
