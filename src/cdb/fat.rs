//! `FatInequality<T>`: a dense, signed scratch buffer used while
//! building or rewriting an inequality (§4.4).
//!
//! Unlike [`crate::cdb::FixedInequality`], a fat inequality is indexed
//! directly by variable, carries a sign per entry, and supports
//! cancel-add arithmetic without re-sorting or re-allocating on every
//! term added. It exists only transiently: load, mutate, `freeze()`
//! back into a `FixedInequality`, done.

use crate::{
    cdb::{
        coeff::{Coeff, FatCoeff},
        ineq::FixedInequality,
        term::Term,
    },
    types::{Lit, VarId},
};

/// a per-variable signed coefficient plus which phase of the variable
/// it currently applies to. `coeff == 0` means "this variable does
/// not occur".
#[derive(Clone)]
struct Entry<S: FatCoeff> {
    coeff: S,
}

/// merge two signed coefficients on the same variable (§4.4
/// "cancel-add"): `a + b`, plus how much magnitude the merge lost —
/// `max(0, max(|a|,|b|) - |a+b|)` — which the caller must subtract
/// from the degree to keep the inequality implied by the originals.
fn cancel_merge<S: FatCoeff>(a: &S, b: &S) -> (S, Option<S::Unsigned>) {
    let a_mag = a.magnitude();
    let b_mag = b.magnitude();
    let sum = a.add(b);
    let sum_mag = sum.magnitude();
    let max_mag = if a_mag >= b_mag { a_mag } else { b_mag };
    if max_mag > sum_mag {
        (sum, Some(max_mag.sub(&sum_mag)))
    } else {
        (sum, None)
    }
}

/// dense scratch buffer, one [`Entry`] per variable, `1`-indexed like
/// [`VarId`] (index `0` unused, reserved for the constant variable).
pub struct FatInequality<S: FatCoeff> {
    entries: Vec<Entry<S>>,
    degree: S,
    /// guards against a fat inequality being reused while still
    /// loaded; cleared by [`FatInequality::unload`].
    busy: bool,
}

impl<S: FatCoeff> FatInequality<S> {
    pub fn new(n_vars: u32) -> FatInequality<S> {
        FatInequality {
            entries: vec![Entry { coeff: S::zero() }; 0]
                .into_iter()
                .chain((0..=n_vars).map(|_| Entry { coeff: S::zero() }))
                .collect(),
            degree: S::zero(),
            busy: false,
        }
    }

    pub fn resize(&mut self, n_vars: u32) {
        let want = n_vars as usize + 1;
        if self.entries.len() < want {
            self.entries.resize(want, Entry { coeff: S::zero() });
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// load a normalized, frozen inequality into the buffer. Panics
    /// (debug-only invariant) if the buffer is already loaded —
    /// callers must `unload()` first.
    pub fn load(&mut self, ineq: &FixedInequality<S::Unsigned>) {
        debug_assert!(!self.busy, "FatInequality::load called while busy");
        self.busy = true;
        self.degree = ineq.degree().to_signed();
        for t in ineq.terms() {
            self.add_lhs_term(&t.coeff.to_signed(), t.lit);
        }
    }

    /// add `coeff * lit` to the left-hand side in place, cancelling
    /// against an existing opposite-polarity entry for the same
    /// variable rather than storing both signs (§4.4 "cancel-add").
    pub fn add_lhs_term(&mut self, coeff: &S, lit: Lit) {
        if coeff.is_zero() {
            return;
        }
        let v = lit.var() as usize;
        let signed_coeff = if lit.is_neg() { coeff.neg() } else { coeff.clone() };
        let e = &mut self.entries[v];
        let (new_coeff, degree_drop) = cancel_merge(&e.coeff, &signed_coeff);
        if let Some(drop) = degree_drop {
            self.degree = self.degree.sub(&S::from_unsigned(&drop, false));
        }
        e.coeff = new_coeff;
    }

    /// overwrite the degree directly, e.g. when building a fresh
    /// inequality from caller-supplied coefficients rather than
    /// loading an existing [`FixedInequality`].
    pub fn set_degree(&mut self, degree: S) {
        self.busy = true;
        self.degree = degree;
    }

    /// fold a constant `amount` into the degree, e.g. a term whose
    /// literal a [`crate::substitution::Substitution`] has forced to
    /// ⊤: the term's coefficient moves unconditionally to the
    /// satisfied side, which is the same as lowering what remains to
    /// be proven by that amount (§4.10).
    pub fn reduce_degree_by(&mut self, amount: &S) {
        self.degree = self.degree.sub(amount);
    }

    /// add another fat inequality scaled by `multiplier`, plus its
    /// degree likewise scaled, onto this one (§4.4 `add`). Every term
    /// merge goes through the same cancel-add adjustment as
    /// [`FatInequality::add_lhs_term`] — a scaled addition is just
    /// many simultaneous term merges.
    pub fn add(&mut self, other: &FatInequality<S>, multiplier: u64) {
        debug_assert_eq!(self.entries.len(), other.entries.len());
        self.degree = self.degree.add(&other.degree.mul_u64(multiplier));
        for (mine, theirs) in self.entries.iter_mut().zip(other.entries.iter()) {
            if theirs.coeff.is_zero() {
                continue;
            }
            let scaled = theirs.coeff.mul_u64(multiplier);
            let (new_coeff, degree_drop) = cancel_merge(&mine.coeff, &scaled);
            if let Some(drop) = degree_drop {
                self.degree = self.degree.sub(&S::from_unsigned(&drop, false));
            }
            mine.coeff = new_coeff;
        }
    }

    /// scale the whole inequality by `k >= 1` (§4.4 `multiply`).
    pub fn multiply(&mut self, k: u64) {
        if k == 1 {
            return;
        }
        self.degree = self.degree.mul_u64(k);
        for e in &mut self.entries {
            if !e.coeff.is_zero() {
                e.coeff = e.coeff.mul_u64(k);
            }
        }
    }

    /// weaken (remove) the term for `var`, lowering the degree by its
    /// coefficient's magnitude so the inequality remains implied by
    /// the original (§4.4 `weaken`, §GLOSSARY "weakening cost").
    pub fn weaken(&mut self, var: VarId) {
        let e = &mut self.entries[var as usize];
        if e.coeff.is_zero() {
            return;
        }
        self.degree = self.degree.sub(&S::from_unsigned(&e.coeff.magnitude(), false));
        e.coeff = S::zero();
    }

    /// freeze the buffer into an attached [`FixedInequality`] and
    /// mark the buffer available for reuse (§4.4 `unload`). Negative
    /// degree is clamped to `0` (trivially true) and saturation
    /// clamps each coefficient to at most the (possibly negative-
    /// clamped) degree, per §GLOSSARY "saturation".
    pub fn freeze(&mut self) -> FixedInequality<S::Unsigned> {
        let degree_mag = if self.degree.is_negative() {
            S::Unsigned::zero()
        } else {
            self.degree.magnitude()
        };
        let mut terms = Vec::new();
        for (v, e) in self.entries.iter().enumerate() {
            if v == 0 || e.coeff.is_zero() {
                continue;
            }
            let lit = Lit::new(v as VarId, e.coeff.is_negative());
            let mag = e.coeff.magnitude().clamp_to(&degree_mag);
            // a trivial degree (`0`) saturates every coefficient down
            // to `0` too; drop the term rather than keep a zero-weight
            // one around (§GLOSSARY "saturation").
            if mag.is_zero() {
                continue;
            }
            terms.push(Term::new(mag, lit));
        }
        self.unload();
        FixedInequality::from_normalized(terms, degree_mag)
    }

    /// clear the buffer back to all-zero without freezing (§4.4
    /// `unload`), e.g. after discarding a failed build attempt.
    pub fn unload(&mut self) {
        for e in &mut self.entries {
            e.coeff = S::zero();
        }
        self.degree = S::zero();
        self.busy = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdb::coeff::Coeff;

    #[test]
    fn load_add_freeze_cancels_opposite_literals() {
        let a: FixedInequality<u32> =
            FixedInequality::from_normalized(vec![Term::new(1u32, Lit::from(1))], 1);
        let b: FixedInequality<u32> =
            FixedInequality::from_normalized(vec![Term::new(1u32, Lit::from(-1))], 1);

        let mut fat = FatInequality::<i64>::new(2);
        fat.load(&a);
        let mut fat_b = FatInequality::<i64>::new(2);
        fat_b.load(&b);
        fat.add(&fat_b, 1);
        // x1 >= 1  and  -x1 >= 1-1=0 (i.e. 1-x1>=1 encoded) cancel the
        // variable entirely once summed, and the cancellation must
        // carry its lost magnitude off the degree: naive summing would
        // give degree 2, but the true result is the contradiction
        // `{} >= 1`.
        let frozen = fat.freeze();
        assert!(frozen.is_empty());
        assert_eq!(*frozen.degree(), 1);
        assert!(frozen.is_contradiction());
    }

    #[test]
    fn multiply_scales_degree_and_coefficients() {
        let a: FixedInequality<u32> =
            FixedInequality::from_normalized(vec![Term::new(2u32, Lit::from(1))], 2);
        let mut fat = FatInequality::<i64>::new(1);
        fat.load(&a);
        fat.multiply(3);
        let frozen = fat.freeze();
        assert_eq!(*frozen.degree(), 6);
        assert_eq!(frozen.terms()[0].coeff, 6);
    }

    #[test]
    fn weaken_drops_term_and_lowers_degree() {
        let a: FixedInequality<u32> = FixedInequality::from_normalized(
            vec![Term::new(2u32, Lit::from(1)), Term::new(3u32, Lit::from(2))],
            4,
        );
        let mut fat = FatInequality::<i64>::new(2);
        fat.load(&a);
        fat.weaken(1);
        let frozen = fat.freeze();
        assert_eq!(frozen.len(), 1);
        assert_eq!(*frozen.degree(), 2);
    }

    #[test]
    fn weaken_lowers_degree_for_a_negated_literal_term() {
        // 2*(-x1) + 3x2 >= 4, i.e. -2x1 + 3x2 >= 4 in fat form.
        // Weakening the negated-literal term must still subtract its
        // magnitude (2) from the degree, not add it.
        let mut fat = FatInequality::<i64>::new(2);
        fat.set_degree(4);
        fat.add_lhs_term(&2i64, !Lit::from(1));
        fat.add_lhs_term(&3i64, Lit::from(2));
        fat.weaken(1);
        let frozen = fat.freeze();
        assert_eq!(frozen.len(), 1);
        assert_eq!(*frozen.degree(), 2);
    }
}
