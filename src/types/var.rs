//! Small helpers around [`VarId`](`crate::types::VarId`) that don't
//! belong to the literal encoding itself: sizing literal-indexed
//! arrays and the phase-memory value saved per variable.

use crate::types::{Lit, VarId};

/// the number of distinct literal ids for `n_vars` variables,
/// including the two literals of the reserved constant variable.
#[inline]
pub fn num_lits(n_vars: u32) -> usize {
    2 * (n_vars as usize + 1)
}

/// the last-assigned polarity of a variable, used to guide watch
/// replacement (§4.2: "preferring terms whose literal's last phase
/// was True").
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Pos,
    Neg,
}

impl Phase {
    /// the phase matching a literal's own polarity.
    #[inline]
    pub fn of(l: Lit) -> Phase {
        if l.is_neg() {
            Phase::Neg
        } else {
            Phase::Pos
        }
    }

    /// `true` iff a literal of this variable with the given sign
    /// matches the saved phase.
    #[inline]
    pub fn matches(self, l: Lit) -> bool {
        self == Phase::of(l)
    }
}

/// per-variable phase memory, growing monotonically with the
/// variable count.
#[derive(Clone, Debug, Default)]
pub struct PhaseSaver {
    phase: Vec<Phase>,
}

impl PhaseSaver {
    pub fn new(n_vars: u32) -> PhaseSaver {
        PhaseSaver {
            phase: vec![Phase::Pos; n_vars as usize + 1],
        }
    }

    /// extend to cover `n_vars`; existing phases are kept.
    pub fn resize(&mut self, n_vars: u32) {
        if (n_vars as usize + 1) > self.phase.len() {
            self.phase.resize(n_vars as usize + 1, Phase::Pos);
        }
    }

    pub fn get(&self, v: VarId) -> Phase {
        self.phase[v as usize]
    }

    pub fn save(&mut self, l: Lit) {
        self.phase[l.var() as usize] = Phase::of(l);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_follows_last_assignment() {
        let mut ps = PhaseSaver::new(2);
        ps.save(Lit::from(-1));
        assert_eq!(ps.get(1), Phase::Neg);
        ps.save(Lit::from(1));
        assert_eq!(ps.get(1), Phase::Pos);
    }
}
