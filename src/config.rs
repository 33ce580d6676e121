//! Crate `config` provides the engine's runtime-tunable constants.
//!
//! Unlike the CLI-oriented `Config` of a full proof checker, this
//! `Config` has no command-line derive: there is no first-party CLI in
//! this core (§1, out of scope), so the embedding checker is the only
//! client and builds values programmatically.

/// Configuration for a [`crate::engine::PropEngine`].
#[derive(Clone, Debug)]
pub struct Config {
    /// capacity hint for the literal- and variable-indexed vectors
    /// allocated by `PropEngine::new`.
    pub initial_vars: u32,

    /// `rup_check` runs a full (non-incremental) propagation pass
    /// every `rup_full_check_period`-th call, to bound the drift
    /// between the watch lists and the true model that accumulates
    /// from repeated incremental `init_propagation` calls (§4.8).
    pub rup_full_check_period: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            initial_vars: 0,
            rup_full_check_period: 10,
        }
    }
}

impl Config {
    /// a config sized for an upfront known number of variables.
    pub fn with_vars(n_vars: u32) -> Config {
        Config {
            initial_vars: n_vars,
            ..Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_spec_period() {
        assert_eq!(Config::default().rup_full_check_period, 10);
    }
}
