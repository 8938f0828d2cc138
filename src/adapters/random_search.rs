//! Seeded uniform random-search oracle.
//!
//! Samples candidates uniformly within the parameter space and keeps the
//! best objective value seen, evaluating exactly the trial budget. A fixed
//! seed makes the whole search reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::params::{FloatRange, IntRange, ParameterSet, ParameterSpace};
use crate::ports::search_port::SearchPort;

pub struct RandomSearchAdapter {
    seed: u64,
}

impl RandomSearchAdapter {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

fn sample_int(rng: &mut StdRng, range: IntRange) -> u32 {
    rng.gen_range(range.min..=range.max)
}

fn sample_float(rng: &mut StdRng, range: FloatRange) -> f64 {
    if range.min < range.max {
        rng.gen_range(range.min..range.max)
    } else {
        range.min
    }
}

fn sample(rng: &mut StdRng, space: &ParameterSpace) -> ParameterSet {
    ParameterSet {
        rsi_overbought: sample_int(rng, space.rsi_overbought),
        rsi_oversold: sample_int(rng, space.rsi_oversold),
        atr_mult: sample_float(rng, space.atr_mult),
        take_profit_mult: sample_float(rng, space.take_profit_mult),
        risk_pct: sample_float(rng, space.risk_pct),
        cooldown: sample_int(rng, space.cooldown),
    }
}

impl SearchPort for RandomSearchAdapter {
    fn search(
        &self,
        space: &ParameterSpace,
        objective: &mut dyn FnMut(&ParameterSet) -> f64,
        trial_budget: usize,
    ) -> ParameterSet {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<(ParameterSet, f64)> = None;

        for _ in 0..trial_budget {
            let candidate = sample(&mut rng, space);
            let score = objective(&candidate);
            let improved = match &best {
                Some((_, best_score)) => score > *best_score,
                None => true,
            };
            if improved {
                best = Some((candidate, score));
            }
        }

        match best {
            Some((params, _)) => params,
            None => sample(&mut rng, space),
        }
    }
}
