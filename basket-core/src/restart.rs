use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::config::RestartConfig;
use crate::wantlist::WantEntry;

/// Demand orders for a random-restart search.
///
/// Round 0 yields the base order untouched; every later round shuffles the
/// previous order again. The same seed always yields the same sequence.
pub struct RestartOrders {
    current: Vec<WantEntry>,
    rng: StdRng,
    round: u32,
    rounds: u32,
}

impl RestartOrders {
    pub fn new(base: Vec<WantEntry>, config: RestartConfig) -> Self {
        Self {
            current: base,
            rng: StdRng::seed_from_u64(config.seed),
            round: 0,
            rounds: config.rounds.max(1),
        }
    }
}

impl Iterator for RestartOrders {
    type Item = (u32, Vec<WantEntry>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.round >= self.rounds {
            return None;
        }
        if self.round > 0 {
            self.current.shuffle(&mut self.rng);
        }
        let round = self.round;
        self.round += 1;
        Some((round, self.current.clone()))
    }
}
