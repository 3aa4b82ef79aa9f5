//! The M+double-M scheduler: three competing exponential clocks
//! (arrival, selection, mining), with selection and mining mutually
//! exclusive — exactly one of them is ever pending at a time.

use crate::error::Result;
use crate::rng::RngFacade;

use super::{Event, Scheduler};

/// Scheduler state: the current time, the three rate parameters (as
/// means), each clock's dedicated RNG stream, and the next-planned time
/// for each of the three events (`f64::INFINITY` when inactive).
pub struct MmScheduler {
    t: f64,
    lambda: f64,
    mu1: f64,
    mu2: f64,
    arrival_rng: RngFacade,
    selection_rng: RngFacade,
    mining_rng: RngFacade,
    arrival_at: f64,
    selection_at: f64,
    mining_at: f64,
}

impl MmScheduler {
    /// Builds a scheduler with an arrival and a selection already
    /// scheduled and mining inactive (`+infinity`), matching the
    /// invariant that the server starts by selecting, not mining.
    pub fn new(
        lambda: f64,
        mu1: f64,
        mu2: f64,
        mut arrival_rng: RngFacade,
        mut selection_rng: RngFacade,
        mining_rng: RngFacade,
    ) -> Self {
        let arrival_at = arrival_rng.exponential(lambda);
        let selection_at = selection_rng.exponential(mu1);
        Self {
            t: 0.0,
            lambda,
            mu1,
            mu2,
            arrival_rng,
            selection_rng,
            mining_rng,
            arrival_at,
            selection_at,
            mining_at: f64::INFINITY,
        }
    }
}

impl Scheduler for MmScheduler {
    fn t(&self) -> f64 {
        self.t
    }

    fn next(&mut self) -> Result<Event> {
        let candidates = [
            (Event::Arrival, self.arrival_at),
            (Event::Selection, self.selection_at),
            (Event::Mining, self.mining_at),
        ];
        let (event, time) = candidates
            .into_iter()
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
            .expect("three candidates, never empty");

        self.t = time;

        match event {
            Event::Arrival => {
                self.arrival_at = self.t + self.arrival_rng.exponential(self.lambda);
            }
            Event::Selection => {
                self.selection_at = f64::INFINITY;
                self.mining_at = self.t + self.mining_rng.exponential(self.mu2);
            }
            Event::Mining => {
                self.mining_at = f64::INFINITY;
                self.selection_at = self.t + self.selection_rng.exponential(self.mu1);
            }
        }

        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::StreamPool;

    fn scheduler(lambda: f64, mu1: f64, mu2: f64, seed: u64) -> MmScheduler {
        let pool = StreamPool::new(seed);
        MmScheduler::new(
            lambda,
            mu1,
            mu2,
            pool.stream(0),
            pool.stream(1),
            pool.stream(2),
        )
    }

    #[test]
    fn selection_and_mining_alternate() {
        let mut sched = scheduler(0.7, 10.0, 590.0, 42);
        let mut expect_selection = true;
        let mut last_t = 0.0;

        for _ in 0..2_000 {
            let event = sched.next().unwrap();
            assert!(sched.t() >= last_t);
            last_t = sched.t();
            match event {
                Event::Selection => {
                    assert!(expect_selection);
                    expect_selection = false;
                }
                Event::Mining => {
                    assert!(!expect_selection);
                    expect_selection = true;
                }
                Event::Arrival => {}
            }
        }
    }

    #[test]
    fn replaying_same_seed_is_deterministic() {
        let mut a = scheduler(0.7, 10.0, 590.0, 123);
        let mut b = scheduler(0.7, 10.0, 590.0, 123);

        for _ in 0..500 {
            assert_eq!(a.next().unwrap(), b.next().unwrap());
            assert_eq!(a.t(), b.t());
        }
    }
}
